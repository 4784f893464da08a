//! Sector - mid-tier container of locations
//!
//! Load/dispose fan out to child locations (see `World::load_sector`). The
//! sector itself owns the logic switch every entity spawned beneath it is
//! wired to.

use crate::bounds::{Bounds, LocalGeometry};
use crate::events::{Broadcast, EventQueue, WorldEvent, WorldEventType};
use crate::host::{ActorHost, EntityHandle, SceneNode};
use crate::node::{LocationId, RegionId, SectorId};

/// Logic enable/disable fan-out
#[derive(Debug, Clone)]
pub struct LogicSwitch {
    listeners: Broadcast,
    enabled: bool,
}

impl LogicSwitch {
    /// Create a switch in the enabled state
    pub fn new() -> Self {
        Self {
            listeners: Broadcast::new(),
            enabled: true,
        }
    }

    /// Subscribe an entity and bring it to the current state
    pub fn wire(&mut self, handle: EntityHandle, host: &mut dyn ActorHost) {
        self.listeners.subscribe(handle);
        host.set_logic_enabled(handle, self.enabled);
    }

    /// Unsubscribe an entity
    pub fn unwire(&mut self, handle: EntityHandle) {
        self.listeners.unsubscribe(handle);
    }

    /// Set the state and notify every listener
    pub fn switch(&mut self, enabled: bool, host: &mut dyn ActorHost) {
        self.enabled = enabled;
        for &handle in self.listeners.subscribers() {
            host.set_logic_enabled(handle, enabled);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wired entities
    pub fn listeners(&self) -> &[EntityHandle] {
        self.listeners.subscribers()
    }

    fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl Default for LogicSwitch {
    fn default() -> Self {
        Self::new()
    }
}

/// Mid-tier container
#[derive(Debug, Clone)]
pub struct Sector {
    /// Authored name, unique within the owning region
    pub name: String,
    /// Authored geometry extents; falls back to the union of child locations
    pub geometry: Option<LocalGeometry>,
    /// Static geometry toggled by graphics switches
    pub static_nodes: Vec<SceneNode>,
    pub(crate) id: SectorId,
    pub(crate) path: String,
    pub(crate) region: Option<RegionId>,
    pub(crate) locations: Vec<LocationId>,
    pub(crate) logic: LogicSwitch,
    bounds: Bounds,
    initialized: bool,
    loaded: bool,
    entered: bool,
    graphics_enabled: bool,
}

impl Sector {
    /// Create an unattached sector
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            geometry: None,
            static_nodes: Vec::new(),
            id: SectorId(0),
            region: None,
            locations: Vec::new(),
            logic: LogicSwitch::new(),
            bounds: Bounds::EMPTY,
            initialized: false,
            loaded: false,
            entered: false,
            graphics_enabled: false,
        }
    }

    /// Set authored geometry
    pub fn with_geometry(mut self, geometry: LocalGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Add static geometry
    pub fn with_static_node(mut self, node: SceneNode) -> Self {
        self.static_nodes.push(node);
        self
    }

    pub fn id(&self) -> SectorId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Owning region
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    /// Child locations
    pub fn locations(&self) -> &[LocationId] {
        &self.locations
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn graphics_enabled(&self) -> bool {
        self.graphics_enabled
    }

    pub fn logic_enabled(&self) -> bool {
        self.logic.is_enabled()
    }

    /// Entities wired to this sector's logic switch
    pub fn logic_listeners(&self) -> &[EntityHandle] {
        self.logic.listeners()
    }

    /// Compute bounds once children are initialized
    pub(crate) fn initialize(&mut self, region: Option<RegionId>, children: Bounds) -> bool {
        self.region = region;
        self.bounds = match self.geometry {
            Some(geometry) => geometry.world_bounds(),
            None => children,
        };
        self.initialized = true;

        if self.bounds.is_empty() {
            log::error!("Sector '{}' has no geometry and no initialized locations", self.path);
            return false;
        }
        true
    }

    /// Raise Enter (narrative trigger only)
    pub fn enter(&mut self, events: &mut EventQueue) {
        self.entered = true;
        events.emit(WorldEvent::new(WorldEventType::Enter, self.id));
    }

    /// Raise Exit (narrative trigger only)
    pub fn exit(&mut self, events: &mut EventQueue) {
        self.entered = false;
        events.emit(WorldEvent::new(WorldEventType::Exit, self.id));
    }

    /// Pause or resume every entity spawned beneath this sector
    pub fn switch_logic(&mut self, enabled: bool, host: &mut dyn ActorHost, events: &mut EventQueue) {
        self.logic.switch(enabled, host);
        events.emit(WorldEvent::logic(self.id, enabled));
    }

    /// Toggle the sector's own static geometry
    pub fn switch_graphics(&mut self, enabled: bool, host: &mut dyn ActorHost, events: &mut EventQueue) {
        self.graphics_enabled = enabled;
        for node in &self.static_nodes {
            host.set_static_graphics(node, enabled);
        }
        events.emit(WorldEvent::graphics(self.id, enabled));
    }

    /// Children finished loading
    pub(crate) fn finish_load(&mut self, events: &mut EventQueue) {
        self.loaded = true;
        log::debug!("Loaded sector '{}'", self.path);
        events.emit(WorldEvent::new(WorldEventType::Load, self.id));
    }

    /// Children finished disposing; drop the listener wiring
    pub(crate) fn finish_dispose(&mut self, events: &mut EventQueue) {
        self.logic.clear();
        if self.loaded {
            self.loaded = false;
            log::debug!("Disposed sector '{}'", self.path);
            events.emit(WorldEvent::new(WorldEventType::Dispose, self.id));
        }
    }
}
