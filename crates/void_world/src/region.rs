//! Region - root container of sectors

use crate::bounds::{Bounds, LocalGeometry};
use crate::events::{EventQueue, WorldEvent, WorldEventType};
use crate::host::{ActorHost, SceneNode};
use crate::node::{RegionId, SectorId};

/// Top-tier container
///
/// Entering a region never loads its sectors; they load one at a time as
/// they become visible. Exiting a region disposes all of them.
#[derive(Debug, Clone)]
pub struct Region {
    /// Authored name, unique within the world
    pub name: String,
    /// Extra authored extents merged with the children's bounds
    pub geometry: Option<LocalGeometry>,
    /// Static geometry toggled by graphics switches
    pub static_nodes: Vec<SceneNode>,
    pub(crate) id: RegionId,
    pub(crate) sectors: Vec<SectorId>,
    bounds: Bounds,
    initialized: bool,
    entered: bool,
    graphics_enabled: bool,
}

impl Region {
    /// Create an empty region
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry: None,
            static_nodes: Vec::new(),
            id: RegionId(0),
            sectors: Vec::new(),
            bounds: Bounds::EMPTY,
            initialized: false,
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

    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Persistence path root
    pub fn path(&self) -> &str {
        &self.name
    }

    /// Child sectors
    pub fn sectors(&self) -> &[SectorId] {
        &self.sectors
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn graphics_enabled(&self) -> bool {
        self.graphics_enabled
    }

    /// Aggregate bounds once sectors are initialized
    pub(crate) fn initialize(&mut self, children: Bounds) {
        self.bounds = match self.geometry {
            Some(geometry) => geometry.world_bounds().union(&children),
            None => children,
        };
        self.initialized = true;

        if self.bounds.is_empty() {
            log::error!("Region '{}' is empty", self.name);
        }
    }

    /// Raise Enter
    pub fn enter(&mut self, events: &mut EventQueue) {
        self.entered = true;
        log::debug!("Entered region '{}'", self.name);
        events.emit(WorldEvent::new(WorldEventType::Enter, self.id));
    }

    /// Raise Exit; the caller disposes the sectors
    pub(crate) fn exit(&mut self, events: &mut EventQueue) {
        self.entered = false;
        log::debug!("Exited region '{}'", self.name);
        events.emit(WorldEvent::new(WorldEventType::Exit, self.id));
    }

    /// Toggle the region's own static geometry
    pub fn switch_graphics(&mut self, enabled: bool, host: &mut dyn ActorHost, events: &mut EventQueue) {
        self.graphics_enabled = enabled;
        for node in &self.static_nodes {
            host.set_static_graphics(node, enabled);
        }
        events.emit(WorldEvent::graphics(self.id, enabled));
    }
}
