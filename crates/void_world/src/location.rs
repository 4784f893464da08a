//! Location - leaf spatial cell
//!
//! A location owns spawn bindings and the entities instantiated from them.
//! Loading and disposal are idempotent; entering only loads, exiting never
//! unloads (unloading is driven by visibility alone).

use crate::bounds::{Bounds, LocalGeometry};
use crate::events::{Broadcast, EventQueue, WorldEvent, WorldEventType};
use crate::host::{ActorHost, ActorSpawnPreset, EntityHandle, SceneNode};
use crate::node::{LocationId, SectorId};
use crate::pose::{Pose, PoseMap};
use crate::sector::LogicSwitch;
use std::collections::{HashMap, HashSet};

/// Leaf cell of the hierarchy
#[derive(Debug, Clone)]
pub struct Location {
    /// Authored name, unique within the owning sector
    pub name: String,
    /// Authored geometry extents
    pub geometry: Option<LocalGeometry>,
    /// Spawn bindings
    pub spawn_presets: Vec<ActorSpawnPreset>,
    /// Static geometry toggled by graphics switches
    pub static_nodes: Vec<SceneNode>,
    pub(crate) id: LocationId,
    pub(crate) path: String,
    sector: Option<SectorId>,
    bounds: Bounds,
    initialized: bool,
    loaded: bool,
    entered: bool,
    graphics_enabled: bool,
    /// Spawn node name -> instantiated entity
    spawned: HashMap<String, EntityHandle>,
    poses: Option<PoseMap>,
    graphics: Broadcast,
}

impl Location {
    /// Create an unattached location
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            geometry: None,
            spawn_presets: Vec::new(),
            static_nodes: Vec::new(),
            id: LocationId(0),
            sector: None,
            bounds: Bounds::EMPTY,
            initialized: false,
            loaded: false,
            entered: false,
            graphics_enabled: false,
            spawned: HashMap::new(),
            poses: None,
            graphics: Broadcast::new(),
        }
    }

    /// Set authored geometry
    pub fn with_geometry(mut self, geometry: LocalGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Add a spawn binding
    pub fn with_spawn(mut self, preset: ActorSpawnPreset) -> Self {
        self.spawn_presets.push(preset);
        self
    }

    /// Add static geometry
    pub fn with_static_node(mut self, node: SceneNode) -> Self {
        self.static_nodes.push(node);
        self
    }

    pub fn id(&self) -> LocationId {
        self.id
    }

    /// Stable hierarchical path used as the persistence key
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Owning sector (none for standalone locations)
    pub fn sector(&self) -> Option<SectorId> {
        self.sector
    }

    /// World-space bounds (empty until initialized)
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

    /// Instantiated entities by spawn node name
    pub fn spawned(&self) -> &HashMap<String, EntityHandle> {
        &self.spawned
    }

    /// First spawn node name bound more than once
    pub(crate) fn duplicate_spawn_node(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.spawn_presets
            .iter()
            .flat_map(|preset| preset.targets.iter().flatten())
            .map(|node| node.name.as_str())
            .find(|&name| !seen.insert(name))
    }

    /// Compute world bounds from authored geometry
    ///
    /// Missing or degenerate geometry is an authoring error: it is logged and
    /// the location stays uninitialized. A second call is a no-op.
    pub fn initialize(&mut self, owner: Option<SectorId>) -> bool {
        if self.initialized {
            log::warn!("Location '{}' initialized twice, ignoring", self.path);
            return false;
        }
        self.sector = owner;

        let Some(geometry) = self.geometry else {
            log::error!("Location '{}' has no geometry reference", self.path);
            return false;
        };

        let bounds = geometry.world_bounds();
        if bounds.is_empty() {
            log::error!("Location '{}' has degenerate geometry {:?}", self.path, geometry.local_bounds);
            return false;
        }

        self.bounds = bounds;
        self.initialized = true;
        true
    }

    /// Tracked point entered: load if needed, then raise Enter
    ///
    /// Re-entering re-raises the event so listeners can refresh.
    pub fn enter(&mut self, host: &mut dyn ActorHost, logic: Option<&mut LogicSwitch>, events: &mut EventQueue) {
        if !self.loaded {
            self.load(host, logic, events);
        }
        self.entered = true;
        events.emit(WorldEvent::new(WorldEventType::Enter, self.id));
    }

    /// Tracked point left: raise Exit only
    pub fn exit(&mut self, events: &mut EventQueue) {
        self.entered = false;
        events.emit(WorldEvent::new(WorldEventType::Exit, self.id));
    }

    /// Instantiate every bound entity not yet present
    pub fn load(&mut self, host: &mut dyn ActorHost, mut logic: Option<&mut LogicSwitch>, events: &mut EventQueue) {
        if self.loaded {
            return;
        }
        if !self.initialized {
            log::warn!("Location '{}' loaded before initialization, skipping", self.path);
            return;
        }

        for preset in &self.spawn_presets {
            for target in &preset.targets {
                let Some(node) = target else {
                    log::warn!(
                        "Location '{}': spawn binding for '{}' has a missing target node",
                        self.path,
                        preset.template
                    );
                    continue;
                };
                if self.spawned.contains_key(&node.name) {
                    log::error!(
                        "Location '{}': spawn node '{}' is bound twice, skipping '{}'",
                        self.path,
                        node.name,
                        preset.template
                    );
                    continue;
                }

                let Some(handle) = host.spawn(&preset.template, node) else {
                    log::warn!(
                        "Location '{}': could not spawn '{}' at '{}'",
                        self.path,
                        preset.template,
                        node.name
                    );
                    continue;
                };

                if let Some(pose) = self.poses.as_ref().and_then(|p| p.get(&node.name)) {
                    host.place(handle, *pose);
                }
                if let Some(wiring) = &preset.activation {
                    host.wire_activation(handle, wiring);
                }
                if let Some(logic) = logic.as_deref_mut() {
                    logic.wire(handle, host);
                }

                self.graphics.subscribe(handle);
                host.set_entity_graphics(handle, self.graphics_enabled);
                self.spawned.insert(node.name.clone(), handle);
            }
        }

        self.loaded = true;
        log::debug!("Loaded location '{}' ({} entities)", self.path, self.spawned.len());
        events.emit(WorldEvent::new(WorldEventType::Load, self.id));
    }

    /// Return every entity to the pool
    ///
    /// The last known pose of each entity is saved under its spawn node name
    /// so the next load puts it back where it was left.
    pub fn dispose(&mut self, host: &mut dyn ActorHost, mut logic: Option<&mut LogicSwitch>, events: &mut EventQueue) {
        if !self.loaded {
            return;
        }

        let mut spawned: Vec<(String, EntityHandle)> = self.spawned.drain().collect();
        spawned.sort_by_key(|(_, handle)| *handle);
        for (name, handle) in spawned {
            if let Some(pose) = host.current_pose(handle) {
                self.save_object_pose(name, pose);
            }
            if let Some(logic) = logic.as_deref_mut() {
                logic.unwire(handle);
            }
            self.graphics.unsubscribe(handle);
            host.release(handle);
        }

        self.loaded = false;
        log::debug!("Disposed location '{}'", self.path);
        events.emit(WorldEvent::new(WorldEventType::Dispose, self.id));
    }

    /// Toggle static geometry and rebroadcast to spawned entities
    pub fn switch_graphics(&mut self, enabled: bool, host: &mut dyn ActorHost, events: &mut EventQueue) {
        self.graphics_enabled = enabled;
        for node in &self.static_nodes {
            host.set_static_graphics(node, enabled);
        }
        for &handle in self.graphics.subscribers() {
            host.set_entity_graphics(handle, enabled);
        }
        events.emit(WorldEvent::graphics(self.id, enabled));
    }

    /// Drop an entity that disposed itself
    ///
    /// The location stays loaded, so the spawn point is not refilled until
    /// the location is disposed and loaded again.
    pub fn forget_entity(&mut self, handle: EntityHandle) -> bool {
        let before = self.spawned.len();
        self.spawned.retain(|_, h| *h != handle);
        self.graphics.unsubscribe(handle);
        self.spawned.len() != before
    }

    /// Record a pose for a spawn node
    pub fn save_object_pose(&mut self, name: impl Into<String>, pose: Pose) {
        self.poses.get_or_insert_with(PoseMap::new).insert(name.into(), pose);
    }

    /// Look up a recorded pose; unset names are `None`, never a default pose
    pub fn try_get_object_pose(&self, name: &str) -> Option<Pose> {
        self.poses.as_ref()?.get(name).copied()
    }

    pub(crate) fn poses(&self) -> Option<&PoseMap> {
        self.poses.as_ref()
    }

    pub(crate) fn set_poses(&mut self, poses: PoseMap) {
        self.poses = Some(poses);
    }
}
