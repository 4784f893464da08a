//! In-process actor pool
//!
//! A plain [`ActorHost`] that keeps one free list per template. Hosts without
//! their own entity system (tools, the streamer binary, tests) use it as is.
//! A pool built with [`ActorPool::recording`] also logs every host call so the
//! order of switches can be inspected.

use crate::host::{ActivationWiring, ActorHost, ActorTemplate, EntityHandle, SceneNode};
use crate::pose::Pose;
use std::collections::HashMap;

/// State of one pooled entity
#[derive(Debug, Clone, PartialEq)]
pub struct PooledEntity {
    /// Template the entity was built from
    pub template: ActorTemplate,
    /// Spawn node name while active
    pub node: String,
    /// Current placement
    pub pose: Pose,
    /// Simulation logic running
    pub logic_enabled: bool,
    /// Rendered
    pub graphics_enabled: bool,
    /// Handed out (false while sitting in the free list)
    pub active: bool,
    /// Pressure-button wiring, if any
    pub activation: Option<ActivationWiring>,
}

impl PooledEntity {
    fn fresh(template: ActorTemplate, node: &SceneNode) -> Self {
        Self {
            template,
            node: node.name.clone(),
            pose: node.pose,
            logic_enabled: true,
            graphics_enabled: false,
            active: true,
            activation: None,
        }
    }
}

/// A recorded host call
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Spawn(EntityHandle),
    Release(EntityHandle),
    Place(EntityHandle, Pose),
    Logic(EntityHandle, bool),
    EntityGraphics(EntityHandle, bool),
    StaticGraphics(String, bool),
    Activation(EntityHandle),
}

/// Template-keyed entity pool
#[derive(Debug, Default)]
pub struct ActorPool {
    entities: HashMap<EntityHandle, PooledEntity>,
    free: HashMap<ActorTemplate, Vec<EntityHandle>>,
    static_graphics: HashMap<String, bool>,
    next_handle: u64,
    recording: bool,
    calls: Vec<HostCall>,
}

impl ActorPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty pool that records every host call
    pub fn recording() -> Self {
        Self {
            recording: true,
            ..Self::default()
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Entity state by handle
    pub fn entity(&self, handle: EntityHandle) -> Option<&PooledEntity> {
        self.entities.get(&handle)
    }

    /// Number of handed-out entities
    pub fn active_count(&self) -> usize {
        self.entities.values().filter(|e| e.active).count()
    }

    /// Number of entities waiting for reuse
    pub fn pooled_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Static geometry state by node name
    pub fn static_graphics(&self, node: &str) -> Option<bool> {
        self.static_graphics.get(node).copied()
    }

    /// Simulate gameplay moving an entity
    pub fn move_entity(&mut self, handle: EntityHandle, pose: Pose) {
        if let Some(entity) = self.entities.get_mut(&handle) {
            entity.pose = pose;
        }
    }

    /// Calls recorded so far (always empty unless recording)
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Forget recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: HostCall) {
        if self.recording {
            self.calls.push(call);
        }
    }

    fn active_mut(&mut self, handle: EntityHandle) -> Option<&mut PooledEntity> {
        self.entities.get_mut(&handle).filter(|e| e.active)
    }
}

impl ActorHost for ActorPool {
    fn spawn(&mut self, template: &ActorTemplate, node: &SceneNode) -> Option<EntityHandle> {
        let reused = self.free.get_mut(template).and_then(Vec::pop);
        let handle = match reused {
            Some(handle) => handle,
            None => {
                self.next_handle += 1;
                EntityHandle(self.next_handle)
            }
        };

        // Reused handles are reset completely
        self.entities
            .insert(handle, PooledEntity::fresh(template.clone(), node));
        self.record(HostCall::Spawn(handle));
        Some(handle)
    }

    fn release(&mut self, handle: EntityHandle) {
        let Some(entity) = self.active_mut(handle) else {
            log::warn!("Release of inactive {}", handle);
            return;
        };
        entity.active = false;
        let template = entity.template.clone();
        self.free.entry(template).or_default().push(handle);
        self.record(HostCall::Release(handle));
    }

    fn place(&mut self, handle: EntityHandle, pose: Pose) {
        if let Some(entity) = self.active_mut(handle) {
            entity.pose = pose;
        }
        self.record(HostCall::Place(handle, pose));
    }

    fn current_pose(&self, handle: EntityHandle) -> Option<Pose> {
        self.entities
            .get(&handle)
            .filter(|e| e.active)
            .map(|e| e.pose)
    }

    fn set_logic_enabled(&mut self, handle: EntityHandle, enabled: bool) {
        if let Some(entity) = self.active_mut(handle) {
            entity.logic_enabled = enabled;
        }
        self.record(HostCall::Logic(handle, enabled));
    }

    fn set_entity_graphics(&mut self, handle: EntityHandle, enabled: bool) {
        if let Some(entity) = self.active_mut(handle) {
            entity.graphics_enabled = enabled;
        }
        self.record(HostCall::EntityGraphics(handle, enabled));
    }

    fn set_static_graphics(&mut self, node: &SceneNode, enabled: bool) {
        self.static_graphics.insert(node.name.clone(), enabled);
        self.record(HostCall::StaticGraphics(node.name.clone(), enabled));
    }

    fn wire_activation(&mut self, handle: EntityHandle, wiring: &ActivationWiring) {
        if let Some(entity) = self.active_mut(handle) {
            entity.activation = Some(wiring.clone());
        }
        self.record(HostCall::Activation(handle));
    }
}
