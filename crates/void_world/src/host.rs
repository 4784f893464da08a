//! Collaborator contracts consumed by the streaming core
//!
//! Entity construction, pooling and per-entity switches belong to the host
//! engine. The core only hands out templates and scene nodes and receives
//! opaque handles back.

use crate::pose::Pose;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle of an instantiated entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Opaque entity-construction descriptor (a "mold")
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorTemplate(pub String);

impl ActorTemplate {
    /// Create a template reference
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authored scene node a template is spawned at
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Node name, unique within its location
    pub name: String,
    /// Authored placement
    #[serde(default)]
    pub pose: Pose,
}

impl SceneNode {
    /// Create a node at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pose: Pose::default(),
        }
    }

    /// Set position
    pub fn at(mut self, position: Vec3) -> Self {
        self.pose.position = position;
        self
    }
}

/// Pressure-button wiring: a target node plus press/release callbacks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivationWiring {
    /// Node that reacts to the button
    pub target: SceneNode,
    /// Callback invoked on press
    pub on_press: String,
    /// Callback invoked on release
    pub on_release: String,
}

/// Binding of one template to one or more spawn points
///
/// `None` targets are authoring errors (a reference to a deleted node); they
/// are logged and skipped at load time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSpawnPreset {
    /// Template to instantiate
    pub template: ActorTemplate,
    /// Spawn points
    #[serde(default)]
    pub targets: Vec<Option<SceneNode>>,
    /// Optional pressure-button wiring
    #[serde(default)]
    pub activation: Option<ActivationWiring>,
}

impl ActorSpawnPreset {
    /// Create a preset without spawn points
    pub fn new(template: ActorTemplate) -> Self {
        Self {
            template,
            targets: Vec::new(),
            activation: None,
        }
    }

    /// Add a spawn point
    pub fn with_target(mut self, node: SceneNode) -> Self {
        self.targets.push(Some(node));
        self
    }

    /// Add a dangling spawn point
    pub fn with_missing_target(mut self) -> Self {
        self.targets.push(None);
        self
    }

    /// Set activation wiring
    pub fn with_activation(mut self, wiring: ActivationWiring) -> Self {
        self.activation = Some(wiring);
        self
    }
}

/// Entity construction and per-entity switches
///
/// `spawn`/`release` form a pool keyed by template identity; a released
/// handle must be fully reset before it is handed out again.
pub trait ActorHost {
    /// Instantiate `template` at `node`
    fn spawn(&mut self, template: &ActorTemplate, node: &SceneNode) -> Option<EntityHandle>;

    /// Return an entity to its pool
    fn release(&mut self, handle: EntityHandle);

    /// Move an entity to a restored pose
    fn place(&mut self, _handle: EntityHandle, _pose: Pose) {}

    /// Current pose of an entity, if the host tracks one
    fn current_pose(&self, _handle: EntityHandle) -> Option<Pose> {
        None
    }

    /// Pause or resume an entity's simulation logic
    fn set_logic_enabled(&mut self, _handle: EntityHandle, _enabled: bool) {}

    /// Show or hide an entity
    fn set_entity_graphics(&mut self, _handle: EntityHandle, _enabled: bool) {}

    /// Show or hide authored static geometry
    fn set_static_graphics(&mut self, _node: &SceneNode, _enabled: bool) {}

    /// Connect an entity to its pressure-button target
    fn wire_activation(&mut self, _handle: EntityHandle, _wiring: &ActivationWiring) {}
}

/// The tracked reference point (usually the player)
pub trait TrackedEntity {
    /// Current world position
    fn position(&self) -> Vec3;

    /// Forcibly relocate
    fn set_position(&mut self, position: Vec3);
}

/// A bare tracked point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrackedPoint(pub Vec3);

impl TrackedEntity for TrackedPoint {
    fn position(&self) -> Vec3 {
        self.0
    }

    fn set_position(&mut self, position: Vec3) {
        self.0 = position;
    }
}
