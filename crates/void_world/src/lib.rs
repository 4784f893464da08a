//! Void World - Region Streaming and Actor Recycling
//!
//! This crate decides which parts of a large persistent world are
//! instantiated, rendered and simulated at any moment.
//!
//! # Features
//!
//! - Three-tier spatial hierarchy (region, sector, location)
//! - Enter/Exit events driven by a tracked point
//! - Load/Dispose driven by a visibility predicate
//! - Per-sector logic switching and per-node graphics switching
//! - Safe-position recovery when the tracked point leaves every sector
//! - Deferred recycling of moving actors
//! - Persisted spawn-point poses
//!
//! # Example
//!
//! ```ignore
//! use void_world::prelude::*;
//!
//! let descriptor = WorldDescriptor::load("world.toml")?;
//! let mut streaming = WorldStreaming::new(World::from_descriptor(&descriptor)?, StreamingConfig::default());
//! streaming.initialize();
//!
//! let mut pool = ActorPool::new();
//! let mut player = TrackedPoint(Vec3::ZERO);
//! let camera = FrustumVisibility::new(&view_projection, eye);
//! streaming.tick(1.0 / 60.0, &mut pool, &mut player, &camera);
//! ```

pub mod actors;
pub mod bounds;
pub mod config;
pub mod coordinator;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod frustum;
pub mod host;
pub mod location;
pub mod manager;
pub mod node;
pub mod pool;
pub mod pose;
pub mod region;
pub mod sector;
pub mod service;
pub mod world;

pub mod prelude {
    pub use crate::actors::{ActorId, ActorViewState, MovingActor, SharedActor, VisibleActorsManager};
    pub use crate::bounds::{Bounds, LocalGeometry};
    pub use crate::config::StreamingConfig;
    pub use crate::coordinator::RegionCoordinator;
    pub use crate::descriptor::{LocationDescriptor, RegionDescriptor, SectorDescriptor, WorldDescriptor};
    pub use crate::error::WorldError;
    pub use crate::events::{Broadcast, WorldEvent, WorldEventHandler, WorldEventType};
    pub use crate::frustum::{Frustum, FrustumVisibility, VisibilityPredicate};
    pub use crate::host::{
        ActivationWiring, ActorHost, ActorSpawnPreset, ActorTemplate, EntityHandle, SceneNode, TrackedEntity,
        TrackedPoint,
    };
    pub use crate::location::Location;
    pub use crate::manager::RegionManager;
    pub use crate::node::{HierarchyNode, LocationId, NodeId, RegionId, SectorId};
    pub use crate::pool::{ActorPool, HostCall};
    pub use crate::pose::{Pose, PoseFormat, PoseMap, PoseRegistry, PoseStore, PoseStoreError};
    pub use crate::region::Region;
    pub use crate::sector::{LogicSwitch, Sector};
    pub use crate::service::{StreamingStats, WorldStreaming};
    pub use crate::world::World;
}

pub use prelude::*;
