//! World streaming service
//!
//! One owned object per loaded world. The host loop calls [`WorldStreaming::tick`]
//! once per simulation step; containment, visibility and actor recycling run
//! as phases of that single call, never concurrently.

use crate::actors::{ActorViewState, VisibleActorsManager};
use crate::config::StreamingConfig;
use crate::frustum::VisibilityPredicate;
use crate::host::{ActorHost, TrackedEntity};
use crate::manager::RegionManager;
use crate::world::World;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of what is currently streamed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingStats {
    pub loaded_locations: usize,
    pub loaded_sectors: usize,
    pub spawned_entities: usize,
    pub visible_nodes: usize,
    pub actors_in_view: usize,
    pub actors_outside_view: usize,
    pub actors_to_unload: usize,
}

impl fmt::Display for StreamingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sectors / {} locations loaded, {} entities, {} visible nodes, actors {}/{}/{}",
            self.loaded_sectors,
            self.loaded_locations,
            self.spawned_entities,
            self.visible_nodes,
            self.actors_in_view,
            self.actors_outside_view,
            self.actors_to_unload
        )
    }
}

/// Region manager, actor manager and the world they drive
pub struct WorldStreaming {
    world: World,
    regions: RegionManager,
    actors: VisibleActorsManager,
    config: StreamingConfig,
    initialized: bool,
}

impl WorldStreaming {
    /// Wrap a freshly built world
    pub fn new(world: World, config: StreamingConfig) -> Self {
        Self {
            world,
            regions: RegionManager::new(&config),
            actors: VisibleActorsManager::new(
                config.actor_tick_interval,
                config.actor_tick_jitter,
                config.jitter_seed,
            ),
            config,
            initialized: false,
        }
    }

    /// Register every region; must run before the first tick
    pub fn initialize(&mut self) {
        if self.initialized {
            log::warn!("World streaming already initialized");
            return;
        }
        self.world.initialize_all();
        self.initialized = true;
        log::info!("World streaming initialized: {} regions", self.world.registered_regions().len());
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn regions(&self) -> &RegionManager {
        &self.regions
    }

    pub fn actors(&self) -> &VisibleActorsManager {
        &self.actors
    }

    pub fn actors_mut(&mut self) -> &mut VisibleActorsManager {
        &mut self.actors
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// One simulation step
    pub fn tick(
        &mut self,
        dt: f32,
        host: &mut dyn ActorHost,
        player: &mut dyn TrackedEntity,
        visibility: &dyn VisibilityPredicate,
    ) {
        if !self.initialized {
            log::error!("World streaming ticked before initialization");
            return;
        }
        self.regions.update(dt, &mut self.world, host, player, visibility);
        self.actors.update(dt, visibility);
    }

    /// Eagerly load whatever sector holds `point`
    pub fn load_location_on_position(&mut self, point: Vec3, host: &mut dyn ActorHost) -> bool {
        self.regions.load_location_on_position(point, &mut self.world, host)
    }

    /// Release everything and forget tracked actors
    pub fn teardown(&mut self, host: &mut dyn ActorHost) {
        self.regions.teardown(&mut self.world, host);
        self.world.dispose_all(host);
        self.actors.clear();
        log::info!("World streaming torn down");
    }

    pub fn stats(&self) -> StreamingStats {
        let locations = self.world.locations();
        StreamingStats {
            loaded_locations: locations.iter().filter(|l| l.is_loaded()).count(),
            loaded_sectors: self.world.sectors().iter().filter(|s| s.is_loaded()).count(),
            spawned_entities: locations.iter().map(|l| l.spawned().len()).sum(),
            visible_nodes: self.regions.visible().len(),
            actors_in_view: self.actors.count(ActorViewState::InPlayerView),
            actors_outside_view: self.actors.count(ActorViewState::OutsidePlayerView),
            actors_to_unload: self.actors.count(ActorViewState::ActorsToUnload),
        }
    }
}
