//! Drifting moving actors
//!
//! Each drifter is spawned inside a sector and wanders along a fixed
//! velocity. Once it has left its home sector and that sector is unloaded,
//! the actor manager asks it to unload; it then flags itself released and
//! the host loop deregisters it.

use glam::Vec3;
use parking_lot::Mutex;
use std::sync::Arc;
use void_world::{ActorId, Bounds, MovingActor, SectorId, SharedActor, VisibleActorsManager, World};

/// A wandering actor bound to a home sector
#[derive(Debug, Clone)]
pub struct Drifter {
    pub id: ActorId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub home: SectorId,
    home_bounds: Bounds,
    sector_loaded: bool,
    visible: bool,
    released: bool,
}

impl Drifter {
    pub fn new(id: u64, home: SectorId, home_bounds: Bounds, velocity: Vec3) -> Self {
        Self {
            id: ActorId(id),
            position: home_bounds.center,
            velocity,
            home,
            home_bounds,
            sector_loaded: true,
            visible: false,
            released: false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl MovingActor for Drifter {
    fn actor_id(&self) -> ActorId {
        self.id
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(self.position, Vec3::splat(0.5))
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_out_of_sector(&self) -> bool {
        !self.home_bounds.contains(self.position)
    }

    fn is_sector_loaded(&self) -> bool {
        self.sector_loaded
    }

    fn unload_if_out_of_bounds(&mut self) {
        if self.is_out_of_sector() && !self.released {
            self.released = true;
            log::debug!("{} released at {:?}", self.id, self.position);
        }
    }
}

/// The host's side of the drifter population
#[derive(Default)]
pub struct DrifterHerd {
    drifters: Vec<Arc<Mutex<Drifter>>>,
}

impl DrifterHerd {
    /// One drifter per sector, round robin, up to `count`
    pub fn spawn(world: &World, count: u32) -> Self {
        let sectors: Vec<_> = world
            .sectors()
            .iter()
            .filter(|s| s.is_initialized() && !s.bounds().is_empty())
            .collect();
        let mut herd = Self::default();
        if sectors.is_empty() {
            return herd;
        }

        for i in 0..count {
            let sector = sectors[i as usize % sectors.len()];
            let angle = i as f32 * 2.4;
            let velocity = Vec3::new(angle.cos(), 0.0, angle.sin()) * 3.0;
            herd.drifters.push(Arc::new(Mutex::new(Drifter::new(
                u64::from(i) + 1,
                sector.id(),
                sector.bounds(),
                velocity,
            ))));
        }
        herd
    }

    /// Start tracking every drifter
    pub fn register(&self, actors: &mut VisibleActorsManager) {
        let shared: Vec<SharedActor> = self
            .drifters
            .iter()
            .map(|d| -> SharedActor { d.clone() })
            .collect();
        actors.add_acting_objects(&shared);
    }

    pub fn len(&self) -> usize {
        self.drifters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drifters.is_empty()
    }

    /// Move every drifter and refresh its view of the home sector
    pub fn step(&self, dt: f32, world: &World) {
        for drifter in &self.drifters {
            let mut d = drifter.lock();
            let velocity = d.velocity;
            let loaded = world.sector(d.home).is_some_and(|s| s.is_loaded());
            d.position += velocity * dt;
            d.sector_loaded = loaded;
        }
    }

    /// Deregister and drop released drifters; returns how many went
    pub fn collect_released(&mut self, actors: &mut VisibleActorsManager) -> usize {
        let before = self.drifters.len();
        self.drifters.retain(|drifter| {
            let d = drifter.lock();
            if d.is_released() {
                actors.remove_acting_object(d.id);
                false
            } else {
                true
            }
        });
        before - self.drifters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> Bounds {
        Bounds::new(Vec3::ZERO, Vec3::splat(5.0))
    }

    #[test]
    fn test_unload_only_when_out_of_sector() {
        let mut drifter = Drifter::new(1, SectorId(0), home(), Vec3::X);
        drifter.unload_if_out_of_bounds();
        assert!(!drifter.is_released());

        drifter.position = Vec3::new(10.0, 0.0, 0.0);
        drifter.unload_if_out_of_bounds();
        assert!(drifter.is_released());
    }

    #[test]
    fn test_released_drifters_deregister() {
        let mut actors = VisibleActorsManager::new(0.5, 0.0, 1);
        let drifter = Arc::new(Mutex::new(Drifter::new(1, SectorId(0), home(), Vec3::X)));
        let shared: SharedActor = drifter.clone();
        actors.add_acting_object(&shared);
        let mut herd = DrifterHerd {
            drifters: vec![drifter.clone()],
        };

        assert_eq!(herd.collect_released(&mut actors), 0);
        drifter.lock().released = true;
        assert_eq!(herd.collect_released(&mut actors), 1);
        assert!(actors.is_empty());
        assert!(herd.is_empty());
    }
}
