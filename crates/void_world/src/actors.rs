//! Visible actors manager - recycling of dynamic entities
//!
//! Moving actors are tracked apart from the static hierarchy. Each periodic
//! tick tests every tracked actor against the visibility predicate and walks
//! it through three states:
//!
//! ```text
//! InPlayerView --(hidden, out of sector, sector unloaded)--> OutsidePlayerView
//! OutsidePlayerView --(next tick)--> ActorsToUnload --(unload requested)
//! any --(visible)--> InPlayerView
//! ```
//!
//! An actor that is hidden while its sector stays loaded remains in
//! `InPlayerView` indefinitely; sector unload is what eventually releases it.

use crate::bounds::Bounds;
use crate::frustum::VisibilityPredicate;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};

/// Stable identity of a moving actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Capability of an entity that opts into visibility-driven recycling
pub trait MovingActor: Send {
    fn actor_id(&self) -> ActorId;

    /// World-space bounds tested against the visibility predicate
    fn bounds(&self) -> Bounds;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Has the actor wandered out of the sector it was spawned in
    fn is_out_of_sector(&self) -> bool;

    /// Is the actor's owning sector currently loaded
    fn is_sector_loaded(&self) -> bool;

    /// Return to the pool if the actor is still out of bounds
    ///
    /// Deregistration is the actor's own job once it is disposed.
    fn unload_if_out_of_bounds(&mut self);
}

/// Shared handle to a tracked actor
pub type SharedActor = Arc<Mutex<dyn MovingActor>>;

/// Per-actor recycling state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorViewState {
    InPlayerView,
    OutsidePlayerView,
    ActorsToUnload,
}

struct TrackedActor {
    actor: Weak<Mutex<dyn MovingActor>>,
    state: ActorViewState,
}

/// Periodic tracker of moving actors
pub struct VisibleActorsManager {
    actors: HashMap<ActorId, TrackedActor>,
    interval: f32,
    jitter: f32,
    timer: f32,
    next_tick: f32,
    rng: StdRng,
}

impl VisibleActorsManager {
    /// Create a manager ticking every `interval` plus up to `jitter` seconds
    pub fn new(interval: f32, jitter: f32, seed: u64) -> Self {
        let mut manager = Self {
            actors: HashMap::new(),
            interval: interval.max(0.0),
            jitter: jitter.max(0.0),
            timer: 0.0,
            next_tick: 0.0,
            rng: StdRng::seed_from_u64(seed),
        };
        manager.next_tick = manager.sample_interval();
        manager
    }

    fn sample_interval(&mut self) -> f32 {
        self.interval + self.rng.gen_range(0.0..=self.jitter)
    }

    /// Start tracking an actor; returns `false` if it was already tracked
    pub fn add_acting_object(&mut self, actor: &SharedActor) -> bool {
        let id = actor.lock().actor_id();
        if self.actors.contains_key(&id) {
            return false;
        }
        self.actors.insert(
            id,
            TrackedActor {
                actor: Arc::downgrade(actor),
                state: ActorViewState::InPlayerView,
            },
        );
        log::debug!("Tracking {}", id);
        true
    }

    /// Track several actors
    pub fn add_acting_objects<'a>(&mut self, actors: impl IntoIterator<Item = &'a SharedActor>) -> usize {
        actors
            .into_iter()
            .filter(|actor| self.add_acting_object(actor))
            .count()
    }

    /// Stop tracking an actor
    pub fn remove_acting_object(&mut self, id: ActorId) -> bool {
        self.actors.remove(&id).is_some()
    }

    pub fn state_of(&self, id: ActorId) -> Option<ActorViewState> {
        self.actors.get(&id).map(|t| t.state)
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Number of tracked actors in a state
    pub fn count(&self, state: ActorViewState) -> usize {
        self.actors.values().filter(|t| t.state == state).count()
    }

    /// Interval until the next tick (base plus this cycle's jitter)
    pub fn next_tick(&self) -> f32 {
        self.next_tick
    }

    /// Drop every tracked actor
    pub fn clear(&mut self) {
        self.actors.clear();
        self.timer = 0.0;
    }

    /// Advance the timer; tick once the current interval has elapsed
    pub fn update(&mut self, dt: f32, visibility: &dyn VisibilityPredicate) -> bool {
        self.timer += dt;
        if self.timer < self.next_tick {
            return false;
        }
        self.timer = 0.0;
        self.next_tick = self.sample_interval();
        self.tick(visibility);
        true
    }

    /// Test every actor against the predicate and apply the result
    ///
    /// Returns the number of actors asked to unload.
    pub fn tick(&mut self, visibility: &dyn VisibilityPredicate) -> usize {
        let visible: HashSet<ActorId> = self
            .actors
            .iter()
            .filter_map(|(&id, tracked)| {
                let actor = tracked.actor.upgrade()?;
                let bounds = actor.lock().bounds();
                visibility.is_volume_visible(&bounds).then_some(id)
            })
            .collect();
        self.apply_visible_set(&visible)
    }

    /// One full transition pass against an explicit visible set
    ///
    /// Returns the number of actors asked to unload.
    pub fn apply_visible_set(&mut self, visible: &HashSet<ActorId>) -> usize {
        self.actors.retain(|id, tracked| {
            let alive = tracked.actor.strong_count() > 0;
            if !alive {
                log::warn!("{} was destroyed without deregistering", id);
            }
            alive
        });

        // Grace tick is over
        for tracked in self.actors.values_mut() {
            if tracked.state == ActorViewState::OutsidePlayerView {
                tracked.state = ActorViewState::ActorsToUnload;
            }
        }

        for (id, tracked) in self.actors.iter_mut() {
            if tracked.state != ActorViewState::InPlayerView || visible.contains(id) {
                continue;
            }
            let Some(actor) = tracked.actor.upgrade() else {
                continue;
            };
            let mut actor = actor.lock();
            actor.set_visible(false);
            if actor.is_out_of_sector() && !actor.is_sector_loaded() {
                tracked.state = ActorViewState::OutsidePlayerView;
            }
        }

        for id in visible {
            let Some(tracked) = self.actors.get_mut(id) else {
                continue;
            };
            if let Some(actor) = tracked.actor.upgrade() {
                actor.lock().set_visible(true);
            }
            tracked.state = ActorViewState::InPlayerView;
        }

        let to_unload: Vec<SharedActor> = self
            .actors
            .values()
            .filter(|t| t.state == ActorViewState::ActorsToUnload)
            .filter_map(|t| t.actor.upgrade())
            .collect();
        for actor in &to_unload {
            actor.lock().unload_if_out_of_bounds();
        }
        if !to_unload.is_empty() {
            log::debug!("Requested unload of {} actors", to_unload.len());
        }
        to_unload.len()
    }
}

impl Default for VisibleActorsManager {
    fn default() -> Self {
        Self::new(0.5, 0.1, 0x5EED)
    }
}

impl fmt::Debug for VisibleActorsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibleActorsManager")
            .field("tracked", &self.actors.len())
            .field("interval", &self.interval)
            .field("jitter", &self.jitter)
            .field("next_tick", &self.next_tick)
            .finish()
    }
}
