//! End-to-end streaming tests for void_world
//!
//! These drive the public API the way a host loop does: build a world from
//! a descriptor, tick the service with a tracked point and a visibility
//! predicate, and observe events, pool calls and actor states.

use glam::Vec3;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use void_world::*;

const WORLD: &str = r#"
[[regions]]
name = "coast"

[[regions.sectors]]
name = "harbor"

[[regions.sectors.locations]]
name = "pier"
geometry = { local_bounds = { center = [0.0, 0.0, 0.0], half_extents = [5.0, 5.0, 5.0] } }

[[regions.sectors.locations.spawns]]
template = "crate"
targets = [{ name = "crate_a", pose = { position = [1.0, 0.0, 0.0] } }, { name = "crate_b" }]

[[regions.sectors.locations]]
name = "market"
geometry = { local_bounds = { center = [10.0, 0.0, 0.0], half_extents = [5.0, 5.0, 5.0] } }

[[regions.sectors.locations.spawns]]
template = "stall"
targets = [{ name = "stall" }]

[[regions.sectors]]
name = "cliffs"

[[regions.sectors.locations]]
name = "lighthouse"
geometry = { local_bounds = { center = [40.0, 0.0, 0.0], half_extents = [5.0, 5.0, 5.0] } }

[[regions]]
name = "inland"

[[regions.sectors]]
name = "woods"

[[regions.sectors.locations]]
name = "cabin"
geometry = { local_bounds = { center = [200.0, 0.0, 0.0], half_extents = [5.0, 5.0, 5.0] } }
"#;

const PIER: LocationId = LocationId(0);
const MARKET: LocationId = LocationId(1);
const LIGHTHOUSE: LocationId = LocationId(2);
const HARBOR: SectorId = SectorId(0);

fn streaming() -> WorldStreaming {
    let descriptor = WorldDescriptor::from_toml_str(WORLD).unwrap();
    let world = World::from_descriptor(&descriptor).unwrap();
    let mut streaming = WorldStreaming::new(world, StreamingConfig::default());
    streaming.initialize();
    streaming.world_mut().drain_events();
    streaming
}

fn everything(_: &Bounds) -> bool {
    true
}

fn nothing(_: &Bounds) -> bool {
    false
}

/// Loading twice spawns once; disposing an unloaded location does nothing
#[test]
fn load_and_dispose_are_idempotent() {
    let mut streaming = streaming();
    let mut pool = ActorPool::recording();
    let world = streaming.world_mut();

    world.load_location(PIER, &mut pool);
    let first: HashSet<_> = world.location(PIER).unwrap().spawned().values().copied().collect();
    world.load_location(PIER, &mut pool);
    let second: HashSet<_> = world.location(PIER).unwrap().spawned().values().copied().collect();
    assert_eq!(first, second);
    assert_eq!(pool.active_count(), 2);

    world.dispose_location(PIER, &mut pool);
    pool.clear_calls();
    world.drain_events();

    world.dispose_location(PIER, &mut pool);
    assert!(pool.calls().is_empty());
    assert!(world.pending_events().is_empty());
}

/// Walking from pier to market exits pier once and enters market once
#[test]
fn containment_changes_raise_enter_and_exit_once() {
    let mut streaming = streaming();
    let mut pool = ActorPool::new();
    let mut player = TrackedPoint(Vec3::new(-2.0, 0.0, 0.0));

    streaming.tick(0.01, &mut pool, &mut player, &nothing);
    // Shared boundary of pier and market: both contain the point
    player.0 = Vec3::new(5.0, 0.0, 0.0);
    streaming.tick(0.01, &mut pool, &mut player, &nothing);
    streaming.world_mut().drain_events();

    player.0 = Vec3::new(12.0, 0.0, 0.0);
    streaming.tick(0.01, &mut pool, &mut player, &nothing);

    let events = streaming.world_mut().drain_events();
    let count = |node: NodeId, kind: WorldEventType| {
        events.iter().filter(|e| e.node == node && e.event_type == kind).count()
    };
    assert_eq!(count(PIER.into(), WorldEventType::Exit), 1);
    assert_eq!(count(PIER.into(), WorldEventType::Enter), 0);
    assert_eq!(count(MARKET.into(), WorldEventType::Enter), 0);
    assert_eq!(count(MARKET.into(), WorldEventType::Exit), 0);
    assert_eq!(count(HARBOR.into(), WorldEventType::Exit), 0);
    assert_eq!(streaming.regions().current_locations(), &[MARKET]);
}

/// Graphics go off before dispose and on after load
#[test]
fn visibility_changes_order_graphics_around_load() {
    let mut streaming = streaming();
    let mut pool = ActorPool::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    streaming
        .world_mut()
        .set_event_handler(Box::new(move |event: &WorldEvent| sink.lock().push(*event)));

    // Park the tracked point in the lighthouse so the harbor is only driven by visibility
    let mut player = TrackedPoint(Vec3::new(40.0, 0.0, 0.0));
    let harbor_only = |b: &Bounds| b.intersects(&Bounds::new(Vec3::ZERO, Vec3::splat(1.0)));

    streaming.tick(0.5, &mut pool, &mut player, &harbor_only);
    streaming.tick(0.5, &mut pool, &mut player, &nothing);

    let harbor: Vec<WorldEventType> = log
        .lock()
        .iter()
        .filter(|e| e.node == NodeId::Sector(HARBOR))
        .map(|e| e.event_type)
        .collect();
    let position = |kind: WorldEventType| harbor.iter().position(|&k| k == kind).unwrap();

    assert!(position(WorldEventType::Load) < position(WorldEventType::GraphicsOn));
    assert!(position(WorldEventType::GraphicsOff) < position(WorldEventType::Dispose));
    assert!(!streaming.world().sector(HARBOR).unwrap().is_loaded());
}

/// Saved poses come back; unknown names are not found
#[test]
fn object_poses_round_trip() {
    let mut streaming = streaming();
    let pose = Pose::new(Vec3::new(3.0, 1.0, -2.0), glam::Quat::from_rotation_y(1.0));
    let pier = streaming.world_mut().location_mut(PIER).unwrap();

    assert_eq!(pier.try_get_object_pose("crate_a"), None);
    pier.save_object_pose("crate_a", pose);
    assert_eq!(pier.try_get_object_pose("crate_a"), Some(pose));
    assert_eq!(pier.try_get_object_pose("crate_b"), None);
}

/// A displaced entity is put back where it was left after a reload
#[test]
fn displaced_entity_is_restored_after_reload() {
    let mut streaming = streaming();
    let mut pool = ActorPool::new();
    let world = streaming.world_mut();

    world.load_location(PIER, &mut pool);
    let handle = world.location(PIER).unwrap().spawned()["crate_a"];
    let moved = Pose::at(Vec3::new(4.0, 0.0, 4.0));
    pool.move_entity(handle, moved);

    world.dispose_location(PIER, &mut pool);
    world.load_location(PIER, &mut pool);

    let handle = world.location(PIER).unwrap().spawned()["crate_a"];
    assert_eq!(pool.entity(handle).unwrap().pose, moved);
}

/// Poses survive a save/restore boundary through the registry file
#[test]
fn poses_persist_through_registry_file() {
    let path = std::env::temp_dir().join("void_world_streaming_poses.bin");
    let pose = Pose::at(Vec3::new(-1.0, 0.5, 2.0));

    let mut streaming = streaming();
    streaming
        .world_mut()
        .location_mut(MARKET)
        .unwrap()
        .save_object_pose("stall", pose);
    let mut registry = PoseRegistry::new();
    streaming.world().persist_poses(&mut registry);
    registry.save(&path).unwrap();

    let loaded = PoseRegistry::load(&path).unwrap();
    let mut fresh = self::streaming();
    fresh.world_mut().restore_poses(&loaded);
    assert_eq!(
        fresh.world().location(MARKET).unwrap().try_get_object_pose("stall"),
        Some(pose)
    );

    let _ = std::fs::remove_file(&path);
}

struct Boat {
    id: ActorId,
    position: Vec3,
    visible: bool,
    out_of_sector: bool,
    sector_loaded: bool,
    unloads: u32,
}

impl MovingActor for Boat {
    fn actor_id(&self) -> ActorId {
        self.id
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(self.position, Vec3::splat(1.0))
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_out_of_sector(&self) -> bool {
        self.out_of_sector
    }

    fn is_sector_loaded(&self) -> bool {
        self.sector_loaded
    }

    fn unload_if_out_of_bounds(&mut self) {
        self.unloads += 1;
    }
}

fn boat(id: u64) -> Arc<Mutex<Boat>> {
    Arc::new(Mutex::new(Boat {
        id: ActorId(id),
        position: Vec3::ZERO,
        visible: false,
        out_of_sector: false,
        sector_loaded: true,
        unloads: 0,
    }))
}

/// Hidden with a loaded sector stays in view; hidden and stranded is unloaded two ticks later
#[test]
fn moving_actor_unloads_after_grace_tick() {
    let mut actors = VisibleActorsManager::new(0.5, 0.0, 1);
    let occluded = boat(1);
    let stranded = boat(2);
    for b in [&occluded, &stranded] {
        let shared: SharedActor = b.clone();
        actors.add_acting_object(&shared);
    }
    let visible = |b: &Bounds| b.contains(Vec3::ZERO);

    // Tick N: both in view
    actors.tick(&visible);
    assert!(occluded.lock().visible && stranded.lock().visible);

    // Tick N+1: both leave view; only the stranded one has an unloaded sector
    for b in [&occluded, &stranded] {
        let mut b = b.lock();
        b.position = Vec3::splat(100.0);
        b.out_of_sector = true;
    }
    stranded.lock().sector_loaded = false;
    actors.tick(&visible);
    assert_eq!(actors.state_of(ActorId(1)), Some(ActorViewState::InPlayerView));
    assert_eq!(actors.state_of(ActorId(2)), Some(ActorViewState::OutsidePlayerView));

    // Tick N+2: the stranded one is asked to unload
    assert_eq!(actors.tick(&visible), 1);
    assert_eq!(actors.state_of(ActorId(2)), Some(ActorViewState::ActorsToUnload));
    assert_eq!(stranded.lock().unloads, 1);
    assert_eq!(occluded.lock().unloads, 0);
}

/// Coming back into view rescues an actor before it is unloaded
#[test]
fn moving_actor_rescued_by_view() {
    let mut actors = VisibleActorsManager::new(0.5, 0.0, 1);
    let b = boat(7);
    let shared: SharedActor = b.clone();
    actors.add_acting_object(&shared);
    {
        let mut boat = b.lock();
        boat.position = Vec3::splat(100.0);
        boat.out_of_sector = true;
        boat.sector_loaded = false;
    }
    let visible = |bounds: &Bounds| bounds.contains(Vec3::ZERO);

    actors.tick(&visible);
    assert_eq!(actors.state_of(ActorId(7)), Some(ActorViewState::OutsidePlayerView));

    b.lock().position = Vec3::ZERO;
    assert_eq!(actors.tick(&visible), 0);
    assert_eq!(actors.state_of(ActorId(7)), Some(ActorViewState::InPlayerView));
    assert!(b.lock().visible);
    assert_eq!(b.lock().unloads, 0);
}

/// Actors are ticked by the service at their own cadence
#[test]
fn service_ticks_tracked_actors() {
    let mut streaming = streaming();
    let mut pool = ActorPool::new();
    let mut player = TrackedPoint(Vec3::ZERO);
    let b = boat(3);
    let shared: SharedActor = b.clone();
    assert_eq!(streaming.actors_mut().add_acting_objects([&shared]), 1);

    streaming.tick(0.1, &mut pool, &mut player, &everything);
    assert!(!b.lock().visible);

    streaming.tick(0.6, &mut pool, &mut player, &everything);
    assert!(b.lock().visible);
    assert_eq!(streaming.stats().actors_in_view, 1);
}

/// Outside every sector for longer than the interval: back to the last safe point
#[test]
fn tracked_point_returns_to_safe_position() {
    let mut streaming = streaming();
    let mut pool = ActorPool::new();
    let mut player = TrackedPoint(Vec3::new(9.0, 0.0, 0.0));
    streaming.tick(0.25, &mut pool, &mut player, &everything);
    player.0 = Vec3::new(11.0, 0.0, 0.0);
    streaming.tick(0.25, &mut pool, &mut player, &everything);

    // Gap between harbor and cliffs
    player.0 = Vec3::new(25.0, 0.0, 0.0);
    for _ in 0..3 {
        streaming.tick(0.25, &mut pool, &mut player, &everything);
        assert_eq!(player.0, Vec3::new(25.0, 0.0, 0.0));
    }
    streaming.tick(0.25, &mut pool, &mut player, &everything);

    assert_eq!(player.0, Vec3::new(11.0, 0.0, 0.0));
    assert_eq!(streaming.regions().current_locations(), &[MARKET]);
}

/// A point strictly inside one region never resolves to the other
#[test]
fn region_queries_respect_authored_regions() {
    let streaming = streaming();
    let coordinator = RegionCoordinator::new(streaming.world());
    let coast = RegionId(0);
    let inland = RegionId(1);

    for x in [-4.0, 0.0, 10.0, 40.0, 44.0] {
        assert_eq!(coordinator.region_from_point(Vec3::new(x, 0.0, 0.0)), Some(coast));
    }
    for x in [196.0, 200.0, 204.0] {
        assert_eq!(coordinator.region_from_point(Vec3::new(x, 0.0, 0.0)), Some(inland));
    }
    assert_eq!(coordinator.region_from_point(Vec3::new(100.0, 0.0, 0.0)), None);
}

/// Teleporting loads the target sector eagerly and switches regions
#[test]
fn teleport_loads_target_and_releases_previous_region() {
    let mut streaming = streaming();
    let mut pool = ActorPool::new();
    let mut player = TrackedPoint(Vec3::ZERO);
    streaming.tick(0.5, &mut pool, &mut player, &everything);
    assert!(streaming.world().location(PIER).unwrap().is_loaded());

    let target = Vec3::new(200.0, 0.0, 0.0);
    assert!(streaming.load_location_on_position(target, &mut pool));
    player.0 = target;
    // Only the inland region is on screen after the jump
    let inland_only = |b: &Bounds| b.center.x > 100.0;
    streaming.tick(0.5, &mut pool, &mut player, &inland_only);

    let world = streaming.world();
    assert!(!world.location(PIER).unwrap().is_loaded());
    assert!(!world.location(LIGHTHOUSE).unwrap().is_loaded());
    assert!(world.sector(SectorId(2)).unwrap().is_loaded());
    assert_eq!(streaming.regions().current_region(), Some(RegionId(1)));
    assert_eq!(pool.active_count(), 0);
}
