//! World Streamer
//!
//! Headless driver for the world streaming service. It:
//! - Loads a world descriptor and the saved pose registry
//! - Walks a tracked point along a scripted camera path
//! - Streams regions, sectors and locations in and out with an in-process actor pool
//! - Recycles drifting moving actors that leave view
//! - Writes the pose registry back on exit
//!
//! Run with: cargo run -p void_streamer -- [path/to/streamer.toml]
//! e.g. `cargo run -p void_streamer -- crates/void_streamer/assets/streamer.toml`

mod boot_config;
mod camera;
mod drifters;

use boot_config::BootConfig;
use camera::{CameraPath, FollowCamera};
use drifters::DrifterHerd;
use glam::Vec3;
use std::error::Error;
use void_world::{ActorPool, PoseRegistry, TrackedPoint, World, WorldDescriptor, WorldEvent, WorldStreaming};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let cli_path = std::env::args().skip(1).find(|arg| !arg.starts_with("--"));
    let config = match BootConfig::load(cli_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load boot config: {}", e);
            std::process::exit(1);
        }
    };
    config.print_summary();

    if let Err(e) = run(&config) {
        log::error!("Streamer failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &BootConfig) -> Result<(), Box<dyn Error>> {
    let descriptor = WorldDescriptor::load(&config.world.descriptor)?;
    let mut world = World::from_descriptor(&descriptor)?;
    world.set_event_handler(Box::new(|event: &WorldEvent| {
        log::debug!("{:?} {}", event.event_type, event.node);
    }));

    let mut registry = load_poses(config);
    world.restore_poses(&registry);

    let mut streaming = WorldStreaming::new(world, config.streaming.clone());
    streaming.initialize();

    let sim = &config.simulation;
    let path = CameraPath::new(sim.camera_path.iter().copied().map(Vec3::from));
    let camera = FollowCamera {
        fov_degrees: sim.fov_degrees,
        aspect: 16.0 / 9.0,
        view_distance: sim.view_distance,
    };

    let mut pool = ActorPool::new();
    let start = path.sample(0.0);
    let mut player = TrackedPoint(start);
    if !streaming.load_location_on_position(start, &mut pool) {
        log::warn!("Camera path starts outside every sector");
    }

    let mut herd = DrifterHerd::spawn(streaming.world(), sim.drifters);
    herd.register(streaming.actors_mut());
    log::info!("Spawned {} drifters", herd.len());

    let dt = 1.0 / sim.tick_rate;
    let report_every = (sim.tick_rate.round() as u32).max(1);
    let mut released = 0;

    for tick in 0..sim.ticks {
        let t = tick as f32 / sim.ticks.max(1) as f32;
        let heading = path.heading(t);
        player.0 = path.sample(t);

        let visibility = camera.visibility(player.0, heading);
        herd.step(dt, streaming.world());
        streaming.tick(dt, &mut pool, &mut player, &visibility);
        released += herd.collect_released(streaming.actors_mut());
        streaming.world_mut().drain_events();

        if tick % report_every == 0 {
            log::info!("[{:>5}] {:?} {}", tick, player.0, streaming.stats());
        }
    }

    streaming.teardown(&mut pool);
    streaming.world().persist_poses(&mut registry);
    registry.save(&config.world.poses)?;

    log::info!(
        "Done: {} drifters released, {} pooled entities, poses for {} locations saved to {}",
        released,
        pool.pooled_count(),
        registry.len(),
        config.world.poses.display()
    );
    Ok(())
}

/// Saved poses, or an empty registry on first run
fn load_poses(config: &BootConfig) -> PoseRegistry {
    if !config.world.poses.exists() {
        return PoseRegistry::new();
    }
    match PoseRegistry::load(&config.world.poses) {
        Ok(registry) => {
            log::info!("Restored poses for {} locations", registry.len());
            registry
        }
        Err(e) => {
            log::warn!("Ignoring unreadable pose file {}: {}", config.world.poses.display(), e);
            PoseRegistry::new()
        }
    }
}
