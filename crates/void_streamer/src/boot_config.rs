//! Boot Configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Command line: first positional argument
//! 2. Environment variable: `VOID_STREAMER_CONFIG=/path/to/streamer.toml`
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! [streaming]
//! reposition_interval = 1.0
//! visibility_interval = 0.25
//!
//! # relative to this file
//! [world]
//! descriptor = "world.toml"
//! poses = "poses.bin"
//!
//! [simulation]
//! tick_rate = 60.0
//! ticks = 1200
//! camera_path = [[0.0, 2.0, 0.0], [120.0, 2.0, 0.0]]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use void_world::StreamingConfig;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "VOID_STREAMER_CONFIG";

/// Boot configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// World data locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World descriptor (TOML or JSON)
    pub descriptor: PathBuf,
    /// Pose registry file, read on boot and written on exit
    pub poses: PathBuf,
}

impl WorldConfig {
    /// Anchor relative paths at `base` (the config file's directory)
    pub fn resolve_relative(&mut self, base: &Path) {
        if self.descriptor.is_relative() {
            self.descriptor = base.join(&self.descriptor);
        }
        if self.poses.is_relative() {
            self.poses = base.join(&self.poses);
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        Self {
            descriptor: assets.join("world.toml"),
            poses: std::env::temp_dir().join("void_streamer_poses.bin"),
        }
    }
}

/// Scripted run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation steps per second
    pub tick_rate: f32,
    /// Number of steps to run
    pub ticks: u32,
    /// Waypoints walked by the tracked point, camera follows
    pub camera_path: Vec<[f32; 3]>,
    /// Far plane and visibility cut-off
    pub view_distance: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Number of drifting moving actors
    pub drifters: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            ticks: 1200,
            camera_path: vec![[0.0, 2.0, 0.0], [60.0, 2.0, 0.0], [130.0, 2.0, 10.0]],
            view_distance: 60.0,
            fov_degrees: 60.0,
            drifters: 4,
        }
    }
}

/// Complete boot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Streaming cadences
    pub streaming: StreamingConfig,
    /// World data locations
    pub world: WorldConfig,
    /// Scripted run
    pub simulation: SimulationConfig,
    /// Config file path (for reloading)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl BootConfig {
    /// Load boot configuration from all sources
    pub fn load(cli_path: Option<&str>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_ENV).ok().filter(|p| !p.is_empty());
        Self::resolve(cli_path.map(PathBuf::from), env_path.map(PathBuf::from))
    }

    fn resolve(cli_path: Option<PathBuf>, env_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let Some(path) = cli_path.or(env_path) else {
            log::info!("No boot config given, using defaults");
            return Ok(Self::default());
        };

        let mut config = Self::load_from_file(&path)?;
        config.config_path = Some(path.clone());
        log::info!("Loaded boot config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// World paths in the file are relative to the file itself.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(dir) = path.parent() {
            config.world.resolve_relative(dir);
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.streaming = config.streaming.sanitized();
        if config.simulation.tick_rate <= 0.0 {
            log::warn!("tick_rate {} is not positive, using 60", config.simulation.tick_rate);
            config.simulation.tick_rate = 60.0;
        }
        Ok(config)
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("=== Streamer Configuration ===");
        log::info!("Descriptor: {}", self.world.descriptor.display());
        log::info!("Poses: {}", self.world.poses.display());
        log::info!(
            "Streaming: visibility every {}s, reposition after {}s, actors every {}s (+{}s)",
            self.streaming.visibility_interval,
            self.streaming.reposition_interval,
            self.streaming.actor_tick_interval,
            self.streaming.actor_tick_jitter
        );
        log::info!(
            "Simulation: {} ticks at {} Hz, {} waypoints, {} drifters",
            self.simulation.ticks,
            self.simulation.tick_rate,
            self.simulation.camera_path.len(),
            self.simulation.drifters
        );
        if let Some(path) = &self.config_path {
            log::info!("Config file: {}", path.display());
        }
        log::info!("==============================");
    }
}
