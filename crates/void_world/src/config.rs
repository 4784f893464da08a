//! Streaming cadences
//!
//! ```toml
//! reposition_interval = 1.0   # seconds outside every sector before relocation
//! visibility_interval = 0.25  # seconds between visibility passes
//! actor_tick_interval = 0.5   # base interval of the moving-actor tick
//! actor_tick_jitter = 0.1     # max random extra per actor tick
//! jitter_seed = 24301
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Timers of the streaming service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Grace interval before the tracked point is moved back to safety
    pub reposition_interval: f32,
    /// Cadence of the visibility pass
    pub visibility_interval: f32,
    /// Base interval of the moving-actor tick
    pub actor_tick_interval: f32,
    /// Maximum random jitter added to each actor tick interval
    pub actor_tick_jitter: f32,
    /// Seed of the jitter RNG
    pub jitter_seed: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            reposition_interval: 1.0,
            visibility_interval: 0.25,
            actor_tick_interval: 0.5,
            actor_tick_jitter: 0.1,
            jitter_seed: 0x5EED,
        }
    }
}

impl StreamingConfig {
    /// Parse from TOML; missing fields keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        Ok(config.sanitized())
    }

    /// Clamp negative or non-finite values
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fix = |value: f32, fallback: f32| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                log::warn!("Invalid streaming interval {}, using {}", value, fallback);
                fallback
            }
        };
        self.reposition_interval = fix(self.reposition_interval, defaults.reposition_interval);
        self.visibility_interval = fix(self.visibility_interval, defaults.visibility_interval);
        self.actor_tick_interval = fix(self.actor_tick_interval, defaults.actor_tick_interval);
        self.actor_tick_jitter = fix(self.actor_tick_jitter, defaults.actor_tick_jitter);
        self
    }
}
