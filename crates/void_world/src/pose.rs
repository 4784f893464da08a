//! Persisted spawn-point poses
//!
//! Poses are keyed by spawn node name inside a location, and locations are
//! keyed by their stable hierarchical path (`region/sector/location`).

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Current pose registry file version
pub const POSE_FORMAT_VERSION: u32 = 1;

/// Position plus rotation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    /// Create a pose
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Unrotated pose at a position
    pub const fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Poses of one location, by spawn node name
pub type PoseMap = HashMap<String, Pose>;

/// Persistence collaborator keyed by location path
pub trait PoseStore {
    /// Poses recorded for a location, if any
    fn try_get_poses_for_path(&self, path: &str) -> Option<&PoseMap>;

    /// Poses for a location, created empty on first use
    fn add_poses_for_path(&mut self, path: &str) -> &mut PoseMap;
}

/// Pose registry errors
#[derive(Debug, Error)]
pub enum PoseStoreError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// File written by a newer build
    #[error("Version mismatch: file version {0}, supported version {1}")]
    VersionMismatch(u32, u32),
}

/// On-disk encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoseFormat {
    /// JSON (human readable)
    Json,
    /// Binary (compact)
    #[default]
    Binary,
}

impl PoseFormat {
    /// Pick the format from a file extension (`.json` or anything else)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            _ => Self::Binary,
        }
    }
}

/// In-memory pose store with file save/load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseRegistry {
    version: u32,
    paths: HashMap<String, PoseMap>,
}

impl PoseRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            version: POSE_FORMAT_VERSION,
            paths: HashMap::new(),
        }
    }

    /// Number of locations with recorded poses
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Forget a location's poses
    pub fn remove_path(&mut self, path: &str) -> Option<PoseMap> {
        self.paths.remove(path)
    }

    /// Encode to bytes
    pub fn to_bytes(&self, format: PoseFormat) -> Result<Vec<u8>, PoseStoreError> {
        match format {
            PoseFormat::Json => serde_json::to_vec_pretty(self)
                .map_err(|e| PoseStoreError::Serialization(e.to_string())),
            PoseFormat::Binary => {
                bincode::serialize(self).map_err(|e| PoseStoreError::Serialization(e.to_string()))
            }
        }
    }

    /// Decode from bytes
    pub fn from_bytes(bytes: &[u8], format: PoseFormat) -> Result<Self, PoseStoreError> {
        let registry: Self = match format {
            PoseFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| PoseStoreError::Deserialization(e.to_string()))?,
            PoseFormat::Binary => bincode::deserialize(bytes)
                .map_err(|e| PoseStoreError::Deserialization(e.to_string()))?,
        };

        if registry.version > POSE_FORMAT_VERSION {
            return Err(PoseStoreError::VersionMismatch(
                registry.version,
                POSE_FORMAT_VERSION,
            ));
        }

        Ok(registry)
    }

    /// Write to a file, format chosen by extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PoseStoreError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_bytes(PoseFormat::from_path(path))?)?;
        log::debug!("Saved poses for {} locations to {}", self.paths.len(), path.display());
        Ok(())
    }

    /// Read from a file, format chosen by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PoseStoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes, PoseFormat::from_path(path))
    }
}

impl Default for PoseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseStore for PoseRegistry {
    fn try_get_poses_for_path(&self, path: &str) -> Option<&PoseMap> {
        self.paths.get(path)
    }

    fn add_poses_for_path(&mut self, path: &str) -> &mut PoseMap {
        self.paths.entry(path.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn sample() -> PoseRegistry {
        let mut registry = PoseRegistry::new();
        registry.add_poses_for_path("coast/harbor/pier").insert(
            "crate_01".to_string(),
            Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.5)),
        );
        registry
    }

    #[test]
    fn test_add_and_get() {
        let registry = sample();
        assert_eq!(registry.len(), 1);
        assert!(registry.try_get_poses_for_path("coast/harbor/pier").is_some());
        assert!(registry.try_get_poses_for_path("coast/harbor/dock").is_none());
    }

    #[test]
    fn test_json_file_roundtrip() {
        let path = temp_dir().join("void_world_pose_test").join("poses.json");
        let registry = sample();

        registry.save(&path).unwrap();
        let loaded = PoseRegistry::load(&path).unwrap();
        assert_eq!(loaded, registry);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_rejects_newer_version() {
        let mut registry = sample();
        registry.version = POSE_FORMAT_VERSION + 1;
        let bytes = registry.to_bytes(PoseFormat::Binary).unwrap();

        match PoseRegistry::from_bytes(&bytes, PoseFormat::Binary) {
            Err(PoseStoreError::VersionMismatch(found, supported)) => {
                assert_eq!(found, POSE_FORMAT_VERSION + 1);
                assert_eq!(supported, POSE_FORMAT_VERSION);
            }
            other => panic!("expected version mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(PoseRegistry::from_bytes(b"not json", PoseFormat::Json).is_err());
    }
}
