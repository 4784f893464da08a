//! Error types for world building

use crate::node::{RegionId, SectorId};
use thiserror::Error;

/// World building errors
///
/// Streaming itself never fails; these only come out of authoring data.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Parent region does not exist
    #[error("Unknown region: {0}")]
    UnknownRegion(RegionId),
    /// Parent sector does not exist
    #[error("Unknown sector: {0}")]
    UnknownSector(SectorId),
    /// Two siblings share a name, so their persistence paths would collide
    #[error("Duplicate node path: {0}")]
    DuplicatePath(String),
    /// Descriptor could not be parsed
    #[error("Descriptor parse error: {0}")]
    Parse(String),
    /// Descriptor file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for WorldError {
    fn from(e: toml::de::Error) -> Self {
        WorldError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for WorldError {
    fn from(e: serde_json::Error) -> Self {
        WorldError::Parse(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WorldError>;
