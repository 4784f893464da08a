//! Authoring descriptor for building a world from JSON or TOML
//!
//! ```toml
//! [[regions]]
//! name = "coast"
//!
//! [[regions.sectors]]
//! name = "harbor"
//!
//! [[regions.sectors.locations]]
//! name = "pier"
//! geometry = { local_bounds = { center = [0.0, 0.0, 0.0], half_extents = [5.0, 5.0, 5.0] } }
//!
//! [[regions.sectors.locations.spawns]]
//! template = "crate"
//! targets = [{ name = "crate_a", pose = { position = [1.0, 0.0, 0.0] } }]
//! ```

use crate::bounds::LocalGeometry;
use crate::error::Result;
use crate::host::{ActorSpawnPreset, SceneNode};
use crate::location::Location;
use crate::region::Region;
use crate::sector::Sector;
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Whole-world authoring data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldDescriptor {
    #[serde(default)]
    pub regions: Vec<RegionDescriptor>,
    /// Locations owned by no sector
    #[serde(default)]
    pub standalone: Vec<LocationDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    pub name: String,
    #[serde(default)]
    pub geometry: Option<LocalGeometry>,
    #[serde(default)]
    pub static_nodes: Vec<SceneNode>,
    #[serde(default)]
    pub sectors: Vec<SectorDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorDescriptor {
    pub name: String,
    #[serde(default)]
    pub geometry: Option<LocalGeometry>,
    #[serde(default)]
    pub static_nodes: Vec<SceneNode>,
    #[serde(default)]
    pub locations: Vec<LocationDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDescriptor {
    pub name: String,
    #[serde(default)]
    pub geometry: Option<LocalGeometry>,
    #[serde(default)]
    pub static_nodes: Vec<SceneNode>,
    #[serde(default)]
    pub spawns: Vec<ActorSpawnPreset>,
}

impl LocationDescriptor {
    fn to_location(&self) -> Location {
        let mut location = Location::new(self.name.clone());
        location.geometry = self.geometry;
        location.static_nodes = self.static_nodes.clone();
        location.spawn_presets = self.spawns.clone();
        location
    }
}

impl WorldDescriptor {
    /// Parse a JSON descriptor
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parse a TOML descriptor
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a descriptor file, picking the parser by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }

    /// Build an uninitialized world
    pub fn build(&self) -> Result<World> {
        let mut world = World::new();

        for region_desc in &self.regions {
            let mut region = Region::new(region_desc.name.clone());
            region.geometry = region_desc.geometry;
            region.static_nodes = region_desc.static_nodes.clone();
            let region = world.add_region(region)?;

            for sector_desc in &region_desc.sectors {
                let mut sector = Sector::new(sector_desc.name.clone());
                sector.geometry = sector_desc.geometry;
                sector.static_nodes = sector_desc.static_nodes.clone();
                let sector = world.add_sector(region, sector)?;

                for location_desc in &sector_desc.locations {
                    world.add_location(sector, location_desc.to_location())?;
                }
            }
        }

        for location_desc in &self.standalone {
            world.add_standalone_location(location_desc.to_location())?;
        }

        log::info!(
            "Built world: {} regions, {} sectors, {} locations",
            world.regions().len(),
            world.sectors().len(),
            world.locations().len()
        );
        Ok(world)
    }
}

impl World {
    /// Build an uninitialized world from authoring data
    pub fn from_descriptor(descriptor: &WorldDescriptor) -> Result<Self> {
        descriptor.build()
    }
}
