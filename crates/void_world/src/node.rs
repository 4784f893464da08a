//! Hierarchy node identifiers and the shared node interface

use crate::bounds::Bounds;
use crate::host::ActorHost;
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

macro_rules! node_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Arena index
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

node_id!(
    /// Top-tier container
    RegionId,
    "region"
);
node_id!(
    /// Mid-tier container
    SectorId,
    "sector"
);
node_id!(
    /// Leaf cell
    LocationId,
    "location"
);

/// A node of any tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeId {
    Region(RegionId),
    Sector(SectorId),
    Location(LocationId),
}

impl NodeId {
    /// Check if this is a sector
    pub fn as_sector(self) -> Option<SectorId> {
        match self {
            Self::Sector(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region(id) => write!(f, "{}", id),
            Self::Sector(id) => write!(f, "{}", id),
            Self::Location(id) => write!(f, "{}", id),
        }
    }
}

impl From<RegionId> for NodeId {
    fn from(id: RegionId) -> Self {
        Self::Region(id)
    }
}

impl From<SectorId> for NodeId {
    fn from(id: SectorId) -> Self {
        Self::Sector(id)
    }
}

impl From<LocationId> for NodeId {
    fn from(id: LocationId) -> Self {
        Self::Location(id)
    }
}

/// Shared interface of the three tiers
pub trait HierarchyNode: Copy + Eq + Hash + fmt::Debug {
    /// World-space bounding volume
    fn bounds(self, world: &World) -> Bounds;

    /// Tracked point entered the node
    fn enter(self, world: &mut World, host: &mut dyn ActorHost);

    /// Tracked point left the node
    fn exit(self, world: &mut World, host: &mut dyn ActorHost);
}

impl HierarchyNode for RegionId {
    fn bounds(self, world: &World) -> Bounds {
        world.region(self).map_or(Bounds::EMPTY, |r| r.bounds())
    }

    fn enter(self, world: &mut World, _host: &mut dyn ActorHost) {
        world.enter_region(self);
    }

    fn exit(self, world: &mut World, host: &mut dyn ActorHost) {
        world.exit_region(self, host);
    }
}

impl HierarchyNode for SectorId {
    fn bounds(self, world: &World) -> Bounds {
        world.sector(self).map_or(Bounds::EMPTY, |s| s.bounds())
    }

    fn enter(self, world: &mut World, _host: &mut dyn ActorHost) {
        world.enter_sector(self);
    }

    fn exit(self, world: &mut World, _host: &mut dyn ActorHost) {
        world.exit_sector(self);
    }
}

impl HierarchyNode for LocationId {
    fn bounds(self, world: &World) -> Bounds {
        world.location(self).map_or(Bounds::EMPTY, |l| l.bounds())
    }

    fn enter(self, world: &mut World, host: &mut dyn ActorHost) {
        world.enter_location(self, host);
    }

    fn exit(self, world: &mut World, _host: &mut dyn ActorHost) {
        world.exit_location(self);
    }
}
