//! Stateless spatial queries over the registered hierarchy

use crate::bounds::Bounds;
use crate::frustum::VisibilityPredicate;
use crate::node::{LocationId, NodeId, RegionId, SectorId};
use crate::world::World;
use glam::Vec3;

/// Point and visibility queries
///
/// Only registered (initialized) regions are searched. Queries against an
/// empty registry return empty results.
#[derive(Clone, Copy)]
pub struct RegionCoordinator<'w> {
    world: &'w World,
}

impl<'w> RegionCoordinator<'w> {
    /// Query a world
    pub fn new(world: &'w World) -> Self {
        Self { world }
    }

    /// First registered region containing the point
    ///
    /// Regions are not expected to overlap; with overlap the earliest
    /// registered one wins.
    pub fn region_from_point(&self, point: Vec3) -> Option<RegionId> {
        self.world
            .registered_regions()
            .iter()
            .copied()
            .find(|&id| self.world.region(id).is_some_and(|r| r.bounds().contains(point)))
    }

    /// Sectors containing the point (sectors may overlap)
    pub fn sectors_from_point(&self, point: Vec3, region: Option<RegionId>) -> Vec<SectorId> {
        let Some(region) = region.or_else(|| self.region_from_point(point)) else {
            return Vec::new();
        };
        let Some(region) = self.world.region(region) else {
            return Vec::new();
        };
        region
            .sectors()
            .iter()
            .copied()
            .filter(|&id| self.world.sector(id).is_some_and(|s| s.bounds().contains(point)))
            .collect()
    }

    /// Locations of the given (or derived) sectors containing the point
    pub fn locations_from_point(&self, point: Vec3, sectors: Option<&[SectorId]>) -> Vec<LocationId> {
        let derived;
        let sectors = match sectors {
            Some(sectors) => sectors,
            None => {
                derived = self.sectors_from_point(point, None);
                &derived
            }
        };

        sectors
            .iter()
            .filter_map(|&id| self.world.sector(id))
            .flat_map(|s| s.locations().iter().copied())
            .filter(|&id| self.world.location(id).is_some_and(|l| l.bounds().contains(point)))
            .collect()
    }

    /// Every node passing the predicate, walked top-down
    ///
    /// A node that fails the predicate hides its whole subtree: its children
    /// are neither tested nor included. Uninitialized or empty nodes never
    /// reach the predicate.
    pub fn visible_set<P>(&self, predicate: &P) -> Vec<NodeId>
    where
        P: VisibilityPredicate + ?Sized,
    {
        let mut visible = Vec::new();
        for &region_id in self.world.registered_regions() {
            let Some(region) = self.world.region(region_id) else {
                continue;
            };
            if !region.is_initialized() || !is_visible(predicate, region.bounds()) {
                continue;
            }
            visible.push(NodeId::Region(region_id));

            for &sector_id in region.sectors() {
                let Some(sector) = self.world.sector(sector_id) else {
                    continue;
                };
                if !sector.is_initialized() || !is_visible(predicate, sector.bounds()) {
                    continue;
                }
                visible.push(NodeId::Sector(sector_id));

                for &location_id in sector.locations() {
                    let visible_location = self
                        .world
                        .location(location_id)
                        .is_some_and(|l| l.is_initialized() && is_visible(predicate, l.bounds()));
                    if visible_location {
                        visible.push(NodeId::Location(location_id));
                    }
                }
            }
        }
        visible
    }
}

fn is_visible<P>(predicate: &P, bounds: Bounds) -> bool
where
    P: VisibilityPredicate + ?Sized,
{
    !bounds.is_empty() && predicate.is_volume_visible(&bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::{Bounds, LocalGeometry};
    use crate::location::Location;
    use crate::region::Region;
    use crate::sector::Sector;
    use std::cell::RefCell;

    fn cell(name: &str, center: Vec3, half: f32) -> Location {
        Location::new(name).with_geometry(LocalGeometry::world(Bounds::new(center, Vec3::splat(half))))
    }

    /// Two regions side by side; the east region has overlapping sectors
    fn world() -> World {
        let mut world = World::new();

        let west = world.add_region(Region::new("west")).unwrap();
        let farm = world.add_sector(west, Sector::new("farm")).unwrap();
        world.add_location(farm, cell("barn", Vec3::new(-20.0, 0.0, 0.0), 5.0)).unwrap();
        world.add_location(farm, cell("field", Vec3::new(-10.0, 0.0, 0.0), 5.0)).unwrap();

        let east = world.add_region(Region::new("east")).unwrap();
        let town = world.add_sector(east, Sector::new("town")).unwrap();
        world.add_location(town, cell("square", Vec3::new(20.0, 0.0, 0.0), 5.0)).unwrap();
        let walls = world.add_sector(east, Sector::new("walls")).unwrap();
        world.add_location(walls, cell("gate", Vec3::new(22.0, 0.0, 0.0), 5.0)).unwrap();

        world.initialize_all();
        world
    }

    #[test]
    fn test_empty_registry_returns_nothing() {
        let world = World::new();
        let coordinator = RegionCoordinator::new(&world);
        assert_eq!(coordinator.region_from_point(Vec3::ZERO), None);
        assert!(coordinator.sectors_from_point(Vec3::ZERO, None).is_empty());
        assert!(coordinator.locations_from_point(Vec3::ZERO, None).is_empty());
        assert!(coordinator.visible_set(&|_: &Bounds| true).is_empty());
    }

    #[test]
    fn test_uninitialized_regions_are_not_searched() {
        let mut world = World::new();
        let region = world.add_region(Region::new("r")).unwrap();
        let sector = world.add_sector(region, Sector::new("s")).unwrap();
        world.add_location(sector, cell("l", Vec3::ZERO, 5.0)).unwrap();

        assert_eq!(RegionCoordinator::new(&world).region_from_point(Vec3::ZERO), None);
    }

    #[test]
    fn test_region_from_point() {
        let world = world();
        let coordinator = RegionCoordinator::new(&world);
        assert_eq!(coordinator.region_from_point(Vec3::new(-12.0, 0.0, 0.0)), Some(RegionId(0)));
        assert_eq!(coordinator.region_from_point(Vec3::new(21.0, 0.0, 0.0)), Some(RegionId(1)));
        assert_eq!(coordinator.region_from_point(Vec3::new(0.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_overlapping_sectors() {
        let world = world();
        let coordinator = RegionCoordinator::new(&world);
        let point = Vec3::new(21.0, 0.0, 0.0);

        let sectors = coordinator.sectors_from_point(point, None);
        assert_eq!(sectors, vec![SectorId(1), SectorId(2)]);

        let locations = coordinator.locations_from_point(point, Some(&sectors));
        assert_eq!(locations, vec![LocationId(2), LocationId(3)]);
        assert_eq!(coordinator.locations_from_point(point, None), locations);
    }

    #[test]
    fn test_visible_set_short_circuits() {
        let world = world();
        let coordinator = RegionCoordinator::new(&world);
        let tested = RefCell::new(Vec::new());

        // Only the west half of the world is "on screen"
        let predicate = |b: &Bounds| {
            tested.borrow_mut().push(b.center);
            b.center.x < 0.0
        };
        let visible = coordinator.visible_set(&predicate);

        assert_eq!(
            visible,
            vec![
                NodeId::Region(RegionId(0)),
                NodeId::Sector(SectorId(0)),
                NodeId::Location(LocationId(0)),
                NodeId::Location(LocationId(1)),
            ]
        );
        // The east region failed, so none of its sectors were tested
        assert!(tested.borrow().iter().all(|c| c.x < 0.0 || c.x > 15.0));
        assert_eq!(tested.borrow().len(), 5);
    }

    #[test]
    fn test_empty_nodes_are_never_visible() {
        let mut world = world();
        let empty = world.add_region(Region::new("empty")).unwrap();
        world.add_sector(empty, Sector::new("bare")).unwrap();
        let east = RegionId(1);
        world.add_sector(east, Sector::new("hollow")).unwrap();
        world.initialize_all();

        let coordinator = RegionCoordinator::new(&world);
        let visible = coordinator.visible_set(&|_: &Bounds| true);

        assert!(!visible.contains(&NodeId::Region(empty)));
        assert!(!visible.contains(&NodeId::Sector(SectorId(3))));
        assert!(!visible.contains(&NodeId::Sector(SectorId(4))));
        assert!(visible.contains(&NodeId::Region(east)));
        assert_eq!(visible.len(), 9);
    }
}
