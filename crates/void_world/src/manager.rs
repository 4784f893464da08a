//! Region manager - containment and visibility state machine
//!
//! Two independent passes drive the hierarchy:
//! - containment (every step): Enter/Exit on the sectors and locations that
//!   hold the tracked point, plus the safe-position fallback
//! - visibility (at its own cadence): Load/Dispose and graphics/logic
//!   switching of every node that passes the visibility predicate
//!
//! Exiting a location never unloads it; only leaving the visible set does.

use crate::config::StreamingConfig;
use crate::coordinator::RegionCoordinator;
use crate::frustum::VisibilityPredicate;
use crate::host::{ActorHost, TrackedEntity};
use crate::node::{HierarchyNode, LocationId, NodeId, RegionId, SectorId};
use crate::world::World;
use glam::Vec3;
use std::collections::HashSet;

/// Stateful orchestrator of the region hierarchy
#[derive(Debug, Clone)]
pub struct RegionManager {
    current_region: Option<RegionId>,
    current_sectors: Vec<SectorId>,
    current_locations: Vec<LocationId>,
    /// Mixed-tier visible set, parents before children
    visible: Vec<NodeId>,
    safe_position: Option<Vec3>,
    time_outside: f32,
    visibility_timer: f32,
    reposition_interval: f32,
    visibility_interval: f32,
}

impl RegionManager {
    /// Create a manager with the given cadences
    pub fn new(config: &StreamingConfig) -> Self {
        Self {
            current_region: None,
            current_sectors: Vec::new(),
            current_locations: Vec::new(),
            visible: Vec::new(),
            safe_position: None,
            time_outside: 0.0,
            // First update always runs a visibility pass
            visibility_timer: config.visibility_interval,
            reposition_interval: config.reposition_interval,
            visibility_interval: config.visibility_interval,
        }
    }

    pub fn current_region(&self) -> Option<RegionId> {
        self.current_region
    }

    /// Sectors containing the tracked point
    pub fn current_sectors(&self) -> &[SectorId] {
        &self.current_sectors
    }

    /// Locations containing the tracked point
    pub fn current_locations(&self) -> &[LocationId] {
        &self.current_locations
    }

    /// Nodes currently considered visible
    pub fn visible(&self) -> &[NodeId] {
        &self.visible
    }

    pub fn is_visible(&self, node: impl Into<NodeId>) -> bool {
        self.visible.contains(&node.into())
    }

    /// Last point at which the tracked entity was inside a sector
    pub fn safe_position(&self) -> Option<Vec3> {
        self.safe_position
    }

    /// Continuous time spent outside every sector
    pub fn time_outside(&self) -> f32 {
        self.time_outside
    }

    /// Run one simulation step: containment, then visibility at its cadence
    pub fn update(
        &mut self,
        dt: f32,
        world: &mut World,
        host: &mut dyn ActorHost,
        player: &mut dyn TrackedEntity,
        visibility: &dyn VisibilityPredicate,
    ) {
        self.update_player_position_with_reposition_delay(dt, world, host, player);
        self.update_visibility(dt, world, host, visibility);
    }

    /// Containment pass with the fall-through-the-world recovery
    ///
    /// The safe position follows the tracked point while it is inside at
    /// least one sector. Once the point has been outside every sector for
    /// `reposition_interval`, it is moved back to the safe position.
    pub fn update_player_position_with_reposition_delay(
        &mut self,
        dt: f32,
        world: &mut World,
        host: &mut dyn ActorHost,
        player: &mut dyn TrackedEntity,
    ) {
        let position = player.position();
        self.update_containment(position, world, host);

        if !self.current_sectors.is_empty() {
            self.safe_position = Some(position);
            self.time_outside = 0.0;
            return;
        }

        self.time_outside += dt;
        if self.time_outside < self.reposition_interval {
            return;
        }
        self.time_outside = 0.0;

        match self.safe_position {
            Some(safe) => {
                log::warn!(
                    "Tracked point {:?} outside every sector, relocating to {:?}",
                    position,
                    safe
                );
                player.set_position(safe);
                self.update_containment(safe, world, host);
            }
            None => log::warn!("Tracked point {:?} outside every sector with no safe position", position),
        }
    }

    /// Resolve region, sectors and locations at a point and apply the diffs
    fn update_containment(&mut self, point: Vec3, world: &mut World, host: &mut dyn ActorHost) {
        let coordinator = RegionCoordinator::new(world);
        let region = coordinator.region_from_point(point);
        let sectors = match region {
            Some(region) => coordinator.sectors_from_point(point, Some(region)),
            None => Vec::new(),
        };
        let locations = coordinator.locations_from_point(point, Some(&sectors));

        if let Some(region) = region {
            if self.current_region != Some(region) {
                self.switch_region(region, world, host);
            }
        }

        Self::update_current_location(&mut self.current_sectors, sectors, world, host);
        Self::update_current_location(&mut self.current_locations, locations, world, host);
    }

    /// Symmetric difference of containment sets
    ///
    /// Exit is raised on every node no longer present, then Enter on every
    /// node newly present. Nodes in both sets are left alone.
    pub fn update_current_location<T: HierarchyNode>(
        current: &mut Vec<T>,
        new: Vec<T>,
        world: &mut World,
        host: &mut dyn ActorHost,
    ) {
        let old: HashSet<T> = current.iter().copied().collect();
        let incoming: HashSet<T> = new.iter().copied().collect();

        for &node in current.iter().filter(|n| !incoming.contains(n)) {
            node.exit(world, host);
        }
        for &node in new.iter().filter(|n| !old.contains(n)) {
            node.enter(world, host);
        }
        *current = new;
    }

    /// Visibility pass, run once every `visibility_interval`
    pub fn update_visibility(
        &mut self,
        dt: f32,
        world: &mut World,
        host: &mut dyn ActorHost,
        visibility: &dyn VisibilityPredicate,
    ) {
        self.visibility_timer += dt;
        if self.visibility_timer < self.visibility_interval {
            return;
        }
        self.visibility_timer = 0.0;

        let visible = RegionCoordinator::new(world).visible_set(visibility);
        self.update_visible_locations(visible, world, host);
    }

    /// Diff a new visible set against the stored one
    ///
    /// Leaving nodes are handled leaf first: graphics off, then (sectors)
    /// logic off and dispose. Arriving nodes are handled parent first:
    /// (sectors) load, then graphics on, then (sectors) logic on.
    pub fn update_visible_locations(&mut self, new: Vec<NodeId>, world: &mut World, host: &mut dyn ActorHost) {
        let old: HashSet<NodeId> = self.visible.iter().copied().collect();
        let incoming: HashSet<NodeId> = new.iter().copied().collect();

        let leaving: Vec<NodeId> = self
            .visible
            .iter()
            .rev()
            .copied()
            .filter(|n| !incoming.contains(n))
            .collect();
        for node in leaving {
            Self::leave_view(node, world, host);
        }

        for &node in new.iter().filter(|n| !old.contains(n)) {
            Self::enter_view(node, world, host);
        }

        if old != incoming {
            log::debug!("Visible set: {} -> {} nodes", old.len(), incoming.len());
        }
        self.visible = new;
    }

    fn leave_view(node: NodeId, world: &mut World, host: &mut dyn ActorHost) {
        world.switch_graphics(node, false, host);
        if let Some(sector) = node.as_sector() {
            world.switch_logic(sector, false, host);
            world.dispose_sector(sector, host);
        }
    }

    fn enter_view(node: NodeId, world: &mut World, host: &mut dyn ActorHost) {
        let sector = node.as_sector();
        if let Some(sector) = sector {
            world.load_sector(sector, host);
        }
        world.switch_graphics(node, true, host);
        if let Some(sector) = sector {
            world.switch_logic(sector, true, host);
        }
    }

    /// Leave the current region and enter another
    ///
    /// Visible nodes of the old region go through the normal leave path
    /// before the region's Exit disposes whatever else it still holds.
    fn switch_region(&mut self, region: RegionId, world: &mut World, host: &mut dyn ActorHost) {
        if let Some(old) = self.current_region {
            let leaving: Vec<NodeId> = self
                .visible
                .iter()
                .rev()
                .copied()
                .filter(|&n| world.region_of(n) == Some(old))
                .collect();
            for &node in &leaving {
                Self::leave_view(node, world, host);
            }
            self.visible.retain(|n| !leaving.contains(n));
            old.exit(world, host);
        }

        log::debug!("Current region: {:?} -> {}", self.current_region, region);
        self.current_region = Some(region);
        region.enter(world, host);
    }

    /// Eagerly load the content at a point, bypassing the visibility diff
    ///
    /// Used right after a teleport or scene load, before the visibility
    /// predicate means anything. Returns `false` if no sector holds the point.
    pub fn load_location_on_position(&mut self, point: Vec3, world: &mut World, host: &mut dyn ActorHost) -> bool {
        let coordinator = RegionCoordinator::new(world);
        let Some(region) = coordinator.region_from_point(point) else {
            log::warn!("No region at {:?}, nothing to load", point);
            return false;
        };
        let Some(&sector) = coordinator.sectors_from_point(point, Some(region)).first() else {
            log::warn!("No sector at {:?}, nothing to load", point);
            return false;
        };
        let locations = world.sector(sector).map(|s| s.locations().to_vec()).unwrap_or_default();

        if self.current_region != Some(region) {
            self.switch_region(region, world, host);
        }
        world.load_sector(sector, host);

        let nodes = [NodeId::Region(region), NodeId::Sector(sector)]
            .into_iter()
            .chain(locations.into_iter().map(NodeId::Location));
        for node in nodes {
            world.switch_graphics(node, true, host);
            if !self.visible.contains(&node) {
                self.visible.push(node);
            }
        }
        world.switch_logic(sector, true, host);

        self.safe_position = Some(point);
        self.time_outside = 0.0;
        log::info!("Loaded '{}' at {:?}", world.sector(sector).map_or("?", |s| s.path()), point);
        true
    }

    /// Take every visible node through the leave path and forget all state
    pub fn teardown(&mut self, world: &mut World, host: &mut dyn ActorHost) {
        self.update_visible_locations(Vec::new(), world, host);
        Self::update_current_location(&mut self.current_locations, Vec::new(), world, host);
        Self::update_current_location(&mut self.current_sectors, Vec::new(), world, host);
        if let Some(region) = self.current_region.take() {
            region.exit(world, host);
        }

        self.safe_position = None;
        self.time_outside = 0.0;
        self.visibility_timer = self.visibility_interval;
    }
}

impl Default for RegionManager {
    fn default() -> Self {
        Self::new(&StreamingConfig::default())
    }
}
