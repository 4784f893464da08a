//! World - the region registry and hierarchy arenas
//!
//! Regions, sectors and locations live in flat arenas addressed by typed ids.
//! Every lifecycle operation goes through the world so a location can reach
//! its owning sector's logic switch while being loaded.

use crate::bounds::Bounds;
use crate::error::{Result, WorldError};
use crate::events::{EventQueue, WorldEvent, WorldEventHandler};
use crate::host::{ActorHost, EntityHandle};
use crate::location::Location;
use crate::node::{LocationId, NodeId, RegionId, SectorId};
use crate::pose::PoseStore;
use crate::region::Region;
use crate::sector::Sector;

/// Hierarchy storage plus the registry of initialized regions
#[derive(Default)]
pub struct World {
    regions: Vec<Region>,
    sectors: Vec<Sector>,
    locations: Vec<Location>,
    /// Initialized regions in registration order
    registry: Vec<RegionId>,
    events: EventQueue,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    // ---- building ----

    /// Add a region
    pub fn add_region(&mut self, mut region: Region) -> Result<RegionId> {
        if self.regions.iter().any(|r| r.name == region.name) {
            return Err(WorldError::DuplicatePath(region.name));
        }
        let id = RegionId(self.regions.len() as u32);
        region.id = id;
        self.regions.push(region);
        Ok(id)
    }

    /// Add a sector under a region
    pub fn add_sector(&mut self, region: RegionId, mut sector: Sector) -> Result<SectorId> {
        let parent = self
            .regions
            .get(region.index())
            .ok_or(WorldError::UnknownRegion(region))?;
        let path = format!("{}/{}", parent.name, sector.name);
        if parent.sectors.iter().any(|s| self.sectors[s.index()].path == path) {
            return Err(WorldError::DuplicatePath(path));
        }

        let id = SectorId(self.sectors.len() as u32);
        sector.id = id;
        sector.path = path;
        sector.region = Some(region);
        self.sectors.push(sector);
        self.regions[region.index()].sectors.push(id);
        Ok(id)
    }

    /// Add a location under a sector
    pub fn add_location(&mut self, sector: SectorId, location: Location) -> Result<LocationId> {
        let parent = self
            .sectors
            .get(sector.index())
            .ok_or(WorldError::UnknownSector(sector))?;
        let path = format!("{}/{}", parent.path, location.name);
        if parent.locations.iter().any(|l| self.locations[l.index()].path == path) {
            return Err(WorldError::DuplicatePath(path));
        }

        let id = self.push_location(location, path)?;
        self.sectors[sector.index()].locations.push(id);
        Ok(id)
    }

    /// Add a location owned by no sector
    ///
    /// Standalone locations are never found by point queries; they are loaded
    /// and entered explicitly.
    pub fn add_standalone_location(&mut self, location: Location) -> Result<LocationId> {
        let path = location.name.clone();
        if self.locations.iter().any(|l| l.path == path) {
            return Err(WorldError::DuplicatePath(path));
        }
        self.push_location(location, path)
    }

    /// Spawn node names key the spawned map and the saved poses, so they
    /// must be unique within a location
    fn push_location(&mut self, mut location: Location, path: String) -> Result<LocationId> {
        if let Some(node) = location.duplicate_spawn_node() {
            return Err(WorldError::DuplicatePath(format!("{}/{}", path, node)));
        }
        let id = LocationId(self.locations.len() as u32);
        location.id = id;
        location.path = path;
        self.locations.push(location);
        Ok(id)
    }

    // ---- access ----

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(id.index())
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id.index())
    }

    /// Mutable location access (authoring and pose edits)
    pub fn location_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.get_mut(id.index())
    }

    /// All regions, registered or not
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Initialized regions in registration order
    pub fn registered_regions(&self) -> &[RegionId] {
        &self.registry
    }

    /// Bounds of a node of any tier
    pub fn node_bounds(&self, node: NodeId) -> Bounds {
        match node {
            NodeId::Region(id) => self.region(id).map_or(Bounds::EMPTY, Region::bounds),
            NodeId::Sector(id) => self.sector(id).map_or(Bounds::EMPTY, Sector::bounds),
            NodeId::Location(id) => self.location(id).map_or(Bounds::EMPTY, Location::bounds),
        }
    }

    /// Region a node belongs to
    pub fn region_of(&self, node: NodeId) -> Option<RegionId> {
        match node {
            NodeId::Region(id) => Some(id),
            NodeId::Sector(id) => self.sector(id)?.region(),
            NodeId::Location(id) => {
                let sector = self.location(id)?.sector()?;
                self.sector(sector)?.region()
            }
        }
    }

    // ---- events ----

    /// Install an observer for every raised event
    pub fn set_event_handler(&mut self, handler: WorldEventHandler) {
        self.events.set_handler(handler);
    }

    /// Events raised since the last drain
    pub fn pending_events(&self) -> &[WorldEvent] {
        self.events.pending()
    }

    /// Take every pending event
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        self.events.drain()
    }

    // ---- initialization ----

    /// Register a region and initialize its sectors and locations
    ///
    /// Idempotent: a second call logs a warning and does nothing.
    pub fn initialize_region(&mut self, id: RegionId) {
        let Some(region) = self.regions.get(id.index()) else {
            log::error!("Cannot initialize unknown {}", id);
            return;
        };
        if self.registry.contains(&id) {
            log::warn!("Region '{}' already initialized, ignoring", region.name);
            return;
        }
        if region.sectors.is_empty() {
            log::error!("Region '{}' has no sectors", region.name);
        }

        self.registry.push(id);
        let sectors = region.sectors.clone();
        for &sector in &sectors {
            self.initialize_sector(sector, Some(id));
        }

        let children = sectors
            .iter()
            .map(|s| &self.sectors[s.index()])
            .filter(|s| s.is_initialized())
            .fold(Bounds::EMPTY, |acc, s| acc.union(&s.bounds()));
        self.regions[id.index()].initialize(children);
        log::debug!("Registered region '{}'", self.regions[id.index()].name);
    }

    /// Initialize every region that is not registered yet
    pub fn initialize_all(&mut self) {
        for index in 0..self.regions.len() {
            let id = RegionId(index as u32);
            if !self.registry.contains(&id) {
                self.initialize_region(id);
            }
        }
    }

    fn initialize_sector(&mut self, id: SectorId, region: Option<RegionId>) {
        let Some(sector) = self.sectors.get(id.index()) else {
            return;
        };
        if sector.is_initialized() {
            log::warn!("Sector '{}' initialized twice, ignoring", sector.path);
            return;
        }

        let mut children = Bounds::EMPTY;
        for &location in &sector.locations {
            let location = &mut self.locations[location.index()];
            if location.initialize(Some(id)) {
                children = children.union(&location.bounds());
            }
        }
        self.sectors[id.index()].initialize(region, children);
    }

    /// Initialize a standalone location
    pub fn initialize_location(&mut self, id: LocationId) -> bool {
        match self.locations.get_mut(id.index()) {
            Some(location) => location.initialize(None),
            None => false,
        }
    }

    // ---- locations ----

    /// Enter a location, loading it first if needed
    pub fn enter_location(&mut self, id: LocationId, host: &mut dyn ActorHost) {
        let Self { locations, sectors, events, .. } = self;
        let Some(location) = locations.get_mut(id.index()) else {
            return;
        };
        let logic = location
            .sector()
            .and_then(|s| sectors.get_mut(s.index()))
            .map(|s| &mut s.logic);
        location.enter(host, logic, events);
    }

    /// Exit a location (never unloads)
    pub fn exit_location(&mut self, id: LocationId) {
        if let Some(location) = self.locations.get_mut(id.index()) {
            location.exit(&mut self.events);
        }
    }

    /// Load a location
    pub fn load_location(&mut self, id: LocationId, host: &mut dyn ActorHost) {
        let Self { locations, sectors, events, .. } = self;
        let Some(location) = locations.get_mut(id.index()) else {
            return;
        };
        let logic = location
            .sector()
            .and_then(|s| sectors.get_mut(s.index()))
            .map(|s| &mut s.logic);
        location.load(host, logic, events);
    }

    /// Dispose a location
    pub fn dispose_location(&mut self, id: LocationId, host: &mut dyn ActorHost) {
        let Self { locations, sectors, events, .. } = self;
        let Some(location) = locations.get_mut(id.index()) else {
            return;
        };
        let logic = location
            .sector()
            .and_then(|s| sectors.get_mut(s.index()))
            .map(|s| &mut s.logic);
        location.dispose(host, logic, events);
    }

    /// Drop an entity that disposed itself without refilling its spawn point
    pub fn forget_entity(&mut self, id: LocationId, handle: EntityHandle) -> bool {
        let Some(location) = self.locations.get_mut(id.index()) else {
            return false;
        };
        let forgotten = location.forget_entity(handle);
        if let Some(sector) = location.sector().and_then(|s| self.sectors.get_mut(s.index())) {
            sector.logic.unwire(handle);
        }
        forgotten
    }

    // ---- sectors ----

    /// Raise a sector's Enter event
    pub fn enter_sector(&mut self, id: SectorId) {
        if let Some(sector) = self.sectors.get_mut(id.index()) {
            sector.enter(&mut self.events);
        }
    }

    /// Raise a sector's Exit event
    pub fn exit_sector(&mut self, id: SectorId) {
        if let Some(sector) = self.sectors.get_mut(id.index()) {
            sector.exit(&mut self.events);
        }
    }

    /// Load a sector and every child location (idempotent)
    pub fn load_sector(&mut self, id: SectorId, host: &mut dyn ActorHost) {
        let Some(sector) = self.sectors.get(id.index()) else {
            return;
        };
        if sector.is_loaded() {
            return;
        }
        for location in sector.locations.clone() {
            self.load_location(location, host);
        }
        self.sectors[id.index()].finish_load(&mut self.events);
    }

    /// Dispose every child location, then clear the sector's wiring
    ///
    /// Children are disposed even when the sector itself was never loaded,
    /// since entering a location loads it on its own.
    pub fn dispose_sector(&mut self, id: SectorId, host: &mut dyn ActorHost) {
        let Some(sector) = self.sectors.get(id.index()) else {
            return;
        };
        for location in sector.locations.clone() {
            self.dispose_location(location, host);
        }
        self.sectors[id.index()].finish_dispose(&mut self.events);
    }

    /// Pause or resume every entity spawned under a sector
    pub fn switch_logic(&mut self, id: SectorId, enabled: bool, host: &mut dyn ActorHost) {
        if let Some(sector) = self.sectors.get_mut(id.index()) {
            sector.switch_logic(enabled, host, &mut self.events);
        }
    }

    // ---- regions ----

    /// Raise a region's Enter event (does not load sectors)
    pub fn enter_region(&mut self, id: RegionId) {
        if let Some(region) = self.regions.get_mut(id.index()) {
            region.enter(&mut self.events);
        }
    }

    /// Raise a region's Exit event and dispose all of its sectors
    pub fn exit_region(&mut self, id: RegionId, host: &mut dyn ActorHost) {
        let Some(region) = self.regions.get_mut(id.index()) else {
            return;
        };
        region.exit(&mut self.events);
        for sector in region.sectors.clone() {
            self.dispose_sector(sector, host);
        }
    }

    // ---- any tier ----

    /// Toggle rendering of a node's own content
    pub fn switch_graphics(&mut self, node: NodeId, enabled: bool, host: &mut dyn ActorHost) {
        match node {
            NodeId::Region(id) => {
                if let Some(region) = self.regions.get_mut(id.index()) {
                    region.switch_graphics(enabled, host, &mut self.events);
                }
            }
            NodeId::Sector(id) => {
                if let Some(sector) = self.sectors.get_mut(id.index()) {
                    sector.switch_graphics(enabled, host, &mut self.events);
                }
            }
            NodeId::Location(id) => {
                if let Some(location) = self.locations.get_mut(id.index()) {
                    location.switch_graphics(enabled, host, &mut self.events);
                }
            }
        }
    }

    /// Dispose everything that is loaded (world teardown)
    pub fn dispose_all(&mut self, host: &mut dyn ActorHost) {
        for index in 0..self.sectors.len() {
            self.dispose_sector(SectorId(index as u32), host);
        }
        for index in 0..self.locations.len() {
            self.dispose_location(LocationId(index as u32), host);
        }
    }

    // ---- persistence ----

    /// Pull recorded poses for every location from the store
    pub fn restore_poses(&mut self, store: &dyn PoseStore) {
        for location in &mut self.locations {
            if let Some(poses) = store.try_get_poses_for_path(&location.path) {
                location.set_poses(poses.clone());
            }
        }
    }

    /// Push every location's recorded poses into the store
    pub fn persist_poses(&self, store: &mut dyn PoseStore) {
        for location in &self.locations {
            let Some(poses) = location.poses() else {
                continue;
            };
            if poses.is_empty() {
                continue;
            }
            store
                .add_poses_for_path(&location.path)
                .extend(poses.iter().map(|(name, pose)| (name.clone(), *pose)));
        }
    }
}
