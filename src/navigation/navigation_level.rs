//! The [NavigationLevel] owns a [Level] along with everything derived from it:
//! the [SectorFields] of every sector for every travel type and the caches of
//! paths, flow fields and line of sight fields.
//!
//! Mutations only flag sectors as dirty, [NavigationLevel::rebuild_dirty_sectors]
//! is expected once per tick to bring the derived data up to date before any
//! query. Rebuilds run in parallel across sectors on the [ComputeTaskPool].
//!

use std::collections::BTreeSet;

use crate::prelude::*;
use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPool};

/// A level and all of its navigation data
#[derive(Component)]
pub struct NavigationLevel {
	/// Ground truth cell data
	level: Level,
	/// Cache sizes and search limits
	settings: NavigationSettings,
	/// `sectors[travel_type][sector_index]`
	sectors: Vec<Vec<SectorFields>>,
	/// Paths keyed by start region and destination
	path_cache: ResultCache<PathKey, Option<Path>>,
	/// Flow fields keyed by sector and goal
	flow_cache: ResultCache<FlowKey, FlowField>,
	/// Line of sight fields keyed by sector and target
	los_cache: ResultCache<LosKey, LosField>,
}

impl NavigationLevel {
	/// Create an open level described by `level_settings`
	pub fn new(level_settings: LevelSettings, settings: NavigationSettings) -> NavResult<Self> {
		Ok(NavigationLevel::from_level(Level::new(level_settings)?, settings))
	}
	/// Create an open level with default [NavigationSettings]
	pub fn create_level(
		width: usize,
		height: usize,
		resolution: usize,
		travel_types: usize,
		terrain_types: usize,
	) -> NavResult<Self> {
		let level_settings = LevelSettings::new(width, height, resolution, travel_types, terrain_types)?;
		NavigationLevel::new(level_settings, NavigationSettings::default())
	}
	/// Derive the navigation data of an existing [Level]
	pub fn from_level(mut level: Level, settings: NavigationSettings) -> Self {
		level.take_dirty_sectors();
		let layout = *level.get_layout();
		let travel_types = level.get_settings().get_travel_types();
		let pool = ComputeTaskPool::get_or_init(TaskPool::default);
		let sectors = (0..travel_types)
			.map(|travel_type| {
				let level = &level;
				pool.scope(|scope| {
					for sector_id in layout.iter_sectors() {
						scope.spawn(async move { SectorFields::new(level, sector_id, travel_type) });
					}
				})
			})
			.collect();
		debug!(
			"Built {} sectors for {} travel types",
			layout.get_sector_total(),
			travel_types
		);
		NavigationLevel {
			level,
			path_cache: ResultCache::new(settings.get_path_cache_capacity()),
			flow_cache: ResultCache::new(settings.get_flow_cache_capacity()),
			los_cache: ResultCache::new(settings.get_los_cache_capacity()),
			settings,
			sectors,
		}
	}
	pub fn get_level(&self) -> &Level {
		&self.level
	}
	pub fn get_settings(&self) -> &NavigationSettings {
		&self.settings
	}
	pub fn get_layout(&self) -> &SectorLayout {
		self.level.get_layout()
	}
	pub fn get_path_cache(&self) -> &ResultCache<PathKey, Option<Path>> {
		&self.path_cache
	}
	pub fn get_flow_cache(&self) -> &ResultCache<FlowKey, FlowField> {
		&self.flow_cache
	}
	pub fn get_los_cache(&self) -> &ResultCache<LosKey, LosField> {
		&self.los_cache
	}
	/// Mark a cell as blocked or clear
	pub fn set_obstacle(&mut self, cell: GridCell, obstacle: bool) -> NavResult<()> {
		self.level.set_obstacle(cell, obstacle)
	}
	/// Change the terrain of a cell
	pub fn set_terrain(&mut self, cell: GridCell, terrain: u8) -> NavResult<()> {
		self.level.set_terrain(cell, terrain)
	}
	/// Change the additive cost stamp of a cell
	pub fn set_stamp(&mut self, cell: GridCell, stamp: u8) -> NavResult<()> {
		self.level.set_stamp(cell, stamp)
	}
	/// Change what a terrain costs one travel type
	pub fn set_terrain_cost(&mut self, travel_type: usize, terrain: u8, cost: u8) -> NavResult<()> {
		self.level.set_terrain_cost(travel_type, terrain, cost)
	}
	/// Whether mutations are waiting on a rebuild
	pub fn has_dirty_sectors(&self) -> bool {
		self.level.has_dirty_sectors()
	}
	/// Rebuild every dirty sector for every travel type and drop the cached
	/// results that depended on them. Returns the rebuilt sectors
	pub fn rebuild_dirty_sectors(&mut self) -> BTreeSet<SectorID> {
		let dirty = self.level.take_dirty_sectors();
		if dirty.is_empty() {
			return dirty;
		}
		let level = &self.level;
		let layout = *level.get_layout();
		let pool = ComputeTaskPool::get_or_init(TaskPool::default);
		pool.scope(|scope| {
			for (travel_type, fields) in self.sectors.iter_mut().enumerate() {
				for (index, sector_fields) in fields.iter_mut().enumerate() {
					let sector_id = layout.get_sector_from_index(index);
					if dirty.contains(&sector_id) {
						scope.spawn(async move {
							sector_fields.rebuild(level, sector_id, travel_type);
						});
					}
				}
			}
		});
		let sectors = &self.sectors;
		let version = |travel_type: usize, sector_id: SectorID| {
			sectors
				.get(travel_type)
				.and_then(|fields| fields.get(layout.get_sector_index(sector_id)))
				.map(|f| f.get_version())
				.unwrap_or(0)
		};
		let paths = self.path_cache.retain(|_, state| match state.ready() {
			None => true,
			// a blocked route may have opened up
			Some(path) => match path.as_ref() {
				None => false,
				Some(path) => !path.is_stale(|sector| version(path.get_travel_type(), sector)),
			},
		});
		let flows = self
			.flow_cache
			.retain(|key, _| !dirty.contains(&key.get_sector()));
		let sights = self
			.los_cache
			.retain(|key, _| !dirty.contains(&key.get_sector()));
		debug!(
			"Rebuilt {} sectors, dropped {} paths, {} flow fields and {} line of sight fields",
			dirty.len(),
			paths,
			flows,
			sights
		);
		dirty
	}
	/// Fields of a sector for a travel type
	pub fn get_sector_fields(&self, travel_type: usize, sector_id: SectorID) -> Option<&SectorFields> {
		if !self.get_layout().contains_sector(sector_id) {
			return None;
		}
		self.sectors
			.get(travel_type)
			.and_then(|fields| fields.get(self.get_layout().get_sector_index(sector_id)))
	}
	/// Current version of a sector, `0` for an unknown sector
	pub fn get_sector_version(&self, travel_type: usize, sector_id: SectorID) -> u64 {
		self.get_sector_fields(travel_type, sector_id)
			.map(|f| f.get_version())
			.unwrap_or(0)
	}
	/// The region a cell belongs to for a travel type
	pub fn get_region(&self, cell: GridCell, travel_type: usize) -> NavResult<RegionKey> {
		self.level.check_travel_type(travel_type)?;
		self.get_layout().check_cell(cell)?;
		Ok(self.path_search(travel_type).get_region(cell))
	}
	/// Search view over the portal graph of a valid travel type
	fn path_search(&self, travel_type: usize) -> PathSearch<'_> {
		PathSearch::new(
			self.level.get_layout(),
			&self.sectors[travel_type],
			travel_type,
			self.settings.get_max_search_nodes(),
		)
	}
	/// Find a path from `start` to `destination`. `Ok(None)` means the
	/// destination cannot be reached
	pub fn find_path(
		&self,
		start: GridCell,
		destination: GridCell,
		travel_type: usize,
	) -> NavResult<Option<Path>> {
		self.level.check_travel_type(travel_type)?;
		self.get_layout().check_cell(start)?;
		self.get_layout().check_cell(destination)?;
		Ok(self
			.path_search(travel_type)
			.find(SearchOrigin::Cell(start), destination))
	}
	/// Check that `goal` is a non-empty rectangle within `sector_id`
	fn check_goal(&self, sector_id: SectorID, goal: FieldRect) -> NavResult<()> {
		self.get_layout().check_sector(sector_id)?;
		if goal.fits_within(self.get_layout().get_sector_dimensions(sector_id)) {
			Ok(())
		} else {
			Err(NavError::GoalOutOfSector {
				sector: sector_id.get(),
				min: goal.get_min().get_column_row(),
				max: goal.get_max().get_column_row(),
			})
		}
	}
	/// Compute the flow field of a sector towards `goal` without caching it
	pub fn compute_flow(
		&self,
		sector_id: SectorID,
		travel_type: usize,
		goal: FieldRect,
		exit: Option<Ordinal>,
	) -> NavResult<FlowField> {
		self.level.check_travel_type(travel_type)?;
		self.check_goal(sector_id, goal)?;
		let fields = &self.sectors[travel_type][self.get_layout().get_sector_index(sector_id)];
		Ok(FlowField::from_sector(
			fields,
			goal,
			exit,
			self.settings.get_flow_iteration_factor(),
		))
	}
	/// Compute the line of sight field of a sector towards `target` without
	/// caching it
	pub fn compute_los(
		&self,
		sector_id: SectorID,
		travel_type: usize,
		target: FieldCell,
	) -> NavResult<LosField> {
		self.level.check_travel_type(travel_type)?;
		self.check_goal(sector_id, FieldRect::from_cell(target))?;
		let fields = &self.sectors[travel_type][self.get_layout().get_sector_index(sector_id)];
		Ok(LosField::from_sector(fields, target))
	}
	/// The key of the path shared by every actor in the region of `start`
	pub fn get_path_key(
		&self,
		start: GridCell,
		destination: GridCell,
		travel_type: usize,
	) -> NavResult<PathKey> {
		let region = self.get_region(start, travel_type)?;
		self.get_layout().check_cell(destination)?;
		Ok(PathKey::new(travel_type, region, destination))
	}
	/// Read a cached path or request it. A path crossing a sector that has
	/// been rebuilt since is treated as missing
	pub fn get_or_request_path(&self, key: &PathKey) -> NavResult<CacheState<Option<Path>>> {
		self.level.check_travel_type(key.get_travel_type())?;
		self.get_layout().check_sector(key.get_source().get_sector())?;
		self.get_layout().check_cell(key.get_target())?;
		let state = self.path_cache.get_or_request(key);
		if let Some(Some(path)) = state.ready().map(|p| p.as_ref()) {
			if path.is_stale(|sector| self.get_sector_version(key.get_travel_type(), sector)) {
				trace!("Stale path {:?}", key);
				self.path_cache.invalidate(key);
				return Ok(self.path_cache.get_or_request(key));
			}
		}
		Ok(state)
	}
	/// Read a cached flow field or request it. A field computed from an older
	/// version of its sector is treated as missing
	pub fn get_or_request_flow(&self, key: &FlowKey) -> NavResult<CacheState<FlowField>> {
		self.level.check_travel_type(key.get_travel_type())?;
		self.check_goal(key.get_sector(), key.get_goal())?;
		let state = self.flow_cache.get_or_request(key);
		if let Some(flow) = state.ready() {
			if flow.get_version() != self.get_sector_version(key.get_travel_type(), key.get_sector()) {
				trace!("Stale flow field {:?}", key);
				self.flow_cache.invalidate(key);
				return Ok(self.flow_cache.get_or_request(key));
			}
		}
		Ok(state)
	}
	/// Read a cached line of sight field or request it
	pub fn get_or_request_los(&self, key: &LosKey) -> NavResult<CacheState<LosField>> {
		self.level.check_travel_type(key.get_travel_type())?;
		self.check_goal(key.get_sector(), FieldRect::from_cell(key.get_target()))?;
		let state = self.los_cache.get_or_request(key);
		if let Some(los) = state.ready() {
			if los.get_version() != self.get_sector_version(key.get_travel_type(), key.get_sector()) {
				self.los_cache.invalidate(key);
				return Ok(self.los_cache.get_or_request(key));
			}
		}
		Ok(state)
	}
	/// Drop a cached path, the next read requests it again
	pub fn invalidate_path(&self, key: &PathKey) -> bool {
		self.path_cache.invalidate(key)
	}
	/// Compute every pending request, returns how many results were published
	pub fn process_requests(&self) -> usize {
		let paths = self.path_cache.process(|key| {
			self.path_search(key.get_travel_type())
				.find(SearchOrigin::Region(key.get_source()), key.get_target())
		});
		let flows = self.flow_cache.process(|key| {
			let fields = &self.sectors[key.get_travel_type()]
				[self.get_layout().get_sector_index(key.get_sector())];
			FlowField::from_sector(
				fields,
				key.get_goal(),
				key.get_exit(),
				self.settings.get_flow_iteration_factor(),
			)
		});
		let sights = self.los_cache.process(|key| {
			let fields = &self.sectors[key.get_travel_type()]
				[self.get_layout().get_sector_index(key.get_sector())];
			LosField::from_sector(fields, key.get_target())
		});
		if paths + flows + sights > 0 {
			trace!(
				"Computed {} paths, {} flow fields and {} line of sight fields",
				paths,
				flows,
				sights
			);
		}
		paths + flows + sights
	}
}
