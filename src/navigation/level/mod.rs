//! The [Level] is the mutable ground truth every other structure is derived
//! from. Each cell carries an obstacle flag, a terrain id and a stamp, each
//! travel type carries a table mapping terrain ids to a movement cost.
//!
//! The effective cost of a cell for a travel type is `255` when the cell is
//! an obstacle, otherwise `min(terrain_cost + stamp, 254)`.
//!
//! Mutating a cell flags every sector intersecting the cell grown by a
//! margin of one, the neighbours of a boundary cell build their portals from
//! it too. Changing a terrain cost flags every sector.
//!

#[cfg(any(feature = "ron", feature = "csv", feature = "heightmap"))]
mod io;

use std::collections::BTreeSet;

use crate::prelude::*;

/// Per-cell level data and the terrain cost tables of each travel type
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Level {
	/// Shape of the level
	settings: LevelSettings,
	/// Sector partitioning derived from `settings`
	layout: SectorLayout,
	/// Row-major obstacle flags
	obstacles: Vec<bool>,
	/// Row-major terrain ids
	terrain: Vec<u8>,
	/// Row-major additive cost stamps
	stamps: Vec<u8>,
	/// `terrain_costs[travel_type][terrain_id]`
	terrain_costs: Vec<Vec<u8>>,
	/// Sectors whose derived data is out of date
	#[cfg_attr(feature = "serde", serde(skip))]
	dirty_sectors: BTreeSet<SectorID>,
}

impl Level {
	/// Create a new instance of [Level] where every cell is open terrain `0`
	/// and every terrain costs `1` to cross. All sectors start out dirty
	pub fn new(settings: LevelSettings) -> NavResult<Self> {
		settings.validate()?;
		let layout = SectorLayout::from_settings(&settings)?;
		let cells = settings.get_width() * settings.get_height();
		let mut level = Level {
			settings,
			layout,
			obstacles: vec![false; cells],
			terrain: vec![0; cells],
			stamps: vec![0; cells],
			terrain_costs: vec![vec![1; settings.get_terrain_types()]; settings.get_travel_types()],
			dirty_sectors: BTreeSet::new(),
		};
		level.mark_all_dirty();
		Ok(level)
	}
	pub fn get_settings(&self) -> &LevelSettings {
		&self.settings
	}
	pub fn get_layout(&self) -> &SectorLayout {
		&self.layout
	}
	/// Row-major index of a cell
	fn index(&self, cell: GridCell) -> usize {
		cell.get_row() * self.settings.get_width() + cell.get_column()
	}
	/// Error unless `travel_type` was configured
	pub fn check_travel_type(&self, travel_type: usize) -> NavResult<()> {
		if travel_type < self.settings.get_travel_types() {
			Ok(())
		} else {
			Err(NavError::UnknownTravelType(
				travel_type,
				self.settings.get_travel_types(),
			))
		}
	}
	/// Error unless `terrain` was configured
	fn check_terrain(&self, terrain: u8) -> NavResult<()> {
		if (terrain as usize) < self.settings.get_terrain_types() {
			Ok(())
		} else {
			Err(NavError::UnknownTerrainType(
				terrain,
				self.settings.get_terrain_types(),
			))
		}
	}
	pub fn is_obstacle(&self, cell: GridCell) -> NavResult<bool> {
		self.layout.check_cell(cell)?;
		Ok(self.obstacles[self.index(cell)])
	}
	pub fn get_terrain(&self, cell: GridCell) -> NavResult<u8> {
		self.layout.check_cell(cell)?;
		Ok(self.terrain[self.index(cell)])
	}
	pub fn get_stamp(&self, cell: GridCell) -> NavResult<u8> {
		self.layout.check_cell(cell)?;
		Ok(self.stamps[self.index(cell)])
	}
	pub fn get_terrain_cost(&self, travel_type: usize, terrain: u8) -> NavResult<u8> {
		self.check_travel_type(travel_type)?;
		self.check_terrain(terrain)?;
		Ok(self.terrain_costs[travel_type][terrain as usize])
	}
	/// Cost of moving into `cell` for a travel type. Both the cell and the
	/// travel type are expected to be valid, see [Level::get_cost] for the
	/// checked variant
	pub fn get_effective_cost(&self, cell: GridCell, travel_type: usize) -> u8 {
		let index = self.index(cell);
		if self.obstacles[index] {
			return WALL_COST;
		}
		let terrain_cost = self.terrain_costs[travel_type][self.terrain[index] as usize];
		terrain_cost
			.saturating_add(self.stamps[index])
			.min(MAX_OPEN_COST)
	}
	/// Checked variant of [Level::get_effective_cost]
	pub fn get_cost(&self, cell: GridCell, travel_type: usize) -> NavResult<u8> {
		self.layout.check_cell(cell)?;
		self.check_travel_type(travel_type)?;
		Ok(self.get_effective_cost(cell, travel_type))
	}
	/// Block or unblock a cell
	pub fn set_obstacle(&mut self, cell: GridCell, obstacle: bool) -> NavResult<()> {
		self.layout.check_cell(cell)?;
		let index = self.index(cell);
		if self.obstacles[index] != obstacle {
			self.obstacles[index] = obstacle;
			self.mark_cell_dirty(cell);
		}
		Ok(())
	}
	/// Change the terrain id of a cell
	pub fn set_terrain(&mut self, cell: GridCell, terrain: u8) -> NavResult<()> {
		self.layout.check_cell(cell)?;
		self.check_terrain(terrain)?;
		let index = self.index(cell);
		if self.terrain[index] != terrain {
			self.terrain[index] = terrain;
			self.mark_cell_dirty(cell);
		}
		Ok(())
	}
	/// Change the additive cost stamp of a cell
	pub fn set_stamp(&mut self, cell: GridCell, stamp: u8) -> NavResult<()> {
		self.layout.check_cell(cell)?;
		let index = self.index(cell);
		if self.stamps[index] != stamp {
			self.stamps[index] = stamp;
			self.mark_cell_dirty(cell);
		}
		Ok(())
	}
	/// Change what crossing a terrain costs a travel type, every sector is
	/// flagged for rebuilding
	pub fn set_terrain_cost(&mut self, travel_type: usize, terrain: u8, cost: u8) -> NavResult<()> {
		self.check_travel_type(travel_type)?;
		self.check_terrain(terrain)?;
		if cost == 0 || cost > MAX_OPEN_COST {
			return Err(NavError::InvalidTerrainCost(cost));
		}
		let entry = &mut self.terrain_costs[travel_type][terrain as usize];
		if *entry != cost {
			*entry = cost;
			self.mark_all_dirty();
		}
		Ok(())
	}
	/// Flag every sector intersecting `cell` grown by one cell in each
	/// direction
	fn mark_cell_dirty(&mut self, cell: GridCell) {
		let min = GridCell::new(
			cell.get_column().saturating_sub(1),
			cell.get_row().saturating_sub(1),
		);
		let max = GridCell::new(cell.get_column() + 1, cell.get_row() + 1);
		for sector_id in self.layout.get_sectors_intersecting(GridRect::new(min, max)) {
			self.dirty_sectors.insert(sector_id);
		}
	}
	/// Flag every sector for rebuilding
	pub fn mark_all_dirty(&mut self) {
		self.dirty_sectors = self.layout.iter_sectors().collect();
	}
	pub fn get_dirty_sectors(&self) -> &BTreeSet<SectorID> {
		&self.dirty_sectors
	}
	pub fn has_dirty_sectors(&self) -> bool {
		!self.dirty_sectors.is_empty()
	}
	/// Hand over the set of dirty sectors, leaving it empty
	pub fn take_dirty_sectors(&mut self) -> BTreeSet<SectorID> {
		std::mem::take(&mut self.dirty_sectors)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn level(width: usize, height: usize, resolution: usize) -> Level {
		let settings = LevelSettings::new(width, height, resolution, 2, 3).unwrap();
		let mut level = Level::new(settings).unwrap();
		level.take_dirty_sectors();
		level
	}
	#[test]
	fn new_level_is_all_dirty() {
		let settings = LevelSettings::new(30, 30, 10, 1, 1).unwrap();
		let level = Level::new(settings).unwrap();
		assert_eq!(9, level.get_dirty_sectors().len());
	}
	#[test]
	fn effective_cost_of_obstacle() {
		let mut level = level(10, 10, 5);
		let cell = GridCell::new(3, 3);
		level.set_terrain_cost(0, 0, 7).unwrap();
		assert_eq!(7, level.get_effective_cost(cell, 0));
		level.set_obstacle(cell, true).unwrap();
		assert_eq!(WALL_COST, level.get_effective_cost(cell, 0));
		assert_eq!(WALL_COST, level.get_effective_cost(cell, 1));
	}
	#[test]
	fn stamp_is_clamped_below_wall() {
		let mut level = level(10, 10, 5);
		let cell = GridCell::new(1, 1);
		level.set_terrain_cost(1, 2, 200).unwrap();
		level.set_terrain(cell, 2).unwrap();
		level.set_stamp(cell, 100).unwrap();
		assert_eq!(MAX_OPEN_COST, level.get_effective_cost(cell, 1));
		assert_eq!(101, level.get_effective_cost(cell, 0));
	}
	#[test]
	fn interior_cell_dirties_one_sector() {
		let mut level = level(30, 30, 10);
		level.set_obstacle(GridCell::new(15, 15), true).unwrap();
		let dirty: Vec<SectorID> = level.take_dirty_sectors().into_iter().collect();
		assert_eq!(vec![SectorID::new(1, 1)], dirty);
	}
	#[test]
	fn boundary_cell_dirties_neighbour() {
		let mut level = level(30, 30, 10);
		level.set_terrain(GridCell::new(10, 5), 1).unwrap();
		let dirty: Vec<SectorID> = level.take_dirty_sectors().into_iter().collect();
		assert_eq!(vec![SectorID::new(0, 0), SectorID::new(1, 0)], dirty);
	}
	#[test]
	fn corner_cell_dirties_four() {
		let mut level = level(30, 30, 10);
		level.set_stamp(GridCell::new(19, 20), 4).unwrap();
		assert_eq!(4, level.take_dirty_sectors().len());
	}
	#[test]
	fn unchanged_value_does_not_dirty() {
		let mut level = level(30, 30, 10);
		level.set_obstacle(GridCell::new(4, 4), false).unwrap();
		assert!(!level.has_dirty_sectors());
	}
	#[test]
	fn terrain_cost_dirties_everything() {
		let mut level = level(30, 30, 10);
		level.set_terrain_cost(0, 1, 9).unwrap();
		assert_eq!(9, level.take_dirty_sectors().len());
	}
	#[test]
	fn invalid_inputs() {
		let mut level = level(10, 10, 5);
		assert!(matches!(
			level.set_obstacle(GridCell::new(10, 0), true),
			Err(NavError::CellOutOfBounds { .. })
		));
		assert!(matches!(
			level.set_terrain(GridCell::new(0, 0), 3),
			Err(NavError::UnknownTerrainType(3, 3))
		));
		assert!(matches!(
			level.set_terrain_cost(2, 0, 5),
			Err(NavError::UnknownTravelType(2, 2))
		));
		assert!(matches!(
			level.set_terrain_cost(0, 0, 255),
			Err(NavError::InvalidTerrainCost(255))
		));
		assert!(matches!(
			level.set_terrain_cost(0, 0, 0),
			Err(NavError::InvalidTerrainCost(0))
		));
	}
}
