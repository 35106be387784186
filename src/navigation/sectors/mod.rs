//! A level is split into a series of `MxN` sectors, each sector owns the
//! fields used to navigate within it.
//!
//! The layout is a pure function of the level size and the sector resolution.
//! When the level size is not a multiple of the resolution the sectors along
//! the eastern and southern edges are truncated rather than padded:
//!
//! ```text
//!  resolution 4, level 10x6
//!  _______________________________
//! |           |           |       |
//! |   (0,0)   |   (1,0)   | (2,0) |
//! |   4x4     |   4x4     | 2x4   |
//! |___________|___________|_______|
//! |   (0,1)   |   (1,1)   | (2,1) |
//! |___________|___________|_______|
//! ```
//!

pub mod sector_fields;

use crate::prelude::*;
use bevy::prelude::*;

/// Unique ID of a sector
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct SectorID((u32, u32));

impl SectorID {
	/// Create a new instance of [SectorID]
	pub fn new(column: u32, row: u32) -> Self {
		SectorID((column, row))
	}
	/// Get the sector `(column, row)` tuple
	pub fn get(&self) -> (u32, u32) {
		self.0
	}
	/// Get the sector column
	pub fn get_column(&self) -> u32 {
		self.0 .0
	}
	/// Get the sector row
	pub fn get_row(&self) -> u32 {
		self.0 .1
	}
}

/// Partitioning of the level into sectors
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct SectorLayout {
	/// Level `(width, height)` in cells
	grid_size: (usize, usize),
	/// Edge length of a full sector in cells
	resolution: usize,
	/// Number of sector `(columns, rows)`
	sector_count: (u32, u32),
}

impl SectorLayout {
	/// Create a new instance of [SectorLayout]
	pub fn new(width: usize, height: usize, resolution: usize) -> NavResult<Self> {
		if width == 0 || height == 0 || resolution == 0 {
			return Err(NavError::InvalidDimensions(format!(
				"cannot lay out sectors of resolution {} over a {}x{} level",
				resolution, width, height
			)));
		}
		let columns = width.div_ceil(resolution);
		let rows = height.div_ceil(resolution);
		if columns > u32::MAX as usize || rows > u32::MAX as usize {
			return Err(NavError::InvalidDimensions(format!(
				"{}x{} sectors cannot be addressed",
				columns, rows
			)));
		}
		Ok(SectorLayout {
			grid_size: (width, height),
			resolution,
			sector_count: (columns as u32, rows as u32),
		})
	}
	/// Create the layout described by some [LevelSettings]
	pub fn from_settings(settings: &LevelSettings) -> NavResult<Self> {
		SectorLayout::new(
			settings.get_width(),
			settings.get_height(),
			settings.get_sector_resolution(),
		)
	}
	pub fn get_grid_size(&self) -> (usize, usize) {
		self.grid_size
	}
	pub fn get_resolution(&self) -> usize {
		self.resolution
	}
	/// Number of sector `(columns, rows)`
	pub fn get_sector_count(&self) -> (u32, u32) {
		self.sector_count
	}
	/// Total number of sectors
	pub fn get_sector_total(&self) -> usize {
		self.sector_count.0 as usize * self.sector_count.1 as usize
	}
	/// Whether a cell lies within the level
	pub fn contains_cell(&self, cell: GridCell) -> bool {
		cell.get_column() < self.grid_size.0 && cell.get_row() < self.grid_size.1
	}
	/// Whether a sector exists
	pub fn contains_sector(&self, sector_id: SectorID) -> bool {
		sector_id.get_column() < self.sector_count.0 && sector_id.get_row() < self.sector_count.1
	}
	/// Error describing `cell` unless it lies within the level
	pub fn check_cell(&self, cell: GridCell) -> NavResult<()> {
		if self.contains_cell(cell) {
			Ok(())
		} else {
			Err(NavError::CellOutOfBounds {
				cell: cell.get_column_row(),
				width: self.grid_size.0,
				height: self.grid_size.1,
			})
		}
	}
	/// Error describing `sector_id` unless it exists
	pub fn check_sector(&self, sector_id: SectorID) -> NavResult<()> {
		if self.contains_sector(sector_id) {
			Ok(())
		} else {
			Err(NavError::UnknownSector(sector_id.get()))
		}
	}
	/// The sector a cell belongs to. The cell is expected to lie within the level
	pub fn get_sector_of(&self, cell: GridCell) -> SectorID {
		SectorID::new(
			(cell.get_column() / self.resolution) as u32,
			(cell.get_row() / self.resolution) as u32,
		)
	}
	/// Row-major index of a sector, used to address per-sector storage
	pub fn get_sector_index(&self, sector_id: SectorID) -> usize {
		sector_id.get_row() as usize * self.sector_count.0 as usize
			+ sector_id.get_column() as usize
	}
	/// Inverse of [SectorLayout::get_sector_index]
	pub fn get_sector_from_index(&self, index: usize) -> SectorID {
		let columns = self.sector_count.0 as usize;
		SectorID::new((index % columns) as u32, (index / columns) as u32)
	}
	/// Top-left cell of a sector
	pub fn get_sector_min_corner(&self, sector_id: SectorID) -> GridCell {
		GridCell::new(
			sector_id.get_column() as usize * self.resolution,
			sector_id.get_row() as usize * self.resolution,
		)
	}
	/// Cells covered by a sector, clipped to the level
	pub fn get_sector_bounds(&self, sector_id: SectorID) -> GridRect {
		let min = self.get_sector_min_corner(sector_id);
		let max = GridCell::new(
			(min.get_column() + self.resolution).min(self.grid_size.0) - 1,
			(min.get_row() + self.resolution).min(self.grid_size.1) - 1,
		);
		GridRect::new(min, max)
	}
	/// Field `(columns, rows)` of a sector
	pub fn get_sector_dimensions(&self, sector_id: SectorID) -> (usize, usize) {
		self.get_sector_bounds(sector_id).get_dimensions()
	}
	/// Split a level cell into its sector and the cell local to that sector
	pub fn to_field_cell(&self, cell: GridCell) -> (SectorID, FieldCell) {
		let sector_id = self.get_sector_of(cell);
		let min = self.get_sector_min_corner(sector_id);
		(
			sector_id,
			FieldCell::new(
				cell.get_column() - min.get_column(),
				cell.get_row() - min.get_row(),
			),
		)
	}
	/// Convert a sector local cell into a level cell
	pub fn to_grid_cell(&self, sector_id: SectorID, field_cell: FieldCell) -> GridCell {
		let min = self.get_sector_min_corner(sector_id);
		GridCell::new(
			min.get_column() + field_cell.get_column(),
			min.get_row() + field_cell.get_row(),
		)
	}
	/// Based on a sectors `(column, row)` position find its neighbours (up to
	/// 4) along with the [Ordinal] of the side they share
	pub fn get_sector_neighbours_with_ordinal(&self, sector_id: SectorID) -> Vec<(Ordinal, SectorID)> {
		let mut neighbours = Vec::with_capacity(4);
		let (column, row) = sector_id.get();
		if row > 0 {
			neighbours.push((Ordinal::North, SectorID::new(column, row - 1)));
		}
		if column + 1 < self.sector_count.0 {
			neighbours.push((Ordinal::East, SectorID::new(column + 1, row)));
		}
		if row + 1 < self.sector_count.1 {
			neighbours.push((Ordinal::South, SectorID::new(column, row + 1)));
		}
		if column > 0 {
			neighbours.push((Ordinal::West, SectorID::new(column - 1, row)));
		}
		neighbours
	}
	/// Every sector whose bounds intersect `rect`, the rect is clipped to the
	/// level first
	pub fn get_sectors_intersecting(&self, rect: GridRect) -> Vec<SectorID> {
		let min = rect.get_min();
		let max = GridCell::new(
			rect.get_max().get_column().min(self.grid_size.0 - 1),
			rect.get_max().get_row().min(self.grid_size.1 - 1),
		);
		if !self.contains_cell(min) {
			return Vec::new();
		}
		let first = self.get_sector_of(min);
		let last = self.get_sector_of(max);
		let mut sectors = Vec::new();
		for row in first.get_row()..=last.get_row() {
			for column in first.get_column()..=last.get_column() {
				sectors.push(SectorID::new(column, row));
			}
		}
		sectors
	}
	/// Iterate over every sector in index order
	pub fn iter_sectors(&self) -> impl Iterator<Item = SectorID> + '_ {
		(0..self.get_sector_total()).map(|index| self.get_sector_from_index(index))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn sector_count_rounds_up() {
		let layout = SectorLayout::new(10, 6, 4).unwrap();
		assert_eq!((3, 2), layout.get_sector_count());
		assert_eq!(6, layout.get_sector_total());
	}
	#[test]
	fn boundary_sectors_are_clipped() {
		let layout = SectorLayout::new(10, 6, 4).unwrap();
		let bounds = layout.get_sector_bounds(SectorID::new(2, 1));
		assert_eq!(GridCell::new(8, 4), bounds.get_min());
		assert_eq!(GridCell::new(9, 5), bounds.get_max());
		assert_eq!((2, 2), layout.get_sector_dimensions(SectorID::new(2, 1)));
		assert_eq!((4, 4), layout.get_sector_dimensions(SectorID::new(0, 0)));
	}
	#[test]
	fn cell_to_sector() {
		let layout = SectorLayout::new(30, 30, 10).unwrap();
		let (sector, field) = layout.to_field_cell(GridCell::new(25, 13));
		assert_eq!(SectorID::new(2, 1), sector);
		assert_eq!(FieldCell::new(5, 3), field);
		assert_eq!(GridCell::new(25, 13), layout.to_grid_cell(sector, field));
	}
	#[test]
	fn index_round_trip() {
		let layout = SectorLayout::new(50, 30, 10).unwrap();
		for sector in layout.iter_sectors() {
			let index = layout.get_sector_index(sector);
			assert_eq!(sector, layout.get_sector_from_index(index));
		}
		assert_eq!(7, layout.get_sector_index(SectorID::new(2, 1)));
	}
	#[test]
	fn corner_sector_neighbours() {
		let layout = SectorLayout::new(30, 30, 10).unwrap();
		let result = layout.get_sector_neighbours_with_ordinal(SectorID::new(0, 0));
		let actual = vec![
			(Ordinal::East, SectorID::new(1, 0)),
			(Ordinal::South, SectorID::new(0, 1)),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn centre_sector_neighbours() {
		let layout = SectorLayout::new(30, 30, 10).unwrap();
		let result = layout.get_sector_neighbours_with_ordinal(SectorID::new(1, 1));
		assert_eq!(4, result.len());
	}
	#[test]
	fn rect_across_sector_corner() {
		let layout = SectorLayout::new(30, 30, 10).unwrap();
		let rect = GridRect::new(GridCell::new(9, 9), GridCell::new(10, 10));
		let result = layout.get_sectors_intersecting(rect);
		let actual = vec![
			SectorID::new(0, 0),
			SectorID::new(1, 0),
			SectorID::new(0, 1),
			SectorID::new(1, 1),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn rect_clipped_to_level() {
		let layout = SectorLayout::new(30, 30, 10).unwrap();
		let rect = GridRect::new(GridCell::new(28, 28), GridCell::new(30, 30));
		let result = layout.get_sectors_intersecting(rect);
		assert_eq!(vec![SectorID::new(2, 2)], result);
	}
	#[test]
	fn reject_zero_resolution() {
		assert!(SectorLayout::new(10, 10, 0).is_err());
	}
}
