//! The kinds of fields used by the algorithm, along with the cell and
//! rectangle types used to address them
//!
//! A [GridCell] addresses a cell of the whole level while a [FieldCell]
//! addresses a cell relative to the top-left corner of its sector
//!

pub mod color_field;
pub mod cost_field;
pub mod flow_field;
pub mod integration_field;
pub mod los_field;

use bevy::prelude::*;

/// Defines required access to field arrays
pub trait Field<T> {
	/// Field `(columns, rows)`
	fn get_dimensions(&self) -> (usize, usize);
	/// Retrieve a field cell value
	fn get_field_cell_value(&self, field_cell: FieldCell) -> T;
	/// Set a field cell to a value
	fn set_field_cell_value(&mut self, value: T, field_cell: FieldCell);
	/// Row-major index of a field cell
	fn get_index(&self, field_cell: FieldCell) -> usize {
		field_cell.get_row() * self.get_dimensions().0 + field_cell.get_column()
	}
	/// Whether a field cell lies within the field
	fn contains(&self, field_cell: FieldCell) -> bool {
		let (columns, rows) = self.get_dimensions();
		field_cell.get_column() < columns && field_cell.get_row() < rows
	}
}

/// ID of a cell within a sector field, `(column, row)` relative to the
/// sectors minimum corner
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct FieldCell((usize, usize));

impl FieldCell {
	/// Create a new instance of [FieldCell]
	pub fn new(column: usize, row: usize) -> Self {
		FieldCell((column, row))
	}
	/// Get the `(column, row)` tuple
	pub fn get_column_row(&self) -> (usize, usize) {
		self.0
	}
	/// Get the column
	pub fn get_column(&self) -> usize {
		self.0 .0
	}
	/// Get the row
	pub fn get_row(&self) -> usize {
		self.0 .1
	}
	/// Cells crossed by a Bresenham line from this cell to `target`, both
	/// ends included and ordered from this cell
	pub fn get_cells_between_points(&self, target: &FieldCell) -> Vec<FieldCell> {
		let source = (self.get_column() as i32, self.get_row() as i32);
		let target = (target.get_column() as i32, target.get_row() as i32);
		let steep = (target.1 - source.1).abs() >= (target.0 - source.0).abs();
		let major = |p: (i32, i32)| if steep { p.1 } else { p.0 };
		// rasterise with the major axis increasing, then restore the order
		let reversed = major(source) > major(target);
		let (start, end) = if reversed {
			(target, source)
		} else {
			(source, target)
		};
		let mut cells = rasterise_line(start, end, steep);
		if reversed {
			cells.reverse();
		}
		cells
	}
}

/// Step along the major axis from `start` to `end`, moving one cell along the
/// minor axis each time the accumulated error turns positive. `end` must not
/// lie before `start` on the major axis
fn rasterise_line(start: (i32, i32), end: (i32, i32), steep: bool) -> Vec<FieldCell> {
	let swap = |p: (i32, i32)| if steep { (p.1, p.0) } else { p };
	let (major_0, minor_0) = swap(start);
	let (major_1, minor_1) = swap(end);
	let delta_major = major_1 - major_0;
	let delta_minor = (minor_1 - minor_0).abs();
	let minor_step = (minor_1 - minor_0).signum();
	let mut error = 2 * delta_minor - delta_major;
	let mut minor = minor_0;
	(major_0..=major_1)
		.map(|major| {
			let (column, row) = swap((major, minor));
			if error > 0 {
				minor += minor_step;
				error -= 2 * delta_major;
			}
			error += 2 * delta_minor;
			FieldCell::new(column as usize, row as usize)
		})
		.collect()
}

/// ID of a cell within the whole level, `(column, row)`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct GridCell((usize, usize));

impl GridCell {
	/// Create a new instance of [GridCell]
	pub fn new(column: usize, row: usize) -> Self {
		GridCell((column, row))
	}
	/// Get the `(column, row)` tuple
	pub fn get_column_row(&self) -> (usize, usize) {
		self.0
	}
	pub fn get_column(&self) -> usize {
		self.0 .0
	}
	pub fn get_row(&self) -> usize {
		self.0 .1
	}
	/// Straight line distance between the centres of two cells
	pub fn distance(&self, other: &GridCell) -> f32 {
		let dx = self.get_column() as f32 - other.get_column() as f32;
		let dy = self.get_row() as f32 - other.get_row() as f32;
		(dx * dx + dy * dy).sqrt()
	}
}

/// An inclusive rectangle of cells within a sector field
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct FieldRect {
	/// Top-left cell
	min: FieldCell,
	/// Bottom-right cell
	max: FieldCell,
}

impl FieldRect {
	/// Create a new instance of [FieldRect], the corners are sorted so any
	/// two opposite corners can be supplied
	pub fn new(a: FieldCell, b: FieldCell) -> Self {
		FieldRect {
			min: FieldCell::new(
				a.get_column().min(b.get_column()),
				a.get_row().min(b.get_row()),
			),
			max: FieldCell::new(
				a.get_column().max(b.get_column()),
				a.get_row().max(b.get_row()),
			),
		}
	}
	/// A rectangle covering exactly one cell
	pub fn from_cell(cell: FieldCell) -> Self {
		FieldRect {
			min: cell,
			max: cell,
		}
	}
	pub fn get_min(&self) -> FieldCell {
		self.min
	}
	pub fn get_max(&self) -> FieldCell {
		self.max
	}
	/// Whether `cell` sits inside the rectangle
	pub fn contains(&self, cell: FieldCell) -> bool {
		cell.get_column() >= self.min.get_column()
			&& cell.get_column() <= self.max.get_column()
			&& cell.get_row() >= self.min.get_row()
			&& cell.get_row() <= self.max.get_row()
	}
	/// Whether the rectangle lies entirely within a field of `dimensions`
	pub fn fits_within(&self, dimensions: (usize, usize)) -> bool {
		self.max.get_column() < dimensions.0 && self.max.get_row() < dimensions.1
	}
	/// Iterate over every cell of the rectangle in row-major order
	pub fn iter(&self) -> impl Iterator<Item = FieldCell> + '_ {
		(self.min.get_row()..=self.max.get_row()).flat_map(move |row| {
			(self.min.get_column()..=self.max.get_column())
				.map(move |column| FieldCell::new(column, row))
		})
	}
}

/// An inclusive rectangle of cells within the level
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct GridRect {
	/// Top-left cell
	min: GridCell,
	/// Bottom-right cell
	max: GridCell,
}

impl GridRect {
	/// Create a new instance of [GridRect] from its top-left and bottom-right
	/// corners
	pub fn new(min: GridCell, max: GridCell) -> Self {
		GridRect { min, max }
	}
	pub fn get_min(&self) -> GridCell {
		self.min
	}
	pub fn get_max(&self) -> GridCell {
		self.max
	}
	/// Number of columns and rows covered
	pub fn get_dimensions(&self) -> (usize, usize) {
		(
			self.max.get_column() - self.min.get_column() + 1,
			self.max.get_row() - self.min.get_row() + 1,
		)
	}
	/// Whether `cell` sits inside the rectangle
	pub fn contains(&self, cell: GridCell) -> bool {
		cell.get_column() >= self.min.get_column()
			&& cell.get_column() <= self.max.get_column()
			&& cell.get_row() >= self.min.get_row()
			&& cell.get_row() <= self.max.get_row()
	}
	/// Whether two rectangles share at least one cell
	pub fn intersects(&self, other: &GridRect) -> bool {
		self.min.get_column() <= other.max.get_column()
			&& other.min.get_column() <= self.max.get_column()
			&& self.min.get_row() <= other.max.get_row()
			&& other.min.get_row() <= self.max.get_row()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn line_orthogonal_reverse() {
		let source = FieldCell::new(4, 6);
		let target = FieldCell::new(4, 2);
		let result = source.get_cells_between_points(&target);
		let actual = vec![
			FieldCell::new(4, 6),
			FieldCell::new(4, 5),
			FieldCell::new(4, 4),
			FieldCell::new(4, 3),
			FieldCell::new(4, 2),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn line_shallow() {
		let source = FieldCell::new(0, 0);
		let target = FieldCell::new(4, 2);
		let result = source.get_cells_between_points(&target);
		let actual = vec![
			FieldCell::new(0, 0),
			FieldCell::new(1, 0),
			FieldCell::new(2, 1),
			FieldCell::new(3, 1),
			FieldCell::new(4, 2),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn line_steep_reverse_starts_at_source() {
		let source = FieldCell::new(2, 5);
		let target = FieldCell::new(0, 0);
		let result = source.get_cells_between_points(&target);
		assert_eq!(Some(&source), result.first());
		assert_eq!(Some(&target), result.last());
		assert_eq!(6, result.len());
	}
	#[test]
	fn rect_sorts_corners() {
		let rect = FieldRect::new(FieldCell::new(4, 1), FieldCell::new(2, 3));
		assert_eq!(FieldCell::new(2, 1), rect.get_min());
		assert_eq!(FieldCell::new(4, 3), rect.get_max());
		assert_eq!(9, rect.iter().count());
		assert!(rect.contains(FieldCell::new(3, 2)));
		assert!(!rect.contains(FieldCell::new(5, 2)));
	}
	#[test]
	fn grid_rects_intersect() {
		let a = GridRect::new(GridCell::new(0, 0), GridCell::new(4, 4));
		let b = GridRect::new(GridCell::new(4, 4), GridCell::new(6, 6));
		let c = GridRect::new(GridCell::new(5, 0), GridCell::new(9, 3));
		assert!(a.intersects(&b));
		assert!(!a.intersects(&c));
		assert_eq!((5, 5), a.get_dimensions());
	}
}
