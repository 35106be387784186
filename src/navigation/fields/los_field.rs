//! Line of sight from every cell of a sector to a single target cell.
//!
//! A cell can see the target when the Bresenham line between them crosses
//! only open cells and never slips diagonally between two walls:
//!
//! ```text
//!  ________________
//! |__|__|__|__|__|
//! |__|x_|__|__|__|
//! |__|__|T_|__|__|
//! |__|__|__|x_|__|
//! |__|__|__|__|S_|
//! ```
//!
//! Here `S` is blocked by the wall at `(3, 3)` and the top left corner by the
//! wall at `(1, 1)`, the rest of the top row sees `T`. Actors with sight of
//! their final goal can steer straight at it instead of following the flow
//! field.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Visibility of a target cell from every cell of a sector
#[derive(Clone, Debug, PartialEq, Eq, Reflect)]
pub struct LosField {
	/// Field `(columns, rows)`
	dimensions: (usize, usize),
	/// Row-major visibility flags
	visible: Vec<bool>,
	/// The cell sight is measured to
	target: FieldCell,
	/// Version of the sector the field was computed from
	version: u64,
}

impl Field<bool> for LosField {
	fn get_dimensions(&self) -> (usize, usize) {
		self.dimensions
	}
	fn get_field_cell_value(&self, field_cell: FieldCell) -> bool {
		self.visible[self.get_index(field_cell)]
	}
	fn set_field_cell_value(&mut self, value: bool, field_cell: FieldCell) {
		let index = self.get_index(field_cell);
		self.visible[index] = value;
	}
}

impl LosField {
	/// Trace a line from every cell to `target`
	pub fn calculate(cost_field: &CostField, target: FieldCell) -> Self {
		let dimensions = cost_field.get_dimensions();
		let mut visible = vec![false; dimensions.0 * dimensions.1];
		if !cost_field.is_wall(target) {
			for row in 0..dimensions.1 {
				for column in 0..dimensions.0 {
					let cell = FieldCell::new(column, row);
					visible[row * dimensions.0 + column] = has_line_of_sight(cost_field, cell, target);
				}
			}
		}
		LosField {
			dimensions,
			visible,
			target,
			version: 0,
		}
	}
	/// Trace from the fields of a sector, stamping the result with the
	/// sectors current version
	pub fn from_sector(fields: &SectorFields, target: FieldCell) -> Self {
		let mut field = LosField::calculate(fields.get_cost_field(), target);
		field.version = fields.get_version();
		field
	}
	pub fn get_target(&self) -> FieldCell {
		self.target
	}
	pub fn get_version(&self) -> u64 {
		self.version
	}
	/// Whether `field_cell` sees the target
	pub fn is_visible(&self, field_cell: FieldCell) -> bool {
		self.contains(field_cell) && self.get_field_cell_value(field_cell)
	}
}

/// Walk the line from `source` to `target`
fn has_line_of_sight(cost_field: &CostField, source: FieldCell, target: FieldCell) -> bool {
	let line = source.get_cells_between_points(&target);
	let mut previous: Option<FieldCell> = None;
	for cell in line {
		if cost_field.is_wall(cell) {
			return false;
		}
		if let Some(prev) = previous {
			if prev.get_column() != cell.get_column() && prev.get_row() != cell.get_row() {
				let horizontal = FieldCell::new(cell.get_column(), prev.get_row());
				let vertical = FieldCell::new(prev.get_column(), cell.get_row());
				if cost_field.is_wall(horizontal) && cost_field.is_wall(vertical) {
					return false;
				}
			}
		}
		previous = Some(cell);
	}
	true
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn open_field_sees_everything() {
		let cost = CostField::new((6, 4), 1);
		let los = LosField::calculate(&cost, FieldCell::new(2, 2));
		for row in 0..4 {
			for column in 0..6 {
				assert!(los.is_visible(FieldCell::new(column, row)));
			}
		}
	}
	#[test]
	fn walls_block_sight() {
		let mut cost = CostField::new((5, 5), 1);
		cost.set_field_cell_value(WALL_COST, FieldCell::new(1, 1));
		cost.set_field_cell_value(WALL_COST, FieldCell::new(3, 3));
		let los = LosField::calculate(&cost, FieldCell::new(2, 2));
		assert!(!los.is_visible(FieldCell::new(4, 4)));
		assert!(!los.is_visible(FieldCell::new(0, 0)));
		assert!(!los.is_visible(FieldCell::new(1, 1)));
		assert!(los.is_visible(FieldCell::new(2, 0)));
		assert!(los.is_visible(FieldCell::new(4, 0)));
	}
	#[test]
	fn diagonal_squeeze_blocks_sight() {
		//  ______
		// |__|x_|
		// |x_|T_|
		let mut cost = CostField::new((2, 2), 1);
		cost.set_field_cell_value(WALL_COST, FieldCell::new(1, 0));
		cost.set_field_cell_value(WALL_COST, FieldCell::new(0, 1));
		let los = LosField::calculate(&cost, FieldCell::new(1, 1));
		assert!(!los.is_visible(FieldCell::new(0, 0)));
		assert!(los.is_visible(FieldCell::new(1, 1)));
	}
	#[test]
	fn walled_target_is_invisible() {
		let mut cost = CostField::new((3, 3), 1);
		cost.set_field_cell_value(WALL_COST, FieldCell::new(1, 1));
		let los = LosField::calculate(&cost, FieldCell::new(1, 1));
		assert!(!los.is_visible(FieldCell::new(0, 0)));
		assert!(!los.is_visible(FieldCell::new(9, 9)));
	}
}
