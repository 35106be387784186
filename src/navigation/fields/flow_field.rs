//! A [FlowField] is a 2D array of unit vectors. Each vector points from a
//! cell towards the goal of the field, a steering pipeline/character
//! controller should read the vector of the cell an actor stands in to
//! provide movement.
//!
//! Directions are derived from the [IntegrationField] with the same upwind
//! rule the field was solved with, so actors follow the smooth gradient of
//! the wavefront. Every direction is then snapped to the nearest of the eight
//! [Ordinal]s and checked: stepping that way has to land on a cell of lower
//! value that is not a wall and does not squeeze between two blocked
//! orthogonals. When the check fails the direction falls back to the
//! steepest valid descending neighbour:
//!
//! ```text
//!  _____________________________
//! |     |     |     |     |     |
//! |  ↘  |  ↓  |  ↓  |  ↓  |  ↙  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  →  |  →  |  G  |  ←  |  ←  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  ↗  |  ↑  |  ↑  |  ↑  |  ↖  |
//! |_____|_____|_____|_____|_____|
//! ```
//!
//! Since every snapped step lands on a strictly lower value, following a
//! field can never cycle.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Per-cell movement directions leading to a goal
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct FlowField {
	/// Field `(columns, rows)`
	dimensions: (usize, usize),
	/// Row-major unit vectors, zero where there is nothing to follow
	directions: Vec<Vec2>,
	/// The cells the field leads to
	goal: FieldRect,
	/// Side of the sector the field leads out through
	exit: Option<Ordinal>,
	/// Region the field is computed for
	color: i32,
	/// Version of the sector the field was computed from
	version: u64,
}

impl Field<Vec2> for FlowField {
	fn get_dimensions(&self) -> (usize, usize) {
		self.dimensions
	}
	fn get_field_cell_value(&self, field_cell: FieldCell) -> Vec2 {
		self.directions[self.get_index(field_cell)]
	}
	fn set_field_cell_value(&mut self, value: Vec2, field_cell: FieldCell) {
		let index = self.get_index(field_cell);
		self.directions[index] = value;
	}
}

impl FlowField {
	/// Compute the flow of a sector towards `goal`, leading out through `exit`
	/// when the goal is a portal. The color of the first goal cell decides the
	/// region of the field
	pub fn calculate(
		cost_field: &CostField,
		color_field: &ColorField,
		goal: FieldRect,
		exit: Option<Ordinal>,
		iteration_factor: usize,
	) -> Self {
		let integration = IntegrationField::calculate(cost_field, goal, exit, iteration_factor);
		let dimensions = cost_field.get_dimensions();
		let mut directions = Vec::with_capacity(dimensions.0 * dimensions.1);
		for row in 0..dimensions.1 {
			for column in 0..dimensions.0 {
				let cell = FieldCell::new(column, row);
				if exit.is_none() && goal.contains(cell) {
					directions.push(Vec2::ZERO);
				} else {
					directions.push(get_cell_direction(cell, cost_field, &integration));
				}
			}
		}
		FlowField {
			dimensions,
			directions,
			goal,
			exit,
			color: color_field.get_field_cell_value(goal.get_min()),
			version: 0,
		}
	}
	/// Compute the flow from the fields of a sector, stamping the result with
	/// the sectors current version
	pub fn from_sector(
		fields: &SectorFields,
		goal: FieldRect,
		exit: Option<Ordinal>,
		iteration_factor: usize,
	) -> Self {
		let mut flow = FlowField::calculate(
			fields.get_cost_field(),
			fields.get_color_field(),
			goal,
			exit,
			iteration_factor,
		);
		flow.version = fields.get_version();
		flow
	}
	/// The direction of a cell snapped to one of the eight [Ordinal]s
	pub fn get_step(&self, field_cell: FieldCell) -> Ordinal {
		Ordinal::from_direction(self.get_field_cell_value(field_cell))
	}
	pub fn get_goal(&self) -> FieldRect {
		self.goal
	}
	pub fn get_exit(&self) -> Option<Ordinal> {
		self.exit
	}
	pub fn get_color(&self) -> i32 {
		self.color
	}
	pub fn get_version(&self) -> u64 {
		self.version
	}
}

/// Compute a [FlowField] with the default solver budget
pub fn calculate_flow_field(
	cost_field: &CostField,
	color_field: &ColorField,
	goal: FieldRect,
	exit: Option<Ordinal>,
) -> FlowField {
	let factor = NavigationSettings::default().get_flow_iteration_factor();
	FlowField::calculate(cost_field, color_field, goal, exit, factor)
}

/// Direction of a single cell. Walls are impassable from open cells, an
/// actor already stood on a wall takes the steepest way off of it
fn get_cell_direction(cell: FieldCell, cost_field: &CostField, integration: &IntegrationField) -> Vec2 {
	let column = cell.get_column() as i32;
	let row = cell.get_row() as i32;
	let value = integration.get_field_cell_value(cell);
	if !value.is_finite() {
		return Vec2::ZERO;
	}
	let on_wall = cost_field.is_wall(cell);
	let lookup = |c: i32, r: i32| neighbour_value(c, r, on_wall, cost_field, integration);

	let (west, east) = (lookup(column - 1, row), lookup(column + 1, row));
	let (north, south) = (lookup(column, row - 1), lookup(column, row + 1));
	let (a, sx) = if west <= east { (west, -1.0) } else { (east, 1.0) };
	let (b, sy) = if north <= south { (north, -1.0) } else { (south, 1.0) };
	let cost = cost_field.get_field_cell_value(cell) as f32;
	let gradient = if on_wall {
		Vec2::ZERO
	} else if a.is_finite() && b.is_finite() && (a - b).abs() < cost {
		Vec2::new(sx * (value - a), sy * (value - b)).normalize_or_zero()
	} else if a.is_finite() && a <= b {
		Vec2::new(sx, 0.0)
	} else if b.is_finite() {
		Vec2::new(0.0, sy)
	} else {
		Vec2::ZERO
	};
	let snapped = Ordinal::from_direction(gradient);
	if snapped != Ordinal::Zero && is_valid_step(column, row, value, snapped, &lookup) {
		return gradient;
	}
	// steepest valid descent
	let mut best: Option<(Ordinal, f32)> = None;
	for ordinal in Ordinal::ALL {
		if !is_valid_step(column, row, value, ordinal, &lookup) {
			continue;
		}
		let (d_column, d_row) = ordinal.get_offset();
		let target = lookup(column + d_column, row + d_row);
		if best.is_none_or(|(_, lowest)| target < lowest) {
			best = Some((ordinal, target));
		}
	}
	best.map(|(ordinal, _)| ordinal.to_direction())
		.unwrap_or(Vec2::ZERO)
}

/// Value of a neighbour in padded coordinates as seen from a cell, walls are
/// infinite unless the cell is a wall itself
fn neighbour_value(
	column: i32,
	row: i32,
	on_wall: bool,
	cost_field: &CostField,
	integration: &IntegrationField,
) -> f32 {
	let (columns, rows) = cost_field.get_dimensions();
	if column < -1 || row < -1 || column > columns as i32 || row > rows as i32 {
		return f32::INFINITY;
	}
	let inside = column >= 0 && row >= 0 && column < columns as i32 && row < rows as i32;
	if inside && !on_wall && cost_field.is_wall(FieldCell::new(column as usize, row as usize)) {
		return f32::INFINITY;
	}
	integration.get_padded_value(column, row)
}

/// Whether stepping from `(column, row)` towards `ordinal` lands on a lower
/// value without cutting between two blocked orthogonals
fn is_valid_step(
	column: i32,
	row: i32,
	value: f32,
	ordinal: Ordinal,
	lookup: &impl Fn(i32, i32) -> f32,
) -> bool {
	let (d_column, d_row) = ordinal.get_offset();
	if lookup(column + d_column, row + d_row) >= value {
		return false;
	}
	if ordinal.is_diagonal() {
		let horizontal = lookup(column + d_column, row);
		let vertical = lookup(column, row + d_row);
		if horizontal.is_infinite() && vertical.is_infinite() {
			return false;
		}
	}
	true
}
