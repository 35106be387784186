//! The IntegrationField contains a 2D array of `f32` values and it uses a
//! [CostField] to produce the cumulative cost of reaching a goal from every
//! cell of a sector.
//!
//! The field is solved as a first-order Eikonal equation with a wavefront
//! that expands from the goal. For an open cell with movement cost `f` the
//! smallest horizontal neighbour `a` and the smallest vertical neighbour `b`
//! give the update
//!
//! ```text
//!  u = (a + b + sqrt(2f² - (a - b)²)) / 2    when |a - b| < f
//!  u = min(a, b) + f                         otherwise
//! ```
//!
//! which lets the wave travel diagonally through the grid rather than in the
//! diamond pattern of a 4-connected Dijkstra (the underlying costs are `1`
//! here, goal in the middle):
//!
//! ```text
//!  _____________________________
//! |     |     |     |     |     |
//! | 2.7 | 1.7 | 1.0 | 1.7 | 2.7 |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! | 2.0 | 1.0 |  0  | 1.0 | 2.0 |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! | 2.7 | 1.7 | 1.0 | 1.7 | 2.7 |
//! |_____|_____|_____|_____|_____|
//! ```
//!
//! The field is stored with a one cell border of padding. When the goal is a
//! portal leading out of the sector the wave is seeded in the padding just
//! beyond the portal, so the field pulls actors through the boundary rather
//! than onto the portal cells.
//!
//! Open cells are solved first with a FIFO label-correcting queue. Walls met
//! along the way are set aside and solved afterwards from a second queue with
//! a large additive penalty, so an actor shoved onto a wall is still led off
//! of it. Both queues share an iteration budget, exhausting it is logged as
//! an error and leaves the remaining cells unsolved.
//!

use std::collections::VecDeque;

use crate::prelude::*;
use bevy::prelude::*;

/// Smallest improvement worth propagating
const EPSILON: f32 = 1e-4;

/// Cumulative cost of reaching a goal
#[derive(Clone, Debug)]
pub struct IntegrationField {
	/// Field `(columns, rows)` without padding
	dimensions: (usize, usize),
	/// Row-major values of the padded `(columns + 2) x (rows + 2)` grid
	values: Vec<f32>,
	/// The cells the field leads to
	goal: FieldRect,
	/// Side of the sector the goal leads out through
	exit: Option<Ordinal>,
}

impl Field<f32> for IntegrationField {
	fn get_dimensions(&self) -> (usize, usize) {
		self.dimensions
	}
	fn get_field_cell_value(&self, field_cell: FieldCell) -> f32 {
		self.values[self.get_index(field_cell)]
	}
	fn set_field_cell_value(&mut self, value: f32, field_cell: FieldCell) {
		let index = self.get_index(field_cell);
		self.values[index] = value;
	}
	/// Index into the padded storage
	fn get_index(&self, field_cell: FieldCell) -> usize {
		(field_cell.get_row() + 1) * (self.dimensions.0 + 2) + field_cell.get_column() + 1
	}
}

impl IntegrationField {
	/// Solve the field of `cost_field` towards `goal`, optionally leading out
	/// of the sector through the side `exit`. The solver may process
	/// `iteration_factor` queue entries per cell before giving up
	pub fn calculate(
		cost_field: &CostField,
		goal: FieldRect,
		exit: Option<Ordinal>,
		iteration_factor: usize,
	) -> Self {
		let dimensions = cost_field.get_dimensions();
		let (columns, rows) = dimensions;
		let padded = (columns + 2) * (rows + 2);
		let mut field = IntegrationField {
			dimensions,
			values: vec![f32::INFINITY; padded],
			goal,
			exit,
		};
		let mut walls = vec![false; padded];
		let mut costs = vec![f32::INFINITY; padded];
		for row in 0..rows {
			for column in 0..columns {
				let cell = FieldCell::new(column, row);
				let index = field.get_index(cell);
				let cost = cost_field.get_field_cell_value(cell);
				walls[index] = cost == WALL_COST;
				costs[index] = cost as f32;
			}
		}
		let wall_penalty = WALL_COST as f32 * (columns * rows) as f32;
		let budget = iteration_factor.max(1) * columns * rows;
		let mut iterations = 0;

		let mut queue = VecDeque::new();
		let mut queued = vec![false; padded];
		for cell in goal.iter() {
			let seed = match exit {
				Some(ordinal) => field.padding_beyond(cell, ordinal).unwrap_or(field.get_index(cell)),
				None => field.get_index(cell),
			};
			field.values[seed] = 0.0;
			if !queued[seed] {
				queued[seed] = true;
				queue.push_back(seed);
			}
		}
		// open cells
		let mut wall_queue = VecDeque::new();
		let mut wall_queued = vec![false; padded];
		while let Some(index) = queue.pop_front() {
			queued[index] = false;
			iterations += 1;
			if iterations > budget {
				error!(
					"Integration field exceeded {} iterations, goal {:?}",
					budget, goal
				);
				return field;
			}
			let neighbours: Vec<usize> = field.field_neighbours(index).collect();
			for neighbour in neighbours {
				if walls[neighbour] {
					if !wall_queued[neighbour] {
						wall_queued[neighbour] = true;
						wall_queue.push_back(neighbour);
					}
					continue;
				}
				let value = field.eikonal_update(neighbour, costs[neighbour], &walls);
				if value < field.values[neighbour] - EPSILON {
					field.values[neighbour] = value;
					if !queued[neighbour] {
						queued[neighbour] = true;
						queue.push_back(neighbour);
					}
				}
			}
		}
		// walls
		while let Some(index) = wall_queue.pop_front() {
			wall_queued[index] = false;
			iterations += 1;
			if iterations > budget {
				error!(
					"Integration field exceeded {} iterations while solving walls, goal {:?}",
					budget, goal
				);
				return field;
			}
			let lowest = field
				.padded_neighbours(index)
				.map(|n| field.values[n])
				.fold(f32::INFINITY, f32::min);
			let value = lowest + wall_penalty;
			if value < field.values[index] - EPSILON {
				field.values[index] = value;
				for neighbour in field.field_neighbours(index) {
					if walls[neighbour] && !wall_queued[neighbour] {
						wall_queued[neighbour] = true;
						wall_queue.push_back(neighbour);
					}
				}
			}
		}
		field
	}
	/// Padded index of the padding cell just beyond `cell` on side `ordinal`,
	/// [None] when `cell` does not sit along that side
	fn padding_beyond(&self, cell: FieldCell, ordinal: Ordinal) -> Option<usize> {
		let (columns, rows) = self.dimensions;
		let (d_column, d_row) = ordinal.get_offset();
		let column = cell.get_column() as i32 + d_column;
		let row = cell.get_row() as i32 + d_row;
		let in_padding = column == -1 || row == -1 || column == columns as i32 || row == rows as i32;
		if in_padding && !ordinal.is_diagonal() {
			Some(self.get_padded_index(column, row))
		} else {
			None
		}
	}
	/// Index of a padded `(column, row)`, both may range from `-1` up to the
	/// field size
	fn get_padded_index(&self, column: i32, row: i32) -> usize {
		(row + 1) as usize * (self.dimensions.0 + 2) + (column + 1) as usize
	}
	/// Padded `(column, row)` of an index
	fn get_padded_position(&self, index: usize) -> (i32, i32) {
		let width = self.dimensions.0 + 2;
		((index % width) as i32 - 1, (index / width) as i32 - 1)
	}
	/// Orthogonal neighbours of a padded index that lie inside the field
	fn field_neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
		let (column, row) = self.get_padded_position(index);
		let (columns, rows) = (self.dimensions.0 as i32, self.dimensions.1 as i32);
		Ordinal::CARDINALS.into_iter().filter_map(move |ordinal| {
			let (d_column, d_row) = ordinal.get_offset();
			let (c, r) = (column + d_column, row + d_row);
			if c >= 0 && r >= 0 && c < columns && r < rows {
				Some(self.get_padded_index(c, r))
			} else {
				None
			}
		})
	}
	/// Orthogonal neighbours of a padded index, padding included
	fn padded_neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
		let (column, row) = self.get_padded_position(index);
		let (columns, rows) = (self.dimensions.0 as i32, self.dimensions.1 as i32);
		Ordinal::CARDINALS.into_iter().filter_map(move |ordinal| {
			let (d_column, d_row) = ordinal.get_offset();
			let (c, r) = (column + d_column, row + d_row);
			if c >= -1 && r >= -1 && c <= columns && r <= rows {
				Some(self.get_padded_index(c, r))
			} else {
				None
			}
		})
	}
	/// First-order upwind update of an open cell, walls are treated as
	/// unreached
	fn eikonal_update(&self, index: usize, cost: f32, walls: &[bool]) -> f32 {
		let (column, row) = self.get_padded_position(index);
		let value = |c: i32, r: i32| {
			let i = self.get_padded_index(c, r);
			if walls[i] {
				f32::INFINITY
			} else {
				self.values[i]
			}
		};
		let a = value(column - 1, row).min(value(column + 1, row));
		let b = value(column, row - 1).min(value(column, row + 1));
		solve_eikonal(a, b, cost)
	}
	/// Value at a padded `(column, row)`
	pub fn get_padded_value(&self, column: i32, row: i32) -> f32 {
		self.values[self.get_padded_index(column, row)]
	}
	pub fn get_goal(&self) -> FieldRect {
		self.goal
	}
	pub fn get_exit(&self) -> Option<Ordinal> {
		self.exit
	}
	/// Whether the wave reached a cell
	pub fn is_reached(&self, field_cell: FieldCell) -> bool {
		self.get_field_cell_value(field_cell).is_finite()
	}
}

/// Solve the upwind update from the smallest horizontal neighbour `a`, the
/// smallest vertical neighbour `b` and the cost `f` of the cell
pub fn solve_eikonal(a: f32, b: f32, f: f32) -> f32 {
	let difference = a - b;
	if difference.abs() < f {
		(a + b + (2.0 * f * f - difference * difference).sqrt()) / 2.0
	} else {
		a.min(b) + f
	}
}
