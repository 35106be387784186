//! The CostField contains a 2D array of 8-bit values, one per cell of a
//! sector for a single travel type. The values correspond to the cost of
//! moving into that cell. A value of 255 is a special case that indicates
//! that the field cell is strictly forbidden from being used in a pathing
//! calculation (effectively saying there is a wall or cliff/impassable terrain
//! there). Any other value indicates a harder cost of movement which could be
//! from a slope or marshland or others.
//!
//! Every Sector has one [CostField] per travel type. An example cost field
//! may look:
//!
//! ```text
//!  _____________________________
//! |     |     |     |     |     |
//! |  1  |  1  |  1  |  1  |  1  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  1  |  1  | 255 | 255 | 255 |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  1  |  1  |  4  | 255 |  1  |
//! |_____|_____|_____|_____|_____|
//! ```
//!

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::prelude::*;

/// Effective movement costs of a sector for one travel type
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostField {
	/// Field `(columns, rows)`
	dimensions: (usize, usize),
	/// Row-major costs
	cells: Vec<u8>,
}

impl Field<u8> for CostField {
	fn get_dimensions(&self) -> (usize, usize) {
		self.dimensions
	}
	/// Retrieve a field cell value
	fn get_field_cell_value(&self, field_cell: FieldCell) -> u8 {
		self.cells[self.get_index(field_cell)]
	}
	/// Set a field cell to a value
	fn set_field_cell_value(&mut self, value: u8, field_cell: FieldCell) {
		let index = self.get_index(field_cell);
		self.cells[index] = value;
	}
}

impl CostField {
	/// Create a new instance of [CostField] where every cell costs `cost`
	pub fn new(dimensions: (usize, usize), cost: u8) -> Self {
		CostField {
			dimensions,
			cells: vec![cost; dimensions.0 * dimensions.1],
		}
	}
	/// Copy the effective costs of a sector out of the [Level]
	pub fn from_level(level: &Level, sector_id: SectorID, travel_type: usize) -> Self {
		let bounds = level.get_layout().get_sector_bounds(sector_id);
		let dimensions = bounds.get_dimensions();
		let min = bounds.get_min();
		let mut cells = Vec::with_capacity(dimensions.0 * dimensions.1);
		for row in 0..dimensions.1 {
			for column in 0..dimensions.0 {
				let cell = GridCell::new(min.get_column() + column, min.get_row() + row);
				cells.push(level.get_effective_cost(cell, travel_type));
			}
		}
		CostField { dimensions, cells }
	}
	/// Whether a cell can never be entered
	pub fn is_wall(&self, field_cell: FieldCell) -> bool {
		self.get_field_cell_value(field_cell) == WALL_COST
	}
	/// Cheapest 4-connected route from `source` to every cell of the field
	/// that avoids walls. The cost of a route is the sum of the costs of every
	/// cell on it, both ends included. Unreachable cells and walls are [None]
	pub fn get_path_costs_from(&self, source: FieldCell) -> Vec<Option<u32>> {
		let mut costs: Vec<Option<u32>> = vec![None; self.cells.len()];
		if self.is_wall(source) {
			return costs;
		}
		let mut queue = BinaryHeap::new();
		let start = self.get_field_cell_value(source) as u32;
		costs[self.get_index(source)] = Some(start);
		queue.push(Reverse((start, source.get_row(), source.get_column())));
		while let Some(Reverse((cost, row, column))) = queue.pop() {
			let cell = FieldCell::new(column, row);
			if costs[self.get_index(cell)] != Some(cost) {
				// stale entry, a cheaper route was found after it was queued
				continue;
			}
			for (n_column, n_row) in
				Ordinal::get_orthogonal_cell_neighbours(cell.get_column_row(), self.dimensions)
			{
				let neighbour = FieldCell::new(n_column, n_row);
				let neighbour_cost = self.get_field_cell_value(neighbour);
				if neighbour_cost == WALL_COST {
					continue;
				}
				let total = cost + neighbour_cost as u32;
				let index = self.get_index(neighbour);
				if costs[index].is_none_or(|existing| total < existing) {
					costs[index] = Some(total);
					queue.push(Reverse((total, n_row, n_column)));
				}
			}
		}
		costs
	}
	/// Cheapest 4-connected route cost between two cells, see
	/// [CostField::get_path_costs_from]
	pub fn get_path_cost(&self, source: FieldCell, target: FieldCell) -> Option<u32> {
		self.get_path_costs_from(source)[self.get_index(target)]
	}
}
