//! The ColorField labels every cell of a sector with the connected region
//! ("color") it belongs to for a single travel type. Two open cells share a
//! color when a 4-connected route between them exists inside the sector.
//!
//! Open cells are labeled first with a scanline flood fill, colors are handed
//! out sequentially from `1` in row-major discovery order. Walls are then
//! absorbed by a breadth-first expansion seeded from the labeled cells so
//! that an actor pushed onto a wall still knows which region it is beside.
//! Walls that touch no open cell at all receive fresh colors of their own.
//!
//! ```text
//!  cost field              color field
//!  _____________           _____________
//! |1_|1_|x_|1_|1_|        |1_|1_|1_|2_|2_|
//! |1_|1_|x_|1_|1_|        |1_|1_|1_|2_|2_|
//! |x_|x_|x_|x_|x_|        |1_|1_|3_|2_|2_|
//! |1_|1_|1_|1_|1_|        |3_|3_|3_|3_|3_|
//! ```
//!
//! An island is a color restricted to its open cells, walls carry no island.
//!

use std::collections::VecDeque;

use crate::prelude::*;

/// Temporary marker of a cell that has not been colored yet
const UNLABELED: i32 = -1;

/// Region labels of a sector for one travel type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorField {
	/// Field `(columns, rows)`
	dimensions: (usize, usize),
	/// Row-major colors, every value is at least `1` once built
	colors: Vec<i32>,
	/// Row-major flag of which cells are open
	open: Vec<bool>,
	/// Number of colors assigned to open cells, these are `1..=island_count`
	island_count: i32,
	/// Total number of colors assigned
	color_count: i32,
}

impl Field<i32> for ColorField {
	fn get_dimensions(&self) -> (usize, usize) {
		self.dimensions
	}
	fn get_field_cell_value(&self, field_cell: FieldCell) -> i32 {
		self.colors[self.get_index(field_cell)]
	}
	fn set_field_cell_value(&mut self, value: i32, field_cell: FieldCell) {
		let index = self.get_index(field_cell);
		self.colors[index] = value;
	}
}

impl ColorField {
	/// Label the regions of a [CostField]
	pub fn new(cost_field: &CostField) -> Self {
		let dimensions = cost_field.get_dimensions();
		let total = dimensions.0 * dimensions.1;
		let mut field = ColorField {
			dimensions,
			colors: vec![UNLABELED; total],
			open: Vec::with_capacity(total),
			island_count: 0,
			color_count: 0,
		};
		for row in 0..dimensions.1 {
			for column in 0..dimensions.0 {
				field
					.open
					.push(!cost_field.is_wall(FieldCell::new(column, row)));
			}
		}
		let mut next_color = 1;
		for index in 0..total {
			if field.open[index] && field.colors[index] == UNLABELED {
				field.scanline_fill(index, next_color, true);
				next_color += 1;
			}
		}
		field.island_count = next_color - 1;
		field.absorb_walls();
		for index in 0..total {
			if field.colors[index] == UNLABELED {
				field.scanline_fill(index, next_color, false);
				next_color += 1;
			}
		}
		field.color_count = next_color - 1;
		field
	}
	/// Fill the 4-connected run of unlabeled cells whose openness matches
	/// `open` with `color`, starting from `seed`
	fn scanline_fill(&mut self, seed: usize, color: i32, open: bool) {
		let (columns, rows) = self.dimensions;
		let fillable = |field: &ColorField, index: usize| {
			field.open[index] == open && field.colors[index] == UNLABELED
		};
		let mut stack = vec![(seed % columns, seed / columns)];
		while let Some((column, row)) = stack.pop() {
			if !fillable(self, row * columns + column) {
				continue;
			}
			// walk to the western end of the span
			let mut start = column;
			while start > 0 && fillable(self, row * columns + start - 1) {
				start -= 1;
			}
			let mut end = start;
			while end < columns && fillable(self, row * columns + end) {
				self.colors[row * columns + end] = color;
				end += 1;
			}
			// seed each distinct span directly above and below
			for neighbour_row in [row.checked_sub(1), Some(row + 1)].into_iter().flatten() {
				if neighbour_row >= rows {
					continue;
				}
				let mut in_span = false;
				for c in start..end {
					if fillable(self, neighbour_row * columns + c) {
						if !in_span {
							stack.push((c, neighbour_row));
							in_span = true;
						}
					} else {
						in_span = false;
					}
				}
			}
		}
	}
	/// Give every wall the color of the nearest labeled cell, expanding in
	/// breadth-first order from the labeled cells in row-major order
	fn absorb_walls(&mut self) {
		let columns = self.dimensions.0;
		let mut queue: VecDeque<usize> = (0..self.colors.len())
			.filter(|i| self.colors[*i] != UNLABELED)
			.collect();
		while let Some(index) = queue.pop_front() {
			let color = self.colors[index];
			let cell = (index % columns, index / columns);
			for (column, row) in Ordinal::get_orthogonal_cell_neighbours(cell, self.dimensions) {
				let neighbour = row * columns + column;
				if self.colors[neighbour] == UNLABELED {
					self.colors[neighbour] = color;
					queue.push_back(neighbour);
				}
			}
		}
	}
	/// Number of distinct colors in the sector
	pub fn get_color_count(&self) -> i32 {
		self.color_count
	}
	/// Number of islands (colors owning at least one open cell)
	pub fn get_island_count(&self) -> i32 {
		self.island_count
	}
	/// The island a cell belongs to, walls have none
	pub fn get_island(&self, field_cell: FieldCell) -> Option<i32> {
		let index = self.get_index(field_cell);
		if self.open[index] {
			Some(self.colors[index])
		} else {
			None
		}
	}
	/// Whether `color` is an island, only islands own portals and roots
	pub fn is_island(&self, color: i32) -> bool {
		color >= 1 && color <= self.island_count
	}
	/// Whether a cell is open
	pub fn is_open(&self, field_cell: FieldCell) -> bool {
		self.open[self.get_index(field_cell)]
	}
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;

	/// Build a [CostField] from rows where `x` is a wall and `.` is open
	fn cost_field(rows: &[&str]) -> CostField {
		let mut field = CostField::new((rows[0].len(), rows.len()), 1);
		for (row, line) in rows.iter().enumerate() {
			for (column, c) in line.chars().enumerate() {
				if c == 'x' {
					field.set_field_cell_value(WALL_COST, FieldCell::new(column, row));
				}
			}
		}
		field
	}
	/// Colors as rows for easy comparison
	fn colors(field: &ColorField) -> Vec<Vec<i32>> {
		let (columns, rows) = field.get_dimensions();
		(0..rows).map(|r| (0..columns).map(|c| field.get_field_cell_value(FieldCell::new(c, r))).collect()).collect()
	}
	#[test]
	fn open_field_single_color() {
		let field = ColorField::new(&CostField::new((10, 10), 1));
		assert_eq!(1, field.get_color_count());
		assert_eq!(1, field.get_island_count());
	}
	#[test]
	fn walls_split_and_absorb() {
		let cost = cost_field(&[
			"..x..",
			"..x..",
			"xxxxx",
			".....",
		]);
		let field = ColorField::new(&cost);
		// the centre wall is reached from below before either side spreads to it
		let actual = vec![
			vec![1, 1, 1, 2, 2],
			vec![1, 1, 1, 2, 2],
			vec![1, 1, 3, 2, 2],
			vec![3, 3, 3, 3, 3],
		];
		assert_eq!(actual, colors(&field));
		assert_eq!(3, field.get_island_count());
		assert_eq!(None, field.get_island(FieldCell::new(2, 2)));
		assert_eq!(Some(3), field.get_island(FieldCell::new(0, 3)));
		assert!(!field.is_open(FieldCell::new(2, 2)));
		assert!(field.is_open(FieldCell::new(4, 0)));
	}
	#[test]
	fn u_shape_is_one_region() {
		// the scanline fill has to climb back up the second arm
		let cost = cost_field(&[
			".x.x.",
			".x.x.",
			".....",
		]);
		let field = ColorField::new(&cost);
		assert_eq!(1, field.get_island_count());
		for c in [0, 2, 4] {
			assert_eq!(1, field.get_field_cell_value(FieldCell::new(c, 0)));
		}
	}
	#[test]
	fn fully_walled_sector() {
		let field = ColorField::new(&CostField::new((3, 3), WALL_COST));
		assert_eq!(0, field.get_island_count());
		assert_eq!(1, field.get_color_count());
		assert!(!field.is_island(1));
		assert_eq!(vec![vec![1; 3]; 3], colors(&field));
	}
	#[test]
	fn diagonal_cells_are_not_connected() {
		let cost = cost_field(&[
			".x",
			"x.",
		]);
		let field = ColorField::new(&cost);
		assert_eq!(2, field.get_island_count());
		assert_eq!(2, field.get_color_count());
	}
	#[test]
	fn every_cell_labeled() {
		let cost = cost_field(&[
			"x.x.x.x",
			"xxxxxxx",
			".x.x.x.",
			"xxx.xxx",
		]);
		let field = ColorField::new(&cost);
		for row in colors(&field) {
			for color in row {
				assert!(color >= 1);
			}
		}
	}
}
