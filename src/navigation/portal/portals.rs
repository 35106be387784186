//! A Portal indicates a pathable window from one sector into another. Each
//! side of a sector can have multiple portals if the side is 'split' by
//! impassable cells on either side of the boundary. A side that sits along
//! the edge of the level itself cannot have a portal. For example here are
//! two sectors sharing a boundary, `x` marks a wall and `P` the centre of
//! each portal:
//!
//! ```text
//!  ___________________ ___________________
//! |   |   |   |   |   |   |   |   |   |   |
//! |___|___|___|___|_P_|_P_|___|___|___|___|
//! |   |   |   |   |   |   |   |   |   |   |
//! |___|___|___|___|_x_|___|___|___|___|___|
//! |   |   |   |   |   |   |   |   |   |   |
//! |___|___|___|___|___|_x_|___|___|___|___|
//! |   |   |   |   |   |   |   |   |   |   |
//! |___|___|___|___|_P_|_P_|___|___|___|___|
//! |   |   |   |   |   |   |   |   |   |   |
//! |___|___|___|___|___|___|___|___|___|___|
//! ```
//!
//! The run of cells open on both sides of the boundary is identical when
//! seen from either sector, so both sectors place the centre of a portal at
//! the same position along the boundary and each portal has exactly one
//! mirror in the neighbouring sector.
//!

use std::collections::BTreeMap;

use crate::prelude::*;
use bevy::prelude::*;

/// A maximal run of boundary cells open on both sides of a sector boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub struct Portal {
	/// The side of the sector the portal sits along
	ordinal: Ordinal,
	/// Centre cell of the run, the node position used by the graph
	cell: FieldCell,
	/// Every cell of the run
	bounds: FieldRect,
	/// Island of the run within its sector
	color: i32,
	/// The sector on the other side of the boundary
	neighbour: SectorID,
	/// Centre cell of the mirrored portal, local to `neighbour`
	neighbour_cell: FieldCell,
}

impl Portal {
	pub fn get_ordinal(&self) -> Ordinal {
		self.ordinal
	}
	pub fn get_cell(&self) -> FieldCell {
		self.cell
	}
	pub fn get_bounds(&self) -> FieldRect {
		self.bounds
	}
	pub fn get_color(&self) -> i32 {
		self.color
	}
	pub fn get_neighbour(&self) -> SectorID {
		self.neighbour
	}
	pub fn get_neighbour_cell(&self) -> FieldCell {
		self.neighbour_cell
	}
}

/// The portals of one sector for one travel type
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Portals {
	/// Portals in scan order, `North, East, South, West` then along each side
	portals: Vec<Portal>,
	/// Position of a portal in `portals` from its side and centre cell
	lookup: BTreeMap<(Ordinal, FieldCell), usize>,
}

impl Portals {
	/// Scan each side of a sector that has a neighbour and publish a
	/// [Portal] for each run of cells open on both sides of the boundary
	pub fn build(
		level: &Level,
		sector_id: SectorID,
		travel_type: usize,
		cost_field: &CostField,
		color_field: &ColorField,
	) -> Self {
		let layout = level.get_layout();
		let (columns, rows) = cost_field.get_dimensions();
		let mut portals = Portals::default();
		for (ordinal, neighbour) in layout.get_sector_neighbours_with_ordinal(sector_id) {
			// cells along this side of the sector
			let side: Vec<FieldCell> = match ordinal {
				Ordinal::North => (0..columns).map(|c| FieldCell::new(c, 0)).collect(),
				Ordinal::East => (0..rows).map(|r| FieldCell::new(columns - 1, r)).collect(),
				Ordinal::South => (0..columns).map(|c| FieldCell::new(c, rows - 1)).collect(),
				Ordinal::West => (0..rows).map(|r| FieldCell::new(0, r)).collect(),
				_ => continue,
			};
			let (d_column, d_row) = ordinal.get_offset();
			// the cell directly across the boundary, as a level cell
			let across = |cell: FieldCell| {
				let grid = layout.to_grid_cell(sector_id, cell);
				GridCell::new(
					(grid.get_column() as i32 + d_column) as usize,
					(grid.get_row() as i32 + d_row) as usize,
				)
			};
			let mut run: Vec<FieldCell> = Vec::new();
			for cell in side.iter() {
				let open_here = !cost_field.is_wall(*cell);
				let open_there = level.get_effective_cost(across(*cell), travel_type) != WALL_COST;
				if open_here && open_there {
					run.push(*cell);
				} else if !run.is_empty() {
					portals.publish(&run, ordinal, neighbour, color_field, &across, layout);
					run.clear();
				}
			}
			// the side may end part way through a run
			if !run.is_empty() {
				portals.publish(&run, ordinal, neighbour, color_field, &across, layout);
			}
		}
		portals
	}
	/// Record a run of boundary cells as a [Portal]
	fn publish(
		&mut self,
		run: &[FieldCell],
		ordinal: Ordinal,
		neighbour: SectorID,
		color_field: &ColorField,
		across: &dyn Fn(FieldCell) -> GridCell,
		layout: &SectorLayout,
	) {
		let (Some(first), Some(last)) = (run.first(), run.last()) else {
			return;
		};
		// the most centre like cell of the window
		let cell = run[(run.len() - 1) / 2];
		let (_, neighbour_cell) = layout.to_field_cell(across(cell));
		let portal = Portal {
			ordinal,
			cell,
			bounds: FieldRect::new(*first, *last),
			color: color_field.get_field_cell_value(cell),
			neighbour,
			neighbour_cell,
		};
		self.lookup.insert((ordinal, cell), self.portals.len());
		self.portals.push(portal);
	}
	/// Get a reference to the list of [Portal]
	pub fn get(&self) -> &[Portal] {
		&self.portals
	}
	pub fn len(&self) -> usize {
		self.portals.len()
	}
	pub fn is_empty(&self) -> bool {
		self.portals.is_empty()
	}
	/// Find the position of the portal on side `ordinal` centred on `cell`
	pub fn find(&self, ordinal: Ordinal, cell: FieldCell) -> Option<usize> {
		self.lookup.get(&(ordinal, cell)).copied()
	}
	/// Iterate over the portals along one side of the sector
	pub fn get_portals_for_side(&self, ordinal: Ordinal) -> impl Iterator<Item = &Portal> {
		self.portals.iter().filter(move |p| p.ordinal == ordinal)
	}
}
