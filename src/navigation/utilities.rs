//! Useful structures and tools used by the fields
//!

use bevy::prelude::*;

/// Effective cost of a cell that cannot be traversed
pub const WALL_COST: u8 = 255;
/// Largest effective cost an open cell can carry, terrain plus stamp is
/// clamped to this value
pub const MAX_OPEN_COST: u8 = 254;

/// Convenience way of accessing the 4 sides of a sector, the 4 sides of a grid
/// cell and the 8 directions of movement across a [crate::prelude::FlowField]
///
/// Rows increase towards the `South` and columns increase towards the `East`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Reflect)]
pub enum Ordinal {
	North,
	East,
	South,
	West,
	NorthEast,
	SouthEast,
	SouthWest,
	NorthWest,
	/// Special case, used to indicate no movement
	Zero,
}

impl Ordinal {
	/// The four sides of a sector in the order they are scanned for portals
	pub const CARDINALS: [Ordinal; 4] = [
		Ordinal::North,
		Ordinal::East,
		Ordinal::South,
		Ordinal::West,
	];
	/// All eight directions of movement
	pub const ALL: [Ordinal; 8] = [
		Ordinal::North,
		Ordinal::East,
		Ordinal::South,
		Ordinal::West,
		Ordinal::NorthEast,
		Ordinal::SouthEast,
		Ordinal::SouthWest,
		Ordinal::NorthWest,
	];
	/// Based on a cells `(column, row)` position find its orthogonal
	/// neighbours within a field of `dimensions` (up to 4)
	pub fn get_orthogonal_cell_neighbours(
		cell_id: (usize, usize),
		dimensions: (usize, usize),
	) -> Vec<(usize, usize)> {
		let mut neighbours = Vec::with_capacity(4);
		if cell_id.1 > 0 {
			neighbours.push((cell_id.0, cell_id.1 - 1)); // northern cell coords
		}
		if cell_id.0 + 1 < dimensions.0 {
			neighbours.push((cell_id.0 + 1, cell_id.1)); // eastern cell coords
		}
		if cell_id.1 + 1 < dimensions.1 {
			neighbours.push((cell_id.0, cell_id.1 + 1)); // southern cell coords
		}
		if cell_id.0 > 0 {
			neighbours.push((cell_id.0 - 1, cell_id.1)); // western cell coords
		}
		neighbours
	}
	/// Returns the opposite [Ordinal] of the current
	pub fn inverse(&self) -> Ordinal {
		match self {
			Ordinal::North => Ordinal::South,
			Ordinal::East => Ordinal::West,
			Ordinal::South => Ordinal::North,
			Ordinal::West => Ordinal::East,
			Ordinal::NorthEast => Ordinal::SouthWest,
			Ordinal::SouthEast => Ordinal::NorthWest,
			Ordinal::SouthWest => Ordinal::NorthEast,
			Ordinal::NorthWest => Ordinal::SouthEast,
			Ordinal::Zero => Ordinal::Zero,
		}
	}
	/// The `(column, row)` step taken when moving one cell in this direction
	pub fn get_offset(&self) -> (i32, i32) {
		match self {
			Ordinal::North => (0, -1),
			Ordinal::NorthEast => (1, -1),
			Ordinal::East => (1, 0),
			Ordinal::SouthEast => (1, 1),
			Ordinal::South => (0, 1),
			Ordinal::SouthWest => (-1, 1),
			Ordinal::West => (-1, 0),
			Ordinal::NorthWest => (-1, -1),
			Ordinal::Zero => (0, 0),
		}
	}
	/// Find the [Ordinal] of a single `(column, row)` step, anything larger
	/// than one cell in either axis yields [None]
	pub fn from_offset(offset: (i32, i32)) -> Option<Self> {
		match offset {
			(0, -1) => Some(Ordinal::North),
			(1, -1) => Some(Ordinal::NorthEast),
			(1, 0) => Some(Ordinal::East),
			(1, 1) => Some(Ordinal::SouthEast),
			(0, 1) => Some(Ordinal::South),
			(-1, 1) => Some(Ordinal::SouthWest),
			(-1, 0) => Some(Ordinal::West),
			(-1, -1) => Some(Ordinal::NorthWest),
			(0, 0) => Some(Ordinal::Zero),
			_ => None,
		}
	}
	/// Whether the direction moves along both axes at once
	pub fn is_diagonal(&self) -> bool {
		matches!(
			self,
			Ordinal::NorthEast | Ordinal::SouthEast | Ordinal::SouthWest | Ordinal::NorthWest
		)
	}
	/// Snap a direction vector (in `(column, row)` space) to the nearest of
	/// the eight octants. A zero length vector is [Ordinal::Zero]
	pub fn from_direction(direction: Vec2) -> Self {
		if direction.length_squared() <= f32::EPSILON {
			return Ordinal::Zero;
		}
		let angle = direction.y.atan2(direction.x);
		let octant = (angle / std::f32::consts::FRAC_PI_4).round() as i32;
		match octant.rem_euclid(8) {
			0 => Ordinal::East,
			1 => Ordinal::SouthEast,
			2 => Ordinal::South,
			3 => Ordinal::SouthWest,
			4 => Ordinal::West,
			5 => Ordinal::NorthWest,
			6 => Ordinal::North,
			_ => Ordinal::NorthEast,
		}
	}
	/// Unit vector in `(column, row)` space pointing in this direction
	pub fn to_direction(&self) -> Vec2 {
		let (x, y) = self.get_offset();
		Vec2::new(x as f32, y as f32).normalize_or_zero()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn neighbours_of_corners() {
		let top_left = Ordinal::get_orthogonal_cell_neighbours((0, 0), (6, 4));
		assert_eq!(vec![(1, 0), (0, 1)], top_left);
		let bottom_right = Ordinal::get_orthogonal_cell_neighbours((5, 3), (6, 4));
		assert_eq!(vec![(5, 2), (4, 3)], bottom_right);
	}
	#[test]
	fn neighbours_of_inner_cell() {
		let result = Ordinal::get_orthogonal_cell_neighbours((3, 2), (6, 4));
		assert_eq!(vec![(3, 1), (4, 2), (3, 3), (2, 2)], result);
	}
	#[test]
	fn ordinal_grid_cell_neighbours_truncated_field() {
		let cell_id = (2, 1);
		let result = Ordinal::get_orthogonal_cell_neighbours(cell_id, (3, 2));
		let actual = vec![(2, 0), (1, 1)];
		assert_eq!(actual, result);
	}
	#[test]
	fn inverse_of_diagonals() {
		assert_eq!(Ordinal::SouthWest, Ordinal::NorthEast.inverse());
		assert_eq!(Ordinal::NorthEast, Ordinal::SouthWest.inverse());
		assert_eq!(Ordinal::Zero, Ordinal::Zero.inverse());
	}
	#[test]
	fn offsets_round_trip() {
		for ordinal in Ordinal::ALL {
			assert_eq!(Some(ordinal), Ordinal::from_offset(ordinal.get_offset()));
		}
		assert_eq!(None, Ordinal::from_offset((2, 0)));
	}
	#[test]
	fn snap_direction_to_octant() {
		assert_eq!(Ordinal::East, Ordinal::from_direction(Vec2::new(1.0, 0.1)));
		assert_eq!(Ordinal::North, Ordinal::from_direction(Vec2::new(0.0, -3.0)));
		assert_eq!(
			Ordinal::SouthWest,
			Ordinal::from_direction(Vec2::new(-1.0, 1.1))
		);
		assert_eq!(
			Ordinal::NorthEast,
			Ordinal::from_direction(Vec2::new(0.9, -1.0))
		);
		assert_eq!(Ordinal::Zero, Ordinal::from_direction(Vec2::ZERO));
	}
}
