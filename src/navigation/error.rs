//! Errors raised when the navigation API is handed input it cannot act upon.
//!
//! Failing to find a route is not an error, searches report that through
//! `Ok(None)`
//!

/// Failures returned from the public navigation API
#[derive(thiserror::Error, Debug)]
pub enum NavError {
	/// A `(column, row)` cell outside of the level
	#[error("Cell {cell:?} lies outside of the {width}x{height} level")]
	CellOutOfBounds {
		/// The offending cell
		cell: (usize, usize),
		/// Level width in cells
		width: usize,
		/// Level height in cells
		height: usize,
	},
	/// A travel type index that the level was not created with
	#[error("Travel type {0} is not defined, the level has {1} travel types")]
	UnknownTravelType(usize, usize),
	/// A terrain id that the level was not created with
	#[error("Terrain type {0} is not defined, the level has {1} terrain types")]
	UnknownTerrainType(u8, usize),
	/// Terrain costs must stay clear of the wall value
	#[error("Terrain cost {0} must be within 1..=254")]
	InvalidTerrainCost(u8),
	/// A sector `(column, row)` that the layout does not contain
	#[error("Sector {0:?} does not exist")]
	UnknownSector((u32, u32)),
	/// A goal rectangle that is empty or spills out of its sector
	#[error("Goal {min:?}..={max:?} does not fit within sector {sector:?}")]
	GoalOutOfSector {
		/// Sector the goal was meant for
		sector: (u32, u32),
		/// Smallest `(column, row)` of the goal
		min: (usize, usize),
		/// Largest `(column, row)` of the goal
		max: (usize, usize),
	},
	/// Level or sector sizing that cannot be laid out
	#[error("Invalid level dimensions: {0}")]
	InvalidDimensions(String),
	/// Level data on disk could not be interpreted
	#[error("Failed loading level data: {0}")]
	Load(String),
	/// Reading or writing level data failed
	#[error("Level IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// Result type used throughout the navigation API
pub type NavResult<T> = std::result::Result<T, NavError>;
