//! Configuration of a level and of the navigation machinery built upon it
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Describes the shape of a level and how it gets divided into sectors
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct LevelSettings {
	/// Number of cell columns
	width: usize,
	/// Number of cell rows
	height: usize,
	/// Edge length of a sector in cells. Sectors along the eastern and
	/// southern edges of the level are truncated when the level size is not
	/// a multiple of this value
	sector_resolution: usize,
	/// How many kinds of mover exist, each has its own terrain cost table and
	/// its own set of sector fields
	travel_types: usize,
	/// How many terrain ids a cell may carry
	terrain_types: usize,
}

impl LevelSettings {
	/// Create a new instance of [LevelSettings]
	pub fn new(
		width: usize,
		height: usize,
		sector_resolution: usize,
		travel_types: usize,
		terrain_types: usize,
	) -> NavResult<Self> {
		let settings = LevelSettings {
			width,
			height,
			sector_resolution,
			travel_types,
			terrain_types,
		};
		settings.validate()?;
		Ok(settings)
	}
	/// Ensure every dimension can be laid out
	pub fn validate(&self) -> NavResult<()> {
		if self.width == 0 || self.height == 0 {
			return Err(NavError::InvalidDimensions(format!(
				"level must have at least one cell, found {}x{}",
				self.width, self.height
			)));
		}
		if self.sector_resolution == 0 {
			return Err(NavError::InvalidDimensions(
				"sector resolution must be at least 1".to_string(),
			));
		}
		if self.travel_types == 0 {
			return Err(NavError::InvalidDimensions(
				"at least one travel type is required".to_string(),
			));
		}
		if self.terrain_types == 0 || self.terrain_types > 256 {
			return Err(NavError::InvalidDimensions(format!(
				"terrain types must be within 1..=256, found {}",
				self.terrain_types
			)));
		}
		Ok(())
	}
	/// Read [LevelSettings] from a `ron` file
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> NavResult<Self> {
		let file = std::fs::File::open(path)?;
		let settings: LevelSettings =
			ron::de::from_reader(file).map_err(|e| NavError::Load(e.to_string()))?;
		settings.validate()?;
		Ok(settings)
	}
	pub fn get_width(&self) -> usize {
		self.width
	}
	pub fn get_height(&self) -> usize {
		self.height
	}
	pub fn get_sector_resolution(&self) -> usize {
		self.sector_resolution
	}
	pub fn get_travel_types(&self) -> usize {
		self.travel_types
	}
	pub fn get_terrain_types(&self) -> usize {
		self.terrain_types
	}
}

/// Tuning of the searches and caches
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct NavigationSettings {
	/// Most paths retained before the oldest is evicted
	path_cache_capacity: usize,
	/// Most flow fields retained before the oldest is evicted
	flow_cache_capacity: usize,
	/// Most line-of-sight fields retained before the oldest is evicted
	los_cache_capacity: usize,
	/// Portal nodes a single search may expand before giving up
	max_search_nodes: usize,
	/// The flow solver may process `factor * cells` queue entries before it
	/// stops and logs an error
	flow_iteration_factor: usize,
}

impl Default for NavigationSettings {
	fn default() -> Self {
		NavigationSettings {
			path_cache_capacity: 4096,
			flow_cache_capacity: 1024,
			los_cache_capacity: 1024,
			max_search_nodes: 100_000,
			flow_iteration_factor: 64,
		}
	}
}

impl NavigationSettings {
	pub fn with_path_cache_capacity(mut self, capacity: usize) -> Self {
		self.path_cache_capacity = capacity.max(1);
		self
	}
	pub fn with_flow_cache_capacity(mut self, capacity: usize) -> Self {
		self.flow_cache_capacity = capacity.max(1);
		self
	}
	pub fn with_los_cache_capacity(mut self, capacity: usize) -> Self {
		self.los_cache_capacity = capacity.max(1);
		self
	}
	pub fn with_max_search_nodes(mut self, nodes: usize) -> Self {
		self.max_search_nodes = nodes.max(1);
		self
	}
	pub fn with_flow_iteration_factor(mut self, factor: usize) -> Self {
		self.flow_iteration_factor = factor.max(1);
		self
	}
	pub fn get_path_cache_capacity(&self) -> usize {
		self.path_cache_capacity
	}
	pub fn get_flow_cache_capacity(&self) -> usize {
		self.flow_cache_capacity
	}
	pub fn get_los_cache_capacity(&self) -> usize {
		self.los_cache_capacity
	}
	pub fn get_max_search_nodes(&self) -> usize {
		self.max_search_nodes
	}
	pub fn get_flow_iteration_factor(&self) -> usize {
		self.flow_iteration_factor
	}
}
