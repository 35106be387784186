//! Building a [Level] from data on disk
//!

use super::Level;
use crate::prelude::*;

impl Level {
	/// From a `ron` file generate the [Level]. Every sector is flagged dirty
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> NavResult<Self> {
		let file = std::fs::File::open(path)?;
		let level: Level = ron::de::from_reader(file).map_err(|e| NavError::Load(e.to_string()))?;
		level.finish_loading()
	}
	/// Write the [Level] to a `ron` file
	#[cfg(feature = "ron")]
	pub fn save_ron(&self, path: &str) -> NavResult<()> {
		let data = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
			.map_err(|e| NavError::Load(e.to_string()))?;
		std::fs::write(path, data)?;
		Ok(())
	}
	/// Ensure deserialized data is self-consistent before handing it out
	#[cfg(feature = "ron")]
	fn finish_loading(mut self) -> NavResult<Self> {
		self.settings.validate()?;
		self.layout = SectorLayout::from_settings(&self.settings)?;
		let cells = self.settings.get_width() * self.settings.get_height();
		if self.obstacles.len() != cells || self.terrain.len() != cells || self.stamps.len() != cells
		{
			return Err(NavError::Load(format!(
				"expected {} cells of obstacle, terrain and stamp data",
				cells
			)));
		}
		if self.terrain_costs.len() != self.settings.get_travel_types()
			|| self
				.terrain_costs
				.iter()
				.any(|table| table.len() != self.settings.get_terrain_types())
		{
			return Err(NavError::Load(
				"terrain cost tables do not match the travel and terrain types".to_string(),
			));
		}
		for table in self.terrain_costs.iter() {
			if let Some(cost) = table.iter().find(|c| **c == 0 || **c > MAX_OPEN_COST) {
				return Err(NavError::InvalidTerrainCost(*cost));
			}
		}
		if let Some(terrain) = self
			.terrain
			.iter()
			.find(|t| **t as usize >= self.settings.get_terrain_types())
		{
			return Err(NavError::UnknownTerrainType(
				*terrain,
				self.settings.get_terrain_types(),
			));
		}
		self.mark_all_dirty();
		Ok(self)
	}
	/// From a CSV file generate the [Level]. Each record is a row of the
	/// level and each value is either a terrain id or `x` to mark an obstacle
	#[cfg(feature = "csv")]
	pub fn from_csv(settings: LevelSettings, path: &str) -> NavResult<Self> {
		let data = std::fs::File::open(path)?;
		let mut rdr = csv::ReaderBuilder::new()
			.has_headers(false)
			.from_reader(data);
		let mut level = Level::new(settings)?;
		let mut rows = 0;
		for (row, record) in rdr.records().enumerate() {
			let record = record.map_err(|e| NavError::Load(e.to_string()))?;
			if row >= settings.get_height() || record.len() != settings.get_width() {
				return Err(NavError::Load(format!(
					"CSV row {} does not fit a {}x{} level",
					row,
					settings.get_width(),
					settings.get_height()
				)));
			}
			for (column, value) in record.iter().enumerate() {
				let cell = GridCell::new(column, row);
				let value = value.trim();
				if value.eq_ignore_ascii_case("x") {
					level.set_obstacle(cell, true)?;
				} else {
					let terrain: u8 = value.parse().map_err(|_| {
						NavError::Load(format!("cell {:?} has invalid value {}", cell, value))
					})?;
					level.set_terrain(cell, terrain)?;
				}
			}
			rows += 1;
		}
		if rows != settings.get_height() {
			return Err(NavError::Load(format!(
				"found {} CSV rows, expected {}",
				rows,
				settings.get_height()
			)));
		}
		level.mark_all_dirty();
		Ok(level)
	}
	/// Create a [Level] from a greyscale image where each pixel is a cell.
	/// Brightness is split evenly into `terrain_types` bands, pure black
	/// pixels become obstacles
	#[cfg(feature = "heightmap")]
	pub fn from_heightmap(settings: LevelSettings, path: &str) -> NavResult<Self> {
		use photon_rs::native::open_image;
		let img = open_image(path).map_err(|e| NavError::Load(e.to_string()))?;
		let img_width = img.get_width() as usize;
		let img_height = img.get_height() as usize;
		if img_width != settings.get_width() || img_height != settings.get_height() {
			return Err(NavError::Load(format!(
				"heightmap is {}x{} pixels, expected {}x{}",
				img_width,
				img_height,
				settings.get_width(),
				settings.get_height()
			)));
		}
		let raw_pixels = img.get_raw_pixels();
		// pixels come in sets of 3 or 4 depending on an alpha channel
		let chunk_size = if raw_pixels.len() == img_width * img_height * 4 {
			4
		} else {
			3
		};
		let mut level = Level::new(settings)?;
		let bands = settings.get_terrain_types() as f32;
		for (i, px) in raw_pixels.chunks(chunk_size).enumerate() {
			let cell = GridCell::new(i % img_width, i / img_width);
			// careful of u8 overflow
			let brightness = (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0;
			if brightness <= 0.0 {
				level.set_obstacle(cell, true)?;
			} else {
				let band = ((brightness / 256.0) * bands) as usize;
				let terrain = band.min(settings.get_terrain_types() - 1) as u8;
				level.set_terrain(cell, terrain)?;
			}
		}
		level.mark_all_dirty();
		Ok(level)
	}
}
