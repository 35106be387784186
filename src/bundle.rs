//! Spawning a [NavigationLevel] into the world
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Everything an entity needs to act as a navigable level
#[derive(Bundle)]
pub struct HpaNavigationBundle {
	/// The level along with its derived sectors and caches
	navigation_level: NavigationLevel,
}

impl HpaNavigationBundle {
	/// Create a new instance of [HpaNavigationBundle] with an open level
	pub fn new(level_settings: LevelSettings, settings: NavigationSettings) -> NavResult<Self> {
		Ok(HpaNavigationBundle {
			navigation_level: NavigationLevel::new(level_settings, settings)?,
		})
	}
	/// Create a new instance of [HpaNavigationBundle] from an existing [Level]
	pub fn from_level(level: Level, settings: NavigationSettings) -> Self {
		HpaNavigationBundle {
			navigation_level: NavigationLevel::from_level(level, settings),
		}
	}
	/// Create a new instance of [HpaNavigationBundle] where the [Level] is
	/// read from disk
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str, settings: NavigationSettings) -> NavResult<Self> {
		Ok(HpaNavigationBundle::from_level(Level::from_ron(path)?, settings))
	}
	pub fn get_navigation_level(&self) -> &NavigationLevel {
		&self.navigation_level
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn new_bundle() {
		let settings = LevelSettings::new(30, 30, 10, 1, 1).unwrap();
		let bundle = HpaNavigationBundle::new(settings, NavigationSettings::default()).unwrap();
		assert_eq!(9, bundle.get_navigation_level().get_layout().get_sector_total());
	}
	#[test]
	fn invalid_level_dimensions() {
		let result = LevelSettings::new(0, 30, 10, 1, 1);
		assert!(result.is_err());
	}
	#[test]
	fn bundle_from_level_has_no_dirty_sectors() {
		let mut level = Level::new(LevelSettings::new(20, 20, 10, 1, 1).unwrap()).unwrap();
		level.set_obstacle(GridCell::new(3, 3), true).unwrap();
		let bundle = HpaNavigationBundle::from_level(level, NavigationSettings::default());
		let nav = bundle.get_navigation_level();
		assert!(!nav.has_dirty_sectors());
		assert!(nav
			.get_sector_fields(0, SectorID::new(0, 0))
			.unwrap()
			.get_cost_field()
			.is_wall(FieldCell::new(3, 3)));
	}
}
