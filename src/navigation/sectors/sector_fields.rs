//! Everything derived from the [Level] for one sector and one travel type
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Derived navigation data of a sector for one travel type. The `version`
/// increases on every rebuild so that results computed from older data can
/// be recognised
#[derive(Clone, Debug)]
pub struct SectorFields {
	/// Effective costs copied out of the level
	cost_field: CostField,
	/// Region labels
	color_field: ColorField,
	/// Portals and their edges
	graph: SectorGraph,
	/// Rebuild counter
	version: u64,
}

impl SectorFields {
	/// Build the fields of a sector from scratch with version `1`
	pub fn new(level: &Level, sector_id: SectorID, travel_type: usize) -> Self {
		let cost_field = CostField::from_level(level, sector_id, travel_type);
		let color_field = ColorField::new(&cost_field);
		let graph = SectorGraph::build(level, sector_id, travel_type, &cost_field, &color_field);
		SectorFields {
			cost_field,
			color_field,
			graph,
			version: 1,
		}
	}
	/// Recompute the cost map, the color map and the portal graph of the
	/// sector, then advance the version
	pub fn rebuild(&mut self, level: &Level, sector_id: SectorID, travel_type: usize) {
		let version = self.version + 1;
		*self = SectorFields::new(level, sector_id, travel_type);
		self.version = version;
		trace!(
			"Rebuilt sector {:?} for travel type {} at version {}",
			sector_id.get(),
			travel_type,
			version
		);
	}
	pub fn get_cost_field(&self) -> &CostField {
		&self.cost_field
	}
	pub fn get_color_field(&self) -> &ColorField {
		&self.color_field
	}
	pub fn get_graph(&self) -> &SectorGraph {
		&self.graph
	}
	pub fn get_version(&self) -> u64 {
		self.version
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn rebuild_advances_version() {
		let mut level = Level::new(LevelSettings::new(10, 10, 5, 1, 1).unwrap()).unwrap();
		let sector = SectorID::new(0, 0);
		let mut fields = SectorFields::new(&level, sector, 0);
		assert_eq!(1, fields.get_version());
		level.set_obstacle(GridCell::new(2, 2), true).unwrap();
		fields.rebuild(&level, sector, 0);
		assert_eq!(2, fields.get_version());
		assert!(fields.get_cost_field().is_wall(FieldCell::new(2, 2)));
	}
	#[test]
	fn rebuild_is_deterministic() {
		let mut level = Level::new(LevelSettings::new(10, 10, 5, 1, 1).unwrap()).unwrap();
		level.set_obstacle(GridCell::new(4, 1), true).unwrap();
		level.set_obstacle(GridCell::new(4, 3), true).unwrap();
		let sector = SectorID::new(0, 0);
		let first = SectorFields::new(&level, sector, 0);
		let mut second = first.clone();
		second.rebuild(&level, sector, 0);
		assert_eq!(first.get_color_field(), second.get_color_field());
		assert_eq!(first.get_graph(), second.get_graph());
	}
}
