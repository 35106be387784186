//! Logic for applying changes to a [Level] and rebuilding the sectors the
//! changes touched, which in turn drops any cached path or field made invalid
//! by the change
//!

use crate::prelude::*;
use bevy::prelude::*;

/// What to change about a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum CellChange {
	/// Block or clear the cell
	Obstacle(bool),
	/// Switch the terrain id of the cell
	Terrain(u8),
	/// Set the additive cost stamp of the cell
	Stamp(u8),
}

/// Used to update a cell of every [NavigationLevel]
#[derive(Event, Clone, Copy, Debug)]
pub struct EventUpdateLevelCell {
	/// Cell to update
	cell: GridCell,
	/// The change to apply
	change: CellChange,
}

impl EventUpdateLevelCell {
	/// Create a new instance of [EventUpdateLevelCell]
	pub fn new(cell: GridCell, change: CellChange) -> Self {
		EventUpdateLevelCell { cell, change }
	}
	pub fn get_cell(&self) -> GridCell {
		self.cell
	}
	pub fn get_change(&self) -> CellChange {
		self.change
	}
}

/// Used to change what a terrain costs a travel type
#[derive(Event, Clone, Copy, Debug)]
pub struct EventUpdateTerrainCost {
	/// Travel type whose table changes
	travel_type: usize,
	/// Terrain id to update
	terrain: u8,
	/// New cost within `1..=254`
	cost: u8,
}

impl EventUpdateTerrainCost {
	/// Create a new instance of [EventUpdateTerrainCost]
	pub fn new(travel_type: usize, terrain: u8, cost: u8) -> Self {
		EventUpdateTerrainCost {
			travel_type,
			terrain,
			cost,
		}
	}
	pub fn get_travel_type(&self) -> usize {
		self.travel_type
	}
	pub fn get_terrain(&self) -> u8 {
		self.terrain
	}
	pub fn get_cost(&self) -> u8 {
		self.cost
	}
}

/// Sent after the sectors of a [NavigationLevel] have been rebuilt
#[derive(Event, Clone, Debug)]
pub struct EventSectorsRebuilt {
	/// Entity holding the level
	entity: Entity,
	/// Rebuilt sectors in order
	sectors: Vec<SectorID>,
}

impl EventSectorsRebuilt {
	/// Create a new instance of [EventSectorsRebuilt]
	pub fn new(entity: Entity, sectors: Vec<SectorID>) -> Self {
		EventSectorsRebuilt { entity, sectors }
	}
	pub fn get_entity(&self) -> Entity {
		self.entity
	}
	pub fn get_sectors(&self) -> &[SectorID] {
		&self.sectors
	}
}

/// Read [EventUpdateLevelCell] and [EventUpdateTerrainCost] and apply them,
/// the affected sectors are flagged for the next rebuild
#[cfg(not(tarpaulin_include))]
pub fn process_level_updates(
	mut cell_events: EventReader<EventUpdateLevelCell>,
	mut cost_events: EventReader<EventUpdateTerrainCost>,
	mut query: Query<&mut NavigationLevel>,
) {
	let cells: Vec<EventUpdateLevelCell> = cell_events.read().copied().collect();
	let costs: Vec<EventUpdateTerrainCost> = cost_events.read().copied().collect();
	if cells.is_empty() && costs.is_empty() {
		return;
	}
	for mut nav in query.iter_mut() {
		for event in cells.iter() {
			let cell = event.get_cell();
			let result = match event.get_change() {
				CellChange::Obstacle(obstacle) => nav.set_obstacle(cell, obstacle),
				CellChange::Terrain(terrain) => nav.set_terrain(cell, terrain),
				CellChange::Stamp(stamp) => nav.set_stamp(cell, stamp),
			};
			if let Err(e) = result {
				warn!("Ignored update of cell {:?}: {}", cell.get_column_row(), e);
			}
		}
		for event in costs.iter() {
			if let Err(e) =
				nav.set_terrain_cost(event.get_travel_type(), event.get_terrain(), event.get_cost())
			{
				warn!("Ignored terrain cost update: {}", e);
			}
		}
	}
}

/// Rebuild every sector flagged dirty and announce which ones changed
#[cfg(not(tarpaulin_include))]
pub fn rebuild_dirty_sectors(
	mut query: Query<(Entity, &mut NavigationLevel)>,
	mut event_rebuilt: EventWriter<EventSectorsRebuilt>,
) {
	for (entity, mut nav) in query.iter_mut() {
		if !nav.has_dirty_sectors() {
			continue;
		}
		let sectors = nav.rebuild_dirty_sectors();
		event_rebuilt.write(EventSectorsRebuilt::new(entity, sectors.into_iter().collect()));
	}
}
