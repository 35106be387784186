//! Turns cached paths and fields into a direction for an actor to move in.
//!
//! Each tick an actor reports the cell it stands in and receives a
//! [Steering]. While the path or field it needs is still being computed the
//! steering carries no direction and asks to be queried again. Actors share
//! paths, once a path has been found for a region every actor crossing a
//! region along it reuses the same path.
//!
//! Directions are unit vectors in `(column, row)` space, rows increase to the
//! south. Converting them into world space is left to the character
//! controller.
//!

use std::sync::Arc;

use crate::prelude::*;
use bevy::prelude::*;

/// Outcome of steering an actor for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct Steering {
	/// Way to move, [None] while there is nothing to follow yet
	direction: Option<Vec2>,
	/// Whether the actor should ask again on a following tick
	requery: bool,
	/// Whether the actor stands on its destination
	arrived: bool,
}

impl Steering {
	/// Waiting on a computation
	fn pending() -> Self {
		Steering {
			direction: None,
			requery: true,
			arrived: false,
		}
	}
	/// The destination cannot be reached
	fn unreachable() -> Self {
		Steering {
			direction: None,
			requery: false,
			arrived: false,
		}
	}
	/// Move along `direction`
	fn towards(direction: Vec2) -> Self {
		Steering {
			direction: Some(direction),
			requery: false,
			arrived: false,
		}
	}
	/// Standing on the destination
	fn arrived() -> Self {
		Steering {
			direction: Some(Vec2::ZERO),
			requery: false,
			arrived: true,
		}
	}
	pub fn get_direction(&self) -> Option<Vec2> {
		self.direction
	}
	pub fn should_requery(&self) -> bool {
		self.requery
	}
	/// The actor stands on its destination
	pub fn has_arrived(&self) -> bool {
		self.arrived
	}
}

/// An actor following paths through a [NavigationLevel]
#[derive(Component, Clone, Debug, Reflect)]
pub struct FlowFollower {
	/// Travel type of the actor
	travel_type: usize,
	/// Cell the actor stands in
	cell: GridCell,
	/// Cell the actor is heading for
	destination: GridCell,
	/// Region of the previous tick
	region: Option<RegionKey>,
	/// Path the actor is following
	path_key: Option<PathKey>,
	/// Result of the latest tick
	steering: Steering,
}

impl FlowFollower {
	/// Create a new instance of [FlowFollower]
	pub fn new(travel_type: usize, cell: GridCell, destination: GridCell) -> Self {
		FlowFollower {
			travel_type,
			cell,
			destination,
			region: None,
			path_key: None,
			steering: Steering::pending(),
		}
	}
	pub fn get_travel_type(&self) -> usize {
		self.travel_type
	}
	pub fn get_cell(&self) -> GridCell {
		self.cell
	}
	/// Report the cell the actor stands in, used by the next steer
	pub fn set_cell(&mut self, cell: GridCell) {
		self.cell = cell;
	}
	pub fn get_destination(&self) -> GridCell {
		self.destination
	}
	/// Head somewhere else, the current path is abandoned
	pub fn set_destination(&mut self, destination: GridCell) {
		self.destination = destination;
		self.path_key = None;
	}
	pub fn get_steering(&self) -> Steering {
		self.steering
	}
	/// Steer from the cell set last
	pub fn steer_from_current(&mut self, nav: &NavigationLevel) -> NavResult<Steering> {
		self.steer(nav, self.cell)
	}
	/// Steer from `cell`. Moving into another region raises
	/// [Steering::should_requery]
	pub fn steer(&mut self, nav: &NavigationLevel, cell: GridCell) -> NavResult<Steering> {
		let region = nav.get_region(cell, self.travel_type)?;
		nav.get_layout().check_cell(self.destination)?;
		let region_changed = self.region.is_some_and(|previous| previous != region);
		self.cell = cell;
		self.region = Some(region);
		let mut steering = self.resolve(nav, region)?;
		steering.requery |= region_changed;
		self.steering = steering;
		Ok(steering)
	}
	/// Work out the direction for the current cell
	fn resolve(&mut self, nav: &NavigationLevel, region: RegionKey) -> NavResult<Steering> {
		if self.cell == self.destination {
			return Ok(Steering::arrived());
		}
		let Some((key, path)) = self.lookup_path(nav, region)? else {
			return Ok(Steering::pending());
		};
		let Some(path) = path.as_ref() else {
			return Ok(Steering::unreachable());
		};
		let Some(node) = path.find_node(region) else {
			debug!("Path {:?} does not cross region {:?}", key, region);
			nav.invalidate_path(&key);
			self.path_key = None;
			return Ok(Steering::pending());
		};
		let (_, field_cell) = nav.get_layout().to_field_cell(self.cell);
		if node.is_terminal() {
			let los_key = LosKey::new(node.get_sector(), self.travel_type, node.get_cell());
			if let CacheState::Ready(los) = nav.get_or_request_los(&los_key)? {
				if los.is_visible(field_cell) {
					let direction = Vec2::new(
						self.destination.get_column() as f32 - self.cell.get_column() as f32,
						self.destination.get_row() as f32 - self.cell.get_row() as f32,
					);
					return Ok(Steering::towards(direction.normalize_or_zero()));
				}
			}
		}
		match nav.get_or_request_flow(&FlowKey::from_node(self.travel_type, node))? {
			CacheState::Pending => Ok(Steering::pending()),
			CacheState::Ready(flow) => Ok(Steering::towards(flow.get_field_cell_value(field_cell))),
		}
	}
	/// The path to follow from `region`, [None] while it is pending. A path
	/// already being followed is kept when it crosses `region`
	fn lookup_path(
		&mut self,
		nav: &NavigationLevel,
		region: RegionKey,
	) -> NavResult<Option<(PathKey, Arc<Option<Path>>)>> {
		let current = self.path_key.filter(|key| {
			key.get_target() == self.destination && key.get_travel_type() == self.travel_type
		});
		if let Some(key) = current {
			if let Some(CacheState::Ready(path)) = nav.get_path_cache().get(&key) {
				let crosses = path.as_ref().as_ref().is_some_and(|p| {
					p.find_node(region).is_some()
						&& !p.is_stale(|sector| nav.get_sector_version(self.travel_type, sector))
				});
				if crosses {
					return Ok(Some((key, path)));
				}
			}
		}
		let key = PathKey::new(self.travel_type, region, self.destination);
		self.path_key = Some(key);
		match nav.get_or_request_path(&key)? {
			CacheState::Pending => Ok(None),
			CacheState::Ready(path) => Ok(Some((key, path))),
		}
	}
}
