//! Logic relating to computing requested paths and fields and steering the
//! actors that follow them
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Compute the paths, [FlowField]s and [LosField]s requested since the last
/// tick
#[cfg(not(tarpaulin_include))]
pub fn process_navigation_requests(query: Query<&NavigationLevel>) {
	for nav in query.iter() {
		nav.process_requests();
	}
}

/// Steer every [FlowFollower] from the cell it last reported
#[cfg(not(tarpaulin_include))]
pub fn steer_followers(levels: Query<&NavigationLevel>, mut followers: Query<&mut FlowFollower>) {
	let Ok(nav) = levels.single() else {
		return;
	};
	for mut follower in followers.iter_mut() {
		if let Err(e) = follower.steer_from_current(nav) {
			warn!("Cannot steer follower: {}", e);
		}
	}
}
