//! Defines the Bevy [Plugin] for HPA* FlowFields
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod level_layer;
pub mod navigation_layer;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Apply level changes and rebuild sectors
	Mutate,
	/// Compute pending requests
	Calculate,
	/// Steer followers
	Steer,
}

pub struct HpaFlowFieldsPlugin;

impl Plugin for HpaFlowFieldsPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<Ordinal>()
			.register_type::<SectorID>()
			.register_type::<SectorLayout>()
			.register_type::<FieldCell>()
			.register_type::<GridCell>()
			.register_type::<FieldRect>()
			.register_type::<GridRect>()
			.register_type::<LevelSettings>()
			.register_type::<NavigationSettings>()
			.register_type::<RegionKey>()
			.register_type::<PortalPathNode>()
			.register_type::<Path>()
			.register_type::<PathKey>()
			.register_type::<FlowKey>()
			.register_type::<LosKey>()
			.register_type::<FlowField>()
			.register_type::<LosField>()
			.register_type::<Steering>()
			.register_type::<FlowFollower>()
			.register_type::<CellChange>()
			.add_event::<level_layer::EventUpdateLevelCell>()
			.add_event::<level_layer::EventUpdateTerrainCost>()
			.add_event::<level_layer::EventSectorsRebuilt>()
			.configure_sets(
				Update,
				(
					OrderingSet::Mutate,
					OrderingSet::Calculate,
					OrderingSet::Steer,
				)
					.chain(),
			)
			.add_systems(
				Update,
				(
					(
						level_layer::process_level_updates,
						level_layer::rebuild_dirty_sectors,
					)
						.chain()
						.in_set(OrderingSet::Mutate),
					navigation_layer::process_navigation_requests.in_set(OrderingSet::Calculate),
					navigation_layer::steer_followers.in_set(OrderingSet::Steer),
				),
			);
	}
}
