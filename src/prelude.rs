//! `use bevy_hpa_flowfields::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::navigation::{
	cache::*,
	error::*,
	fields::{
		color_field::*, cost_field::*, flow_field::*, integration_field::*, los_field::*, *,
	},
	level::*,
	navigation_level::*,
	navigator::*,
	portal::{pathfinder::*, portal_graph::*, portals::*},
	sectors::{sector_fields::*, *},
	settings::*,
	utilities::*,
};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	plugin::{level_layer::*, navigation_layer::*, *},
};
