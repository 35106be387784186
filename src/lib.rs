//! This is a plugin for Bevy game engine to setup and handle the logic for
//! hierarchical pathfinding across large grids, where movement within each
//! sector is driven by FlowFields
//!

pub mod bundle;
pub mod navigation;
pub mod plugin;

pub mod prelude;
