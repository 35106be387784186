//! A Portal indicates a pathable area from one Sector to another.
//!
//! The [portal_graph::SectorGraph] of each sector connects its portals, a
//! [pathfinder::PathSearch] walks the graphs of all sectors to find the
//! sequence of portals leading to a destination.

pub mod pathfinder;
pub mod portal_graph;
pub mod portals;
