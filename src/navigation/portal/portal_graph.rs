//! The portal graph is stored piecewise, each sector owns a [SectorGraph]
//! describing its own portals:
//!
//! - every portal has one external edge of weight `1` leading to its mirror
//!   in the neighbouring sector. External edges are resolved through the
//!   neighbours [Portals] lookup at search time so a sector can be rebuilt
//!   without touching any other sector
//! - every ordered pair of portals sharing an island has an internal edge
//!   weighted by the cheapest route between them across the [CostField],
//!   when such a route exists
//! - every island has a [SectorRoot] with weight `0` edges to each of its
//!   portals, searches start from the root of the island an actor stands in
//!
//! ```text
//!  ___________________ ___________________
//! |                   |                   |
//! |                   |                   |
//! |        root ----- P1 ---(1)--- P1'    |
//! |         |  \      |                   |
//! |         |  (w)    |                   |
//! |_________P2__\_____|___________________|
//!           |
//!          (1)
//! ```
//!

use std::collections::BTreeMap;

use crate::prelude::*;

/// A weighted directed edge between two portals of the same sector
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortalEdge {
	/// Position of the target portal in the sectors [Portals]
	target: usize,
	/// Cost of crossing from the source portal to the target
	weight: f32,
}

impl PortalEdge {
	pub fn get_target(&self) -> usize {
		self.target
	}
	pub fn get_weight(&self) -> f32 {
		self.weight
	}
}

/// Aggregates every portal of one island
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectorRoot {
	/// Island the root represents
	color: i32,
	/// Positions of the islands portals, each reached with weight `0`
	portals: Vec<usize>,
}

impl SectorRoot {
	pub fn get_color(&self) -> i32 {
		self.color
	}
	pub fn get_portals(&self) -> &[usize] {
		&self.portals
	}
}

/// Portals, internal edges and island roots of one sector for one travel type
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectorGraph {
	/// The sectors portals, node positions are indices into this list
	portals: Portals,
	/// `internal_edges[portal]` lists the portals reachable within the sector
	internal_edges: Vec<Vec<PortalEdge>>,
	/// Root of each island that owns at least one portal
	roots: BTreeMap<i32, SectorRoot>,
}

impl SectorGraph {
	/// Build the portals of a sector then connect them
	pub fn build(
		level: &Level,
		sector_id: SectorID,
		travel_type: usize,
		cost_field: &CostField,
		color_field: &ColorField,
	) -> Self {
		let portals = Portals::build(level, sector_id, travel_type, cost_field, color_field);
		let mut internal_edges = vec![Vec::new(); portals.len()];
		let mut roots: BTreeMap<i32, SectorRoot> = BTreeMap::new();
		for (i, portal) in portals.get().iter().enumerate() {
			// one local search per portal covers every pairing it starts
			let costs = cost_field.get_path_costs_from(portal.get_cell());
			for (j, other) in portals.get().iter().enumerate() {
				if i == j || other.get_color() != portal.get_color() {
					continue;
				}
				match costs[cost_field.get_index(other.get_cell())] {
					Some(weight) if weight > 0 => internal_edges[i].push(PortalEdge {
						target: j,
						weight: weight as f32,
					}),
					_ => {}
				}
			}
			roots
				.entry(portal.get_color())
				.or_insert_with(|| SectorRoot {
					color: portal.get_color(),
					portals: Vec::new(),
				})
				.portals
				.push(i);
		}
		SectorGraph {
			portals,
			internal_edges,
			roots,
		}
	}
	pub fn get_portals(&self) -> &Portals {
		&self.portals
	}
	/// Internal edges leaving a portal
	pub fn get_internal_edges(&self, portal: usize) -> &[PortalEdge] {
		self.internal_edges
			.get(portal)
			.map(|e| e.as_slice())
			.unwrap_or(&[])
	}
	/// Root of an island, [None] when the island has no portals
	pub fn get_root(&self, color: i32) -> Option<&SectorRoot> {
		self.roots.get(&color)
	}
	pub fn get_roots(&self) -> impl Iterator<Item = &SectorRoot> {
		self.roots.values()
	}
	/// Total internal edges, handy for diagnostics
	pub fn get_internal_edge_count(&self) -> usize {
		self.internal_edges.iter().map(|e| e.len()).sum()
	}
}
