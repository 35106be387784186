//! Best-first search across the portal graph.
//!
//! A search starts from the root of the island the actor stands in, each of
//! the roots portals is seeded with the straight line distance from the actor
//! (or `0` when searching on behalf of a whole region). Nodes are expanded in
//! order of `accumulated weight + distance to the destination`, ties go to the
//! node queued first. The search ends when a node inside the destination
//! sector and region is taken from the queue.
//!
//! The resulting [Path] keeps one [PortalPathNode] for every sector boundary
//! crossed, naming the portal to leave through, followed by a terminal node at
//! the destination itself.
//!

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::prelude::*;
use bevy::prelude::*;

/// A connected region of a sector, the unit paths are shared between
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Reflect)]
pub struct RegionKey {
	/// Sector of the region
	sector: SectorID,
	/// Color of the region within the sector
	color: i32,
}

impl RegionKey {
	/// Create a new instance of [RegionKey]
	pub fn new(sector: SectorID, color: i32) -> Self {
		RegionKey { sector, color }
	}
	pub fn get_sector(&self) -> SectorID {
		self.sector
	}
	pub fn get_color(&self) -> i32 {
		self.color
	}
}

/// One waypoint of a [Path]
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct PortalPathNode {
	/// Sector being crossed
	sector: SectorID,
	/// Sub-goal cell within the sector, the portal centre or the destination
	cell: FieldCell,
	/// Every cell that counts as reaching the sub-goal
	goal_bounds: FieldRect,
	/// Side of the sector the actor leaves through, [None] for the terminal
	exit_direction: Option<Ordinal>,
	/// Region of the sector the waypoint applies to
	color: i32,
	/// Version of the sector when the path was computed
	sector_version: u64,
}

impl PortalPathNode {
	pub fn get_sector(&self) -> SectorID {
		self.sector
	}
	pub fn get_cell(&self) -> FieldCell {
		self.cell
	}
	pub fn get_goal_bounds(&self) -> FieldRect {
		self.goal_bounds
	}
	pub fn get_exit_direction(&self) -> Option<Ordinal> {
		self.exit_direction
	}
	pub fn get_color(&self) -> i32 {
		self.color
	}
	pub fn get_sector_version(&self) -> u64 {
		self.sector_version
	}
	/// Whether this is the final waypoint
	pub fn is_terminal(&self) -> bool {
		self.exit_direction.is_none()
	}
}

/// Ordered waypoints from a start region to a destination cell
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct Path {
	/// Travel type the path was computed for
	travel_type: usize,
	/// Waypoints, the last one is always terminal
	nodes: Vec<PortalPathNode>,
}

impl Path {
	pub fn get_travel_type(&self) -> usize {
		self.travel_type
	}
	pub fn get_nodes(&self) -> &[PortalPathNode] {
		&self.nodes
	}
	/// The terminal waypoint
	pub fn get_destination(&self) -> Option<&PortalPathNode> {
		self.nodes.last()
	}
	/// Waypoint to follow while standing in `region`
	pub fn find_node(&self, region: RegionKey) -> Option<&PortalPathNode> {
		self.nodes
			.iter()
			.find(|n| n.sector == region.get_sector() && n.color == region.get_color())
	}
	/// Whether any sector crossed has been rebuilt since the path was computed
	pub fn is_stale(&self, current_version: impl Fn(SectorID) -> u64) -> bool {
		self.nodes
			.iter()
			.any(|n| current_version(n.sector) != n.sector_version)
	}
}

/// Where a search begins
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOrigin {
	/// An actor position, portals are seeded with their distance from it
	Cell(GridCell),
	/// A whole region, every portal of the region is seeded with `0`
	Region(RegionKey),
}

/// A portal in the search, `(sector index, portal index)`
type NodeId = (usize, usize);

/// Entry of the open set
#[derive(Clone, Copy, Debug)]
struct QueueEntry {
	/// Accumulated weight plus heuristic
	score: f32,
	/// Insertion order used to break ties
	sequence: u64,
	/// Accumulated weight
	weight: f32,
	/// Portal being queued
	node: NodeId,
}

// BinaryHeap is a max-heap, invert so the lowest score and then the earliest
// insertion pops first
impl Ord for QueueEntry {
	fn cmp(&self, other: &Self) -> Ordering {
		other
			.score
			.total_cmp(&self.score)
			.then_with(|| other.sequence.cmp(&self.sequence))
	}
}

impl PartialOrd for QueueEntry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl PartialEq for QueueEntry {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for QueueEntry {}

/// Read-only view of the portal graph of one travel type
pub struct PathSearch<'a> {
	/// Sector partitioning
	layout: &'a SectorLayout,
	/// Per-sector fields of the travel type, indexed by sector index
	sectors: &'a [SectorFields],
	/// Travel type the fields belong to
	travel_type: usize,
	/// Portal expansions allowed before giving up
	max_nodes: usize,
}

impl<'a> PathSearch<'a> {
	/// Create a new instance of [PathSearch]
	pub fn new(
		layout: &'a SectorLayout,
		sectors: &'a [SectorFields],
		travel_type: usize,
		max_nodes: usize,
	) -> Self {
		PathSearch {
			layout,
			sectors,
			travel_type,
			max_nodes,
		}
	}
	/// The region a cell belongs to
	pub fn get_region(&self, cell: GridCell) -> RegionKey {
		let (sector, field_cell) = self.layout.to_field_cell(cell);
		let fields = &self.sectors[self.layout.get_sector_index(sector)];
		RegionKey::new(
			sector,
			fields.get_color_field().get_field_cell_value(field_cell),
		)
	}
	/// The portal a node refers to
	fn portal(&self, node: NodeId) -> &Portal {
		&self.sectors[node.0].get_graph().get_portals().get()[node.1]
	}
	/// Centre of a portal as a level cell
	fn portal_cell(&self, node: NodeId) -> GridCell {
		let sector = self.layout.get_sector_from_index(node.0);
		self.layout.to_grid_cell(sector, self.portal(node).get_cell())
	}
	/// Find a path from `origin` to `destination`, [None] when the destination
	/// is a wall, cannot be reached or the search exceeds its node limit. Both
	/// cells are expected to lie within the level
	pub fn find(&self, origin: SearchOrigin, destination: GridCell) -> Option<Path> {
		let target = self.get_region(destination);
		let (_, target_cell) = self.layout.to_field_cell(destination);
		let target_index = self.layout.get_sector_index(target.get_sector());
		// walls carry a region label but can never be entered
		if self.sectors[target_index]
			.get_cost_field()
			.is_wall(target_cell)
		{
			return None;
		}
		let terminal = PortalPathNode {
			sector: target.get_sector(),
			cell: target_cell,
			goal_bounds: FieldRect::from_cell(target_cell),
			exit_direction: None,
			color: target.get_color(),
			sector_version: self.sectors[target_index].get_version(),
		};
		let (start, start_cell) = match origin {
			SearchOrigin::Cell(cell) => (self.get_region(cell), Some(cell)),
			SearchOrigin::Region(region) => (region, None),
		};
		if start == target {
			return Some(Path {
				travel_type: self.travel_type,
				nodes: vec![terminal],
			});
		}
		let start_index = self.layout.get_sector_index(start.get_sector());
		let root = self.sectors[start_index]
			.get_graph()
			.get_root(start.get_color())?;

		let mut queue = BinaryHeap::new();
		let mut sequence = 0;
		let mut best: HashMap<NodeId, f32> = HashMap::new();
		let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
		let mut push = |queue: &mut BinaryHeap<QueueEntry>, node: NodeId, weight: f32| {
			let score = weight + self.portal_cell(node).distance(&destination);
			queue.push(QueueEntry {
				score,
				sequence,
				weight,
				node,
			});
			sequence += 1;
		};
		for portal in root.get_portals() {
			let node = (start_index, *portal);
			let weight = start_cell
				.map(|cell| cell.distance(&self.portal_cell(node)))
				.unwrap_or(0.0);
			best.insert(node, weight);
			push(&mut queue, node, weight);
		}
		let mut expanded = 0;
		while let Some(entry) = queue.pop() {
			let node = entry.node;
			if best.get(&node).is_some_and(|w| entry.weight > *w) {
				// superseded by a cheaper route
				continue;
			}
			expanded += 1;
			if expanded > self.max_nodes {
				warn!(
					"Path search from {:?} to {:?} gave up after {} nodes",
					start, destination, self.max_nodes
				);
				return None;
			}
			let portal = *self.portal(node);
			if node.0 == target_index && portal.get_color() == target.get_color() {
				return Some(self.build_path(node, &parents, terminal));
			}
			let mut neighbours: Vec<(NodeId, f32)> = Vec::new();
			// external edge into the mirrored portal
			let neighbour_index = self.layout.get_sector_index(portal.get_neighbour());
			match self.sectors[neighbour_index]
				.get_graph()
				.get_portals()
				.find(portal.get_ordinal().inverse(), portal.get_neighbour_cell())
			{
				Some(mirror) => neighbours.push(((neighbour_index, mirror), 1.0)),
				None => debug!(
					"Portal {:?} of sector {:?} has no mirror",
					portal.get_cell(),
					self.layout.get_sector_from_index(node.0)
				),
			}
			for edge in self.sectors[node.0].get_graph().get_internal_edges(node.1) {
				neighbours.push(((node.0, edge.get_target()), edge.get_weight()));
			}
			for (next, edge_weight) in neighbours {
				let weight = entry.weight + edge_weight;
				if best.get(&next).is_none_or(|w| weight < *w) {
					best.insert(next, weight);
					parents.insert(next, node);
					push(&mut queue, next, weight);
				}
			}
		}
		None
	}
	/// Walk the parent links back from the goal and keep the portals where the
	/// route leaves a sector
	fn build_path(
		&self,
		goal: NodeId,
		parents: &HashMap<NodeId, NodeId>,
		terminal: PortalPathNode,
	) -> Path {
		let mut chain = vec![goal];
		let mut current = goal;
		while let Some(parent) = parents.get(&current) {
			chain.push(*parent);
			current = *parent;
		}
		chain.reverse();
		let mut nodes = Vec::new();
		for pair in chain.windows(2) {
			let (from, to) = (pair[0], pair[1]);
			if from.0 == to.0 {
				continue;
			}
			let portal = self.portal(from);
			nodes.push(PortalPathNode {
				sector: self.layout.get_sector_from_index(from.0),
				cell: portal.get_cell(),
				goal_bounds: portal.get_bounds(),
				exit_direction: Some(portal.get_ordinal()),
				color: portal.get_color(),
				sector_version: self.sectors[from.0].get_version(),
			});
		}
		nodes.push(terminal);
		Path {
			travel_type: self.travel_type,
			nodes,
		}
	}
}
