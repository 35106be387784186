//! Properties the navigation data has to hold on randomly generated levels
//!

use std::collections::VecDeque;

use bevy::prelude::*;
use bevy_hpa_flowfields::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Build a level of random size and sector resolution with a scattering of
/// obstacles
fn random_level(rng: &mut StdRng) -> NavigationLevel {
	let width = rng.random_range(5..=24);
	let height = rng.random_range(5..=24);
	let resolution = rng.random_range(2..=6);
	let density = rng.random_range(0.15..0.4);
	let mut nav = NavigationLevel::create_level(width, height, resolution, 1, 3).unwrap();
	nav.set_terrain_cost(0, 1, 4).unwrap();
	nav.set_terrain_cost(0, 2, 20).unwrap();
	for row in 0..height {
		for column in 0..width {
			let cell = GridCell::new(column, row);
			if rng.random_bool(density) {
				nav.set_obstacle(cell, true).unwrap();
			} else {
				nav.set_terrain(cell, rng.random_range(0..3)).unwrap();
			}
		}
	}
	nav.rebuild_dirty_sectors();
	nav
}

/// Pick a random open cell, [None] when the level is fully blocked
fn random_open_cell(nav: &NavigationLevel, rng: &mut StdRng) -> Option<GridCell> {
	let (width, height) = nav.get_layout().get_grid_size();
	for _ in 0..1000 {
		let cell = GridCell::new(rng.random_range(0..width), rng.random_range(0..height));
		if !nav.get_level().is_obstacle(cell).unwrap() {
			return Some(cell);
		}
	}
	None
}

/// Flood the whole grid orthogonally from `start`, ignoring sectors entirely
fn brute_force_reachable(nav: &NavigationLevel, start: GridCell, destination: GridCell) -> bool {
	let (width, height) = nav.get_layout().get_grid_size();
	let mut seen = vec![false; width * height];
	let mut queue = VecDeque::from([start]);
	seen[start.get_row() * width + start.get_column()] = true;
	while let Some(cell) = queue.pop_front() {
		if cell == destination {
			return true;
		}
		for neighbour in Ordinal::get_orthogonal_cell_neighbours(cell.get_column_row(), (width, height)) {
			let next = GridCell::new(neighbour.0, neighbour.1);
			let index = next.get_row() * width + next.get_column();
			if !seen[index] && !nav.get_level().is_obstacle(next).unwrap() {
				seen[index] = true;
				queue.push_back(next);
			}
		}
	}
	false
}

#[test]
fn every_cell_is_labeled() {
	let mut rng = StdRng::seed_from_u64(7);
	for _ in 0..20 {
		let nav = random_level(&mut rng);
		for sector in nav.get_layout().iter_sectors() {
			let fields = nav.get_sector_fields(0, sector).unwrap();
			let color_field = fields.get_color_field();
			let (columns, rows) = color_field.get_dimensions();
			for row in 0..rows {
				for column in 0..columns {
					assert!(color_field.get_field_cell_value(FieldCell::new(column, row)) >= 1);
				}
			}
		}
	}
}

#[test]
fn portals_mirror_across_boundaries() {
	let mut rng = StdRng::seed_from_u64(11);
	for _ in 0..20 {
		let nav = random_level(&mut rng);
		let layout = *nav.get_layout();
		for sector in layout.iter_sectors() {
			let portals = nav.get_sector_fields(0, sector).unwrap().get_graph().get_portals();
			for (ordinal, neighbour) in layout.get_sector_neighbours_with_ordinal(sector) {
				let neighbour_portals =
					nav.get_sector_fields(0, neighbour).unwrap().get_graph().get_portals();
				assert_eq!(
					portals.get_portals_for_side(ordinal).count(),
					neighbour_portals.get_portals_for_side(ordinal.inverse()).count(),
					"portal count across {:?} -> {:?}",
					sector,
					neighbour
				);
			}
			for portal in portals.get() {
				let neighbour_portals = nav
					.get_sector_fields(0, portal.get_neighbour())
					.unwrap()
					.get_graph()
					.get_portals();
				let mirror = neighbour_portals
					.find(portal.get_ordinal().inverse(), portal.get_neighbour_cell())
					.map(|i| neighbour_portals.get()[i])
					.unwrap();
				// the reverse edge leads straight back
				assert_eq!(sector, mirror.get_neighbour());
				assert_eq!(portal.get_cell(), mirror.get_neighbour_cell());
			}
		}
	}
}

#[test]
fn path_exists_iff_brute_force_reaches() {
	let mut rng = StdRng::seed_from_u64(42);
	for _ in 0..40 {
		let nav = random_level(&mut rng);
		let (width, height) = nav.get_layout().get_grid_size();
		for _ in 0..6 {
			let Some(start) = random_open_cell(&nav, &mut rng) else {
				continue;
			};
			// destinations include walls, which are never reachable
			let destination = GridCell::new(rng.random_range(0..width), rng.random_range(0..height));
			let path = nav.find_path(start, destination, 0).unwrap();
			assert_eq!(
				brute_force_reachable(&nav, start, destination),
				path.is_some(),
				"path from {:?} to {:?}",
				start,
				destination
			);
			if let Some(path) = path {
				let last = path.get_destination().unwrap();
				assert!(last.is_terminal());
				let (sector, cell) = nav.get_layout().to_field_cell(destination);
				assert_eq!(sector, last.get_sector());
				assert_eq!(cell, last.get_cell());
			}
		}
	}
}

#[test]
fn rebuild_with_identical_data_is_deterministic() {
	let mut rng = StdRng::seed_from_u64(3);
	for _ in 0..10 {
		let mut nav = random_level(&mut rng);
		let before: Vec<SectorFields> = nav
			.get_layout()
			.iter_sectors()
			.map(|s| nav.get_sector_fields(0, s).unwrap().clone())
			.collect();
		// flag every sector by changing a terrain cost and changing it back
		nav.set_terrain_cost(0, 1, 5).unwrap();
		nav.set_terrain_cost(0, 1, 4).unwrap();
		let rebuilt = nav.rebuild_dirty_sectors();
		assert_eq!(nav.get_layout().get_sector_total(), rebuilt.len());
		for (sector, old) in nav.get_layout().iter_sectors().zip(before.iter()) {
			let new = nav.get_sector_fields(0, sector).unwrap();
			assert_eq!(old.get_version() + 1, new.get_version());
			assert_eq!(old.get_color_field(), new.get_color_field());
			assert_eq!(old.get_graph(), new.get_graph());
		}
	}
}

#[test]
fn flow_leads_every_region_cell_to_the_goal() {
	let mut rng = StdRng::seed_from_u64(19);
	for _ in 0..25 {
		let mut cost_field = CostField::new((12, 12), 1);
		for row in 0..12 {
			for column in 0..12 {
				let cost = if rng.random_bool(0.25) {
					WALL_COST
				} else {
					rng.random_range(1..=12)
				};
				cost_field.set_field_cell_value(cost, FieldCell::new(column, row));
			}
		}
		let goal_cell = FieldCell::new(rng.random_range(0..12), rng.random_range(0..12));
		cost_field.set_field_cell_value(1, goal_cell);
		let color_field = ColorField::new(&cost_field);
		let goal_color = color_field.get_field_cell_value(goal_cell);
		let flow = calculate_flow_field(&cost_field, &color_field, FieldRect::from_cell(goal_cell), None);
		for row in 0..12 {
			for column in 0..12 {
				let start = FieldCell::new(column, row);
				if cost_field.is_wall(start) || color_field.get_field_cell_value(start) != goal_color {
					continue;
				}
				let mut current = start;
				let mut steps = 0;
				while current != goal_cell {
					let (d_column, d_row) = flow.get_step(current).get_offset();
					assert!(
						(d_column, d_row) != (0, 0),
						"flow from {:?} stalled at {:?}",
						start,
						current
					);
					current = FieldCell::new(
						(current.get_column() as i32 + d_column) as usize,
						(current.get_row() as i32 + d_row) as usize,
					);
					assert!(!cost_field.is_wall(current));
					steps += 1;
					assert!(steps <= 144, "flow from {:?} cycles", start);
				}
			}
		}
	}
}

#[test]
fn diagonal_sector_chain_scenario() {
	let nav = NavigationLevel::create_level(10, 10, 5, 1, 1).unwrap();
	assert_eq!(4, nav.get_layout().get_sector_total());
	let path = nav
		.find_path(GridCell::new(0, 0), GridCell::new(9, 9), 0)
		.unwrap()
		.unwrap();
	let nodes = path.get_nodes();
	assert_eq!(3, nodes.len());
	assert_eq!(SectorID::new(0, 0), nodes[0].get_sector());
	assert!(
		nodes[1].get_sector() == SectorID::new(1, 0) || nodes[1].get_sector() == SectorID::new(0, 1)
	);
	assert_eq!(SectorID::new(1, 1), nodes[2].get_sector());
	// every waypoint resolves into a flow field
	for node in nodes {
		let flow = nav
			.compute_flow(
				node.get_sector(),
				0,
				node.get_goal_bounds(),
				node.get_exit_direction(),
			)
			.unwrap();
		assert_eq!(node.get_color(), flow.get_color());
	}
}

#[test]
fn walled_sector_is_isolated() {
	let mut nav = NavigationLevel::create_level(9, 9, 3, 1, 1).unwrap();
	for row in 3..6 {
		for column in 3..6 {
			nav.set_obstacle(GridCell::new(column, row), true).unwrap();
		}
	}
	nav.rebuild_dirty_sectors();
	let centre = SectorID::new(1, 1);
	assert!(nav.get_sector_fields(0, centre).unwrap().get_graph().get_portals().is_empty());
	for (ordinal, neighbour) in nav.get_layout().get_sector_neighbours_with_ordinal(centre) {
		let portals = nav.get_sector_fields(0, neighbour).unwrap().get_graph().get_portals();
		assert_eq!(0, portals.get_portals_for_side(ordinal.inverse()).count());
	}
	assert!(nav.find_path(GridCell::new(0, 0), GridCell::new(4, 4), 0).unwrap().is_none());
	assert!(nav.find_path(GridCell::new(4, 4), GridCell::new(8, 8), 0).unwrap().is_none());
	// the rest of the level still connects around it
	assert!(nav.find_path(GridCell::new(0, 0), GridCell::new(8, 8), 0).unwrap().is_some());
}

#[test]
fn concurrent_flow_requests_share_one_computation() {
	let nav = NavigationLevel::create_level(20, 20, 10, 1, 1).unwrap();
	let key = FlowKey::new(
		SectorID::new(1, 1),
		0,
		FieldRect::from_cell(FieldCell::new(4, 4)),
		None,
	);
	std::thread::scope(|s| {
		for _ in 0..8 {
			s.spawn(|| {
				assert!(nav.get_or_request_flow(&key).unwrap().is_pending());
			});
		}
	});
	assert_eq!(1, nav.get_flow_cache().len());
	assert_eq!(1, nav.process_requests());
	let flow = nav.get_or_request_flow(&key).unwrap();
	let flow = flow.ready().unwrap();
	assert_eq!(Vec2::ZERO, flow.get_field_cell_value(FieldCell::new(4, 4)));
}
