//! Measure generating the FlowField of a sector holding a snake-like maze of
//! impassable cells
//!
//! ```txt
//!  _____________________________
//! |__|__|__|xx|__|__|__|xx|__|__|
//! |__|xx|__|xx|__|xx|__|xx|__|xx|
//! |__|xx|__|xx|__|xx|__|xx|__|xx|
//! |__|xx|__|xx|__|xx|__|xx|__|xx|
//! |__|xx|__|xx|__|xx|__|xx|__|xx|
//! |__|xx|__|xx|__|xx|__|xx|__|xx|
//! |__|xx|__|xx|__|xx|__|xx|__|xx|
//! |__|xx|__|xx|__|xx|__|xx|__|xx|
//! |__|xx|__|xx|__|xx|__|xx|__|xx|
//! |__|xx|__|__|__|xx|__|__|__|xx|
//! ```
//!

use bevy_hpa_flowfields::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Walls on every other column, alternately open at the top and bottom
fn prepare_maze(size: usize) -> CostField {
	let mut cost_field = CostField::new((size, size), 1);
	for column in (1..size).step_by(2) {
		let open_top = (column / 2) % 2 == 1;
		for row in 0..size {
			let gap = if open_top { row == 0 } else { row == size - 1 };
			if !gap {
				cost_field.set_field_cell_value(WALL_COST, FieldCell::new(column, row));
			}
		}
	}
	cost_field
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(100);
	let cost_field = prepare_maze(64);
	let color_field = ColorField::new(&cost_field);
	let goal = FieldRect::from_cell(FieldCell::new(0, 0));
	group.bench_function("calc_flow_maze", |b| {
		b.iter(|| {
			calculate_flow_field(
				black_box(&cost_field),
				black_box(&color_field),
				black_box(goal),
				None,
			)
		})
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
