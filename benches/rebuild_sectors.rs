//! Measure rebuilding sectors after a scattering of obstacles has been placed
//! across the level
//!

use bevy_hpa_flowfields::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

/// Open level with an obstacle dropped into every fourth sector
fn prepare_level() -> NavigationLevel {
	let mut nav = NavigationLevel::create_level(500, 500, 10, 2, 1).unwrap();
	for row in (5..500).step_by(20) {
		for column in (5..500).step_by(20) {
			nav.set_obstacle(GridCell::new(column, row), true).unwrap();
		}
	}
	nav
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("data_initialisation");
	group.significance_level(0.05).sample_size(100);
	group.bench_function("rebuild_sectors", |b| {
		b.iter_batched(
			prepare_level,
			|mut nav| black_box(nav.rebuild_dirty_sectors()),
			BatchSize::LargeInput,
		)
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
