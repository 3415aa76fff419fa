//! Pathfinding benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use conqueror_core::grid::NavGrid;
use conqueror_core::pathfinding::find_path;
use conqueror_core::unit::GridPos;

fn bench_open_grid(c: &mut Criterion) {
    let grid = NavGrid::new(64, 64);
    let start = GridPos::new(0, 0);
    let goal = GridPos::new(63, 63);

    c.bench_function("find_path_open_64x64", |b| {
        b.iter(|| find_path(black_box(&grid), black_box(start), black_box(goal)));
    });
}

fn bench_walled_grid(c: &mut Criterion) {
    let mut grid = NavGrid::new(64, 64);
    // Staggered walls force long detours.
    for y in (8..64).step_by(16) {
        grid.block_span(y, 0, 55);
        grid.block_span(y + 8, 8, 63);
    }
    let start = GridPos::new(0, 0);
    let goal = GridPos::new(63, 63);

    c.bench_function("find_path_walled_64x64", |b| {
        b.iter(|| find_path(black_box(&grid), black_box(start), black_box(goal)));
    });
}

fn bench_no_path(c: &mut Criterion) {
    let mut grid = NavGrid::new(64, 64);
    grid.block_span(32, 0, 63);
    let start = GridPos::new(0, 0);
    let goal = GridPos::new(63, 63);

    c.bench_function("find_path_unreachable_64x64", |b| {
        b.iter(|| find_path(black_box(&grid), black_box(start), black_box(goal)));
    });
}

criterion_group!(benches, bench_open_grid, bench_walled_grid, bench_no_path);
criterion_main!(benches);
