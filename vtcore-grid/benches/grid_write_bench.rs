// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use vtcore_common::coord::Coord;
use vtcore_common::style::Style;
use vtcore_grid::cell::Cell;
use vtcore_grid::grid::Grid;

fn bench_fill_screen(bench: &mut Criterion) {
    let mut group = bench.benchmark_group("grid_fill_screen");
    group.bench_with_input(BenchmarkId::from_parameter("100x40"), &(100, 40), |b, &(w, h)| {
        b.iter(|| {
            let mut grid = Grid::new(w, h);
            let style = Style::default();
            for row in 0..h {
                for col in 0..w {
                    grid.set(Coord::new(col, row), Cell::new("X", style.clone()));
                }
            }
            grid
        });
    });
    group.finish();
}

fn bench_scroll_region(bench: &mut Criterion) {
    let mut group = bench.benchmark_group("grid_scroll_up_region");
    group.bench_with_input(BenchmarkId::from_parameter("100x40"), &(100, 40), |b, &(w, h)| {
        let mut grid = Grid::new(w, h);
        let style = Style::default();
        for row in 0..h {
            grid.set(Coord::new(0, row), Cell::new("X", style.clone()));
        }
        b.iter(|| {
            grid.scroll_up_region(0, h - 1, 0, w - 1, &style);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_fill_screen, bench_scroll_region);
criterion_main!(benches);
