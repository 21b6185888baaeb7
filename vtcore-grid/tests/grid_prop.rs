// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use proptest::prelude::*;
use vtcore_common::coord::Coord;
use vtcore_common::style::Style;
use vtcore_grid::cell::Cell;
use vtcore_grid::grid::Grid;

proptest! {
    /// A random walk of writes, erases, shifts, scrolls, and resizes should
    /// never panic and should always leave the grid's own bounds consistent,
    /// regardless of how the random row/column arguments relate to the
    /// current (possibly just-resized) dimensions.
    #[test]
    fn random_ops_never_panic_and_stay_in_bounds(
        width in 1usize..12,
        height in 1usize..12,
        ops in proptest::collection::vec((0u8..8, any::<u8>(), any::<u8>(), any::<u8>()), 0..200),
    ) {
        let mut grid = Grid::new(width, height);
        let style = Style::default();

        for (kind, a, b, c) in ops {
            let w = grid.width();
            let h = grid.height();
            if w == 0 || h == 0 {
                continue;
            }
            let row = usize::from(a) % h;
            let left = usize::from(b) % w;
            let right = usize::from(c) % w;
            let (left, right) = (left.min(right), left.max(right));

            match kind % 8 {
                0 => grid.set(Coord::new(left, row), Cell::new("X", style.clone())),
                1 => grid.erase_row_range(row, left, right, &style),
                2 => grid.shift_row_left(row, left, right, 1, &style),
                3 => grid.shift_row_right(row, left, right, 1, &style),
                4 => grid.scroll_up_region(0, h - 1, left, right, &style),
                5 => grid.scroll_down_region(0, h - 1, left, right, &style),
                6 => grid.resize((usize::from(a) % 12) + 1, (usize::from(b) % 12) + 1),
                _ => {
                    let _ = grid.get(Coord::new(left, row));
                }
            }
        }

        for row in 0..grid.height() {
            for col in 0..grid.width() {
                prop_assert!(grid.get(Coord::new(col, row)).is_some());
            }
        }
        prop_assert!(grid.get(Coord::new(grid.width(), 0)).is_none());
    }
}
