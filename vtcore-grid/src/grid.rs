// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vtcore_common::coord::Coord;
use vtcore_common::style::Style;

use crate::cell::Cell;

/// The screen: a row-major `W x H` array of cells, owned exclusively by the
/// emulator. Resize is externally triggered and preserves the top-left
/// rectangle; new area is erased with default style.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    /// Index of the last cell written, for grapheme cluster extension under
    /// mode 2027. `None` right after construction or resize.
    last_write: Option<usize>,
}

impl Grid {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width.saturating_mul(height)],
            last_write: None,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.col < self.width && coord.row < self.height
    }

    fn index(&self, coord: Coord) -> usize {
        coord.row * self.width + coord.col
    }

    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        if self.in_bounds(coord) {
            Some(&self.cells[self.index(coord)])
        } else {
            None
        }
    }

    #[must_use]
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        if self.in_bounds(coord) {
            let idx = self.index(coord);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    pub fn set(&mut self, coord: Coord, cell: Cell) {
        if self.in_bounds(coord) {
            let idx = self.index(coord);
            self.cells[idx] = cell;
            self.last_write = Some(idx);
        }
    }

    /// The cell last written via `set`, if it is still the most recent write
    /// and still in bounds (resize clears this).
    #[must_use]
    pub fn last_write(&self) -> Option<Coord> {
        self.last_write.map(|idx| Coord::new(idx % self.width, idx / self.width))
    }

    pub fn clear_last_write(&mut self) {
        self.last_write = None;
    }

    /// Erase every cell in `row` from column `from` (inclusive) to `to`
    /// (inclusive), filling with cells that inherit `style`'s background
    /// per the erase coloring rule.
    pub fn erase_row_range(&mut self, row: usize, from: usize, to: usize, style: &Style) {
        if row >= self.height {
            return;
        }
        let to = to.min(self.width.saturating_sub(1));
        for col in from..=to.min(self.width.saturating_sub(1)) {
            if col >= self.width {
                break;
            }
            let idx = row * self.width + col;
            self.cells[idx] = Cell::erased(style);
        }
        self.last_write = None;
    }

    /// Shift cells `[left..=right]` on `row` left by `count`, padding the
    /// vacated right side with erased cells. Used by DCH/ICH.
    pub fn shift_row_left(&mut self, row: usize, left: usize, right: usize, count: usize, style: &Style) {
        if row >= self.height || left > right || right >= self.width {
            return;
        }
        let base = row * self.width;
        let span = right - left + 1;
        let count = count.min(span);
        for col in left..=right {
            let src_col = col + count;
            self.cells[base + col] = if src_col <= right {
                self.cells[base + src_col].clone()
            } else {
                Cell::erased(style)
            };
        }
        self.last_write = None;
    }

    /// Shift cells `[left..=right]` on `row` right by `count`, padding the
    /// vacated left side with erased cells. Used by ICH.
    pub fn shift_row_right(&mut self, row: usize, left: usize, right: usize, count: usize, style: &Style) {
        if row >= self.height || left > right || right >= self.width {
            return;
        }
        let base = row * self.width;
        let span = right - left + 1;
        let count = count.min(span);
        for col in (left..=right).rev() {
            self.cells[base + col] = if col >= left + count {
                self.cells[base + col - count].clone()
            } else {
                Cell::erased(style)
            };
        }
        self.last_write = None;
    }

    /// Shift rows `[top..=bottom]` up by one within columns `[left..=right]`,
    /// erasing the vacated bottom row. Used by scroll-on-LF.
    pub fn scroll_up_region(&mut self, top: usize, bottom: usize, left: usize, right: usize, style: &Style) {
        if bottom >= self.height || top > bottom || right >= self.width || left > right {
            return;
        }
        for row in top..bottom {
            for col in left..=right {
                let src = (row + 1) * self.width + col;
                let dst = row * self.width + col;
                self.cells[dst] = self.cells[src].clone();
            }
        }
        self.erase_row_range(bottom, left, right, style);
        self.last_write = None;
    }

    /// Shift rows `[top..=bottom]` down by one within columns `[left..=right]`,
    /// erasing the vacated top row. Used by reverse-index.
    pub fn scroll_down_region(&mut self, top: usize, bottom: usize, left: usize, right: usize, style: &Style) {
        if bottom >= self.height || top > bottom || right >= self.width || left > right {
            return;
        }
        for row in (top..bottom).rev() {
            for col in left..=right {
                let src = row * self.width + col;
                let dst = (row + 1) * self.width + col;
                self.cells[dst] = self.cells[src].clone();
            }
        }
        self.erase_row_range(top, left, right, style);
        self.last_write = None;
    }

    /// Resize in place, preserving the top-left rectangle; newly exposed
    /// area is erased with `Style::default()`.
    pub fn resize(&mut self, new_width: usize, new_height: usize) {
        let mut new_cells = vec![Cell::default(); new_width.saturating_mul(new_height)];
        let copy_width = self.width.min(new_width);
        let copy_height = self.height.min(new_height);
        for row in 0..copy_height {
            for col in 0..copy_width {
                new_cells[row * new_width + col] = self.cells[row * self.width + col].clone();
            }
        }
        self.cells = new_cells;
        self.width = new_width;
        self.height = new_height;
        self.last_write = None;
    }
}
