// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cursor motion, deferred wrap, tab stops, and scroll regions (C5).

use std::collections::BTreeSet;

use vtcore_common::coord::Coord;
use vtcore_common::scroll::ScrollRegion;
use vtcore_common::style::Style;
use vtcore_grid::cell::Cell;
use vtcore_grid::grid::Grid;

use crate::grapheme;

#[derive(Debug, Clone)]
pub struct CursorState {
    pub pos: Coord,
    pub style: Style,
    pub deferred_wrap: bool,
    pub last_index: Option<usize>,
    pub autowrap: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            pos: Coord::origin(),
            style: Style::default(),
            deferred_wrap: false,
            last_index: None,
            autowrap: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SavedCursor {
    pub pos: Coord,
    pub style: Style,
    pub deferred_wrap: bool,
}

impl CursorState {
    #[must_use]
    pub fn save(&self) -> SavedCursor {
        SavedCursor {
            pos: self.pos,
            style: self.style.clone(),
            deferred_wrap: self.deferred_wrap,
        }
    }

    pub fn restore(&mut self, saved: &SavedCursor) {
        self.pos = saved.pos;
        self.style = saved.style.clone();
        self.deferred_wrap = saved.deferred_wrap;
    }
}

/// Tab-stop set: implicit every-8th-column default (tracks resizes), or an
/// explicit sorted set once anything has been set/cleared (no longer tracks
/// resizes).
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TabStops {
    Default,
    Explicit(BTreeSet<usize>),
}

impl Default for TabStops {
    fn default() -> Self {
        Self::Default
    }
}

impl TabStops {
    #[must_use]
    pub fn next_stop(&self, col: usize, width: usize) -> usize {
        let last = width.saturating_sub(1);
        match self {
            Self::Default => {
                let candidate = (col / 8 + 1) * 8;
                candidate.min(last)
            }
            Self::Explicit(stops) => stops
                .range((col + 1)..)
                .next()
                .copied()
                .unwrap_or(last)
                .min(last),
        }
    }

    #[must_use]
    pub fn prev_stop(&self, col: usize) -> usize {
        match self {
            Self::Default => {
                if col == 0 {
                    0
                } else {
                    (col - 1) / 8 * 8
                }
            }
            Self::Explicit(stops) => stops.range(..col).next_back().copied().unwrap_or(0),
        }
    }

    fn materialize(&mut self, width: usize) -> &mut BTreeSet<usize> {
        if matches!(self, Self::Default) {
            let mut stops = BTreeSet::new();
            let mut col = 8;
            while col < width {
                stops.insert(col);
                col += 8;
            }
            *self = Self::Explicit(stops);
        }
        match self {
            Self::Explicit(stops) => stops,
            Self::Default => unreachable!(),
        }
    }

    pub fn set(&mut self, col: usize, width: usize) {
        self.materialize(width).insert(col);
    }

    pub fn clear(&mut self, col: usize, width: usize) {
        self.materialize(width).remove(&col);
    }

    pub fn clear_all(&mut self) {
        *self = Self::Explicit(BTreeSet::new());
    }

    pub fn reset_default(&mut self) {
        *self = Self::Default;
    }
}

pub fn cursor_up(cursor: &mut CursorState, n: usize) {
    cursor.pos.row = cursor.pos.row.saturating_sub(n.max(1));
    cursor.deferred_wrap = false;
}

pub fn cursor_down(cursor: &mut CursorState, height: usize, n: usize) {
    cursor.pos.row = (cursor.pos.row + n.max(1)).min(height.saturating_sub(1));
    cursor.deferred_wrap = false;
}

pub fn cursor_left(cursor: &mut CursorState, region: &ScrollRegion, width: usize, n: usize) {
    let (left, _) = region.columns(width);
    cursor.pos.col = cursor.pos.col.saturating_sub(n.max(1)).max(left);
    cursor.deferred_wrap = false;
}

pub fn cursor_right(cursor: &mut CursorState, region: &ScrollRegion, width: usize, n: usize) {
    let (_, right) = region.columns(width);
    cursor.pos.col = (cursor.pos.col + n.max(1)).min(right);
    cursor.deferred_wrap = false;
}

pub fn cursor_to_column(cursor: &mut CursorState, width: usize, col_1based: usize) {
    let clamped = col_1based.clamp(1, width.max(1));
    cursor.pos.col = clamped - 1;
    cursor.deferred_wrap = false;
}

pub fn cursor_to(cursor: &mut CursorState, width: usize, height: usize, row_1based: usize, col_1based: usize) {
    let row = row_1based.clamp(1, height.max(1)) - 1;
    let col = col_1based.clamp(1, width.max(1)) - 1;
    cursor.pos = Coord::new(col, row);
    cursor.deferred_wrap = false;
}

pub fn cursor_next_line(cursor: &mut CursorState, height: usize, n: usize) {
    cursor_down(cursor, height, n);
    cursor.pos.col = 0;
}

pub fn cursor_prev_line(cursor: &mut CursorState, n: usize) {
    cursor_up(cursor, n);
    cursor.pos.col = 0;
}

pub fn tab_forward(cursor: &mut CursorState, tabs: &TabStops, width: usize, n: usize) {
    for _ in 0..n.max(1) {
        let next = tabs.next_stop(cursor.pos.col, width);
        if next == cursor.pos.col {
            break;
        }
        cursor.pos.col = next;
    }
    cursor.deferred_wrap = false;
}

pub fn tab_backward(cursor: &mut CursorState, tabs: &TabStops, n: usize) {
    for _ in 0..n.max(1) {
        let prev = tabs.prev_stop(cursor.pos.col);
        if prev == cursor.pos.col {
            break;
        }
        cursor.pos.col = prev;
    }
    cursor.deferred_wrap = false;
}

/// LF/VT/FF: scroll the active region if the cursor sits on its bottom row,
/// otherwise move down; never scrolls when the cursor is outside the
/// vertical region (xterm's "only scrolls when inside the region" rule,
/// per the open design question this implementation resolves explicitly).
pub fn line_feed(grid: &mut Grid, cursor: &mut CursorState, region: &ScrollRegion, newline_mode: bool) {
    cursor.deferred_wrap = false;
    let height = grid.height();
    if cursor.pos.row == region.bottom && region.contains_row(cursor.pos.row) {
        let (left, right) = region.columns(grid.width());
        grid.scroll_up_region(region.top, region.bottom, left, right, &cursor.style);
    } else if cursor.pos.row + 1 < height {
        cursor.pos.row += 1;
    }
    if newline_mode {
        cursor.pos.col = 0;
    }
}

/// ESC D (IND): same as a bare line feed, never forces a carriage return.
pub fn index(grid: &mut Grid, cursor: &mut CursorState, region: &ScrollRegion) {
    line_feed(grid, cursor, region, false);
}

/// ESC E (NEL): index, then explicit carriage return.
pub fn next_line(grid: &mut Grid, cursor: &mut CursorState, region: &ScrollRegion) {
    line_feed(grid, cursor, region, true);
}

/// ESC M (RI): scroll the region down when the cursor sits on its top row,
/// otherwise move up; symmetric with `line_feed`.
pub fn reverse_index(grid: &mut Grid, cursor: &mut CursorState, region: &ScrollRegion) {
    cursor.deferred_wrap = false;
    if cursor.pos.row == region.top && region.contains_row(cursor.pos.row) {
        let (left, right) = region.columns(grid.width());
        grid.scroll_down_region(region.top, region.bottom, left, right, &cursor.style);
    } else if cursor.pos.row > 0 {
        cursor.pos.row -= 1;
    }
}

/// ESC # 8 (DECALN): fill the screen with `E`, home the cursor.
pub fn decaln(grid: &mut Grid, cursor: &mut CursorState) {
    let style = Style::default();
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            grid.set(Coord::new(col, row), Cell::new("E", style.clone()));
        }
    }
    cursor.pos = Coord::origin();
    cursor.deferred_wrap = false;
    cursor.last_index = None;
}

fn advance_after_write(cursor: &mut CursorState, region: &ScrollRegion, width: usize, cell_width: usize) {
    let (_, right) = region.columns(width);
    let new_col = cursor.pos.col + cell_width;
    if new_col > right {
        cursor.pos.col = right;
        if cursor.autowrap {
            cursor.deferred_wrap = true;
        }
    } else {
        cursor.pos.col = new_col;
    }
}

fn wrap_to_next_line(grid: &mut Grid, cursor: &mut CursorState, region: &ScrollRegion) {
    line_feed(grid, cursor, region, false);
    let (left, _) = region.columns(grid.width());
    cursor.pos.col = left;
}

/// Write one decoded rune at the cursor, handling deferred wrap, grapheme
/// cluster extension (§4.4), wide-cell continuation halves, and cursor
/// advance/autowrap (§4.3).
pub fn write_printable(
    grid: &mut Grid,
    cursor: &mut CursorState,
    region: &ScrollRegion,
    rune: char,
    clusters_enabled: bool,
) {
    let width = grid.width();
    if width == 0 || grid.height() == 0 {
        return;
    }

    if cursor.deferred_wrap {
        wrap_to_next_line(grid, cursor, region);
        cursor.deferred_wrap = false;
    }

    if clusters_enabled {
        if let Some(idx) = cursor.last_index {
            let last_coord = Coord::new(idx % width, idx / width);
            if let Some(existing) = grid.get(last_coord).map(|c| c.content().to_string()) {
                if let Some(combined) = grapheme::try_extend(&existing, rune) {
                    let old_width = grapheme::display_width(&existing);
                    let new_width = grapheme::display_width(&combined);
                    let style = grid
                        .get(last_coord)
                        .map(|c| c.style().clone())
                        .unwrap_or_else(|| cursor.style.clone());
                    grid.set(last_coord, Cell::new(combined, style.clone()));
                    if new_width > old_width && last_coord.col + 1 < width {
                        grid.set(
                            Coord::new(last_coord.col + 1, last_coord.row),
                            Cell::wide_continuation(style),
                        );
                        advance_after_write(cursor, region, width, new_width - old_width);
                    }
                    return;
                }
            }
        }
    }

    let cluster = rune.to_string();
    let cell_width = grapheme::display_width(&cluster).max(1);
    let coord = cursor.pos;
    grid.set(coord, Cell::new(cluster, cursor.style.clone()));
    cursor.last_index = Some(coord.row * width + coord.col);

    if cell_width == 2 && coord.col + 1 < width {
        grid.set(
            Coord::new(coord.col + 1, coord.row),
            Cell::wide_continuation(cursor.style.clone()),
        );
    }

    advance_after_write(cursor, region, width, cell_width);
}
