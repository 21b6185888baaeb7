// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Emulator-owned state: everything the run loop mutates on every byte.
//! Created with the emulator; `soft_reset` returns it to defaults while
//! keeping backend bindings and the parser's position in the byte stream
//! untouched.

use vtcore_common::modes::ModeTable;
use vtcore_common::scroll::ScrollRegion;
use vtcore_grid::grid::Grid;

use crate::cursor_ops::{CursorState, SavedCursor, TabStops};

/// Identity string used in the XTVERSION reply (`CSI > 0 q`).
#[derive(Debug, Clone)]
pub struct Identity {
    pub name: String,
    pub version: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "vtcore".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmulatorState {
    pub grid: Grid,
    pub cursor: CursorState,
    pub saved_cursor: Option<SavedCursor>,
    pub tab_stops: TabStops,
    pub scroll_region: ScrollRegion,
    pub modes: ModeTable,
    pub identity: Identity,
    /// OSC 52 clipboard, kept here so a backend without `Clipboard` support
    /// still round-trips writes within the same session.
    pub clipboard: Option<Vec<u8>>,
}

impl EmulatorState {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new(width, height),
            cursor: CursorState::default(),
            saved_cursor: None,
            tab_stops: TabStops::default(),
            scroll_region: ScrollRegion::full_screen(width, height),
            modes: ModeTable::new(),
            identity: Identity::default(),
            clipboard: None,
        }
    }

    /// DECSTR / `ESC c` soft reset: restores cursor, modes, tab stops, and
    /// the scroll region to power-on defaults without touching grid
    /// contents' dimensions or the backend bindings. Hard reset (`ESC c`)
    /// additionally clears the grid; callers distinguish the two (see
    /// `dispatch::hard_reset`).
    pub fn soft_reset(&mut self) {
        let (width, height) = (self.grid.width(), self.grid.height());
        self.cursor = CursorState::default();
        self.saved_cursor = None;
        self.tab_stops = TabStops::default();
        self.scroll_region = ScrollRegion::full_screen(width, height);
        self.modes.reset();
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.grid.resize(width, height);
        self.scroll_region = self.scroll_region.clamp_to(width, height);
        if self.cursor.pos.col >= width && width > 0 {
            self.cursor.pos.col = width - 1;
        }
        if self.cursor.pos.row >= height && height > 0 {
            self.cursor.pos.row = height - 1;
        }
        if width > self.cursor.pos.col + 1 {
            self.cursor.deferred_wrap = false;
        }
    }
}
