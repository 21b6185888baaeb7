// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Exercises hard vs. soft reset and the OSC 4/10/11/104 palette and
//! color-query paths end to end through [`Emulator`], using a small
//! standalone `Backend` since the crate's `RecordingBackend` is test-only.

use std::collections::HashMap;

use vtcore_common::color::Color;
use vtcore_common::config::EmulatorConfig;
use vtcore_common::coord::Coord;
use vtcore_common::cursor::CursorVisualStyle;
use vtcore_common::modes::{ModeId, ModeStatus};
use vtcore_common::style::Style;
use vtcore_emulator::backend::Backend;
use vtcore_emulator::Emulator;

#[derive(Default)]
struct StubBackend {
    columns: usize,
    rows: usize,
    style: Style,
    position: Coord,
    delegated_modes: HashMap<ModeId, ModeStatus>,
    reset_calls: u32,
}

impl StubBackend {
    fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }
}

impl Backend for StubBackend {
    fn get_private_mode(&self, id: ModeId) -> ModeStatus {
        self.delegated_modes.get(&id).copied().unwrap_or(ModeStatus::NA)
    }

    fn set_private_mode(&mut self, id: ModeId, status: ModeStatus) {
        self.delegated_modes.insert(id, status);
    }

    fn get_size(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn get_style(&self) -> Style {
        self.style.clone()
    }

    fn colors(&self) -> u32 {
        16_777_216
    }

    fn put_rune(&mut self, _coord: Coord, _rune: char, _width: usize) {}

    fn put_grapheme(&mut self, _coord: Coord, _grapheme: &str, _width: usize) {}

    fn set_position(&mut self, coord: Coord) {
        self.position = coord;
    }

    fn get_position(&self) -> Coord {
        self.position
    }

    fn set_cursor_style(&mut self, _style: CursorVisualStyle) {}

    fn reset(&mut self) {
        self.reset_calls += 1;
    }

    fn raise_resize(&mut self, columns: usize, rows: usize) {
        self.columns = columns;
        self.rows = rows;
    }
}

fn emulator() -> Emulator<StubBackend> {
    let config = EmulatorConfig::default();
    let backend = StubBackend::new(config.grid.initial_columns, config.grid.initial_rows);
    let emulator = Emulator::new(&config, backend);
    emulator.start().expect("start");
    emulator
}

#[test]
fn hard_reset_clears_grid_and_modes_but_keeps_identity() {
    let mut emulator = emulator();
    emulator.write(b"hello\x1b[?1h");
    assert_eq!(emulator.state().modes.get(ModeId::AppCursor), ModeStatus::On);

    emulator.write(b"\x1bc");

    assert_eq!(emulator.state().modes.get(ModeId::AppCursor), ModeStatus::Off);
    assert!(emulator.state().grid.get(Coord::new(0, 0)).unwrap().is_empty());
    assert_eq!(emulator.backend().reset_calls, 1);
    assert_eq!(emulator.state().identity.name, "vtcore");
}

#[test]
fn soft_reset_leaves_grid_contents_alone() {
    let mut emulator = emulator();
    emulator.write(b"hello\x1b[?1h");
    emulator.write(b"\x1b[!p");

    assert_eq!(emulator.state().modes.get(ModeId::AppCursor), ModeStatus::Off);
    assert_eq!(emulator.state().grid.get(Coord::new(0, 0)).unwrap().content(), "h");
    assert_eq!(emulator.state().cursor.pos, Coord::new(0, 0));
}

#[test]
fn osc_4_palette_query_reports_resolved_rgb() {
    let mut emulator = emulator();
    emulator.write(b"\x1b]4;1;?\x07");
    let reply = emulator.read(64).expect("reply");
    assert_eq!(reply, b"\x1b]4;1;rgb:80/00/00\x07");
}

#[test]
fn osc_10_reports_current_foreground_truecolor() {
    let mut emulator = emulator();
    emulator.write(b"\x1b[38;2;10;20;30m\x1b]10;?\x07");
    let reply = emulator.read(64).expect("reply");
    assert_eq!(reply, b"\x1b]10;?;rgb:0a/14/1e\x07");
}

#[test]
fn osc_11_with_default_background_is_silently_ignored() {
    let mut emulator = emulator();
    assert_eq!(emulator.state().cursor.style.bg, Color::Reset);
    emulator.write(b"\x1b]11;?\x07");
    assert!(emulator.drain().is_ok());
}

#[test]
fn osc_104_palette_reset_is_a_silent_no_op() {
    let mut emulator = emulator();
    emulator.write(b"\x1b]104\x07");
    assert!(emulator.drain().is_ok());
}

#[test]
fn window_manipulation_text_area_size_reports_current_grid() {
    let mut emulator = emulator();
    emulator.write(b"\x1b[18t");
    let reply = emulator.read(64).expect("reply");
    assert_eq!(reply, b"\x1b[8;24;80t");
}
