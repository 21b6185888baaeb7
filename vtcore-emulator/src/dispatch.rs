// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The command dispatcher (C4): turns a [`ParserEvent`] into grid/cursor/mode
//! mutations, backend calls, and outbound replies. Malformed parameters are
//! absorbed here rather than surfaced, per the "never crash the host"
//! contract — a parse failure just drops the sequence.

use conv2::ValueInto;
use vtcore_common::coord::Coord;
use vtcore_common::modes::ModeId;
use vtcore_grid::grid::Grid;

use crate::backend::{Backend, BackendCapabilities};
use crate::cursor_ops;
use crate::modes::ModeContext;
use crate::parser::ParserEvent;
use crate::queue::OutboundQueue;
use crate::state::EmulatorState;

/// # Errors
/// Will return an error if a parameter is not valid UTF-8 or doesn't parse
/// as `T`.
pub fn parse_param_as<T: std::str::FromStr>(param_bytes: &[u8]) -> anyhow::Result<Option<T>> {
    let param_str = std::str::from_utf8(param_bytes)?;
    if param_str.is_empty() {
        return Ok(None);
    }
    param_str
        .parse()
        .map_err(|_| anyhow::Error::msg("parameter did not parse"))
        .map(Some)
}

/// # Errors
/// Will return an error if any `;`-delimited parameter fails to parse.
pub fn split_params_into_semicolon_delimited_usize(params: &[u8]) -> anyhow::Result<Vec<Option<usize>>> {
    params
        .split(|b| *b == b';')
        .map(parse_param_as::<usize>)
        .collect()
}

/// # Errors
/// Will return an error if any `:`-delimited parameter fails to parse.
pub fn split_params_into_colon_delimited_usize(params: &[u8]) -> anyhow::Result<Vec<Option<usize>>> {
    params
        .split(|b| *b == b':')
        .map(parse_param_as::<usize>)
        .collect()
}

fn parsed_params(raw: &[u8]) -> Vec<Option<usize>> {
    split_params_into_semicolon_delimited_usize(raw).unwrap_or_default()
}

fn p(params: &[Option<usize>], idx: usize, default: usize) -> usize {
    let value = params.get(idx).copied().flatten().unwrap_or(default);
    if value == 0 {
        default
    } else {
        value
    }
}

/// Same as [`p`] but keeps an explicit `0` (used where `0` is itself a
/// meaningful parameter value, e.g. ED/EL/TBC mode selectors).
fn p_raw(params: &[Option<usize>], idx: usize, default: usize) -> usize {
    params.get(idx).copied().flatten().unwrap_or(default)
}

/// Entry point: mutate `state`/`backend` and enqueue any reply bytes onto
/// `outbound` for one parsed unit of input.
pub fn dispatch(event: ParserEvent, state: &mut EmulatorState, backend: &mut dyn Backend, outbound: &OutboundQueue, caps: BackendCapabilities) {
    match event {
        ParserEvent::Print(rune) => dispatch_print(state, backend, rune),
        ParserEvent::Bell => dispatch_bell(backend, caps),
        ParserEvent::Backspace => dispatch_backspace(state),
        ParserEvent::Tab => dispatch_tab(state),
        ParserEvent::LineFeed => dispatch_line_feed(state, backend),
        ParserEvent::CarriageReturn => dispatch_carriage_return(state),
        ParserEvent::EscapeFinal(byte) => dispatch_escape_final(byte, state, backend, outbound),
        ParserEvent::Csi {
            prefix,
            params,
            intermediate,
            final_byte,
        } => dispatch_csi(prefix, &params, intermediate, final_byte, state, backend, outbound, caps),
        ParserEvent::Osc(body) => dispatch_osc(&body, state, backend, outbound, caps),
        ParserEvent::Nf { intermediate, final_byte } => dispatch_nf(&intermediate, final_byte, state, backend),
    }
    backend.set_position(state.cursor.pos);
    backend.set_style(state.cursor.style.clone());
}

fn resync_rows(grid: &Grid, backend: &mut dyn Backend, top: usize, bottom: usize, left: usize, right: usize) {
    for row in top..=bottom.min(grid.height().saturating_sub(1)) {
        for col in left..=right.min(grid.width().saturating_sub(1)) {
            let coord = Coord::new(col, row);
            if let Some(cell) = grid.get(coord) {
                if cell.is_empty() {
                    backend.put_rune(coord, ' ', 1);
                } else {
                    backend.put_grapheme(coord, cell.content(), cell.display_width().max(1));
                }
            }
        }
    }
}

fn dispatch_print(state: &mut EmulatorState, backend: &mut dyn Backend, rune: char) {
    let clusters_enabled = state.modes.get(ModeId::GraphemeClusters).is_on();
    state.cursor.autowrap = state.modes.get(ModeId::AutoMargin).is_on();
    cursor_ops::write_printable(&mut state.grid, &mut state.cursor, &state.scroll_region, rune, clusters_enabled);
    if let Some(coord) = state.grid.last_write() {
        if let Some(cell) = state.grid.get(coord) {
            backend.put_grapheme(coord, cell.content(), cell.display_width().max(1));
        }
    }
}

fn dispatch_bell(backend: &mut dyn Backend, caps: BackendCapabilities) {
    if caps.beeper {
        if let Some(beeper) = backend.as_beeper() {
            beeper.bell();
        }
    }
}

fn dispatch_backspace(state: &mut EmulatorState) {
    state.cursor.pos.col = state.cursor.pos.col.saturating_sub(1);
    state.cursor.deferred_wrap = false;
}

fn dispatch_tab(state: &mut EmulatorState) {
    let width = state.grid.width();
    cursor_ops::tab_forward(&mut state.cursor, &state.tab_stops, width, 1);
}

fn dispatch_line_feed(state: &mut EmulatorState, backend: &mut dyn Backend) {
    let newline_mode = state.modes.get(ModeId::AnsiNewLine).is_on();
    cursor_ops::line_feed(&mut state.grid, &mut state.cursor, &state.scroll_region, newline_mode);
    let region = state.scroll_region;
    let width = state.grid.width();
    let (left, right) = region.columns(width);
    resync_rows(&state.grid, backend, region.top, region.bottom, left, right);
}

fn dispatch_carriage_return(state: &mut EmulatorState) {
    state.cursor.pos.col = 0;
    state.cursor.deferred_wrap = false;
}

fn primary_da_reply(backend: &dyn Backend) -> Vec<u8> {
    if backend.colors() > 0 {
        b"\x1b[?63;22c".to_vec()
    } else {
        b"\x1b[?63c".to_vec()
    }
}

fn xtversion_reply(state: &EmulatorState) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"\x1bP>|");
    out.extend_from_slice(state.identity.name.as_bytes());
    out.push(b' ');
    out.extend_from_slice(state.identity.version.as_bytes());
    out.extend_from_slice(b"\x1b\\");
    out
}

/// Return the backend to its power-on appearance. Distinct from
/// [`EmulatorState::soft_reset`] (DECSTR), which never touches grid contents.
fn hard_reset(state: &mut EmulatorState, backend: &mut dyn Backend) {
    debug!("ESC c: hard reset, clearing grid and modes");
    let (width, height) = (state.grid.width(), state.grid.height());
    let identity = state.identity.clone();
    *state = EmulatorState::new(width, height);
    state.identity = identity;
    backend.reset();
    resync_rows(&state.grid, backend, 0, height.saturating_sub(1), 0, width.saturating_sub(1));
}

fn dispatch_escape_final(byte: u8, state: &mut EmulatorState, backend: &mut dyn Backend, outbound: &OutboundQueue) {
    match byte {
        b'D' | b'E' | b'M' => {
            match byte {
                b'D' => cursor_ops::index(&mut state.grid, &mut state.cursor, &state.scroll_region),
                b'E' => cursor_ops::next_line(&mut state.grid, &mut state.cursor, &state.scroll_region),
                _ => cursor_ops::reverse_index(&mut state.grid, &mut state.cursor, &state.scroll_region),
            }
            let region = state.scroll_region;
            let width = state.grid.width();
            let (left, right) = region.columns(width);
            resync_rows(&state.grid, backend, region.top, region.bottom, left, right);
        }
        b'H' => {
            let width = state.grid.width();
            state.tab_stops.set(state.cursor.pos.col, width);
        }
        b'7' => state.saved_cursor = Some(state.cursor.save()),
        b'8' => {
            if let Some(saved) = state.saved_cursor.clone() {
                state.cursor.restore(&saved);
            }
        }
        b'Z' => {
            let _ = outbound.send_raw(&primary_da_reply(backend));
        }
        b'c' => hard_reset(state, backend),
        // DECBI/DECFI: simplified to a one-column move within the active
        // scroll region's columns; the full spec also shifts the region
        // contents when at the margin, which this core does not model.
        b'6' => {
            let width = state.grid.width();
            cursor_ops::cursor_left(&mut state.cursor, &state.scroll_region, width, 1);
        }
        b'9' => {
            let width = state.grid.width();
            cursor_ops::cursor_right(&mut state.cursor, &state.scroll_region, width, 1);
        }
        _ => {}
    }
}

fn dispatch_nf(intermediate: &[u8], final_byte: u8, state: &mut EmulatorState, backend: &mut dyn Backend) {
    if intermediate == [b'#'] && final_byte == b'8' {
        cursor_ops::decaln(&mut state.grid, &mut state.cursor);
        let (width, height) = (state.grid.width(), state.grid.height());
        resync_rows(&state.grid, backend, 0, height.saturating_sub(1), 0, width.saturating_sub(1));
    }
    // G0-G3 charset designators (`ESC ( B`, `ESC ) 0`, ...) and anything else
    // this core doesn't model: no-op.
}

#[allow(clippy::too_many_arguments)]
fn dispatch_csi(
    prefix: Option<u8>,
    raw_params: &[u8],
    intermediate: Option<u8>,
    final_byte: u8,
    state: &mut EmulatorState,
    backend: &mut dyn Backend,
    outbound: &OutboundQueue,
    caps: BackendCapabilities,
) {
    match (prefix, intermediate, final_byte) {
        (None, None, b'A') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            cursor_ops::cursor_up(&mut state.cursor, n);
        }
        (None, None, b'B') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            let height = state.grid.height();
            cursor_ops::cursor_down(&mut state.cursor, height, n);
        }
        (None, None, b'C') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            let width = state.grid.width();
            cursor_ops::cursor_right(&mut state.cursor, &state.scroll_region, width, n);
        }
        (None, None, b'D') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            let width = state.grid.width();
            cursor_ops::cursor_left(&mut state.cursor, &state.scroll_region, width, n);
        }
        (None, None, b'E') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            let height = state.grid.height();
            cursor_ops::cursor_next_line(&mut state.cursor, height, n);
        }
        (None, None, b'F') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            cursor_ops::cursor_prev_line(&mut state.cursor, n);
        }
        (None, None, b'G') => {
            let params = parsed_params(raw_params);
            let width = state.grid.width();
            cursor_ops::cursor_to_column(&mut state.cursor, width, p(&params, 0, 1));
        }
        (None, None, b'H') => {
            let params = parsed_params(raw_params);
            let (width, height) = (state.grid.width(), state.grid.height());
            cursor_ops::cursor_to(&mut state.cursor, width, height, p(&params, 0, 1), p(&params, 1, 1));
        }
        (None, None, b'I') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            let width = state.grid.width();
            cursor_ops::tab_forward(&mut state.cursor, &state.tab_stops, width, n);
        }
        (None, None, b'Z') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            cursor_ops::tab_backward(&mut state.cursor, &state.tab_stops, n);
        }
        (None, None, b'J') => {
            let mode = p_raw(&parsed_params(raw_params), 0, 0);
            erase_display(state, backend, mode);
        }
        (None, None, b'K') => {
            let mode = p_raw(&parsed_params(raw_params), 0, 0);
            erase_line(state, backend, mode);
        }
        (None, None, b'L') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            insert_lines(state, backend, n);
        }
        (None, None, b'M') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            delete_lines(state, backend, n);
        }
        (None, None, b'@') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            insert_chars(state, backend, n);
        }
        (None, None, b'P') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            delete_chars(state, backend, n);
        }
        (None, None, b'X') => {
            let n = p(&parsed_params(raw_params), 0, 1);
            erase_chars(state, backend, n);
        }
        (None, None, b'm') => {
            if raw_params.first() != Some(&b'>') {
                dispatch_sgr(raw_params, state);
            }
        }
        (None, None, b'c') => {
            let _ = outbound.send_raw(&primary_da_reply(backend));
        }
        (None, None, b'n') => dispatch_dsr(raw_params, state, outbound),
        (None, None, b'r') => dispatch_decstbm(raw_params, state),
        (None, None, b's') => {
            if state.modes.get(ModeId::LeftRightMargin).is_on() {
                dispatch_decslrm(raw_params, state);
            }
        }
        (None, None, b't') => {
            let params = parsed_params(raw_params);
            dispatch_window_manipulation(&params, backend, outbound, caps);
        }
        (None, None, b'g') => {
            let mode = p_raw(&parsed_params(raw_params), 0, 0);
            match mode {
                3 => state.tab_stops.clear_all(),
                _ => {
                    let col = state.cursor.pos.col;
                    state.tab_stops.clear(col, state.grid.width());
                }
            }
        }
        (Some(b'?'), None, b'h') => set_private_modes(raw_params, state, backend, true),
        (Some(b'?'), None, b'l') => set_private_modes(raw_params, state, backend, false),
        (None, None, b'h') => set_ansi_modes(raw_params, state, backend, true),
        (None, None, b'l') => set_ansi_modes(raw_params, state, backend, false),
        (Some(b'?'), Some(b'$'), b'p') => dispatch_decrqm(raw_params, state, backend, outbound, true),
        (None, Some(b'$'), b'p') => dispatch_decrqm(raw_params, state, backend, outbound, false),
        (Some(b'?'), None, b'W') => {
            if p_raw(&parsed_params(raw_params), 0, 0) == 5 {
                state.tab_stops.reset_default();
            }
        }
        (Some(b'>'), None, b'q') => {
            let _ = outbound.send_raw(&xtversion_reply(state));
        }
        (None, Some(b' '), b'q') => {
            let style = p_raw(&parsed_params(raw_params), 0, 0);
            backend.set_cursor_style(style.into());
        }
        (None, Some(b'!'), b'p') => {
            debug!("CSI ! p: soft reset (DECSTR)");
            state.soft_reset();
        }
        _ => {
            trace!(
                "unhandled CSI prefix={:?} intermediate={:?} final={:?}",
                prefix.map(char::from),
                intermediate.map(char::from),
                char::from(final_byte)
            );
        }
    }
}

fn erase_display(state: &mut EmulatorState, backend: &mut dyn Backend, mode: usize) {
    let width = state.grid.width();
    let height = state.grid.height();
    if width == 0 || height == 0 {
        return;
    }
    let style = state.cursor.style.clone();
    let row = state.cursor.pos.row;
    let col = state.cursor.pos.col;
    match mode {
        0 => {
            state.grid.erase_row_range(row, col, width - 1, &style);
            for r in (row + 1)..height {
                state.grid.erase_row_range(r, 0, width - 1, &style);
            }
        }
        1 => {
            for r in 0..row {
                state.grid.erase_row_range(r, 0, width - 1, &style);
            }
            state.grid.erase_row_range(row, 0, col, &style);
        }
        _ => {
            for r in 0..height {
                state.grid.erase_row_range(r, 0, width - 1, &style);
            }
        }
    }
    resync_rows(&state.grid, backend, 0, height - 1, 0, width - 1);
}

fn erase_line(state: &mut EmulatorState, backend: &mut dyn Backend, mode: usize) {
    let width = state.grid.width();
    if width == 0 {
        return;
    }
    let style = state.cursor.style.clone();
    let row = state.cursor.pos.row;
    let col = state.cursor.pos.col;
    match mode {
        0 => state.grid.erase_row_range(row, col, width - 1, &style),
        1 => state.grid.erase_row_range(row, 0, col, &style),
        _ => state.grid.erase_row_range(row, 0, width - 1, &style),
    }
    resync_rows(&state.grid, backend, row, row, 0, width - 1);
}

fn insert_lines(state: &mut EmulatorState, backend: &mut dyn Backend, n: usize) {
    let region = state.scroll_region;
    if !region.contains_row(state.cursor.pos.row) {
        return;
    }
    let width = state.grid.width();
    let (left, right) = region.columns(width);
    let style = state.cursor.style.clone();
    let row = state.cursor.pos.row;
    for _ in 0..n {
        state.grid.scroll_down_region(row, region.bottom, left, right, &style);
    }
    resync_rows(&state.grid, backend, row, region.bottom, left, right);
}

fn delete_lines(state: &mut EmulatorState, backend: &mut dyn Backend, n: usize) {
    let region = state.scroll_region;
    if !region.contains_row(state.cursor.pos.row) {
        return;
    }
    let width = state.grid.width();
    let (left, right) = region.columns(width);
    let style = state.cursor.style.clone();
    let row = state.cursor.pos.row;
    for _ in 0..n {
        state.grid.scroll_up_region(row, region.bottom, left, right, &style);
    }
    resync_rows(&state.grid, backend, row, region.bottom, left, right);
}

fn insert_chars(state: &mut EmulatorState, backend: &mut dyn Backend, n: usize) {
    let width = state.grid.width();
    let (_, right) = state.scroll_region.columns(width);
    let style = state.cursor.style.clone();
    let row = state.cursor.pos.row;
    let col = state.cursor.pos.col;
    if col > right {
        return;
    }
    state.grid.shift_row_right(row, col, right, n, &style);
    resync_rows(&state.grid, backend, row, row, col, right);
}

fn delete_chars(state: &mut EmulatorState, backend: &mut dyn Backend, n: usize) {
    let width = state.grid.width();
    let (_, right) = state.scroll_region.columns(width);
    let style = state.cursor.style.clone();
    let row = state.cursor.pos.row;
    let col = state.cursor.pos.col;
    if col > right {
        return;
    }
    state.grid.shift_row_left(row, col, right, n, &style);
    resync_rows(&state.grid, backend, row, row, col, right);
}

fn erase_chars(state: &mut EmulatorState, backend: &mut dyn Backend, n: usize) {
    let width = state.grid.width();
    if width == 0 {
        return;
    }
    let style = state.cursor.style.clone();
    let row = state.cursor.pos.row;
    let col = state.cursor.pos.col;
    let to = (col + n - 1).min(width - 1);
    state.grid.erase_row_range(row, col, to, &style);
    resync_rows(&state.grid, backend, row, row, col, to);
}

fn dispatch_sgr(raw_params: &[u8], state: &mut EmulatorState) {
    use vtcore_common::color::Color;
    use vtcore_common::style::{Attr, Underline};

    let split_by_colon = raw_params.contains(&b':');
    let parsed = if split_by_colon {
        split_params_into_colon_delimited_usize(raw_params)
    } else {
        split_params_into_semicolon_delimited_usize(raw_params)
    };
    let Ok(mut params) = parsed else { return };
    if params.is_empty() || (params.len() == 1 && params[0].is_none()) {
        params = vec![Some(0)];
    }

    let mut iter = params.into_iter();
    while let Some(param) = iter.next() {
        let Some(code) = param else { continue };
        if code == 38 || code == 48 || code == 58 {
            apply_custom_color(state, &mut iter, code);
            continue;
        }
        apply_sgr_code(state, code, &mut iter, split_by_colon);
    }

    fn apply_custom_color(state: &mut EmulatorState, iter: &mut std::vec::IntoIter<Option<usize>>, control: usize) {
        let Some(mode) = iter.next().flatten() else {
            reset_channel(state, control);
            return;
        };
        match mode {
            2 => {
                let r = iter.next().flatten().unwrap_or(0);
                let g = iter.next().flatten().unwrap_or(0);
                let b = iter.next().flatten().unwrap_or(0);
                let color = Color::Rgb(
                    r.value_into().unwrap_or(0),
                    g.value_into().unwrap_or(0),
                    b.value_into().unwrap_or(0),
                );
                set_channel(state, control, color);
            }
            5 => {
                let idx = iter.next().flatten().unwrap_or(0);
                set_channel(state, control, Color::Palette(idx.value_into().unwrap_or(0)));
            }
            _ => warn!("unsupported SGR color-space selector {mode} for control {control}"),
        }
    }

    fn reset_channel(state: &mut EmulatorState, control: usize) {
        match control {
            38 => state.cursor.style = state.cursor.style.with_fg(Color::Default),
            48 => state.cursor.style = state.cursor.style.with_bg(Color::Default),
            _ => state.cursor.style = state.cursor.style.with_underline_color(Color::Default),
        }
    }

    fn set_channel(state: &mut EmulatorState, control: usize, color: Color) {
        match control {
            38 => state.cursor.style = state.cursor.style.with_fg(color),
            48 => state.cursor.style = state.cursor.style.with_bg(color),
            _ => state.cursor.style = state.cursor.style.with_underline_color(color),
        }
    }

    fn apply_sgr_code(state: &mut EmulatorState, code: usize, iter: &mut std::vec::IntoIter<Option<usize>>, split_by_colon: bool) {
        let style = &mut state.cursor.style;
        match code {
            0 => *style = style.reset(),
            1 => *style = style.with_attr(Attr::BOLD),
            2 => *style = style.with_attr(Attr::DIM),
            3 => *style = style.with_attr(Attr::ITALIC),
            4 => {
                let sub = if split_by_colon { iter.next().flatten() } else { None };
                *style = style.with_underline(sub.map_or(Underline::Plain, Underline::from_subparam));
            }
            5 | 6 => *style = style.with_attr(Attr::BLINK),
            7 => *style = style.with_attr(Attr::REVERSE),
            9 => *style = style.with_attr(Attr::STRIKETHROUGH),
            21 => *style = style.with_underline(Underline::Double),
            22 => *style = style.without_attr(Attr::BOLD | Attr::DIM),
            23 => *style = style.without_attr(Attr::ITALIC),
            24 => *style = style.with_underline(Underline::None),
            25 => *style = style.without_attr(Attr::BLINK),
            27 => *style = style.without_attr(Attr::REVERSE),
            29 => *style = style.without_attr(Attr::STRIKETHROUGH),
            30..=37 => *style = style.with_fg(Color::Palette((code - 30).value_into().unwrap_or(0))),
            39 => *style = style.with_fg(Color::Default),
            40..=47 => *style = style.with_bg(Color::Palette((code - 40).value_into().unwrap_or(0))),
            49 => *style = style.with_bg(Color::Default),
            53 => *style = style.with_attr(Attr::OVERLINE),
            55 => *style = style.without_attr(Attr::OVERLINE),
            59 => *style = style.with_underline_color(Color::Default),
            90..=97 => *style = style.with_fg(Color::Palette((code - 90 + 8).value_into().unwrap_or(0))),
            100..=107 => *style = style.with_bg(Color::Palette((code - 100 + 8).value_into().unwrap_or(0))),
            _ => warn!("unhandled SGR code {code}"),
        }
    }
}

fn dispatch_dsr(raw_params: &[u8], state: &EmulatorState, outbound: &OutboundQueue) {
    let code = p_raw(&parsed_params(raw_params), 0, 0);
    match code {
        5 => {
            let _ = outbound.send_raw(b"\x1b[0n");
        }
        6 => {
            let reply = format!("\x1b[{};{}R", state.cursor.pos.row + 1, state.cursor.pos.col + 1);
            let _ = outbound.send_raw(reply.as_bytes());
        }
        _ => {}
    }
}

fn dispatch_decstbm(raw_params: &[u8], state: &mut EmulatorState) {
    let params = parsed_params(raw_params);
    let (width, height) = (state.grid.width(), state.grid.height());
    let top = p(&params, 0, 1) - 1;
    let bottom = p(&params, 1, height) - 1;
    let mut region = state.scroll_region;
    region.top = top;
    region.bottom = bottom;
    state.scroll_region = region.clamp_to(width, height);
    state.cursor.pos = Coord::new(state.scroll_region.columns(width).0, state.scroll_region.top);
    state.cursor.deferred_wrap = false;
}

fn dispatch_decslrm(raw_params: &[u8], state: &mut EmulatorState) {
    let params = parsed_params(raw_params);
    let (width, height) = (state.grid.width(), state.grid.height());
    let left = p(&params, 0, 1) - 1;
    let right = p(&params, 1, width) - 1;
    let mut region = state.scroll_region;
    region.left = Some(left);
    region.right = Some(right);
    state.scroll_region = region.clamp_to(width, height);
    state.cursor.pos = Coord::new(state.scroll_region.columns(width).0, state.scroll_region.top);
    state.cursor.deferred_wrap = false;
}

/// Window manipulation (`CSI Ps1;Ps2;Ps3 t`). Only the subset answerable from
/// the `Backend` contract is implemented: 8 (resize, via the optional
/// `Resizer`), 11/18/19 (state/size reports). Every other code (iconify,
/// move, raise/lower, pixel-size reports, title stack, ...) is parsed and
/// silently ignored, per the unknown-sequence policy.
fn dispatch_window_manipulation(
    params: &[Option<usize>],
    backend: &mut dyn Backend,
    outbound: &OutboundQueue,
    caps: BackendCapabilities,
) {
    let ps1 = p_raw(params, 0, 0);
    match ps1 {
        8 => {
            let rows = params.get(1).copied().flatten();
            let cols = params.get(2).copied().flatten();
            if let (Some(rows), Some(cols)) = (rows, cols) {
                if caps.resizer {
                    if let Some(resizer) = backend.as_resizer() {
                        resizer.request_resize(cols, rows);
                    }
                }
            }
        }
        11 => {
            let _ = outbound.send_raw(b"\x1b[1t");
        }
        18 | 19 => {
            let (cols, rows) = backend.get_size();
            let code = if ps1 == 18 { 8 } else { 9 };
            let _ = outbound.send_raw(format!("\x1b[{code};{rows};{cols}t").as_bytes());
        }
        _ => trace!("unhandled window-manipulation code {ps1}"),
    }
}

fn set_private_modes(raw_params: &[u8], state: &mut EmulatorState, backend: &mut dyn Backend, on: bool) {
    let mut ctx = ModeContext {
        local: &mut state.modes,
        backend,
    };
    for number in parsed_params(raw_params).into_iter().flatten() {
        let Ok(number) = u16::try_from(number) else { continue };
        ctx.set(ModeId::from_wire(number, true), on);
    }
}

fn set_ansi_modes(raw_params: &[u8], state: &mut EmulatorState, backend: &mut dyn Backend, on: bool) {
    let mut ctx = ModeContext {
        local: &mut state.modes,
        backend,
    };
    for number in parsed_params(raw_params).into_iter().flatten() {
        let Ok(number) = u16::try_from(number) else { continue };
        ctx.set(ModeId::from_wire(number, false), on);
    }
}

fn dispatch_decrqm(raw_params: &[u8], state: &mut EmulatorState, backend: &mut dyn Backend, outbound: &OutboundQueue, private: bool) {
    let Some(number) = p_raw_opt(raw_params) else { return };
    let ctx = ModeContext {
        local: &mut state.modes,
        backend,
    };
    let status = ctx.get(ModeId::from_wire(number, private));
    let reply = if private {
        format!("\x1b[?{};{}$y", number, status.decrqm_code())
    } else {
        format!("\x1b[{};{}$y", number, status.decrqm_code())
    };
    let _ = outbound.send_raw(reply.as_bytes());
}

fn p_raw_opt(raw_params: &[u8]) -> Option<u16> {
    parsed_params(raw_params).first().copied().flatten().and_then(|n| u16::try_from(n).ok())
}

fn rgb_osc_reply(code: &str, selector: &str, rgb: (u8, u8, u8)) -> Vec<u8> {
    let (r, g, b) = rgb;
    format!("\x1b]{code};{selector};rgb:{r:02x}{r:02x}/{g:02x}{g:02x}/{b:02x}{b:02x}\x07").into_bytes()
}

fn dispatch_osc(body: &[u8], state: &mut EmulatorState, backend: &mut dyn Backend, outbound: &OutboundQueue, caps: BackendCapabilities) {
    let mut top = body.splitn(2, |&b| b == b';');
    let Some(code_bytes) = top.next() else { return };
    let payload = top.next().unwrap_or(&[]);
    let Ok(code) = std::str::from_utf8(code_bytes).unwrap_or_default().parse::<u32>() else {
        return;
    };

    match code {
        0 | 1 | 2 => {
            if caps.titler {
                if let (Some(titler), Ok(title)) = (backend.as_titler(), std::str::from_utf8(payload)) {
                    titler.set_window_title(title);
                }
            }
        }
        4 => osc_palette_query(payload, outbound),
        8 => osc_hyperlink(payload, state),
        10 => osc_color_query("10", payload, backend, outbound, true),
        11 => osc_color_query("11", payload, backend, outbound, false),
        52 => osc_clipboard(payload, state, backend, outbound, caps),
        104 => debug!("OSC 104: palette reset request, no-op (no backend palette to restore)"),
        _ => warn!("unhandled OSC code {code}"),
    }
}

fn osc_palette_query(payload: &[u8], outbound: &OutboundQueue) {
    let mut parts = payload.splitn(2, |&b| b == b';');
    let Some(idx_bytes) = parts.next() else { return };
    let Some(query) = parts.next() else { return };
    if query != b"?" {
        return;
    }
    let Ok(Some(idx)) = parse_param_as::<u8>(idx_bytes) else { return };
    let rgb = vtcore_common::color::resolve_256(idx);
    let _ = outbound.send_raw(&rgb_osc_reply("4", &idx.to_string(), rgb));
}

fn osc_color_query(code: &str, payload: &[u8], backend: &dyn Backend, outbound: &OutboundQueue, foreground: bool) {
    if payload != b"?" {
        return;
    }
    let style = backend.get_style();
    let color = if foreground { style.fg } else { style.bg };
    let rgb = match color {
        vtcore_common::color::Color::Rgb(r, g, b) => (r, g, b),
        vtcore_common::color::Color::Palette(idx) => vtcore_common::color::resolve_256(idx),
        _ => return,
    };
    let _ = outbound.send_raw(&rgb_osc_reply(code, "?", rgb));
}

fn osc_hyperlink(payload: &[u8], state: &mut EmulatorState) {
    let mut parts = payload.splitn(2, |&b| b == b';');
    let params = parts.next().unwrap_or(&[]);
    let uri = parts.next().unwrap_or(&[]);
    if uri.is_empty() {
        state.cursor.style = state.cursor.style.without_url();
        return;
    }
    let id = params
        .split(|&b| b == b':')
        .find_map(|kv| std::str::from_utf8(kv).ok()?.strip_prefix("id="))
        .unwrap_or_default();
    let Ok(uri) = std::str::from_utf8(uri) else { return };
    state.cursor.style = state.cursor.style.with_url(uri, id);
}

fn osc_clipboard(payload: &[u8], state: &mut EmulatorState, backend: &mut dyn Backend, outbound: &OutboundQueue, caps: BackendCapabilities) {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    let mut parts = payload.splitn(2, |&b| b == b';');
    let _target = parts.next();
    let Some(data) = parts.next() else { return };

    if data == b"?" {
        let bytes = state.clipboard.clone().or_else(|| {
            if caps.clipboard {
                backend.as_clipboard().and_then(|c| c.get_clipboard())
            } else {
                None
            }
        });
        if let Some(bytes) = bytes {
            let encoded = STANDARD.encode(bytes);
            let reply = format!("\x1b]52;c;{encoded}\x07");
            let _ = outbound.send_raw(reply.as_bytes());
        }
        return;
    }

    if data.is_empty() {
        state.clipboard = None;
        if caps.clipboard {
            if let Some(clipboard) = backend.as_clipboard() {
                clipboard.set_clipboard(&[]);
            }
        }
        return;
    }

    if let Ok(decoded) = STANDARD.decode(data) {
        state.clipboard = Some(decoded.clone());
        if caps.clipboard {
            if let Some(clipboard) = backend.as_clipboard() {
                clipboard.set_clipboard(&decoded);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::RecordingBackend;
    use crate::parser::Parser;

    fn run(backend: &mut RecordingBackend, outbound: &OutboundQueue, state: &mut EmulatorState, input: &[u8]) {
        let caps = BackendCapabilities::probe(backend);
        let mut parser = Parser::new();
        for event in parser.feed(input) {
            dispatch(event, state, backend, outbound, caps);
        }
    }

    fn harness() -> (EmulatorState, RecordingBackend, OutboundQueue) {
        let state = EmulatorState::new(10, 5);
        let backend = RecordingBackend::new(10, 5);
        let outbound = OutboundQueue::new(256);
        outbound.start().expect("start");
        (state, backend, outbound)
    }

    #[test]
    fn cup_moves_cursor_to_one_based_position() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b[3;4H");
        assert_eq!(state.cursor.pos, Coord::new(3, 2));
    }

    #[test]
    fn ed_mode_two_clears_whole_screen() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"A\x1b[2J");
        assert!(state.grid.get(Coord::new(0, 0)).unwrap().is_empty());
    }

    #[test]
    fn sgr_bold_and_truecolor_fg_apply() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b[1;38;2;10;20;30m");
        assert!(state.cursor.style.attr.contains(vtcore_common::style::Attr::BOLD));
        assert_eq!(state.cursor.style.fg, vtcore_common::color::Color::Rgb(10, 20, 30));
    }

    #[test]
    fn sgr_256_color_background_applies() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b[48;5;200m");
        assert_eq!(state.cursor.style.bg, vtcore_common::color::Color::Palette(200));
    }

    #[test]
    fn decset_application_cursor_sets_local_mode() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b[?1h");
        assert_eq!(state.modes.get(ModeId::AppCursor), vtcore_common::modes::ModeStatus::On);
    }

    #[test]
    fn decrqm_unknown_mode_replies_na() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b[?1111$p");
        let reply = outbound.read(64).expect("reply");
        assert_eq!(reply, b"\x1b[?1111;0$y");
    }

    #[test]
    fn dsr_cursor_position_report_is_one_based() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b[4;5H\x1b[6n");
        let reply = outbound.read(64).expect("reply");
        assert_eq!(reply, b"\x1b[5;4R");
    }

    #[test]
    fn primary_da_reports_full_color_when_backend_supports_it() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b[c");
        let reply = outbound.read(64).expect("reply");
        assert_eq!(reply, b"\x1b[?63;22c");
    }

    #[test]
    fn decaln_fills_screen_with_e() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b#8");
        assert_eq!(state.grid.get(Coord::new(0, 0)).unwrap().content(), "E");
        assert_eq!(state.grid.get(Coord::new(9, 4)).unwrap().content(), "E");
    }

    #[test]
    fn decstbm_sets_scroll_region_and_homes_cursor() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b[2;4r");
        assert_eq!(state.scroll_region.top, 1);
        assert_eq!(state.scroll_region.bottom, 3);
        assert_eq!(state.cursor.pos, Coord::new(0, 1));
    }

    #[test]
    fn il_dl_within_region_shift_rows() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"A\x1b[1;1H\x1b[L");
        assert!(state.grid.get(Coord::new(0, 0)).unwrap().is_empty());
        assert_eq!(state.grid.get(Coord::new(0, 1)).unwrap().content(), "A");
    }

    #[test]
    fn osc_8_hyperlink_sets_and_clears_url() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b]8;id=1;http://example.com\x07");
        assert_eq!(state.cursor.style.url, "http://example.com");
        run(&mut backend, &outbound, &mut state, b"\x1b]8;;\x07");
        assert_eq!(state.cursor.style.url, "");
    }

    #[test]
    fn osc_52_clipboard_round_trips_base64() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b]52;c;aGVsbG8=\x07");
        assert_eq!(state.clipboard, Some(b"hello".to_vec()));
        run(&mut backend, &outbound, &mut state, b"\x1b]52;c;?\x07");
        let reply = outbound.read(64).expect("reply");
        assert_eq!(reply, b"\x1b]52;c;aGVsbG8=\x07");
    }

    #[test]
    fn decscusr_sets_backend_cursor_style() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b[4 q");
        assert_eq!(backend.cursor_style, vtcore_common::cursor::CursorVisualStyle::UnderlineSteady);
    }

    #[test]
    fn decstr_soft_reset_homes_cursor_without_clearing_grid() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"A\x1b[5;5H\x1b[!p");
        assert_eq!(state.cursor.pos, Coord::origin());
        assert_eq!(state.grid.get(Coord::new(0, 0)).unwrap().content(), "A");
    }

    #[test]
    fn unknown_window_manipulation_code_is_a_silent_no_op() {
        let (mut state, mut backend, outbound) = harness();
        run(&mut backend, &outbound, &mut state, b"\x1b[2t");
        outbound.stop();
        assert_eq!(outbound.read(1), Err(crate::error::EmulatorError::ReadAfterStop));
    }
}
