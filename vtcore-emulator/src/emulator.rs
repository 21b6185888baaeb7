// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The top-level handle (§6 EXTERNAL INTERFACES): wires the parser, dispatch
//! table, keyboard/mouse encoders, and the outbound queue around one
//! `Backend`. This is the only type most callers construct directly.

use std::time::Instant;

use vtcore_common::config::EmulatorConfig;
use vtcore_common::modes::{ModeId, ModeTable};

use vtcore_input::key::KeyEvent;
use vtcore_input::keyboard_state::KeyboardState;
use vtcore_input::layout::Layout;
use vtcore_input::mouse::{encode_mouse_event, MouseEvent, MouseTrack};

use crate::backend::{Backend, BackendCapabilities};
use crate::dispatch;
use crate::error::EmulatorError;
use crate::parser::Parser;
use crate::queue::OutboundQueue;
use crate::state::{EmulatorState, Identity};

/// Queued-reply capacity for the outbound channel (§5); see
/// [`OutboundQueue`] for why this counts replies rather than bytes.
const OUTBOUND_CAPACITY: usize = 256;

fn layout_for(name: &str) -> Layout {
    match name {
        "us-international" => Layout::us_international(),
        _ => Layout::us_qwerty(),
    }
}

fn active_mouse_track(modes: &ModeTable) -> MouseTrack {
    if modes.get(ModeId::MouseMotion).is_on() {
        MouseTrack::LegacyAnyMotion
    } else if modes.get(ModeId::MouseDrag).is_on() {
        MouseTrack::LegacyDrag
    } else if modes.get(ModeId::MouseButton).is_on() {
        MouseTrack::Legacy
    } else if modes.get(ModeId::MouseX10).is_on() {
        MouseTrack::X10
    } else {
        MouseTrack::None
    }
}

/// Owns one terminal session: byte stream in, a mutated [`EmulatorState`] and
/// `Backend` calls, application bytes out. Not `Send`/`Sync` by itself; the
/// caller's run loop is responsible for only
/// ever touching one `Emulator` from one thread at a time, aside from the
/// `OutboundQueue`'s own internal synchronization.
pub struct Emulator<B: Backend> {
    state: EmulatorState,
    backend: B,
    caps: BackendCapabilities,
    parser: Parser,
    outbound: OutboundQueue,
    keyboard: KeyboardState,
}

impl<B: Backend> Emulator<B> {
    #[must_use]
    pub fn new(config: &EmulatorConfig, mut backend: B) -> Self {
        let caps = BackendCapabilities::probe(&mut backend);
        let mut state = EmulatorState::new(config.grid.initial_columns, config.grid.initial_rows);
        state.identity = Identity {
            name: config.identity.id.clone(),
            version: config.identity.version.clone(),
        };

        let mut keyboard = KeyboardState::new(layout_for(&config.keyboard.default_layout));
        keyboard.repeat_delay = std::time::Duration::from_millis(u64::from(config.keyboard.repeat_delay_ms));
        keyboard.repeat_interval = std::time::Duration::from_millis(u64::from(config.keyboard.repeat_interval_ms));

        Self {
            state,
            backend,
            caps,
            parser: Parser::new(),
            outbound: OutboundQueue::new(OUTBOUND_CAPACITY),
            keyboard,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &EmulatorState {
        &self.state
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Begin accepting `write`/`read`/`drain` calls.
    ///
    /// # Errors
    /// Returns [`EmulatorError::AlreadyStarted`] if the run loop is already
    /// running.
    pub fn start(&self) -> Result<(), EmulatorError> {
        self.outbound.start().inspect_err(|e| warn!("start failed: {e}"))
    }

    /// Stop the run loop. Pending outbound bytes are dropped; the parser's
    /// in-progress sequence (if any) is discarded.
    pub fn stop(&mut self) {
        debug!("stopping emulator run loop");
        self.outbound.stop();
        self.parser.reset();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.outbound.is_running()
    }

    /// Feed host-supplied bytes (typically the PTY/subprocess's stdout) into
    /// the parser and apply every resulting command. Always processes
    /// synchronously, regardless of whether the outbound queue is running.
    pub fn write(&mut self, bytes: &[u8]) {
        let events = self.parser.feed(bytes);
        for event in events {
            dispatch::dispatch(event, &mut self.state, &mut self.backend, &self.outbound, self.caps);
        }
    }

    /// # Errors
    /// Returns [`EmulatorError::ReadAfterStop`] if the queue was never
    /// started or has since been stopped with nothing left to drain.
    pub fn read(&self, max: usize) -> Result<Vec<u8>, EmulatorError> {
        self.outbound.read(max)
    }

    /// # Errors
    /// Returns [`EmulatorError::DrainAfterStop`] if the queue isn't running.
    pub fn drain(&self) -> Result<(), EmulatorError> {
        self.outbound.drain()
    }

    /// Resolve one physical key transition and enqueue the
    /// resulting application bytes, if any.
    pub fn key_event(&mut self, event: KeyEvent) {
        self.keyboard.app_cursor = self.state.modes.get(ModeId::AppCursor).is_on();
        let bytes = self.keyboard.handle_key_event(event);
        if !bytes.is_empty() {
            let _ = self.outbound.send_raw(&bytes);
        }
    }

    /// Drive the keyboard auto-repeat timer; call this periodically from the
    /// host's own timer/event loop.
    pub fn tick(&mut self, now: Instant) {
        let bytes = self.keyboard.tick(now);
        if !bytes.is_empty() {
            let _ = self.outbound.send_raw(&bytes);
        }
    }

    /// Encode one mouse transition under whichever tracking mode
    /// and framing (X10/legacy/SGR) is currently active, and enqueue it.
    pub fn mouse_event(&mut self, event: MouseEvent) {
        let track = active_mouse_track(&self.state.modes);
        let sgr = self.state.modes.get(ModeId::MouseSgr).is_on();
        if let Some(bytes) = encode_mouse_event(event, track, sgr) {
            let _ = self.outbound.send_raw(&bytes);
        }
    }

    /// Notify the emulator that the viewport was resized to `(columns,
    /// rows)`. Resizes the grid, notifies the backend, and — if mode 2048 is
    /// enabled — enqueues an xterm-style resize report.
    pub fn resize_event(&mut self, columns: usize, rows: usize) {
        debug!("resize to {columns}x{rows}");
        self.state.resize(columns, rows);
        self.backend.raise_resize(columns, rows);
        if self.state.modes.get(ModeId::ResizeReports).is_on() {
            let report = format!("\x1b[48;{rows};{columns}t");
            let _ = self.outbound.send_raw(report.as_bytes());
        }
    }

    /// DECSTR: restores cursor, modes, tab stops, and the scroll region to
    /// power-on defaults. Does not clear the grid (see `hard_reset` in
    /// `dispatch`, reachable only through `ESC c` on the byte stream).
    pub fn soft_reset(&mut self) {
        self.state.soft_reset();
        self.backend.set_position(self.state.cursor.pos);
        self.backend.set_style(self.state.cursor.style.clone());
    }
}
