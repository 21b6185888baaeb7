// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vtcore_common::coord::Coord;
use vtcore_common::cursor::CursorVisualStyle;
use vtcore_common::modes::{ModeId, ModeStatus};
use vtcore_common::style::Style;

/// The narrow interface the emulator drives. Concrete renderers, mock test
/// harnesses, and graphical drivers implement this; the emulator core never
/// assumes anything about how a backend actually draws.
///
/// Backend-delegated mode queries (§4.5) and required positioning/style
/// calls go through here; optional capabilities are probed once via the
/// `as_*` methods and cached by the emulator at construction (§9, "capability
/// object pattern") rather than re-checked on the hot path.
pub trait Backend {
    fn get_private_mode(&self, id: ModeId) -> ModeStatus;
    fn set_private_mode(&mut self, id: ModeId, status: ModeStatus);

    /// `(columns, rows)`.
    fn get_size(&self) -> (usize, usize);

    fn set_style(&mut self, style: Style);
    fn get_style(&self) -> Style;

    /// Number of simultaneously renderable colors: 0, 16, 256, or 16,777,216.
    /// Drives the Primary DA reply (§4.2).
    fn colors(&self) -> u32;

    fn put_rune(&mut self, coord: Coord, rune: char, width: usize);
    fn put_grapheme(&mut self, coord: Coord, grapheme: &str, width: usize);

    fn set_position(&mut self, coord: Coord);
    fn get_position(&self) -> Coord;

    /// DECSCUSR (`CSI n SP q`): glyph shape and blink state of the cursor.
    fn set_cursor_style(&mut self, style: CursorVisualStyle);

    /// Return the backend to its power-on appearance (used by hard reset).
    fn reset(&mut self);

    /// Notify the backend that the grid was resized to `(columns, rows)`,
    /// so it can repaint/reflow. Distinct from the optional `Resizer`
    /// capability, which lets the emulator *request* a resize outward.
    fn raise_resize(&mut self, columns: usize, rows: usize);

    fn as_beeper(&mut self) -> Option<&mut dyn Beeper> {
        None
    }

    fn as_resizer(&mut self) -> Option<&mut dyn Resizer> {
        None
    }

    fn as_titler(&mut self) -> Option<&mut dyn Titler> {
        None
    }

    fn as_mouser(&mut self) -> Option<&mut dyn Mouser> {
        None
    }

    fn as_clipboard(&mut self) -> Option<&mut dyn Clipboard> {
        None
    }

    fn as_blitter(&mut self) -> Option<&mut dyn Blitter> {
        None
    }
}

/// BEL (0x07): audible/visible bell.
pub trait Beeper {
    fn bell(&mut self);
}

/// Lets the emulator ask the backend to change the window's cell size, e.g.
/// in response to a DECSLPP/window-size `t`-family request. Separate from
/// `Backend::raise_resize`, which notifies of a resize that already happened.
pub trait Resizer {
    fn request_resize(&mut self, columns: usize, rows: usize);
}

/// OSC 0/2: window/icon title.
pub trait Titler {
    fn set_window_title(&mut self, title: &str);
}

/// Lets the emulator tell the backend to start/stop delivering native mouse
/// events, tracking the locally owned `PmMouse*` modes (§4.5).
pub trait Mouser {
    fn set_mouse_capture(&mut self, enabled: bool);
}

/// OSC 52 clipboard read/write.
pub trait Clipboard {
    fn set_clipboard(&mut self, data: &[u8]);
    fn get_clipboard(&self) -> Option<Vec<u8>>;
}

/// Fast row-range copy for scroll acceleration. When absent, the emulator
/// copies cell by cell through `put_grapheme` (§4.3).
pub trait Blitter {
    fn blit_rows(&mut self, src_top: usize, dst_top: usize, count: usize, left: usize, right: usize);
}

/// Which optional capabilities a backend exposes, probed once at
/// construction and cached to avoid repeated dynamic checks on the hot path.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct BackendCapabilities {
    pub beeper: bool,
    pub resizer: bool,
    pub titler: bool,
    pub mouser: bool,
    pub clipboard: bool,
    pub blitter: bool,
}

impl BackendCapabilities {
    #[must_use]
    pub fn probe(backend: &mut dyn Backend) -> Self {
        let caps = Self {
            beeper: backend.as_beeper().is_some(),
            resizer: backend.as_resizer().is_some(),
            titler: backend.as_titler().is_some(),
            mouser: backend.as_mouser().is_some(),
            clipboard: backend.as_clipboard().is_some(),
            blitter: backend.as_blitter().is_some(),
        };
        if !caps.beeper {
            warn!("backend has no Beeper; BEL will be silently dropped");
        }
        if !caps.clipboard {
            warn!("backend has no Clipboard; OSC 52 queries will report nothing unless the emulator's own last-written value can answer them");
        }
        caps
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingBackend;
    use super::*;

    #[test]
    fn capability_probe_finds_clipboard_only() {
        let mut backend = RecordingBackend::new(80, 24);
        let caps = BackendCapabilities::probe(&mut backend);
        assert!(caps.clipboard);
        assert!(!caps.beeper);
        assert!(!caps.blitter);
    }

    #[test]
    fn unknown_delegated_mode_is_na() {
        let backend = RecordingBackend::new(80, 24);
        let status = backend.get_private_mode(ModeId::Delegated {
            number: 1049,
            private: true,
        });
        assert_eq!(status, ModeStatus::NA);
    }
}
