// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashMap;

/// DECRQM-style mode status. `NA` means "mode not recognized at all";
/// `Off`/`On` are the ordinary toggled states; `*Locked` variants reject
/// further `DECSET`/`DECRST` until something else unlocks them (none of the
/// modes below ship pre-locked, but the status exists so a backend-delegated
/// mode can report one).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ModeStatus {
    #[default]
    NA,
    On,
    Off,
    OnLocked,
    OffLocked,
}

impl ModeStatus {
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On | Self::OnLocked)
    }

    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::OnLocked | Self::OffLocked)
    }

    /// The numeric code DECRQM replies with (`CSI ? n ; code $y`).
    #[must_use]
    pub const fn decrqm_code(self) -> u8 {
        match self {
            Self::NA => 0,
            Self::On => 1,
            Self::Off => 2,
            Self::OnLocked => 3,
            Self::OffLocked => 4,
        }
    }
}

/// Every mode the emulator core recognizes, DEC-private and ANSI alike.
/// `Unknown` carries the raw wire number/prefix so DECRQM can still answer
/// (with `NA`) and so a future mode can be added without breaking callers
/// matching on this enum defensively.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ModeId {
    /// DECCKM (?1) — application cursor keys.
    AppCursor,
    /// DECAWM (?7) — autowrap.
    AutoMargin,
    /// DECTCEM (?25) — cursor visibility.
    ShowCursor,
    /// xterm `CSI ? 2048 h` family — emit resize reports (`CSI 48;…t`).
    ResizeReports,
    /// Mode 2027 — grapheme cluster width/segmentation mode.
    GraphemeClusters,
    /// XtCBlink (?12) — cursor blinks vs. steady.
    BlinkCursor,
    /// DECLRMM (?69) — enables left/right scroll margins (DECSLRM).
    LeftRightMargin,
    /// Mode 9 — X10 mouse reporting (press only).
    MouseX10,
    /// Mode 1000 — legacy button-event mouse reporting (press + release).
    MouseButton,
    /// Mode 1002 — legacy button-event + drag mouse reporting.
    MouseDrag,
    /// Mode 1003 — legacy any-motion mouse reporting.
    MouseMotion,
    /// Mode 1006 — SGR extended mouse report framing.
    MouseSgr,
    /// Mode 2004 — bracketed paste.
    BracketedPaste,
    /// Mode 1004 — focus in/out reporting.
    FocusReports,
    /// ANSI mode 20 (not DEC-private) — LNM, newline mode.
    AnsiNewLine,
    /// Anything delegated to the backend (alt-screen 1049, sync-output 2026,
    /// column mode 3, reverse video 5, origin mode 6, Win32 input, …) or not
    /// recognized at all. `private` mirrors the `?` prefix on the wire;
    /// `number` is the raw parameter.
    Delegated { number: u16, private: bool },
}

impl ModeId {
    /// Classify a wire mode number into a `ModeId`. `private` is `true` for
    /// `CSI ? n h/l/$p`, `false` for the bare ANSI `CSI n h/l/$p` form.
    #[must_use]
    pub const fn from_wire(number: u16, private: bool) -> Self {
        if !private {
            return match number {
                20 => Self::AnsiNewLine,
                _ => Self::Delegated { number, private },
            };
        }
        match number {
            1 => Self::AppCursor,
            7 => Self::AutoMargin,
            9 => Self::MouseX10,
            12 => Self::BlinkCursor,
            25 => Self::ShowCursor,
            69 => Self::LeftRightMargin,
            1000 => Self::MouseButton,
            1002 => Self::MouseDrag,
            1003 => Self::MouseMotion,
            1004 => Self::FocusReports,
            1006 => Self::MouseSgr,
            2004 => Self::BracketedPaste,
            2027 => Self::GraphemeClusters,
            2048 => Self::ResizeReports,
            _ => Self::Delegated { number, private },
        }
    }

    /// Is this mode owned locally by the emulator (C7 §4.5), as opposed to
    /// delegated to the backend? `DECRQM`/`DECSET`/`DECRST` on a local mode
    /// never reaches the backend; on a delegated one, it always does (and
    /// `NA` comes back if the backend doesn't recognize it either).
    #[must_use]
    pub const fn is_local(self) -> bool {
        !matches!(self, Self::Delegated { .. })
    }

    /// The power-on default status for a locally owned mode. Delegated modes
    /// have no opinion here; the backend decides.
    #[must_use]
    pub const fn power_on_default(self) -> ModeStatus {
        match self {
            Self::AutoMargin | Self::ShowCursor => ModeStatus::On,
            Self::Delegated { .. } => ModeStatus::NA,
            _ => ModeStatus::Off,
        }
    }
}

/// A table mapping mode identifiers to their current status. One instance
/// covers every locally owned mode; the emulator keeps a second logical view
/// over the backend for delegated modes (§4.5), but both read through this
/// same shape so `DECRQM` has one code path regardless of which side owns
/// the mode.
#[derive(Debug, Clone, Default)]
pub struct ModeTable {
    entries: HashMap<ModeId, ModeStatus>,
}

impl ModeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: ModeId) -> ModeStatus {
        self.entries
            .get(&id)
            .copied()
            .unwrap_or_else(|| id.power_on_default())
    }

    /// Set a mode on/off. A no-op if the mode is currently locked, per spec
    /// §4.5 ("Setting a locked mode or NA mode is a no-op").
    pub fn set(&mut self, id: ModeId, on: bool) {
        let current = self.get(id);
        if current.is_locked() {
            return;
        }
        self.entries
            .insert(id, if on { ModeStatus::On } else { ModeStatus::Off });
    }

    /// Reset every entry to its power-on default, used by soft reset.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decckm_round_trips_through_wire_classification() {
        assert_eq!(ModeId::from_wire(1, true), ModeId::AppCursor);
        assert!(ModeId::AppCursor.is_local());
    }

    #[test]
    fn unknown_private_mode_is_delegated_and_na_by_default() {
        let id = ModeId::from_wire(1919, true);
        assert!(!id.is_local());
        let table = ModeTable::new();
        assert_eq!(table.get(id), ModeStatus::NA);
    }

    #[test]
    fn set_then_set_is_idempotent() {
        let mut t = ModeTable::new();
        t.set(ModeId::AppCursor, true);
        let once = t.get(ModeId::AppCursor);
        t.set(ModeId::AppCursor, true);
        assert_eq!(t.get(ModeId::AppCursor), once);
    }

    #[test]
    fn reset_after_set_restores_power_on_default() {
        let mut t = ModeTable::new();
        t.set(ModeId::AppCursor, true);
        t.set(ModeId::AppCursor, false);
        assert_eq!(t.get(ModeId::AppCursor), ModeStatus::Off);
    }

    #[test]
    fn locked_mode_ignores_further_sets() {
        let mut t = ModeTable::new();
        t.entries.insert(ModeId::ShowCursor, ModeStatus::OnLocked);
        t.set(ModeId::ShowCursor, false);
        assert_eq!(t.get(ModeId::ShowCursor), ModeStatus::OnLocked);
    }

    #[test]
    fn ansi_newline_mode_is_not_private() {
        assert_eq!(ModeId::from_wire(20, false), ModeId::AnsiNewLine);
        assert_eq!(ModeId::from_wire(20, true), ModeId::Delegated { number: 20, private: true });
    }

    #[test]
    fn autowrap_and_cursor_default_on() {
        let t = ModeTable::new();
        assert_eq!(t.get(ModeId::AutoMargin), ModeStatus::On);
        assert_eq!(t.get(ModeId::ShowCursor), ModeStatus::On);
        assert_eq!(t.get(ModeId::AppCursor), ModeStatus::Off);
    }
}
