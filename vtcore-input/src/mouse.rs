// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mouse button/motion/modifier events to X10, legacy, and SGR byte
//! sequences (C9, spec §4.7).

use vtcore_common::coord::Coord;

use crate::modifiers::Modifier;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    WheelLeft,
    WheelRight,
    Extra(u8),
}

impl MouseButton {
    /// Base button code before modifier/motion bits are added (spec §4.7).
    const fn code(self) -> u16 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Middle => 2,
            Self::WheelUp => 0x40,
            Self::WheelDown => 0x41,
            Self::WheelLeft => 0x42,
            Self::WheelRight => 0x43,
            Self::Extra(n) => 0x80 + (n as u16),
        }
    }

    const fn is_wheel(self) -> bool {
        matches!(
            self,
            Self::WheelUp | Self::WheelDown | Self::WheelLeft | Self::WheelRight
        )
    }
}

/// Which tracking mode is currently active, mirroring the locally owned
/// `PmMouse*` modes (spec §4.5/§4.7). `None` means no frame is emitted.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum MouseTrack {
    #[default]
    None,
    /// Mode 9: press-only, X10 framing.
    X10,
    /// Mode 1000: press + release, legacy framing.
    Legacy,
    /// Mode 1002: press + release + drag, legacy framing.
    LegacyDrag,
    /// Mode 1003: press + release + all motion, legacy framing.
    LegacyAnyMotion,
}

impl MouseTrack {
    const fn reports_release(self) -> bool {
        !matches!(self, Self::None | Self::X10)
    }

    const fn reports_drag(self) -> bool {
        matches!(self, Self::LegacyDrag | Self::LegacyAnyMotion)
    }

    const fn reports_any_motion(self) -> bool {
        matches!(self, Self::LegacyAnyMotion)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MouseEventKind {
    Press(MouseButton),
    Release(MouseButton),
    Motion { button_held: Option<MouseButton> },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub position: Coord,
    pub modifiers: Modifier,
}

fn modifier_bits(modifiers: Modifier) -> u16 {
    let mut bits = 0;
    if modifiers.contains(Modifier::SHIFT) {
        bits += 4;
    }
    if modifiers.contains(Modifier::ALT) || modifiers.contains(Modifier::META) {
        bits += 8;
    }
    if modifiers.contains(Modifier::CONTROL) {
        bits += 16;
    }
    bits
}

fn x10_frame(cb: u16, position: Coord) -> Vec<u8> {
    vec![
        0x1B,
        b'[',
        b'M',
        u8::try_from((cb + 32).min(255)).unwrap_or(255),
        u8::try_from((position.col + 1 + 32).min(255)).unwrap_or(255),
        u8::try_from((position.row + 1 + 32).min(255)).unwrap_or(255),
    ]
}

fn sgr_frame(cb: u16, position: Coord, release: bool) -> Vec<u8> {
    format!(
        "\x1b[<{cb};{};{}{}",
        position.col + 1,
        position.row + 1,
        if release { 'm' } else { 'M' }
    )
    .into_bytes()
}

/// Encode `event` under `track` (the legacy/X10 framing) and `sgr` (whether
/// mode 1006 overrides the framing, per spec §4.7 "`PmMouseSgr` overrides
/// the framing of whichever tracking mode is enabled"). Returns `None` when
/// the event shouldn't be reported under the current mode combination.
#[must_use]
pub fn encode_mouse_event(event: MouseEvent, track: MouseTrack, sgr: bool) -> Option<Vec<u8>> {
    if track == MouseTrack::None {
        trace!("mouse event suppressed: no tracking mode active");
        return None;
    }

    let (button, release) = match event.kind {
        MouseEventKind::Press(button) => (button, false),
        MouseEventKind::Release(button) => {
            if !track.reports_release() {
                trace!("release suppressed: {track:?} does not report release");
                return None;
            }
            (button, true)
        }
        MouseEventKind::Motion { button_held } => {
            if let Some(button) = button_held {
                if !track.reports_drag() {
                    trace!("drag suppressed: {track:?} does not report drag");
                    return None;
                }
                (button, false)
            } else {
                if !track.reports_any_motion() {
                    trace!("motion suppressed: {track:?} does not report bare motion");
                    return None;
                }
                (MouseButton::Left, false)
            }
        }
    };

    let mut cb = if matches!(event.kind, MouseEventKind::Motion { .. }) {
        0x20
    } else {
        0
    };

    cb += if release && !sgr && !button.is_wheel() {
        3
    } else {
        button.code()
    };
    cb += modifier_bits(event.modifiers);

    if sgr {
        Some(sgr_frame(cb, event.position, release))
    } else {
        Some(x10_frame(cb, event.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(col: usize, row: usize) -> Coord {
        Coord::new(col, row)
    }

    #[test]
    fn sgr_press_and_release_round_trip() {
        let press = MouseEvent {
            kind: MouseEventKind::Press(MouseButton::Left),
            position: at(2, 3),
            modifiers: Modifier::empty(),
        };
        let release = MouseEvent {
            kind: MouseEventKind::Release(MouseButton::Left),
            position: at(2, 3),
            modifiers: Modifier::empty(),
        };
        assert_eq!(
            encode_mouse_event(press, MouseTrack::Legacy, true),
            Some(b"\x1b[<0;3;4M".to_vec())
        );
        assert_eq!(
            encode_mouse_event(release, MouseTrack::Legacy, true),
            Some(b"\x1b[<0;3;4m".to_vec())
        );
    }

    #[test]
    fn x10_mode_ignores_release_events() {
        let release = MouseEvent {
            kind: MouseEventKind::Release(MouseButton::Left),
            position: at(0, 0),
            modifiers: Modifier::empty(),
        };
        assert_eq!(encode_mouse_event(release, MouseTrack::X10, false), None);
    }

    #[test]
    fn legacy_release_uses_button_code_three() {
        let release = MouseEvent {
            kind: MouseEventKind::Release(MouseButton::Left),
            position: at(0, 0),
            modifiers: Modifier::empty(),
        };
        let bytes = encode_mouse_event(release, MouseTrack::Legacy, false).expect("release encodes");
        assert_eq!(bytes, vec![0x1B, b'[', b'M', 3 + 32, 1 + 32, 1 + 32]);
    }

    #[test]
    fn motion_without_button_requires_any_motion_mode() {
        let motion = MouseEvent {
            kind: MouseEventKind::Motion { button_held: None },
            position: at(0, 0),
            modifiers: Modifier::empty(),
        };
        assert_eq!(encode_mouse_event(motion, MouseTrack::LegacyDrag, true), None);
        assert!(encode_mouse_event(motion, MouseTrack::LegacyAnyMotion, true).is_some());
    }

    #[test]
    fn shift_modifier_adds_four_to_button_code() {
        let press = MouseEvent {
            kind: MouseEventKind::Press(MouseButton::Left),
            position: at(0, 0),
            modifiers: Modifier::SHIFT,
        };
        let bytes = encode_mouse_event(press, MouseTrack::Legacy, true).expect("press encodes");
        assert_eq!(bytes, b"\x1b[<4;1;1M".to_vec());
    }
}
