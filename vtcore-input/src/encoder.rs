// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Legacy VT220 key encoding. Turns a resolved keypress
//! (physical key + rune from the layout, plus live modifiers) into the byte
//! sequence the host application expects on its stdin.

use crate::key::Key;
use crate::modifiers::Modifier;

/// Which family a special key's base encoding belongs to, so the modifier
/// fallback (when the exact modifier combination has no specific slot) knows
/// how to rebuild a modified form.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Slot {
    /// `ESC O x` normally, `ESC [ 1 ; m x` when modified.
    Ss3(u8),
    /// `ESC [ n ~` normally, `ESC [ n ; m ~` when modified.
    CsiTilde(u16),
}

const fn legacy_slot(key: Key) -> Option<Slot> {
    match key {
        Key::ArrowUp => Some(Slot::Ss3(b'A')),
        Key::ArrowDown => Some(Slot::Ss3(b'B')),
        Key::ArrowRight => Some(Slot::Ss3(b'C')),
        Key::ArrowLeft => Some(Slot::Ss3(b'D')),
        Key::Home => Some(Slot::Ss3(b'H')),
        Key::End => Some(Slot::Ss3(b'F')),
        Key::F(1) => Some(Slot::Ss3(b'P')),
        Key::F(2) => Some(Slot::Ss3(b'Q')),
        Key::F(3) => Some(Slot::Ss3(b'R')),
        Key::F(4) => Some(Slot::Ss3(b'S')),
        Key::Insert => Some(Slot::CsiTilde(2)),
        Key::Delete => Some(Slot::CsiTilde(3)),
        Key::PageUp => Some(Slot::CsiTilde(5)),
        Key::PageDown => Some(Slot::CsiTilde(6)),
        Key::F(5) => Some(Slot::CsiTilde(15)),
        Key::F(6) => Some(Slot::CsiTilde(17)),
        Key::F(7) => Some(Slot::CsiTilde(18)),
        Key::F(8) => Some(Slot::CsiTilde(19)),
        Key::F(9) => Some(Slot::CsiTilde(20)),
        Key::F(10) => Some(Slot::CsiTilde(21)),
        Key::F(11) => Some(Slot::CsiTilde(23)),
        Key::F(12) => Some(Slot::CsiTilde(24)),
        Key::F(13) => Some(Slot::CsiTilde(25)),
        Key::F(14) => Some(Slot::CsiTilde(26)),
        Key::F(15) => Some(Slot::CsiTilde(28)),
        Key::F(16) => Some(Slot::CsiTilde(29)),
        Key::F(17) => Some(Slot::CsiTilde(31)),
        Key::F(18) => Some(Slot::CsiTilde(32)),
        Key::F(19) => Some(Slot::CsiTilde(33)),
        Key::F(20) => Some(Slot::CsiTilde(34)),
        _ => None,
    }
}

/// Arrow and Home/End switch between their base and SS3 ("application
/// cursor") forms on `PmAppCursor`; every other slot (function keys,
/// Insert/Delete/PageUp/PageDown) always uses the base form.
const fn app_cursor_sensitive(key: Key) -> bool {
    matches!(
        key,
        Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight | Key::Home | Key::End
    )
}

fn push_ctrl_ascii(out: &mut Vec<u8>, letter: u8, alt: bool) {
    if alt {
        out.push(0x1B);
    }
    out.push(letter.to_ascii_uppercase() - b'A' + 1);
}

/// Encode a rune produced by layout resolution, applying Ctrl/Alt: ASCII
/// letters with Ctrl send `letter - 'A' + 1` (optionally `ESC`-prefixed
/// under Alt). Non-letters with Ctrl pass through unmodified
/// (the layout is expected to have already produced the intended rune).
#[must_use]
pub fn encode_char(rune: char, modifiers: Modifier) -> Vec<u8> {
    let mut out = Vec::new();
    let alt = modifiers.contains(Modifier::ALT);
    if modifiers.contains(Modifier::CONTROL) && rune.is_ascii_alphabetic() {
        push_ctrl_ascii(&mut out, rune as u8, alt);
        return out;
    }
    if alt {
        out.push(0x1B);
    }
    let mut buf = [0u8; 4];
    out.extend_from_slice(rune.encode_utf8(&mut buf).as_bytes());
    out
}

fn push_alt(out: &mut Vec<u8>, modifiers: Modifier) {
    if modifiers.contains(Modifier::ALT) {
        out.push(0x1B);
    }
}

/// Encode a special (non-printable) key per the legacy VT220 table,
/// honoring application-cursor mode and building a modified CSI form when
/// the modifier combination has no dedicated slot. Meta/Hyper suppress
/// legacy encoding entirely (spec §4.6): a host that binds those modifiers
/// itself should see nothing emitted here.
#[must_use]
pub fn encode_special_key(key: Key, modifiers: Modifier, app_cursor: bool) -> Option<Vec<u8>> {
    if modifiers.intersects(Modifier::META | Modifier::HYPER) {
        return None;
    }
    match key {
        Key::Tab => Some(vec![0x09]),
        Key::Backspace => Some(vec![0x08]),
        Key::Return => Some(vec![b'\r']),
        Key::Escape => Some(vec![0x1B]),
        Key::Space => Some(encode_char(' ', modifiers)),
        _ => encode_legacy_slot(key, modifiers, app_cursor),
    }
}

fn encode_legacy_slot(key: Key, modifiers: Modifier, app_cursor: bool) -> Option<Vec<u8>> {
    let slot = legacy_slot(key)?;
    let plain = modifiers.xterm_modifier_number() == 1;
    let mut out = Vec::new();
    push_alt(&mut out, modifiers);

    match slot {
        Slot::Ss3(final_byte) => {
            if plain {
                if app_cursor && app_cursor_sensitive(key) {
                    out.extend_from_slice(b"\x1bO");
                } else {
                    out.extend_from_slice(b"\x1b[");
                }
                out.push(final_byte);
            } else {
                out.extend_from_slice(format!("\x1b[1;{}", modifiers.xterm_modifier_number()).as_bytes());
                out.push(final_byte);
            }
        }
        Slot::CsiTilde(n) => {
            if plain {
                out.extend_from_slice(format!("\x1b[{n}~").as_bytes());
            } else {
                out.extend_from_slice(format!("\x1b[{n};{}~", modifiers.xterm_modifier_number()).as_bytes());
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_arrow_up_uses_csi_form() {
        let bytes = encode_special_key(Key::ArrowUp, Modifier::empty(), false).expect("arrow up encodes");
        assert_eq!(bytes, b"\x1b[A");
    }

    #[test]
    fn app_cursor_arrow_up_uses_ss3_form() {
        let bytes = encode_special_key(Key::ArrowUp, Modifier::empty(), true).expect("arrow up encodes");
        assert_eq!(bytes, b"\x1bOA");
    }

    #[test]
    fn alt_ctrl_shift_f3_matches_spec_scenario() {
        let modifiers = Modifier::ALT | Modifier::CONTROL | Modifier::SHIFT;
        let bytes = encode_special_key(Key::F(3), modifiers, false).expect("f3 encodes");
        assert_eq!(bytes, b"\x1b\x1b[1;6R");
    }

    #[test]
    fn ctrl_letter_sends_control_code() {
        let bytes = encode_char('a', Modifier::CONTROL);
        assert_eq!(bytes, vec![1]);
    }

    #[test]
    fn alt_letter_prefixes_escape() {
        let bytes = encode_char('a', Modifier::ALT);
        assert_eq!(bytes, b"\x1ba");
    }

    #[test]
    fn delete_key_uses_csi_tilde_form() {
        let bytes = encode_special_key(Key::Delete, Modifier::empty(), false).expect("delete encodes");
        assert_eq!(bytes, b"\x1b[3~");
    }

    #[test]
    fn modified_csi_tilde_inserts_modifier_number() {
        let bytes = encode_special_key(Key::Delete, Modifier::SHIFT, false).expect("delete encodes");
        assert_eq!(bytes, b"\x1b[3;2~");
    }

    #[test]
    fn page_keys_are_always_csi_regardless_of_app_cursor() {
        let bytes = encode_special_key(Key::PageUp, Modifier::empty(), true).expect("page up encodes");
        assert_eq!(bytes, b"\x1b[5~");
    }
}
