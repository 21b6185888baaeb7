// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use bitflags::bitflags;

bitflags! {
    /// The live modifier mask consulted by layout resolution and legacy
    /// encoding. Separate from [`crate::key::Key`] variants, which name the
    /// physical modifier *keys*; this is the derived bitset those keys
    /// toggle (spec §3 "Keyboard state").
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
    pub struct Modifier: u8 {
        const SHIFT   = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT     = 0b0000_0100;
        const META    = 0b0000_1000;
        const HYPER   = 0b0001_0000;
    }
}

impl Modifier {
    /// The modifier number xterm appends to CSI/SS3 key sequences:
    /// `1 + (shift?1:0) + (control?4:0)` (spec §4.6). Alt/Meta/Hyper do not
    /// contribute to this number; Alt is instead applied as a leading `ESC`.
    #[must_use]
    pub fn xterm_modifier_number(self) -> u8 {
        let mut n = 1;
        if self.contains(Self::SHIFT) {
            n += 1;
        }
        if self.contains(Self::CONTROL) {
            n += 4;
        }
        n
    }

    #[must_use]
    pub const fn is_plain(self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_modifier_number_is_one() {
        assert_eq!(Modifier::empty().xterm_modifier_number(), 1);
    }

    #[test]
    fn shift_control_combine_into_six() {
        let m = Modifier::SHIFT | Modifier::CONTROL;
        assert_eq!(m.xterm_modifier_number(), 6);
    }
}
