// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt;

use conv2::ValueInto;

/// A terminal color as carried by a `Style`.
///
/// `Reset` and `Default` are kept distinct: `Reset` is what SGR 0 puts back
/// in place (the backend's "no color" value), while `Default` is what SGR
/// 39/49/59 select explicitly (the backend's configured default foreground,
/// background, or underline color, which a themed backend may differ from
/// `Reset`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    Reset,
    Default,
    Palette(u8),
    Rgb(u8, u8, u8),
    None,
}

impl Default for Color {
    fn default() -> Self {
        Self::Reset
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("reset"),
            Self::Default => f.write_str("default"),
            Self::None => f.write_str("none"),
            Self::Palette(idx) => write!(f, "palette({idx})"),
            Self::Rgb(r, g, b) => write!(f, "rgb({r}, {g}, {b})"),
        }
    }
}

/// Resolve a 256-color palette index into 24-bit RGB.
///
/// <https://stackoverflow.com/questions/69138165/how-to-get-the-rgb-values-of-a-256-color-palette-terminal-color>
#[must_use]
pub fn resolve_256(index: u8) -> (u8, u8, u8) {
    let index = usize::from(index);
    match index {
        0 => (0, 0, 0),
        1 => (0x80, 0, 0),
        2 => (0, 0x80, 0),
        3 => (0x80, 0x80, 0),
        4 => (0, 0, 0x80),
        5 => (0x80, 0, 0x80),
        6 => (0, 0x80, 0x80),
        7 => (0xc0, 0xc0, 0xc0),
        8 => (0x80, 0x80, 0x80),
        9 => (0xff, 0, 0),
        10 => (0, 0xff, 0),
        11 => (0xff, 0xff, 0),
        12 => (0, 0, 0xff),
        13 => (0xff, 0, 0xff),
        14 => (0, 0xff, 0xff),
        15 => (0xff, 0xff, 0xff),
        232..=255 => {
            let value = (2056 + 2570 * (index - 232)) / 256;
            let value: u8 = value.value_into().unwrap_or(0xff);
            (value, value, value)
        }
        _ => (
            cube_component(index, 36),
            cube_component(index, 6),
            cube_component(index, 1),
        ),
    }
}

fn cube_component(value: usize, modifier: usize) -> u8 {
    let i = ((value - 16) / modifier) % 6;
    let v = if i == 0 { 0 } else { (14135 + 10280 * i) / 256 };
    v.value_into().unwrap_or(0xff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_reset() {
        assert_eq!(Color::default(), Color::Reset);
    }

    #[test]
    fn pure_colors_round_trip() {
        assert_eq!(resolve_256(0), (0, 0, 0));
        assert_eq!(resolve_256(15), (0xff, 0xff, 0xff));
    }

    #[test]
    fn grayscale_ramp_is_monotonic() {
        let (r0, _, _) = resolve_256(232);
        let (r1, _, _) = resolve_256(255);
        assert!(r1 > r0);
    }

    #[test]
    fn display_matches_expected_text() {
        assert_eq!(Color::Rgb(1, 2, 3).to_string(), "rgb(1, 2, 3)");
        assert_eq!(Color::Palette(9).to_string(), "palette(9)");
        assert_eq!(Color::Default.to_string(), "default");
    }

    proptest::proptest! {
        #[test]
        fn grayscale_ramp_never_regresses(index in 232u8..255) {
            let (r1, g1, b1) = resolve_256(index);
            let (r2, _, _) = resolve_256(index + 1);
            proptest::prop_assert_eq!(r1, g1);
            proptest::prop_assert_eq!(g1, b1);
            proptest::prop_assert!(r2 >= r1);
        }

        #[test]
        fn cube_component_wraps_every_six_steps(
            value in 16usize..230,
            modifier in proptest::prelude::prop::sample::select(vec![36usize, 6usize, 1usize]),
        ) {
            let c = cube_component(value, modifier);
            let wrapped = cube_component(value + modifier * 6, modifier);
            proptest::prop_assert_eq!(wrapped, c);
        }

        #[test]
        fn resolve_256_never_panics(index in proptest::prelude::any::<u8>()) {
            let _ = resolve_256(index);
        }
    }
}
