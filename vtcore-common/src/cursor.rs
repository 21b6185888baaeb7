// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// The visible cursor glyph and whether it blinks, selected by DECSCUSR
/// (`CSI n SP q`). Kept as its own small enum, the way the teacher keeps
/// `freminal-common::cursor::CursorVisualStyle`, since it is a backend
/// rendering hint rather than emulator state that feeds the dispatch table.
#[derive(Default, Debug, Eq, PartialEq, Clone, Copy)]
pub enum CursorVisualStyle {
    BlockBlink,
    #[default]
    BlockSteady,
    UnderlineBlink,
    UnderlineSteady,
    BarBlink,
    BarSteady,
}

impl From<usize> for CursorVisualStyle {
    fn from(value: usize) -> Self {
        match value {
            2 => Self::BlockSteady,
            3 => Self::UnderlineBlink,
            4 => Self::UnderlineSteady,
            5 => Self::BarBlink,
            6 => Self::BarSteady,
            _ => Self::BlockBlink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_values_fall_back_to_block_blink() {
        assert_eq!(CursorVisualStyle::from(42), CursorVisualStyle::BlockBlink);
        assert_eq!(CursorVisualStyle::from(0), CursorVisualStyle::BlockBlink);
    }

    #[test]
    fn known_values_map_directly() {
        assert_eq!(CursorVisualStyle::from(6), CursorVisualStyle::BarSteady);
    }
}
