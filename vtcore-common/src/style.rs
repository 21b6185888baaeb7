// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::color::Color;
use bitflags::bitflags;

bitflags! {
    /// SGR attribute flags that pack into a single machine word.
    ///
    /// Underline style is not a flag here; it has more than two states and
    /// lives in [`Underline`] alongside this bitset on [`Style`].
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
    pub struct Attr: u16 {
        const BOLD          = 0b0000_0001;
        const DIM           = 0b0000_0010;
        const ITALIC        = 0b0000_0100;
        const BLINK         = 0b0000_1000;
        const REVERSE       = 0b0001_0000;
        const STRIKETHROUGH = 0b0010_0000;
        const OVERLINE      = 0b0100_0000;
    }
}

/// Underline sub-style, selected by SGR 4 with a `:n` sub-parameter or by
/// SGR 21 (double underline).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum Underline {
    #[default]
    None,
    Plain,
    Double,
    Curly,
    Dotted,
    Dashed,
}

impl Underline {
    /// Map an SGR 4 sub-parameter (`CSI 4:n m`) to an underline style.
    /// Unknown values fall back to `Plain`, per spec.
    #[must_use]
    pub fn from_subparam(n: usize) -> Self {
        match n {
            0 => Self::None,
            2 => Self::Double,
            3 => Self::Curly,
            4 => Self::Dotted,
            5 => Self::Dashed,
            _ => Self::Plain,
        }
    }
}

/// An immutable style value. Cloning is cheap (a handful of small fields);
/// every "mutation" returns a new `Style` rather than mutating in place, so
/// cells can share style values by plain `Clone` without aliasing concerns.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub uc: Color,
    pub attr: Attr,
    pub underline: Underline,
    pub url: String,
    pub link_id: String,
}

impl Style {
    #[must_use]
    pub fn with_fg(&self, fg: Color) -> Self {
        Self {
            fg,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_bg(&self, bg: Color) -> Self {
        Self {
            bg,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_underline_color(&self, uc: Color) -> Self {
        Self {
            uc,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_attr(&self, attr: Attr) -> Self {
        Self {
            attr: self.attr | attr,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn without_attr(&self, attr: Attr) -> Self {
        Self {
            attr: self.attr & !attr,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_underline(&self, underline: Underline) -> Self {
        Self {
            underline,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_url(&self, url: impl Into<String>, link_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            link_id: link_id.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn without_url(&self) -> Self {
        Self {
            url: String::new(),
            link_id: String::new(),
            ..self.clone()
        }
    }

    /// SGR 0: reset attributes and the underline subfield, and reset fg/bg/uc
    /// to `Reset` (not `Default` — those are distinct colors, see [`Color`]).
    #[must_use]
    pub fn reset(&self) -> Self {
        Self {
            fg: Color::Reset,
            bg: Color::Reset,
            uc: Color::Reset,
            attr: Attr::empty(),
            underline: Underline::None,
            url: self.url.clone(),
            link_id: self.link_id.clone(),
        }
    }

    /// The style erased cells inherit: current background, Plain otherwise.
    /// See spec §4.3 "Erase coloring rule".
    #[must_use]
    pub fn erase_style(&self) -> Self {
        Self {
            fg: Color::Reset,
            bg: self.bg,
            uc: Color::Reset,
            attr: Attr::empty(),
            underline: Underline::None,
            url: String::new(),
            link_id: String::new(),
        }
    }
}
