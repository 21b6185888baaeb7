// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use unicode_width::UnicodeWidthStr;
use vtcore_common::style::Style;

/// A single grid position: a grapheme cluster (or empty, for an erased cell
/// or the right half of a wide cell) plus the style it was written with.
///
/// Width is never stored on the cell itself; it is derived on demand from
/// `content` so a cell can never disagree with its own text. The grid keeps
/// track of which cell was written last (for cluster extension under mode
/// 2027) out of band, in `Grid::last_write`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    content: String,
    style: Style,
}

impl Cell {
    #[must_use]
    pub fn new(content: impl Into<String>, style: Style) -> Self {
        Self {
            content: content.into(),
            style,
        }
    }

    /// An erased cell: empty content, inheriting only the background color
    /// of `style` (see `Style::erase_style`).
    #[must_use]
    pub fn erased(style: &Style) -> Self {
        Self {
            content: String::new(),
            style: style.erase_style(),
        }
    }

    /// The right half of a wide cell: empty content with the head's style,
    /// so erase semantics and background fill still look correct.
    #[must_use]
    pub fn wide_continuation(style: Style) -> Self {
        Self {
            content: String::new(),
            style,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn style(&self) -> &Style {
        &self.style
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Display width of this cell's content: 0 for an empty/continuation
    /// cell, 1 or 2 for an East-Asian-Width-aware grapheme cluster.
    #[must_use]
    pub fn display_width(&self) -> usize {
        if self.content.is_empty() {
            0
        } else {
            UnicodeWidthStr::width(self.content.as_str()).max(1)
        }
    }

    #[must_use]
    pub fn is_wide(&self) -> bool {
        self.display_width() >= 2
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content: String::new(),
            style: Style::default(),
        }
    }
}
