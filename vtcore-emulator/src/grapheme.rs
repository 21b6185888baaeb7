// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Unicode width and cluster-extension engine (C6). Pure functions only:
//! no cursor or grid mutation lives here, so `cursor_ops` can compose this
//! with cell writes and wrap handling without the two being entangled.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width of a grapheme cluster: 0 for empty, else the East-Asian
/// width of the cluster (1 or 2), per the standard width table.
#[must_use]
pub fn display_width(content: &str) -> usize {
    if content.is_empty() {
        0
    } else {
        UnicodeWidthStr::width(content).max(1)
    }
}

/// Attempt to extend `previous`'s content with `rune`. Returns the combined
/// string only if the result is still a single grapheme cluster (spec
/// §4.4); otherwise the rune must start a new cell.
#[must_use]
pub fn try_extend(previous: &str, rune: char) -> Option<String> {
    if previous.is_empty() {
        return None;
    }
    let mut candidate = String::with_capacity(previous.len() + rune.len_utf8());
    candidate.push_str(previous);
    candidate.push(rune);
    if candidate.graphemes(true).count() == 1 {
        Some(candidate)
    } else {
        None
    }
}
