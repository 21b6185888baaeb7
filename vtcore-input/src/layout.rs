// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Layered keyboard layouts and dead-key composition (C8, spec §3/§4.6/§9).
//!
//! A [`Layout`] is a lookup, not a class hierarchy: it holds an optional
//! parent and forwards misses upward, so a new layout needs only its
//! overrides (spec §9 "Key layout inheritance").

use std::collections::HashMap;

use crate::key::Key;
use crate::modifiers::Modifier;

/// One row of the layered modifier table: matches when
/// `(active & mask) == modifier` (or `!=` when `invert`), per spec §4.6
/// step 3.
#[derive(Debug, Clone)]
pub struct ModifierMap {
    pub modifier: Modifier,
    pub mask: Modifier,
    pub invert: bool,
    pub keys: HashMap<Key, char>,
}

impl ModifierMap {
    #[must_use]
    pub fn new(modifier: Modifier, mask: Modifier) -> Self {
        Self {
            modifier,
            mask,
            invert: false,
            keys: HashMap::default(),
        }
    }

    #[must_use]
    pub const fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    #[must_use]
    pub fn with(mut self, key: Key, rune: char) -> Self {
        self.keys.insert(key, rune);
        self
    }

    fn condition_matches(&self, active: Modifier) -> bool {
        let masked = active & self.mask;
        if self.invert {
            masked != self.modifier
        } else {
            masked == self.modifier
        }
    }
}

/// A node in a dead-key composition trie (spec §9 "Dead keys"). The active
/// chain is a borrowed position within a [`Layout`]'s trie, reset to the
/// root on completion or mismatch.
#[derive(Debug, Clone, Default)]
pub struct DeadNode {
    pub next: HashMap<char, DeadNode>,
    pub produce: Option<char>,
}

impl DeadNode {
    #[must_use]
    pub fn leaf(rune: char) -> Self {
        Self {
            next: HashMap::default(),
            produce: Some(rune),
        }
    }

    #[must_use]
    pub fn branch(entries: impl IntoIterator<Item = (char, char)>) -> Self {
        let mut next = HashMap::default();
        for (input, output) in entries {
            next.insert(input, Self::leaf(output));
        }
        Self {
            next,
            produce: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub name: String,
    pub base: Option<Box<Layout>>,
    /// Keys that toggle a modifier bit on press only (Caps Lock-style).
    pub locking: HashMap<Key, Modifier>,
    /// Keys that set a modifier bit on press and clear it on release.
    pub modifiers: HashMap<Key, Modifier>,
    pub maps: Vec<ModifierMap>,
    pub dead_keys: HashMap<char, DeadNode>,
}

impl Layout {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            locking: HashMap::default(),
            modifiers: HashMap::default(),
            maps: Vec::new(),
            dead_keys: HashMap::default(),
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: Self) -> Self {
        self.base = Some(Box::new(base));
        self
    }

    /// Resolve a physical key under the active modifier mask to a rune
    /// (spec §4.6 step 3): the first matching map (by modifier condition)
    /// that contains `key` wins; a miss falls back to `base` recursively.
    #[must_use]
    pub fn resolve(&self, key: Key, active: Modifier) -> Option<char> {
        for map in &self.maps {
            if map.condition_matches(active) {
                if let Some(&rune) = map.keys.get(&key) {
                    return Some(rune);
                }
            }
        }
        self.base.as_ref().and_then(|base| base.resolve(key, active))
    }

    /// Look up a dead-key chain root, falling back to `base`.
    #[must_use]
    pub fn dead_chain(&self, rune: char) -> Option<&DeadNode> {
        self.dead_keys
            .get(&rune)
            .or_else(|| self.base.as_ref().and_then(|base| base.dead_chain(rune)))
    }

    /// The base US-QWERTY layout: an unshifted map and a shifted map
    /// covering letters, digits, and the common punctuation row.
    #[must_use]
    pub fn us_qwerty() -> Self {
        let mut layout = Self::new("us-qwerty");
        layout.locking.insert(Key::CapsLock, Modifier::SHIFT);
        layout.modifiers.insert(Key::Shift, Modifier::SHIFT);
        layout.modifiers.insert(Key::Control, Modifier::CONTROL);
        layout.modifiers.insert(Key::Alt, Modifier::ALT);
        layout.modifiers.insert(Key::Meta, Modifier::META);
        layout.modifiers.insert(Key::Hyper, Modifier::HYPER);

        let mut unshifted = ModifierMap::new(Modifier::empty(), Modifier::SHIFT);
        let mut shifted = ModifierMap::new(Modifier::SHIFT, Modifier::SHIFT);
        for c in 'a'..='z' {
            unshifted = unshifted.with(Key::Char(c), c);
            shifted = shifted.with(Key::Char(c), c.to_ascii_uppercase());
        }
        const DIGIT_SHIFT: [(char, char); 10] = [
            ('1', '!'),
            ('2', '@'),
            ('3', '#'),
            ('4', '$'),
            ('5', '%'),
            ('6', '^'),
            ('7', '&'),
            ('8', '*'),
            ('9', '('),
            ('0', ')'),
        ];
        for (digit, shift) in DIGIT_SHIFT {
            unshifted = unshifted.with(Key::Char(digit), digit);
            shifted = shifted.with(Key::Char(digit), shift);
        }
        const PUNCT_SHIFT: [(char, char); 10] = [
            ('-', '_'),
            ('=', '+'),
            ('[', '{'),
            (']', '}'),
            ('\\', '|'),
            (';', ':'),
            ('\'', '"'),
            (',', '<'),
            ('.', '>'),
            ('/', '?'),
        ];
        for (plain, shift) in PUNCT_SHIFT {
            unshifted = unshifted.with(Key::Char(plain), plain);
            shifted = shifted.with(Key::Char(plain), shift);
        }
        layout.maps.push(shifted);
        layout.maps.push(unshifted);
        layout
    }

    /// US International, layered on [`Self::us_qwerty`]: the apostrophe and
    /// backtick keys become dead keys that compose with a following vowel
    /// into an accented letter, or fall through to the bare mark when
    /// followed by a key that doesn't extend the chain (spec §8 scenario 9).
    #[must_use]
    pub fn us_international() -> Self {
        let mut layout = Self::new("us-intl").with_base(Self::us_qwerty());
        layout.dead_keys.insert(
            '\'',
            DeadNode::branch([
                ('a', 'á'),
                ('e', 'é'),
                ('i', 'í'),
                ('o', 'ó'),
                ('u', 'ú'),
                (' ', '\''),
            ]),
        );
        layout.dead_keys.insert(
            '`',
            DeadNode::branch([
                ('a', 'à'),
                ('e', 'è'),
                ('i', 'ì'),
                ('o', 'ò'),
                ('u', 'ù'),
                (' ', '`'),
            ]),
        );
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unshifted_letter_resolves_lowercase() {
        let layout = Layout::us_qwerty();
        assert_eq!(layout.resolve(Key::Char('a'), Modifier::empty()), Some('a'));
    }

    #[test]
    fn shifted_letter_resolves_uppercase() {
        let layout = Layout::us_qwerty();
        assert_eq!(layout.resolve(Key::Char('a'), Modifier::SHIFT), Some('A'));
    }

    #[test]
    fn shifted_digit_resolves_symbol() {
        let layout = Layout::us_qwerty();
        assert_eq!(layout.resolve(Key::Char('1'), Modifier::SHIFT), Some('!'));
    }

    #[test]
    fn international_layout_falls_back_to_base_for_letters() {
        let layout = Layout::us_international();
        assert_eq!(layout.resolve(Key::Char('a'), Modifier::empty()), Some('a'));
    }

    #[test]
    fn apostrophe_dead_key_has_a_chain() {
        let layout = Layout::us_international();
        let chain = layout.dead_chain('\'').expect("apostrophe is a dead key");
        assert_eq!(chain.next.get(&'a').and_then(|n| n.produce), Some('á'));
        assert_eq!(chain.next.get(&' ').and_then(|n| n.produce), Some('\''));
    }
}
