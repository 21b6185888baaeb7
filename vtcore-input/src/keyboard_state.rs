// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Owns the resolution pipeline (spec §4.6) end to end: locking/modifier
//! key bookkeeping, layout lookup, dead-key composition, legacy encoding,
//! and auto-repeat timing.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::encoder;
use crate::key::{Key, KeyEvent};
use crate::layout::{DeadNode, Layout};
use crate::modifiers::Modifier;

#[derive(Debug, Clone)]
pub struct KeyboardState {
    pub layout: Layout,
    pub modifiers: Modifier,
    pressed: HashSet<Key>,
    dead_chain: Option<DeadNode>,
    pub app_cursor: bool,
    last_key: Option<Key>,
    pub repeat_delay: Duration,
    pub repeat_interval: Duration,
    next_repeat_at: Option<Instant>,
}

impl KeyboardState {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            modifiers: Modifier::empty(),
            pressed: HashSet::default(),
            dead_chain: None,
            app_cursor: false,
            last_key: None,
            repeat_delay: Duration::from_millis(250),
            repeat_interval: Duration::from_millis(30),
            next_repeat_at: None,
        }
    }

    /// Resolve a single key press/release into application bytes (spec
    /// §4.6 steps 1-4). Modifier and locking keys always return an empty
    /// vec; a resolved printable goes through dead-key composition; a miss
    /// falls back to the legacy special-key table.
    pub fn handle_key_event(&mut self, event: KeyEvent) -> Vec<u8> {
        let KeyEvent { key, pressed } = event;

        if let Some(&bit) = self.layout.locking.get(&key) {
            if pressed {
                self.modifiers.toggle(bit);
            }
            return Vec::new();
        }

        if let Some(&bit) = self.layout.modifiers.get(&key) {
            if pressed {
                self.modifiers.insert(bit);
                self.pressed.insert(key);
            } else {
                self.pressed.remove(&key);
                let still_held = self
                    .layout
                    .modifiers
                    .iter()
                    .any(|(other_key, other_bit)| *other_bit == bit && self.pressed.contains(other_key));
                self.modifiers.set(bit, still_held);
            }
            return Vec::new();
        }

        if !pressed {
            self.pressed.remove(&key);
            if self.last_key == Some(key) {
                self.last_key = None;
                self.next_repeat_at = None;
            }
            return Vec::new();
        }

        self.pressed.insert(key);
        if !key.is_modifier_or_lock() {
            self.last_key = Some(key);
            self.next_repeat_at = Some(Instant::now() + self.repeat_delay);
        }
        self.resolve_and_encode(key)
    }

    /// Called by the run loop's timer. Emits a repeat of the held key once
    /// its deadline passes, then reschedules at `repeat_interval` (spec
    /// §4.6 "Scheduling model").
    pub fn tick(&mut self, now: Instant) -> Vec<u8> {
        let Some(key) = self.last_key else {
            return Vec::new();
        };
        let Some(deadline) = self.next_repeat_at else {
            return Vec::new();
        };
        if now < deadline {
            return Vec::new();
        }
        self.next_repeat_at = Some(now + self.repeat_interval);
        self.resolve_and_encode(key)
    }

    fn resolve_and_encode(&mut self, key: Key) -> Vec<u8> {
        let rune = match key {
            Key::Space => Some(' '),
            _ => self.layout.resolve(key, self.modifiers),
        };
        if let Some(rune) = rune {
            return self.feed_rune(rune);
        }
        self.dead_chain = None;
        encoder::encode_special_key(key, self.modifiers, self.app_cursor).unwrap_or_default()
    }

    fn feed_rune(&mut self, rune: char) -> Vec<u8> {
        if let Some(chain) = self.dead_chain.take() {
            return match chain.next.get(&rune) {
                Some(node) => {
                    if let Some(produced) = node.produce {
                        encoder::encode_char(produced, self.modifiers)
                    } else {
                        self.dead_chain = Some(node.clone());
                        Vec::new()
                    }
                }
                None => {
                    trace!("dead key chain has no entry for {rune:?}; discarding composition");
                    Vec::new()
                }
            };
        }
        if let Some(root) = self.layout.dead_chain(rune) {
            self.dead_chain = Some(root.clone());
            return Vec::new();
        }
        encoder::encode_char(rune, self.modifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_letter_emits_its_byte() {
        let mut state = KeyboardState::new(Layout::us_qwerty());
        let bytes = state.handle_key_event(KeyEvent::press(Key::Char('a')));
        assert_eq!(bytes, b"a");
    }

    #[test]
    fn shift_then_letter_emits_uppercase() {
        let mut state = KeyboardState::new(Layout::us_qwerty());
        state.handle_key_event(KeyEvent::press(Key::Shift));
        let bytes = state.handle_key_event(KeyEvent::press(Key::Char('a')));
        assert_eq!(bytes, b"A");
        state.handle_key_event(KeyEvent::release(Key::Shift));
        assert_eq!(state.modifiers, Modifier::empty());
    }

    #[test]
    fn releasing_one_of_two_shift_keys_keeps_modifier_active() {
        let mut layout = Layout::us_qwerty();
        layout.modifiers.insert(Key::Char('\u{1}'), Modifier::SHIFT);
        let mut state = KeyboardState::new(layout);
        state.handle_key_event(KeyEvent::press(Key::Shift));
        state.handle_key_event(KeyEvent::press(Key::Char('\u{1}')));
        state.handle_key_event(KeyEvent::release(Key::Shift));
        assert!(state.modifiers.contains(Modifier::SHIFT));
    }

    #[test]
    fn dead_key_then_vowel_composes() {
        let mut state = KeyboardState::new(Layout::us_international());
        let first = state.handle_key_event(KeyEvent::press(Key::Char('\'')));
        assert!(first.is_empty());
        let second = state.handle_key_event(KeyEvent::press(Key::Char('a')));
        assert_eq!(second, "á".as_bytes());
    }

    #[test]
    fn dead_key_then_space_emits_bare_mark() {
        let mut state = KeyboardState::new(Layout::us_international());
        state.handle_key_event(KeyEvent::press(Key::Char('\'')));
        let bytes = state.handle_key_event(KeyEvent::press(Key::Space));
        assert_eq!(bytes, b"'");
    }

    #[test]
    fn dead_key_then_undefined_key_emits_nothing_and_resets() {
        let mut state = KeyboardState::new(Layout::us_international());
        state.handle_key_event(KeyEvent::press(Key::Char('\'')));
        let bytes = state.handle_key_event(KeyEvent::press(Key::Char('z')));
        assert!(bytes.is_empty());
        let next = state.handle_key_event(KeyEvent::press(Key::Char('a')));
        assert_eq!(next, b"a");
    }

    #[test]
    fn repeat_does_not_fire_before_delay() {
        let mut state = KeyboardState::new(Layout::us_qwerty());
        state.handle_key_event(KeyEvent::press(Key::Char('a')));
        let bytes = state.tick(Instant::now());
        assert!(bytes.is_empty());
    }

    #[test]
    fn app_cursor_mode_changes_arrow_encoding() {
        let mut state = KeyboardState::new(Layout::us_qwerty());
        state.app_cursor = true;
        let bytes = state.handle_key_event(KeyEvent::press(Key::ArrowUp));
        assert_eq!(bytes, b"\x1bOA");
    }
}
