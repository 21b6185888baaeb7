// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Instant;

use proptest::prelude::*;
use vtcore_input::key::{Key, KeyEvent};
use vtcore_input::keyboard_state::KeyboardState;
use vtcore_input::layout::Layout;

const KEYS: &[Key] = &[
    Key::Char('a'),
    Key::Char('A'),
    Key::Char('\''),
    Key::ArrowUp,
    Key::Home,
    Key::Tab,
    Key::Shift,
    Key::Control,
    Key::Alt,
    Key::CapsLock,
];

fn arb_event() -> impl Strategy<Value = (usize, bool)> {
    (0..KEYS.len(), any::<bool>())
}

proptest! {
    /// Any interleaving of press/release events and auto-repeat ticks, on
    /// any layout, must never panic - including half-finished dead-key
    /// chains, releases with no matching prior press, and modifier keys
    /// still physically held when another copy of the same modifier is
    /// released.
    #[test]
    fn random_event_sequence_never_panics(
        events in proptest::collection::vec(arb_event(), 0..200),
        use_international in any::<bool>(),
    ) {
        let layout = if use_international { Layout::us_international() } else { Layout::us_qwerty() };
        let mut state = KeyboardState::new(layout);
        let now = Instant::now();

        for (idx, pressed) in events {
            let _ = state.handle_key_event(KeyEvent { key: KEYS[idx], pressed });
            let _ = state.tick(now);
        }
    }
}
