// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mode registry wiring (C7): routes `DECSET`/`DECRST`/`DECRQM` to either the
//! locally owned table or the backend, per the local/delegated split defined
//! on [`vtcore_common::modes::ModeId`].

use vtcore_common::modes::{ModeId, ModeStatus, ModeTable};

use crate::backend::Backend;

/// Borrows the local mode table and the backend together so a single call
/// site can resolve either without the caller caring which side owns a
/// given mode.
pub struct ModeContext<'a> {
    pub local: &'a mut ModeTable,
    pub backend: &'a mut dyn Backend,
}

impl ModeContext<'_> {
    #[must_use]
    pub fn get(&self, id: ModeId) -> ModeStatus {
        if id.is_local() {
            self.local.get(id)
        } else {
            self.backend.get_private_mode(id)
        }
    }

    /// `DECSET`/`DECRST`. A no-op on a locked or otherwise-NA mode; the
    /// backend is trusted to enforce this for delegated modes itself (its
    /// refusal is never surfaced).
    pub fn set(&mut self, id: ModeId, on: bool) {
        if id.is_local() {
            self.local.set(id, on);
            return;
        }
        if self.backend.get_private_mode(id).is_locked() {
            debug!("ignoring DECSET/DECRST for locked delegated mode {id:?}");
            return;
        }
        self.backend
            .set_private_mode(id, if on { ModeStatus::On } else { ModeStatus::Off });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::RecordingBackend;

    #[test]
    fn local_mode_never_reaches_backend() {
        let mut local = ModeTable::new();
        let mut backend = RecordingBackend::new(80, 24);
        let mut ctx = ModeContext {
            local: &mut local,
            backend: &mut backend,
        };
        ctx.set(ModeId::AppCursor, true);
        assert_eq!(ctx.get(ModeId::AppCursor), ModeStatus::On);
        assert!(backend.delegated_modes.is_empty());
    }

    #[test]
    fn delegated_mode_reaches_backend() {
        let mut local = ModeTable::new();
        let mut backend = RecordingBackend::new(80, 24);
        let alt_screen = ModeId::from_wire(1049, true);
        {
            let mut ctx = ModeContext {
                local: &mut local,
                backend: &mut backend,
            };
            ctx.set(alt_screen, true);
            assert_eq!(ctx.get(alt_screen), ModeStatus::On);
        }
        assert_eq!(backend.delegated_modes.get(&alt_screen), Some(&ModeStatus::On));
    }

    #[test]
    fn set_then_set_is_idempotent_through_context() {
        let mut local = ModeTable::new();
        let mut backend = RecordingBackend::new(80, 24);
        let mut ctx = ModeContext {
            local: &mut local,
            backend: &mut backend,
        };
        ctx.set(ModeId::ShowCursor, false);
        let once = ctx.get(ModeId::ShowCursor);
        ctx.set(ModeId::ShowCursor, false);
        assert_eq!(ctx.get(ModeId::ShowCursor), once);
    }
}
