// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Event plumbing (C10): the emulator→reader outbound byte queue, with
//! Start/Stop lifecycle, blocking `Read`, and an atomic `SendRaw`.
//!
//! The host→emulator direction (`Write`) is simpler than a two-queue
//! design might suggest: because the run loop here is the calling
//! thread itself rather than a background worker, `write()` on
//! [`crate::emulator::Emulator`] processes bytes synchronously under its
//! state lock and returns once they are applied — already satisfying
//! "returns after bytes are processed" without a second queue. Only the
//! outbound side needs real queueing, since replies, key/mouse encodings,
//! and resize reports can be produced while no one is calling `read()` yet.
//!
//! Built on `crossbeam_channel`, the same crate the pty reader/writer
//! threads use for their byte and event plumbing: a bounded channel gives
//! `push`/`SendRaw` the "blocks once the reader falls behind" back
//! pressure directly, rather than silently dropping bytes a caller is
//! waiting on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};

use crate::error::EmulatorError;

/// How long a blocked push/read waits before rechecking `running`. Only
/// matters while the queue is genuinely full or empty; it bounds how
/// quickly `Stop` is noticed rather than how fast bytes flow.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A bounded, thread-safe byte queue from the emulator to its reader.
///
/// Capacity is counted in outbound *replies* (one `push`/`SendRaw` call is
/// one queued item), not raw bytes: a reply is a handful of bytes produced
/// in response to a single escape sequence, so bounding by call count is
/// the natural unit and keeps the channel itself doing the bookkeeping.
pub struct OutboundQueue {
    running: AtomicBool,
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    /// Guards `SendRaw` so two reply sources (e.g. a DSR reply racing a
    /// mouse report) never interleave their bytes mid-call.
    send_lock: Mutex<()>,
}

impl OutboundQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self {
            running: AtomicBool::new(false),
            tx,
            rx,
            send_lock: Mutex::new(()),
        }
    }

    pub fn start(&self) -> Result<(), EmulatorError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EmulatorError::AlreadyStarted);
        }
        while self.rx.try_recv().is_ok() {}
        Ok(())
    }

    /// Transition to stopped. Pending/future `Read`/`Drain`/`SendRaw` calls
    /// return a "stopped" error; queued bytes are dropped. A `push` or
    /// `read` blocked on a full/empty channel notices within one poll tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        while self.rx.try_recv().is_ok() {}
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Append one reply's bytes, blocking once the channel is full until
    /// the reader drains it or `Stop` fires. A no-op once stopped.
    pub fn push(&self, bytes: &[u8]) {
        if bytes.is_empty() || !self.is_running() {
            return;
        }
        let mut pending = bytes.to_vec();
        loop {
            if !self.is_running() {
                trace!("push abandoned: queue stopped mid-block, {} bytes dropped", pending.len());
                return;
            }
            match self.tx.send_timeout(pending, POLL_INTERVAL) {
                Ok(()) => return,
                Err(SendTimeoutError::Timeout(bytes)) => pending = bytes,
                Err(SendTimeoutError::Disconnected(_)) => return,
            }
        }
    }

    /// Pull at least one queued reply's bytes, blocking until data arrives
    /// or `Stop` fires; then opportunistically drain whatever else is
    /// ready, up to `max` bytes total.
    pub fn read(&self, max: usize) -> Result<Vec<u8>, EmulatorError> {
        let max = max.max(1);
        let mut out = loop {
            if !self.is_running() {
                return Err(EmulatorError::ReadAfterStop);
            }
            match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(bytes) => break bytes,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(EmulatorError::ReadAfterStop),
            }
        };
        if out.len() > max {
            // A single reply can itself exceed `max`; carry the remainder
            // back as its own pending item rather than truncating it.
            let rest = out.split_off(max);
            let _ = self.tx.try_send(rest);
            return Ok(out);
        }
        while out.len() < max {
            match self.rx.try_recv() {
                Ok(mut bytes) => {
                    let room = max - out.len();
                    if bytes.len() > room {
                        let rest = bytes.split_off(room);
                        out.extend(bytes);
                        let _ = self.tx.try_send(rest);
                        break;
                    }
                    out.extend(bytes);
                }
                Err(_) => break,
            }
        }
        Ok(out)
    }

    /// Round-trip flush: with nothing to enqueue (there's no separate
    /// inbound queue to drain here), this just confirms the queue is still
    /// live.
    pub fn drain(&self) -> Result<(), EmulatorError> {
        if !self.is_running() {
            return Err(EmulatorError::DrainAfterStop);
        }
        Ok(())
    }

    /// Atomically push a reply's bytes. If `Stop` races this call, it
    /// abandons cleanly rather than pushing a partial reply.
    pub fn send_raw(&self, bytes: &[u8]) -> Result<(), EmulatorError> {
        let _guard = self
            .send_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !self.is_running() {
            return Err(EmulatorError::Stopped);
        }
        self.push(bytes);
        Ok(())
    }
}
