// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Lifecycle errors surfaced to the caller. Every other anomaly (malformed
/// sequences, out-of-range parameters, unsupported modes, backend refusals)
/// is absorbed silently per the "terminals must never crash the host"
/// contract and never reaches this type.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum EmulatorError {
    #[error("start() called while the run loop is already running")]
    AlreadyStarted,
    #[error("write() called after stop()")]
    Stopped,
    #[error("read() called after stop() with no pending bytes")]
    ReadAfterStop,
    #[error("drain() called after stop()")]
    DrainAfterStop,
}
