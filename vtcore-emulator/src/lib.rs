// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::range_plus_one)]

pub mod backend;
pub mod cursor_ops;
pub mod dispatch;
pub mod emulator;
pub mod error;
pub mod grapheme;
pub mod modes;
pub mod parser;
pub mod queue;
pub mod state;

pub use emulator::Emulator;

#[macro_use]
extern crate tracing;
