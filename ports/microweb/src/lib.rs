/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The CLI port (§6): wires the engine crates together behind the flags
//! and driver contracts this document names, with no globals — every
//! piece of mutable state lives in one [`Engine`].

pub mod engine;
pub mod input;
pub mod opts;
pub mod video;

pub use engine::{Engine, TickReport};
pub use opts::Opts;
