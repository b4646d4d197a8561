/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The page renderer (§4.6): dirty-tracking paint sweep, scroll-delta
//! band-blit-vs-full-repaint decision, and hit-testing on top of
//! `microweb_nodes`'s per-kind `paint`/`pick`.

mod dirty;
mod renderer;

pub use dirty::{DirtyNodes, DirtyRegions};
pub use renderer::{PageRenderer, ScrollOutcome};
