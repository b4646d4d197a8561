/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The node tree and the non-layout half of the per-kind handler interface
//! (§3, §4.3): node kinds and their payloads, the arena-backed tree that
//! holds them, and `apply_style`/`paint`/`pick`/`handle_event` dispatch.
//!
//! `begin_layout_context`/`generate_layout`/`end_layout_context` are not
//! here — they live in `microweb_layout`, which depends on this crate. That
//! split keeps this crate (and anything above `microweb_net` that needs
//! node kinds but not layout) free of a dependency on the layout engine.

mod dispatch;
mod event;
mod kind;
mod payload;
mod tree;

pub use dispatch::{apply_style, begin_scroll_drag, clip_for, collect_form_query, enclosing_link, handle_event, paint, pick};
pub use event::{Key, NodeAction, NodeEvent};
pub use kind::NodeKind;
pub use payload::*;
pub use tree::{NodeRecord, NodeTree};
