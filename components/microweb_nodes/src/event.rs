/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Input events delivered to a focused/picked node, and the intents a
//! handler can hand back (§4.3's `handle_event`).
//!
//! `handle_event` cannot call into the net or layout crates directly — that
//! would make this crate depend on its own dependents. Instead it returns
//! an `Option<NodeAction>`; the caller (the shell/coordinator, which
//! legitimately depends on `microweb_net` and `microweb_layout`) interprets
//! the action.

use crate::payload::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeEvent {
    MouseClick { x: i32, y: i32 },
    MouseRelease { x: i32, y: i32 },
    MouseDrag { x: i32, y: i32 },
    KeyPress(Key),
    Focus,
    Unfocus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Home,
    End,
    Left,
    Right,
    Backspace,
    Delete,
    Enter,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeAction {
    /// Link click or form submit: navigate to `url` via the load
    /// coordinator's Get method (§4.3 "Form").
    Navigate { url: String },
    /// `ScrollBar` drag commit (§4.3 "ScrollBar": "on Release, commits via
    /// the onScroll callback").
    ScrollTo(i32),
    /// Posts a message to the interface root's status bar hover slot
    /// (§4.3 "Link": "posts the URL to the status bar").
    SetStatus(Option<String>),
    /// A `Button`/`TextField` inside a `Form` requested submission; the
    /// caller walks up to the owning `Form` and performs the collection
    /// described in §4.3 "Form".
    RequestFormSubmit { form: NodeId },
}
