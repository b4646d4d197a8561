/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The two stacks the layout engine walks with (§4.5): a cursor stack
//! (pen position plus the current line's height) and a parameter stack
//! (left/right margins). Pushed by container kinds on entry, popped on
//! exit.

#[derive(Clone, Copy, Debug, Default)]
pub struct Cursor {
    pub x: i32,
    pub y: i32,
    pub line_height: i32,
}

#[derive(Clone, Copy, Debug)]
pub struct Margin {
    pub left: i32,
    pub right: i32,
}

impl Margin {
    pub fn width(&self) -> i32 {
        (self.right - self.left).max(1)
    }
}
