/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The three bundled mouse cursor shapes (§6's data pack: pointer, hand,
//! text-select).

use crate::image::Image;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CursorShape {
    Pointer,
    Hand,
    TextSelect,
}

#[derive(Clone, Debug)]
pub struct MouseCursor {
    pub shape: CursorShape,
    pub image: Image,
    /// Pixel within `image` that corresponds to the reported mouse
    /// position (usually the tip of the arrow, or the text caret).
    pub hotspot_x: u16,
    pub hotspot_y: u16,
}
