/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The draw surface abstraction (§4.2): four concrete pixel formats behind
//! one primitive set, plus the color/image/font/cursor value types the
//! primitives operate on.

mod color;
mod context;
mod cursor;
mod font;
mod image;
mod surface;

pub use color::{to_device_value, ColorIndex, ColorScheme};
pub use context::{ClipRect, DrawContext};
pub use cursor::{CursorShape, MouseCursor};
pub use font::{Font, FIRST_GLYPH, GLYPH_COUNT};
pub use image::{Image, ImageFormat, TRANSPARENT_INDEX};
pub use surface::{DrawSurface, Surface1bpp, Surface2bpp, Surface4bpp, Surface8bpp};

/// Picks the concrete surface matching a `-video=X` mode's bit depth.
pub fn new_surface(bpp: u8, width: i32, height: i32) -> Box<dyn DrawSurface> {
    match bpp {
        1 => Box::new(Surface1bpp::new(width, height)),
        2 => Box::new(Surface2bpp::new(width, height)),
        4 => Box::new(Surface4bpp::new(width, height)),
        _ => Box::new(Surface8bpp::new(width, height)),
    }
}
