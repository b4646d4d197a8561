/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The video driver contract (§6): `init`/`shutdown`, a `DrawSurface`, a
//! color scheme, and image-dimension scaling for non-square pixel aspect
//! ratios. One entry in the mode table per supported `-video=X` letter.
//!
//! The concrete device backing the surface (VGA bank switching, a
//! framebuffer `mmap`, a windowing toolkit) is exactly the kind of
//! "BIOS/VRAM-level framebuffer banking" §1 places out of scope; this
//! crate supplies a software surface any such backend could paint to the
//! real screen from, the same way the original ports layered a hardware
//! driver underneath a shared `DrawSurface`.

use microweb_draw::{new_surface, ColorScheme, DrawSurface};

/// One entry in the video mode table a `-video=X` letter indexes into.
#[derive(Clone, Copy, Debug)]
pub struct VideoMode {
    pub letter: char,
    pub width: i32,
    pub height: i32,
    pub bpp: u8,
    /// Horizontal:vertical pixel aspect ratio correction, applied to
    /// image dimensions that assume square pixels.
    pub pixel_aspect: f32,
}

pub const MODE_TABLE: &[VideoMode] = &[
    VideoMode { letter: 'a', width: 320, height: 200, bpp: 8, pixel_aspect: 1.2 },
    VideoMode { letter: 'b', width: 640, height: 350, bpp: 4, pixel_aspect: 1.0 },
    VideoMode { letter: 'c', width: 640, height: 480, bpp: 2, pixel_aspect: 1.0 },
    VideoMode { letter: 'm', width: 720, height: 348, bpp: 1, pixel_aspect: 1.0 },
];

pub fn mode_by_letter(letter: char) -> Option<VideoMode> {
    MODE_TABLE.iter().copied().find(|m| m.letter == letter)
}

pub fn default_mode() -> VideoMode {
    MODE_TABLE[0]
}

pub trait VideoDriver {
    fn init(&mut self, mode: VideoMode);
    fn shutdown(&mut self);
    fn surface(&mut self) -> &mut dyn DrawSurface;
    fn colors(&self) -> ColorScheme;

    /// Scales a source image's height to compensate for `mode`'s
    /// non-square pixel aspect ratio, preserving apparent proportions
    /// (§6: "image-dimension scaling ... for correcting non-square pixel
    /// aspect").
    fn scale_height(&self, mode: VideoMode, natural_height: i32) -> i32 {
        ((natural_height as f32) * mode.pixel_aspect).round() as i32
    }
}

/// The one video driver this workspace ships: a software surface backing
/// whatever the host OS does with it next. `invert` swaps `text`/`link`
/// with `page_background` per `-i`.
pub struct SoftwareVideoDriver {
    surface: Box<dyn DrawSurface>,
    colors: ColorScheme,
    mode: VideoMode,
}

impl SoftwareVideoDriver {
    pub fn new(mode: VideoMode, invert: bool) -> Self {
        let mut colors = ColorScheme::monochrome();
        if invert {
            std::mem::swap(&mut colors.page_background, &mut colors.text);
        }
        SoftwareVideoDriver { surface: new_surface(mode.bpp, mode.width, mode.height), colors, mode }
    }
}

impl VideoDriver for SoftwareVideoDriver {
    fn init(&mut self, mode: VideoMode) {
        self.mode = mode;
        self.surface = new_surface(mode.bpp, mode.width, mode.height);
    }

    fn shutdown(&mut self) {}

    fn surface(&mut self) -> &mut dyn DrawSurface {
        &mut *self.surface
    }

    fn colors(&self) -> ColorScheme {
        self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_by_letter_finds_a_known_mode() {
        let mode = mode_by_letter('c').unwrap();
        assert_eq!((mode.width, mode.height, mode.bpp), (640, 480, 2));
    }

    #[test]
    fn unknown_letter_yields_none() {
        assert!(mode_by_letter('z').is_none());
    }

    #[test]
    fn invert_swaps_page_background_and_text() {
        let plain = SoftwareVideoDriver::new(default_mode(), false).colors();
        let inverted = SoftwareVideoDriver::new(default_mode(), true).colors();
        assert_eq!(inverted.page_background.0, plain.text.0);
        assert_eq!(inverted.text.0, plain.page_background.0);
    }

    #[test]
    fn scale_height_applies_the_mode_pixel_aspect() {
        let driver = SoftwareVideoDriver::new(default_mode(), false);
        let mode = VideoMode { letter: 'x', width: 1, height: 1, bpp: 8, pixel_aspect: 1.2 };
        assert_eq!(driver.scale_height(mode, 100), 120);
    }
}
