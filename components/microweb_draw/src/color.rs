/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Palette index handling for the four pixel formats (§4.2 "Color
//! semantics"): 1 bpp treats nonzero as ink, 2/4 bpp look the caller's
//! value up in a mode-specific table, 8 bpp passes the value through.

/// A color as the node/layout/render layers see it: always a small
/// integer index into whatever palette the active video mode defines.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ColorIndex(pub u8);

/// The handful of named roles the engine assigns colors to; the video
/// driver contract (§6) maps these to actual palette indices per mode.
#[derive(Clone, Copy, Debug)]
pub struct ColorScheme {
    pub page_background: ColorIndex,
    pub text: ColorIndex,
    pub link: ColorIndex,
    pub button: ColorIndex,
}

impl ColorScheme {
    pub fn monochrome() -> Self {
        ColorScheme {
            page_background: ColorIndex(0),
            text: ColorIndex(1),
            link: ColorIndex(1),
            button: ColorIndex(1),
        }
    }
}

/// Maps a logical `ColorIndex` to a surface-native pixel value for a given
/// bits-per-pixel format, per §4.2's mode-specific lookup rule. 1 bpp
/// collapses everything nonzero to "ink"; 2/4 bpp mask to the format's bit
/// width; 8 bpp passes through untouched.
pub fn to_device_value(color: ColorIndex, bpp: u8) -> u8 {
    match bpp {
        1 => {
            if color.0 != 0 {
                1
            } else {
                0
            }
        }
        2 => color.0 & 0b0000_0011,
        4 => color.0 & 0b0000_1111,
        8 => color.0,
        _ => color.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_bpp_collapses_to_ink() {
        assert_eq!(to_device_value(ColorIndex(5), 1), 1);
        assert_eq!(to_device_value(ColorIndex(0), 1), 0);
    }

    #[test]
    fn eight_bpp_passes_through() {
        assert_eq!(to_device_value(ColorIndex(200), 8), 200);
    }

    #[test]
    fn four_bpp_masks_to_low_nibble() {
        assert_eq!(to_device_value(ColorIndex(0b1111_0101), 4), 0b0000_0101);
    }
}
