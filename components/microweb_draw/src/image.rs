/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The pixel formats `blit_image` understands (§4.2): a 1 bpp mask and an
//! 8 bpp palette-indexed bitmap. Decoded photographic images and the
//! asset pack's icons/cursors both end up as one of these two shapes.

/// Sentinel palette index that marks a transparent source pixel in an
/// [`Image::Palette8`] image. Mask images have no notion of transparency
/// beyond "ink" vs. "no ink".
pub const TRANSPARENT_INDEX: u8 = 0xFF;

#[derive(Clone, Debug)]
pub enum ImageFormat {
    /// One bit per pixel; nonzero is "ink", drawn in the caller-supplied
    /// color. Used for UI icons and bullets.
    Mask1,
    /// One byte per pixel, indexing the surface's active palette.
    /// `TRANSPARENT_INDEX` pixels are skipped during `blit_image`.
    Palette8,
}

#[derive(Clone, Debug)]
pub struct Image {
    pub width: u16,
    pub height: u16,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

impl Image {
    pub fn new_mask1(width: u16, height: u16, data: Vec<u8>) -> Self {
        Image {
            width,
            height,
            format: ImageFormat::Mask1,
            data,
        }
    }

    pub fn new_palette8(width: u16, height: u16, data: Vec<u8>) -> Self {
        Image {
            width,
            height,
            format: ImageFormat::Palette8,
            data,
        }
    }

    /// Bytes needed per row of a 1 bpp mask image.
    pub fn mask1_stride(width: u16) -> usize {
        (width as usize + 7) / 8
    }

    /// Reads one pixel as a bool for `Mask1` images (`true` = ink).
    pub fn mask1_pixel(&self, x: u16, y: u16) -> bool {
        debug_assert!(matches!(self.format, ImageFormat::Mask1));
        let stride = Self::mask1_stride(self.width);
        let byte = self.data[y as usize * stride + (x as usize / 8)];
        (byte & (0x80 >> (x % 8))) != 0
    }

    /// Reads one palette index for `Palette8` images.
    pub fn palette8_pixel(&self, x: u16, y: u16) -> u8 {
        debug_assert!(matches!(self.format, ImageFormat::Palette8));
        self.data[y as usize * self.width as usize + x as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask1_pixel_reads_msb_first() {
        // A single row, 8 px wide: 0b1010_0000 -> ink at x=0 and x=2.
        let img = Image::new_mask1(8, 1, vec![0b1010_0000]);
        assert!(img.mask1_pixel(0, 0));
        assert!(!img.mask1_pixel(1, 0));
        assert!(img.mask1_pixel(2, 0));
    }

    #[test]
    fn palette8_transparent_sentinel_is_0xff() {
        let img = Image::new_palette8(2, 1, vec![3, TRANSPARENT_INDEX]);
        assert_eq!(img.palette8_pixel(0, 0), 3);
        assert_eq!(img.palette8_pixel(1, 0), TRANSPARENT_INDEX);
    }
}
