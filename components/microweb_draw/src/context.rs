/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The primitive set every draw surface exposes (§4.2), implemented once
//! against the [`DrawSurface`] trait so it works identically across all
//! four bit depths. Every primitive is clipped by `clip` and translated by
//! `(draw_offset_x, draw_offset_y)`; out-of-clip calls are no-ops.

use crate::color::{to_device_value, ColorIndex};
use crate::font::Font;
use crate::image::{Image, ImageFormat, TRANSPARENT_INDEX};
use crate::surface::DrawSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ClipRect {
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Tightens `self` to the intersection with `other`, the `Restrict`
    /// operation from §4.2.
    pub fn restricted(&self, other: ClipRect) -> ClipRect {
        ClipRect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }
}

pub struct DrawContext<'a> {
    pub surface: &'a mut dyn DrawSurface,
    pub clip: ClipRect,
    pub draw_offset_x: i32,
    pub draw_offset_y: i32,
}

impl<'a> DrawContext<'a> {
    pub fn new(surface: &'a mut dyn DrawSurface) -> Self {
        let clip = ClipRect {
            left: 0,
            top: 0,
            right: surface.width(),
            bottom: surface.height(),
        };
        DrawContext {
            surface,
            clip,
            draw_offset_x: 0,
            draw_offset_y: 0,
        }
    }

    /// Returns a sub-context whose clip rect is `self.clip` intersected
    /// with `rect` (still in the caller's pre-offset coordinate space).
    pub fn restrict(&mut self, rect: ClipRect) -> DrawContext<'_> {
        DrawContext {
            surface: &mut *self.surface,
            clip: self.clip.restricted(rect),
            draw_offset_x: self.draw_offset_x,
            draw_offset_y: self.draw_offset_y,
        }
    }

    fn device_value(&self, color: ColorIndex) -> u8 {
        to_device_value(color, self.surface.bpp())
    }

    fn to_device_xy(&self, x: i32, y: i32) -> (i32, i32) {
        (x + self.draw_offset_x, y + self.draw_offset_y)
    }

    pub fn hline(&mut self, x: i32, y: i32, len: i32, color: ColorIndex) {
        if len <= 0 {
            return;
        }
        let (dx, dy) = self.to_device_xy(x, y);
        if dy < self.clip.top || dy >= self.clip.bottom {
            return;
        }
        let value = self.device_value(color);
        let x0 = dx.max(self.clip.left);
        let x1 = (dx + len).min(self.clip.right);
        for px in x0..x1 {
            self.surface.set_pixel(px, dy, value);
        }
    }

    pub fn vline(&mut self, x: i32, y: i32, len: i32, color: ColorIndex) {
        if len <= 0 {
            return;
        }
        let (dx, dy) = self.to_device_xy(x, y);
        if dx < self.clip.left || dx >= self.clip.right {
            return;
        }
        let value = self.device_value(color);
        let y0 = dy.max(self.clip.top);
        let y1 = (dy + len).min(self.clip.bottom);
        for py in y0..y1 {
            self.surface.set_pixel(dx, py, value);
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: ColorIndex) {
        for row in 0..h {
            self.hline(x, y + row, w, color);
        }
    }

    pub fn invert_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let (dx, dy) = self.to_device_xy(x, y);
        let max_value: u8 = ((1u16 << self.surface.bpp()) - 1) as u8;
        let x0 = dx.max(self.clip.left);
        let x1 = (dx + w).min(self.clip.right);
        let y0 = dy.max(self.clip.top);
        let y1 = (dy + h).min(self.clip.bottom);
        for py in y0..y1 {
            for px in x0..x1 {
                let cur = self.surface.get_pixel(px, py);
                self.surface.set_pixel(px, py, cur ^ max_value);
            }
        }
    }

    /// Blits `img` at `(x, y)`. `Mask1` images paint `color` wherever the
    /// mask has ink; `Palette8` images copy pixel values through verbatim,
    /// skipping `TRANSPARENT_INDEX` source pixels.
    pub fn blit_image(&mut self, img: &Image, x: i32, y: i32, color: ColorIndex) {
        let (dx, dy) = self.to_device_xy(x, y);
        for row in 0..img.height {
            let py = dy + row as i32;
            if py < self.clip.top || py >= self.clip.bottom {
                continue;
            }
            for col in 0..img.width {
                let px = dx + col as i32;
                if px < self.clip.left || px >= self.clip.right {
                    continue;
                }
                match img.format {
                    ImageFormat::Mask1 => {
                        if img.mask1_pixel(col, row) {
                            let v = self.device_value(color);
                            self.surface.set_pixel(px, py, v);
                        }
                    }
                    ImageFormat::Palette8 => {
                        let v = img.palette8_pixel(col, row);
                        if v != TRANSPARENT_INDEX {
                            self.surface.set_pixel(px, py, v);
                        }
                    }
                }
            }
        }
    }

    /// Draws `text` glyph-by-glyph starting at `(x, y)`, the glyph's top
    /// edge. Honors Bold (OR the row with itself shifted right by one
    /// pixel, plus one extra pixel of advance), Italic (shifts the top
    /// half of each glyph one pixel to the right) and Underline (an hline
    /// across the baseline once the whole string is drawn), per §4.2.
    pub fn draw_string(
        &mut self,
        font: &Font,
        text: &str,
        x: i32,
        y: i32,
        color: ColorIndex,
        bold: bool,
        italic: bool,
        underline: bool,
    ) -> i32 {
        let value = self.device_value(color);
        let mut cursor_x = x;
        for ch in text.chars() {
            let glyph_width = font.glyph_width(ch);
            for row in 0..font.glyph_height {
                let italic_shift = if italic && row < font.glyph_height / 2 {
                    1
                } else {
                    0
                };
                for col in 0..glyph_width {
                    let mut ink = font.glyph_bit(ch, col, row);
                    if bold && col > 0 {
                        ink |= font.glyph_bit(ch, col - 1, row);
                    }
                    if ink {
                        let (dx, dy) = self.to_device_xy(
                            cursor_x + col as i32 + italic_shift,
                            y + row as i32,
                        );
                        if dx >= self.clip.left
                            && dx < self.clip.right
                            && dy >= self.clip.top
                            && dy < self.clip.bottom
                        {
                            self.surface.set_pixel(dx, dy, value);
                        }
                    }
                }
            }
            cursor_x += glyph_width as i32 + if bold { 1 } else { 0 };
        }
        if underline {
            self.hline(x, y + font.glyph_height as i32, cursor_x - x, color);
        }
        cursor_x - x
    }

    /// Paints a bordered scrollbar track with a thumb `size` pixels tall
    /// at vertical offset `pos` within the track (§4.2).
    pub fn vertical_scrollbar(
        &mut self,
        x: i32,
        y: i32,
        h: i32,
        pos: i32,
        size: i32,
        track_color: ColorIndex,
        thumb_color: ColorIndex,
    ) {
        self.vline(x, y, h, track_color);
        self.vline(x + 1, y, h, track_color);
        let thumb_h = size.clamp(1, h);
        let thumb_y = (y + pos).clamp(y, y + h - thumb_h);
        self.fill_rect(x, thumb_y, 2, thumb_h, thumb_color);
    }

    /// Scrolls the rows `[top, bottom)` of the full row width by `delta`
    /// pixels (positive scrolls up). The caller (the page renderer) is
    /// responsible for repainting the band left exposed.
    pub fn scroll_screen(&mut self, top: i32, bottom: i32, delta: i32) {
        self.surface.scroll_rows(top, bottom, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface8bpp;

    #[test]
    fn fill_rect_respects_clip() {
        let mut surf = Surface8bpp::new(10, 10);
        let mut ctx = DrawContext::new(&mut surf);
        ctx.clip = ClipRect {
            left: 2,
            top: 2,
            right: 5,
            bottom: 5,
        };
        ctx.fill_rect(0, 0, 10, 10, ColorIndex(9));
        assert_eq!(ctx.surface.get_pixel(0, 0), 0);
        assert_eq!(ctx.surface.get_pixel(3, 3), 9);
        assert_eq!(ctx.surface.get_pixel(6, 6), 0);
    }

    #[test]
    fn draw_offset_translates_primitives() {
        let mut surf = Surface8bpp::new(10, 10);
        let mut ctx = DrawContext::new(&mut surf);
        ctx.draw_offset_x = 2;
        ctx.draw_offset_y = 3;
        ctx.hline(0, 0, 4, ColorIndex(1));
        assert_eq!(ctx.surface.get_pixel(2, 3), 1);
        assert_eq!(ctx.surface.get_pixel(0, 0), 0);
    }

    #[test]
    fn blit_image_skips_transparent_sentinel() {
        let img = Image::new_palette8(2, 1, vec![5, TRANSPARENT_INDEX]);
        let mut surf = Surface8bpp::new(4, 4);
        let mut ctx = DrawContext::new(&mut surf);
        ctx.blit_image(&img, 0, 0, ColorIndex(0));
        assert_eq!(ctx.surface.get_pixel(0, 0), 5);
        assert_eq!(ctx.surface.get_pixel(1, 0), 0);
    }

    #[test]
    fn invert_rect_flips_bits_within_bpp_range() {
        let mut surf = crate::surface::Surface1bpp::new(8, 1);
        let mut ctx = DrawContext::new(&mut surf);
        ctx.fill_rect(0, 0, 4, 1, ColorIndex(1));
        ctx.invert_rect(0, 0, 2, 1);
        assert_eq!(ctx.surface.get_pixel(0, 0), 0);
        assert_eq!(ctx.surface.get_pixel(1, 0), 0);
        assert_eq!(ctx.surface.get_pixel(2, 0), 1);
    }
}
