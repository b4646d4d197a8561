/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Binary layout of the data pack (§6): a fixed-size header of `u32`
//! little-endian byte offsets, one per asset, followed by the assets
//! themselves concatenated in any order (each is self-delimiting).
//!
//! Header order: proportional fonts (five sizes × regular/bold), then
//! monospace fonts (same shape), then the pointer/hand/text-select cursor
//! offsets, then the image icon offset, then the bullet offset.

use crate::{AssetError, AssetPack, FontFamily, FontWeight, FONT_SIZE_COUNT};
use microweb_draw::{CursorShape, Font, Image, MouseCursor};
use std::collections::HashMap;

const FONTS_PER_FAMILY: usize = FONT_SIZE_COUNT * 2;
const HEADER_OFFSET_COUNT: usize = FONTS_PER_FAMILY * 2 + 3 + 1 + 1;
const HEADER_BYTES: usize = HEADER_OFFSET_COUNT * 4;

fn font_slot(family: FontFamily, weight: FontWeight, size: u8) -> usize {
    let family_base = match family {
        FontFamily::Proportional => 0,
        FontFamily::Monospace => FONTS_PER_FAMILY,
    };
    let weight_base = match weight {
        FontWeight::Regular => 0,
        FontWeight::Bold => FONT_SIZE_COUNT,
    };
    family_base + weight_base + size as usize
}

const CURSOR_POINTER_SLOT: usize = FONTS_PER_FAMILY * 2;
const CURSOR_HAND_SLOT: usize = CURSOR_POINTER_SLOT + 1;
const CURSOR_SELECT_SLOT: usize = CURSOR_POINTER_SLOT + 2;
const IMAGE_ICON_SLOT: usize = CURSOR_POINTER_SLOT + 3;
const BULLET_SLOT: usize = CURSOR_POINTER_SLOT + 4;

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn at(bytes: &'a [u8], pos: usize) -> Self {
        Reader { bytes, pos }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], AssetError> {
        let end = self.pos.checked_add(n).ok_or(AssetError::Truncated {
            wanted: n,
            have: self.bytes.len(),
        })?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(AssetError::Truncated {
                wanted: end,
                have: self.bytes.len(),
            })?;
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, AssetError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, AssetError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, AssetError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

fn read_offsets(bytes: &[u8]) -> Result<[u32; HEADER_OFFSET_COUNT], AssetError> {
    let mut reader = Reader::at(bytes, 0);
    let mut offsets = [0u32; HEADER_OFFSET_COUNT];
    for slot in offsets.iter_mut() {
        *slot = reader.u32()?;
    }
    Ok(offsets)
}

fn read_font(bytes: &[u8], offset: u32) -> Result<Font, AssetError> {
    let mut reader = Reader::at(bytes, offset as usize);
    let mut glyph_width = [0u8; 96];
    for slot in glyph_width.iter_mut() {
        *slot = reader.u8()?;
    }
    let glyph_height = reader.u8()?;
    let stride = reader.u16()?;
    let bitmap_len = stride as usize * 96;
    let bitmap = reader.take(bitmap_len)?.to_vec();
    Ok(Font {
        glyph_width,
        glyph_height,
        stride,
        bitmap,
    })
}

fn read_cursor(bytes: &[u8], offset: u32, shape: CursorShape) -> Result<MouseCursor, AssetError> {
    let mut reader = Reader::at(bytes, offset as usize);
    let width = reader.u16()?;
    let height = reader.u16()?;
    let hotspot_x = reader.u16()?;
    let hotspot_y = reader.u16()?;
    let stride = Image::mask1_stride(width);
    let data = reader.take(stride * height as usize)?.to_vec();
    Ok(MouseCursor {
        shape,
        image: Image::new_mask1(width, height, data),
        hotspot_x,
        hotspot_y,
    })
}

fn read_image(bytes: &[u8], offset: u32) -> Result<Image, AssetError> {
    let mut reader = Reader::at(bytes, offset as usize);
    let width = reader.u16()?;
    let height = reader.u16()?;
    let data = reader.take(width as usize * height as usize)?.to_vec();
    Ok(Image::new_palette8(width, height, data))
}

pub fn parse(bytes: &[u8]) -> Result<AssetPack, AssetError> {
    if bytes.len() < HEADER_BYTES {
        return Err(AssetError::Truncated {
            wanted: HEADER_BYTES,
            have: bytes.len(),
        });
    }
    let offsets = read_offsets(bytes)?;

    let mut fonts = HashMap::new();
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        for weight in [FontWeight::Regular, FontWeight::Bold] {
            for size in 0..FONT_SIZE_COUNT as u8 {
                let slot = font_slot(family, weight, size);
                let offset = offsets[slot];
                let font = read_font(bytes, offset)?;
                fonts.insert((family, weight, size), font);
            }
        }
    }

    let cursor_pointer = read_cursor(bytes, offsets[CURSOR_POINTER_SLOT], CursorShape::Pointer)?;
    let cursor_hand = read_cursor(bytes, offsets[CURSOR_HAND_SLOT], CursorShape::Hand)?;
    let cursor_text_select =
        read_cursor(bytes, offsets[CURSOR_SELECT_SLOT], CursorShape::TextSelect)?;
    let image_icon = read_image(bytes, offsets[IMAGE_ICON_SLOT])?;
    let bullet = read_image(bytes, offsets[BULLET_SLOT])?;

    Ok(AssetPack {
        fonts,
        cursor_pointer,
        cursor_hand,
        cursor_text_select,
        image_icon,
        bullet,
    })
}

/// Builds a data-pack blob from in-memory assets, matching the layout
/// `parse` reads. Used by `AssetGen`-equivalent tooling and by tests that
/// need a real pack without shipping a binary fixture file.
#[derive(Default)]
pub struct PackWriter {
    fonts: HashMap<(FontFamily, FontWeight, u8), Font>,
    cursor_pointer: Option<MouseCursor>,
    cursor_hand: Option<MouseCursor>,
    cursor_text_select: Option<MouseCursor>,
    image_icon: Option<Image>,
    bullet: Option<Image>,
}

impl PackWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_font(&mut self, family: FontFamily, weight: FontWeight, size: u8, font: Font) {
        self.fonts.insert((family, weight, size), font);
    }

    pub fn set_cursor(&mut self, cursor: MouseCursor) {
        match cursor.shape {
            CursorShape::Pointer => self.cursor_pointer = Some(cursor),
            CursorShape::Hand => self.cursor_hand = Some(cursor),
            CursorShape::TextSelect => self.cursor_text_select = Some(cursor),
        }
    }

    pub fn set_image_icon(&mut self, image: Image) {
        self.image_icon = Some(image);
    }

    pub fn set_bullet(&mut self, image: Image) {
        self.bullet = Some(image);
    }

    pub fn build(self) -> Vec<u8> {
        let mut offsets = vec![0u32; HEADER_OFFSET_COUNT];
        let mut body = Vec::new();

        for family in [FontFamily::Proportional, FontFamily::Monospace] {
            for weight in [FontWeight::Regular, FontWeight::Bold] {
                for size in 0..FONT_SIZE_COUNT as u8 {
                    let font = self
                        .fonts
                        .get(&(family, weight, size))
                        .expect("PackWriter requires every (family, weight, size) slot filled");
                    let slot = font_slot(family, weight, size);
                    offsets[slot] = (HEADER_BYTES + body.len()) as u32;
                    body.extend_from_slice(&font.glyph_width);
                    body.push(font.glyph_height);
                    body.extend_from_slice(&font.stride.to_le_bytes());
                    body.extend_from_slice(&font.bitmap);
                }
            }
        }

        let mut write_cursor = |offsets: &mut Vec<u32>, slot: usize, cursor: &MouseCursor| {
            offsets[slot] = (HEADER_BYTES + body.len()) as u32;
            body.extend_from_slice(&cursor.image.width.to_le_bytes());
            body.extend_from_slice(&cursor.image.height.to_le_bytes());
            body.extend_from_slice(&cursor.hotspot_x.to_le_bytes());
            body.extend_from_slice(&cursor.hotspot_y.to_le_bytes());
            body.extend_from_slice(&cursor.image.data);
        };
        write_cursor(
            &mut offsets,
            CURSOR_POINTER_SLOT,
            self.cursor_pointer.as_ref().expect("pointer cursor set"),
        );
        write_cursor(
            &mut offsets,
            CURSOR_HAND_SLOT,
            self.cursor_hand.as_ref().expect("hand cursor set"),
        );
        write_cursor(
            &mut offsets,
            CURSOR_SELECT_SLOT,
            self.cursor_text_select
                .as_ref()
                .expect("text-select cursor set"),
        );

        let mut write_image = |offsets: &mut Vec<u32>, slot: usize, image: &Image| {
            offsets[slot] = (HEADER_BYTES + body.len()) as u32;
            body.extend_from_slice(&image.width.to_le_bytes());
            body.extend_from_slice(&image.height.to_le_bytes());
            body.extend_from_slice(&image.data);
        };
        write_image(
            &mut offsets,
            IMAGE_ICON_SLOT,
            self.image_icon.as_ref().expect("image icon set"),
        );
        write_image(
            &mut offsets,
            BULLET_SLOT,
            self.bullet.as_ref().expect("bullet set"),
        );

        let mut out = Vec::with_capacity(HEADER_BYTES + body.len());
        for offset in &offsets {
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out.extend_from_slice(&body);
        out
    }
}

/// Convenience wrapper for tooling: serializes a fully populated
/// `PackWriter` to bytes.
pub fn pack_bytes(writer: PackWriter) -> Vec<u8> {
    writer.build()
}

/// Builds a minimal but complete pack (every font slot, all three cursors,
/// the image icon and bullet) for crates downstream of `microweb_assets`
/// to exercise layout/paint code against without shipping a real data file.
pub fn test_fixture_pack() -> Vec<u8> {
    let mut writer = PackWriter::new();
    let tiny_font = |height: u8| Font {
        glyph_width: [4u8; 96],
        glyph_height: height,
        stride: height as u16, // 1 byte wide glyphs for the fixture
        bitmap: vec![0u8; height as usize * 96],
    };
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        for weight in [FontWeight::Regular, FontWeight::Bold] {
            for size in 0..FONT_SIZE_COUNT as u8 {
                writer.set_font(family, weight, size, tiny_font(8 + size));
            }
        }
    }
    writer.set_cursor(MouseCursor {
        shape: CursorShape::Pointer,
        image: Image::new_mask1(8, 8, vec![0u8; 8]),
        hotspot_x: 0,
        hotspot_y: 0,
    });
    writer.set_cursor(MouseCursor {
        shape: CursorShape::Hand,
        image: Image::new_mask1(8, 8, vec![0u8; 8]),
        hotspot_x: 2,
        hotspot_y: 0,
    });
    writer.set_cursor(MouseCursor {
        shape: CursorShape::TextSelect,
        image: Image::new_mask1(8, 8, vec![0u8; 8]),
        hotspot_x: 4,
        hotspot_y: 0,
    });
    writer.set_image_icon(Image::new_palette8(16, 16, vec![0u8; 16 * 16]));
    writer.set_bullet(Image::new_palette8(4, 4, vec![0u8; 16]));
    writer.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_slot_indices_are_all_distinct() {
        let mut slots = Vec::new();
        for family in [FontFamily::Proportional, FontFamily::Monospace] {
            for weight in [FontWeight::Regular, FontWeight::Bold] {
                for size in 0..FONT_SIZE_COUNT as u8 {
                    slots.push(font_slot(family, weight, size));
                }
            }
        }
        slots.extend([
            CURSOR_POINTER_SLOT,
            CURSOR_HAND_SLOT,
            CURSOR_SELECT_SLOT,
            IMAGE_ICON_SLOT,
            BULLET_SLOT,
        ]);
        let unique: std::collections::HashSet<_> = slots.iter().copied().collect();
        assert_eq!(unique.len(), slots.len());
        assert!(slots.iter().all(|&s| s < HEADER_OFFSET_COUNT));
    }

    #[test]
    fn truncated_pack_is_an_error_not_a_panic() {
        let bytes = vec![0u8; 4];
        assert!(matches!(parse(&bytes), Err(AssetError::Truncated { .. })));
    }
}
