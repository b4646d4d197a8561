/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The bundled asset pack (§6): bitmap fonts (five size slots × two
//! families × regular/bold — see `SPEC_FULL.md` for why five slots rather
//! than spec.md's overview figure of three), three mouse cursor shapes,
//! and the UI icon set, loaded once per video mode from a single binary
//! blob whose header is a flat list of byte offsets.
//!
//! The original C++ loader (`DataPack::Fixup`) turns each header offset
//! into an absolute pointer in place; we instead slice directly into the
//! owned backing buffer per asset, so there is no pointer to fix up and no
//! way for a decoded asset to outlive the pack.

mod format;

use microweb_draw::{CursorShape, Font, Image, MouseCursor};
use std::collections::HashMap;

pub use format::{pack_bytes, test_fixture_pack, PackWriter};

pub const FONT_SIZE_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FontFamily {
    Proportional,
    Monospace,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug)]
pub enum AssetError {
    Truncated { wanted: usize, have: usize },
    BadOffset(u32),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::Truncated { wanted, have } => write!(
                f,
                "asset pack truncated: wanted {wanted} bytes, had {have}"
            ),
            AssetError::BadOffset(o) => write!(f, "asset pack offset {o} out of range"),
        }
    }
}

impl std::error::Error for AssetError {}

pub struct AssetPack {
    fonts: HashMap<(FontFamily, FontWeight, u8), Font>,
    pub cursor_pointer: MouseCursor,
    pub cursor_hand: MouseCursor,
    pub cursor_text_select: MouseCursor,
    pub image_icon: Image,
    pub bullet: Image,
}

impl AssetPack {
    pub fn font(&self, family: FontFamily, weight: FontWeight, size_index: u8) -> &Font {
        let size_index = size_index.min(FONT_SIZE_COUNT as u8 - 1);
        self.fonts
            .get(&(family, weight, size_index))
            .expect("asset pack built by AssetPack::load always has every (family, weight, size) slot")
    }

    pub fn cursor(&self, shape: CursorShape) -> &MouseCursor {
        match shape {
            CursorShape::Pointer => &self.cursor_pointer,
            CursorShape::Hand => &self.cursor_hand,
            CursorShape::TextSelect => &self.cursor_text_select,
        }
    }

    /// Parses a data-pack blob per `§6`'s header-of-offsets layout.
    pub fn load(bytes: &[u8]) -> Result<AssetPack, AssetError> {
        format::parse(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_binary_format() {
        let bytes = format::test_fixture_pack();
        let pack = AssetPack::load(&bytes).expect("fixture pack parses");
        let font = pack.font(FontFamily::Proportional, FontWeight::Regular, 0);
        assert_eq!(font.glyph_height, 8);
        assert_eq!(pack.image_icon.width, 16);
        assert_eq!(pack.bullet.width, 4);
        assert_eq!(pack.cursor_pointer.hotspot_x, 0);
    }

    #[test]
    fn font_lookup_clamps_out_of_range_size_index() {
        let bytes = format::test_fixture_pack();
        let pack = AssetPack::load(&bytes).expect("fixture pack parses");
        let clamped = pack.font(FontFamily::Proportional, FontWeight::Regular, 200);
        let max = pack.font(
            FontFamily::Proportional,
            FontWeight::Regular,
            FONT_SIZE_COUNT as u8 - 1,
        );
        assert_eq!(clamped.glyph_height, max.glyph_height);
    }
}
