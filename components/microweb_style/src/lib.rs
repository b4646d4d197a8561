/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! `ElementStyle` and the style pool (§3). Styles are small, pooled, and
//! referenced by a handle so that two nodes with identical styles share one
//! slot — the original C++ engine packs the whole style into a `uint16_t`
//! for the same reason.

use bitflags::bitflags;
use std::collections::HashMap;

bitflags! {
    /// Font style overrides. `H1`..`H4` come from `original_source/Style.h`
    /// (not named in spec.md directly, but required to implement heading
    /// tags per SPEC_FULL.md §2): each heading level sets a distinct bit so
    /// a later override (e.g. an inline `<b>` inside an `<h1>`) can compose
    /// rather than clobber the heading's size bump.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct FontStyle: u16 {
        const REGULAR   = 0;
        const BOLD      = 1 << 0;
        const ITALIC    = 1 << 1;
        const UNDERLINE = 1 << 2;
        const MONOSPACE = 1 << 3;
        const H1        = 1 << 4;
        const H2        = 1 << 5;
        const H3        = 1 << 6;
        const H4        = 1 << 7;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// The five discrete font sizes an asset pack ships (§6: "fonts 0..n").
pub const MAX_FONT_SIZE_INDEX: u8 = 4;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ElementStyle {
    pub font_size: u8,
    pub font_style: FontStyle,
    pub color: u8,
    pub alignment: AlignmentRepr,
    /// Set by `Link::apply_style` and inherited by descendants; lets paint
    /// pick the scheme's link color without re-walking ancestors (§4.3
    /// "Link… apply_style forces underline and link color").
    pub is_link: bool,
}

/// `Alignment` isn't `Hash`/`Eq` friendly to derive directly alongside
/// floats elsewhere in the engine, so the pool key represents it as a
/// small discriminant; `ElementStyle::alignment()` converts back.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AlignmentRepr {
    Left,
    Center,
    Right,
}

impl From<Alignment> for AlignmentRepr {
    fn from(a: Alignment) -> Self {
        match a {
            Alignment::Left => AlignmentRepr::Left,
            Alignment::Center => AlignmentRepr::Center,
            Alignment::Right => AlignmentRepr::Right,
        }
    }
}

impl From<AlignmentRepr> for Alignment {
    fn from(a: AlignmentRepr) -> Self {
        match a {
            AlignmentRepr::Left => Alignment::Left,
            AlignmentRepr::Center => Alignment::Center,
            AlignmentRepr::Right => Alignment::Right,
        }
    }
}

impl ElementStyle {
    pub fn root(text_color: u8) -> Self {
        ElementStyle {
            font_size: 1,
            font_style: FontStyle::REGULAR,
            color: text_color,
            alignment: AlignmentRepr::Left,
            is_link: false,
        }
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment.into()
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment.into();
        self
    }

    /// Applies a heading level's implied size bump on top of the inherited
    /// style, clamped to the asset pack's largest available size.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        let bump = match level {
            1 => 3,
            2 => 2,
            3 => 1,
            4 => 1,
            _ => 0,
        };
        self.font_size = (self.font_size + bump).min(MAX_FONT_SIZE_INDEX);
        self.font_style |= match level {
            1 => FontStyle::H1,
            2 => FontStyle::H2,
            3 => FontStyle::H3,
            4 => FontStyle::H4,
            _ => FontStyle::REGULAR,
        };
        self
    }
}

/// A small integer handle into a [`StylePool`]. Stable for the lifetime of
/// the page that allocated it (§3 invariant).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct StyleHandle(u32);

/// Pools identical `ElementStyle`s behind one handle, so two nodes with the
/// same effective style (the overwhelmingly common case for plain text
/// runs) cost one slot between them.
#[derive(Default)]
pub struct StylePool {
    styles: Vec<ElementStyle>,
    index: HashMap<ElementStyle, StyleHandle>,
}

impl StylePool {
    pub fn new() -> Self {
        StylePool::default()
    }

    pub fn intern(&mut self, style: ElementStyle) -> StyleHandle {
        if let Some(handle) = self.index.get(&style) {
            return *handle;
        }
        let handle = StyleHandle(self.styles.len() as u32);
        self.styles.push(style);
        self.index.insert(style, handle);
        handle
    }

    pub fn get(&self, handle: StyleHandle) -> ElementStyle {
        self.styles[handle.0 as usize]
    }

    /// Cleared alongside the arena at the start of each navigation; handles
    /// from the previous page are never looked up afterwards.
    pub fn reset(&mut self) {
        self.styles.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_styles_share_one_handle() {
        let mut pool = StylePool::new();
        let a = pool.intern(ElementStyle::root(7));
        let b = pool.intern(ElementStyle::root(7));
        assert_eq!(a, b);
        assert_eq!(pool.styles.len(), 1);
    }

    #[test]
    fn distinct_styles_get_distinct_handles() {
        let mut pool = StylePool::new();
        let a = pool.intern(ElementStyle::root(7));
        let mut bold = ElementStyle::root(7);
        bold.font_style |= FontStyle::BOLD;
        let b = pool.intern(bold);
        assert_ne!(a, b);
    }

    #[test]
    fn heading_level_bumps_font_size_and_sets_bit() {
        let base = ElementStyle::root(7);
        let h1 = base.with_heading_level(1);
        assert_eq!(h1.font_size, (base.font_size + 3).min(MAX_FONT_SIZE_INDEX));
        assert!(h1.font_style.contains(FontStyle::H1));
    }

    #[test]
    fn heading_level_clamps_to_max_font_size() {
        let mut base = ElementStyle::root(7);
        base.font_size = MAX_FONT_SIZE_INDEX;
        let h1 = base.with_heading_level(1);
        assert_eq!(h1.font_size, MAX_FONT_SIZE_INDEX);
    }

    #[test]
    fn reset_drops_all_pooled_styles() {
        let mut pool = StylePool::new();
        pool.intern(ElementStyle::root(7));
        pool.reset();
        assert_eq!(pool.styles.len(), 0);
    }
}
