/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Per-kind node payloads (§4.3). A [`NodePayload`] holds exactly the state
//! a kind's handlers need beyond the common [`crate::tree::NodeRecord`]
//! fields (parent/children/anchor/size/style).

use microweb_draw::CursorShape;
use microweb_mem::ArenaId;

use crate::tree::NodeRecord;

pub type NodeId = ArenaId<NodeRecord>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageState {
    Unloaded,
    DeterminingFormat,
    DownloadingDimensions,
    FinishedDownloadingDimensions,
    DownloadingContent,
    FinishedDownloadingContent,
    ErrorDownloading,
}

#[derive(Clone, Debug)]
pub struct SectionPayload {
    pub name: String,
}

/// Text owns a block-allocated string (here, an owned `String` — the block
/// allocator backs the page's byte storage, not individual node fields) and
/// caches the width it was last wrapped against so unchanged-width relayout
/// can skip re-wrapping (§4.3 "Text").
#[derive(Clone, Debug, Default)]
pub struct TextPayload {
    pub text: String,
    pub last_available_width: Option<i32>,
}

/// A line segment produced by `Text::generate_layout`'s word wrap: a
/// `(start, length)` slice into the parent's buffer, not a copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubTextPayload {
    pub start: u32,
    pub length: u32,
}

#[derive(Clone, Debug, Default)]
pub struct ImagePayload {
    pub state: ImageStateSlot,
    pub src: String,
    pub alt: String,
    pub ismap: bool,
    pub explicit_width: Option<i32>,
    pub explicit_height: Option<i32>,
    pub natural_width: i32,
    pub natural_height: i32,
}

/// Wraps [`ImageState`] so `ImagePayload` can derive `Default`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImageStateSlot(pub ImageState);

impl Default for ImageStateSlot {
    fn default() -> Self {
        ImageStateSlot(ImageState::Unloaded)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BreakPayload {
    pub rule: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StylePayload {
    pub override_mask: microweb_style::FontStyle,
    pub override_alignment: Option<microweb_style::Alignment>,
    /// Set by the parser for `h1`..`h4`; applies the heading's size bump
    /// via `ElementStyle::with_heading_level` on top of `override_mask`.
    pub heading_level: Option<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct LinkPayload {
    pub href: String,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BlockPayload {
    pub margin_left: i32,
    pub margin_right: i32,
    pub pad_top: i32,
    pub pad_bottom: i32,
}

#[derive(Clone, Debug, Default)]
pub struct ButtonPayload {
    pub label: String,
    pub pressed: bool,
}

#[derive(Clone, Debug, Default)]
pub struct TextFieldPayload {
    pub buffer: String,
    pub cursor: usize,
    pub shift_offset: i32,
    pub selection: Option<(usize, usize)>,
    pub name: String,
}

impl TextFieldPayload {
    /// Replaces the selection (if any) or inserts at the cursor, the way
    /// every printable/Delete/Backspace key handler in §4.3 does.
    pub fn replace_selection_or_insert_at_cursor(&mut self, insert: &str) {
        if let Some((start, end)) = self.selection.take() {
            self.buffer.replace_range(start..end, insert);
            self.cursor = start + insert.chars().count();
        } else {
            let byte_idx = self.byte_index_of_char(self.cursor);
            self.buffer.insert_str(byte_idx, insert);
            self.cursor += insert.chars().count();
        }
    }

    fn byte_index_of_char(&self, char_idx: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.buffer.len())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CheckBoxPayload {
    pub checked: bool,
}

#[derive(Clone, Debug, Default)]
pub struct FormPayload {
    pub action: String,
}

/// Two independent message slots; hover overrides general when present
/// (§5.5 interface root writeup).
#[derive(Clone, Debug, Default)]
pub struct StatusBarPayload {
    pub general: String,
    pub hover: Option<String>,
}

impl StatusBarPayload {
    pub fn displayed(&self) -> &str {
        self.hover.as_deref().unwrap_or(&self.general)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollBarPayload {
    pub scroll_position: i32,
    pub max_scroll: i32,
    pub thumb_size: i32,
    pub track_size: i32,
    pub dragging: bool,
    pub start_drag_offset: i32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TablePayload {
    pub cell_spacing: i32,
    pub cell_padding: i32,
    pub explicit_width: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TableRowPayload {
    pub row_height: i32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TableCellPayload {
    pub preferred_width: i32,
    pub explicit_width_px: Option<i32>,
    pub explicit_width_pct: Option<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct SelectPayload {
    pub selected: Option<NodeId>,
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct OptionPayload {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ListPayload {
    pub ordered: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ListItemPayload {
    pub index: u32,
}

pub enum NodePayload {
    Section(SectionPayload),
    Text(TextPayload),
    SubText(SubTextPayload),
    Image(ImagePayload),
    Break(BreakPayload),
    Style(StylePayload),
    Link(LinkPayload),
    Block(BlockPayload),
    Button(ButtonPayload),
    TextField(TextFieldPayload),
    CheckBox(CheckBoxPayload),
    Form(FormPayload),
    StatusBar(StatusBarPayload),
    ScrollBar(ScrollBarPayload),
    Table(TablePayload),
    TableRow(TableRowPayload),
    TableCell(TableCellPayload),
    Select(SelectPayload),
    Option(OptionPayload),
    List(ListPayload),
    ListItem(ListItemPayload),
}

impl NodePayload {
    /// The hover cursor an interactive kind shows, if any (used by the
    /// shell's pointer-motion handling).
    pub fn hover_cursor(&self) -> Option<CursorShape> {
        match self {
            NodePayload::Link(_) | NodePayload::Button(_) => Some(CursorShape::Hand),
            NodePayload::TextField(_) => Some(CursorShape::TextSelect),
            _ => None,
        }
    }
}
