/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! `begin_layout_context` / `generate_layout` / `end_layout_context`
//! (§4.5), dispatched with a `match` over [`NodeKind`] the same way
//! `microweb_nodes::dispatch` handles `apply_style`/`paint`/`pick` — kept
//! in a separate crate so the dependency runs one way only:
//! `microweb_layout` depends on `microweb_nodes`, never the reverse.
//!
//! The "pointer to the next node to process" in §4.5 is realized as an
//! explicit work stack (`Frame::Enter`/`Frame::Exit`) rather than the
//! native Rust call stack, so layout can suspend mid-tree (on an Image
//! awaiting dimensions) and resume later with [`LayoutEngine::advance`].

use std::collections::HashMap;

use microweb_assets::AssetPack;
use microweb_draw::Font;
use microweb_geometry::{Point, Size};
use microweb_nodes::{ImageState, ImageStateSlot, NodeId, NodeKind, NodePayload, NodeTree};
use microweb_style::{Alignment, ElementStyle, FontStyle};

use crate::cursor::{Cursor, Margin};
use crate::table::{self, RowState, TablePlan};
use crate::wrap::{self, measured_width};

pub const LIST_INDENT: i32 = 16;
pub const BUTTON_PADDING: i32 = 4;
pub const DEFAULT_TEXT_FIELD_WIDTH: i32 = 120;
pub const CHECKBOX_SIZE: i32 = 10;
pub const DEFAULT_IMAGE_PLACEHOLDER: i32 = 24;
pub const RULE_HEIGHT: i32 = 2;
pub const RULE_GAP: i32 = 4;
pub const BLOCK_VERTICAL_GAP: i32 = 4;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutOutcome {
    /// Every pending node has been walked; layout is up to date.
    Complete,
    /// Paused at `NodeId`, an Image awaiting dimensions. The caller
    /// should start (or continue waiting on) the sub-resource fetch and
    /// call `advance` again once the image's state has moved on.
    Suspended(NodeId),
}

enum Frame {
    Enter(NodeId),
    Exit(NodeId),
}

/// Resumable layout state: the cursor/margin stacks, the nodes on the
/// line currently being assembled, and the explicit walk stack that
/// stands in for the call stack so a suspension can be resumed.
pub struct LayoutEngine {
    window_width: i32,
    cursors: Vec<Cursor>,
    margins: Vec<Margin>,
    line_nodes: Vec<NodeId>,
    pending: Vec<Frame>,
    table_plans: HashMap<NodeId, TablePlan>,
    row_states: Vec<RowState>,
}

impl LayoutEngine {
    pub fn new(window_width: i32) -> Self {
        LayoutEngine {
            window_width,
            cursors: Vec::new(),
            margins: Vec::new(),
            line_nodes: Vec::new(),
            pending: Vec::new(),
            table_plans: HashMap::new(),
            row_states: Vec::new(),
        }
    }

    pub fn window_width(&self) -> i32 {
        self.window_width
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Resets both stacks and starts a fresh walk from `root` (§4.5:
    /// "the engine maintains a pointer to the 'next node to process'").
    pub fn begin(&mut self, root: NodeId) {
        self.cursors.clear();
        self.margins.clear();
        self.line_nodes.clear();
        self.pending.clear();
        self.table_plans.clear();
        self.row_states.clear();
        self.cursors.push(Cursor { x: 0, y: 0, line_height: 0 });
        self.margins.push(Margin { left: 0, right: self.window_width });
        self.pending.push(Frame::Enter(root));
    }

    /// The full recalculation path (§4.5: "on window-width change, reset
    /// all stacks and walk the tree calling the same three hooks").
    pub fn relayout(&mut self, tree: &mut NodeTree, assets: &AssetPack, root: NodeId, window_width: i32) -> LayoutOutcome {
        self.window_width = window_width;
        self.begin(root);
        self.advance(tree, assets)
    }

    /// Walks as far as it can, returning `Complete` once the pending
    /// stack drains or `Suspended` the moment an Image needs a
    /// sub-resource fetch it hasn't started (or is still waiting on).
    pub fn advance(&mut self, tree: &mut NodeTree, assets: &AssetPack) -> LayoutOutcome {
        while let Some(frame) = self.pending.pop() {
            match frame {
                Frame::Enter(node) => {
                    if tree.get(node).kind == NodeKind::Image {
                        match image_wait_action(tree, node) {
                            ImageWait::StartFetch => {
                                if let NodePayload::Image(img) = &mut tree.get_mut(node).payload {
                                    img.state = ImageStateSlot(ImageState::DeterminingFormat);
                                }
                                self.pending.push(Frame::Enter(node));
                                return LayoutOutcome::Suspended(node);
                            }
                            ImageWait::Wait => {
                                self.pending.push(Frame::Enter(node));
                                return LayoutOutcome::Suspended(node);
                            }
                            ImageWait::Proceed => {}
                        }
                    }
                    self.enter(tree, assets, node);
                    self.pending.push(Frame::Exit(node));
                    for child in tree.children(node).into_iter().rev() {
                        self.pending.push(Frame::Enter(child));
                    }
                }
                Frame::Exit(node) => self.exit(tree, node),
            }
        }
        LayoutOutcome::Complete
    }

    fn enter(&mut self, tree: &mut NodeTree, assets: &AssetPack, node: NodeId) {
        match tree.get(node).kind {
            NodeKind::Section | NodeKind::Form | NodeKind::Style | NodeKind::Link => {
                let cursor = *self.cursors.last().unwrap();
                tree.get_mut(node).anchor = Point::new(cursor.x, cursor.y);
            }
            NodeKind::Block => self.enter_block(tree, node),
            NodeKind::Text => self.layout_text(tree, assets, node),
            NodeKind::SubText => {}
            NodeKind::Break => self.enter_break(tree, node),
            NodeKind::Button => self.enter_measured_inline(tree, assets, node),
            NodeKind::TextField => self.enter_fixed_inline(tree, node, DEFAULT_TEXT_FIELD_WIDTH, 14),
            NodeKind::CheckBox => self.enter_fixed_inline(tree, node, CHECKBOX_SIZE, CHECKBOX_SIZE),
            NodeKind::Select => self.enter_measured_inline(tree, assets, node),
            NodeKind::Option => self.enter_measured_inline(tree, assets, node),
            NodeKind::Image => self.enter_image(tree, node),
            NodeKind::StatusBar => self.enter_fixed_inline(tree, node, self.window_width, 14),
            NodeKind::ScrollBar => self.enter_fixed_inline(tree, node, 12, self.window_width),
            NodeKind::List => self.enter_list(tree, node),
            NodeKind::ListItem => self.enter_list_item(tree, node),
            NodeKind::Table => self.enter_table(tree, assets, node),
            NodeKind::TableRow => self.enter_table_row(tree, node),
            NodeKind::TableCell => self.enter_table_cell(tree, node),
        }
    }

    fn exit(&mut self, tree: &mut NodeTree, node: NodeId) {
        match tree.get(node).kind {
            NodeKind::Section | NodeKind::Form | NodeKind::Link => {
                self.finish_line(tree);
                encapsulate_children(tree, node, 0);
            }
            NodeKind::Block => self.exit_block(tree, node),
            NodeKind::Style | NodeKind::SubText => {}
            NodeKind::Text | NodeKind::Break | NodeKind::Button | NodeKind::TextField | NodeKind::CheckBox
            | NodeKind::Select | NodeKind::Option | NodeKind::Image | NodeKind::StatusBar | NodeKind::ScrollBar => {}
            NodeKind::List => self.exit_list(tree, node),
            NodeKind::ListItem => self.exit_list_item(tree, node),
            NodeKind::Table => self.exit_table(tree, node),
            NodeKind::TableRow => self.exit_table_row(tree, node),
            NodeKind::TableCell => self.exit_table_cell(tree, node),
        }
    }

    // -- Block -----------------------------------------------------------

    fn enter_block(&mut self, tree: &mut NodeTree, node: NodeId) {
        self.finish_line(tree);
        let payload = match &tree.get(node).payload {
            NodePayload::Block(b) => *b,
            _ => Default::default(),
        };
        {
            let cursor = self.cursors.last_mut().unwrap();
            cursor.y += payload.pad_top;
            cursor.x = self.margins.last().unwrap().left;
        }
        let cursor = *self.cursors.last().unwrap();
        tree.get_mut(node).anchor = Point::new(cursor.x, cursor.y);
        let margin = *self.margins.last().unwrap();
        self.margins.push(Margin { left: margin.left + payload.margin_left, right: margin.right - payload.margin_right });
        self.cursors.last_mut().unwrap().x = margin.left + payload.margin_left;
    }

    fn exit_block(&mut self, tree: &mut NodeTree, node: NodeId) {
        self.finish_line(tree);
        self.margins.pop();
        let payload = match &tree.get(node).payload {
            NodePayload::Block(b) => *b,
            _ => Default::default(),
        };
        self.cursors.last_mut().unwrap().y += payload.pad_bottom;
        self.cursors.last_mut().unwrap().x = self.margins.last().unwrap().left;
        encapsulate_children(tree, node, 0);
    }

    // -- Break -------------------------------------------------------------

    fn enter_break(&mut self, tree: &mut NodeTree, node: NodeId) {
        self.finish_line(tree);
        let rule = matches!(&tree.get(node).payload, NodePayload::Break(b) if b.rule);
        let margin = *self.margins.last().unwrap();
        let cursor = *self.cursors.last().unwrap();
        tree.get_mut(node).anchor = Point::new(margin.left, cursor.y);
        let height = if rule { RULE_HEIGHT + RULE_GAP } else { RULE_GAP };
        tree.get_mut(node).size = Size::new(margin.width(), height.max(1));
        let cursor = self.cursors.last_mut().unwrap();
        cursor.y += height;
        cursor.x = margin.left;
        cursor.line_height = 0;
    }

    // -- Text / SubText ----------------------------------------------------

    fn layout_text(&mut self, tree: &mut NodeTree, assets: &AssetPack, node: NodeId) {
        let margin = *self.margins.last().unwrap();
        let available_width = margin.width();
        let style = tree.style_of(node);
        let bold = style.font_style.contains(FontStyle::BOLD);

        let cached = matches!(&tree.get(node).payload, NodePayload::Text(t) if t.last_available_width == Some(available_width));
        if !cached {
            let text = match &tree.get(node).payload {
                NodePayload::Text(t) => t.text.clone(),
                _ => return,
            };
            let font = font_for(assets, style);
            let segments = wrap::wrap(&text, font, bold, available_width);
            tree.clear_children(node);
            let child_style = tree.get(node).style;
            for seg in &segments {
                tree.add_subtext(node, child_style, seg.start, seg.length);
            }
            if let NodePayload::Text(t) = &mut tree.get_mut(node).payload {
                t.last_available_width = Some(available_width);
            }
        }
        self.place_text_segments(tree, assets, node, style, bold);
    }

    fn place_text_segments(&mut self, tree: &mut NodeTree, assets: &AssetPack, node: NodeId, style: ElementStyle, bold: bool) {
        let font = font_for(assets, style);
        let glyph_h = font.glyph_height as i32;
        let children = tree.children(node);
        let mut first_anchor: Option<Point> = None;
        let mut last_bottom = 0;

        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                self.finish_line(tree);
            }
            let (start, length) = match &tree.get(*child).payload {
                NodePayload::SubText(s) => (s.start, s.length),
                _ => continue,
            };
            let slice = text_slice(tree, node, start, length);
            let width = measured_width(font, &slice, bold);
            let anchor = self.place_inline(tree, *child, width, glyph_h);
            if first_anchor.is_none() {
                first_anchor = Some(anchor);
            }
            last_bottom = last_bottom.max(anchor.y + glyph_h);
        }

        let anchor = first_anchor.unwrap_or_else(|| {
            let c = *self.cursors.last().unwrap();
            Point::new(c.x, c.y)
        });
        let end_x = self.cursors.last().unwrap().x;
        let record = tree.get_mut(node);
        record.anchor = anchor;
        record.size = Size::new((end_x - anchor.x).max(0), (last_bottom - anchor.y).max(glyph_h));
    }

    // -- Generic inline placement -------------------------------------------

    /// Places a fixed/measured inline box at the cursor, breaking the
    /// line first when it would not fit, and folds it into the current
    /// line's height-growth bookkeeping (§4.5's "every node on the line
    /// gets `(0, delta_y)` added").
    fn place_inline(&mut self, tree: &mut NodeTree, node: NodeId, width: i32, height: i32) -> Point {
        let margin = *self.margins.last().unwrap();
        {
            let cursor = self.cursors.last().unwrap();
            if cursor.x > margin.left && cursor.x + width > margin.right {
                self.finish_line(tree);
            }
        }
        let delta = {
            let cursor = self.cursors.last_mut().unwrap();
            if height > cursor.line_height {
                let d = height - cursor.line_height;
                cursor.line_height = height;
                d
            } else {
                0
            }
        };
        if delta != 0 {
            for &n in &self.line_nodes {
                tree.get_mut(n).anchor.y += delta;
            }
        }
        let cursor = *self.cursors.last().unwrap();
        let anchor = Point::new(cursor.x, cursor.y);
        tree.get_mut(node).anchor = anchor;
        tree.get_mut(node).size = Size::new(width.max(0), height.max(0));
        self.cursors.last_mut().unwrap().x += width;
        self.line_nodes.push(node);
        anchor
    }

    fn enter_measured_inline(&mut self, tree: &mut NodeTree, assets: &AssetPack, node: NodeId) {
        let style = tree.style_of(node);
        let font = font_for(assets, style);
        let glyph_h = font.glyph_height as i32;
        let width = match &tree.get(node).payload {
            NodePayload::Button(b) => measured_width(font, &b.label, false) + BUTTON_PADDING * 2,
            NodePayload::Select(_) => DEFAULT_TEXT_FIELD_WIDTH,
            NodePayload::Option(o) => measured_width(font, &o.label, false),
            _ => DEFAULT_TEXT_FIELD_WIDTH,
        };
        self.place_inline(tree, node, width, glyph_h + BUTTON_PADDING);
    }

    fn enter_fixed_inline(&mut self, tree: &mut NodeTree, node: NodeId, width: i32, height: i32) {
        self.place_inline(tree, node, width, height);
    }

    fn enter_image(&mut self, tree: &mut NodeTree, node: NodeId) {
        let (w, h) = image_dimensions(tree, node);
        self.place_inline(tree, node, w, h);
    }

    // -- List / ListItem -----------------------------------------------------

    fn enter_list(&mut self, tree: &mut NodeTree, node: NodeId) {
        self.finish_line(tree);
        let cursor = *self.cursors.last().unwrap();
        tree.get_mut(node).anchor = Point::new(cursor.x, cursor.y);
        let margin = *self.margins.last().unwrap();
        self.margins.push(Margin { left: margin.left + LIST_INDENT, right: margin.right });
        self.cursors.last_mut().unwrap().x = margin.left + LIST_INDENT;
    }

    fn exit_list(&mut self, tree: &mut NodeTree, node: NodeId) {
        self.finish_line(tree);
        self.margins.pop();
        self.cursors.last_mut().unwrap().x = self.margins.last().unwrap().left;
        encapsulate_children(tree, node, 0);
    }

    fn enter_list_item(&mut self, tree: &mut NodeTree, node: NodeId) {
        self.finish_line(tree);
        let margin = *self.margins.last().unwrap();
        let cursor = self.cursors.last_mut().unwrap();
        cursor.x = margin.left;
        let gutter_x = (margin.left - LIST_INDENT).max(0);
        tree.get_mut(node).anchor = Point::new(gutter_x, cursor.y);
    }

    fn exit_list_item(&mut self, tree: &mut NodeTree, node: NodeId) {
        self.finish_line(tree);
        encapsulate_children(tree, node, 12);
    }

    // -- Table / TableRow / TableCell ----------------------------------------

    fn enter_table(&mut self, tree: &mut NodeTree, assets: &AssetPack, node: NodeId) {
        self.finish_line(tree);
        let cursor = *self.cursors.last().unwrap();
        tree.get_mut(node).anchor = Point::new(cursor.x, cursor.y);
        let available = self.margins.last().unwrap().width();
        let plan = table::build_plan(tree, assets, node, available);
        self.table_plans.insert(node, plan);
    }

    fn exit_table(&mut self, tree: &mut NodeTree, node: NodeId) {
        self.table_plans.remove(&node);
        self.finish_line(tree);
        encapsulate_children(tree, node, 0);
    }

    fn enter_table_row(&mut self, tree: &mut NodeTree, node: NodeId) {
        self.finish_line(tree);
        let margin = *self.margins.last().unwrap();
        let row_top = self.cursors.last().unwrap().y;
        tree.get_mut(node).anchor = Point::new(margin.left, row_top);
        self.row_states.push(RowState { row_top, next_x: margin.left, max_bottom: row_top, cell_index: 0 });
    }

    fn exit_table_row(&mut self, tree: &mut NodeTree, node: NodeId) {
        let plan = self.plan_for(tree, node);
        let state = self.row_states.pop().unwrap();
        let margin = *self.margins.last().unwrap();
        tree.get_mut(node).size = Size::new((state.next_x - margin.left).max(0), (state.max_bottom - state.row_top).max(1));
        let cursor = self.cursors.last_mut().unwrap();
        cursor.y = state.max_bottom + plan.spacing;
        cursor.x = margin.left;
    }

    fn enter_table_cell(&mut self, tree: &mut NodeTree, node: NodeId) {
        let plan = self.plan_for(tree, node);
        let row_state = self.row_states.last().expect("TableCell only occurs inside a TableRow");
        let col_width = plan.column_width(row_state.cell_index);
        let cell_x = row_state.next_x;
        let row_top = row_state.row_top;
        tree.get_mut(node).anchor = Point::new(cell_x, row_top);
        self.margins.push(Margin { left: cell_x + plan.padding, right: cell_x + col_width - plan.padding });
        self.cursors.push(Cursor { x: cell_x + plan.padding, y: row_top + plan.padding, line_height: 0 });
        let row_state = self.row_states.last_mut().unwrap();
        row_state.next_x += col_width + plan.spacing;
        row_state.cell_index += 1;
    }

    fn exit_table_cell(&mut self, tree: &mut NodeTree, node: NodeId) {
        self.finish_line(tree);
        let plan = self.plan_for(tree, node);
        let col_width = {
            // column index this cell occupied: infer from anchor spacing
            // is unnecessary since we only need the cell's own width here.
            let margin = *self.margins.last().unwrap();
            margin.right - margin.left + plan.padding * 2
        };
        encapsulate_children(tree, node, 0);
        let record = tree.get_mut(node);
        record.size.width = (col_width - plan.padding * 2).max(1);
        let bottom = record.anchor.y + record.size.height + plan.padding * 2;
        self.margins.pop();
        self.cursors.pop();
        if let Some(state) = self.row_states.last_mut() {
            state.max_bottom = state.max_bottom.max(bottom);
        }
    }

    fn plan_for(&self, tree: &NodeTree, mut node: NodeId) -> TablePlan {
        loop {
            if tree.get(node).kind == NodeKind::Table {
                return self.table_plans.get(&node).cloned().unwrap_or_default();
            }
            match tree.get(node).parent {
                Some(parent) => node = parent,
                None => return TablePlan::default(),
            }
        }
    }

    // -- Line bookkeeping -----------------------------------------------------

    /// Ends the line currently being assembled: applies the alignment
    /// shift (§4.5: 0 / available/2 / available for Left/Center/Right)
    /// to every node placed on it, then advances the cursor to the next
    /// line.
    fn finish_line(&mut self, tree: &mut NodeTree) {
        if self.line_nodes.is_empty() {
            return;
        }
        let margin = *self.margins.last().unwrap();
        let cursor = *self.cursors.last().unwrap();
        let used = (cursor.x - margin.left).max(0);
        let available = (margin.right - margin.left - used).max(0);
        let alignment = self.line_nodes.first().map(|n| tree.style_of(*n).alignment()).unwrap_or(Alignment::Left);
        let shift = match alignment {
            Alignment::Left => 0,
            Alignment::Center => available / 2,
            Alignment::Right => available,
        };
        if shift != 0 {
            for &n in &self.line_nodes {
                tree.get_mut(n).anchor.x += shift;
            }
        }
        let cursor = self.cursors.last_mut().unwrap();
        cursor.y += cursor.line_height.max(1);
        cursor.x = margin.left;
        cursor.line_height = 0;
        self.line_nodes.clear();
    }
}

fn encapsulate_children(tree: &mut NodeTree, node: NodeId, fallback_height: i32) {
    let anchor = tree.get(node).anchor;
    let children = tree.children(node);
    let mut max_x = anchor.x;
    let mut max_y = anchor.y;
    for child in &children {
        let rec = tree.get(*child);
        max_x = max_x.max(rec.anchor.x + rec.size.width);
        max_y = max_y.max(rec.anchor.y + rec.size.height);
    }
    let record = tree.get_mut(node);
    record.size = Size::new((max_x - anchor.x).max(0), (max_y - anchor.y).max(fallback_height));
}

fn text_slice(tree: &NodeTree, node: NodeId, start: u32, length: u32) -> String {
    match &tree.get(node).payload {
        NodePayload::Text(t) => {
            let s = start as usize;
            let e = (s + length as usize).min(t.text.len());
            t.text[s..e].to_string()
        }
        _ => String::new(),
    }
}

enum ImageWait {
    StartFetch,
    Wait,
    Proceed,
}

fn image_wait_action(tree: &NodeTree, node: NodeId) -> ImageWait {
    match &tree.get(node).payload {
        NodePayload::Image(img) => match img.state.0 {
            ImageState::Unloaded => ImageWait::StartFetch,
            ImageState::DeterminingFormat | ImageState::DownloadingDimensions => ImageWait::Wait,
            ImageState::FinishedDownloadingDimensions
            | ImageState::DownloadingContent
            | ImageState::FinishedDownloadingContent
            | ImageState::ErrorDownloading => ImageWait::Proceed,
        },
        _ => ImageWait::Proceed,
    }
}

/// Resolves explicit/natural dimensions with aspect-ratio scaling when
/// only one of width/height is given (§4.3 "Image"; §8's boundary
/// behavior "an image with explicit width but no height must preserve
/// the source aspect ratio").
fn image_dimensions(tree: &NodeTree, node: NodeId) -> (i32, i32) {
    let img = match &tree.get(node).payload {
        NodePayload::Image(img) => img,
        _ => return (DEFAULT_IMAGE_PLACEHOLDER, DEFAULT_IMAGE_PLACEHOLDER),
    };
    match (img.explicit_width, img.explicit_height) {
        (Some(w), Some(h)) => (w.max(1), h.max(1)),
        (Some(w), None) if img.natural_width > 0 => {
            let h = (w as i64 * img.natural_height as i64 / img.natural_width as i64) as i32;
            (w.max(1), h.max(1))
        }
        (None, Some(h)) if img.natural_height > 0 => {
            let w = (h as i64 * img.natural_width as i64 / img.natural_height as i64) as i32;
            (w.max(1), h.max(1))
        }
        (Some(w), None) => (w.max(1), DEFAULT_IMAGE_PLACEHOLDER),
        (None, Some(h)) => (DEFAULT_IMAGE_PLACEHOLDER, h.max(1)),
        (None, None) if img.natural_width > 0 && img.natural_height > 0 => (img.natural_width, img.natural_height),
        (None, None) => (DEFAULT_IMAGE_PLACEHOLDER, DEFAULT_IMAGE_PLACEHOLDER),
    }
}

pub(crate) fn font_for<'a>(assets: &'a AssetPack, style: ElementStyle) -> &'a Font {
    let family = if style.font_style.contains(FontStyle::MONOSPACE) {
        microweb_assets::FontFamily::Monospace
    } else {
        microweb_assets::FontFamily::Proportional
    };
    let weight = if style.font_style.contains(FontStyle::BOLD) {
        microweb_assets::FontWeight::Bold
    } else {
        microweb_assets::FontWeight::Regular
    };
    assets.font(family, weight, style.font_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use microweb_nodes::{BlockPayload, NodeTree};
    use microweb_style::ElementStyle;

    fn fixture_assets() -> AssetPack {
        let bytes = microweb_assets::test_fixture_pack();
        AssetPack::load(&bytes).unwrap()
    }

    fn tree_with_root() -> (NodeTree, NodeId) {
        let mut tree = NodeTree::new();
        let style = tree.intern_style(ElementStyle::root(7));
        let root = tree.add_section(None, style, "Document").unwrap();
        tree.set_root(root);
        (tree, root)
    }

    #[test]
    fn paragraph_text_gets_nonzero_size_and_one_subtext() {
        let (mut tree, root) = tree_with_root();
        let style = tree.get(root).style;
        let block = tree.add_block(root, style, BlockPayload::default()).unwrap();
        let text = tree.add_text(block, style, "Hello, world!").unwrap();

        let assets = fixture_assets();
        let mut engine = LayoutEngine::new(640);
        engine.begin(root);
        assert_eq!(engine.advance(&mut tree, &assets), LayoutOutcome::Complete);

        assert!(tree.get(text).size.width > 0);
        assert!(tree.get(text).size.height > 0);
        let subtexts = tree.children(text);
        assert_eq!(subtexts.len(), 1);
    }

    #[test]
    fn break_rule_advances_cursor_below_preceding_text() {
        let (mut tree, root) = tree_with_root();
        let style = tree.get(root).style;
        let text = tree.add_text(root, style, "above").unwrap();
        let rule = tree.add_break(root, style, true).unwrap();

        let assets = fixture_assets();
        let mut engine = LayoutEngine::new(640);
        engine.begin(root);
        engine.advance(&mut tree, &assets);

        assert!(tree.get(rule).anchor.y >= tree.get(text).anchor.y);
    }

    #[test]
    fn narrow_window_forces_a_wrap_into_multiple_subtext_children() {
        let (mut tree, root) = tree_with_root();
        let style = tree.get(root).style;
        let text = tree.add_text(root, style, "one two three four five six seven eight").unwrap();

        let assets = fixture_assets();
        let mut engine = LayoutEngine::new(40);
        engine.begin(root);
        engine.advance(&mut tree, &assets);

        assert!(tree.children(text).len() > 1);
    }
}
