/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The node tree itself (§3): an [`Arena`]-backed forest addressed by
//! [`NodeId`], plus typed constructors so callers never build a
//! `NodeRecord` by hand (the "typed constructors returning Node values"
//! design note).

use microweb_geometry::{Point, Size};
use microweb_mem::Arena;
use microweb_style::{ElementStyle, StyleHandle, StylePool};

use crate::kind::NodeKind;
use crate::payload::*;

/// One entry in the arena. Parent/sibling/child links are `NodeId`s rather
/// than pointers, matching the arena's own "idx handles, not raw
/// back-pointers" design note — nothing here can dangle across a `reset()`
/// boundary because the whole tree is dropped at once.
pub struct NodeRecord {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub anchor: Point,
    pub size: Size,
    pub style: StyleHandle,
    pub payload: NodePayload,
    pub focused: bool,
}

impl NodeRecord {
    fn new(kind: NodeKind, style: StyleHandle, payload: NodePayload) -> Self {
        NodeRecord {
            kind,
            parent: None,
            first_child: None,
            next_sibling: None,
            last_child: None,
            anchor: Point::new(0, 0),
            size: Size::new(0, 0),
            style,
            payload,
            focused: false,
        }
    }
}

/// A full node forest: the arena, the style pool nodes' styles are interned
/// into, and the root. One instance per page (document root or interface
/// root, per §3).
pub struct NodeTree {
    arena: Arena<NodeRecord>,
    styles: StylePool,
    root: Option<NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        NodeTree {
            arena: Arena::new(),
            styles: StylePool::new(),
            root: None,
        }
    }

    pub fn with_max_chunks(max_chunks: usize) -> Self {
        NodeTree {
            arena: Arena::with_max_chunks(max_chunks),
            styles: StylePool::new(),
            root: None,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &NodeRecord {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeRecord {
        self.arena.get_mut(id)
    }

    pub fn style_of(&self, id: NodeId) -> ElementStyle {
        self.styles.get(self.arena.get(id).style)
    }

    pub fn intern_style(&mut self, style: ElementStyle) -> StyleHandle {
        self.styles.intern(style)
    }

    pub fn style(&self, handle: StyleHandle) -> ElementStyle {
        self.styles.get(handle)
    }

    /// Returns every direct child of `id`, in document order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.arena.get(id).first_child;
        while let Some(child) = cur {
            out.push(child);
            cur = self.arena.get(child).next_sibling;
        }
        out
    }

    /// Allocates `node`, sets its style and parent link, and appends it to
    /// `parent`'s child list. Returns `None` on arena overflow (§7: the
    /// page is shown best-effort rather than aborted).
    fn insert(&mut self, parent: Option<NodeId>, style: StyleHandle, record_kind: NodeKind, payload: NodePayload) -> Option<NodeId> {
        let mut record = NodeRecord::new(record_kind, style, payload);
        record.parent = parent;
        let id = self.arena.alloc(record).or_else(|| {
            log::warn!("node tree arena full, dropping a {record_kind:?} node");
            None
        })?;
        if let Some(parent) = parent {
            let parent_rec = self.arena.get_mut(parent);
            if let Some(last) = parent_rec.last_child {
                self.arena.get_mut(last).next_sibling = Some(id);
            } else {
                self.arena.get_mut(parent).first_child = Some(id);
            }
            self.arena.get_mut(parent).last_child = Some(id);
        }
        Some(id)
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn add_section(&mut self, parent: Option<NodeId>, style: StyleHandle, name: impl Into<String>) -> Option<NodeId> {
        self.insert(parent, style, NodeKind::Section, NodePayload::Section(SectionPayload { name: name.into() }))
    }

    pub fn add_text(&mut self, parent: NodeId, style: StyleHandle, text: impl Into<String>) -> Option<NodeId> {
        self.insert(
            Some(parent),
            style,
            NodeKind::Text,
            NodePayload::Text(TextPayload {
                text: text.into(),
                last_available_width: None,
            }),
        )
    }

    pub fn add_subtext(&mut self, parent: NodeId, style: StyleHandle, start: u32, length: u32) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::SubText, NodePayload::SubText(SubTextPayload { start, length }))
    }

    pub fn add_image(&mut self, parent: NodeId, style: StyleHandle, payload: ImagePayload) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::Image, NodePayload::Image(payload))
    }

    pub fn add_break(&mut self, parent: NodeId, style: StyleHandle, rule: bool) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::Break, NodePayload::Break(BreakPayload { rule }))
    }

    pub fn add_style(&mut self, parent: NodeId, style: StyleHandle, payload: StylePayload) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::Style, NodePayload::Style(payload))
    }

    pub fn add_link(&mut self, parent: NodeId, style: StyleHandle, href: impl Into<String>) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::Link, NodePayload::Link(LinkPayload { href: href.into() }))
    }

    pub fn add_block(&mut self, parent: NodeId, style: StyleHandle, payload: BlockPayload) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::Block, NodePayload::Block(payload))
    }

    pub fn add_button(&mut self, parent: NodeId, style: StyleHandle, label: impl Into<String>) -> Option<NodeId> {
        self.insert(
            Some(parent),
            style,
            NodeKind::Button,
            NodePayload::Button(ButtonPayload { label: label.into(), pressed: false }),
        )
    }

    pub fn add_text_field(&mut self, parent: NodeId, style: StyleHandle, name: impl Into<String>) -> Option<NodeId> {
        self.insert(
            Some(parent),
            style,
            NodeKind::TextField,
            NodePayload::TextField(TextFieldPayload { name: name.into(), ..Default::default() }),
        )
    }

    pub fn add_check_box(&mut self, parent: NodeId, style: StyleHandle, checked: bool) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::CheckBox, NodePayload::CheckBox(CheckBoxPayload { checked }))
    }

    pub fn add_form(&mut self, parent: NodeId, style: StyleHandle, action: impl Into<String>) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::Form, NodePayload::Form(FormPayload { action: action.into() }))
    }

    pub fn add_status_bar(&mut self, parent: NodeId, style: StyleHandle) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::StatusBar, NodePayload::StatusBar(StatusBarPayload::default()))
    }

    pub fn add_scroll_bar(&mut self, parent: NodeId, style: StyleHandle) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::ScrollBar, NodePayload::ScrollBar(ScrollBarPayload::default()))
    }

    pub fn add_table(&mut self, parent: NodeId, style: StyleHandle, payload: TablePayload) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::Table, NodePayload::Table(payload))
    }

    pub fn add_table_row(&mut self, parent: NodeId, style: StyleHandle) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::TableRow, NodePayload::TableRow(TableRowPayload::default()))
    }

    pub fn add_table_cell(&mut self, parent: NodeId, style: StyleHandle, payload: TableCellPayload) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::TableCell, NodePayload::TableCell(payload))
    }

    pub fn add_select(&mut self, parent: NodeId, style: StyleHandle, name: impl Into<String>) -> Option<NodeId> {
        self.insert(
            Some(parent),
            style,
            NodeKind::Select,
            NodePayload::Select(SelectPayload { selected: None, name: name.into() }),
        )
    }

    pub fn add_option(&mut self, parent: NodeId, style: StyleHandle, value: impl Into<String>, label: impl Into<String>) -> Option<NodeId> {
        self.insert(
            Some(parent),
            style,
            NodeKind::Option,
            NodePayload::Option(OptionPayload { value: value.into(), label: label.into() }),
        )
    }

    pub fn add_list(&mut self, parent: NodeId, style: StyleHandle, ordered: bool) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::List, NodePayload::List(ListPayload { ordered }))
    }

    pub fn add_list_item(&mut self, parent: NodeId, style: StyleHandle, index: u32) -> Option<NodeId> {
        self.insert(Some(parent), style, NodeKind::ListItem, NodePayload::ListItem(ListItemPayload { index }))
    }

    /// Unlinks every child of `id` without reclaiming their arena slots —
    /// the bump allocator has no per-node free, so re-wrapped text simply
    /// orphans its old `SubText` children until the next full `reset()`.
    pub fn clear_children(&mut self, id: NodeId) {
        let record = self.arena.get_mut(id);
        record.first_child = None;
        record.last_child = None;
    }

    /// Drops the whole tree and its pooled styles at once, ready for the
    /// next navigation to reuse the underlying chunk storage.
    pub fn reset(&mut self) {
        self.arena.reset();
        self.styles.reset();
        self.root = None;
    }

    pub fn overflowed(&self) -> bool {
        self.arena.overflowed()
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microweb_style::ElementStyle;

    #[test]
    fn root_and_children_link_up_in_document_order() {
        let mut tree = NodeTree::new();
        let style = tree.intern_style(ElementStyle::root(7));
        let root = tree.add_section(None, style, "Document").unwrap();
        tree.set_root(root);
        let a = tree.add_text(root, style, "first").unwrap();
        let b = tree.add_text(root, style, "second").unwrap();
        assert_eq!(tree.children(root), vec![a, b]);
        assert_eq!(tree.get(a).parent, Some(root));
    }

    #[test]
    fn reset_clears_tree_and_styles() {
        let mut tree = NodeTree::new();
        let style = tree.intern_style(ElementStyle::root(7));
        let root = tree.add_section(None, style, "Document").unwrap();
        tree.set_root(root);
        tree.add_text(root, style, "hello").unwrap();
        tree.reset();
        assert!(tree.root().is_none());
    }
}
