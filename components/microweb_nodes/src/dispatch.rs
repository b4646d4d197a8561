/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The common interface's non-layout methods (§4.3): `apply_style`,
//! `paint`, `pick` and `handle_event`, dispatched with a `match` over
//! [`NodeKind`] rather than a v-table (the "virtual dispatch via
//! function-pointer tables → tagged variant with a match" design note).
//! `begin_layout_context` / `generate_layout` / `end_layout_context` live
//! in `microweb_layout` instead, which depends on this crate rather than
//! the reverse.

use microweb_assets::AssetPack;
use microweb_draw::{ClipRect, ColorScheme, DrawContext};
use microweb_style::{ElementStyle, FontStyle};

use crate::event::{Key, NodeAction, NodeEvent};
use crate::kind::NodeKind;
use crate::payload::{ImageState, NodeId, NodePayload};
use crate::tree::NodeTree;

/// Combines `parent_style` with `node`'s own kind-specific overrides and
/// interns the result, per the `apply_style` contract.
pub fn apply_style(tree: &mut NodeTree, node: NodeId, parent_style: ElementStyle) -> microweb_style::StyleHandle {
    let kind = tree.get(node).kind;
    let style = match (kind, &tree.get(node).payload) {
        (NodeKind::Link, _) => {
            let mut s = parent_style;
            s.font_style |= FontStyle::UNDERLINE;
            s.is_link = true;
            s
        }
        (NodeKind::Style, NodePayload::Style(p)) => {
            let mut s = parent_style;
            s.font_style |= p.override_mask;
            if let Some(a) = p.override_alignment {
                s = s.with_alignment(a);
            }
            if let Some(level) = p.heading_level {
                s = s.with_heading_level(level);
            }
            s
        }
        _ => parent_style,
    };
    tree.intern_style(style)
}

/// Returns the innermost pickable descendant of `node` under page-local
/// point `(x, y)`, or `node` itself when no child matches and `node`'s own
/// box contains the point. Non-visual kinds (Section, Style, Form) never
/// match themselves but still recurse into children.
pub fn pick(tree: &NodeTree, node: NodeId, x: i32, y: i32) -> Option<NodeId> {
    let record = tree.get(node);
    let anchor = record.anchor;
    let size = record.size;
    let inside = x >= anchor.x && x < anchor.x + size.width && y >= anchor.y && y < anchor.y + size.height;
    if !inside {
        return None;
    }
    for child in tree.children(node) {
        if let Some(hit) = pick(tree, child, x, y) {
            return Some(hit);
        }
    }
    if record.kind.is_non_visual() {
        None
    } else {
        Some(node)
    }
}

/// Paints `node` itself (not its children — the renderer recurses). `ctx`
/// is already translated/clipped for the node's containing block.
pub fn paint(tree: &NodeTree, assets: &AssetPack, colors: &ColorScheme, node: NodeId, ctx: &mut DrawContext<'_>) {
    let record = tree.get(node);
    let style = tree.style_of(node);
    let (x, y) = (record.anchor.x, record.anchor.y);

    match &record.payload {
        NodePayload::SubText(sub) => {
            if let Some(parent) = record.parent {
                if let NodePayload::Text(text) = &tree.get(parent).payload {
                    let start = sub.start as usize;
                    let end = (start + sub.length as usize).min(text.text.len());
                    let slice = &text.text[start..end];
                    let font = font_for_style(assets, style);
                    let color = if style.is_link { colors.link } else { colors.text };
                    ctx.draw_string(
                        font,
                        slice,
                        x,
                        y,
                        color,
                        style.font_style.contains(FontStyle::BOLD),
                        style.font_style.contains(FontStyle::ITALIC),
                        style.font_style.contains(FontStyle::UNDERLINE),
                    );
                }
            }
        }
        NodePayload::Break(b) => {
            if b.rule {
                ctx.hline(x, y, record.size.width, colors.text);
            }
        }
        NodePayload::Image(img) => match img.state {
            ImageState::FinishedDownloadingContent => {
                // The decoded bitmap itself lives with the asset/resource
                // cache, not the node; callers that have it blit directly.
            }
            _ => {
                ctx.fill_rect(x, y, record.size.width, record.size.height, colors.page_background);
                ctx.blit_image(&assets.image_icon, x, y, colors.text);
            }
        },
        NodePayload::Button(b) => {
            ctx.fill_rect(x, y, record.size.width, record.size.height, colors.button);
            let font = font_for_style(assets, style);
            ctx.draw_string(font, &b.label, x + 2, y + 2, colors.text, false, false, false);
        }
        NodePayload::TextField(f) => {
            ctx.fill_rect(x, y, record.size.width, record.size.height, colors.page_background);
            let font = font_for_style(assets, style);
            let visible: String = f.buffer.chars().skip(f.shift_offset.max(0) as usize).collect();
            ctx.draw_string(font, &visible, x + 1, y + 1, colors.text, false, false, false);
        }
        NodePayload::CheckBox(c) => {
            ctx.fill_rect(x, y, record.size.width, record.size.height, colors.page_background);
            if c.checked {
                ctx.fill_rect(x + 1, y + 1, (record.size.width - 2).max(0), (record.size.height - 2).max(0), colors.text);
            }
        }
        NodePayload::ScrollBar(s) => {
            ctx.vertical_scrollbar(x, y, record.size.height, s.scroll_position, s.thumb_size, colors.page_background, colors.button);
        }
        NodePayload::StatusBar(s) => {
            let font = font_for_style(assets, style);
            ctx.fill_rect(x, y, record.size.width, record.size.height, colors.page_background);
            ctx.draw_string(font, s.displayed(), x, y, colors.text, false, false, false);
        }
        _ => {}
    }

    if record.focused {
        ctx.invert_rect(x, y, record.size.width.max(1), record.size.height.max(1));
    }
}

/// Applies `clip` to `ctx`, the way the renderer does before calling
/// [`paint`] for a node whose containing block is smaller than the page.
pub fn clip_for(x: i32, y: i32, w: i32, h: i32) -> ClipRect {
    ClipRect { left: x, top: y, right: x + w, bottom: y + h }
}

fn font_for_style<'a>(assets: &'a AssetPack, style: ElementStyle) -> &'a microweb_draw::Font {
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

/// Picks the leaf under `(x, y)` inside a Link's own subtree and, if it is
/// an `ismap` Image, returns it along with its natural dimensions (§4.3
/// "Link": image-map coordinates are only meaningful against an `ismap`
/// image descendant, never the link's own box).
fn ismap_leaf(tree: &NodeTree, node: NodeId, x: i32, y: i32) -> Option<(NodeId, i32, i32)> {
    let leaf = pick(tree, node, x, y).filter(|&l| l != node)?;
    match &tree.get(leaf).payload {
        NodePayload::Image(img) if img.ismap => Some((leaf, img.natural_width, img.natural_height)),
        _ => None,
    }
}

/// Walks descendant `SubText`/`Image` leaves of a Link and sets their own
/// `focused` flag, so the generic paint-time invert highlights each leaf's
/// box individually rather than the (non-visual, zero-sized) Link node.
fn set_link_highlight(tree: &mut NodeTree, node: NodeId, on: bool) {
    for child in tree.children(node) {
        if matches!(tree.get(child).kind, NodeKind::SubText | NodeKind::Image) {
            tree.get_mut(child).focused = on;
        }
        set_link_highlight(tree, child, on);
    }
}

/// Walks from `node` up to (and including) the nearest enclosing `Link`,
/// the way a click on a link's rendered text or image needs to resolve to
/// the `Link` itself rather than whichever `SubText`/`Image` leaf `pick`
/// returned (§4.3 "Link" is the interactive element; its children are
/// just its rendering).
pub fn enclosing_link(tree: &NodeTree, node: NodeId) -> Option<NodeId> {
    let mut cur = Some(node);
    while let Some(id) = cur {
        if tree.get(id).kind == NodeKind::Link {
            return Some(id);
        }
        cur = tree.get(id).parent;
    }
    None
}

/// Walks up from `node` to find the enclosing `Form`, the way a
/// `Button`/`TextField` submit handler locates the container it belongs to
/// (§4.3 "Form": "triggered by Button callback or TextField Enter").
fn enclosing_form(tree: &NodeTree, node: NodeId) -> Option<NodeId> {
    let mut cur = tree.get(node).parent;
    while let Some(id) = cur {
        if tree.get(id).kind == NodeKind::Form {
            return Some(id);
        }
        cur = tree.get(id).parent;
    }
    None
}

/// Dispatches `event` to `node`'s kind-specific handler. Returns `true`
/// when the event was consumed, alongside any intent the caller must act
/// on (navigation, status updates, scroll commits, form submission).
pub fn handle_event(tree: &mut NodeTree, node: NodeId, event: NodeEvent) -> (bool, Option<NodeAction>) {
    let kind = tree.get(node).kind;
    match (kind, event) {
        (NodeKind::Link, NodeEvent::MouseClick { x, y }) => {
            let href = match &tree.get(node).payload {
                NodePayload::Link(l) => l.href.clone(),
                _ => return (false, None),
            };
            let url = match ismap_leaf(tree, node, x, y) {
                Some((leaf, nat_w, nat_h)) => {
                    let record = tree.get(leaf);
                    let local_x = (x - record.anchor.x).max(0);
                    let local_y = (y - record.anchor.y).max(0);
                    let disp_w = record.size.width.max(1);
                    let disp_h = record.size.height.max(1);
                    let (src_w, src_h) = if nat_w > 0 && nat_h > 0 { (nat_w, nat_h) } else { (disp_w, disp_h) };
                    let scaled_x = local_x * src_w / disp_w;
                    let scaled_y = local_y * src_h / disp_h;
                    format!("{href}?{scaled_x},{scaled_y}")
                }
                None => href,
            };
            (true, Some(NodeAction::Navigate { url }))
        }
        (NodeKind::Link, NodeEvent::Focus) => {
            let href = match &tree.get(node).payload {
                NodePayload::Link(l) => l.href.clone(),
                _ => return (false, None),
            };
            set_link_highlight(tree, node, true);
            (true, Some(NodeAction::SetStatus(Some(href))))
        }
        (NodeKind::Link, NodeEvent::Unfocus) => {
            set_link_highlight(tree, node, false);
            (true, Some(NodeAction::SetStatus(None)))
        }
        (NodeKind::Button, NodeEvent::MouseClick { .. }) => {
            if let NodePayload::Button(b) = &mut tree.get_mut(node).payload {
                b.pressed = true;
            }
            (true, None)
        }
        (NodeKind::Button, NodeEvent::MouseRelease { .. }) => {
            if let NodePayload::Button(b) = &mut tree.get_mut(node).payload {
                b.pressed = false;
            }
            match enclosing_form(tree, node) {
                Some(form) => (true, Some(NodeAction::RequestFormSubmit { form })),
                None => (true, None),
            }
        }
        (NodeKind::CheckBox, NodeEvent::MouseClick { .. }) => {
            if let NodePayload::CheckBox(c) = &mut tree.get_mut(node).payload {
                c.checked = !c.checked;
            }
            (true, None)
        }
        (NodeKind::TextField, NodeEvent::Focus) => {
            tree.get_mut(node).focused = true;
            (true, None)
        }
        (NodeKind::TextField, NodeEvent::Unfocus) => {
            tree.get_mut(node).focused = false;
            (true, None)
        }
        (NodeKind::TextField, NodeEvent::KeyPress(key)) => handle_text_field_key(tree, node, key),
        (NodeKind::ScrollBar, NodeEvent::MouseClick { y, .. }) => {
            begin_scroll_drag(tree, node, y);
            (true, None)
        }
        (NodeKind::ScrollBar, NodeEvent::MouseDrag { y, .. }) => {
            let anchor_y = tree.get(node).anchor.y;
            if let NodePayload::ScrollBar(s) = &mut tree.get_mut(node).payload {
                if s.dragging {
                    let candidate = y - anchor_y - s.start_drag_offset;
                    s.scroll_position = candidate.clamp(0, s.max_scroll);
                }
            }
            (true, None)
        }
        (NodeKind::ScrollBar, NodeEvent::MouseRelease { .. }) => {
            let pos = if let NodePayload::ScrollBar(s) = &mut tree.get_mut(node).payload {
                s.dragging = false;
                s.scroll_position
            } else {
                return (false, None);
            };
            (true, Some(NodeAction::ScrollTo(pos)))
        }
        (NodeKind::Select, NodeEvent::MouseClick { .. }) => (true, None),
        _ => (false, None),
    }
}

/// Begins a scrollbar drag: captures `startDragOffset = clickY - node.y -
/// thumbTop` per §4.3 "ScrollBar".
pub fn begin_scroll_drag(tree: &mut NodeTree, node: NodeId, click_y: i32) {
    let anchor_y = tree.get(node).anchor.y;
    if let NodePayload::ScrollBar(s) = &mut tree.get_mut(node).payload {
        let thumb_top = s.scroll_position;
        s.dragging = true;
        s.start_drag_offset = click_y - anchor_y - thumb_top;
    }
}

fn handle_text_field_key(tree: &mut NodeTree, node: NodeId, key: Key) -> (bool, Option<NodeAction>) {
    let field = match &mut tree.get_mut(node).payload {
        NodePayload::TextField(f) => f,
        _ => return (false, None),
    };
    match key {
        Key::Home => {
            field.cursor = 0;
            field.selection = None;
        }
        Key::End => {
            field.cursor = field.buffer.chars().count();
            field.selection = None;
        }
        Key::Left => {
            field.cursor = field.cursor.saturating_sub(1);
            field.selection = None;
        }
        Key::Right => {
            field.cursor = (field.cursor + 1).min(field.buffer.chars().count());
            field.selection = None;
        }
        Key::Backspace => {
            if field.selection.is_some() {
                field.replace_selection_or_insert_at_cursor("");
            } else if field.cursor > 0 {
                let start = field.cursor - 1;
                let (byte_start, byte_end) = char_byte_range(&field.buffer, start, field.cursor);
                field.buffer.replace_range(byte_start..byte_end, "");
                field.cursor = start;
            }
        }
        Key::Delete => {
            if field.selection.is_some() {
                field.replace_selection_or_insert_at_cursor("");
            } else {
                let len = field.buffer.chars().count();
                if field.cursor < len {
                    let (byte_start, byte_end) = char_byte_range(&field.buffer, field.cursor, field.cursor + 1);
                    field.buffer.replace_range(byte_start..byte_end, "");
                }
            }
        }
        Key::Char(ch) => {
            let mut buf = [0u8; 4];
            field.replace_selection_or_insert_at_cursor(ch.encode_utf8(&mut buf));
        }
        Key::Enter => {
            return match enclosing_form(tree, node) {
                Some(form) => (true, Some(NodeAction::RequestFormSubmit { form })),
                None => (true, None),
            };
        }
    }
    (true, None)
}

fn char_byte_range(s: &str, start: usize, end: usize) -> (usize, usize) {
    let mut indices = s.char_indices().map(|(b, _)| b).chain(std::iter::once(s.len()));
    let mut byte_start = s.len();
    let mut byte_end = s.len();
    for (i, b) in indices.by_ref().enumerate() {
        if i == start {
            byte_start = b;
        }
        if i == end {
            byte_end = b;
            break;
        }
    }
    (byte_start, byte_end)
}

/// Collects `(name, value)` pairs from a `Form`'s subtree and builds the
/// `?k1=v1&k2=v2...` query string per §4.3 "Form" (spaces mapped to `+`).
pub fn collect_form_query(tree: &NodeTree, form: NodeId) -> String {
    let mut pairs = Vec::new();
    collect_form_fields(tree, form, &mut pairs);
    let mut out = String::new();
    for (i, (k, v)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(&url_encode_space(k));
        out.push('=');
        out.push_str(&url_encode_space(v));
    }
    out
}

fn collect_form_fields(tree: &NodeTree, node: NodeId, out: &mut Vec<(String, String)>) {
    for child in tree.children(node) {
        match &tree.get(child).payload {
            NodePayload::TextField(f) => out.push((f.name.clone(), f.buffer.clone())),
            NodePayload::CheckBox(c) if c.checked => out.push(("on".to_string(), "on".to_string())),
            NodePayload::Select(s) => {
                if let Some(selected) = s.selected {
                    if let NodePayload::Option(opt) = &tree.get(selected).payload {
                        out.push((s.name.clone(), opt.value.clone()));
                    }
                }
            }
            _ => {}
        }
        collect_form_fields(tree, child, out);
    }
}

fn url_encode_space(s: &str) -> String {
    s.replace(' ', "+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use microweb_style::ElementStyle;

    fn new_tree_with_root() -> (NodeTree, NodeId) {
        let mut tree = NodeTree::new();
        let style = tree.intern_style(ElementStyle::root(7));
        let root = tree.add_section(None, style, "Document").unwrap();
        tree.set_root(root);
        (tree, root)
    }

    #[test]
    fn apply_style_on_link_forces_underline() {
        let (mut tree, root) = new_tree_with_root();
        let style = tree.style_of(root);
        let link = tree.add_link(root, tree.get(root).style, "http://example.com").unwrap();
        let handle = apply_style(&mut tree, link, style);
        assert!(tree.style(handle).font_style.contains(FontStyle::UNDERLINE));
    }

    #[test]
    fn pick_returns_innermost_visual_descendant() {
        let (mut tree, root) = new_tree_with_root();
        let style = tree.get(root).style;
        let link = tree.add_link(root, style, "http://x").unwrap();
        tree.get_mut(link).anchor = microweb_geometry::Point::new(0, 0);
        tree.get_mut(link).size = microweb_geometry::Size::new(10, 10);
        tree.get_mut(root).anchor = microweb_geometry::Point::new(0, 0);
        tree.get_mut(root).size = microweb_geometry::Size::new(100, 100);
        assert_eq!(pick(&tree, root, 5, 5), Some(link));
        assert_eq!(pick(&tree, root, 50, 50), None);
    }

    #[test]
    fn link_click_returns_navigate_action() {
        let (mut tree, root) = new_tree_with_root();
        let style = tree.get(root).style;
        let link = tree.add_link(root, style, "http://example.com/page").unwrap();
        let (consumed, action) = handle_event(&mut tree, link, NodeEvent::MouseClick { x: 0, y: 0 });
        assert!(consumed);
        assert_eq!(action, Some(NodeAction::Navigate { url: "http://example.com/page".to_string() }));
    }

    #[test]
    fn text_field_backspace_removes_preceding_char() {
        let (mut tree, root) = new_tree_with_root();
        let style = tree.get(root).style;
        let field = tree.add_text_field(root, style, "q").unwrap();
        if let NodePayload::TextField(f) = &mut tree.get_mut(field).payload {
            f.buffer = "hello".to_string();
            f.cursor = 5;
        }
        handle_event(&mut tree, field, NodeEvent::KeyPress(Key::Backspace));
        if let NodePayload::TextField(f) = &tree.get(field).payload {
            assert_eq!(f.buffer, "hell");
            assert_eq!(f.cursor, 4);
        }
    }

    #[test]
    fn form_submit_collects_checked_and_text_fields() {
        let (mut tree, root) = new_tree_with_root();
        let style = tree.get(root).style;
        let form = tree.add_form(root, style, "/submit").unwrap();
        let name = tree.add_text_field(form, style, "name").unwrap();
        if let NodePayload::TextField(f) = &mut tree.get_mut(name).payload {
            f.buffer = "a b".to_string();
        }
        tree.add_check_box(form, style, true).unwrap();
        let query = collect_form_query(&tree, form);
        assert!(query.contains("name=a+b"));
    }
}
