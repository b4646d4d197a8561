/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The page renderer (§4.6): scrolls the viewport by bit-blit where
//! possible, repaints exposed bands, and sweeps the dirty set against the
//! visible window. One `PageRenderer` per root (document or interface);
//! the two are independent, matching §3's "two independent roots" split.

use microweb_assets::AssetPack;
use microweb_draw::{ClipRect, ColorScheme, DrawContext};
use microweb_geometry::{rect_from_anchor, Rect};
use microweb_nodes::{NodeId, NodeTree};

use crate::dirty::{DirtyNodes, DirtyRegions};

/// What a scroll-position change requires of the caller, per §4.6 step 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Scroll position did not change; nothing to do.
    Unchanged,
    /// `|delta| < window_height`: bit-blit the band by `delta`, then
    /// repaint only `exposed` (already pushed into the renderer's dirty
    /// regions by `set_scroll`).
    Band { delta: i32, exposed: ClipRect },
    /// `|delta| >= window_height`: no scroll-blit is worthwhile; the whole
    /// window has been marked dirty instead.
    Full,
}

/// Maintains the dirty set of nodes and screen regions, the scroll
/// position, and the paused flag (§4.6) for one root.
pub struct PageRenderer {
    scroll_y: i32,
    paused: bool,
    dirty_nodes: DirtyNodes,
    dirty_regions: DirtyRegions,
}

impl PageRenderer {
    pub fn new() -> Self {
        PageRenderer {
            scroll_y: 0,
            paused: false,
            dirty_nodes: DirtyNodes::new(),
            dirty_regions: DirtyRegions::new(),
        }
    }

    pub fn scroll_y(&self) -> i32 {
        self.scroll_y
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Opens a transient overlay (e.g. a Select drop-down): subsequent
    /// ticks are skipped until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn mark_node_dirty(&mut self, node: NodeId) {
        self.dirty_nodes.mark(node);
    }

    pub fn mark_region_dirty(&mut self, rect: ClipRect) {
        self.dirty_regions.push(rect);
    }

    /// Marks the whole window dirty: every node sweep during the next
    /// `paint` will match regardless of its individual dirty bit.
    pub fn mark_all_dirty(&mut self) {
        self.dirty_nodes.mark_all();
    }

    /// Resets scroll position and all dirty state; called by the load
    /// coordinator's cancellation path (§5) alongside the arena reset.
    pub fn reset(&mut self) {
        self.scroll_y = 0;
        self.paused = false;
        self.dirty_nodes.clear();
        self.dirty_regions.clear();
    }

    /// Applies a new scroll position, per §4.6 step 1: a small delta is
    /// handled by bit-blitting the band and dirtying only what the blit
    /// exposed; a delta as large as the window gives up on blitting and
    /// dirties everything.
    pub fn set_scroll(&mut self, new_y: i32, window_width: i32, window_height: i32) -> ScrollOutcome {
        let delta = new_y - self.scroll_y;
        self.scroll_y = new_y;
        if delta == 0 {
            return ScrollOutcome::Unchanged;
        }
        if delta.abs() < window_height {
            let exposed = if delta > 0 {
                ClipRect { left: 0, top: window_height - delta, right: window_width, bottom: window_height }
            } else {
                ClipRect { left: 0, top: 0, right: window_width, bottom: -delta }
            };
            self.dirty_regions.push(exposed);
            ScrollOutcome::Band { delta, exposed }
        } else {
            self.mark_all_dirty();
            ScrollOutcome::Full
        }
    }

    /// The per-tick paint sweep (§4.6 steps 2-3): walks the tree in
    /// document order, painting any node that is dirty (or swept up by a
    /// `mark_all_dirty`) and intersects the visible band, then always
    /// recurses into children so a dirty container's un-dirtied children
    /// still get composited. No-op while `paused`.
    ///
    /// `window` is the visible window in screen coordinates; `origin_y` is
    /// how a page-local y maps onto that screen space (`y_screen = y_page
    /// + origin_y`). Pass `0` for the (unscrolled, unoffset) interface
    /// root; a document root that starts `window.origin.y` pixels down
    /// and is scrolled by `scroll_y` page pixels needs `window.origin.y -
    /// scroll_y`.
    pub fn paint(
        &mut self,
        tree: &NodeTree,
        assets: &AssetPack,
        colors: &ColorScheme,
        root: NodeId,
        ctx: &mut DrawContext<'_>,
        window: Rect,
        origin_y: i32,
    ) {
        if self.paused {
            return;
        }
        let page_window = Rect::new(
            microweb_geometry::Point::new(window.origin.x, window.origin.y - origin_y),
            window.size,
        );
        self.walk_paint(tree, assets, colors, root, ctx, page_window, origin_y);
        self.dirty_nodes.clear();
        self.dirty_regions.clear();
    }

    fn walk_paint(
        &self,
        tree: &NodeTree,
        assets: &AssetPack,
        colors: &ColorScheme,
        node: NodeId,
        ctx: &mut DrawContext<'_>,
        page_window: Rect,
        origin_y: i32,
    ) {
        let record = tree.get(node);
        if record.size.width == 0 && record.size.height == 0 && !record.kind.is_non_visual() {
            // §3 invariant: size is zero until layout has completed; never
            // paint a not-yet-laid-out node.
            return;
        }
        let node_rect = rect_from_anchor(record.anchor, record.size);
        if microweb_geometry::intersects(node_rect, page_window) {
            if self.dirty_nodes.is_dirty(node) {
                let clip = to_clip(node_rect).restricted(to_clip(page_window));
                let mut sub = ctx.restrict(clip);
                sub.draw_offset_y = origin_y;
                microweb_nodes::paint(tree, assets, colors, node, &mut sub);
            }
            for child in tree.children(node) {
                self.walk_paint(tree, assets, colors, child, ctx, page_window, origin_y);
            }
        }
    }

    /// Hit-tests screen coordinates (`origin_y` converts a screen y to
    /// page-local the same way `paint` converts page-local to screen).
    pub fn pick(&self, tree: &NodeTree, root: NodeId, screen_x: i32, screen_y: i32, origin_y: i32) -> Option<NodeId> {
        microweb_nodes::pick(tree, root, screen_x, screen_y - origin_y)
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_clip(r: Rect) -> ClipRect {
    ClipRect {
        left: r.origin.x,
        top: r.origin.y,
        right: r.origin.x + r.size.width,
        bottom: r.origin.y + r.size.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microweb_draw::Surface8bpp;
    use microweb_style::ElementStyle;

    fn fixture_assets() -> AssetPack {
        AssetPack::load(&microweb_assets::test_fixture_pack()).unwrap()
    }

    fn tree_with_text() -> (NodeTree, NodeId, NodeId) {
        let mut tree = NodeTree::new();
        let style = tree.intern_style(ElementStyle::root(1));
        let root = tree.add_section(None, style, "Document").unwrap();
        tree.set_root(root);
        let text = tree.add_text(root, style, "hi").unwrap();
        tree.get_mut(text).anchor = microweb_geometry::Point::new(0, 0);
        tree.get_mut(text).size = microweb_geometry::Size::new(10, 8);
        (tree, root, text)
    }

    #[test]
    fn small_scroll_delta_yields_a_band_outcome() {
        let mut renderer = PageRenderer::new();
        let outcome = renderer.set_scroll(10, 320, 200);
        assert_eq!(outcome, ScrollOutcome::Band { delta: 10, exposed: ClipRect { left: 0, top: 190, right: 320, bottom: 200 } });
    }

    #[test]
    fn large_scroll_delta_marks_everything_dirty() {
        let mut renderer = PageRenderer::new();
        let outcome = renderer.set_scroll(500, 320, 200);
        assert_eq!(outcome, ScrollOutcome::Full);
        let (tree, _root, text) = tree_with_text();
        assert!(renderer.dirty_nodes.is_dirty(text));
    }

    #[test]
    fn paint_is_skipped_entirely_while_paused() {
        let (tree, root, text) = tree_with_text();
        let assets = fixture_assets();
        let colors = ColorScheme::monochrome();
        let mut surface = Surface8bpp::new(100, 100);
        let mut ctx = DrawContext::new(&mut surface);
        let mut renderer = PageRenderer::new();
        renderer.pause();
        renderer.mark_node_dirty(text);
        let window = Rect::new(microweb_geometry::Point::new(0, 0), microweb_geometry::Size::new(100, 100));
        renderer.paint(&tree, &assets, &colors, root, &mut ctx, window, 0);
        assert!(renderer.dirty_nodes.is_dirty(text));
    }

    #[test]
    fn pick_translates_screen_y_by_origin() {
        let (tree, root, text) = tree_with_text();
        let renderer = PageRenderer::new();
        assert_eq!(renderer.pick(&tree, root, 2, 50, -48), Some(text));
    }
}
