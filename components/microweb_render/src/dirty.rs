/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The renderer's dirty state (§4.6): a dirty set of nodes and a small
//! fixed-size ring of dirty screen regions, coalesced into one bounding
//! rect once the ring overflows.

use std::collections::HashSet;

use microweb_draw::ClipRect;
use microweb_nodes::NodeId;

/// How many distinct screen regions the ring tracks before it gives up
/// and coalesces everything into a single bounding rectangle.
const REGION_RING_CAPACITY: usize = 8;

fn union(a: ClipRect, b: ClipRect) -> ClipRect {
    ClipRect {
        left: a.left.min(b.left),
        top: a.top.min(b.top),
        right: a.right.max(b.right),
        bottom: a.bottom.max(b.bottom),
    }
}

/// A bounded ring of dirty screen rectangles. Pushing past capacity
/// collapses the whole ring into its bounding rect rather than growing
/// without limit — a constrained target can't afford an unbounded dirty
/// list.
#[derive(Default)]
pub struct DirtyRegions {
    regions: Vec<ClipRect>,
    coalesced: bool,
}

impl DirtyRegions {
    pub fn new() -> Self {
        DirtyRegions::default()
    }

    pub fn push(&mut self, rect: ClipRect) {
        if rect.is_empty() {
            return;
        }
        if self.coalesced {
            self.regions[0] = union(self.regions[0], rect);
            return;
        }
        self.regions.push(rect);
        if self.regions.len() > REGION_RING_CAPACITY {
            let bound = self.regions.iter().copied().reduce(union).unwrap();
            self.regions.clear();
            self.regions.push(bound);
            self.coalesced = true;
        }
    }

    pub fn regions(&self) -> &[ClipRect] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
        self.coalesced = false;
    }
}

/// The node half of dirty tracking: a plain set, since node identity is
/// already a small stable handle (§4.6: "bitset keyed by insertion order
/// in the arena, or equivalent" — a `HashSet<NodeId>` is that equivalent,
/// without assuming dense, never-reset arena slot numbers).
#[derive(Default)]
pub struct DirtyNodes {
    nodes: HashSet<NodeId>,
    all: bool,
}

impl DirtyNodes {
    pub fn new() -> Self {
        DirtyNodes::default()
    }

    pub fn mark(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    pub fn mark_all(&mut self) {
        self.all = true;
    }

    pub fn is_dirty(&self, node: NodeId) -> bool {
        self.all || self.nodes.contains(&node)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.all = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_coalesces_once_capacity_is_exceeded() {
        let mut regions = DirtyRegions::new();
        for i in 0..(REGION_RING_CAPACITY as i32 + 1) {
            regions.push(ClipRect { left: i, top: i, right: i + 1, bottom: i + 1 });
        }
        assert_eq!(regions.regions().len(), 1);
        let bound = regions.regions()[0];
        assert_eq!(bound.left, 0);
        assert_eq!(bound.right, REGION_RING_CAPACITY as i32 + 1);
    }

    #[test]
    fn empty_rects_are_ignored() {
        let mut regions = DirtyRegions::new();
        regions.push(ClipRect { left: 5, top: 5, right: 5, bottom: 10 });
        assert!(regions.is_empty());
    }

    #[test]
    fn mark_all_makes_every_node_dirty() {
        let mut tree = microweb_nodes::NodeTree::new();
        let style = tree.intern_style(microweb_style::ElementStyle::root(1));
        let node = tree.add_section(None, style, "Document").unwrap();
        let mut nodes = DirtyNodes::new();
        nodes.mark_all();
        assert!(nodes.is_dirty(node));
    }

    #[test]
    fn unmarked_node_is_not_dirty() {
        let mut tree = microweb_nodes::NodeTree::new();
        let style = tree.intern_style(microweb_style::ElementStyle::root(1));
        let node = tree.add_section(None, style, "Document").unwrap();
        let nodes = DirtyNodes::new();
        assert!(!nodes.is_dirty(node));
    }
}
