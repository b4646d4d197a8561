/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Page-local coordinate types shared by the node tree, the layout engine
//! and the draw surfaces.
//!
//! The node tree's anchor/size fields (§3 of the design spec) are the sole
//! authoritative geometry for a node; everything downstream reads `Point`,
//! `Size` and `Rect` defined here rather than raw integers, so a coordinate
//! can never accidentally be mixed up with a screen pixel or a font unit.

use euclid::{Point2D, Rect as EuclidRect, Size2D};

/// A unit for coordinates inside a single page (document root or interface
/// root). Page coordinates are independent of the current scroll offset;
/// the renderer subtracts the scroll position when translating to screen
/// space.
#[derive(Clone, Copy, Debug)]
pub enum PagePixel {}

pub type Point = Point2D<i32, PagePixel>;
pub type Size = Size2D<i32, PagePixel>;
pub type Rect = EuclidRect<i32, PagePixel>;

/// Builds a `Rect` the way node layout code does it throughout this engine:
/// from an anchor point and a size, not from two corners.
pub fn rect_from_anchor(anchor: Point, size: Size) -> Rect {
    Rect::new(anchor, size)
}

/// Returns `true` when `a` and `b` overlap on at least one pixel. Used by
/// the renderer to decide whether a node intersects the visible window
/// band and by hit-testing to decide whether a point is inside a box.
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.intersects(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_anchor_has_expected_corners() {
        let r = rect_from_anchor(Point::new(10, 20), Size::new(30, 40));
        assert_eq!(r.origin, Point::new(10, 20));
        assert_eq!(r.max_x(), 40);
        assert_eq!(r.max_y(), 60);
    }

    #[test]
    fn intersects_detects_overlap_and_disjoint() {
        let a = rect_from_anchor(Point::new(0, 0), Size::new(10, 10));
        let b = rect_from_anchor(Point::new(5, 5), Size::new(10, 10));
        let c = rect_from_anchor(Point::new(20, 20), Size::new(5, 5));
        assert!(intersects(a, b));
        assert!(!intersects(a, c));
    }
}
