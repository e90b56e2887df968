//! Viewport rectangles.
//!
//! Every rectangle handled by the overlay core is an immutable snapshot in viewport pixels,
//! recomputed on demand from the host (or the document engine) and never cached across
//! renders.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in viewport pixels.
///
/// All six edges/extents are stored so that callers can pass through whatever their platform
/// reports (DOM `getBoundingClientRect`, native view frames, ...) without re-deriving them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top edge (y of the upper side).
    pub top: f64,
    /// Left edge (x of the left side).
    pub left: f64,
    /// Right edge (`left + width`).
    pub right: f64,
    /// Bottom edge (`top + height`).
    pub bottom: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its origin and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            right: left + width,
            bottom: top + height,
            width,
            height,
        }
    }

    /// Create a rectangle from its four edges.
    ///
    /// Edges are normalized so that `left <= right` and `top <= bottom`.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        let (left, right) = if left <= right {
            (left, right)
        } else {
            (right, left)
        };
        let (top, bottom) = if top <= bottom {
            (top, bottom)
        } else {
            (bottom, top)
        };
        Self::new(left, top, right - left, bottom - top)
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Bounding box of a sequence of rectangles (`None` for an empty sequence).
    pub fn bounding<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects
            .into_iter()
            .fold(None, |acc: Option<Rect>, r| match acc {
                Some(acc) => Some(acc.union(r)),
                None => Some(*r),
            })
    }

    /// Returns `true` if the point lies inside the rectangle (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// The same rectangle moved by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_edges_normalizes() {
        let r = Rect::from_edges(30.0, 40.0, 10.0, 20.0);
        assert_eq!(r, Rect::new(10.0, 20.0, 20.0, 20.0));
    }

    #[test]
    fn test_bounding_box_of_runs() {
        let runs = [
            Rect::new(100.0, 10.0, 50.0, 16.0),
            Rect::new(0.0, 26.0, 80.0, 16.0),
        ];
        let bbox = Rect::bounding(&runs).unwrap();
        assert_eq!(bbox, Rect::from_edges(0.0, 10.0, 150.0, 42.0));
        assert!(Rect::bounding(&[]).is_none());
    }

    #[test]
    fn test_contains_point_edges_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_point(10.0, 10.0));
        assert!(!r.contains_point(10.5, 3.0));
    }
}
