// src/geometry.rs
//
// Pure rectangle math for detection gating and track matching.
// All coordinates live in one camera-frame pixel space; callers convert
// display coordinates at the boundary.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle. Ratio/area computations require positive
/// dimensions; degenerate rectangles are rejected by `is_valid`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Bounding rectangle of four corner points. Returns `None` when the
    /// points collapse to a degenerate box.
    pub fn from_corners(corners: &[(f32, f32); 4]) -> Option<Self> {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for &(px, py) in corners {
            min_x = min_x.min(px);
            min_y = min_y.min(py);
            max_x = max_x.max(px);
            max_y = max_y.max(py);
        }
        let rect = Self::new(min_x, min_y, max_x - min_x, max_y - min_y);
        rect.is_valid().then_some(rect)
    }
}

/// Intersection-over-union of two rectangles, in [0, 1].
///
/// Disjoint rectangles yield exactly 0, identical rectangles exactly 1.
/// Symmetric in its arguments. Degenerate inputs yield 0 rather than NaN.
pub fn overlap_ratio(a: &Rect, b: &Rect) -> f32 {
    if !a.is_valid() || !b.is_valid() {
        return 0.0;
    }

    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter <= 0.0 {
        return 0.0;
    }

    let union = a.area() + b.area() - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}

/// Region of interest gating which detections are eligible at all.
/// Static per session, derived from display geometry by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Roi {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Inclusive bounds test: a point exactly on the edge is contained.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left
            && x <= self.left + self.width
            && y >= self.top
            && y <= self.top + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_partial() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        let score = overlap_ratio(&a, &b);
        assert!((score - 2500.0 / 17500.0).abs() < 1e-4);
    }

    #[test]
    fn overlap_disjoint_is_zero() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(100.0, 100.0, 50.0, 50.0);
        assert_eq!(overlap_ratio(&a, &b), 0.0);
    }

    #[test]
    fn overlap_identical_is_one() {
        let a = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(overlap_ratio(&a, &a), 1.0);
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Rect::new(0.0, 0.0, 80.0, 60.0);
        let b = Rect::new(40.0, 20.0, 80.0, 60.0);
        assert_eq!(overlap_ratio(&a, &b), overlap_ratio(&b, &a));
    }

    #[test]
    fn overlap_bounds() {
        let cases = [
            (Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(5.0, 5.0, 10.0, 10.0)),
            (Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(2.0, 2.0, 4.0, 4.0)),
            (Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(0.5, 0.0, 1.0, 1.0)),
        ];
        for (a, b) in &cases {
            let score = overlap_ratio(a, b);
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn overlap_rejects_degenerate_rects() {
        let a = Rect::new(0.0, 0.0, 0.0, 10.0);
        let b = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(overlap_ratio(&a, &b), 0.0);
        assert_eq!(overlap_ratio(&b, &a), 0.0);
    }

    #[test]
    fn roi_contains_edge_points() {
        let roi = Roi::new(100.0, 100.0, 200.0, 200.0);
        assert!(roi.contains(100.0, 100.0));
        assert!(roi.contains(300.0, 300.0));
        assert!(roi.contains(100.0, 300.0));
        assert!(roi.contains(175.0, 175.0));
        assert!(!roi.contains(99.9, 175.0));
        assert!(!roi.contains(175.0, 300.1));
    }

    #[test]
    fn rect_from_corners() {
        let corners = [(10.0, 20.0), (60.0, 20.0), (60.0, 80.0), (10.0, 80.0)];
        let rect = Rect::from_corners(&corners).expect("corners span a box");
        assert_eq!(rect, Rect::new(10.0, 20.0, 50.0, 60.0));

        let collapsed = [(5.0, 5.0); 4];
        assert!(Rect::from_corners(&collapsed).is_none());
    }
}
