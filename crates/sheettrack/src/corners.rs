//! Canonical corner ordering.
//!
//! Image coordinates are y-down. The top-left corner minimizes `x + y`, the
//! bottom-right maximizes it; the top-right minimizes `y - x` and the
//! bottom-left maximizes it.

/// Quadrilateral corners in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Quad {
    pub tl: [f64; 2],
    pub tr: [f64; 2],
    pub br: [f64; 2],
    pub bl: [f64; 2],
}

impl Quad {
    /// Canonically order four corners given in any order.
    pub fn from_unordered(points: [[f64; 2]; 4]) -> Self {
        // Four points never yield None.
        order_points(&points).unwrap_or(Self {
            tl: points[0],
            tr: points[1],
            br: points[2],
            bl: points[3],
        })
    }

    /// Corners as `[tl, tr, br, bl]`.
    pub fn to_array(&self) -> [[f64; 2]; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    /// True when no two corners coincide.
    pub fn has_distinct_corners(&self) -> bool {
        let c = self.to_array();
        for i in 0..4 {
            for j in (i + 1)..4 {
                if c[i] == c[j] {
                    return false;
                }
            }
        }
        true
    }
}

/// Pick the four extreme points of `points` by the sum/difference rule.
///
/// With more than four inputs this selects the extreme corners of the set;
/// ties keep the first point encountered. Returns `None` for an empty slice.
pub fn order_points(points: &[[f64; 2]]) -> Option<Quad> {
    let first = *points.first()?;
    let sum = |p: [f64; 2]| p[0] + p[1];
    let diff = |p: [f64; 2]| p[1] - p[0];

    let (mut tl, mut br, mut tr, mut bl) = (first, first, first, first);
    for &p in &points[1..] {
        if sum(p) < sum(tl) {
            tl = p;
        }
        if sum(p) > sum(br) {
            br = p;
        }
        if diff(p) < diff(tr) {
            tr = p;
        }
        if diff(p) > diff(bl) {
            bl = p;
        }
    }
    Some(Quad { tl, tr, br, bl })
}
