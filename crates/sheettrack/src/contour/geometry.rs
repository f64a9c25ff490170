//! Planar polygon primitives over `[f64; 2]` point lists.
//!
//! Closed polygons are given as vertex lists without a repeated endpoint.

type Point = [f64; 2];

#[inline]
fn sub(a: Point, b: Point) -> Point {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

#[inline]
fn dist(a: Point, b: Point) -> f64 {
    let d = sub(a, b);
    (d[0] * d[0] + d[1] * d[1]).sqrt()
}

/// Signed shoelace area (positive for counter-clockwise in a y-up frame).
pub fn signed_area(poly: &[Point]) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        acc += a[0] * b[1] - b[0] * a[1];
    }
    0.5 * acc
}

/// Enclosed area of a closed polygon.
pub fn polygon_area(poly: &[Point]) -> f64 {
    signed_area(poly).abs()
}

/// Length of the closed boundary through `poly`.
pub fn perimeter(poly: &[Point]) -> f64 {
    let n = poly.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| dist(poly[i], poly[(i + 1) % n])).sum()
}

/// Raw polygon moments `(m00, m10, m01)` via Green's theorem.
///
/// Signs follow the winding; ratios `m10/m00`, `m01/m00` do not depend on it.
pub fn polygon_moments(poly: &[Point]) -> (f64, f64, f64) {
    let n = poly.len();
    if n < 3 {
        return (0.0, 0.0, 0.0);
    }
    let (mut m00, mut m10, mut m01) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let c = a[0] * b[1] - b[0] * a[1];
        m00 += c;
        m10 += (a[0] + b[0]) * c;
        m01 += (a[1] + b[1]) * c;
    }
    (m00 / 2.0, m10 / 6.0, m01 / 6.0)
}

/// Axis-aligned bounding box corners of an integer-grid point set,
/// `(x, y), (x+w, y), (x+w, y+h), (x, y+h)` with `w = max-min+1`.
pub fn bounding_rect(points: &[Point]) -> Option<[Point; 4]> {
    let first = points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first[0], first[1], first[0], first[1]);
    for p in &points[1..] {
        x0 = x0.min(p[0]);
        y0 = y0.min(p[1]);
        x1 = x1.max(p[0]);
        y1 = y1.max(p[1]);
    }
    let (x0, y0) = (x0.floor(), y0.floor());
    let w = x1.floor() - x0 + 1.0;
    let h = y1.floor() - y0 + 1.0;
    Some([[x0, y0], [x0 + w, y0], [x0 + w, y0 + h], [x0, y0 + h]])
}

/// Distance from `p` to the infinite line through `a` and `b`.
fn line_distance(p: Point, a: Point, b: Point) -> f64 {
    let len = dist(a, b);
    if len < 1e-12 {
        return dist(p, a);
    }
    cross(a, b, p).abs() / len
}

fn farthest_from(curve: &[Point], from: usize) -> usize {
    let origin = curve[from];
    let mut best = from;
    let mut best_d = -1.0;
    for (i, &p) in curve.iter().enumerate() {
        let d = dist(origin, p);
        if d > best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

/// Keep-mask Douglas-Peucker over an open chain; endpoints are always kept.
fn simplify_open(chain: &[Point], epsilon: f64) -> Vec<Point> {
    let n = chain.len();
    if n <= 2 {
        return chain.to_vec();
    }
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let mut idx = lo;
        let mut max_d = -1.0;
        for (i, &p) in chain.iter().enumerate().take(hi).skip(lo + 1) {
            let d = line_distance(p, chain[lo], chain[hi]);
            if d > max_d {
                max_d = d;
                idx = i;
            }
        }
        if max_d > epsilon {
            keep[idx] = true;
            stack.push((lo, idx));
            stack.push((idx, hi));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

/// Douglas-Peucker simplification of a closed curve.
///
/// The curve is split at a pair of mutually distant points (found by a few
/// farthest-point hops from the first sample, so the split does not depend on
/// where border following happened to start) and each half is simplified
/// independently. Returns the kept vertices as a closed polygon.
pub fn approx_polygon_dp(curve: &[Point], epsilon: f64) -> Vec<Point> {
    let n = curve.len();
    if n < 3 {
        return curve.to_vec();
    }

    let mut a = 0usize;
    let mut b = farthest_from(curve, a);
    for _ in 0..2 {
        let next = farthest_from(curve, b);
        if next == a {
            break;
        }
        a = b;
        b = next;
    }
    if dist(curve[a], curve[b]) <= epsilon {
        return vec![curve[a]];
    }

    let (i, j) = if a < b { (a, b) } else { (b, a) };
    let first: Vec<Point> = curve[i..=j].to_vec();
    let second: Vec<Point> = curve[j..].iter().chain(&curve[..=i]).copied().collect();

    let mut out = simplify_open(&first, epsilon);
    out.pop();
    let mut tail = simplify_open(&second, epsilon);
    tail.pop();
    out.extend(tail);
    out
}

/// Convex hull of a pixel point set.
///
/// Points are snapped to the integer pixel grid (border-following contours
/// already are) and non-finite points are ignored.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pixels: Vec<imageproc::point::Point<i64>> = points
        .iter()
        .filter(|p| p[0].is_finite() && p[1].is_finite())
        .map(|p| imageproc::point::Point::new(p[0].round() as i64, p[1].round() as i64))
        .collect();
    pixels.sort_by_key(|p| (p.x, p.y));
    pixels.dedup();
    if pixels.len() < 3 {
        return pixels.iter().map(|p| [p.x as f64, p.y as f64]).collect();
    }
    imageproc::geometry::convex_hull(pixels.as_slice())
        .into_iter()
        .map(|p| [p.x as f64, p.y as f64])
        .collect()
}

/// Minimum-area enclosing rectangle of a pixel point set (rotating calipers
/// over [`convex_hull`]). Corners are returned in traversal order and are not
/// snapped to the grid.
///
/// Returns `None` when the points span no area.
pub fn min_area_rect(points: &[Point]) -> Option<[Point; 4]> {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return None;
    }

    let mut best: Option<(f64, [f64; 4], Point, Point)> = None;
    for i in 0..hull.len() {
        let edge = sub(hull[(i + 1) % hull.len()], hull[i]);
        let len = (edge[0] * edge[0] + edge[1] * edge[1]).sqrt();
        if len < 1e-12 {
            continue;
        }
        let u = [edge[0] / len, edge[1] / len];
        let v = [-u[1], u[0]];

        let (mut u0, mut u1, mut v0, mut v1) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for p in &hull {
            let pu = p[0] * u[0] + p[1] * u[1];
            let pv = p[0] * v[0] + p[1] * v[1];
            u0 = u0.min(pu);
            u1 = u1.max(pu);
            v0 = v0.min(pv);
            v1 = v1.max(pv);
        }
        let area = (u1 - u0) * (v1 - v0);
        if best.as_ref().map_or(true, |(a, ..)| area < *a) {
            best = Some((area, [u0, u1, v0, v1], u, v));
        }
    }

    let (area, [u0, u1, v0, v1], u, v) = best?;
    if area <= 1e-12 {
        return None;
    }
    let corner = |a: f64, b: f64| [a * u[0] + b * v[0], a * u[1] + b * v[1]];
    Some([corner(u0, v0), corner(u1, v0), corner(u1, v1), corner(u0, v1)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square(side: f64) -> Vec<Point> {
        vec![[0.0, 0.0], [side, 0.0], [side, side], [0.0, side]]
    }

    #[test]
    fn area_and_perimeter_of_square() {
        let sq = square(10.0);
        assert_abs_diff_eq!(polygon_area(&sq), 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(perimeter(&sq), 40.0, epsilon = 1e-12);
        let mut rev = sq.clone();
        rev.reverse();
        assert_abs_diff_eq!(signed_area(&sq), -signed_area(&rev), epsilon = 1e-12);
    }

    #[test]
    fn moments_give_centroid() {
        let tri = vec![[0.0, 0.0], [6.0, 0.0], [0.0, 3.0]];
        let (m00, m10, m01) = polygon_moments(&tri);
        assert_abs_diff_eq!(m00.abs(), 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m10 / m00, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m01 / m00, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bounding_rect_uses_inclusive_pixel_extent() {
        let pts = vec![[3.0, 4.0], [10.0, 6.0], [5.0, 9.0]];
        let r = bounding_rect(&pts).expect("non-empty");
        assert_eq!(r, [[3.0, 4.0], [11.0, 4.0], [11.0, 10.0], [3.0, 10.0]]);
        assert!(bounding_rect(&[]).is_none());
    }

    #[test]
    fn dp_collapses_dense_square_boundary() {
        let mut curve = Vec::new();
        for i in 0..20 {
            curve.push([i as f64, 0.0]);
        }
        for i in 0..20 {
            curve.push([20.0, i as f64]);
        }
        for i in 0..20 {
            curve.push([20.0 - i as f64, 20.0]);
        }
        for i in 0..20 {
            curve.push([0.0, 20.0 - i as f64]);
        }
        let poly = approx_polygon_dp(&curve, 0.5);
        assert_eq!(poly.len(), 4);
        for corner in square(20.0) {
            assert!(poly.contains(&corner), "missing corner {:?}", corner);
        }
    }

    #[test]
    fn dp_split_ignores_start_sample() {
        // Start the boundary at an edge midpoint; result must still be 4 corners.
        let mut curve = Vec::new();
        for i in 10..20 {
            curve.push([i as f64, 0.0]);
        }
        for i in 0..20 {
            curve.push([20.0, i as f64]);
        }
        for i in 0..20 {
            curve.push([20.0 - i as f64, 20.0]);
        }
        for i in 0..20 {
            curve.push([0.0, 20.0 - i as f64]);
        }
        for i in 0..10 {
            curve.push([i as f64, 0.0]);
        }
        let poly = approx_polygon_dp(&curve, 0.5);
        assert_eq!(poly.len(), 4, "got {:?}", poly);
    }

    #[test]
    fn hull_drops_interior_points() {
        let pts = vec![
            [0.0, 0.0],
            [5.0, 0.0],
            [10.0, 0.0],
            [10.0, 10.0],
            [0.0, 10.0],
            [5.0, 5.0],
            [0.0, 0.0],
        ];
        let hull = convex_hull(&pts);
        assert!(!hull.contains(&[5.0, 5.0]));
        for corner in square(10.0) {
            assert!(hull.contains(&corner), "missing corner {:?}", corner);
        }
        assert_abs_diff_eq!(polygon_area(&hull), 100.0, epsilon = 1e-12);
    }

    #[test]
    fn min_area_rect_recovers_rotated_rectangle() {
        // Sides along (4, 3) and (-3, 4) keep every corner on the pixel grid.
        let rect = vec![[100.0, 100.0], [140.0, 130.0], [125.0, 150.0], [85.0, 120.0]];
        let mut cloud = rect.clone();
        cloud.push([110.0, 118.0]);
        cloud.push([120.0, 125.0]);

        let box4 = min_area_rect(&cloud).expect("non-degenerate");
        assert_abs_diff_eq!(polygon_area(&box4), 1250.0, epsilon = 1e-6);
        for corner in &rect {
            let nearest = box4
                .iter()
                .map(|b| dist(*b, *corner))
                .fold(f64::MAX, f64::min);
            assert!(nearest < 1e-6, "corner {:?} not recovered", corner);
        }
    }

    #[test]
    fn min_area_rect_of_collinear_points_is_none() {
        let pts = vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        assert!(min_area_rect(&pts).is_none());
    }
}
