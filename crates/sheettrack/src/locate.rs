//! Target center estimation in original-frame pixel coordinates.

use crate::config::CenterStrategy;
use crate::contour::geometry::polygon_moments;
use crate::homography::project;
use crate::rectify::Rectified;

/// Area centroid of `contour`, truncated toward zero.
///
/// A zero-area contour yields the sentinel `[0, 0]`.
pub fn moment_center(contour: &[[f64; 2]]) -> [i32; 2] {
    let (m00, m10, m01) = polygon_moments(contour);
    if m00.abs() < f64::EPSILON {
        tracing::debug!(n_points = contour.len(), "zero-area contour, center sentinel");
        return [0, 0];
    }
    [(m10 / m00) as i32, (m01 / m00) as i32]
}

/// Rectified-frame center `(W/2, H/2)` mapped back through the inverse
/// transform, floored.
///
/// `None` when the transform cannot be inverted or the point maps to
/// infinity.
pub fn inverse_warp_center(rectified: &Rectified) -> Option<[i32; 2]> {
    let inv = rectified.transform.try_inverse()?;
    let [w, h] = rectified.size;
    let p = project(&inv, f64::from(w) / 2.0, f64::from(h) / 2.0);
    if !p[0].is_finite() || !p[1].is_finite() {
        return None;
    }
    Some([p[0].floor() as i32, p[1].floor() as i32])
}

/// Dispatch on the configured strategy.
pub fn locate(
    strategy: CenterStrategy,
    contour: &[[f64; 2]],
    rectified: &Rectified,
) -> Option<[i32; 2]> {
    match strategy {
        CenterStrategy::Moment => Some(moment_center(contour)),
        CenterStrategy::InverseWarp => inverse_warp_center(rectified),
    }
}
