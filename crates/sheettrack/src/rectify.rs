//! Perspective rectification of the ordered quadrilateral.
//!
//! The quad is mapped onto an axis-aligned `W×H` rectangle whose sides are
//! the longer of each pair of opposite edges. If the top edge was tilted by
//! more than the configured threshold, the rectified image is additionally
//! rotated about its integer center by that tilt. The stored transform is the
//! perspective part only; locators map through it.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use nalgebra::Matrix3;

use crate::config::RectifyConfig;
use crate::contour::geometry::bounding_rect;
use crate::corners::Quad;
use crate::homography::{perspective_transform, HomographyError};

/// Why a quadrilateral could not be rectified.
#[derive(Debug, Clone, PartialEq)]
pub enum RectifyError {
    /// Rectified target would be narrower or shorter than 2 px.
    DegenerateTarget { width: u32, height: u32 },
    /// The polygon had no points to bound.
    EmptyPolygon,
    /// No usable transform between the quad and the target rectangle.
    Transform(HomographyError),
}

impl std::fmt::Display for RectifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DegenerateTarget { width, height } => {
                write!(f, "degenerate target size {}x{}", width, height)
            }
            Self::EmptyPolygon => write!(f, "empty polygon"),
            Self::Transform(e) => write!(f, "transform: {}", e),
        }
    }
}

impl std::error::Error for RectifyError {}

impl From<HomographyError> for RectifyError {
    fn from(e: HomographyError) -> Self {
        Self::Transform(e)
    }
}

/// Tilts this close to the threshold count as on it.
const THRESHOLD_EPS_DEG: f64 = 1e-9;

/// Rectified view of the target.
#[derive(Debug, Clone)]
pub struct Rectified {
    pub image: RgbImage,
    /// Quad used for the warp (canonical order).
    pub quad: Quad,
    /// Frame → rectified-rectangle transform, `h[(2,2)] = 1`.
    pub transform: Matrix3<f64>,
    /// `[W, H]`.
    pub size: [u32; 2],
    /// Top-edge tilt of `quad` in degrees.
    pub rotation_deg: f64,
    pub rotation_applied: bool,
}

fn edge(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Rectified `[W, H]`: the longer of each pair of opposite edges, rounded.
pub fn target_size(quad: &Quad) -> [u32; 2] {
    let w = edge(quad.br, quad.bl).max(edge(quad.tr, quad.tl));
    let h = edge(quad.tr, quad.br).max(edge(quad.tl, quad.bl));
    // Saturating float → int cast; NaN becomes 0.
    [w.round() as u32, h.round() as u32]
}

/// Angle of the TL→TR edge in degrees, y-down image frame.
pub fn top_edge_angle_deg(quad: &Quad) -> f64 {
    (quad.tr[1] - quad.tl[1])
        .atan2(quad.tr[0] - quad.tl[0])
        .to_degrees()
}

/// Strict threshold test for the extra rotation. A tilt computed as the
/// threshold plus rounding noise does not rotate.
pub fn rotation_applies(angle_deg: f64, threshold_deg: f64) -> bool {
    angle_deg.abs() > threshold_deg + THRESHOLD_EPS_DEG
}

/// Affine rotation by `angle_deg` (counter-clockwise as displayed) about
/// `center`, as a homogeneous source → destination matrix.
pub fn rotation_matrix(center: [f64; 2], angle_deg: f64) -> Matrix3<f64> {
    let (s, c) = angle_deg.to_radians().sin_cos();
    let [cx, cy] = center;
    Matrix3::new(
        c, s, (1.0 - c) * cx - s * cy,
        -s, c, s * cx + (1.0 - c) * cy,
        0.0, 0.0, 1.0,
    )
}

fn to_projection(h: &Matrix3<f64>) -> Option<Projection> {
    let mut m = [0f32; 9];
    for r in 0..3 {
        for c in 0..3 {
            m[3 * r + c] = h[(r, c)] as f32;
        }
    }
    Projection::from_matrix(m)
}

fn warp(src: &RgbImage, h: &Matrix3<f64>, size: [u32; 2]) -> Result<RgbImage, RectifyError> {
    let projection = to_projection(h).ok_or_else(|| {
        RectifyError::Transform(HomographyError::NumericalFailure(
            "transform not invertible in f32".into(),
        ))
    })?;
    let mut out = RgbImage::new(size[0], size[1]);
    warp_into(src, &projection, Interpolation::Bilinear, Rgb([0, 0, 0]), &mut out);
    Ok(out)
}

/// Warp `frame` so that `quad` becomes an axis-aligned rectangle.
pub fn rectify(
    frame: &RgbImage,
    quad: &Quad,
    config: &RectifyConfig,
) -> Result<Rectified, RectifyError> {
    let [w, h] = target_size(quad);
    if w < 2 || h < 2 {
        return Err(RectifyError::DegenerateTarget {
            width: w,
            height: h,
        });
    }
    let (wf, hf) = (f64::from(w - 1), f64::from(h - 1));
    let dst = [[0.0, 0.0], [wf, 0.0], [wf, hf], [0.0, hf]];
    let transform = perspective_transform(&quad.to_array(), &dst)?;

    let mut image = warp(frame, &transform, [w, h])?;

    let rotation_deg = top_edge_angle_deg(quad);
    let rotation_applied = rotation_applies(rotation_deg, config.rotation_threshold_deg);
    if rotation_applied {
        let center = [f64::from(w / 2), f64::from(h / 2)];
        image = warp(&image, &rotation_matrix(center, rotation_deg), [w, h])?;
    }

    tracing::debug!(
        width = w,
        height = h,
        rotation_deg,
        rotation_applied,
        "rectified"
    );

    Ok(Rectified {
        image,
        quad: *quad,
        transform,
        size: [w, h],
        rotation_deg,
        rotation_applied,
    })
}

/// Rectify from an arbitrary polygon.
///
/// Four points are put in canonical order; any other count is replaced by
/// the polygon's axis-aligned bounding rectangle.
pub fn rectify_polygon(
    frame: &RgbImage,
    points: &[[f64; 2]],
    config: &RectifyConfig,
) -> Result<Rectified, RectifyError> {
    let quad = match points {
        [a, b, c, d] => Quad::from_unordered([*a, *b, *c, *d]),
        _ => {
            tracing::warn!(
                n_points = points.len(),
                "polygon is not a quadrilateral, using its bounding rectangle"
            );
            let [tl, tr, br, bl] = bounding_rect(points).ok_or(RectifyError::EmptyPolygon)?;
            Quad { tl, tr, br, bl }
        }
    };
    rectify(frame, &quad, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::homography::project;
    use crate::test_utils::{paper_frame, rotated_rect, PAPER};
    use approx::assert_abs_diff_eq;

    fn quad_of(c: [[f64; 2]; 4]) -> Quad {
        Quad {
            tl: c[0],
            tr: c[1],
            br: c[2],
            bl: c[3],
        }
    }

    #[test]
    fn target_size_takes_longer_opposite_edges() {
        let q = quad_of([[10.0, 10.0], [110.0, 10.0], [120.0, 70.0], [0.0, 70.0]]);
        let [w, h] = target_size(&q);
        assert_eq!(w, 120);
        assert_eq!(h, 61);
    }

    #[test]
    fn rotation_threshold_is_strict() {
        assert!(!rotation_applies(1.0, 1.0));
        assert!(rotation_applies(1.01, 1.0));
        assert!(rotation_applies(-1.01, 1.0));
        assert!(!rotation_applies(-0.5, 1.0));
    }

    #[test]
    fn top_edge_angle_of_tilted_quad() {
        let q = quad_of(rotated_rect([160.0, 120.0], [80.0, 50.0], 1.5));
        assert_abs_diff_eq!(top_edge_angle_deg(&q), 1.5, epsilon = 1e-9);
        let q = quad_of(rotated_rect([160.0, 120.0], [80.0, 50.0], -12.0));
        assert_abs_diff_eq!(top_edge_angle_deg(&q), -12.0, epsilon = 1e-9);
    }

    #[test]
    fn rotation_matrix_turns_counter_clockwise_on_screen() {
        let m = rotation_matrix([50.0, 40.0], 90.0);
        let c = project(&m, 50.0, 40.0);
        assert_abs_diff_eq!(c[0], 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c[1], 40.0, epsilon = 1e-9);
        // A point right of center moves above it.
        let p = project(&m, 60.0, 40.0);
        assert_abs_diff_eq!(p[0], 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p[1], 30.0, epsilon = 1e-9);
    }

    #[test]
    fn rotation_follows_the_threshold() {
        let frame = RgbImage::new(320, 240);
        let cfg = RectifyConfig::default();

        let tilted = quad_of(rotated_rect([160.0, 120.0], [80.0, 50.0], 1.5));
        let r = rectify(&frame, &tilted, &cfg).expect("rectify");
        assert!(r.rotation_applied);
        assert_abs_diff_eq!(r.rotation_deg, 1.5, epsilon = 1e-9);

        let level = quad_of(rotated_rect([160.0, 120.0], [80.0, 50.0], 0.5));
        let r = rectify(&frame, &level, &cfg).expect("rectify");
        assert!(!r.rotation_applied);
    }

    #[test]
    fn rectify_skips_rotation_at_exact_threshold() {
        let frame = RgbImage::new(320, 240);
        let cfg = RectifyConfig::default();

        let at = quad_of(rotated_rect([160.0, 120.0], [80.0, 50.0], 1.0));
        let r = rectify(&frame, &at, &cfg).expect("rectify");
        assert_abs_diff_eq!(r.rotation_deg, 1.0, epsilon = 1e-9);
        assert!(!r.rotation_applied);

        let above = quad_of(rotated_rect([160.0, 120.0], [80.0, 50.0], 1.01));
        let r = rectify(&frame, &above, &cfg).expect("rectify");
        assert!(r.rotation_applied);

        let below = quad_of(rotated_rect([160.0, 120.0], [80.0, 50.0], -1.0));
        assert!(!rectify(&frame, &below, &cfg).expect("rectify").rotation_applied);
    }

    #[test]
    fn rectification_is_idempotent() {
        let q = quad_of([[60.0, 50.0], [260.0, 52.0], [240.0, 190.0], [80.0, 185.0]]);
        let frame = paper_frame(320, 240, &q.to_array());
        let cfg = RectifyConfig::default();
        let a = rectify(&frame, &q, &cfg).expect("rectify");
        let b = rectify(&frame, &q, &cfg).expect("rectify");
        assert_eq!(a.size, b.size);
        for (x, y) in a.transform.iter().zip(b.transform.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
        }
        assert_eq!(a.image, b.image);
    }

    #[test]
    fn warped_quad_fills_the_rectified_frame() {
        let q = quad_of([[60.0, 50.0], [260.0, 52.0], [240.0, 190.0], [80.0, 185.0]]);
        let frame = paper_frame(320, 240, &q.to_array());
        let r = rectify(&frame, &q, &RectifyConfig::default()).expect("rectify");
        assert!(!r.rotation_applied);
        assert_eq!(r.image.dimensions(), (r.size[0], r.size[1]));

        // Corners land on the destination rectangle.
        let [w, h] = r.size;
        let br = project(&r.transform, q.br[0], q.br[1]);
        assert_abs_diff_eq!(br[0], f64::from(w - 1), epsilon = 1e-6);
        assert_abs_diff_eq!(br[1], f64::from(h - 1), epsilon = 1e-6);

        let paper_like = r
            .image
            .pixels()
            .filter(|p| {
                p.0.iter()
                    .zip(PAPER.0)
                    .all(|(&a, b)| (i32::from(a) - i32::from(b)).abs() < 40)
            })
            .count();
        let total = (w * h) as usize;
        assert!(
            paper_like as f64 / total as f64 > 0.9,
            "paper fraction {}/{}",
            paper_like,
            total
        );
    }

    #[test]
    fn degenerate_quad_is_an_error() {
        let frame = RgbImage::new(64, 64);
        let q = quad_of([[10.0, 10.0], [10.0, 10.0], [10.0, 10.0], [10.0, 10.0]]);
        assert!(matches!(
            rectify(&frame, &q, &RectifyConfig::default()),
            Err(RectifyError::DegenerateTarget {
                width: 0,
                height: 0
            })
        ));
        assert_eq!(
            rectify_polygon(&frame, &[], &RectifyConfig::default()).unwrap_err(),
            RectifyError::EmptyPolygon
        );
    }

    #[test]
    fn collinear_quad_has_no_transform() {
        let frame = RgbImage::new(64, 64);
        let q = quad_of([[0.0, 0.0], [20.0, 20.0], [40.0, 40.0], [10.0, 10.0]]);
        assert!(matches!(
            rectify(&frame, &q, &RectifyConfig::default()),
            Err(RectifyError::Transform(_))
        ));
    }

    #[test]
    fn non_quad_polygon_uses_bounding_rectangle() {
        let frame = RgbImage::new(200, 160);
        let pentagon = [
            [40.0, 30.0],
            [100.0, 20.0],
            [150.0, 30.0],
            [150.0, 120.0],
            [40.0, 120.0],
        ];
        let r = rectify_polygon(&frame, &pentagon, &RectifyConfig::default()).expect("rectify");
        assert_eq!(r.quad.tl, [40.0, 20.0]);
        assert_eq!(r.quad.br, [151.0, 121.0]);
        assert_eq!(r.size, [111, 101]);
        assert!(!r.rotation_applied);
    }

    #[test]
    fn four_point_polygon_is_ordered_first() {
        let frame = RgbImage::new(320, 240);
        let q = rotated_rect([160.0, 120.0], [80.0, 50.0], 0.0);
        let shuffled = [q[2], q[0], q[3], q[1]];
        let r = rectify_polygon(&frame, &shuffled, &RectifyConfig::default()).expect("rectify");
        assert_eq!(r.quad.to_array(), q);
        assert_eq!(r.size, [160, 100]);
    }
}
