//! Shared synthetic-image helpers for unit tests.

use image::{GrayImage, Luma, Rgb, RgbImage};

pub(crate) const PAPER: Rgb<u8> = Rgb([240, 238, 232]);
pub(crate) const TABLE: Rgb<u8> = Rgb([45, 70, 120]);

/// Inclusive point-in-convex-polygon test (either winding).
pub(crate) fn inside_convex(poly: &[[f64; 2]], x: f64, y: f64) -> bool {
    let n = poly.len();
    let mut sign = 0.0f64;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let cross = (b[0] - a[0]) * (y - a[1]) - (b[1] - a[1]) * (x - a[0]);
        if cross.abs() < 1e-9 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// Binary mask with `poly` filled at 255.
pub(crate) fn polygon_mask(w: u32, h: u32, poly: &[[f64; 2]]) -> GrayImage {
    let mut img = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            if inside_convex(poly, x as f64, y as f64) {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }
    img
}

/// Color frame with `poly` painted as paper over a saturated table color.
pub(crate) fn paper_frame(w: u32, h: u32, poly: &[[f64; 2]]) -> RgbImage {
    let mut img = RgbImage::from_pixel(w, h, TABLE);
    for y in 0..h {
        for x in 0..w {
            if inside_convex(poly, x as f64, y as f64) {
                img.put_pixel(x, y, PAPER);
            }
        }
    }
    img
}

/// Corners (TL, TR, BR, BL before rotation) of a rectangle rotated by
/// `angle_deg` about `center`.
pub(crate) fn rotated_rect(center: [f64; 2], half: [f64; 2], angle_deg: f64) -> [[f64; 2]; 4] {
    let (s, c) = angle_deg.to_radians().sin_cos();
    let local = [
        [-half[0], -half[1]],
        [half[0], -half[1]],
        [half[0], half[1]],
        [-half[0], half[1]],
    ];
    local.map(|[u, v]| [center[0] + c * u - s * v, center[1] + s * u + c * v])
}

pub(crate) fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}
