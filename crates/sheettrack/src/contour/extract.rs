//! Dominant-contour extraction and reduction to four corners.

use image::GrayImage;
use imageproc::contours::BorderType;
use imageproc::distance_transform::Norm;

use crate::config::{ContourConfig, ExtractionMode};
use crate::corners::order_points;
use crate::error::FrameError;

use super::geometry::{approx_polygon_dp, convex_hull, min_area_rect, perimeter, polygon_area};

/// Closed boundary polyline in pixel coordinates.
pub type Contour = Vec<[f64; 2]>;

/// Which reduction produced the four corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPath {
    /// Douglas-Peucker at the primary tolerance gave four vertices.
    Primary,
    /// Douglas-Peucker at the retry tolerance gave four vertices.
    Retry,
    /// Extreme corners of the convex hull.
    Hull,
    /// Minimum-area rotated rectangle.
    MinAreaRect,
}

/// Result of [`extract_quadrilateral`].
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Raw boundary of the selected region.
    pub contour: Contour,
    /// Enclosed area of `contour` (px²).
    pub area: f64,
    /// Four corners, order unspecified (hull path happens to be canonical).
    pub corners: [[f64; 2]; 4],
    pub path: ExtractionPath,
}

/// Outer borders of all top-level foreground regions in `mask`.
///
/// Regions touching the image edge are included. Border following runs on a
/// copy padded with one background pixel, so every region has a closed outer
/// border; points are reported in `mask` coordinates.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    let (w, h) = mask.dimensions();
    let mut padded = GrayImage::new(w + 2, h + 2);
    image::imageops::replace(&mut padded, mask, 1, 1);

    imageproc::contours::find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| [f64::from(p.x - 1), f64::from(p.y - 1)])
                .collect()
        })
        .collect()
}

/// Largest external contour by enclosed area. Ties keep the first found.
pub fn largest_contour(mask: &GrayImage) -> Option<(Contour, f64)> {
    let contours = find_external_contours(mask);
    tracing::trace!(n_contours = contours.len(), "contours traced");
    let mut best: Option<(Contour, f64)> = None;
    for contour in contours {
        let area = polygon_area(&contour);
        if best.as_ref().map_or(true, |(_, a)| area > *a) {
            best = Some((contour, area));
        }
    }
    best
}

/// Reduce the dominant region of `mask` to four corners.
pub fn extract_quadrilateral(
    mask: &GrayImage,
    config: &ContourConfig,
) -> Result<Extraction, FrameError> {
    match config.mode {
        ExtractionMode::PolygonFallback => extract_polygon(mask, config),
        ExtractionMode::TightRotatedBox => extract_rotated_box(mask, config),
    }
}

fn select_candidate(mask: &GrayImage, min_area: f64) -> Result<(Contour, f64), FrameError> {
    let Some((contour, area)) = largest_contour(mask) else {
        return Err(FrameError::NoTarget { area: 0.0 });
    };
    if area < min_area {
        tracing::debug!(area, min_area, "largest contour below area gate");
        return Err(FrameError::NoTarget { area });
    }
    Ok((contour, area))
}

fn extract_polygon(mask: &GrayImage, config: &ContourConfig) -> Result<Extraction, FrameError> {
    let (contour, area) = select_candidate(mask, config.min_area)?;
    let peri = perimeter(&contour);

    for (path, tolerance) in [
        (ExtractionPath::Primary, config.primary_tolerance),
        (ExtractionPath::Retry, config.retry_tolerance),
    ] {
        let approx = approx_polygon_dp(&contour, tolerance * peri);
        tracing::trace!(?path, n_vertices = approx.len(), "polygon approximation");
        if let [a, b, c, d] = approx[..] {
            return Ok(Extraction {
                contour,
                area,
                corners: [a, b, c, d],
                path,
            });
        }
    }

    let hull = convex_hull(&contour);
    if hull.len() < 4 {
        return Err(FrameError::SegmentationFailed {
            reason: format!("convex hull has {} points", hull.len()),
        });
    }
    let quad = order_points(&hull).ok_or_else(|| FrameError::SegmentationFailed {
        reason: "convex hull is empty".to_string(),
    })?;
    if !quad.has_distinct_corners() {
        return Err(FrameError::SegmentationFailed {
            reason: "hull extremes collapse onto fewer than four corners".to_string(),
        });
    }
    Ok(Extraction {
        contour,
        area,
        corners: quad.to_array(),
        path: ExtractionPath::Hull,
    })
}

fn extract_rotated_box(mask: &GrayImage, config: &ContourConfig) -> Result<Extraction, FrameError> {
    let closed = imageproc::morphology::close(mask, Norm::LInf, config.box_kernel_radius);
    let (contour, area) = select_candidate(&closed, config.min_area)?;
    let corners = min_area_rect(&contour).ok_or_else(|| FrameError::SegmentationFailed {
        reason: "region spans no area".to_string(),
    })?;
    Ok(Extraction {
        contour,
        area,
        corners,
        path: ExtractionPath::MinAreaRect,
    })
}
