use image::RgbImage;

use super::FrameOutput;
use crate::config::TrackConfig;
use crate::contour::extract_quadrilateral;
use crate::error::FrameError;
use crate::locate::locate;
use crate::rectify::rectify_polygon;
use crate::segment::segment;

/// Run one frame through the full pipeline.
pub fn process_frame(frame: &RgbImage, config: &TrackConfig) -> Result<FrameOutput, FrameError> {
    let result = run_stages(frame, config);
    if let Err(e) = &result {
        tracing::debug!(reason = %e, "frame skipped");
    }
    result
}

fn run_stages(frame: &RgbImage, config: &TrackConfig) -> Result<FrameOutput, FrameError> {
    let mask = segment(frame, &config.segment);

    let extraction = extract_quadrilateral(&mask, &config.contour)?;
    tracing::debug!(
        path = ?extraction.path,
        area = extraction.area,
        n_contour_points = extraction.contour.len(),
        "quadrilateral extracted"
    );

    let rectified = rectify_polygon(frame, &extraction.corners, &config.rectify)?;

    let center = locate(config.center, &extraction.contour, &rectified).ok_or_else(|| {
        FrameError::SegmentationFailed {
            reason: "center maps outside the frame plane".to_string(),
        }
    })?;
    tracing::debug!(?center, strategy = ?config.center, "center located");

    Ok(FrameOutput {
        contour: extraction.contour,
        contour_area: extraction.area,
        path: extraction.path,
        rectified,
        center,
    })
}
