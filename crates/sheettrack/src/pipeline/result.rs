use crate::contour::{Contour, ExtractionPath};
use crate::control::Command;
use crate::corners::Quad;
use crate::homography::matrix3_to_array;
use crate::rectify::Rectified;

/// Everything one successful pipeline run produces.
///
/// The rectified frame and contour are side outputs for rendering; only
/// `center` feeds the controller.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub contour: Contour,
    pub contour_area: f64,
    pub path: ExtractionPath,
    pub rectified: Rectified,
    pub center: [i32; 2],
}

impl FrameOutput {
    pub fn quad(&self) -> &Quad {
        &self.rectified.quad
    }
}

/// Serializable per-frame summary.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FrameReport {
    /// Input frame dimensions [width, height].
    pub image_size: [u32; 2],
    pub path: ExtractionPath,
    /// Dominant contour polygon in frame pixels.
    pub contour: Vec<[f64; 2]>,
    pub contour_area: f64,
    pub quad: Quad,
    /// Rectified frame dimensions [width, height].
    pub rectified_size: [u32; 2],
    /// Frame-to-rectified homography (3x3, row-major).
    pub transform: [[f64; 3]; 3],
    pub rotation_deg: f64,
    pub rotation_applied: bool,
    pub center: [i32; 2],
    /// Step command, when produced by a tracking session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    /// Motion heading from the previous center (degrees), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_deg: Option<f64>,
}

impl FrameReport {
    /// Report for a stateless run (no command, no heading).
    pub fn from_output(output: &FrameOutput, image_size: [u32; 2]) -> Self {
        Self {
            image_size,
            path: output.path,
            contour: output.contour.clone(),
            contour_area: output.contour_area,
            quad: output.rectified.quad,
            rectified_size: output.rectified.size,
            transform: matrix3_to_array(&output.rectified.transform),
            rotation_deg: output.rectified.rotation_deg,
            rotation_applied: output.rectified.rotation_applied,
            center: output.center,
            command: None,
            heading_deg: None,
        }
    }
}
