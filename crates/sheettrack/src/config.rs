//! Pipeline configuration.
//!
//! Every sub-config deserializes with `#[serde(default)]`, so a JSON file only
//! needs the fields it overrides. [`TrackConfig::validate`] is the single gate
//! that turns a malformed configuration into a [`ConfigError`] before any
//! frame is processed.

use std::path::Path;

use crate::error::ConfigError;

/// How the frame is turned into a foreground mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStrategy {
    /// HSV threshold on low saturation and high value, then close + open.
    #[default]
    ColorRange,
    /// Otsu threshold on the luma channel.
    GlobalThreshold,
}

/// How the dominant contour is reduced to four corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Douglas-Peucker at the primary tolerance, then the retry tolerance,
    /// then the convex-hull extreme corners.
    #[default]
    PolygonFallback,
    /// Minimum-area rotated rectangle of the largest contour after a wider
    /// closing. Never falls back to the hull path.
    TightRotatedBox,
}

/// Which estimator produces the tracked center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterStrategy {
    /// Area centroid of the raw contour.
    Moment,
    /// Rectified-frame center mapped back through the inverse transform.
    #[default]
    InverseWarp,
}

/// Segmenter controls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    pub strategy: SegmentStrategy,
    /// Gaussian sigma applied before the HSV conversion (`None` disables).
    pub blur_sigma: Option<f32>,
    /// Maximum saturation accepted as paper, on the 8-bit HSV scale.
    pub saturation_max: u8,
    /// Minimum value (brightness) accepted as paper, on the 8-bit HSV scale.
    pub value_min: u8,
    /// Half-size of the square structuring element for close/open.
    pub kernel_radius: u8,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            strategy: SegmentStrategy::default(),
            blur_sigma: Some(1.1),
            saturation_max: 60,
            value_min: 150,
            kernel_radius: 1,
        }
    }
}

/// Contour extractor controls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    pub mode: ExtractionMode,
    /// Largest-contour area (px²) below which the frame has no target.
    pub min_area: f64,
    /// First Douglas-Peucker tolerance, as a fraction of the perimeter.
    pub primary_tolerance: f64,
    /// Second Douglas-Peucker tolerance, as a fraction of the perimeter.
    pub retry_tolerance: f64,
    /// Half-size of the closing element used by [`ExtractionMode::TightRotatedBox`].
    pub box_kernel_radius: u8,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::default(),
            min_area: 1000.0,
            primary_tolerance: 0.02,
            retry_tolerance: 0.04,
            box_kernel_radius: 3,
        }
    }
}

/// Rectifier controls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RectifyConfig {
    /// Residual top-edge tilt (degrees) above which the rectified frame is
    /// additionally rotated. The comparison is strict.
    pub rotation_threshold_deg: f64,
}

impl Default for RectifyConfig {
    fn default() -> Self {
        Self {
            rotation_threshold_deg: 1.0,
        }
    }
}

/// Step sizes of the bang-bang controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub step_x: i32,
    pub step_y: i32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            step_x: 5,
            step_y: 5,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub segment: SegmentConfig,
    pub contour: ContourConfig,
    pub rectify: RectifyConfig,
    pub center: CenterStrategy,
    pub control: ControlConfig,
}

impl TrackConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(data).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&data)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_segment(&self.segment)?;
        validate_contour(&self.contour)?;
        if !self.rectify.rotation_threshold_deg.is_finite()
            || self.rectify.rotation_threshold_deg < 0.0
        {
            return Err(ConfigError::invalid(
                "rectify.rotation_threshold_deg",
                "must be finite and >= 0",
            ));
        }
        validate_control(&self.control)
    }
}

fn validate_segment(cfg: &SegmentConfig) -> Result<(), ConfigError> {
    if let Some(sigma) = cfg.blur_sigma {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(ConfigError::invalid(
                "segment.blur_sigma",
                "must be finite and > 0 (use null to disable)",
            ));
        }
    }
    if cfg.saturation_max == 0 {
        return Err(ConfigError::invalid(
            "segment.saturation_max",
            "must be > 0, otherwise only pure grays pass",
        ));
    }
    if cfg.value_min == u8::MAX {
        return Err(ConfigError::invalid(
            "segment.value_min",
            "must be < 255, otherwise only saturated white passes",
        ));
    }
    if cfg.kernel_radius == 0 {
        return Err(ConfigError::invalid("segment.kernel_radius", "must be >= 1"));
    }
    Ok(())
}

fn validate_contour(cfg: &ContourConfig) -> Result<(), ConfigError> {
    if !cfg.min_area.is_finite() || cfg.min_area < 0.0 {
        return Err(ConfigError::invalid(
            "contour.min_area",
            "must be finite and >= 0",
        ));
    }
    for (field, tol) in [
        ("contour.primary_tolerance", cfg.primary_tolerance),
        ("contour.retry_tolerance", cfg.retry_tolerance),
    ] {
        if !tol.is_finite() || tol <= 0.0 || tol >= 1.0 {
            return Err(ConfigError::invalid(field, "must be in (0, 1)"));
        }
    }
    if cfg.retry_tolerance <= cfg.primary_tolerance {
        return Err(ConfigError::invalid(
            "contour.retry_tolerance",
            format!(
                "must exceed primary_tolerance ({} <= {})",
                cfg.retry_tolerance, cfg.primary_tolerance
            ),
        ));
    }
    if cfg.box_kernel_radius == 0 {
        return Err(ConfigError::invalid(
            "contour.box_kernel_radius",
            "must be >= 1",
        ));
    }
    Ok(())
}

pub(crate) fn validate_control(cfg: &ControlConfig) -> Result<(), ConfigError> {
    if cfg.step_x <= 0 {
        return Err(ConfigError::invalid("control.step_x", "must be > 0"));
    }
    if cfg.step_y <= 0 {
        return Err(ConfigError::invalid("control.step_y", "must be > 0"));
    }
    Ok(())
}
