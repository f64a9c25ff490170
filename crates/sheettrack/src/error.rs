//! Error taxonomy.
//!
//! Two families with different lifetimes:
//! - [`ConfigError`] is fatal and surfaces before any frame is processed.
//! - [`FrameError`] is a per-frame absence of result. Callers skip the frame
//!   and keep going; tracker state is never touched on a skipped frame.

/// Invalid or unreadable configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A field holds a value the pipeline cannot run with.
    Invalid { field: &'static str, reason: String },
    /// The configuration file could not be read.
    Io(String),
    /// The configuration file is not valid JSON for [`crate::TrackConfig`].
    Parse(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { field, reason } => write!(f, "invalid config `{}`: {}", field, reason),
            Self::Io(msg) => write!(f, "config i/o error: {}", msg),
            Self::Parse(msg) => write!(f, "config parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Why a frame produced no target.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// No foreground region, or the largest one is below the area gate.
    ///
    /// `area` is the best candidate's area in px² (0 when the mask is empty).
    NoTarget { area: f64 },
    /// A candidate region existed but could not be reduced to a usable
    /// quadrilateral or transform.
    SegmentationFailed { reason: String },
}

impl FrameError {
    /// Per-frame errors never end a frame loop.
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTarget { area } => write!(f, "no target (best area {:.1} px²)", area),
            Self::SegmentationFailed { reason } => write!(f, "segmentation failed: {}", reason),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<crate::rectify::RectifyError> for FrameError {
    fn from(e: crate::rectify::RectifyError) -> Self {
        Self::SegmentationFailed {
            reason: e.to_string(),
        }
    }
}
