//! sheettrack — locate a sheet of paper in a frame and steer toward it.
//!
//! The per-frame pipeline stages are:
//!
//! 1. **Segment** – color-range (HSV) or global (Otsu) threshold to a binary mask.
//! 2. **Contour** – largest external contour, area gate, reduction to four
//!    corners via polygon approximation with retry and convex-hull fallbacks,
//!    or a minimum-area rotated rectangle.
//! 3. **Corners** – canonical TL/TR/BR/BL ordering.
//! 4. **Rectify** – perspective warp onto an axis-aligned rectangle plus a
//!    residual top-edge rotation.
//! 5. **Locate** – target center from contour moments or by mapping the
//!    rectified center back through the inverse transform.
//!
//! Across frames, a [`Tracker`] feeds centers to a bang-bang [`Controller`]
//! that emits fixed-size step commands in the direction of motion.
//!
//! # Public API
//! - [`Tracker`] as the session entry point
//! - [`TrackConfig`] for tuning
//! - [`pipeline::process_frame`] for stateless single-frame use
//! - stage modules for callers that want individual steps

mod api;
pub mod config;
pub mod contour;
pub mod control;
pub mod corners;
pub mod error;
pub mod homography;
pub mod locate;
pub mod pipeline;
pub mod rectify;
pub mod segment;

#[cfg(test)]
mod test_utils;

pub use api::Tracker;
pub use config::{
    CenterStrategy, ContourConfig, ControlConfig, ExtractionMode, RectifyConfig, SegmentConfig,
    SegmentStrategy, TrackConfig,
};
pub use contour::{Extraction, ExtractionPath};
pub use control::{Command, Controller, HeadingEstimator, TrackPhase};
pub use corners::Quad;
pub use error::{ConfigError, FrameError};
pub use homography::HomographyError;
pub use pipeline::{FrameOutput, FrameReport};
pub use rectify::{Rectified, RectifyError};
