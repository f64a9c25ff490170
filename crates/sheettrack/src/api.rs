//! Tracking session API.
//!
//! [`Tracker`] owns a validated [`TrackConfig`] together with the controller
//! and heading memory for one physical target. Create one per actuator
//! session and feed it frames in order.

use image::RgbImage;

use crate::config::TrackConfig;
use crate::control::{Command, Controller, HeadingEstimator};
use crate::error::{ConfigError, FrameError};
use crate::pipeline::{self, FrameOutput, FrameReport};

/// Stateful per-target tracking session.
///
/// # Examples
///
/// ```no_run
/// use sheettrack::{TrackConfig, Tracker};
/// use image::RgbImage;
///
/// let mut tracker = Tracker::new(TrackConfig::default()).unwrap();
/// let frame = RgbImage::new(640, 480);
/// match tracker.process(&frame) {
///     Ok(report) => println!("command {:?}", report.command),
///     Err(e) => println!("skipped: {}", e),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Tracker {
    config: TrackConfig,
    controller: Controller,
    heading: HeadingEstimator,
}

impl Tracker {
    /// Validate `config` and start an uninitialized session.
    pub fn new(config: TrackConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let controller = Controller::from_config(&config.control)?;
        Ok(Self {
            config,
            controller,
            heading: HeadingEstimator::new(),
        })
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Run the pipeline without touching session state.
    pub fn locate(&self, frame: &RgbImage) -> Result<FrameOutput, FrameError> {
        pipeline::process_frame(frame, &self.config)
    }

    /// Process the next frame and advance the controller.
    ///
    /// On error the session state is left exactly as it was; a skipped frame
    /// does not count as zero motion.
    pub fn process(&mut self, frame: &RgbImage) -> Result<FrameReport, FrameError> {
        let output = self.locate(frame)?;
        let command = self.controller.get_command(output.center);
        let heading_deg = self.heading.update(output.center);
        if !command.is_zero() {
            tracing::debug!(?command, center = ?output.center, "command issued");
        }

        let mut report = FrameReport::from_output(&output, [frame.width(), frame.height()]);
        report.command = Some(command);
        report.heading_deg = heading_deg;
        Ok(report)
    }

    /// Feed an externally obtained center straight to the controller.
    pub fn command_for(&mut self, center: [i32; 2]) -> Command {
        self.heading.update(center);
        self.controller.get_command(center)
    }

    /// Forget the previous center (e.g. after the target was lost).
    pub fn reset(&mut self) {
        self.controller.reset_to(None);
        self.heading.reset();
    }
}
