//! Bang-bang step controller over successive centers.
//!
//! The controller remembers the last center and answers each new center with
//! a fixed-magnitude step per axis in the direction of motion. It never
//! resets itself; callers replace it (or call [`Controller::reset_to`]) after
//! re-acquisition.

use crate::config::{validate_control, ControlConfig};
use crate::error::ConfigError;

/// Two-axis step command, each component in `{-step, 0, +step}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Command {
    pub dx: i32,
    pub dy: i32,
}

impl Command {
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPhase {
    /// No center observed yet.
    Uninitialized,
    /// Holding the previous center.
    Tracking { last: [i32; 2] },
}

#[derive(Debug, Clone)]
pub struct Controller {
    step: [i32; 2],
    phase: TrackPhase,
}

impl Default for Controller {
    fn default() -> Self {
        Self::with_default_steps()
    }
}

impl Controller {
    /// Controller with the given positive step sizes.
    pub fn new(step_x: i32, step_y: i32) -> Result<Self, ConfigError> {
        Self::from_config(&ControlConfig { step_x, step_y })
    }

    pub fn from_config(config: &ControlConfig) -> Result<Self, ConfigError> {
        validate_control(config)?;
        Ok(Self {
            step: [config.step_x, config.step_y],
            phase: TrackPhase::Uninitialized,
        })
    }

    /// Steps of 5 on both axes.
    pub fn with_default_steps() -> Self {
        let d = ControlConfig::default();
        Self {
            step: [d.step_x, d.step_y],
            phase: TrackPhase::Uninitialized,
        }
    }

    pub fn step(&self) -> [i32; 2] {
        self.step
    }

    pub fn state(&self) -> TrackPhase {
        self.phase
    }

    /// Previous center, if any.
    pub fn last(&self) -> Option<[i32; 2]> {
        match self.phase {
            TrackPhase::Uninitialized => None,
            TrackPhase::Tracking { last } => Some(last),
        }
    }

    /// Record `center` and return the step command for the motion since the
    /// previous call. The first call returns [`Command::ZERO`].
    pub fn get_command(&mut self, center: [i32; 2]) -> Command {
        let prev = self.phase;
        self.phase = TrackPhase::Tracking { last: center };
        match prev {
            TrackPhase::Uninitialized => {
                tracing::trace!(?center, "controller initialized");
                Command::ZERO
            }
            TrackPhase::Tracking { last } => {
                let dx = i64::from(center[0]) - i64::from(last[0]);
                let dy = i64::from(center[1]) - i64::from(last[1]);
                let cmd = Command {
                    dx: dx.signum() as i32 * self.step[0],
                    dy: dy.signum() as i32 * self.step[1],
                };
                tracing::trace!(dx, dy, ?cmd, "controller step");
                cmd
            }
        }
    }

    /// Overwrite the stored center (`None` returns to uninitialized).
    pub fn reset_to(&mut self, last: Option<[i32; 2]>) {
        self.phase = match last {
            Some(last) => TrackPhase::Tracking { last },
            None => TrackPhase::Uninitialized,
        };
    }
}

/// Direction of motion from `last` to `center` in degrees, y-down image
/// frame. `None` when the two coincide.
pub fn velocity_heading_deg(last: [i32; 2], center: [i32; 2]) -> Option<f64> {
    let dx = f64::from(center[0]) - f64::from(last[0]);
    let dy = f64::from(center[1]) - f64::from(last[1]);
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    Some(dy.atan2(dx).to_degrees())
}

/// Last-center memory producing a velocity heading per observation.
#[derive(Debug, Clone, Default)]
pub struct HeadingEstimator {
    last: Option<[i32; 2]>,
}

impl HeadingEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading from the previous center, then remember `center`.
    pub fn update(&mut self, center: [i32; 2]) -> Option<f64> {
        let heading = self
            .last
            .and_then(|last| velocity_heading_deg(last, center));
        self.last = Some(center);
        heading
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn first_call_returns_zero_and_starts_tracking() {
        let mut c = Controller::with_default_steps();
        assert_eq!(c.state(), TrackPhase::Uninitialized);
        assert_eq!(c.get_command([321, 77]), Command::ZERO);
        assert_eq!(c.state(), TrackPhase::Tracking { last: [321, 77] });
    }

    #[test]
    fn direction_is_quantized_to_steps() {
        let mut c = Controller::new(5, 5).expect("valid steps");
        c.reset_to(Some([100, 100]));
        assert_eq!(c.get_command([130, 80]), Command { dx: 5, dy: -5 });
        assert_eq!(c.get_command([130, 80]), Command::ZERO);
        assert_eq!(c.last(), Some([130, 80]));
    }

    #[test]
    fn steps_are_per_axis() {
        let mut c = Controller::new(3, 7).expect("valid steps");
        c.get_command([10, 10]);
        assert_eq!(c.get_command([9, 11]), Command { dx: -3, dy: 7 });
        assert_eq!(c.get_command([9, 40]), Command { dx: 0, dy: 7 });
    }

    #[test]
    fn magnitude_does_not_scale_with_displacement() {
        let mut c = Controller::with_default_steps();
        c.get_command([0, 0]);
        assert_eq!(c.get_command([1, 0]), Command { dx: 5, dy: 0 });
        assert_eq!(c.get_command([1000, 0]), Command { dx: 5, dy: 0 });
        assert_eq!(c.get_command([i32::MIN, i32::MAX]), Command { dx: -5, dy: 5 });
    }

    #[test]
    fn non_positive_steps_are_rejected() {
        assert!(Controller::new(0, 5).is_err());
        assert!(Controller::new(5, -1).is_err());
    }

    #[test]
    fn reset_to_none_reinitializes() {
        let mut c = Controller::with_default_steps();
        c.get_command([1, 1]);
        c.reset_to(None);
        assert_eq!(c.state(), TrackPhase::Uninitialized);
        assert_eq!(c.get_command([50, 50]), Command::ZERO);
    }

    #[test]
    fn velocity_heading_uses_image_axes() {
        assert_abs_diff_eq!(velocity_heading_deg([0, 0], [10, 0]).unwrap(), 0.0);
        assert_abs_diff_eq!(velocity_heading_deg([0, 0], [0, 10]).unwrap(), 90.0);
        assert_abs_diff_eq!(velocity_heading_deg([0, 0], [-5, -5]).unwrap(), -135.0);
        assert!(velocity_heading_deg([3, 4], [3, 4]).is_none());
    }

    #[test]
    fn heading_estimator_needs_two_observations() {
        let mut h = HeadingEstimator::new();
        assert!(h.update([10, 10]).is_none());
        let a = h.update([20, 20]).expect("heading");
        assert_abs_diff_eq!(a, 45.0, epsilon = 1e-12);
        h.reset();
        assert!(h.update([0, 0]).is_none());
    }
}
