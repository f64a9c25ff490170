//! Per-frame pipeline glue.
//!
//! Wires the stages in order: segment -> extract -> order -> rectify ->
//! locate. Algorithmic primitives live in `crate::segment`, `crate::contour`,
//! `crate::corners`, `crate::rectify` and `crate::locate`; this layer only
//! handles stage boundaries and error mapping.
//!
//! The pipeline is stateless. Motion tracking across frames lives in
//! [`crate::Tracker`].

mod result;
mod run;

pub use result::{FrameOutput, FrameReport};
pub use run::process_frame;
