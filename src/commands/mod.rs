//! File-level entry points
//!
//! Thin wrappers that load recordings from disk, run the planner and write
//! results back. Everything else in the crate works on in-memory values.

pub mod processing;

pub use processing::{
    default_settings, follow_cursor, load_recording, plan_camera, process_camera_plan, smooth_cursor,
};
