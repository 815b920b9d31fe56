//! Recorded input telemetry
//!
//! Capture itself happens in the recorder; this crate only reads what it
//! wrote.

pub mod input;

pub use input::{MouseDataSource, Recording};
