//! Signal processing for the cursor path and for animation curves
//!
//! Cleaning and spline reconstruction operate on recorded cursor samples;
//! the easing engine and the follow spring are reused by every animator
//! downstream.

pub mod cursor_smoothing;
pub mod easing;
pub mod signal_cleaner;
pub mod spline;
pub mod spring;

pub use cursor_smoothing::{smooth_cursor_data, SmoothedPosition};
pub use easing::EasingCurve;
pub use signal_cleaner::{clean, clean_with_report, CleaningReport};
pub use spline::{interpolate_with_spring, SplineInterpolator};
pub use spring::{Spring2D, SpringState};
