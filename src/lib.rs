//! Smart Zoom - automatic camera planning for screen recordings.
//!
//! Takes the input telemetry captured alongside a recording (cursor path,
//! clicks, keys, drags, accessibility samples) and plans where a virtual
//! camera should zoom and pan, producing editable segment tracks and a
//! per-frame transform stream for the renderer.

pub mod camera;
pub mod capture;
pub mod commands;
pub mod error;
pub mod geometry;
pub mod intent;
pub mod pipeline;
pub mod processing;
pub mod settings;
pub mod tracks;

pub use error::{ProcessingError, ProcessingResult};
pub use pipeline::{CameraPlan, PlanDiagnostics, SmartZoomPipeline};
pub use settings::SmartZoomSettings;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber
///
/// Honours `RUST_LOG`; calling it again after a subscriber is set does nothing.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_zoom=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
