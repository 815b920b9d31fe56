//! Understanding what the user is doing
//!
//! Telemetry flows through here in order: [`unified_event`] merges every
//! source into one stream, [`activity`] extracts clicks, drags and typing
//! sessions, [`classifier`] labels the timeline and [`segmenter`] turns
//! the labels into camera scenes.

pub mod activity;
pub mod classifier;
pub mod segmenter;
pub mod types;
pub mod unified_event;

pub use activity::{ActivityCollector, ActivityEvent, ActivityKind};
pub use classifier::IntentClassifier;
pub use segmenter::{should_start_new_scene, CameraScene, SceneSegmenter};
pub use types::{
    DragContext, FocusRegion, FocusSource, IntentCategory, IntentSpan, TimeRange, TypingContext,
    UserIntent,
};
pub use unified_event::{build_unified_events, EventKind, UnifiedEvent};
