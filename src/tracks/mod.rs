//! Editable segment tracks handed to the renderer

pub mod generators;
pub mod segments;

pub use generators::{
    CameraGenerator, CursorGenerator, GenerationContext, KeyframeGenerator, KeystrokeGenerator,
};
pub use segments::{
    CameraMotion, CameraSegment, CameraTrack, CursorSegment, CursorTrack, KeystrokeSegment,
    KeystrokeTrack, SegmentTrack, TimedSegment, Track, TrackStatistics,
};
