//! Timed segments and the tracks that hold them
//!
//! Tracks are values: editing returns a new track and leaves the original
//! untouched.

use crate::camera::transform::{interpolate, InterpolationMode, TransformValue};
use crate::geometry::EPSILON;
use crate::processing::easing::EasingCurve;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anything occupying `[start_time, end_time)` on a track
pub trait TimedSegment {
    fn id(&self) -> Uuid;
    fn start_time(&self) -> f64;
    fn end_time(&self) -> f64;

    fn duration(&self) -> f64 {
        (self.end_time() - self.start_time()).max(0.0)
    }

    fn contains(&self, time: f64) -> bool {
        time >= self.start_time() && time < self.end_time()
    }
}

/// What a camera segment is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraMotion {
    Hold,
    Pan,
    ZoomOut,
    ZoomIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSegment {
    pub id: Uuid,
    pub start_time: f64,
    pub end_time: f64,
    pub start: TransformValue,
    pub end: TransformValue,
    pub easing: EasingCurve,
    pub motion: CameraMotion,
}

impl CameraSegment {
    pub fn new(
        start_time: f64,
        end_time: f64,
        start: TransformValue,
        end: TransformValue,
        easing: EasingCurve,
        motion: CameraMotion,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time,
            start,
            end,
            easing,
            motion,
        }
    }

    pub fn hold(start_time: f64, end_time: f64, value: TransformValue) -> Self {
        Self::new(start_time, end_time, value, value, EasingCurve::Linear, CameraMotion::Hold)
    }

    /// Transform at `time`, clamped to the segment
    pub fn value_at(&self, time: f64, mode: InterpolationMode) -> TransformValue {
        let length = self.duration();
        if length < EPSILON {
            return self.end;
        }
        let t = ((time - self.start_time) / length).clamp(0.0, 1.0);
        let progress = self.easing.apply(t, length);
        interpolate(&self.start, &self.end, progress, mode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorSegment {
    pub id: Uuid,
    pub start_time: f64,
    pub end_time: f64,
    pub visible: bool,
    pub scale: f64,
}

impl CursorSegment {
    pub fn new(start_time: f64, end_time: f64, visible: bool, scale: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time,
            visible,
            scale,
        }
    }
}

/// On-screen label for a key press
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeystrokeSegment {
    pub id: Uuid,
    pub start_time: f64,
    pub end_time: f64,
    pub label: String,
}

impl KeystrokeSegment {
    pub fn new(start_time: f64, end_time: f64, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time,
            label: label.into(),
        }
    }
}

macro_rules! timed_segment {
    ($ty:ty) => {
        impl TimedSegment for $ty {
            fn id(&self) -> Uuid {
                self.id
            }

            fn start_time(&self) -> f64 {
                self.start_time
            }

            fn end_time(&self) -> f64 {
                self.end_time
            }
        }
    };
}

timed_segment!(CameraSegment);
timed_segment!(CursorSegment);
timed_segment!(KeystrokeSegment);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackStatistics {
    pub segment_count: usize,
    /// Sum of segment durations
    pub covered: f64,
    pub first_start: Option<f64>,
    pub last_end: Option<f64>,
}

/// Read access shared by every track
pub trait Track {
    type Segment: TimedSegment;

    fn segments(&self) -> &[Self::Segment];

    fn segment_at(&self, time: f64) -> Option<&Self::Segment> {
        let segments = self.segments();
        let idx = segments.partition_point(|s| s.end_time() <= time);
        segments.get(idx).filter(|s| s.contains(time))
    }

    fn statistics(&self) -> TrackStatistics {
        let segments = self.segments();
        TrackStatistics {
            segment_count: segments.len(),
            covered: segments.iter().map(TimedSegment::duration).sum(),
            first_start: segments.first().map(TimedSegment::start_time),
            last_end: segments.last().map(TimedSegment::end_time),
        }
    }
}

/// Ordered, non-overlapping list of segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentTrack<S> {
    segments: Vec<S>,
}

impl<S> Default for SegmentTrack<S> {
    fn default() -> Self {
        Self { segments: Vec::new() }
    }
}

impl<S: TimedSegment + SegmentBounds + Clone> SegmentTrack<S> {
    /// Sorts by start time; overlapping segments are trimmed to start where
    /// the previous one ends, and dropped if nothing is left
    pub fn new(mut segments: Vec<S>) -> Self {
        segments.sort_by(|a, b| a.start_time().total_cmp(&b.start_time()));
        let mut ordered: Vec<S> = Vec::with_capacity(segments.len());
        for mut segment in segments {
            if let Some(previous) = ordered.last() {
                if segment.start_time() < previous.end_time() {
                    segment.set_start_time(previous.end_time());
                }
            }
            if segment.duration() > EPSILON {
                ordered.push(segment);
            }
        }
        Self { segments: ordered }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&S> {
        self.segments.iter().find(|s| s.id() == id)
    }

    /// New track with the segment `id` replaced by `f(segment)`
    pub fn update(&self, id: Uuid, f: impl FnOnce(&S) -> S) -> Self {
        let mut f = Some(f);
        let segments = self
            .segments
            .iter()
            .map(|s| {
                if s.id() == id {
                    if let Some(f) = f.take() {
                        return f(s);
                    }
                }
                s.clone()
            })
            .collect();
        Self::new(segments)
    }

    /// New track without the segment `id`
    pub fn remove(&self, id: Uuid) -> Self {
        Self {
            segments: self.segments.iter().filter(|s| s.id() != id).cloned().collect(),
        }
    }

    /// Whether segments are time ordered and never overlap
    pub fn is_well_formed(&self) -> bool {
        self.segments
            .windows(2)
            .all(|w| w[0].end_time() <= w[1].start_time() + EPSILON)
    }
}

impl<S: TimedSegment> Track for SegmentTrack<S> {
    type Segment = S;

    fn segments(&self) -> &[S] {
        &self.segments
    }
}

/// Segments whose start can be moved when resolving overlaps
pub trait SegmentBounds {
    fn set_start_time(&mut self, start: f64);
}

macro_rules! segment_bounds {
    ($ty:ty) => {
        impl SegmentBounds for $ty {
            fn set_start_time(&mut self, start: f64) {
                self.start_time = start;
            }
        }
    };
}

segment_bounds!(CameraSegment);
segment_bounds!(CursorSegment);
segment_bounds!(KeystrokeSegment);

pub type CameraTrack = SegmentTrack<CameraSegment>;
pub type CursorTrack = SegmentTrack<CursorSegment>;
pub type KeystrokeTrack = SegmentTrack<KeystrokeSegment>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NormalizedPoint;

    fn cursor(start: f64, end: f64) -> CursorSegment {
        CursorSegment::new(start, end, true, 1.0)
    }

    #[test]
    fn test_new_sorts_and_trims_overlaps() {
        let track = CursorTrack::new(vec![cursor(2.0, 4.0), cursor(0.0, 2.5), cursor(2.6, 3.0)]);
        let times: Vec<(f64, f64)> = track.segments().iter().map(|s| (s.start_time, s.end_time)).collect();
        assert_eq!(times, vec![(0.0, 2.5), (2.5, 4.0)], "fully covered segment dropped");
        assert!(track.is_well_formed());
    }

    #[test]
    fn test_update_and_remove_return_new_tracks() {
        let track = CursorTrack::new(vec![cursor(0.0, 1.0), cursor(1.0, 2.0)]);
        let id = track.segments()[1].id;

        let hidden = track.update(id, |s| CursorSegment {
            visible: false,
            ..s.clone()
        });
        assert!(track.segments()[1].visible, "original untouched");
        assert_eq!(hidden.get(id).map(|s| s.visible), Some(false));

        let removed = track.remove(id);
        assert_eq!(removed.len(), 1);
        assert_eq!(track.len(), 2);
        assert!(removed.get(id).is_none());
    }

    #[test]
    fn test_segment_at_and_statistics() {
        let track = CursorTrack::new(vec![cursor(0.0, 1.0), cursor(1.5, 2.0)]);
        assert!(track.segment_at(0.5).is_some());
        assert!(track.segment_at(1.2).is_none(), "gap between segments");
        assert_eq!(track.segment_at(1.5).map(|s| s.start_time), Some(1.5));
        assert!(track.segment_at(2.0).is_none(), "end is exclusive");

        let stats = track.statistics();
        assert_eq!(stats.segment_count, 2);
        assert!((stats.covered - 1.5).abs() < 1e-12);
        assert_eq!(stats.first_start, Some(0.0));
        assert_eq!(stats.last_end, Some(2.0));
        assert_eq!(CursorTrack::default().statistics(), TrackStatistics::default());
    }

    #[test]
    fn test_camera_segment_value_at() {
        let from = TransformValue::identity();
        let to = TransformValue::new(2.0, NormalizedPoint::new(0.3, 0.3));
        let segment = CameraSegment::new(1.0, 2.0, from, to, EasingCurve::Linear, CameraMotion::Pan);
        let mode = InterpolationMode::Screen;

        assert_eq!(segment.value_at(0.0, mode), from);
        assert!((segment.value_at(1.5, mode).zoom - 1.5).abs() < 1e-9);
        assert_eq!(segment.value_at(3.0, mode).zoom, 2.0);
    }
}
