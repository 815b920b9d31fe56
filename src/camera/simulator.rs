//! Turns the discrete shot/transition plan into continuous camera motion
//!
//! Each scene opens with the transition that leads into it, then holds its
//! shot until the scene ends. Transitions never spill into the following
//! scene: when one does not fit it is shortened to the scene length.

use crate::camera::shot_planner::ShotPlan;
use crate::camera::transform::{InterpolationMode, TransformValue};
use crate::camera::transition_planner::{TransitionPlan, TransitionStyle};
use crate::geometry::{clamp_center, EPSILON};
use crate::intent::segmenter::CameraScene;
use crate::settings::SimulationSettings;
use crate::tracks::segments::{CameraMotion, CameraSegment};
use serde::{Deserialize, Serialize};

/// Camera transform sampled at one output frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedTransform {
    pub time: f64,
    pub value: TransformValue,
}

pub struct CameraPathSimulator {
    settings: SimulationSettings,
    /// Zoom targeted by the first phase of a zoom-out-and-in transition
    zoom_out_level: f64,
}

impl CameraPathSimulator {
    pub fn new(settings: SimulationSettings, zoom_out_level: f64) -> Self {
        Self {
            settings,
            zoom_out_level,
        }
    }

    /// Ordered, non-overlapping camera segments covering every scene
    ///
    /// `transitions[i]` is expected to lead from scene `i` into scene `i + 1`;
    /// a missing transition is treated as a cut.
    pub fn build_segments(
        &self,
        scenes: &[CameraScene],
        shots: &[ShotPlan],
        transitions: &[TransitionPlan],
    ) -> Vec<CameraSegment> {
        let mut segments = Vec::new();
        let mut previous: Option<TransformValue> = None;

        for (i, (scene, shot)) in scenes.iter().zip(shots).enumerate() {
            let target = TransformValue::new(shot.ideal_zoom, shot.ideal_center).clamped();
            let (start, end) = (scene.range.start, scene.range.end);
            let mut cursor = start;

            let incoming = i
                .checked_sub(1)
                .and_then(|from| transitions.iter().find(|t| t.from_index == from))
                .map(|t| t.style);

            if let (Some(from), Some(style)) = (previous, incoming) {
                cursor = self.push_transition(&mut segments, from, target, style, start, end);
            }

            if end - cursor > EPSILON {
                segments.push(CameraSegment::hold(cursor, end, target));
            }
            previous = Some(target);
        }

        tracing::debug!("Built {} camera segments for {} scenes", segments.len(), scenes.len());
        segments
    }

    /// Append the segments of one transition, returning where it ends
    fn push_transition(
        &self,
        segments: &mut Vec<CameraSegment>,
        from: TransformValue,
        to: TransformValue,
        style: TransitionStyle,
        start: f64,
        scene_end: f64,
    ) -> f64 {
        let available = (scene_end - start).max(0.0);
        match style {
            TransitionStyle::Cut => start,
            TransitionStyle::DirectPan { duration, easing } => {
                let length = duration.max(0.0).min(available);
                if length <= EPSILON {
                    return start;
                }
                segments.push(CameraSegment::new(start, start + length, from, to, easing, CameraMotion::Pan));
                start + length
            }
            TransitionStyle::ZoomOutAndIn {
                out_duration,
                in_duration,
                out_easing,
                in_easing,
            } => {
                let (out_len, in_len) = fit_phases(out_duration.max(0.0), in_duration.max(0.0), available);
                if out_len + in_len <= EPSILON {
                    return start;
                }
                let midpoint = self.zoom_out_midpoint(&from, &to);
                let split = start + out_len;
                let finish = split + in_len;
                segments.push(CameraSegment::new(start, split, from, midpoint, out_easing, CameraMotion::ZoomOut));
                segments.push(CameraSegment::new(split, finish, midpoint, to, in_easing, CameraMotion::ZoomIn));
                finish
            }
        }
    }

    /// Pulled-back transform halfway between two shots
    fn zoom_out_midpoint(&self, from: &TransformValue, to: &TransformValue) -> TransformValue {
        let zoom = self.zoom_out_level.min(from.zoom).min(to.zoom).max(1.0);
        let center = from.center.lerp(&to.center, 0.5);
        TransformValue::new(zoom, clamp_center(center, zoom))
    }

    /// Transform at every output frame in `[0, duration)`
    pub fn sample(&self, segments: &[CameraSegment], duration: f64) -> Vec<TimedTransform> {
        let fps = self.settings.output_frame_rate;
        if !(fps.is_finite() && fps > 0.0 && duration.is_finite() && duration > 0.0) {
            return vec![];
        }
        let frame_count = (duration * fps).ceil() as usize;
        let mode = self.settings.interpolation_mode;

        (0..frame_count)
            .map(|frame| {
                let time = frame as f64 / fps;
                TimedTransform {
                    time,
                    value: value_at(segments, time, mode),
                }
            })
            .collect()
    }
}

/// Scale two phases down proportionally when together they exceed `available`
fn fit_phases(out_len: f64, in_len: f64, available: f64) -> (f64, f64) {
    let total = out_len + in_len;
    if total <= available || total <= 0.0 {
        return (out_len, in_len);
    }
    let scale = available / total;
    (out_len * scale, in_len * scale)
}

/// Transform at `time` along time-ordered segments
///
/// Before the first segment the first start value holds, after the last the
/// last end value holds, and gaps hold the previous segment's end value.
pub fn value_at(segments: &[CameraSegment], time: f64, mode: InterpolationMode) -> TransformValue {
    let Some(first) = segments.first() else {
        return TransformValue::identity();
    };
    if time < first.start_time {
        return first.start;
    }
    let idx = segments.partition_point(|s| s.start_time <= time);
    let segment = &segments[idx.saturating_sub(1)];
    segment.value_at(time, mode)
}
