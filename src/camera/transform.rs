//! Zoom/center values and how to blend between them

use crate::geometry::{clamp_center, lerp, viewport_rect, NormalizedPoint, NormalizedRect, EPSILON};
use crate::processing::easing::EasingCurve;
use serde::{Deserialize, Serialize};

/// Camera state the renderer consumes: magnification and the frame point
/// at the middle of the output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformValue {
    pub zoom: f64,
    pub center: NormalizedPoint,
}

impl Default for TransformValue {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformValue {
    pub fn new(zoom: f64, center: NormalizedPoint) -> Self {
        Self {
            zoom,
            center: center.to_top_left(),
        }
    }

    /// Full frame, no zoom
    pub fn identity() -> Self {
        Self {
            zoom: 1.0,
            center: NormalizedPoint::center(),
        }
    }

    /// Visible part of the frame
    pub fn viewport(&self) -> NormalizedRect {
        viewport_rect(self.center, self.zoom)
    }

    /// Same value with the center moved so the viewport stays inside the frame
    pub fn clamped(&self) -> Self {
        let zoom = self.zoom.max(1.0);
        Self {
            zoom,
            center: clamp_center(self.center, zoom),
        }
    }
}

/// How two transforms are blended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterpolationMode {
    /// Zoom and center blend independently
    #[default]
    Screen,
    /// Blend around the fixed point of the two viewports, so content under
    /// that point never slides while zoom and center change together
    Window,
}

/// Blend `from` toward `to` by eased progress `t`
pub fn interpolate(from: &TransformValue, to: &TransformValue, t: f64, mode: InterpolationMode) -> TransformValue {
    match mode {
        InterpolationMode::Screen => interpolate_screen(from, to, t),
        InterpolationMode::Window => interpolate_window(from, to, t),
    }
}

fn interpolate_screen(from: &TransformValue, to: &TransformValue, t: f64) -> TransformValue {
    TransformValue {
        zoom: lerp(from.zoom, to.zoom, t),
        center: from.center.lerp(&to.center, t),
    }
}

/// Anchor blend: per axis, viewport size `s = 1/zoom` and origin
/// `o = c - s/2`. The source point `p = (o0*s1 - o1*s0) / (s1 - s0)` sits at
/// the same viewport coordinate in both transforms; keeping it there while
/// `s` is interpolated gives the blended origin.
fn interpolate_window(from: &TransformValue, to: &TransformValue, t: f64) -> TransformValue {
    let s0 = 1.0 / from.zoom.max(EPSILON);
    let s1 = 1.0 / to.zoom.max(EPSILON);
    if (s1 - s0).abs() < EPSILON {
        return interpolate_screen(from, to, t);
    }

    let s = lerp(s0, s1, t);
    let axis = |c0: f64, c1: f64| {
        let o0 = c0 - s0 / 2.0;
        let o1 = c1 - s1 / 2.0;
        let anchor = (o0 * s1 - o1 * s0) / (s1 - s0);
        let u = (anchor - o0) / s0;
        let origin = anchor - u * s;
        origin + s / 2.0
    };

    TransformValue {
        zoom: 1.0 / s,
        center: NormalizedPoint::new(
            axis(from.center.x, to.center.x),
            axis(from.center.y, to.center.y),
        ),
    }
}

/// A transform pinned to a time
///
/// `easing` shapes the approach into this keyframe from the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformKeyframe {
    pub time: f64,
    pub value: TransformValue,
    #[serde(default)]
    pub easing: EasingCurve,
}

impl TransformKeyframe {
    pub fn new(time: f64, value: TransformValue, easing: EasingCurve) -> Self {
        Self { time, value, easing }
    }
}

/// Transform at `time` along time-ordered keyframes
///
/// Holds the first value before the first keyframe and the last value after
/// the last one. No keyframes yields the identity transform.
pub fn interpolate_keyframes(keyframes: &[TransformKeyframe], time: f64, mode: InterpolationMode) -> TransformValue {
    let (Some(first), Some(last)) = (keyframes.first(), keyframes.last()) else {
        return TransformValue::identity();
    };
    if time <= first.time {
        return first.value;
    }
    if time >= last.time {
        return last.value;
    }

    let idx = keyframes.partition_point(|k| k.time <= time);
    let (from, to) = (&keyframes[idx - 1], &keyframes[idx]);
    let span = to.time - from.time;
    if span < EPSILON {
        return to.value;
    }
    let progress = to.easing.apply((time - from.time) / span, span);
    interpolate(&from.value, &to.value, progress, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(zoom: f64, x: f64, y: f64) -> TransformValue {
        TransformValue::new(zoom, NormalizedPoint::new(x, y))
    }

    fn close(a: &TransformValue, b: &TransformValue) -> bool {
        (a.zoom - b.zoom).abs() < 1e-9 && a.center.distance_to(&b.center) < 1e-9
    }

    #[test]
    fn test_endpoints_match_in_both_modes() {
        let a = value(1.0, 0.5, 0.5);
        let b = value(2.0, 0.3, 0.7);
        for mode in [InterpolationMode::Screen, InterpolationMode::Window] {
            assert!(close(&interpolate(&a, &b, 0.0, mode), &a), "{:?} at 0", mode);
            assert!(close(&interpolate(&a, &b, 1.0, mode), &b), "{:?} at 1", mode);
        }
    }

    #[test]
    fn test_window_mode_keeps_anchor_fixed() {
        // Zooming into the top-left quadrant from the full frame: the frame
        // origin is the fixed point and must stay at the viewport origin.
        let a = value(1.0, 0.5, 0.5);
        let b = value(2.0, 0.25, 0.25);
        for t in [0.25, 0.5, 0.75] {
            let mid = interpolate(&a, &b, t, InterpolationMode::Window);
            let viewport = mid.viewport();
            assert!(viewport.x.abs() < 1e-9, "origin drifted to {} at t={}", viewport.x, t);
            assert!(viewport.y.abs() < 1e-9);
        }

        let screen = interpolate(&a, &b, 0.5, InterpolationMode::Screen);
        assert!(screen.viewport().x > 1e-3, "screen mode slides the origin");
    }

    #[test]
    fn test_window_mode_falls_back_for_equal_zoom() {
        let a = value(2.0, 0.3, 0.3);
        let b = value(2.0, 0.7, 0.6);
        let mid = interpolate(&a, &b, 0.5, InterpolationMode::Window);
        assert!(close(&mid, &value(2.0, 0.5, 0.45)));
    }

    #[test]
    fn test_interpolation_stays_in_frame() {
        let a = value(2.5, 0.2, 0.8).clamped();
        let b = value(1.2, 0.9, 0.1).clamped();
        for mode in [InterpolationMode::Screen, InterpolationMode::Window] {
            for i in 0..=20 {
                let v = interpolate(&a, &b, i as f64 / 20.0, mode).viewport();
                assert!(v.min_x() >= -1e-9 && v.max_x() <= 1.0 + 1e-9, "{:?} {:?}", mode, v);
                assert!(v.min_y() >= -1e-9 && v.max_y() <= 1.0 + 1e-9, "{:?} {:?}", mode, v);
            }
        }
    }

    #[test]
    fn test_keyframes() {
        assert_eq!(
            interpolate_keyframes(&[], 1.0, InterpolationMode::Screen),
            TransformValue::identity()
        );

        let keyframes = vec![
            TransformKeyframe::new(1.0, value(1.0, 0.5, 0.5), EasingCurve::Linear),
            TransformKeyframe::new(3.0, value(2.0, 0.5, 0.5), EasingCurve::Linear),
        ];
        let before = interpolate_keyframes(&keyframes, 0.0, InterpolationMode::Screen);
        let mid = interpolate_keyframes(&keyframes, 2.0, InterpolationMode::Screen);
        let after = interpolate_keyframes(&keyframes, 5.0, InterpolationMode::Screen);
        assert_eq!(before.zoom, 1.0);
        assert!((mid.zoom - 1.5).abs() < 1e-9);
        assert_eq!(after.zoom, 2.0);
    }
}
