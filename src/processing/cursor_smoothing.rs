//! Spring-follow cursor smoothing
//!
//! Runs a [`Spring2D`] behind the recorded cursor so playback shows a
//! cursor that glides instead of twitching. Large jumps (the cursor
//! leaving one display and appearing on another, or a warp) reset the
//! spring rather than producing a long swoop across the frame.

use crate::capture::input::types::MousePositionData;
use crate::geometry::NormalizedPoint;
use crate::processing::spring::Spring2D;
use crate::settings::SpringConfig;
use serde::{Deserialize, Serialize};

/// Smoothed cursor sample with the raw position it followed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothedPosition {
    pub time: f64,
    pub position: NormalizedPoint,
    pub raw_position: NormalizedPoint,
}

/// Default teleport threshold in normalized units (a quarter of the frame)
pub const DEFAULT_TELEPORT_THRESHOLD: f64 = 0.25;

/// Smooth raw samples into one position per output frame
///
/// Each frame follows the latest raw sample at or before the frame time.
pub fn smooth_cursor_data(
    raw: &[MousePositionData],
    config: &SpringConfig,
    output_fps: f64,
    teleport_threshold: f64,
) -> Vec<SmoothedPosition> {
    let Some(first) = raw.first() else {
        return vec![];
    };
    if !(output_fps.is_finite() && output_fps > 0.0) {
        tracing::warn!("Invalid output frame rate {}, skipping cursor smoothing", output_fps);
        return vec![];
    }

    let frame_duration = 1.0 / output_fps;
    let start = first.time;
    let total = raw.last().map(|m| m.time - start).unwrap_or(0.0).max(0.0);
    let frame_count = ((total / frame_duration).ceil() as usize).max(1);

    let mut result = Vec::with_capacity(frame_count);
    let mut spring = Spring2D::new(first.position);
    let mut raw_index = 0;
    let mut last_raw = first.position;

    for frame in 0..frame_count {
        let frame_time = start + frame as f64 * frame_duration;

        while raw_index + 1 < raw.len() && raw[raw_index + 1].time <= frame_time {
            raw_index += 1;
        }
        let sample = &raw[raw_index];

        if detect_teleport(&last_raw, &sample.position, teleport_threshold) {
            spring.reset(sample.position);
        } else if frame > 0 {
            spring.step(sample.position, config, frame_duration);
        }
        last_raw = sample.position;

        result.push(SmoothedPosition {
            time: frame_time,
            position: spring.position(),
            raw_position: sample.position.to_top_left(),
        });
    }

    result
}

/// Follow an already dense path, keeping its timestamps
///
/// Used to blend a spring feel into spline output.
pub fn follow_path(
    samples: &[MousePositionData],
    config: &SpringConfig,
    teleport_threshold: f64,
) -> Vec<MousePositionData> {
    let Some(first) = samples.first() else {
        return vec![];
    };

    let mut spring = Spring2D::new(first.position);
    let mut previous = first;
    let mut result = Vec::with_capacity(samples.len());
    result.push(MousePositionData {
        time: first.time,
        position: first.position.to_top_left(),
    });

    for sample in samples.iter().skip(1) {
        if detect_teleport(&previous.position, &sample.position, teleport_threshold) {
            spring.reset(sample.position);
        } else {
            spring.step(sample.position, config, sample.time - previous.time);
        }
        previous = sample;
        result.push(MousePositionData {
            time: sample.time,
            position: spring.position(),
        });
    }

    result
}

/// Whether the cursor jumped further than `threshold` between two samples
pub fn detect_teleport(prev: &NormalizedPoint, curr: &NormalizedPoint, threshold: f64) -> bool {
    prev.distance_to(curr) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SpringConfig {
        SpringConfig::default()
    }

    #[test]
    fn test_empty_input() {
        assert!(smooth_cursor_data(&[], &config(), 30.0, DEFAULT_TELEPORT_THRESHOLD).is_empty());
        assert!(follow_path(&[], &config(), DEFAULT_TELEPORT_THRESHOLD).is_empty());
    }

    #[test]
    fn test_single_point() {
        let raw = vec![MousePositionData::new(0.0, 0.3, 0.6)];
        let result = smooth_cursor_data(&raw, &config(), 30.0, DEFAULT_TELEPORT_THRESHOLD);
        assert_eq!(result.len(), 1);
        assert!((result[0].position.x - 0.3).abs() < 1e-9);
        assert!((result[0].position.y - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_smoothing_reduces_jitter() {
        let raw: Vec<MousePositionData> = (0..120)
            .map(|i| {
                let base = 0.2 + i as f64 * 0.004;
                let jitter = if i % 2 == 0 { 0.01 } else { -0.01 };
                MousePositionData::new(i as f64 / 120.0, base + jitter, 0.5)
            })
            .collect();

        let smoothed = smooth_cursor_data(&raw, &config(), 60.0, DEFAULT_TELEPORT_THRESHOLD);

        let roughness = |xs: &[f64]| {
            xs.windows(3)
                .map(|w| (w[1] - (w[0] + w[2]) / 2.0).abs())
                .sum::<f64>()
                / (xs.len() - 2) as f64
        };
        let raw_x: Vec<f64> = raw.iter().map(|m| m.position.x).collect();
        let smooth_x: Vec<f64> = smoothed.iter().map(|m| m.position.x).collect();

        assert!(
            roughness(&smooth_x) < roughness(&raw_x),
            "smoothed roughness {} should be below raw {}",
            roughness(&smooth_x),
            roughness(&raw_x)
        );
    }

    #[test]
    fn test_teleport_resets_spring() {
        let raw = vec![
            MousePositionData::new(0.0, 0.0, 0.0),
            MousePositionData::new(0.033, 0.01, 0.01),
            MousePositionData::new(0.066, 0.02, 0.02),
            MousePositionData::new(0.1, 0.9, 0.9),
            MousePositionData::new(0.133, 0.91, 0.91),
        ];

        let smoothed = smooth_cursor_data(&raw, &config(), 30.0, DEFAULT_TELEPORT_THRESHOLD);
        let after = smoothed.iter().find(|m| m.time >= 0.1).unwrap();
        assert!(
            (after.position.x - after.raw_position.x).abs() < 0.1,
            "after a teleport the spring should sit near the raw cursor, got {:?}",
            after
        );
    }

    #[test]
    fn test_follow_path_keeps_timestamps() {
        let samples: Vec<MousePositionData> = (0..10)
            .map(|i| MousePositionData::new(i as f64 * 0.1, i as f64 * 0.05, 0.5))
            .collect();
        let followed = follow_path(&samples, &config(), DEFAULT_TELEPORT_THRESHOLD);
        assert_eq!(followed.len(), samples.len());
        for (a, b) in followed.iter().zip(&samples) {
            assert_eq!(a.time, b.time);
        }
        // Spring lags behind a moving target
        assert!(followed[5].position.x < samples[5].position.x);
    }
}
