//! Cursor signal cleaning
//!
//! Four independent stages turn a dense, noisy cursor log into a compact
//! path that still follows the user's intentional motion:
//!
//! 1. jitter removal (centered moving average)
//! 2. idle compression (long stationary runs collapse to their endpoints)
//! 3. Douglas-Peucker path simplification
//! 4. velocity-adaptive resampling
//!
//! No stage ever adds samples, and every stage passes tiny inputs through.

use crate::capture::input::types::MousePositionData;
use crate::geometry::{NormalizedPoint, EPSILON};
use crate::settings::SignalCleanerSettings;
use serde::{Deserialize, Serialize};

/// Sample counts after each stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningReport {
    pub input: usize,
    pub after_jitter: usize,
    pub after_idle: usize,
    pub after_simplify: usize,
    pub after_resample: usize,
}

/// Run every enabled stage in order
pub fn clean(positions: &[MousePositionData], settings: &SignalCleanerSettings) -> Vec<MousePositionData> {
    clean_with_report(positions, settings).0
}

/// Same as [`clean`], also reporting how many samples each stage kept
pub fn clean_with_report(
    positions: &[MousePositionData],
    settings: &SignalCleanerSettings,
) -> (Vec<MousePositionData>, CleaningReport) {
    let mut report = CleaningReport {
        input: positions.len(),
        ..Default::default()
    };

    let mut current: Vec<MousePositionData> = positions
        .iter()
        .map(|p| MousePositionData {
            time: p.time,
            position: p.position.to_top_left(),
        })
        .collect();

    if settings.jitter_removal_enabled {
        current = remove_jitter(&current, settings.jitter_window_size);
    }
    report.after_jitter = current.len();

    if settings.idle_compression_enabled {
        current = compress_idle(
            &current,
            settings.idle_velocity_threshold,
            settings.idle_min_duration,
        );
    }
    report.after_idle = current.len();

    if settings.simplification_enabled {
        current = simplify_path(&current, settings.epsilon);
    }
    report.after_simplify = current.len();

    if settings.resampling_enabled {
        current = resample_adaptive(
            &current,
            settings.min_interval,
            settings.max_interval,
            settings.reference_velocity,
        );
    }
    report.after_resample = current.len();

    tracing::debug!(
        "Cleaned cursor path: {} -> {} (jitter {}, idle {}, simplify {})",
        report.input,
        report.after_resample,
        report.after_jitter,
        report.after_idle,
        report.after_simplify
    );

    (current, report)
}

/// Centered moving average over an odd window
///
/// Windows shrink at the ends of the sequence. Inputs shorter than the
/// window come back unchanged.
pub fn remove_jitter(positions: &[MousePositionData], window_size: usize) -> Vec<MousePositionData> {
    let window = if window_size % 2 == 0 { window_size + 1 } else { window_size };
    if window <= 1 || positions.len() < window {
        return positions.to_vec();
    }

    let half = window / 2;
    positions
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(positions.len() - 1);
            let slice = &positions[lo..=hi];
            let n = slice.len() as f64;
            let (sx, sy) = slice.iter().fold((0.0, 0.0), |(sx, sy), p| {
                (sx + p.position.x, sy + p.position.y)
            });
            MousePositionData {
                time: sample.time,
                position: NormalizedPoint::new(sx / n, sy / n),
            }
        })
        .collect()
}

/// Per-sample speed; the first sample has zero speed and so do near-zero time steps
pub fn velocities(positions: &[MousePositionData]) -> Vec<f64> {
    let mut result = Vec::with_capacity(positions.len());
    if positions.is_empty() {
        return result;
    }
    result.push(0.0);
    for pair in positions.windows(2) {
        let dt = pair[1].time - pair[0].time;
        if dt.abs() < EPSILON {
            result.push(0.0);
        } else {
            result.push(pair[0].position.distance_to(&pair[1].position) / dt.abs());
        }
    }
    result
}

/// Collapse long stationary runs to their first and last samples
///
/// A run is a maximal stretch of samples slower than `velocity_threshold`.
/// Runs lasting at least `min_duration` with more than two samples are
/// collapsed; shorter runs are kept verbatim.
pub fn compress_idle(
    positions: &[MousePositionData],
    velocity_threshold: f64,
    min_duration: f64,
) -> Vec<MousePositionData> {
    if positions.len() <= 2 {
        return positions.to_vec();
    }

    let speeds = velocities(positions);
    let mut result = Vec::with_capacity(positions.len());
    let mut i = 0;

    while i < positions.len() {
        if speeds[i] >= velocity_threshold {
            result.push(positions[i]);
            i += 1;
            continue;
        }

        let run_start = i;
        while i < positions.len() && speeds[i] < velocity_threshold {
            i += 1;
        }
        let run = &positions[run_start..i];
        let run_duration = run[run.len() - 1].time - run[0].time;

        if run.len() > 2 && run_duration >= min_duration {
            result.push(run[0]);
            result.push(run[run.len() - 1]);
        } else {
            result.extend_from_slice(run);
        }
    }

    result
}

/// Douglas-Peucker simplification against perpendicular chord distance
///
/// Ranges are split on an explicit work stack, so long curved paths cannot
/// exhaust the call stack.
pub fn simplify_path(positions: &[MousePositionData], epsilon: f64) -> Vec<MousePositionData> {
    if positions.len() <= 2 {
        return positions.to_vec();
    }

    let mut keep = vec![false; positions.len()];
    keep[0] = true;
    keep[positions.len() - 1] = true;

    let mut pending = vec![(0, positions.len() - 1)];
    while let Some((first, last)) = pending.pop() {
        if last - first < 2 {
            continue;
        }
        let (max_dist, offset) = farthest_from_chord(&positions[first..=last]);
        if max_dist > epsilon {
            let split = first + offset;
            keep[split] = true;
            pending.push((split, last));
            pending.push((first, split));
        }
    }

    positions
        .iter()
        .zip(&keep)
        .filter(|(_, &kept)| kept)
        .map(|(p, _)| *p)
        .collect()
}

fn farthest_from_chord(positions: &[MousePositionData]) -> (f64, usize) {
    let start = &positions[0].position;
    let end = &positions[positions.len() - 1].position;

    positions
        .iter()
        .enumerate()
        .skip(1)
        .take(positions.len() - 2)
        .map(|(i, p)| (p.position.perpendicular_distance(start, end), i))
        .fold((0.0, 0), |best, candidate| if candidate.0 > best.0 { candidate } else { best })
}

/// Keep a sample only once enough time has passed since the last kept one
///
/// The required interval slides from `max_interval` (slow motion) down to
/// `min_interval` (motion at or above `reference_velocity`). The final
/// sample is always kept.
pub fn resample_adaptive(
    positions: &[MousePositionData],
    min_interval: f64,
    max_interval: f64,
    reference_velocity: f64,
) -> Vec<MousePositionData> {
    if positions.len() <= 2 {
        return positions.to_vec();
    }

    let (min_interval, max_interval) = if min_interval <= max_interval {
        (min_interval, max_interval)
    } else {
        (max_interval, min_interval)
    };
    let mut result = Vec::with_capacity(positions.len());
    let mut last = positions[0];
    result.push(last);

    for sample in &positions[1..positions.len() - 1] {
        // Speed against the last kept sample, so a second pass sees the same
        // predecessors and keeps the same samples
        let dt = sample.time - last.time;
        let speed = if dt > EPSILON {
            last.position.distance_to(&sample.position) / dt
        } else {
            0.0
        };
        let normalized = if reference_velocity > EPSILON {
            (speed / reference_velocity).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let target = max_interval - (max_interval - min_interval) * normalized;
        if dt > target {
            result.push(*sample);
            last = *sample;
        }
    }

    result.push(positions[positions.len() - 1]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64, x: f64, y: f64) -> MousePositionData {
        MousePositionData::new(time, x, y)
    }

    fn linear_path(count: usize, dt: f64, speed: f64) -> Vec<MousePositionData> {
        (0..count)
            .map(|i| {
                let t = i as f64 * dt;
                sample(t, 0.1 + speed * t, 0.5)
            })
            .collect()
    }

    #[test]
    fn test_douglas_peucker_collinear_points() {
        let points = vec![sample(0.0, 0.0, 0.0), sample(0.5, 0.5, 0.5), sample(1.0, 1.0, 1.0)];
        let simplified = simplify_path(&points, 0.01);
        assert_eq!(simplified.len(), 2);
        assert_eq!(simplified[0], points[0]);
        assert_eq!(simplified[1], points[2]);
    }

    #[test]
    fn test_douglas_peucker_keeps_perturbed_point() {
        let points = vec![sample(0.0, 0.0, 0.0), sample(0.5, 0.5, 0.6), sample(1.0, 1.0, 1.0)];
        // Middle point sits ~0.07 off the chord
        let simplified = simplify_path(&points, 0.01);
        assert_eq!(simplified.len(), 3);
    }

    #[test]
    fn test_idle_compression_collapses_stationary_run() {
        let points: Vec<MousePositionData> = (0..=10).map(|i| sample(i as f64 * 0.1, 0.4, 0.4)).collect();
        let compressed = compress_idle(&points, 2.0, 0.5);
        assert_eq!(compressed.len(), 2);
        assert_eq!(compressed[0].time, 0.0);
        assert!((compressed[1].time - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_idle_compression_keeps_short_runs() {
        let points: Vec<MousePositionData> = (0..=3).map(|i| sample(i as f64 * 0.1, 0.4, 0.4)).collect();
        let compressed = compress_idle(&points, 2.0, 0.5);
        assert_eq!(compressed.len(), points.len());
    }

    #[test]
    fn test_idle_compression_preserves_motion_between_rests() {
        let mut points = Vec::new();
        for i in 0..=10 {
            points.push(sample(i as f64 * 0.1, 0.2, 0.2));
        }
        for i in 1..=5 {
            points.push(sample(1.0 + i as f64 * 0.05, 0.2 + i as f64 * 0.1, 0.2));
        }
        let compressed = compress_idle(&points, 0.05, 0.5);
        assert_eq!(compressed.len(), 2 + 5);
    }

    #[test]
    fn test_jitter_removal_smooths_alternating_noise() {
        let points: Vec<MousePositionData> = (0..20)
            .map(|i| sample(i as f64 * 0.01, 0.5 + if i % 2 == 0 { 0.01 } else { -0.01 }, 0.5))
            .collect();
        let smoothed = remove_jitter(&points, 5);
        assert_eq!(smoothed.len(), points.len());
        for p in &smoothed[2..18] {
            assert!((p.position.x - 0.5).abs() < 0.003, "x {} still noisy", p.position.x);
        }
    }

    #[test]
    fn test_jitter_removal_passes_through_short_input() {
        let points = vec![sample(0.0, 0.1, 0.1), sample(0.1, 0.2, 0.2)];
        assert_eq!(remove_jitter(&points, 5), points);
    }

    #[test]
    fn test_jitter_removal_is_count_stable() {
        let points = linear_path(50, 0.01, 0.3);
        let once = remove_jitter(&points, 5);
        let twice = remove_jitter(&once, 5);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn test_resampling_keeps_endpoints_and_reduces() {
        let points = linear_path(101, 0.01, 0.1);
        let resampled = resample_adaptive(&points, 1.0 / 60.0, 0.1, 1.0);
        assert!(resampled.len() < points.len());
        assert_eq!(resampled.first(), points.first());
        assert_eq!(resampled.last(), points.last());
    }

    #[test]
    fn test_resampling_is_a_fixed_point() {
        let points = linear_path(201, 0.01, 0.2);
        let once = resample_adaptive(&points, 1.0 / 60.0, 0.1, 1.0);
        let twice = resample_adaptive(&once, 1.0 / 60.0, 0.1, 1.0);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn test_resampling_rest_then_motion_is_a_fixed_point() {
        let points: Vec<MousePositionData> = (0..=100)
            .map(|i| {
                let t = i as f64 * 0.01;
                let x = if t < 0.34 { 0.2 } else { 0.2 + (t - 0.34) };
                sample(t, x, 0.5)
            })
            .collect();
        let once = resample_adaptive(&points, 1.0 / 60.0, 0.1, 1.0);
        let twice = resample_adaptive(&once, 1.0 / 60.0, 0.1, 1.0);
        assert!(once.len() < points.len());
        assert_eq!(once, twice, "second pass must keep every sample of the first");
    }

    #[test]
    fn test_douglas_peucker_long_zigzag() {
        let points: Vec<MousePositionData> = (0..200_000)
            .map(|i| {
                let t = i as f64 * 0.001;
                let y = if i % 2 == 0 { 0.4 } else { 0.6 };
                sample(t, i as f64 / 200_000.0, y)
            })
            .collect();
        let simplified = simplify_path(&points, 0.01);
        assert!(simplified.len() > 2, "corners survive simplification");
        assert_eq!(simplified.first(), points.first());
        assert_eq!(simplified.last(), points.last());
        assert!(simplified.windows(2).all(|w| w[0].time < w[1].time), "order is preserved");
    }

    #[test]
    fn test_douglas_peucker_keeps_corners_in_order() {
        let points = vec![
            sample(0.0, 0.0, 0.0),
            sample(0.1, 0.25, 0.001),
            sample(0.2, 0.5, 0.0),
            sample(0.3, 0.5, 0.25),
            sample(0.4, 0.5, 0.5),
            sample(0.5, 0.75, 0.5),
            sample(0.6, 1.0, 0.5),
        ];
        let simplified = simplify_path(&points, 0.01);
        let times: Vec<f64> = simplified.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 0.2, 0.4, 0.6]);
    }

    #[test]
    fn test_fast_motion_keeps_more_samples() {
        let slow = linear_path(101, 0.01, 0.05);
        let fast = linear_path(101, 0.01, 2.0);
        let slow_out = resample_adaptive(&slow, 0.02, 0.2, 1.0);
        let fast_out = resample_adaptive(&fast, 0.02, 0.2, 1.0);
        assert!(fast_out.len() > slow_out.len());
    }

    #[test]
    fn test_clean_never_increases_count() {
        let settings = SignalCleanerSettings::default();
        let inputs = [
            vec![],
            vec![sample(0.0, 0.5, 0.5)],
            linear_path(3, 0.1, 0.1),
            linear_path(500, 0.008, 0.4),
        ];
        for input in inputs {
            let (out, report) = clean_with_report(&input, &settings);
            assert!(out.len() <= input.len());
            assert!(report.after_jitter <= report.input);
            assert!(report.after_idle <= report.after_jitter);
            assert!(report.after_simplify <= report.after_idle);
            assert!(report.after_resample <= report.after_simplify);
        }
    }

    #[test]
    fn test_disabled_stages_pass_through() {
        let settings = SignalCleanerSettings {
            jitter_removal_enabled: false,
            idle_compression_enabled: false,
            simplification_enabled: false,
            resampling_enabled: false,
            ..Default::default()
        };
        let input = linear_path(40, 0.01, 0.3);
        assert_eq!(clean(&input, &settings), input);
    }
}
