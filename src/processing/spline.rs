//! Catmull-Rom reconstruction of a continuous cursor path
//!
//! Turns the sparse samples left by the signal cleaner back into one
//! position per output frame. The curve uses the cardinal form of the
//! spline with a tension parameter: 0 gives the classic Catmull-Rom
//! tangents, larger values shorten them so the curve hugs the recorded
//! path instead of overshooting around corners.

use crate::capture::input::types::MousePositionData;
use crate::geometry::{NormalizedPoint, EPSILON};
use crate::processing::cursor_smoothing::follow_path;
use crate::settings::SplineSettings;

/// Minimum control points needed for one spline window
const MIN_CONTROL_POINTS: usize = 4;

/// Catmull-Rom interpolator with a fixed tension
#[derive(Debug, Clone, Copy)]
pub struct SplineInterpolator {
    pub tension: f64,
}

impl Default for SplineInterpolator {
    fn default() -> Self {
        Self { tension: 0.2 }
    }
}

impl SplineInterpolator {
    pub fn new(tension: f64) -> Self {
        Self { tension }
    }

    /// Dense positions at `frame_rate`, one window `[i, i+3]` at a time
    ///
    /// Each window fills the time span of its middle segment, start
    /// inclusive and end exclusive. Fewer than four points come back unchanged.
    pub fn interpolate_positions(
        &self,
        positions: &[MousePositionData],
        frame_rate: f64,
    ) -> Vec<MousePositionData> {
        if positions.len() < MIN_CONTROL_POINTS {
            return positions.to_vec();
        }
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            tracing::warn!("Invalid spline frame rate {}, returning control points", frame_rate);
            return positions.to_vec();
        }

        let frame_duration = 1.0 / frame_rate;
        let mut result = Vec::new();

        for window in positions.windows(MIN_CONTROL_POINTS) {
            let [p0, p1, p2, p3] = [
                window[0].position.to_top_left(),
                window[1].position.to_top_left(),
                window[2].position.to_top_left(),
                window[3].position.to_top_left(),
            ];
            let start = window[1].time;
            let end = window[2].time;
            let span = end - start;
            if span < EPSILON {
                continue;
            }

            // Frame times come from an integer index so rounding never accumulates
            let frames = (0u64..)
                .map(|k| start + k as f64 * frame_duration)
                .take_while(|&time| time < end);
            for time in frames {
                let u = (time - start) / span;
                result.push(MousePositionData {
                    time,
                    position: self.point_at(p0, p1, p2, p3, u),
                });
            }
        }

        result
    }

    /// Point on the middle segment of `p0..p3` at local parameter `u` in [0,1]
    pub fn point_at(
        &self,
        p0: NormalizedPoint,
        p1: NormalizedPoint,
        p2: NormalizedPoint,
        p3: NormalizedPoint,
        u: f64,
    ) -> NormalizedPoint {
        let scale = (1.0 - self.tension) / 2.0;
        let (m1x, m1y) = (scale * (p2.x - p0.x), scale * (p2.y - p0.y));
        let (m2x, m2y) = (scale * (p3.x - p1.x), scale * (p3.y - p1.y));

        let u2 = u * u;
        let u3 = u2 * u;
        let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
        let h10 = u3 - 2.0 * u2 + u;
        let h01 = -2.0 * u3 + 3.0 * u2;
        let h11 = u3 - u2;

        NormalizedPoint::new(
            h00 * p1.x + h10 * m1x + h01 * p2.x + h11 * m2x,
            h00 * p1.y + h10 * m1y + h01 * p2.y + h11 * m2y,
        )
    }
}

/// Spline path, optionally blended toward a spring that follows it
///
/// `settings.spring_blend` of 0 returns the spline alone; 1 returns the
/// spring-follow path alone.
pub fn interpolate_with_spring(
    positions: &[MousePositionData],
    settings: &SplineSettings,
) -> Vec<MousePositionData> {
    let interpolator = SplineInterpolator::new(settings.tension);
    let spline = interpolator.interpolate_positions(positions, settings.output_frame_rate);

    let blend = settings.spring_blend.clamp(0.0, 1.0);
    if blend <= 0.0 || spline.is_empty() {
        return spline;
    }

    let followed = follow_path(&spline, &settings.spring, settings.teleport_threshold);
    spline
        .iter()
        .zip(&followed)
        .map(|(s, f)| MousePositionData {
            time: s.time,
            position: s.position.lerp(&f.position, blend),
        })
        .collect()
}
