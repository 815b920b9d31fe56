//! Easing curves for camera and cursor animation
//!
//! Every curve maps normalized progress `t` in [0,1] to eased progress and
//! exposes its first derivative. The spring curve uses the analytic solution
//! of a unit-mass damped harmonic oscillator:
//!
//! ```text
//! x''(τ) + 2ζω x'(τ) + ω² x(τ) = ω²,   ω = 2π / response
//! ```
//!
//! The raw solution is divided by its own value at τ = duration, so the
//! curve reaches exactly 1.0 at the end of any segment length without
//! retuning the physical constants.

use serde::{Deserialize, Serialize};

/// Newton-Raphson iterations used to invert the Bezier x(s)
const BEZIER_ITERATIONS: usize = 10;

/// Newton-Raphson convergence tolerance
const BEZIER_TOLERANCE: f64 = 1e-4;

/// Below this, dx/ds is too flat for a Newton step
const BEZIER_MIN_SLOPE: f64 = 1e-6;

/// Below this, the spring end value cannot be used for normalization
const SPRING_MIN_END_VALUE: f64 = 1e-6;

/// Damping ratios within this distance of 1.0 use the critical solution
const CRITICAL_DAMPING_BAND: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum EasingCurve {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    #[serde(rename_all = "camelCase")]
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
    #[serde(rename_all = "camelCase")]
    Spring { damping_ratio: f64, response: f64 },
}

impl EasingCurve {
    /// Eased progress at `t`, clamped to [0,1] on both sides
    ///
    /// `duration` is the segment length in seconds; only the spring uses it.
    pub fn apply(&self, t: f64, duration: f64) -> f64 {
        if t.is_nan() {
            return 0.0;
        }
        let t = t.clamp(0.0, 1.0);
        let value = self.apply_unclamped(t, duration);
        if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            t
        }
    }

    /// Eased progress without clamping the result
    ///
    /// Underdamped springs overshoot past 1.0 here, which chained or
    /// continuous evaluation needs to stay smooth across segment joins.
    pub fn apply_unclamped(&self, t: f64, duration: f64) -> f64 {
        match *self {
            EasingCurve::Linear => t,
            EasingCurve::EaseIn => t * t * t,
            EasingCurve::EaseOut => {
                let t1 = t - 1.0;
                (t1 * t1).mul_add(t1, 1.0)
            }
            EasingCurve::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let t1 = 2.0f64.mul_add(t, -2.0);
                    (0.5 * t1 * t1).mul_add(t1, 1.0)
                }
            }
            EasingCurve::CubicBezier { x1, y1, x2, y2 } => {
                if t <= 0.0 {
                    return 0.0;
                }
                if t >= 1.0 {
                    return 1.0;
                }
                let s = solve_bezier_parameter(t, x1, x2);
                bezier_component(s, y1, y2)
            }
            EasingCurve::Spring {
                damping_ratio,
                response,
            } => spring_progress(t, duration, damping_ratio, response),
        }
    }

    /// d(progress)/dt at `t`, with `t` clamped to [0,1]
    pub fn derivative(&self, t: f64, duration: f64) -> f64 {
        if t.is_nan() {
            return 0.0;
        }
        let t = t.clamp(0.0, 1.0);
        let velocity = match *self {
            EasingCurve::Linear => 1.0,
            EasingCurve::EaseIn => 3.0 * t * t,
            EasingCurve::EaseOut => {
                let t1 = t - 1.0;
                3.0 * t1 * t1
            }
            EasingCurve::EaseInOut => {
                if t < 0.5 {
                    12.0 * t * t
                } else {
                    let t1 = 2.0f64.mul_add(t, -2.0);
                    3.0 * t1 * t1
                }
            }
            EasingCurve::CubicBezier { x1, y1, x2, y2 } => {
                let s = solve_bezier_parameter(t, x1, x2);
                let dx = bezier_slope(s, x1, x2);
                if dx.abs() < BEZIER_MIN_SLOPE {
                    1.0
                } else {
                    bezier_slope(s, y1, y2) / dx
                }
            }
            EasingCurve::Spring {
                damping_ratio,
                response,
            } => spring_velocity(t, duration, damping_ratio, response),
        };
        if velocity.is_finite() {
            velocity
        } else {
            0.0
        }
    }

    /// Interpolate `from` toward `to` with this curve
    pub fn interpolate(&self, from: f64, to: f64, t: f64, duration: f64) -> f64 {
        (to - from).mul_add(self.apply(t, duration), from)
    }
}

/// One Bezier coordinate with endpoints 0 and 1 and control values `c1`, `c2`
#[inline]
fn bezier_component(s: f64, c1: f64, c2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * c1 + 3.0 * inv * s * s * c2 + s * s * s
}

#[inline]
fn bezier_slope(s: f64, c1: f64, c2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * c1 + 6.0 * inv * s * (c2 - c1) + 3.0 * s * s * (1.0 - c2)
}

/// Find the Bezier parameter whose x equals `t`
///
/// Starts from `s = t` (exact for a linear curve) and stops early on a
/// flat slope, which leaves the guess at linear progress.
fn solve_bezier_parameter(t: f64, x1: f64, x2: f64) -> f64 {
    let mut s = t;
    for _ in 0..BEZIER_ITERATIONS {
        let error = bezier_component(s, x1, x2) - t;
        if error.abs() < BEZIER_TOLERANCE {
            break;
        }
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < BEZIER_MIN_SLOPE {
            break;
        }
        s = (s - error / slope).clamp(0.0, 1.0);
    }
    s
}

/// Raw oscillator displacement toward 1.0 after `tau` seconds
fn oscillator_position(tau: f64, omega: f64, zeta: f64) -> f64 {
    if (zeta - 1.0).abs() < CRITICAL_DAMPING_BAND {
        let decay = (-omega * tau).exp();
        decay.mul_add(-omega.mul_add(tau, 1.0), 1.0)
    } else if zeta < 1.0 {
        let omega_d = omega * zeta.mul_add(-zeta, 1.0).sqrt();
        let decay = (-zeta * omega * tau).exp();
        let cos_term = (omega_d * tau).cos();
        let sin_term = (zeta * omega / omega_d) * (omega_d * tau).sin();
        decay.mul_add(-(cos_term + sin_term), 1.0)
    } else {
        let gamma = omega * zeta.mul_add(zeta, -1.0).sqrt();
        let decay = (-zeta * omega * tau).exp();
        let cosh_term = (gamma * tau).cosh();
        let sinh_term = (zeta * omega / gamma) * (gamma * tau).sinh();
        decay.mul_add(-(cosh_term + sinh_term), 1.0)
    }
}

/// Raw oscillator velocity, dx/dτ
fn oscillator_velocity(tau: f64, omega: f64, zeta: f64) -> f64 {
    if (zeta - 1.0).abs() < CRITICAL_DAMPING_BAND {
        omega * omega * tau * (-omega * tau).exp()
    } else if zeta < 1.0 {
        let omega_d = omega * zeta.mul_add(-zeta, 1.0).sqrt();
        (-zeta * omega * tau).exp() * (omega * omega / omega_d) * (omega_d * tau).sin()
    } else {
        let gamma = omega * zeta.mul_add(zeta, -1.0).sqrt();
        (-zeta * omega * tau).exp() * (omega * omega / gamma) * (gamma * tau).sinh()
    }
}

/// Natural frequency and damping ratio, or `None` for unusable parameters
fn spring_parameters(damping_ratio: f64, response: f64) -> Option<(f64, f64)> {
    if !(response.is_finite() && response > 0.0) || !damping_ratio.is_finite() {
        return None;
    }
    let omega = 2.0 * std::f64::consts::PI / response;
    Some((omega, damping_ratio.max(0.0)))
}

fn spring_progress(t: f64, duration: f64, damping_ratio: f64, response: f64) -> f64 {
    let Some((omega, zeta)) = spring_parameters(damping_ratio, response) else {
        return t;
    };
    if !(duration.is_finite() && duration > 0.0) {
        return t;
    }
    let end_value = oscillator_position(duration, omega, zeta);
    if end_value.abs() < SPRING_MIN_END_VALUE {
        return t;
    }
    oscillator_position(t * duration, omega, zeta) / end_value
}

fn spring_velocity(t: f64, duration: f64, damping_ratio: f64, response: f64) -> f64 {
    let Some((omega, zeta)) = spring_parameters(damping_ratio, response) else {
        return 1.0;
    };
    if !(duration.is_finite() && duration > 0.0) {
        return 1.0;
    }
    let end_value = oscillator_position(duration, omega, zeta);
    if end_value.abs() < SPRING_MIN_END_VALUE {
        return 1.0;
    }
    oscillator_velocity(t * duration, omega, zeta) * duration / end_value
}
