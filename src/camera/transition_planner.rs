//! How the camera moves from one shot to the next

use crate::camera::shot_planner::ShotPlan;
use crate::geometry::lerp;
use crate::processing::easing::EasingCurve;
use crate::settings::{DurationRange, TransitionSettings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum TransitionStyle {
    /// Jump straight to the next shot
    Cut,
    /// Pan and zoom together in one move
    DirectPan { duration: f64, easing: EasingCurve },
    /// Pull back toward the full frame, then push into the next shot
    #[serde(rename_all = "camelCase")]
    ZoomOutAndIn {
        out_duration: f64,
        in_duration: f64,
        out_easing: EasingCurve,
        in_easing: EasingCurve,
    },
}

impl TransitionStyle {
    pub fn duration(&self) -> f64 {
        match self {
            TransitionStyle::Cut => 0.0,
            TransitionStyle::DirectPan { duration, .. } => *duration,
            TransitionStyle::ZoomOutAndIn {
                out_duration,
                in_duration,
                ..
            } => out_duration + in_duration,
        }
    }
}

/// Transition between shot `from_index` and the one after it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionPlan {
    pub from_index: usize,
    pub to_index: usize,
    pub style: TransitionStyle,
    /// Distance between the two ideal centers
    pub distance: f64,
}

pub struct TransitionPlanner {
    settings: TransitionSettings,
}

impl TransitionPlanner {
    pub fn new(settings: TransitionSettings) -> Self {
        Self { settings }
    }

    /// One transition per adjacent pair of shots
    pub fn plan(&self, shots: &[ShotPlan]) -> Vec<TransitionPlan> {
        let transitions: Vec<TransitionPlan> = shots
            .windows(2)
            .enumerate()
            .map(|(i, pair)| TransitionPlan {
                from_index: i,
                to_index: i + 1,
                style: self.plan_pair(&pair[0], &pair[1]),
                distance: pair[0].ideal_center.distance_to(&pair[1].ideal_center),
            })
            .collect();

        tracing::debug!("Planned {} transitions for {} shots", transitions.len(), shots.len());
        transitions
    }

    pub fn plan_pair(&self, from: &ShotPlan, to: &ShotPlan) -> TransitionStyle {
        if from.intent.is_switching() || to.intent.is_switching() {
            return TransitionStyle::Cut;
        }
        let distance = from.ideal_center.distance_to(&to.ideal_center);
        self.style_for_distance(distance)
    }

    /// Tier selection by center distance alone
    pub fn style_for_distance(&self, distance: f64) -> TransitionStyle {
        let s = &self.settings;
        if distance < s.short_pan_max_distance {
            let t = ratio(distance, 0.0, s.short_pan_max_distance);
            TransitionStyle::DirectPan {
                duration: duration_at(s.short_pan_duration, t),
                easing: s.pan_easing,
            }
        } else if distance < s.medium_pan_max_distance {
            let t = ratio(distance, s.short_pan_max_distance, s.medium_pan_max_distance);
            TransitionStyle::DirectPan {
                duration: duration_at(s.medium_pan_duration, t),
                easing: s.pan_easing,
            }
        } else {
            TransitionStyle::ZoomOutAndIn {
                out_duration: s.zoom_out_duration,
                in_duration: s.zoom_in_duration,
                out_easing: s.zoom_out_easing,
                in_easing: s.zoom_in_easing,
            }
        }
    }
}

fn ratio(value: f64, lo: f64, hi: f64) -> f64 {
    if hi - lo <= 0.0 {
        return 0.0;
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

fn duration_at(range: DurationRange, t: f64) -> f64 {
    lerp(range.min, range.max, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::shot_planner::{ShotType, ZoomSource};
    use crate::geometry::NormalizedPoint;
    use crate::intent::types::UserIntent;

    fn shot(x: f64, y: f64, intent: UserIntent) -> ShotPlan {
        ShotPlan {
            intent,
            ideal_zoom: 1.5,
            ideal_center: NormalizedPoint::new(x, y),
            shot_type: ShotType::Medium,
            zoom_source: ZoomSource::IntentMidpoint,
            inherited: false,
        }
    }

    fn planner() -> TransitionPlanner {
        TransitionPlanner::new(TransitionSettings::default())
    }

    #[test]
    fn test_short_distance_is_direct_pan() {
        let style = planner().style_for_distance(0.05);
        match style {
            TransitionStyle::DirectPan { duration, .. } => {
                // a third of the way through the short tier
                assert!((duration - (0.3 + 0.2 / 3.0)).abs() < 1e-9, "got {}", duration);
            }
            other => panic!("expected a direct pan, got {:?}", other),
        }
    }

    #[test]
    fn test_medium_distance_uses_medium_range() {
        match planner().style_for_distance(0.4 - 1e-12) {
            TransitionStyle::DirectPan { duration, .. } => assert!((duration - 0.8).abs() < 1e-6),
            other => panic!("expected a direct pan, got {:?}", other),
        }
    }

    #[test]
    fn test_long_distance_zooms_out_and_in() {
        let style = planner().style_for_distance(0.5);
        assert!(matches!(style, TransitionStyle::ZoomOutAndIn { .. }));
        assert!((style.duration() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_switching_cuts() {
        let a = shot(0.5, 0.5, UserIntent::Clicking);
        let b = shot(0.51, 0.5, UserIntent::Switching);
        assert_eq!(planner().plan_pair(&a, &b), TransitionStyle::Cut);
        assert_eq!(planner().plan_pair(&b, &a), TransitionStyle::Cut);
    }

    #[test]
    fn test_transition_count() {
        let shots: Vec<ShotPlan> = (0..5)
            .map(|i| shot(0.2 + 0.1 * i as f64, 0.5, UserIntent::Clicking))
            .collect();
        for n in 0..=5 {
            let transitions = planner().plan(&shots[..n]);
            assert_eq!(transitions.len(), n.saturating_sub(1));
        }
        let transitions = planner().plan(&shots);
        assert_eq!((transitions[3].from_index, transitions[3].to_index), (3, 4));
    }
}
