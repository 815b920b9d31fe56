//! End-to-end planning: telemetry in, camera plan out
//!
//! Stages run strictly in order and never fail. Degenerate input (no
//! samples, zero duration) yields an empty but well-formed plan.

use crate::camera::shot_planner::{SaliencySource, ShotPlan, ShotPlanner};
use crate::camera::simulator::{CameraPathSimulator, TimedTransform};
use crate::camera::transition_planner::{TransitionPlan, TransitionPlanner};
use crate::capture::input::source::{InputStatistics, MouseDataSource};
use crate::intent::activity::ActivityCollector;
use crate::intent::classifier::IntentClassifier;
use crate::intent::segmenter::{CameraScene, SceneSegmenter};
use crate::intent::unified_event::build_unified_events;
use crate::processing::signal_cleaner::{clean_with_report, CleaningReport};
use crate::settings::SmartZoomSettings;
use crate::tracks::generators::{
    CameraGenerator, CursorGenerator, GenerationContext, KeyframeGenerator, KeystrokeGenerator,
};
use crate::tracks::segments::{CameraTrack, CursorTrack, KeystrokeTrack, Track};
use serde::{Deserialize, Serialize};

/// Counts gathered while planning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDiagnostics {
    pub input: InputStatistics,
    pub cleaning: CleaningReport,
    pub event_count: usize,
    pub activity_count: usize,
    pub span_count: usize,
    pub scene_count: usize,
}

/// Result of one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPlan {
    pub duration: f64,
    pub scenes: Vec<CameraScene>,
    pub shots: Vec<ShotPlan>,
    pub transitions: Vec<TransitionPlan>,
    pub camera_track: CameraTrack,
    pub cursor_track: CursorTrack,
    pub keystroke_track: KeystrokeTrack,
    /// Camera transform per output frame
    pub samples: Vec<TimedTransform>,
    pub diagnostics: PlanDiagnostics,
}

pub struct SmartZoomPipeline {
    settings: SmartZoomSettings,
    shot_planner: ShotPlanner,
}

impl SmartZoomPipeline {
    pub fn new(settings: SmartZoomSettings) -> Self {
        let shot_planner = ShotPlanner::new(settings.shot.clone());
        Self {
            settings,
            shot_planner,
        }
    }

    /// Blend a visual-saliency estimate into activity-driven shot centers
    pub fn with_saliency(mut self, saliency: Box<dyn SaliencySource>) -> Self {
        self.shot_planner = self.shot_planner.with_saliency(saliency);
        self
    }

    pub fn settings(&self) -> &SmartZoomSettings {
        &self.settings
    }

    pub fn run(&self, source: &dyn MouseDataSource) -> CameraPlan {
        let settings = &self.settings;
        let input = source.statistics();
        let duration = source.duration().max(0.0);
        tracing::info!(
            "Planning camera for {:.2}s recording ({} positions, {} clicks, {} keys, {} drags)",
            duration,
            input.position_count,
            input.click_count,
            input.keyboard_count,
            input.drag_count
        );

        let (cleaned, cleaning) = clean_with_report(source.positions(), &settings.cleaner);
        let events = build_unified_events(source, &cleaned);
        let activity = ActivityCollector::new(settings.activity.clone()).collect(source);
        let spans = IntentClassifier::new(settings.intent.clone()).classify(&activity, &events, duration);
        let scenes = SceneSegmenter::new(settings.segmentation.clone()).segment(&spans, &events);

        let shots = self.shot_planner.plan(&scenes, &events);
        let transitions = TransitionPlanner::new(settings.transition.clone()).plan(&shots);

        let ctx = GenerationContext {
            source,
            scenes: &scenes,
            shots: &shots,
            transitions: &transitions,
            settings,
        };
        let camera_track = CameraGenerator.generate(&ctx);
        let cursor_track = CursorGenerator.generate(&ctx);
        let keystroke_track = KeystrokeGenerator.generate(&ctx);

        let simulator = CameraPathSimulator::new(settings.simulation.clone(), settings.transition.zoom_out_level);
        let samples = simulator.sample(camera_track.segments(), duration);

        let diagnostics = PlanDiagnostics {
            input,
            cleaning,
            event_count: events.len(),
            activity_count: activity.len(),
            span_count: spans.len(),
            scene_count: scenes.len(),
        };
        tracing::info!(
            "Planned {} scenes, {} transitions, {} camera segments, {} frames",
            scenes.len(),
            transitions.len(),
            camera_track.len(),
            samples.len()
        );

        CameraPlan {
            duration,
            scenes,
            shots,
            transitions,
            camera_track,
            cursor_track,
            keystroke_track,
            samples,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::source::Recording;
    use crate::capture::input::types::{ClickEventData, ClickType, MousePositionData};
    use crate::geometry::{NormalizedPoint, NormalizedRect};
    use crate::intent::types::{TimeRange, UserIntent};

    fn idle_recording(duration: f64) -> Recording {
        let mut recording = Recording::new(duration, 60.0);
        recording.positions = (0..=(duration * 10.0) as usize)
            .map(|i| MousePositionData::new(i as f64 / 10.0, 0.5, 0.5))
            .collect();
        recording
    }

    #[test]
    fn test_empty_recording_gives_empty_plan() {
        let recording = Recording::new(0.0, 60.0);
        let plan = SmartZoomPipeline::new(SmartZoomSettings::default()).run(&recording);
        assert!(plan.scenes.is_empty());
        assert!(plan.shots.is_empty());
        assert!(plan.transitions.is_empty());
        assert!(plan.camera_track.is_empty());
        assert!(plan.samples.is_empty());
    }

    #[test]
    fn test_idle_recording_is_one_wide_shot() {
        let plan = SmartZoomPipeline::new(SmartZoomSettings::default()).run(&idle_recording(4.0));
        assert_eq!(plan.scenes.len(), 1);
        assert_eq!(plan.scenes[0].intent, UserIntent::Idle);
        assert_eq!(plan.shots[0].ideal_zoom, 1.0, "establishing shot");
        assert!(plan.transitions.is_empty());
        assert_eq!(plan.samples.len(), 240);
        assert!(plan.samples.iter().all(|s| s.value.zoom == 1.0));
    }

    #[test]
    fn test_scene_structure_is_consistent() {
        let mut recording = idle_recording(8.0);
        for (time, x, y) in [(1.0, 0.2, 0.2), (1.3, 0.22, 0.21), (5.0, 0.8, 0.8)] {
            recording
                .clicks
                .push(ClickEventData::new(time, x, y, ClickType::LeftDown));
            recording.positions.push(MousePositionData::new(time, x, y));
        }
        recording.positions.sort_by(|a, b| a.time.total_cmp(&b.time));

        let plan = SmartZoomPipeline::new(SmartZoomSettings::default()).run(&recording);
        assert_eq!(plan.shots.len(), plan.scenes.len());
        assert_eq!(plan.transitions.len(), plan.scenes.len().saturating_sub(1));
        assert_eq!(plan.diagnostics.scene_count, plan.scenes.len());

        let covered: f64 = plan.scenes.iter().map(CameraScene::duration).sum();
        assert!((covered - 8.0).abs() < 1e-6, "scenes tile the recording, got {}", covered);
        assert!(plan.camera_track.is_well_formed());

        for sample in &plan.samples {
            let v = sample.value.viewport();
            assert!(v.min_x() >= -1e-6 && v.max_x() <= 1.0 + 1e-6);
            assert!(v.min_y() >= -1e-6 && v.max_y() <= 1.0 + 1e-6);
        }
    }

    struct FixedSaliency;

    impl SaliencySource for FixedSaliency {
        fn saliency_center(&self, _range: TimeRange) -> Option<NormalizedPoint> {
            Some(NormalizedRect::unit().center())
        }
    }

    #[test]
    fn test_runs_are_repeatable_with_saliency() {
        let pipeline = SmartZoomPipeline::new(SmartZoomSettings::default()).with_saliency(Box::new(FixedSaliency));
        let recording = idle_recording(2.0);
        let first = pipeline.run(&recording);
        let second = pipeline.run(&recording);
        assert_eq!(first.shots, second.shots);
        assert_eq!(first.samples, second.samples);
    }
}
