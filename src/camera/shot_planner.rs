//! Per-scene framing: how far to zoom and where to look
//!
//! Zoom follows a strict fallback order, each tier a separate function so
//! the order stays auditable:
//!
//! 1. active UI element sized to the target frame coverage
//! 2. nearest accessibility element when the scene has no focus regions
//! 3. bounding box of the positions that matter for the intent
//! 4. a single event: the low end of the intent's range
//! 5. the middle of the intent's range
//!
//! Idle scenes are resolved afterwards from their neighbours.

use crate::capture::input::types::UiChange;
use crate::geometry::{centroid, clamp_center, NormalizedPoint, NormalizedRect, EPSILON};
use crate::intent::segmenter::CameraScene;
use crate::intent::types::{FocusSource, TimeRange, UserIntent};
use crate::intent::unified_event::{events_between, EventKind, UnifiedEvent};
use crate::settings::{ShotSettings, ZoomRange};
use serde::{Deserialize, Serialize};

/// Which tier produced a zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoomSource {
    Element,
    ActivityBoundingBox,
    SingleEvent,
    IntentMidpoint,
}

/// Coarse framing label derived from the zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShotType {
    Wide,
    Medium,
    CloseUp,
}

impl ShotType {
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 1.15 {
            ShotType::Wide
        } else if zoom < 1.9 {
            ShotType::Medium
        } else {
            ShotType::CloseUp
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotPlan {
    pub intent: UserIntent,
    pub ideal_zoom: f64,
    /// Top-left space, already clamped so the viewport stays in frame
    pub ideal_center: NormalizedPoint,
    pub shot_type: ShotType,
    pub zoom_source: ZoomSource,
    /// Set on idle scenes that took their framing from a neighbour
    pub inherited: bool,
}

impl ShotPlan {
    fn new(intent: UserIntent, zoom: f64, center: NormalizedPoint, zoom_source: ZoomSource) -> Self {
        Self {
            intent,
            ideal_zoom: zoom,
            ideal_center: clamp_center(center, zoom),
            shot_type: ShotType::from_zoom(zoom),
            zoom_source,
            inherited: false,
        }
    }

    /// Idle plan derived from this one, zoom decayed toward 1.0 by `decay`
    pub fn inheriting(&self, decay: f64, range: ZoomRange) -> ShotPlan {
        let zoom = range.clamp(1.0 + (self.ideal_zoom - 1.0) * decay.clamp(0.0, 1.0));
        ShotPlan {
            intent: UserIntent::Idle,
            ideal_zoom: zoom,
            ideal_center: clamp_center(self.ideal_center, zoom),
            shot_type: ShotType::from_zoom(zoom),
            zoom_source: self.zoom_source,
            inherited: true,
        }
    }

    /// Wide establishing shot for idle scenes with nothing to inherit
    fn establishing(range: ZoomRange) -> ShotPlan {
        let zoom = range.clamp(1.0);
        ShotPlan::new(UserIntent::Idle, zoom, NormalizedPoint::center(), ZoomSource::IntentMidpoint)
    }
}

/// Frame-analysis collaborator estimating where attention is drawn
pub trait SaliencySource {
    fn saliency_center(&self, range: TimeRange) -> Option<NormalizedPoint>;
}

pub struct ShotPlanner {
    settings: ShotSettings,
    saliency: Option<Box<dyn SaliencySource>>,
}

impl ShotPlanner {
    pub fn new(settings: ShotSettings) -> Self {
        Self {
            settings,
            saliency: None,
        }
    }

    pub fn with_saliency(mut self, saliency: Box<dyn SaliencySource>) -> Self {
        self.saliency = Some(saliency);
        self
    }

    /// One plan per scene, idle scenes resolved from their neighbours
    pub fn plan(&self, scenes: &[CameraScene], events: &[UnifiedEvent]) -> Vec<ShotPlan> {
        let mut plans: Vec<ShotPlan> = scenes.iter().map(|scene| self.plan_scene(scene, events)).collect();
        self.resolve_idle(scenes, &mut plans);
        tracing::debug!("Planned {} shots", plans.len());
        plans
    }

    pub fn plan_scene(&self, scene: &CameraScene, events: &[UnifiedEvent]) -> ShotPlan {
        let range = self.settings.zoom_ranges.for_intent(&scene.intent);
        let scene_events = events_between(events, scene.range.start, scene.range.end);
        let positions = relevant_positions(scene, scene_events);

        let (raw_zoom, zoom_source) = self
            .element_zoom(scene)
            .or_else(|| self.ui_state_zoom(scene, events))
            .or_else(|| self.bounding_box_zoom(&positions))
            .or_else(|| (positions.len() == 1).then_some((range.min, ZoomSource::SingleEvent)))
            .unwrap_or((range.midpoint(), ZoomSource::IntentMidpoint));

        let mut zoom = self.clamp_zoom(range, raw_zoom);
        zoom = self.apply_ui_changes(scene_events, range, zoom);

        let center = self.center_for(scene, scene_events, &positions, zoom);

        tracing::debug!(
            "Scene {:.2}-{:.2}s {:?}: zoom {:.2} from {:?}",
            scene.range.start,
            scene.range.end,
            scene.intent,
            zoom,
            zoom_source
        );

        ShotPlan::new(scene.intent, zoom, center, zoom_source)
    }

    fn clamp_zoom(&self, range: ZoomRange, zoom: f64) -> f64 {
        range
            .clamp(zoom)
            .clamp(self.settings.min_zoom, self.settings.max_zoom.max(self.settings.min_zoom))
    }

    /// Tier 1: the scene's active element
    fn element_zoom(&self, scene: &CameraScene) -> Option<(f64, ZoomSource)> {
        let element = scene.active_element()?;
        self.zoom_for_element(&element.rect)
            .map(|zoom| (zoom, ZoomSource::Element))
    }

    /// Tier 2: nearest accessibility element, only when nothing else marked focus
    fn ui_state_zoom(&self, scene: &CameraScene, events: &[UnifiedEvent]) -> Option<(f64, ZoomSource)> {
        if !scene.focus_regions.is_empty() {
            return None;
        }
        let window = self.settings.ui_element_search_window;
        let frame = events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::UiStateChange { .. }))
            .filter_map(|e| Some((scene.range.distance_to(e.time), e.element_frame()?)))
            .filter(|(distance, _)| *distance <= window)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, frame)| frame)?;
        self.zoom_for_element(&frame)
            .map(|zoom| (zoom, ZoomSource::Element))
    }

    /// Tier 3: bounding box of at least two relevant positions
    fn bounding_box_zoom(&self, positions: &[NormalizedPoint]) -> Option<(f64, ZoomSource)> {
        if positions.len() < 2 {
            return None;
        }
        let bounds = NormalizedRect::bounding(positions)?.padded(self.settings.bounding_box_padding);
        let extent = bounds.width.max(bounds.height);
        if extent < EPSILON {
            return None;
        }
        Some((1.0 / extent, ZoomSource::ActivityBoundingBox))
    }

    /// Zoom at which the padded element covers `target_area_coverage` of the
    /// frame, never so far that the element no longer fits
    pub fn zoom_for_element(&self, frame: &NormalizedRect) -> Option<f64> {
        let padded = frame.padded(self.settings.element_padding);
        let area = padded.area();
        let extent = padded.width.max(padded.height);
        if area < EPSILON || extent < EPSILON {
            return None;
        }
        let coverage_zoom = (self.settings.target_area_coverage / area).sqrt();
        Some(coverage_zoom.min(1.0 / extent))
    }

    /// Context expansions pull the camera back; a modal shows in full
    fn apply_ui_changes(&self, scene_events: &[UnifiedEvent], range: ZoomRange, zoom: f64) -> f64 {
        let mut zoom = zoom;
        for event in scene_events {
            match event.kind {
                EventKind::UiStateChange {
                    change: Some(UiChange::ModalOpened),
                } => {
                    tracing::debug!("Modal opened at {:.2}s, zooming out to {:.2}", event.time, range.min);
                    return self.clamp_zoom(range, range.min);
                }
                EventKind::UiStateChange {
                    change: Some(UiChange::ContextChange { expansion_ratio }),
                } if expansion_ratio > 1.0 => {
                    let factor = (1.0 / expansion_ratio.sqrt()).max(self.settings.max_context_reduction);
                    zoom = self.clamp_zoom(range, zoom * factor);
                }
                _ => {}
            }
        }
        zoom
    }

    fn center_for(
        &self,
        scene: &CameraScene,
        scene_events: &[UnifiedEvent],
        positions: &[NormalizedPoint],
        zoom: f64,
    ) -> NormalizedPoint {
        let center = match scene.intent {
            UserIntent::Idle | UserIntent::Switching => NormalizedPoint::center(),
            UserIntent::Typing(_) => self.typing_center(scene, scene_events, zoom),
            _ => self.activity_center(scene, positions),
        };
        clamp_center(center, zoom)
    }

    /// First caret position in the scene, shifted so the active element shows
    fn typing_center(&self, scene: &CameraScene, scene_events: &[UnifiedEvent], zoom: f64) -> NormalizedPoint {
        let center = scene_events
            .iter()
            .find_map(UnifiedEvent::caret_center)
            .or_else(|| scene.spans.iter().find_map(|s| s.focus))
            .or_else(|| scene.focus_regions.first().map(|r| r.rect.center()))
            .unwrap_or_else(NormalizedPoint::center);

        match scene.active_element() {
            Some(element) => constrain_center_to_show_element(center, &element.rect, zoom),
            None => center,
        }
    }

    fn activity_center(&self, scene: &CameraScene, positions: &[NormalizedPoint]) -> NormalizedPoint {
        let base = centroid(positions)
            .or_else(|| {
                let focus: Vec<NormalizedPoint> = scene
                    .focus_regions
                    .iter()
                    .filter(|r| r.source != FocusSource::Caret)
                    .map(|r| r.rect.center())
                    .collect();
                centroid(&focus)
            })
            .unwrap_or_else(NormalizedPoint::center);

        if scene.active_element().is_some() {
            return base;
        }
        match self.saliency.as_ref().and_then(|s| s.saliency_center(scene.range)) {
            Some(salient) => base.lerp(&salient.to_top_left(), self.settings.saliency_weight.clamp(0.0, 1.0)),
            None => base,
        }
    }

    /// Idle scenes inherit framing from the previous non-idle shot with
    /// decaying zoom; a run of idle scenes all inherit from the same source
    ///
    /// Leading idle scenes have no previous shot: they stay wide when the
    /// establishing shot is enabled, otherwise they inherit backward from the
    /// first non-idle scene.
    fn resolve_idle(&self, scenes: &[CameraScene], plans: &mut [ShotPlan]) {
        let decay = self.settings.idle_zoom_decay;
        let idle_range = self.settings.zoom_ranges.idle;

        let mut previous: Option<ShotPlan> = None;
        for (scene, plan) in scenes.iter().zip(plans.iter_mut()) {
            if !scene.intent.is_idle() {
                previous = Some(*plan);
                continue;
            }
            *plan = match &previous {
                Some(source) => source.inheriting(decay, idle_range),
                None => ShotPlan::establishing(idle_range),
            };
        }

        if self.settings.establishing_shot {
            return;
        }
        let Some(first_active) = scenes.iter().position(|s| !s.intent.is_idle()) else {
            return;
        };
        let source = plans[first_active];
        for plan in plans[..first_active].iter_mut() {
            *plan = source.inheriting(decay, idle_range);
        }
    }
}

/// Positions that matter for framing, per intent
fn relevant_positions(scene: &CameraScene, scene_events: &[UnifiedEvent]) -> Vec<NormalizedPoint> {
    let pick = |keep: fn(&UnifiedEvent) -> bool| -> Vec<NormalizedPoint> {
        scene_events.iter().filter(|&e| keep(e)).map(|e| e.position).collect()
    };
    match scene.intent {
        UserIntent::Clicking | UserIntent::Navigating => pick(|e| e.is_primary_click(true)),
        UserIntent::Dragging(_) => pick(UnifiedEvent::is_drag),
        UserIntent::Typing(_) => scene_events.iter().filter_map(UnifiedEvent::caret_center).collect(),
        UserIntent::Scrolling => pick(|e| matches!(e.kind, EventKind::Scroll { .. })),
        UserIntent::Reading => pick(|e| matches!(e.kind, EventKind::MouseMove)),
        UserIntent::Idle | UserIntent::Switching => vec![],
    }
}

/// Shift `center` as little as possible so `element` is inside the viewport
///
/// On an axis where the element is larger than the viewport the center is
/// left where it is.
pub fn constrain_center_to_show_element(
    center: NormalizedPoint,
    element: &NormalizedRect,
    zoom: f64,
) -> NormalizedPoint {
    let c = center.to_top_left();
    let e = element.to_top_left();
    let half = 0.5 / zoom.max(1.0);

    let axis = |value: f64, min: f64, max: f64| {
        if max - min > 2.0 * half {
            return value;
        }
        if value - half > min {
            min + half
        } else if value + half < max {
            max - half
        } else {
            value
        }
    };

    NormalizedPoint::new(
        axis(c.x, e.min_x(), e.max_x()),
        axis(c.y, e.min_y(), e.max_y()),
    )
}
