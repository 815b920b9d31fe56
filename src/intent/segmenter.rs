//! Groups intent spans into camera scenes
//!
//! A scene is one shot: a run of spans in the same intent category. Scenes
//! that are too short to read on screen are folded into a neighbour.

use crate::geometry::{NormalizedPoint, NormalizedRect};
use crate::intent::types::{FocusRegion, FocusSource, IntentSpan, TimeRange, UserIntent};
use crate::intent::unified_event::{events_between, UnifiedEvent};
use crate::settings::{BoxSize, SegmentationSettings};
use serde::{Deserialize, Serialize};

const ELEMENT_CONFIDENCE: f64 = 0.9;
const CARET_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraScene {
    pub range: TimeRange,
    /// Intent with the greatest cumulative duration in the scene
    pub intent: UserIntent,
    pub spans: Vec<IntentSpan>,
    pub focus_regions: Vec<FocusRegion>,
    pub app_context: Option<String>,
}

impl CameraScene {
    pub fn duration(&self) -> f64 {
        self.range.duration()
    }

    /// Most recent active-element region, if accessibility data was available
    pub fn active_element(&self) -> Option<&FocusRegion> {
        self.focus_regions
            .iter()
            .filter(|r| r.source == FocusSource::ActiveElement)
            .max_by(|a, b| a.time.total_cmp(&b.time))
    }
}

/// Whether `next` must open a new scene after `current`
///
/// Switching and idle always stand alone; otherwise only a change of
/// intent category splits.
pub fn should_start_new_scene(current: &UserIntent, next: &UserIntent) -> bool {
    if current.is_switching() || next.is_switching() || current.is_idle() || next.is_idle() {
        return true;
    }
    current.category() != next.category()
}

pub struct SceneSegmenter {
    settings: SegmentationSettings,
}

impl SceneSegmenter {
    pub fn new(settings: SegmentationSettings) -> Self {
        Self { settings }
    }

    pub fn segment(&self, spans: &[IntentSpan], events: &[UnifiedEvent]) -> Vec<CameraScene> {
        let mut groups: Vec<Vec<IntentSpan>> = Vec::new();
        for span in spans {
            match groups.last_mut() {
                Some(group)
                    if group
                        .last()
                        .is_some_and(|last| !should_start_new_scene(&last.intent, &span.intent)) =>
                {
                    group.push(span.clone())
                }
                _ => groups.push(vec![span.clone()]),
            }
        }

        let before = groups.len();
        let groups = self.absorb_short_scenes(groups);
        tracing::debug!(
            "Segmented {} spans into {} scenes ({} absorbed)",
            spans.len(),
            groups.len(),
            before - groups.len()
        );

        groups
            .into_iter()
            .filter_map(|group| self.build_scene(group, events))
            .collect()
    }

    /// Fold scenes shorter than `min_scene_duration` into their longer neighbour
    ///
    /// Ties go to the previous scene. When every scene is short nothing is
    /// merged.
    fn absorb_short_scenes(&self, mut groups: Vec<Vec<IntentSpan>>) -> Vec<Vec<IntentSpan>> {
        let min = self.settings.min_scene_duration;
        if groups.iter().all(|g| group_duration(g) < min) {
            if groups.len() > 1 {
                tracing::warn!("All {} scenes are shorter than {}s, leaving them unmerged", groups.len(), min);
            }
            return groups;
        }

        while groups.len() > 1 {
            let Some(index) = groups.iter().position(|g| group_duration(g) < min) else {
                break;
            };

            let previous = index.checked_sub(1).map(|i| group_duration(&groups[i]));
            let next = groups.get(index + 1).map(|g| group_duration(g));
            let into_previous = match (previous, next) {
                (Some(p), Some(n)) => p >= n,
                (Some(_), None) => true,
                _ => false,
            };

            let short = groups.remove(index);
            if into_previous {
                groups[index - 1].extend(short);
            } else {
                let mut merged = short;
                merged.append(&mut groups[index]);
                groups[index] = merged;
            }
        }
        groups
    }

    fn build_scene(&self, spans: Vec<IntentSpan>, events: &[UnifiedEvent]) -> Option<CameraScene> {
        let range = TimeRange::new(spans.first()?.range.start, spans.last()?.range.end);
        let intent = dominant_intent(&spans)?;
        let scene_events = events_between(events, range.start, range.end);

        let mut focus_regions: Vec<FocusRegion> = spans.iter().filter_map(|s| self.span_region(s)).collect();

        focus_regions.extend(spans.iter().filter_map(|span| {
            span.element.as_ref().map(|element| FocusRegion {
                time: span.range.start,
                rect: element.frame,
                confidence: ELEMENT_CONFIDENCE,
                source: FocusSource::ActiveElement,
            })
        }));

        focus_regions.extend(scene_events.iter().filter_map(|event| {
            event.metadata.caret_bounds.map(|caret| FocusRegion {
                time: event.time,
                rect: caret,
                confidence: CARET_CONFIDENCE,
                source: FocusSource::Caret,
            })
        }));
        focus_regions.sort_by(|a, b| a.time.total_cmp(&b.time));

        let app_context = spans
            .iter()
            .find_map(|s| s.app_bundle_id.clone())
            .or_else(|| scene_events.iter().find_map(|e| e.metadata.app_bundle_id.clone()));

        Some(CameraScene {
            range,
            intent,
            spans,
            focus_regions,
            app_context,
        })
    }

    /// Box around a span's focus point, sized for what the intent looks at
    fn span_region(&self, span: &IntentSpan) -> Option<FocusRegion> {
        let focus = span.focus?;
        let (size, source) = match span.intent {
            UserIntent::Typing(_) => (self.settings.typing_box, FocusSource::CursorPosition),
            UserIntent::Clicking => (self.settings.click_box, FocusSource::ClickTarget),
            UserIntent::Navigating => (self.settings.navigation_box, FocusSource::ClickTarget),
            UserIntent::Dragging(_) => (self.settings.drag_box, FocusSource::CursorPosition),
            UserIntent::Scrolling => (self.settings.scroll_box, FocusSource::CursorPosition),
            UserIntent::Reading => (self.settings.reading_box, FocusSource::CursorPosition),
            UserIntent::Switching | UserIntent::Idle => return None,
        };
        Some(FocusRegion {
            time: span.range.start,
            rect: focus_box(focus, size),
            confidence: span.confidence,
            source,
        })
    }
}

fn focus_box(center: NormalizedPoint, size: BoxSize) -> NormalizedRect {
    NormalizedRect::centered_at(center, size.width, size.height).clamped_to_unit()
}

fn group_duration(group: &[IntentSpan]) -> f64 {
    match (group.first(), group.last()) {
        (Some(first), Some(last)) => last.range.end - first.range.start,
        _ => 0.0,
    }
}

/// Intent with the greatest total duration; ties keep the first encountered
pub fn dominant_intent(spans: &[IntentSpan]) -> Option<UserIntent> {
    let mut totals: Vec<(UserIntent, f64)> = Vec::new();
    for span in spans {
        match totals.iter_mut().find(|(intent, _)| *intent == span.intent) {
            Some((_, total)) => *total += span.duration(),
            None => totals.push((span.intent, span.duration())),
        }
    }

    let mut best: Option<(UserIntent, f64)> = None;
    for (intent, total) in totals {
        if best.map_or(true, |(_, best_total)| total > best_total) {
            best = Some((intent, total));
        }
    }
    best.map(|(intent, _)| intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::types::UiElementInfo;
    use crate::intent::types::{DragContext, TypingContext};

    const TYPING: UserIntent = UserIntent::Typing(TypingContext::TextField);

    fn span(start: f64, end: f64, intent: UserIntent) -> IntentSpan {
        IntentSpan::new(TimeRange::new(start, end), intent, 0.8)
    }

    fn segmenter() -> SceneSegmenter {
        SceneSegmenter::new(SegmentationSettings::default())
    }

    #[test]
    fn test_same_category_spans_merge() {
        let spans = vec![
            span(0.0, 2.0, TYPING),
            span(2.0, 4.0, TYPING),
            span(4.0, 5.0, UserIntent::Clicking),
        ];
        let scenes = segmenter().segment(&spans, &[]);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].range, TimeRange::new(0.0, 4.0));
        assert_eq!(scenes[0].intent, TYPING);
        assert_eq!(scenes[1].range, TimeRange::new(4.0, 5.0));
        assert_eq!(scenes[1].intent, UserIntent::Clicking);
    }

    #[test]
    fn test_scene_break_rules() {
        let code = UserIntent::Typing(TypingContext::CodeEditor);
        assert!(should_start_new_scene(&TYPING, &code), "typing sub-contexts differ");
        assert!(!should_start_new_scene(
            &UserIntent::Dragging(DragContext::TextSelection),
            &UserIntent::Dragging(DragContext::ObjectMove)
        ));
        assert!(should_start_new_scene(&UserIntent::Idle, &UserIntent::Idle));
        assert!(should_start_new_scene(&UserIntent::Switching, &UserIntent::Switching));
        assert!(!should_start_new_scene(&UserIntent::Clicking, &UserIntent::Clicking));
    }

    #[test]
    fn test_short_scene_absorbed_into_longer_neighbour() {
        let spans = vec![
            span(0.0, 1.0, UserIntent::Clicking),
            span(1.0, 1.1, UserIntent::Scrolling),
            span(1.1, 4.0, TYPING),
        ];
        let scenes = segmenter().segment(&spans, &[]);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[1].range, TimeRange::new(1.0, 4.0));
        assert_eq!(scenes[1].intent, TYPING, "the longer span dominates");
        assert_eq!(scenes[1].spans.len(), 2);
    }

    #[test]
    fn test_short_scene_tie_goes_to_previous() {
        let spans = vec![
            span(0.0, 1.0, UserIntent::Clicking),
            span(1.0, 1.25, UserIntent::Scrolling),
            span(1.25, 2.25, TYPING),
        ];
        let scenes = segmenter().segment(&spans, &[]);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].range.end, 1.25);
        assert_eq!(scenes[0].intent, UserIntent::Clicking);
    }

    #[test]
    fn test_all_short_scenes_are_left_alone() {
        let spans = vec![
            span(0.0, 0.1, UserIntent::Clicking),
            span(0.1, 0.2, UserIntent::Idle),
            span(0.2, 0.25, TYPING),
        ];
        let scenes = segmenter().segment(&spans, &[]);
        assert_eq!(scenes.len(), 3);
    }

    #[test]
    fn test_scenes_tile_input() {
        let spans = vec![
            span(0.0, 0.2, UserIntent::Idle),
            span(0.2, 1.5, UserIntent::Clicking),
            span(1.5, 1.6, UserIntent::Reading),
            span(1.6, 3.0, UserIntent::Scrolling),
            span(3.0, 3.1, UserIntent::Switching),
            span(3.1, 5.0, UserIntent::Idle),
        ];
        let scenes = segmenter().segment(&spans, &[]);
        assert_eq!(scenes.first().map(|s| s.range.start), Some(0.0));
        assert_eq!(scenes.last().map(|s| s.range.end), Some(5.0));
        for pair in scenes.windows(2) {
            assert_eq!(pair[0].range.end, pair[1].range.start);
        }
        assert!(scenes.iter().all(|s| s.duration() >= 0.3));
    }

    #[test]
    fn test_dominant_intent_tie_keeps_first() {
        let spans = vec![span(0.0, 1.0, UserIntent::Clicking), span(1.0, 2.0, UserIntent::Scrolling)];
        assert_eq!(dominant_intent(&spans), Some(UserIntent::Clicking));
        assert_eq!(dominant_intent(&[]), None);
    }

    #[test]
    fn test_focus_regions_include_element() {
        let field = NormalizedRect::new(0.2, 0.2, 0.3, 0.05);
        let typing = span(0.0, 2.0, TYPING)
            .with_focus(NormalizedPoint::new(0.3, 0.22))
            .with_element(Some(UiElementInfo::new("AXTextField", field)));

        let scenes = segmenter().segment(&[typing], &[]);
        let regions = &scenes[0].focus_regions;
        assert_eq!(regions.len(), 2);
        assert!((regions[0].rect.width - 0.3).abs() < 1e-9, "typing box is wide");
        assert!((regions[0].rect.height - 0.06).abs() < 1e-9, "typing box is short");
        assert_eq!(scenes[0].active_element().map(|r| r.rect), Some(field));
    }
}
