//! Labels the timeline with what the user is doing
//!
//! Candidate spans are proposed per activity type, then painted onto the
//! timeline in priority order so a higher-priority span clips whatever it
//! overlaps. Remaining gaps become reading or idle depending on how much
//! the cursor moved. The result tiles `[0, duration)` exactly.

use crate::geometry::{centroid, path_length, NormalizedPoint, NormalizedRect};
use crate::intent::activity::{ActivityEvent, ActivityKind};
use crate::intent::types::{DragContext, IntentSpan, TimeRange, TypingContext, UserIntent};
use crate::intent::unified_event::{events_between, EventKind, UnifiedEvent};
use crate::settings::IntentSettings;

const TYPING_CONFIDENCE: f64 = 0.9;
const DRAG_CONFIDENCE: f64 = 0.85;
const CLICK_CONFIDENCE: f64 = 0.8;
const NAVIGATION_CONFIDENCE: f64 = 0.7;
const SCROLL_CONFIDENCE: f64 = 0.75;
const SWITCH_CONFIDENCE: f64 = 0.95;
const READING_CONFIDENCE: f64 = 0.5;
const IDLE_CONFIDENCE: f64 = 0.6;

pub struct IntentClassifier {
    settings: IntentSettings,
}

impl IntentClassifier {
    pub fn new(settings: IntentSettings) -> Self {
        Self { settings }
    }

    /// Classify a recording into contiguous intent spans covering `[0, duration)`
    pub fn classify(
        &self,
        activity: &[ActivityEvent],
        events: &[UnifiedEvent],
        duration: f64,
    ) -> Vec<IntentSpan> {
        if !(duration.is_finite() && duration > 0.0) {
            tracing::warn!("Recording duration {} is not positive, no intent spans", duration);
            return vec![];
        }
        let timeline = TimeRange::new(0.0, duration);

        // Highest priority first
        let candidates = [
            self.switching_spans(events),
            self.drag_spans(activity),
            self.typing_spans(activity),
            self.click_spans(activity),
            self.scroll_spans(events),
        ];

        let mut placed: Vec<IntentSpan> = Vec::new();
        for span in candidates.into_iter().flatten() {
            let Some(range) = span.range.intersection(&timeline) else {
                continue;
            };
            let mut pieces = vec![range];
            for existing in &placed {
                pieces = pieces
                    .into_iter()
                    .flat_map(|piece| piece.subtract(&existing.range))
                    .collect();
            }
            placed.extend(pieces.into_iter().map(|range| IntentSpan {
                range,
                ..span.clone()
            }));
        }
        placed.sort_by(|a, b| a.range.start.total_cmp(&b.range.start));

        let spans = self.fill_gaps(placed, events, duration);

        tracing::debug!("Classified {} intent spans over {:.2}s", spans.len(), duration);
        spans
    }

    /// Typing from session markers; a start without an end lasts `typing_min_duration`
    fn typing_spans(&self, activity: &[ActivityEvent]) -> Vec<IntentSpan> {
        let mut spans = Vec::new();
        for (i, start) in activity.iter().enumerate() {
            if start.kind != ActivityKind::TypingStart {
                continue;
            }
            let end_time = activity[i + 1..]
                .iter()
                .take_while(|e| e.kind != ActivityKind::TypingStart)
                .find(|e| e.kind == ActivityKind::TypingEnd)
                .map(|e| e.time)
                .unwrap_or(start.time)
                .max(start.time + self.settings.typing_min_duration);

            let context = TypingContext::infer(start.app_bundle_id.as_deref(), start.element.as_ref());
            let focus = start.caret_bounds.map(|c| c.center()).unwrap_or(start.position);
            spans.push(
                IntentSpan::new(
                    TimeRange::new(start.time, end_time),
                    UserIntent::Typing(context),
                    TYPING_CONFIDENCE,
                )
                .with_focus(focus)
                .with_element(start.element.clone())
                .with_app(start.app_bundle_id.clone()),
            );
        }
        spans
    }

    /// Drag start paired with the next drag end, extended by `drag_tail`
    fn drag_spans(&self, activity: &[ActivityEvent]) -> Vec<IntentSpan> {
        let mut spans = Vec::new();
        let mut open: Option<&ActivityEvent> = None;

        for event in activity {
            match event.kind {
                ActivityKind::DragStart => {
                    if let Some(start) = open.take() {
                        spans.push(self.drag_span(start, None));
                    }
                    open = Some(event);
                }
                ActivityKind::DragEnd => {
                    if let Some(start) = open.take() {
                        spans.push(self.drag_span(start, Some(event)));
                    }
                }
                _ => {}
            }
        }
        if let Some(start) = open {
            spans.push(self.drag_span(start, None));
        }
        spans
    }

    fn drag_span(&self, start: &ActivityEvent, end: Option<&ActivityEvent>) -> IntentSpan {
        let end_time = end.map(|e| e.time).unwrap_or(start.time) + self.settings.drag_tail;
        let focus = match end {
            Some(end) => start.position.lerp(&end.position, 0.5),
            None => start.position,
        };
        IntentSpan::new(
            TimeRange::new(start.time, end_time),
            UserIntent::Dragging(DragContext::infer(start.element.as_ref())),
            DRAG_CONFIDENCE,
        )
        .with_focus(focus)
        .with_element(start.element.clone())
    }

    /// Click clusters; spread-out clusters or navigation targets mean navigating
    fn click_spans(&self, activity: &[ActivityEvent]) -> Vec<IntentSpan> {
        let clicks: Vec<&ActivityEvent> = activity
            .iter()
            .filter(|e| e.kind == ActivityKind::Click)
            .collect();

        let mut spans = Vec::new();
        for cluster in cluster_by_gap(&clicks, |c| c.time, self.settings.click_group_gap) {
            let (Some(first), Some(last)) = (cluster.first(), cluster.last()) else {
                continue;
            };
            let positions: Vec<NormalizedPoint> = cluster.iter().map(|c| c.position).collect();
            let spread = NormalizedRect::bounding(&positions)
                .map(|b| b.width.max(b.height))
                .unwrap_or(0.0);
            let hits_navigation = cluster
                .iter()
                .any(|c| c.element.as_ref().is_some_and(|e| e.is_navigation()));

            let (intent, confidence) = if spread > self.settings.navigation_spread || hits_navigation {
                (UserIntent::Navigating, NAVIGATION_CONFIDENCE)
            } else {
                (UserIntent::Clicking, CLICK_CONFIDENCE)
            };

            let mut span = IntentSpan::new(
                TimeRange::new(
                    first.time - self.settings.click_lead,
                    last.time + self.settings.click_hold,
                ),
                intent,
                confidence,
            )
            .with_element(last.element.clone())
            .with_app(last.app_bundle_id.clone());
            if let Some(center) = centroid(&positions) {
                span = span.with_focus(center);
            }
            spans.push(span);
        }
        spans
    }

    fn scroll_spans(&self, events: &[UnifiedEvent]) -> Vec<IntentSpan> {
        let scrolls: Vec<&UnifiedEvent> = events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::Scroll { .. }))
            .collect();

        cluster_by_gap(&scrolls, |e| e.time, self.settings.scroll_group_gap)
            .into_iter()
            .filter_map(|run| {
                let (first, last) = (run.first()?, run.last()?);
                let positions: Vec<NormalizedPoint> = run.iter().map(|e| e.position).collect();
                let mut span = IntentSpan::new(
                    TimeRange::new(first.time, last.time + self.settings.scroll_hold),
                    UserIntent::Scrolling,
                    SCROLL_CONFIDENCE,
                );
                if let Some(center) = centroid(&positions) {
                    span = span.with_focus(center);
                }
                Some(span)
            })
            .collect()
    }

    /// A change of frontmost app in the accessibility samples
    fn switching_spans(&self, events: &[UnifiedEvent]) -> Vec<IntentSpan> {
        let mut spans = Vec::new();
        let mut current_app: Option<&str> = None;

        for event in events {
            if !matches!(event.kind, EventKind::UiStateChange { .. }) {
                continue;
            }
            let Some(app) = event.metadata.app_bundle_id.as_deref() else {
                continue;
            };
            if current_app.is_some_and(|previous| previous != app) {
                spans.push(
                    IntentSpan::new(
                        TimeRange::new(event.time, event.time + self.settings.switch_duration),
                        UserIntent::Switching,
                        SWITCH_CONFIDENCE,
                    )
                    .with_app(Some(app.to_string())),
                );
            }
            current_app = Some(app);
        }
        spans
    }

    /// Fill every uncovered stretch with reading or idle
    fn fill_gaps(&self, placed: Vec<IntentSpan>, events: &[UnifiedEvent], duration: f64) -> Vec<IntentSpan> {
        let mut result = Vec::with_capacity(placed.len() * 2 + 1);
        let mut cursor = 0.0;

        for span in placed {
            if span.range.start > cursor {
                result.push(self.gap_span(TimeRange::new(cursor, span.range.start), events));
            }
            cursor = span.range.end;
            result.push(span);
        }
        if cursor < duration {
            result.push(self.gap_span(TimeRange::new(cursor, duration), events));
        }
        result
    }

    fn gap_span(&self, range: TimeRange, events: &[UnifiedEvent]) -> IntentSpan {
        let path: Vec<NormalizedPoint> = events_between(events, range.start, range.end)
            .iter()
            .filter(|e| matches!(e.kind, EventKind::MouseMove))
            .map(|e| e.position)
            .collect();

        if path_length(&path) < self.settings.idle_motion_threshold {
            IntentSpan::new(range, UserIntent::Idle, IDLE_CONFIDENCE)
        } else {
            let mut span = IntentSpan::new(range, UserIntent::Reading, READING_CONFIDENCE);
            if let Some(center) = centroid(&path) {
                span = span.with_focus(center);
            }
            span
        }
    }
}

/// Split time-ordered items wherever consecutive items are more than `gap` apart
fn cluster_by_gap<'a, T>(items: &[&'a T], time: impl Fn(&T) -> f64, gap: f64) -> Vec<Vec<&'a T>> {
    let mut clusters: Vec<Vec<&'a T>> = Vec::new();
    for &item in items {
        match clusters.last_mut() {
            Some(cluster) if cluster.last().is_some_and(|prev| time(item) - time(prev) <= gap) => {
                cluster.push(item)
            }
            _ => clusters.push(vec![item]),
        }
    }
    clusters
}
