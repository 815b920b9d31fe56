//! Single time-ordered stream over every telemetry source
//!
//! Built once per recording. Positions are converted to top-left space here
//! so nothing downstream has to care which origin a collaborator used.

use crate::capture::input::source::MouseDataSource;
use crate::capture::input::types::{
    ClickType, DragPhase, KeyEventType, ModifierFlags, MousePositionData, UiChange, UiElementInfo,
};
use crate::geometry::{NormalizedPoint, NormalizedRect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum EventKind {
    MouseMove,
    #[serde(rename_all = "camelCase")]
    Click {
        click_type: ClickType,
    },
    #[serde(rename_all = "camelCase")]
    KeyDown {
        key_code: u16,
        characters: Option<String>,
        modifiers: ModifierFlags,
    },
    #[serde(rename_all = "camelCase")]
    KeyUp {
        key_code: u16,
        modifiers: ModifierFlags,
    },
    DragStart,
    DragEnd,
    #[serde(rename_all = "camelCase")]
    Scroll {
        delta_x: f64,
        delta_y: f64,
    },
    UiStateChange {
        change: Option<UiChange>,
    },
}

/// Context attached to an event when the collaborator supplied it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub app_bundle_id: Option<String>,
    pub element: Option<UiElementInfo>,
    pub caret_bounds: Option<NormalizedRect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedEvent {
    pub time: f64,
    pub kind: EventKind,
    /// Top-left normalized position
    pub position: NormalizedPoint,
    pub metadata: EventMetadata,
}

impl UnifiedEvent {
    fn new(time: f64, kind: EventKind, position: NormalizedPoint) -> Self {
        Self {
            time,
            kind,
            position: position.to_top_left(),
            metadata: EventMetadata::default(),
        }
    }

    fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = EventMetadata {
            app_bundle_id: metadata.app_bundle_id,
            element: metadata.element.map(|mut e| {
                e.frame = e.frame.to_top_left();
                e
            }),
            caret_bounds: metadata.caret_bounds.map(NormalizedRect::to_top_left),
        };
        self
    }

    pub fn is_click(&self) -> bool {
        matches!(self.kind, EventKind::Click { .. })
    }

    /// Left-button press, or a double click when `include_double_clicks` is set
    pub fn is_primary_click(&self, include_double_clicks: bool) -> bool {
        match self.kind {
            EventKind::Click {
                click_type: ClickType::LeftDown,
            } => true,
            EventKind::Click {
                click_type: ClickType::DoubleClick,
            } => include_double_clicks,
            _ => false,
        }
    }

    pub fn is_drag(&self) -> bool {
        matches!(self.kind, EventKind::DragStart | EventKind::DragEnd)
    }

    pub fn caret_center(&self) -> Option<NormalizedPoint> {
        self.metadata.caret_bounds.map(|caret| caret.center())
    }

    pub fn element_frame(&self) -> Option<NormalizedRect> {
        self.metadata.element.as_ref().map(|e| e.frame)
    }
}

/// Merge every telemetry array into one stream ordered by time
///
/// Mouse moves come from `cleaned_positions`; keyboard events borrow the
/// cursor position from the raw path since they carry none of their own.
/// The sort is stable, so simultaneous events keep source order.
pub fn build_unified_events(
    source: &dyn MouseDataSource,
    cleaned_positions: &[MousePositionData],
) -> Vec<UnifiedEvent> {
    let raw = source.positions();
    let mut events = Vec::with_capacity(
        cleaned_positions.len()
            + source.clicks().len()
            + source.keyboard_events().len()
            + source.drag_events().len()
            + source.scroll_events().len()
            + source.ui_samples().len(),
    );

    events.extend(
        cleaned_positions
            .iter()
            .map(|p| UnifiedEvent::new(p.time, EventKind::MouseMove, p.position)),
    );

    events.extend(source.clicks().iter().map(|click| {
        UnifiedEvent::new(
            click.time,
            EventKind::Click {
                click_type: click.click_type,
            },
            click.position,
        )
        .with_metadata(EventMetadata {
            app_bundle_id: click.app_bundle_id.clone(),
            element: click.element.clone(),
            caret_bounds: None,
        })
    }));

    events.extend(source.keyboard_events().iter().map(|key| {
        let kind = match key.event_type {
            KeyEventType::KeyDown => EventKind::KeyDown {
                key_code: key.key_code,
                characters: key.characters.clone(),
                modifiers: key.modifiers,
            },
            KeyEventType::KeyUp => EventKind::KeyUp {
                key_code: key.key_code,
                modifiers: key.modifiers,
            },
        };
        UnifiedEvent::new(key.time, kind, cursor_at(raw, key.time)).with_metadata(EventMetadata {
            app_bundle_id: key.app_bundle_id.clone(),
            ..Default::default()
        })
    }));

    events.extend(source.drag_events().iter().map(|drag| {
        let kind = match drag.phase {
            DragPhase::Start => EventKind::DragStart,
            DragPhase::End => EventKind::DragEnd,
        };
        UnifiedEvent::new(drag.time, kind, drag.position).with_metadata(EventMetadata {
            element: drag.element.clone(),
            ..Default::default()
        })
    }));

    events.extend(source.scroll_events().iter().map(|scroll| {
        UnifiedEvent::new(
            scroll.time,
            EventKind::Scroll {
                delta_x: scroll.delta_x,
                delta_y: scroll.delta_y,
            },
            scroll.position,
        )
    }));

    events.extend(source.ui_samples().iter().map(|sample| {
        let position = sample
            .focus_point()
            .unwrap_or_else(|| cursor_at(raw, sample.time));
        UnifiedEvent::new(
            sample.time,
            EventKind::UiStateChange {
                change: sample.change,
            },
            position,
        )
        .with_metadata(EventMetadata {
            app_bundle_id: sample.app_bundle_id.clone(),
            element: sample.element.clone(),
            caret_bounds: sample.caret_bounds,
        })
    }));

    events.sort_by(|a, b| a.time.total_cmp(&b.time));

    tracing::debug!(
        "Built {} unified events ({} cursor samples)",
        events.len(),
        cleaned_positions.len()
    );

    events
}

/// Last known cursor position at `time`
///
/// Falls back to the first sample before the cursor was seen, and to the
/// frame center when there is no cursor data at all.
pub fn cursor_at(positions: &[MousePositionData], time: f64) -> NormalizedPoint {
    let idx = positions.partition_point(|p| p.time <= time);
    let sample = if idx == 0 {
        positions.first()
    } else {
        positions.get(idx - 1)
    };
    sample
        .map(|p| p.position.to_top_left())
        .unwrap_or_else(NormalizedPoint::center)
}

/// Events whose time lies in `[start, end]`, assuming `events` is time ordered
pub fn events_between(events: &[UnifiedEvent], start: f64, end: f64) -> &[UnifiedEvent] {
    let lo = events.partition_point(|e| e.time < start);
    let hi = events.partition_point(|e| e.time <= end);
    &events[lo..hi.max(lo)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::source::Recording;
    use crate::capture::input::types::{
        ClickEventData, DragEventData, KeyboardEventData, ScrollEventData, UiStateSample,
    };
    use crate::geometry::CoordinateSpace;

    fn recording() -> Recording {
        let mut recording = Recording::new(5.0, 30.0);
        recording.positions = (0..10)
            .map(|i| MousePositionData::new(i as f64 * 0.5, 0.1 * i as f64, 0.5))
            .collect();
        recording.clicks = vec![ClickEventData::new(1.0, 0.3, 0.4, ClickType::LeftDown)];
        recording.keyboard_events = vec![KeyboardEventData::key_down(2.2, "a")];
        recording.drag_events = vec![DragEventData::new(3.0, 0.2, 0.2, DragPhase::Start)];
        recording.scroll_events = vec![ScrollEventData {
            time: 0.2,
            position: NormalizedPoint::new(0.5, 0.5),
            delta_x: 0.0,
            delta_y: -3.0,
        }];
        recording.ui_samples = vec![UiStateSample::new(1.0)];
        recording
    }

    #[test]
    fn test_events_sorted_stably() {
        let recording = recording();
        let events = build_unified_events(&recording, &recording.positions);

        assert_eq!(events.len(), 15);
        assert!(events.windows(2).all(|w| w[0].time <= w[1].time));

        // Mouse move, click and UI sample all at t=1.0 keep source order
        let at_one: Vec<&EventKind> = events.iter().filter(|e| e.time == 1.0).map(|e| &e.kind).collect();
        assert!(matches!(at_one[0], EventKind::MouseMove));
        assert!(matches!(at_one[1], EventKind::Click { .. }));
        assert!(matches!(at_one[2], EventKind::UiStateChange { .. }));
    }

    #[test]
    fn test_keyboard_events_use_cursor_position() {
        let recording = recording();
        let events = build_unified_events(&recording, &recording.positions);
        let key = events
            .iter()
            .find(|e| matches!(e.kind, EventKind::KeyDown { .. }))
            .unwrap();
        // Cursor sample at t=2.0 is the last one before the key press
        assert!((key.position.x - 0.4).abs() < 1e-9, "got {:?}", key.position);
    }

    #[test]
    fn test_bottom_left_input_is_converted() {
        let mut recording = Recording::new(1.0, 30.0);
        let mut click = ClickEventData::new(0.5, 0.2, 0.9, ClickType::LeftDown);
        click.position = NormalizedPoint::with_space(0.2, 0.9, CoordinateSpace::BottomLeft);
        recording.clicks = vec![click];

        let events = build_unified_events(&recording, &[]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].position.space, CoordinateSpace::TopLeft);
        assert!((events[0].position.y - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_cursor_at_fallbacks() {
        assert_eq!(cursor_at(&[], 1.0), NormalizedPoint::center());
        let positions = vec![MousePositionData::new(1.0, 0.2, 0.3)];
        assert_eq!(cursor_at(&positions, 0.0), NormalizedPoint::new(0.2, 0.3));
        assert_eq!(cursor_at(&positions, 5.0), NormalizedPoint::new(0.2, 0.3));
    }

    #[test]
    fn test_events_between_is_inclusive() {
        let recording = recording();
        let events = build_unified_events(&recording, &recording.positions);
        let slice = events_between(&events, 1.0, 2.0);
        assert!(slice.iter().all(|e| e.time >= 1.0 && e.time <= 2.0));
        assert_eq!(slice.len(), 5);
    }
}
