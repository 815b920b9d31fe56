//! Reduces raw telemetry to the moments that matter for framing
//!
//! Clicks, drag boundaries and typing sessions are merged into one
//! time-ordered list of [`ActivityEvent`]s.

use crate::capture::input::source::MouseDataSource;
use crate::capture::input::types::{
    ClickEventData, ClickType, DragPhase, KeyboardEventData, UiElementInfo,
};
use crate::geometry::{NormalizedPoint, NormalizedRect};
use crate::intent::unified_event::cursor_at;
use crate::settings::ActivitySettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityKind {
    Click,
    DragStart,
    DragEnd,
    TypingStart,
    TypingEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub time: f64,
    pub kind: ActivityKind,
    /// Top-left normalized position
    pub position: NormalizedPoint,
    pub app_bundle_id: Option<String>,
    pub element: Option<UiElementInfo>,
    pub caret_bounds: Option<NormalizedRect>,
}

impl ActivityEvent {
    fn new(time: f64, kind: ActivityKind, position: NormalizedPoint) -> Self {
        Self {
            time,
            kind,
            position: position.to_top_left(),
            app_bundle_id: None,
            element: None,
            caret_bounds: None,
        }
    }
}

/// Run of non-shortcut key presses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingSession {
    pub start: f64,
    /// Time of the last key press in the session
    pub end: f64,
    pub key_count: usize,
    pub app_bundle_id: Option<String>,
}

impl TypingSession {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Where a typing session happens and on which element
struct SessionTarget {
    position: NormalizedPoint,
    element: Option<UiElementInfo>,
    caret_bounds: Option<NormalizedRect>,
    app_bundle_id: Option<String>,
}

pub struct ActivityCollector {
    settings: ActivitySettings,
}

impl ActivityCollector {
    pub fn new(settings: ActivitySettings) -> Self {
        Self { settings }
    }

    /// Merge clicks, drags and typing sessions into one list sorted by time
    pub fn collect(&self, source: &dyn MouseDataSource) -> Vec<ActivityEvent> {
        let mut events = Vec::new();

        for click in source.clicks() {
            if !self.is_activity_click(click) {
                continue;
            }
            let mut event = ActivityEvent::new(click.time, ActivityKind::Click, click.position);
            event.app_bundle_id = click.app_bundle_id.clone();
            event.element = click.element.clone().map(top_left_element);
            events.push(event);
        }

        for drag in source.drag_events() {
            let kind = match drag.phase {
                DragPhase::Start => ActivityKind::DragStart,
                DragPhase::End => ActivityKind::DragEnd,
            };
            let mut event = ActivityEvent::new(drag.time, kind, drag.position);
            event.element = drag.element.clone().map(top_left_element);
            events.push(event);
        }

        let sessions = self.detect_typing_sessions(source.keyboard_events());
        for session in &sessions {
            let target = self.resolve_session_target(session, source);

            let mut start = ActivityEvent::new(session.start, ActivityKind::TypingStart, target.position);
            start.app_bundle_id = session.app_bundle_id.clone().or(target.app_bundle_id);
            start.element = target.element;
            start.caret_bounds = target.caret_bounds;

            if session.duration() >= self.settings.min_typing_session_duration {
                let mut end = start.clone();
                end.time = session.end;
                end.kind = ActivityKind::TypingEnd;
                events.push(start);
                events.push(end);
            } else {
                tracing::debug!(
                    "Typing session at {:.2}s lasted {:.2}s, emitting start marker only",
                    session.start,
                    session.duration()
                );
                events.push(start);
            }
        }

        events.sort_by(|a, b| a.time.total_cmp(&b.time));

        tracing::debug!(
            "Collected {} activity events ({} typing sessions)",
            events.len(),
            sessions.len()
        );

        events
    }

    /// Group non-shortcut key presses separated by at most `typing_session_gap`
    pub fn detect_typing_sessions(&self, keyboard: &[KeyboardEventData]) -> Vec<TypingSession> {
        let mut presses: Vec<&KeyboardEventData> = keyboard
            .iter()
            .filter(|k| k.is_key_down() && !k.is_shortcut())
            .collect();
        presses.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut sessions: Vec<TypingSession> = Vec::new();
        for press in presses {
            match sessions.last_mut() {
                Some(current) if press.time - current.end <= self.settings.typing_session_gap => {
                    current.end = press.time;
                    current.key_count += 1;
                    if current.app_bundle_id.is_none() {
                        current.app_bundle_id = press.app_bundle_id.clone();
                    }
                }
                _ => sessions.push(TypingSession {
                    start: press.time,
                    end: press.time,
                    key_count: 1,
                    app_bundle_id: press.app_bundle_id.clone(),
                }),
            }
        }
        sessions
    }

    fn is_activity_click(&self, click: &ClickEventData) -> bool {
        match click.click_type {
            ClickType::LeftDown => true,
            ClickType::DoubleClick => self.settings.include_double_clicks,
            _ => false,
        }
    }

    /// Element and position for a typing session
    ///
    /// Prefers the accessibility sample nearest the session start. When the
    /// user clicked that same element earlier, the click position wins so
    /// the camera stays where focus was given instead of drifting with the caret.
    fn resolve_session_target(&self, session: &TypingSession, source: &dyn MouseDataSource) -> SessionTarget {
        let sample = source
            .ui_samples()
            .iter()
            .filter(|s| s.element.is_some())
            .filter(|s| (s.time - session.start).abs() <= self.settings.ui_sample_tolerance)
            .min_by(|a, b| {
                (a.time - session.start)
                    .abs()
                    .total_cmp(&(b.time - session.start).abs())
            });

        let Some(sample) = sample else {
            return SessionTarget {
                position: cursor_at(source.positions(), session.start),
                element: None,
                caret_bounds: None,
                app_bundle_id: None,
            };
        };

        let element = sample.element.clone().map(top_left_element);
        let caret_bounds = sample.caret_bounds.map(NormalizedRect::to_top_left);

        let clicked = element.as_ref().and_then(|element| {
            self.last_click_on(source.clicks(), &element.frame, session.start)
        });

        let position = clicked
            .or_else(|| caret_bounds.map(|c| c.center()))
            .or_else(|| element.as_ref().map(|e| e.frame.center()))
            .unwrap_or_else(|| cursor_at(source.positions(), session.start));

        SessionTarget {
            position,
            element,
            caret_bounds,
            app_bundle_id: sample.app_bundle_id.clone(),
        }
    }

    /// Position of the latest click before `before` that landed on `frame`
    fn last_click_on(
        &self,
        clicks: &[ClickEventData],
        frame: &NormalizedRect,
        before: f64,
    ) -> Option<NormalizedPoint> {
        clicks
            .iter()
            .filter(|c| c.time <= before && self.is_activity_click(c))
            .filter(|c| {
                let on_frame = c.element.as_ref().is_some_and(|e| {
                    e.frame
                        .to_top_left()
                        .approx_eq(frame, self.settings.element_match_tolerance)
                });
                on_frame || frame.contains(&c.position.to_top_left())
            })
            .max_by(|a, b| a.time.total_cmp(&b.time))
            .map(|c| c.position.to_top_left())
    }
}

fn top_left_element(mut element: UiElementInfo) -> UiElementInfo {
    element.frame = element.frame.to_top_left();
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::source::Recording;
    use crate::capture::input::types::{DragEventData, ModifierFlags, MousePositionData, UiStateSample};

    fn collector() -> ActivityCollector {
        ActivityCollector::new(ActivitySettings::default())
    }

    fn keys(times: &[f64]) -> Vec<KeyboardEventData> {
        times.iter().map(|&t| KeyboardEventData::key_down(t, "a")).collect()
    }

    #[test]
    fn test_sessions_split_on_gap() {
        let sessions = collector().detect_typing_sessions(&keys(&[0.0, 0.5, 1.0, 3.0, 3.2]));
        assert_eq!(sessions.len(), 2);
        assert_eq!((sessions[0].start, sessions[0].end), (0.0, 1.0));
        assert_eq!(sessions[0].key_count, 3);
        assert_eq!((sessions[1].start, sessions[1].end), (3.0, 3.2));
    }

    #[test]
    fn test_shortcuts_do_not_start_sessions() {
        let mut events = keys(&[0.0, 0.2]);
        events[1].modifiers = ModifierFlags {
            command: true,
            ..Default::default()
        };
        let mut shifted = KeyboardEventData::key_down(0.4, "A");
        shifted.modifiers.shift = true;
        events.push(shifted);

        let sessions = collector().detect_typing_sessions(&events);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].key_count, 2, "shift alone is still typing");
    }

    #[test]
    fn test_short_session_emits_start_only() {
        let mut recording = Recording::new(5.0, 30.0);
        recording.keyboard_events = keys(&[1.0, 1.2]);
        let events = collector().collect(&recording);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ActivityKind::TypingStart);

        recording.keyboard_events = keys(&[1.0, 1.4, 1.8]);
        let events = collector().collect(&recording);
        let kinds: Vec<ActivityKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ActivityKind::TypingStart, ActivityKind::TypingEnd]);
        assert_eq!(events[1].time, 1.8);
    }

    #[test]
    fn test_typing_position_sticks_to_clicked_element() {
        let field = NormalizedRect::new(0.2, 0.3, 0.4, 0.05);
        let mut recording = Recording::new(5.0, 30.0);

        let mut click = ClickEventData::new(1.0, 0.25, 0.32, ClickType::LeftDown);
        click.element = Some(UiElementInfo::new("AXTextField", field));
        recording.clicks = vec![click];

        let mut sample = UiStateSample::new(1.6);
        sample.element = Some(UiElementInfo::new("AXTextField", field));
        sample.caret_bounds = Some(NormalizedRect::new(0.55, 0.31, 0.002, 0.03));
        recording.ui_samples = vec![sample];
        recording.keyboard_events = keys(&[1.5, 1.8, 2.2]);

        let events = collector().collect(&recording);
        let start = events
            .iter()
            .find(|e| e.kind == ActivityKind::TypingStart)
            .unwrap();
        assert_eq!(start.position, NormalizedPoint::new(0.25, 0.32));
        assert_eq!(start.element.as_ref().map(|e| e.role.as_str()), Some("AXTextField"));
        assert!(start.caret_bounds.is_some());
    }

    #[test]
    fn test_typing_position_uses_caret_without_click() {
        let mut recording = Recording::new(5.0, 30.0);
        let mut sample = UiStateSample::new(1.0);
        sample.element = Some(UiElementInfo::new(
            "AXTextArea",
            NormalizedRect::new(0.1, 0.1, 0.8, 0.8),
        ));
        sample.caret_bounds = Some(NormalizedRect::new(0.5, 0.5, 0.0, 0.02));
        recording.ui_samples = vec![sample];
        recording.keyboard_events = keys(&[1.2, 1.5, 2.0]);

        let events = collector().collect(&recording);
        let start = &events[0];
        assert!((start.position.x - 0.5).abs() < 1e-9);
        assert!((start.position.y - 0.51).abs() < 1e-9);
    }

    #[test]
    fn test_typing_falls_back_to_cursor() {
        let mut recording = Recording::new(5.0, 30.0);
        recording.positions = vec![
            MousePositionData::new(0.0, 0.1, 0.1),
            MousePositionData::new(2.0, 0.7, 0.6),
            MousePositionData::new(4.0, 0.9, 0.9),
        ];
        recording.keyboard_events = keys(&[2.5, 3.0]);

        let events = collector().collect(&recording);
        assert_eq!(events[0].position, NormalizedPoint::new(0.7, 0.6));
        assert!(events[0].element.is_none());
    }

    #[test]
    fn test_merge_is_time_ordered_and_filters_clicks() {
        let mut recording = Recording::new(5.0, 30.0);
        recording.clicks = vec![
            ClickEventData::new(2.0, 0.5, 0.5, ClickType::LeftDown),
            ClickEventData::new(2.1, 0.5, 0.5, ClickType::LeftUp),
            ClickEventData::new(0.5, 0.2, 0.2, ClickType::RightDown),
            ClickEventData::new(3.0, 0.5, 0.5, ClickType::DoubleClick),
        ];
        recording.drag_events = vec![
            DragEventData::new(1.0, 0.1, 0.1, DragPhase::Start),
            DragEventData::new(1.5, 0.4, 0.4, DragPhase::End),
        ];

        let events = collector().collect(&recording);
        let kinds: Vec<ActivityKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ActivityKind::DragStart, ActivityKind::DragEnd, ActivityKind::Click]
        );

        let with_double = ActivityCollector::new(ActivitySettings {
            include_double_clicks: true,
            ..Default::default()
        })
        .collect(&recording);
        assert_eq!(with_double.len(), 4);
    }
}
