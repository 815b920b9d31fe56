//! Intent vocabulary shared by classification, segmentation and shot planning

use crate::capture::input::types::UiElementInfo;
use crate::geometry::{NormalizedPoint, NormalizedRect, EPSILON};
use serde::{Deserialize, Serialize};

/// Half-open time range `[start, end)` in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.duration() < EPSILON
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Like [`contains`](Self::contains) but also accepts the end instant
    pub fn contains_inclusive(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn intersection(&self, other: &TimeRange) -> Option<TimeRange> {
        let range = TimeRange::new(self.start.max(other.start), self.end.min(other.end));
        (!range.is_empty()).then_some(range)
    }

    /// Parts of `self` not covered by `other`, in time order
    pub fn subtract(&self, other: &TimeRange) -> Vec<TimeRange> {
        if !self.overlaps(other) {
            return vec![*self];
        }
        [
            TimeRange::new(self.start, other.start),
            TimeRange::new(other.end, self.end),
        ]
        .into_iter()
        .filter(|r| !r.is_empty())
        .collect()
    }

    /// Seconds between `time` and the nearest point of the range, 0 inside it
    pub fn distance_to(&self, time: f64) -> f64 {
        if time < self.start {
            self.start - time
        } else if time > self.end {
            time - self.end
        } else {
            0.0
        }
    }
}

/// What kind of text surface the user is typing into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypingContext {
    CodeEditor,
    Terminal,
    TextField,
    RichText,
}

impl TypingContext {
    /// Infer the surface from the frontmost app and the focused element role
    pub fn infer(app_bundle_id: Option<&str>, element: Option<&UiElementInfo>) -> Self {
        if let Some(bundle) = app_bundle_id.map(str::to_ascii_lowercase) {
            const CODE_EDITORS: [&str; 7] = [
                "com.microsoft.vscode",
                "com.apple.dt.xcode",
                "com.jetbrains",
                "com.sublimetext",
                "dev.zed.zed",
                "com.todesktop.230313mzl4w4u92",
                "com.panic.nova",
            ];
            const TERMINALS: [&str; 5] = [
                "com.apple.terminal",
                "com.googlecode.iterm2",
                "dev.warp.warp",
                "net.kovidgoyal.kitty",
                "com.mitchellh.ghostty",
            ];
            const RICH_TEXT: [&str; 5] = [
                "com.apple.iwork.pages",
                "notion.id",
                "com.microsoft.word",
                "com.apple.textedit",
                "md.obsidian",
            ];

            if CODE_EDITORS.iter().any(|id| bundle.starts_with(id)) {
                return TypingContext::CodeEditor;
            }
            if TERMINALS.iter().any(|id| bundle.starts_with(id)) {
                return TypingContext::Terminal;
            }
            if RICH_TEXT.iter().any(|id| bundle.starts_with(id)) {
                return TypingContext::RichText;
            }
        }

        match element.map(|e| e.role.as_str()) {
            Some("AXTextArea") | Some("AXWebArea") => TypingContext::RichText,
            _ => TypingContext::TextField,
        }
    }
}

/// What the user is dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragContext {
    TextSelection,
    WindowMove,
    ObjectMove,
}

impl DragContext {
    pub fn infer(element: Option<&UiElementInfo>) -> Self {
        match element {
            Some(e) if e.is_text_input() || e.role == "AXStaticText" => DragContext::TextSelection,
            Some(e) if matches!(e.role.as_str(), "AXWindow" | "AXTitleBar" | "AXToolbar") => {
                DragContext::WindowMove
            }
            _ => DragContext::ObjectMove,
        }
    }
}

/// Classified user activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "context")]
pub enum UserIntent {
    Typing(TypingContext),
    Clicking,
    Navigating,
    Dragging(DragContext),
    Scrolling,
    Reading,
    Switching,
    Idle,
}

impl UserIntent {
    /// Grouping key for scene segmentation
    ///
    /// Typing keeps its sub-context; every other intent groups by top-level case.
    pub fn category(&self) -> IntentCategory {
        match self {
            UserIntent::Typing(context) => IntentCategory::Typing(*context),
            UserIntent::Clicking => IntentCategory::Clicking,
            UserIntent::Navigating => IntentCategory::Navigating,
            UserIntent::Dragging(_) => IntentCategory::Dragging,
            UserIntent::Scrolling => IntentCategory::Scrolling,
            UserIntent::Reading => IntentCategory::Reading,
            UserIntent::Switching => IntentCategory::Switching,
            UserIntent::Idle => IntentCategory::Idle,
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(self, UserIntent::Typing(_))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, UserIntent::Idle)
    }

    pub fn is_switching(&self) -> bool {
        matches!(self, UserIntent::Switching)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "context")]
pub enum IntentCategory {
    Typing(TypingContext),
    Clicking,
    Navigating,
    Dragging,
    Scrolling,
    Reading,
    Switching,
    Idle,
}

/// Time range labelled with one classified intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentSpan {
    pub range: TimeRange,
    pub intent: UserIntent,
    /// Classifier confidence in [0,1]
    pub confidence: f64,
    /// Where the activity happened, top-left space
    pub focus: Option<NormalizedPoint>,
    pub element: Option<UiElementInfo>,
    pub app_bundle_id: Option<String>,
}

impl IntentSpan {
    pub fn new(range: TimeRange, intent: UserIntent, confidence: f64) -> Self {
        Self {
            range,
            intent,
            confidence,
            focus: None,
            element: None,
            app_bundle_id: None,
        }
    }

    pub fn with_focus(mut self, focus: NormalizedPoint) -> Self {
        self.focus = Some(focus.to_top_left());
        self
    }

    pub fn with_element(mut self, element: Option<UiElementInfo>) -> Self {
        self.element = element;
        self
    }

    pub fn with_app(mut self, app_bundle_id: Option<String>) -> Self {
        self.app_bundle_id = app_bundle_id;
        self
    }

    pub fn duration(&self) -> f64 {
        self.range.duration()
    }
}

/// Where a focus region came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusSource {
    CursorPosition,
    ActiveElement,
    Caret,
    ClickTarget,
    Saliency,
}

/// Candidate area of interest inside a scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusRegion {
    pub time: f64,
    pub rect: NormalizedRect,
    pub confidence: f64,
    pub source: FocusSource,
}
