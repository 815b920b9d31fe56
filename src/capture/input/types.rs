use crate::geometry::{NormalizedPoint, NormalizedRect};
use serde::{Deserialize, Serialize};

/// Cursor position sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MousePositionData {
    /// Seconds from recording start
    pub time: f64,
    pub position: NormalizedPoint,
}

impl MousePositionData {
    pub fn new(time: f64, x: f64, y: f64) -> Self {
        Self {
            time,
            position: NormalizedPoint::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClickType {
    LeftDown,
    LeftUp,
    RightDown,
    RightUp,
    DoubleClick,
}

/// Accessibility description of a UI element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiElementInfo {
    /// Accessibility role, e.g. `AXTextField`
    pub role: String,
    pub frame: NormalizedRect,
    #[serde(default)]
    pub title: Option<String>,
}

impl UiElementInfo {
    pub fn new(role: impl Into<String>, frame: NormalizedRect) -> Self {
        Self {
            role: role.into(),
            frame,
            title: None,
        }
    }

    /// Whether the element accepts text input
    pub fn is_text_input(&self) -> bool {
        matches!(
            self.role.as_str(),
            "AXTextField" | "AXTextArea" | "AXComboBox" | "AXSearchField" | "AXWebArea"
        )
    }

    /// Whether clicking the element usually moves the user somewhere else
    pub fn is_navigation(&self) -> bool {
        matches!(
            self.role.as_str(),
            "AXLink" | "AXMenuItem" | "AXMenuBarItem" | "AXTab" | "AXTabGroup" | "AXPopUpButton"
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEventData {
    pub time: f64,
    pub position: NormalizedPoint,
    pub click_type: ClickType,
    #[serde(default)]
    pub app_bundle_id: Option<String>,
    #[serde(default)]
    pub element: Option<UiElementInfo>,
}

impl ClickEventData {
    pub fn new(time: f64, x: f64, y: f64, click_type: ClickType) -> Self {
        Self {
            time,
            position: NormalizedPoint::new(x, y),
            click_type,
            app_bundle_id: None,
            element: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierFlags {
    #[serde(default)]
    pub command: bool,
    #[serde(default)]
    pub control: bool,
    #[serde(default)]
    pub option: bool,
    #[serde(default)]
    pub shift: bool,
}

impl ModifierFlags {
    /// Command or control held; shift alone only changes case
    pub fn is_shortcut(&self) -> bool {
        self.command || self.control
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyEventType {
    KeyDown,
    KeyUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardEventData {
    pub time: f64,
    pub key_code: u16,
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub modifiers: ModifierFlags,
    pub event_type: KeyEventType,
    #[serde(default)]
    pub app_bundle_id: Option<String>,
}

impl KeyboardEventData {
    pub fn key_down(time: f64, characters: &str) -> Self {
        Self {
            time,
            key_code: 0,
            characters: Some(characters.to_string()),
            modifiers: ModifierFlags::default(),
            event_type: KeyEventType::KeyDown,
            app_bundle_id: None,
        }
    }

    pub fn is_key_down(&self) -> bool {
        self.event_type == KeyEventType::KeyDown
    }

    pub fn is_shortcut(&self) -> bool {
        self.modifiers.is_shortcut()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragPhase {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEventData {
    pub time: f64,
    pub position: NormalizedPoint,
    pub phase: DragPhase,
    #[serde(default)]
    pub element: Option<UiElementInfo>,
}

impl DragEventData {
    pub fn new(time: f64, x: f64, y: f64, phase: DragPhase) -> Self {
        Self {
            time,
            position: NormalizedPoint::new(x, y),
            phase,
            element: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollEventData {
    pub time: f64,
    pub position: NormalizedPoint,
    pub delta_x: f64,
    pub delta_y: f64,
}

/// Structural UI change observed alongside an accessibility sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum UiChange {
    /// Content expanded after a click (dropdown, disclosure, popover)
    ContextChange { expansion_ratio: f64 },
    ModalOpened,
    FocusChanged,
}

/// Accessibility snapshot of the focused element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiStateSample {
    pub time: f64,
    #[serde(default)]
    pub app_bundle_id: Option<String>,
    #[serde(default)]
    pub element: Option<UiElementInfo>,
    #[serde(default)]
    pub caret_bounds: Option<NormalizedRect>,
    #[serde(default)]
    pub change: Option<UiChange>,
}

impl UiStateSample {
    pub fn new(time: f64) -> Self {
        Self {
            time,
            app_bundle_id: None,
            element: None,
            caret_bounds: None,
            change: None,
        }
    }

    /// Best point of interest: caret first, then the element center
    pub fn focus_point(&self) -> Option<NormalizedPoint> {
        self.caret_bounds
            .map(|caret| caret.center())
            .or_else(|| self.element.as_ref().map(|e| e.frame.center()))
    }
}
