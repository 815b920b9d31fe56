//! Input telemetry (mouse, keyboard, drags, scrolls, accessibility samples)
//!
//! [`source::MouseDataSource`] is how every planning stage reads a
//! recording; [`source::Recording`] is the owned JSON form.

pub mod source;
pub mod types;

pub use source::{InputStatistics, MouseDataSource, Recording};
pub use types::{
    ClickEventData, ClickType, DragEventData, DragPhase, KeyEventType, KeyboardEventData,
    ModifierFlags, MousePositionData, ScrollEventData, UiChange, UiElementInfo, UiStateSample,
};
