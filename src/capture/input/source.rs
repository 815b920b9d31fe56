//! Recorded input as seen by the planning pipeline

use crate::capture::input::types::{
    ClickEventData, DragEventData, KeyboardEventData, MousePositionData, ScrollEventData,
    UiStateSample,
};
use crate::error::{ProcessingError, ProcessingResult};
use serde::{Deserialize, Serialize};

/// Read-only access to one recording's telemetry
///
/// Any of the arrays may be empty. Scroll events and accessibility samples
/// are optional collaborators and default to empty.
pub trait MouseDataSource {
    /// Recording length in seconds
    fn duration(&self) -> f64;

    /// Capture frame rate
    fn frame_rate(&self) -> f64;

    fn positions(&self) -> &[MousePositionData];

    fn clicks(&self) -> &[ClickEventData];

    fn keyboard_events(&self) -> &[KeyboardEventData];

    fn drag_events(&self) -> &[DragEventData];

    fn scroll_events(&self) -> &[ScrollEventData] {
        &[]
    }

    fn ui_samples(&self) -> &[UiStateSample] {
        &[]
    }

    /// Event counts, used for logging and plan diagnostics
    fn statistics(&self) -> InputStatistics {
        InputStatistics {
            duration: self.duration(),
            position_count: self.positions().len(),
            click_count: self.clicks().len(),
            keyboard_count: self.keyboard_events().len(),
            drag_count: self.drag_events().len(),
            scroll_count: self.scroll_events().len(),
            ui_sample_count: self.ui_samples().len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputStatistics {
    pub duration: f64,
    pub position_count: usize,
    pub click_count: usize,
    pub keyboard_count: usize,
    pub drag_count: usize,
    pub scroll_count: usize,
    pub ui_sample_count: usize,
}

/// Owned recording, as written next to the captured video
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub duration: f64,
    pub frame_rate: f64,
    #[serde(default)]
    pub positions: Vec<MousePositionData>,
    #[serde(default)]
    pub clicks: Vec<ClickEventData>,
    #[serde(default)]
    pub keyboard_events: Vec<KeyboardEventData>,
    #[serde(default)]
    pub drag_events: Vec<DragEventData>,
    #[serde(default)]
    pub scroll_events: Vec<ScrollEventData>,
    #[serde(default)]
    pub ui_samples: Vec<UiStateSample>,
}

impl Recording {
    pub fn new(duration: f64, frame_rate: f64) -> Self {
        Self {
            duration,
            frame_rate,
            ..Default::default()
        }
    }

    /// Reject recordings whose header cannot describe a timeline
    pub fn validate(&self) -> ProcessingResult<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ProcessingError::InvalidRecording(format!(
                "duration must be a non-negative number, got {}",
                self.duration
            )));
        }
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(ProcessingError::InvalidRecording(format!(
                "frame rate must be positive, got {}",
                self.frame_rate
            )));
        }
        Ok(())
    }
}

impl MouseDataSource for Recording {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn positions(&self) -> &[MousePositionData] {
        &self.positions
    }

    fn clicks(&self) -> &[ClickEventData] {
        &self.clicks
    }

    fn keyboard_events(&self) -> &[KeyboardEventData] {
        &self.keyboard_events
    }

    fn drag_events(&self) -> &[DragEventData] {
        &self.drag_events
    }

    fn scroll_events(&self) -> &[ScrollEventData] {
        &self.scroll_events
    }

    fn ui_samples(&self) -> &[UiStateSample] {
        &self.ui_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_default_method() {
        let mut recording = Recording::new(10.0, 60.0);
        recording.positions.push(MousePositionData::new(0.0, 0.5, 0.5));
        recording.positions.push(MousePositionData::new(0.1, 0.5, 0.5));

        let stats = recording.statistics();
        assert_eq!(stats.position_count, 2);
        assert_eq!(stats.click_count, 0);
        assert_eq!(stats.duration, 10.0);
    }

    #[test]
    fn test_validate_rejects_bad_header() {
        assert!(Recording::new(5.0, 30.0).validate().is_ok());
        assert!(Recording::new(-1.0, 30.0).validate().is_err());
        assert!(Recording::new(5.0, 0.0).validate().is_err());
        assert!(Recording::new(f64::NAN, 30.0).validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_recording() {
        let json = r#"{"duration": 3.0, "frameRate": 30.0,
            "positions": [{"time": 0.0, "position": {"x": 0.1, "y": 0.2}}]}"#;
        let recording: Recording = serde_json::from_str(json).unwrap();
        assert_eq!(recording.positions.len(), 1);
        assert!(recording.clicks.is_empty());
        assert!(recording.ui_samples().is_empty());
    }
}
