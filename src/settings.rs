//! Tunables for every planning stage
//!
//! Each stage takes its own settings group by reference. All groups
//! deserialize with defaults filled in, so a project file only needs to
//! carry the values a user changed.

use crate::camera::transform::InterpolationMode;
use crate::error::{ProcessingError, ProcessingResult};
use crate::intent::types::{TypingContext, UserIntent};
use crate::processing::easing::EasingCurve;
use serde::{Deserialize, Serialize};

/// Stepped spring used to follow the cursor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 470.0,
            damping: 70.0,
            mass: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignalCleanerSettings {
    pub jitter_removal_enabled: bool,
    /// Moving-average window; even values are widened by one
    pub jitter_window_size: usize,

    pub idle_compression_enabled: bool,
    /// Normalized units per second
    pub idle_velocity_threshold: f64,
    pub idle_min_duration: f64,

    pub simplification_enabled: bool,
    /// Douglas-Peucker tolerance in normalized units
    pub epsilon: f64,

    pub resampling_enabled: bool,
    /// Interval used for fast motion
    pub min_interval: f64,
    /// Interval used for slow motion
    pub max_interval: f64,
    /// Speed treated as "fast" when normalizing velocity
    pub reference_velocity: f64,
}

impl Default for SignalCleanerSettings {
    fn default() -> Self {
        Self {
            jitter_removal_enabled: true,
            jitter_window_size: 5,
            idle_compression_enabled: true,
            idle_velocity_threshold: 0.02,
            idle_min_duration: 0.5,
            simplification_enabled: true,
            epsilon: 0.002,
            resampling_enabled: true,
            min_interval: 1.0 / 60.0,
            max_interval: 0.25,
            reference_velocity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplineSettings {
    /// 0 is a plain Catmull-Rom; higher values tighten the curve toward the chords
    pub tension: f64,
    pub output_frame_rate: f64,
    /// Weight of the spring-follow path blended into the spline (0 = spline only)
    pub spring_blend: f64,
    pub spring: SpringConfig,
    /// Jumps larger than this reset the follow spring
    pub teleport_threshold: f64,
}

impl Default for SplineSettings {
    fn default() -> Self {
        Self {
            tension: 0.2,
            output_frame_rate: 60.0,
            spring_blend: 0.0,
            spring: SpringConfig::default(),
            teleport_threshold: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivitySettings {
    /// Maximum gap between keystrokes of one typing session
    pub typing_session_gap: f64,
    /// Sessions shorter than this only emit a start marker
    pub min_typing_session_duration: f64,
    /// How far from session start an accessibility sample may be
    pub ui_sample_tolerance: f64,
    /// Treat double clicks as activity alongside left-down clicks
    pub include_double_clicks: bool,
    /// Tolerance when comparing element frames
    pub element_match_tolerance: f64,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            typing_session_gap: 1.5,
            min_typing_session_duration: 0.5,
            ui_sample_tolerance: 0.5,
            include_double_clicks: false,
            element_match_tolerance: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentSettings {
    pub click_group_gap: f64,
    /// Span opens this long before the first click of a group
    pub click_lead: f64,
    /// Span stays open this long after the last click of a group
    pub click_hold: f64,
    /// Click groups spreading wider than this count as navigation
    pub navigation_spread: f64,
    pub drag_tail: f64,
    pub scroll_group_gap: f64,
    pub scroll_hold: f64,
    pub switch_duration: f64,
    /// Length of a typing span that only has a start marker
    pub typing_min_duration: f64,
    /// Cursor travel below this in a gap means idle rather than reading
    pub idle_motion_threshold: f64,
}

impl Default for IntentSettings {
    fn default() -> Self {
        Self {
            click_group_gap: 1.0,
            click_lead: 0.2,
            click_hold: 0.8,
            navigation_spread: 0.3,
            drag_tail: 0.3,
            scroll_group_gap: 0.5,
            scroll_hold: 0.3,
            switch_duration: 0.4,
            typing_min_duration: 0.5,
            idle_motion_threshold: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

impl BoxSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmentationSettings {
    pub min_scene_duration: f64,
    /// Roughly one line of text
    pub typing_box: BoxSize,
    pub click_box: BoxSize,
    pub navigation_box: BoxSize,
    pub drag_box: BoxSize,
    pub scroll_box: BoxSize,
    pub reading_box: BoxSize,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            min_scene_duration: 0.3,
            typing_box: BoxSize::new(0.3, 0.06),
            click_box: BoxSize::new(0.12, 0.12),
            navigation_box: BoxSize::new(0.2, 0.2),
            drag_box: BoxSize::new(0.25, 0.25),
            scroll_box: BoxSize::new(0.4, 0.5),
            reading_box: BoxSize::new(0.5, 0.4),
        }
    }
}

/// Inclusive zoom interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max.max(self.min))
    }

    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.min - 1e-9 && zoom <= self.max + 1e-9
    }
}

/// Zoom interval per intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoomRanges {
    pub code_editor: ZoomRange,
    pub terminal: ZoomRange,
    pub text_field: ZoomRange,
    pub rich_text: ZoomRange,
    pub clicking: ZoomRange,
    pub navigating: ZoomRange,
    pub dragging: ZoomRange,
    pub scrolling: ZoomRange,
    pub reading: ZoomRange,
    pub switching: ZoomRange,
    /// Idle scenes only ever hold a decayed, inherited zoom
    pub idle: ZoomRange,
}

impl Default for ZoomRanges {
    fn default() -> Self {
        Self {
            code_editor: ZoomRange::new(2.0, 2.8),
            terminal: ZoomRange::new(1.6, 2.2),
            text_field: ZoomRange::new(1.8, 2.5),
            rich_text: ZoomRange::new(1.6, 2.4),
            clicking: ZoomRange::new(1.5, 2.5),
            navigating: ZoomRange::new(1.3, 1.8),
            dragging: ZoomRange::new(1.3, 2.0),
            scrolling: ZoomRange::new(1.2, 1.6),
            reading: ZoomRange::new(1.2, 1.5),
            switching: ZoomRange::new(1.0, 1.0),
            idle: ZoomRange::new(1.0, 2.0),
        }
    }
}

impl ZoomRanges {
    pub fn for_intent(&self, intent: &UserIntent) -> ZoomRange {
        match intent {
            UserIntent::Typing(TypingContext::CodeEditor) => self.code_editor,
            UserIntent::Typing(TypingContext::Terminal) => self.terminal,
            UserIntent::Typing(TypingContext::TextField) => self.text_field,
            UserIntent::Typing(TypingContext::RichText) => self.rich_text,
            UserIntent::Clicking => self.clicking,
            UserIntent::Navigating => self.navigating,
            UserIntent::Dragging(_) => self.dragging,
            UserIntent::Scrolling => self.scrolling,
            UserIntent::Reading => self.reading,
            UserIntent::Switching => self.switching,
            UserIntent::Idle => self.idle,
        }
    }

    fn all(&self) -> [(&'static str, ZoomRange); 11] {
        [
            ("codeEditor", self.code_editor),
            ("terminal", self.terminal),
            ("textField", self.text_field),
            ("richText", self.rich_text),
            ("clicking", self.clicking),
            ("navigating", self.navigating),
            ("dragging", self.dragging),
            ("scrolling", self.scrolling),
            ("reading", self.reading),
            ("switching", self.switching),
            ("idle", self.idle),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShotSettings {
    pub zoom_ranges: ZoomRanges,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Fraction of the viewport an active element should fill
    pub target_area_coverage: f64,
    pub element_padding: f64,
    pub bounding_box_padding: f64,
    /// Weight of the saliency center when no element is known
    pub saliency_weight: f64,
    /// Fraction of the source's extra zoom an idle scene keeps
    pub idle_zoom_decay: f64,
    /// Leading idle scenes stay at zoom 1.0 instead of inheriting backward
    pub establishing_shot: bool,
    /// Lowest factor a context expansion may scale zoom by
    pub max_context_reduction: f64,
    /// How far outside a scene to look for an accessibility frame
    pub ui_element_search_window: f64,
}

impl Default for ShotSettings {
    fn default() -> Self {
        Self {
            zoom_ranges: ZoomRanges::default(),
            min_zoom: 1.0,
            max_zoom: 2.8,
            target_area_coverage: 0.35,
            element_padding: 0.02,
            bounding_box_padding: 0.05,
            saliency_weight: 0.3,
            idle_zoom_decay: 0.7,
            establishing_shot: true,
            max_context_reduction: 0.5,
            ui_element_search_window: 1.0,
        }
    }
}

/// Inclusive duration interval in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationRange {
    pub min: f64,
    pub max: f64,
}

impl DurationRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitionSettings {
    pub short_pan_max_distance: f64,
    pub medium_pan_max_distance: f64,
    pub short_pan_duration: DurationRange,
    pub medium_pan_duration: DurationRange,
    pub zoom_out_duration: f64,
    pub zoom_in_duration: f64,
    pub pan_easing: EasingCurve,
    pub zoom_out_easing: EasingCurve,
    pub zoom_in_easing: EasingCurve,
    /// Widest zoom reached while passing between distant shots
    pub zoom_out_level: f64,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            short_pan_max_distance: 0.15,
            medium_pan_max_distance: 0.4,
            short_pan_duration: DurationRange::new(0.3, 0.5),
            medium_pan_duration: DurationRange::new(0.5, 0.8),
            zoom_out_duration: 0.4,
            zoom_in_duration: 0.5,
            pan_easing: EasingCurve::Spring {
                damping_ratio: 1.0,
                response: 0.5,
            },
            zoom_out_easing: EasingCurve::EaseInOut,
            zoom_in_easing: EasingCurve::Spring {
                damping_ratio: 0.9,
                response: 0.45,
            },
            zoom_out_level: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationSettings {
    pub output_frame_rate: f64,
    pub interpolation_mode: InterpolationMode,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            output_frame_rate: 60.0,
            interpolation_mode: InterpolationMode::Screen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CursorSettings {
    pub hide_while_typing: bool,
    pub hide_while_idle: bool,
    pub scale: f64,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            hide_while_typing: true,
            hide_while_idle: false,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeystrokeSettings {
    pub enabled: bool,
    pub display_duration: f64,
    /// Only show key combinations, not plain typing
    pub shortcuts_only: bool,
}

impl Default for KeystrokeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            display_duration: 1.0,
            shortcuts_only: true,
        }
    }
}

/// Every tunable of the planning pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmartZoomSettings {
    pub cleaner: SignalCleanerSettings,
    pub spline: SplineSettings,
    pub activity: ActivitySettings,
    pub intent: IntentSettings,
    pub segmentation: SegmentationSettings,
    pub shot: ShotSettings,
    pub transition: TransitionSettings,
    pub simulation: SimulationSettings,
    pub cursor: CursorSettings,
    pub keystroke: KeystrokeSettings,
}

impl SmartZoomSettings {
    /// Check user-supplied settings before running the pipeline
    ///
    /// The pipeline clamps on its own; this only rejects values that make
    /// the output meaningless.
    pub fn validate(&self) -> ProcessingResult<()> {
        let cleaner = &self.cleaner;
        require(cleaner.jitter_window_size >= 1, "cleaner.jitterWindowSize must be at least 1")?;
        require_positive(cleaner.min_interval, "cleaner.minInterval")?;
        require_positive(cleaner.max_interval, "cleaner.maxInterval")?;
        require(
            cleaner.min_interval <= cleaner.max_interval,
            "cleaner.minInterval must not exceed cleaner.maxInterval",
        )?;
        require_positive(cleaner.reference_velocity, "cleaner.referenceVelocity")?;
        require_non_negative(cleaner.epsilon, "cleaner.epsilon")?;
        require_non_negative(cleaner.idle_min_duration, "cleaner.idleMinDuration")?;

        require_positive(self.spline.output_frame_rate, "spline.outputFrameRate")?;
        require(
            (0.0..=1.0).contains(&self.spline.spring_blend),
            "spline.springBlend must be within [0, 1]",
        )?;
        require_positive(self.spline.spring.mass, "spline.spring.mass")?;

        require_positive(self.activity.typing_session_gap, "activity.typingSessionGap")?;
        require_non_negative(self.segmentation.min_scene_duration, "segmentation.minSceneDuration")?;

        let shot = &self.shot;
        require(shot.min_zoom >= 1.0, "shot.minZoom must be at least 1.0")?;
        require(shot.min_zoom <= shot.max_zoom, "shot.minZoom must not exceed shot.maxZoom")?;
        for (name, range) in shot.zoom_ranges.all() {
            require(
                range.min.is_finite() && range.max.is_finite() && range.min >= 1.0 && range.min <= range.max,
                &format!("shot.zoomRanges.{} must satisfy 1.0 <= min <= max", name),
            )?;
        }
        require(
            shot.target_area_coverage > 0.0 && shot.target_area_coverage <= 1.0,
            "shot.targetAreaCoverage must be within (0, 1]",
        )?;
        require(
            (0.0..=1.0).contains(&shot.idle_zoom_decay),
            "shot.idleZoomDecay must be within [0, 1]",
        )?;

        let transition = &self.transition;
        require(
            transition.short_pan_max_distance <= transition.medium_pan_max_distance,
            "transition.shortPanMaxDistance must not exceed transition.mediumPanMaxDistance",
        )?;
        for (name, range) in [
            ("shortPanDuration", transition.short_pan_duration),
            ("mediumPanDuration", transition.medium_pan_duration),
        ] {
            require(
                range.min >= 0.0 && range.min <= range.max,
                &format!("transition.{} must satisfy 0 <= min <= max", name),
            )?;
        }
        require_non_negative(transition.zoom_out_duration, "transition.zoomOutDuration")?;
        require_non_negative(transition.zoom_in_duration, "transition.zoomInDuration")?;

        require_positive(self.simulation.output_frame_rate, "simulation.outputFrameRate")?;
        require_non_negative(self.keystroke.display_duration, "keystroke.displayDuration")?;
        Ok(())
    }
}

fn require(condition: bool, message: &str) -> ProcessingResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ProcessingError::InvalidSettings(message.to_string()))
    }
}

fn require_positive(value: f64, name: &str) -> ProcessingResult<()> {
    require(value.is_finite() && value > 0.0, &format!("{} must be positive", name))
}

fn require_non_negative(value: f64, name: &str) -> ProcessingResult<()> {
    require(value.is_finite() && value >= 0.0, &format!("{} must not be negative", name))
}
