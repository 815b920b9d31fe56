//! Generators that turn a finished plan into editable segment tracks

use crate::camera::shot_planner::ShotPlan;
use crate::camera::simulator::CameraPathSimulator;
use crate::camera::transition_planner::TransitionPlan;
use crate::capture::input::source::MouseDataSource;
use crate::capture::input::types::KeyboardEventData;
use crate::geometry::EPSILON;
use crate::intent::segmenter::CameraScene;
use crate::settings::SmartZoomSettings;
use crate::tracks::segments::{CameraTrack, CursorSegment, CursorTrack, KeystrokeSegment, KeystrokeTrack};

/// Everything a generator may read
pub struct GenerationContext<'a> {
    pub source: &'a dyn MouseDataSource,
    pub scenes: &'a [CameraScene],
    pub shots: &'a [ShotPlan],
    pub transitions: &'a [TransitionPlan],
    pub settings: &'a SmartZoomSettings,
}

impl GenerationContext<'_> {
    fn duration(&self) -> f64 {
        self.source.duration().max(0.0)
    }
}

/// Produces one track from the planning results
pub trait KeyframeGenerator {
    type Output;

    fn name(&self) -> &'static str;

    fn generate(&self, ctx: &GenerationContext<'_>) -> Self::Output;
}

pub struct CameraGenerator;

impl KeyframeGenerator for CameraGenerator {
    type Output = CameraTrack;

    fn name(&self) -> &'static str {
        "camera"
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> CameraTrack {
        let simulator = CameraPathSimulator::new(
            ctx.settings.simulation.clone(),
            ctx.settings.transition.zoom_out_level,
        );
        CameraTrack::new(simulator.build_segments(ctx.scenes, ctx.shots, ctx.transitions))
    }
}

/// Cursor visibility per scene
pub struct CursorGenerator;

impl KeyframeGenerator for CursorGenerator {
    type Output = CursorTrack;

    fn name(&self) -> &'static str {
        "cursor"
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> CursorTrack {
        let settings = &ctx.settings.cursor;
        let duration = ctx.duration();

        if ctx.scenes.is_empty() {
            if duration <= EPSILON {
                return CursorTrack::default();
            }
            return CursorTrack::new(vec![CursorSegment::new(0.0, duration, true, settings.scale)]);
        }

        let mut segments: Vec<CursorSegment> = Vec::with_capacity(ctx.scenes.len());
        for scene in ctx.scenes {
            let hidden = (settings.hide_while_typing && scene.intent.is_typing())
                || (settings.hide_while_idle && scene.intent.is_idle());
            let visible = !hidden;

            let continues = |last: &&mut CursorSegment| {
                last.visible == visible && (last.end_time - scene.range.start).abs() < EPSILON
            };
            if let Some(last) = segments.last_mut().filter(continues) {
                last.end_time = scene.range.end;
                continue;
            }
            segments.push(CursorSegment::new(scene.range.start, scene.range.end, visible, settings.scale));
        }

        tracing::debug!("Generated {} cursor segments", segments.len());
        CursorTrack::new(segments)
    }
}

/// On-screen labels for key presses
pub struct KeystrokeGenerator;

impl KeyframeGenerator for KeystrokeGenerator {
    type Output = KeystrokeTrack;

    fn name(&self) -> &'static str {
        "keystroke"
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> KeystrokeTrack {
        let settings = &ctx.settings.keystroke;
        if !settings.enabled {
            return KeystrokeTrack::default();
        }

        let duration = ctx.duration();
        let presses: Vec<(f64, String)> = ctx
            .source
            .keyboard_events()
            .iter()
            .filter(|k| k.is_key_down())
            .filter(|k| !settings.shortcuts_only || k.is_shortcut())
            .filter(|k| k.time >= 0.0 && k.time < duration)
            .filter_map(|k| key_label(k).map(|label| (k.time, label)))
            .collect();

        let segments: Vec<KeystrokeSegment> = presses
            .iter()
            .enumerate()
            .map(|(i, (start, label))| {
                let next = presses.get(i + 1).map_or(f64::INFINITY, |(t, _)| *t);
                let end = (start + settings.display_duration).min(next).min(duration);
                KeystrokeSegment::new(*start, end, label.clone())
            })
            .collect();

        tracing::debug!("Generated {} keystroke labels", segments.len());
        KeystrokeTrack::new(segments)
    }
}

/// Display label such as "⌘⇧S", modifiers first
///
/// Returns `None` for keys with nothing printable to show.
pub fn key_label(event: &KeyboardEventData) -> Option<String> {
    let key = special_key(event.key_code)
        .map(str::to_string)
        .or_else(|| {
            event
                .characters
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_uppercase)
        })?;

    let m = &event.modifiers;
    let mut label = String::new();
    for (held, symbol) in [(m.command, '⌘'), (m.control, '⌃'), (m.option, '⌥'), (m.shift, '⇧')] {
        if held {
            label.push(symbol);
        }
    }
    label.push_str(&key);
    Some(label)
}

/// macOS virtual key codes without a printable character
fn special_key(key_code: u16) -> Option<&'static str> {
    match key_code {
        36 => Some("↩"),
        48 => Some("⇥"),
        49 => Some("Space"),
        51 => Some("⌫"),
        53 => Some("⎋"),
        _ => None,
    }
}
