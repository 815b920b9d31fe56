//! File-level processing commands
//!
//! Read a recording from JSON, run the planner or the cursor smoothers, and
//! write results back as JSON.

use crate::capture::input::source::{MouseDataSource, Recording};
use crate::capture::input::types::MousePositionData;
use crate::error::ProcessingResult;
use crate::pipeline::{CameraPlan, SmartZoomPipeline};
use crate::processing::cursor_smoothing::{smooth_cursor_data, SmoothedPosition};
use crate::processing::signal_cleaner::clean;
use crate::processing::spline::interpolate_with_spring;
use crate::settings::{SmartZoomSettings, SplineSettings};
use std::path::Path;

/// Read and validate a recording
pub fn load_recording(path: impl AsRef<Path>) -> ProcessingResult<Recording> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let recording: Recording = serde_json::from_str(&content)?;
    recording.validate()?;

    tracing::info!(
        "Loaded recording {} ({:.2}s, {} positions)",
        path.display(),
        recording.duration,
        recording.positions.len()
    );
    Ok(recording)
}

/// Plan the camera for a recording file
pub fn plan_camera(input_file: impl AsRef<Path>, settings: SmartZoomSettings) -> ProcessingResult<CameraPlan> {
    settings.validate()?;
    let recording = load_recording(input_file)?;
    Ok(SmartZoomPipeline::new(settings).run(&recording))
}

/// Plan the camera and write the plan next to the recording (for export)
pub fn process_camera_plan(
    input_file: impl AsRef<Path>,
    output_file: impl AsRef<Path>,
    settings: SmartZoomSettings,
) -> ProcessingResult<CameraPlan> {
    let output_file = output_file.as_ref();
    let plan = plan_camera(input_file, settings)?;

    let output = serde_json::to_vec_pretty(&plan)?;
    std::fs::write(output_file, output)?;

    tracing::info!(
        "Wrote camera plan with {} scenes and {} frames to {}",
        plan.scenes.len(),
        plan.samples.len(),
        output_file.display()
    );
    Ok(plan)
}

/// Cleaned cursor path, resynthesised with the spline and blended with the
/// follow spring
///
/// This is used for preview in the editor.
pub fn smooth_cursor(
    input_file: impl AsRef<Path>,
    settings: &SmartZoomSettings,
    output_fps: f64,
) -> ProcessingResult<Vec<MousePositionData>> {
    settings.validate()?;
    let recording = load_recording(input_file)?;
    let spline = SplineSettings {
        output_frame_rate: output_fps,
        ..settings.spline.clone()
    };

    tracing::info!(
        "Smoothing {} raw positions at {}fps with tension={}, spring blend={}",
        recording.positions().len(),
        output_fps,
        spline.tension,
        spline.spring_blend
    );

    let cleaned = clean(recording.positions(), &settings.cleaner);
    let smoothed = interpolate_with_spring(&cleaned, &spline);

    tracing::info!("Generated {} smoothed positions", smoothed.len());
    Ok(smoothed)
}

/// Raw cursor path followed by the spring alone, one sample per output frame
pub fn follow_cursor(
    input_file: impl AsRef<Path>,
    settings: &SmartZoomSettings,
    output_fps: f64,
) -> ProcessingResult<Vec<SmoothedPosition>> {
    let recording = load_recording(input_file)?;
    let spline = &settings.spline;

    tracing::info!(
        "Following {} raw positions at {}fps with spring: stiffness={}, damping={}, mass={}",
        recording.positions().len(),
        output_fps,
        spline.spring.stiffness,
        spline.spring.damping,
        spline.spring.mass
    );

    let followed = smooth_cursor_data(recording.positions(), &spline.spring, output_fps, spline.teleport_threshold);

    tracing::info!("Generated {} followed frames", followed.len());
    Ok(followed)
}

/// Default planner settings
pub fn default_settings() -> SmartZoomSettings {
    SmartZoomSettings::default()
}
