use smart_zoom::commands::{default_settings, load_recording, plan_camera, process_camera_plan};
use smart_zoom::tracks::Track;
use smart_zoom::{CameraPlan, ProcessingError};
use std::fs;

const RECORDING: &str = r#"{
    "duration": 3.0,
    "frameRate": 30.0,
    "positions": [
        {"time": 0.0, "position": {"x": 0.5, "y": 0.5}},
        {"time": 1.0, "position": {"x": 0.3, "y": 0.4}},
        {"time": 2.0, "position": {"x": 0.3, "y": 0.4}},
        {"time": 3.0, "position": {"x": 0.3, "y": 0.4}}
    ],
    "clicks": [
        {"time": 1.0, "position": {"x": 0.3, "y": 0.4}, "clickType": "leftDown"},
        {"time": 1.3, "position": {"x": 0.31, "y": 0.4}, "clickType": "leftDown"}
    ],
    "keyboardEvents": [
        {"time": 2.2, "keyCode": 1, "characters": "s", "modifiers": {"command": true}, "eventType": "keyDown"}
    ]
}"#;

#[test]
fn test_plan_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("recording.json");
    let output = dir.path().join("plan.json");
    fs::write(&input, RECORDING).unwrap();

    let recording = load_recording(&input).unwrap();
    assert_eq!(recording.clicks.len(), 2);
    assert!(recording.drag_events.is_empty(), "missing arrays default to empty");

    let plan = process_camera_plan(&input, &output, default_settings()).unwrap();
    assert_eq!(plan.samples.len(), 180);
    assert_eq!(plan.keystroke_track.len(), 1);

    let written: CameraPlan = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written.scenes, plan.scenes);
    assert_eq!(written.camera_track.statistics(), plan.camera_track.statistics());

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert!(json.get("cameraTrack").is_some(), "plan fields are camelCase");
    assert!(json.get("diagnostics").and_then(|d| d.get("sceneCount")).is_some());
}

#[test]
fn test_partial_settings_overlay_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("recording.json");
    fs::write(&input, RECORDING).unwrap();

    let settings = serde_json::from_str(r#"{"keystroke": {"enabled": false}}"#).unwrap();
    let plan = plan_camera(&input, settings).unwrap();
    assert!(plan.keystroke_track.is_empty());
    assert!(!plan.camera_track.is_empty());
}

#[test]
fn test_invalid_recording_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("recording.json");
    fs::write(&input, r#"{"duration": -1.0, "frameRate": 30.0}"#).unwrap();

    match plan_camera(&input, default_settings()) {
        Err(ProcessingError::InvalidRecording(message)) => assert!(message.contains("duration")),
        other => panic!("expected an invalid recording error, got {:?}", other.map(|p| p.duration)),
    }
}
