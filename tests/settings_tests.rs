//! Pipeline Settings Tests
//!
//! Tests for:
//! - Default values
//! - JSON parsing with partial documents
//! - Error mapping for malformed input and missing files

use lumen::errors::LumenError;
use lumen::renderer::{PipelineSettings, SortCriteria};

#[test]
fn defaults() {
    let settings = PipelineSettings::default();
    assert_eq!((settings.width, settings.height), (1280, 720));
    assert_eq!(settings.gbuffer_pass_tag, "gbuffer");
    assert_eq!(settings.lighting_program, "deferred/lightpass");
    assert_eq!(settings.sort, SortCriteria::CommonOpaque);
    assert!(settings.draw_skybox);
    assert!(settings.draw_gizmos);
    assert!(settings.submit_per_pass);
}

#[test]
fn partial_json_keeps_defaults() {
    let settings =
        PipelineSettings::from_json_str(r#"{ "width": 800, "height": 600, "sort": "front_to_back" }"#)
            .unwrap();

    assert_eq!((settings.width, settings.height), (800, 600));
    assert_eq!(settings.sort, SortCriteria::FrontToBack);
    assert_eq!(settings.lighting_program, "deferred/lightpass");
    assert!(settings.submit_per_pass);
}

#[test]
fn empty_object_is_default() {
    let settings = PipelineSettings::from_json_str("{}").unwrap();
    assert_eq!(settings, PipelineSettings::default());
}

#[test]
fn malformed_json_is_config_error() {
    let err = PipelineSettings::from_json_str(r#"{ "width": "wide" }"#).unwrap_err();
    assert!(matches!(err, LumenError::Config(_)));
}

#[test]
fn unknown_sort_is_config_error() {
    let err = PipelineSettings::from_json_str(r#"{ "sort": "random" }"#).unwrap_err();
    assert!(matches!(err, LumenError::Config(_)));
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("lumen-settings-does-not-exist.json");
    let err = PipelineSettings::from_json_file(&path).unwrap_err();
    assert!(matches!(err, LumenError::Io(_)));
}

#[test]
fn file_round_trip() {
    let settings = PipelineSettings {
        gbuffer_pass_tag: "deferred".to_owned(),
        draw_gizmos: false,
        sort: SortCriteria::Unsorted,
        ..Default::default()
    };

    let path = std::env::temp_dir().join(format!("lumen-settings-{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

    let loaded = PipelineSettings::from_json_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, settings);
}
