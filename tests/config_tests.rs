// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use bactrack::Config;
use std::path::PathBuf;
use std::time::Duration;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bactrack-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.bind_address(), "0.0.0.0:8000");
    assert_eq!((config.frame_width, config.frame_height), (1280, 720));
    assert!(
        config.mirror_preview,
        "Mirror preview should be enabled by default"
    );
    assert!(config.extractor_command.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_intervals() {
    let config = Config::default();
    assert_eq!(config.stream_interval(), Duration::from_millis(100));
    assert_eq!(config.push_interval(), Duration::from_secs(1));
    assert_eq!(config.rating_cooldown(), Duration::from_secs(30));
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = scratch_dir("missing");
    let config = Config::load(&dir.join("config.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_then_load() {
    let dir = scratch_dir("save");
    let path = dir.join("nested").join("config.json");

    let mut config = Config::default();
    config.port = 9123;
    config.extractor_command = vec!["python3".into(), "pose_helper.py".into()];
    config.image_source = Some(PathBuf::from("/tmp/frames"));
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_invalid_values_rejected() {
    let dir = scratch_dir("invalid");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");

    std::fs::write(&path, r#"{"jpeg_quality": 0}"#).unwrap();
    assert!(Config::load(&path).is_err());

    std::fs::write(&path, r#"{"history_limit": 0}"#).unwrap();
    assert!(Config::load(&path).is_err());

    std::fs::write(&path, r#"{"push_interval_ms": 0}"#).unwrap();
    assert!(Config::load(&path).is_err());

    std::fs::write(&path, "{ not json").unwrap();
    assert!(Config::load(&path).is_err());

    let _ = std::fs::remove_dir_all(&dir);
}
