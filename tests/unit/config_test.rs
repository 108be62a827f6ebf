//! Unit tests for engine configuration persistence.

use trendcast::storage::config::{load_config_from, save_config_to, ConfigError, EngineConfig};

#[test]
fn test_config_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = EngineConfig::default()
        .with_fatigue_exponent(1.08)
        .with_max_plausible_rate(25.0)
        .with_curve_points(120);
    save_config_to(&config, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_unset_plausibility_ceiling_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    save_config_to(&EngineConfig::default(), &path).unwrap();
    let loaded = load_config_from(&path).unwrap();
    assert!(loaded.max_plausible_rate.is_none());
}

#[test]
fn test_malformed_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "fatigue_exponent = \"steep\"").unwrap();

    assert!(matches!(load_config_from(&path), Err(ConfigError::ParseError(_))));
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "day_length_ms = -5.0").unwrap();

    assert!(matches!(load_config_from(&path), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_oversized_curve_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "curve_points = 1000000000").unwrap();

    assert!(matches!(load_config_from(&path), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_config_from(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}
