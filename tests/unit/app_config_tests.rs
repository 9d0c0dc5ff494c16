/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use scriptprep::app_config::{Config, LogLevel};
use scriptprep::cleaner::CueMatching;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "es");
    assert!(config.protector.protect_image_prompts);
    assert!(config.protector.protect_directions);
    assert!(config.protector.protect_voice_notes);
    assert_eq!(config.cleaner.dedup_min_words, 3);
    assert_eq!(config.cleaner.dedup_window, 3);
    assert_eq!(config.cleaner.cue_matching, CueMatching::Exact);
    assert!(config.cleaner.speaker_labels.iter().any(|l| l == "narrator"));
    assert!(config.cleaner.non_spoken_labels.iter().any(|l| l == "visual"));
    assert_eq!(config.estimator.lines_per_shot, 3);
    assert_eq!(config.estimator.words_per_minute, 150);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = "not-a-code".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    config.target_language = "".to_string();
    assert!(config.validate().is_err());
    config.target_language = "fra".to_string();
    assert!(config.validate().is_ok());

    config.estimator.lines_per_shot = 0;
    assert!(config.validate().is_err());
    config.estimator.lines_per_shot = 3;

    config.cleaner.dedup_window = 0;
    assert!(config.validate().is_err());
    config.cleaner.dedup_window = 3;

    config.cleaner.speaker_labels.push("  ".to_string());
    assert!(config.validate().is_err());
}

/// Test that a partial JSON file is completed with defaults
#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let json = r#"{
        "target_language": "de",
        "cleaner": { "cue_matching": "loose" },
        "estimator": { "lines_per_shot": 4 },
        "log_level": "debug"
    }"#;
    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "de");
    assert_eq!(config.cleaner.cue_matching, CueMatching::Loose);
    assert_eq!(config.cleaner.dedup_min_words, 3);
    assert_eq!(config.estimator.lines_per_shot, 4);
    assert_eq!(config.estimator.words_per_minute, 150);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

/// Test that save and from_file round-trip
#[test]
fn test_config_saveAndLoad_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.target_language = "ja".to_string();
    config.protector.protect_voice_notes = false;
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded, config);
    Ok(())
}

/// Test that a missing file is created with defaults
#[test]
fn test_config_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert_eq!(config, Config::default());
    assert!(path.exists());
    assert_eq!(Config::from_file(&path)?, config);
    Ok(())
}

/// Test that a malformed file is an error
#[test]
fn test_config_fromFile_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::from_file(&path).is_err());
    Ok(())
}

/// Test log level mapping
#[test]
fn test_logLevel_toLevelFilter_shouldMapEveryLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
