/*!
 * Application configuration.
 *
 * Loads, validates and saves the settings that drive span protection,
 * script cleaning and structure estimation.
 */

use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cleaner::CueMatching;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Which spans are protected from translation
    #[serde(default)]
    pub protector: ProtectorConfig,

    /// Script cleaning rules
    #[serde(default)]
    pub cleaner: CleanerConfig,

    /// Structure estimation settings
    #[serde(default)]
    pub estimator: EstimatorConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Span protection settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProtectorConfig {
    /// Protect `AI IMAGE PROMPT: "..."` spans
    #[serde(default = "default_true")]
    pub protect_image_prompts: bool,

    /// Protect `[...]` stage directions
    #[serde(default = "default_true")]
    pub protect_directions: bool,

    /// Protect `(...)` voice notes
    #[serde(default = "default_true")]
    pub protect_voice_notes: bool,
}

impl Default for ProtectorConfig {
    fn default() -> Self {
        Self {
            protect_image_prompts: true,
            protect_directions: true,
            protect_voice_notes: true,
        }
    }
}

/// Script cleaning rules
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CleanerConfig {
    /// Remove `[...]` stage directions from spoken text
    #[serde(default = "default_true")]
    pub strip_directions: bool,

    /// Remove AI image prompts from spoken text
    #[serde(default = "default_true")]
    pub strip_image_prompts: bool,

    /// Remove `(...)` voice notes from spoken text
    #[serde(default = "default_true")]
    pub strip_voice_notes: bool,

    /// Speaker-role labels removed from the start of a line
    #[serde(default = "default_speaker_labels")]
    pub speaker_labels: Vec<String>,

    /// Labels that mark a whole line as not spoken
    #[serde(default = "default_non_spoken_labels")]
    pub non_spoken_labels: Vec<String>,

    /// Cues with fewer words are never collapsed
    #[serde(default = "default_dedup_min_words")]
    pub dedup_min_words: usize,

    /// How many kept lines back a duplicate cue is looked for
    #[serde(default = "default_dedup_window")]
    pub dedup_window: usize,

    /// How cue text is compared
    #[serde(default)]
    pub cue_matching: CueMatching,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            strip_directions: true,
            strip_image_prompts: true,
            strip_voice_notes: true,
            speaker_labels: default_speaker_labels(),
            non_spoken_labels: default_non_spoken_labels(),
            dedup_min_words: default_dedup_min_words(),
            dedup_window: default_dedup_window(),
            cue_matching: CueMatching::default(),
        }
    }
}

/// Structure estimation settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Non-empty lines grouped into one shot when no marker is found
    #[serde(default = "default_lines_per_shot")]
    pub lines_per_shot: usize,

    /// Speaking rate used for duration estimates
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            lines_per_shot: default_lines_per_shot(),
            words_per_minute: default_words_per_minute(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "es".to_string()
}

fn default_speaker_labels() -> Vec<String> {
    [
        "narrator", "host", "presenter", "speaker", "avatar", "voiceover", "voice-over",
        "voice over", "vo", "character", "dialogue", "dialog", "script",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_non_spoken_labels() -> Vec<String> {
    [
        "visual", "visuals", "camera", "b-roll", "broll", "on-screen text", "on screen text",
        "text overlay", "music", "sfx", "sound", "transition", "scene description", "setting",
        "duration", "ai image prompt", "image prompt",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_dedup_min_words() -> usize {
    3
}

fn default_dedup_window() -> usize {
    3
}

fn default_lines_per_shot() -> usize {
    3
}

fn default_words_per_minute() -> u32 {
    150 // Typical narration pace
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load a configuration file, writing the defaults there first if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.source_language)?;
        crate::language_utils::validate_language_code(&self.target_language)?;

        if self.estimator.lines_per_shot == 0 {
            return Err(anyhow!("estimator.lines_per_shot must be at least 1"));
        }

        if self.estimator.words_per_minute == 0 {
            return Err(anyhow!("estimator.words_per_minute must be at least 1"));
        }

        if self.cleaner.dedup_window == 0 {
            return Err(anyhow!("cleaner.dedup_window must be at least 1"));
        }

        if self.cleaner.speaker_labels.iter().any(|l| l.trim().is_empty())
            || self.cleaner.non_spoken_labels.iter().any(|l| l.trim().is_empty())
        {
            return Err(anyhow!("cleaner labels must not be empty strings"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            protector: ProtectorConfig::default(),
            cleaner: CleanerConfig::default(),
            estimator: EstimatorConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
