/*!
 * # scriptprep - video script preparation for translation and speech
 *
 * A Rust library that prepares AI-generated video scripts for two external
 * engines: a translator and a text-to-speech synthesizer.
 *
 * ## Features
 *
 * - Protect image prompts, bracketed directions and parenthetical voice notes
 *   behind placeholders before translation, and restore them afterwards even
 *   when the translator alters the placeholders
 * - Clean scripts into speakable text: time ranges, directions, non-spoken
 *   lines, speaker labels and duplicated cues are removed
 * - Estimate shot and word counts from the script structure
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `protector`: Span detection, masking and restoration
 * - `cleaner`: Script cleaning for speech synthesis
 * - `estimator`: Shot and word count estimation
 * - `pipeline`: Composition of the passes with the external engines
 * - `providers`: Translator and speech synthesizer interfaces, plus mocks
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Warning and error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod cleaner;
pub mod errors;
pub mod estimator;
pub mod file_utils;
pub mod language_utils;
pub mod pipeline;
pub mod protector;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use cleaner::{clean, CleanReport, CleanedScript, ScriptCleaner};
pub use errors::{AppError, PipelineWarning, ProviderError};
pub use estimator::{estimate, ShotSignal, StructureEstimate, StructureEstimator};
pub use language_utils::{get_language_name, language_codes_match, normalize_language_code};
pub use pipeline::{PreparedScript, ScriptPipeline, TranslatedScript};
pub use protector::{
    mask, restore, MaskReport, MaskedText, MaskingSession, ProtectedSpan, RestoreReport,
    RestoredText, SpanKind, SpanProtector,
};
pub use providers::{SpeechSynthesizer, Translator};
