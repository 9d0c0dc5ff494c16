/*!
 * Error and warning types for the scriptprep pipeline.
 *
 * Masking, restoration, cleaning and estimation never fail. What they find
 * wrong with their input is reported as a `PipelineWarning` so callers and
 * tests can assert on it. Only the external collaborators (translator,
 * speech synthesizer) and the application plumbing produce real errors.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protector::SpanKind;

/// Non-fatal conditions surfaced as structured diagnostics
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// An opener (bracket, parenthesis or prompt quote) with no matching closer.
    /// The construct is left unmasked.
    #[error("Unterminated {kind} span at byte {offset}")]
    MalformedSpan {
        /// Kind of span the opener would have started
        kind: SpanKind,
        /// Byte offset of the opener in the input text
        offset: usize,
    },

    /// Fewer placeholders came back than the session handed out
    #[error("Restoration incomplete: {found}/{expected} placeholders found, missing {missing:?}")]
    RestorationIncomplete {
        /// Spans recorded in the session
        expected: usize,
        /// Distinct session spans found in the text
        found: usize,
        /// Indices of the spans that were not found
        missing: Vec<usize>,
    },

    /// Nothing to work on
    #[error("Empty input")]
    EmptyInput,
}

/// Errors that can occur when calling an external translator or synthesizer
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The call itself failed
    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    /// A language code was rejected before the call was made
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    /// The provider answered with nothing usable
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// The speech engine could not render the text
    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
