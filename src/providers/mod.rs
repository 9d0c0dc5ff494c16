/*!
 * Interfaces to the external services around the pipeline.
 *
 * The translation engine and the speech engine are black boxes. Only their
 * call shape is defined here:
 * - `Translator`: must receive masked text; its output goes through `restore`
 * - `SpeechSynthesizer`: must receive cleaned text
 *
 * Retry and backoff around these calls belong to the implementor.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Black-box translation engine
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate `text` from `source_language` to `target_language`
    ///
    /// # Arguments
    /// * `text` - Masked text; placeholders may come back altered
    /// * `source_language` - ISO 639 code of the input
    /// * `target_language` - ISO 639 code of the output
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// Black-box speech engine
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Render cleaned `text` with `voice`, returning encoded audio
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError>;
}

pub mod mock;
