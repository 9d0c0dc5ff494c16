/*!
 * End-to-end script preparation.
 *
 * Composes the three text passes with the external engines:
 *
 * ```text
 * raw ─┬─ estimate ──────────────────────────────► StructureEstimate
 *      ├─ clean ───────────────────► synthesize ─► audio
 *      └─ mask ─► translate ─► restore ─► clean ─► synthesize
 * ```
 *
 * Every script gets its own masking session, so scripts in a batch never
 * share placeholder numbering.
 */

use futures::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app_config::Config;
use crate::cleaner::{CleanedScript, ScriptCleaner};
use crate::errors::ProviderError;
use crate::estimator::{StructureEstimate, StructureEstimator};
use crate::language_utils;
use crate::protector::{MaskReport, RestoreReport, SpanProtector};
use crate::providers::{SpeechSynthesizer, Translator};

/// Cleaned text and structure of one script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedScript {
    pub cleaned: CleanedScript,
    pub estimate: StructureEstimate,
}

/// Translated text with its masking and restoration diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedScript {
    pub text: String,
    pub mask_report: MaskReport,
    pub restore_report: RestoreReport,
}

/// Audio along with the text that was spoken
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenScript {
    pub cleaned: CleanedScript,
    pub audio: Vec<u8>,
}

/// Result of translating a script and voicing the translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedScript {
    pub translation: TranslatedScript,
    pub spoken: SpokenScript,
}

/// Protector, cleaner and estimator configured together
#[derive(Debug)]
pub struct ScriptPipeline {
    protector: SpanProtector,
    cleaner: ScriptCleaner,
    estimator: StructureEstimator,
    source_language: String,
    target_language: String,
}

impl ScriptPipeline {
    pub fn from_config(config: &Config) -> Self {
        Self {
            protector: SpanProtector::from_config(&config.protector),
            cleaner: ScriptCleaner::new(&config.cleaner),
            estimator: StructureEstimator::new(&config.estimator),
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
        }
    }

    /// Override the language pair used by `translate_protected`
    pub fn with_languages(mut self, source: &str, target: &str) -> Self {
        self.source_language = source.to_string();
        self.target_language = target.to_string();
        self
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn protector(&self) -> &SpanProtector {
        &self.protector
    }

    pub fn cleaner(&self) -> &ScriptCleaner {
        &self.cleaner
    }

    pub fn estimate(&self, raw: &str) -> StructureEstimate {
        self.estimator.estimate(raw)
    }

    /// Clean and estimate a raw script
    pub fn prepare(&self, raw: &str) -> PreparedScript {
        PreparedScript {
            cleaned: self.cleaner.clean_with_report(raw),
            estimate: self.estimator.estimate(raw),
        }
    }

    /// Mask `raw`, send it through `translator`, and restore the result
    pub async fn translate_protected(
        &self,
        translator: &dyn Translator,
        raw: &str,
    ) -> Result<TranslatedScript, ProviderError> {
        let (source, target) = self.resolve_languages()?;

        let masked = self.protector.mask(raw);
        let mask_report = masked.report.clone();
        let (masked_text, session) = masked.into_parts();

        if masked_text.trim().is_empty() {
            debug!("Nothing to translate, skipping translator");
            let restored = self.protector.restore(&masked_text, &session);
            return Ok(TranslatedScript {
                text: restored.text,
                mask_report,
                restore_report: restored.report,
            });
        }

        debug!(
            "Translating {} byte(s) {} -> {} with {} protected span(s)",
            masked_text.len(),
            language_utils::get_language_name(&source).unwrap_or_else(|_| source.clone()),
            language_utils::get_language_name(&target).unwrap_or_else(|_| target.clone()),
            session.len()
        );
        let translated = translator.translate(&masked_text, &source, &target).await?;
        if translated.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let restored = self.protector.restore(&translated, &session);
        Ok(TranslatedScript {
            text: restored.text,
            mask_report,
            restore_report: restored.report,
        })
    }

    /// Clean `raw` and hand the speakable text to `synthesizer`
    pub async fn speak(
        &self,
        synthesizer: &dyn SpeechSynthesizer,
        raw: &str,
        voice: &str,
    ) -> Result<SpokenScript, ProviderError> {
        let cleaned = self.cleaner.clean_with_report(raw);
        if cleaned.text.is_empty() {
            warn!("Cleaned script is empty, nothing to synthesize");
            return Ok(SpokenScript {
                cleaned,
                audio: Vec::new(),
            });
        }

        let audio = synthesizer.synthesize(&cleaned.text, voice).await?;
        debug!(
            "Synthesized {} byte(s) of audio for {} character(s)",
            audio.len(),
            cleaned.text.chars().count()
        );
        Ok(SpokenScript { cleaned, audio })
    }

    /// Translate with protection, then clean and voice the translation
    pub async fn localize_and_speak(
        &self,
        translator: &dyn Translator,
        synthesizer: &dyn SpeechSynthesizer,
        raw: &str,
        voice: &str,
    ) -> Result<LocalizedScript, ProviderError> {
        let translation = self.translate_protected(translator, raw).await?;
        let spoken = self.speak(synthesizer, &translation.text, voice).await?;
        Ok(LocalizedScript {
            translation,
            spoken,
        })
    }

    /// Translate independent scripts concurrently.
    ///
    /// Results come back in input order; one failure does not affect the rest.
    pub async fn translate_batch<S: AsRef<str>>(
        &self,
        translator: &dyn Translator,
        scripts: &[S],
    ) -> Vec<Result<TranslatedScript, ProviderError>> {
        let futures = scripts
            .iter()
            .map(|script| self.translate_protected(translator, script.as_ref()));
        let results = join_all(futures).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            "Translated {} of {} script(s)",
            results.len() - failed,
            results.len()
        );
        results
    }

    /// Configured language pair, normalized to the codes sent to a translator
    fn resolve_languages(&self) -> Result<(String, String), ProviderError> {
        let normalize = |code: &String| {
            language_utils::normalize_language_code(code)
                .map_err(|_| ProviderError::InvalidLanguage(code.clone()))
        };
        let source = normalize(&self.source_language)?;
        let target = normalize(&self.target_language)?;

        if language_utils::language_codes_match(&source, &target) {
            warn!("Source and target language are both {}", source);
        }
        Ok((source, target))
    }
}

impl Default for ScriptPipeline {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
