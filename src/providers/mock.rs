/*!
 * Mock provider implementations for testing.
 *
 * `MockTranslator` simulates the ways a translation engine treats masked
 * text:
 * - `MockTranslator::identity()` - returns the text as sent
 * - `MockTranslator::uppercase()` - alters case everywhere except placeholders
 * - `MockTranslator::drifting()` - lower-cases placeholder tags and pads them
 * - `MockTranslator::dropping(n)` - loses placeholder `n`
 * - `MockTranslator::failing()` - always fails with an error
 *
 * `MockSynthesizer` returns a deterministic byte payload and remembers every
 * text it was asked to speak.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::protector::placeholder::find_placeholders;
use crate::providers::{SpeechSynthesizer, Translator};

/// A recorded translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns the input unchanged
    Identity,
    /// Upper-cases everything outside placeholders
    Uppercase,
    /// Lower-cases placeholder tags and surrounds them with spaces
    DriftPlaceholders,
    /// Removes the placeholder with this index
    DropPlaceholder { index: usize },
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns an empty response
    Empty,
    /// Simulates a slow response
    Slow { delay_ms: u64 },
}

/// Mock translator for testing the mask/translate/restore cycle
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, shared between clones
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    pub fn drifting() -> Self {
        Self::new(MockBehavior::DriftPlaceholders)
    }

    pub fn dropping(index: usize) -> Self {
        Self::new(MockBehavior::DropPlaceholder { index })
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// Upper-case the text between placeholders
    pub fn uppercase_outside_placeholders(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for token in find_placeholders(text) {
            out.push_str(&text[cursor..token.range.start].to_uppercase());
            out.push_str(&text[token.range.clone()]);
            cursor = token.range.end;
        }
        out.push_str(&text[cursor..].to_uppercase());
        out
    }

    /// Rewrite `§§BR_0§§` as ` §§ br_0 §§ `
    pub fn drift_placeholders(text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 8);
        let mut cursor = 0;
        for token in find_placeholders(text) {
            out.push_str(&text[cursor..token.range.start]);
            let tag = token.kind.map_or("", |kind| kind.tag()).to_lowercase();
            out.push_str(&format!(" §§ {}_{} §§ ", tag, token.index));
            cursor = token.range.end;
        }
        out.push_str(&text[cursor..]);
        out
    }

    /// Remove every placeholder with `index`
    pub fn drop_placeholder(text: &str, index: usize) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for token in find_placeholders(text).into_iter().filter(|t| t.index == index) {
            out.push_str(&text[cursor..token.range.start]);
            cursor = token.range.end;
        }
        out.push_str(&text[cursor..]);
        out
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        });

        match self.behavior {
            MockBehavior::Identity => Ok(text.to_string()),

            MockBehavior::Uppercase => Ok(Self::uppercase_outside_placeholders(text)),

            MockBehavior::DriftPlaceholders => Ok(Self::drift_placeholders(text)),

            MockBehavior::DropPlaceholder { index } => Ok(Self::drop_placeholder(text, index)),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::RequestFailed(format!(
                        "Simulated intermittent failure (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(text.to_string())
                }
            }

            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "Simulated translator failure".to_string(),
            )),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(text.to_string())
            }
        }
    }
}

/// Mock speech engine returning `AUDIO[voice]:text` as bytes
#[derive(Debug, Clone, Default)]
pub struct MockSynthesizer {
    failing: bool,
    spoken: Arc<Mutex<Vec<String>>>,
}

impl MockSynthesizer {
    pub fn working() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Every text received so far
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        if self.failing {
            return Err(ProviderError::SynthesisFailed(
                "Simulated speech engine failure".to_string(),
            ));
        }
        self.spoken.lock().push(text.to_string());
        Ok(format!("AUDIO[{}]:{}", voice, text).into_bytes())
    }
}
