/*!
 * Span protection around opaque text transforms.
 *
 * Before a script is handed to a translation engine, every substring that
 * must come back untouched (stage directions, AI image prompts, voice notes)
 * is replaced by a placeholder such as `§§BR_0§§`. The mapping lives in a
 * `MaskingSession` owned by the caller. After the transform, `restore`
 * swaps the placeholders back, tolerating the case and spacing drift that
 * translators introduce.
 *
 * # Architecture
 *
 * - `detectors`: one `SpanDetector` per span kind, swappable
 * - `placeholder`: placeholder format and lenient recognition
 */

pub mod detectors;
pub mod placeholder;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Range;
use uuid::Uuid;

use crate::app_config::ProtectorConfig;
use crate::errors::PipelineWarning;

pub use detectors::{DelimitedDetector, ImagePromptDetector, SpanDetector};
pub use placeholder::{find_placeholders, format_placeholder, PLACEHOLDER_DELIMITER};

/// Kind of protected span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// `AI IMAGE PROMPT: "..."`
    ImagePrompt,
    /// `[...]` stage direction
    Bracketed,
    /// `(...)` voice note
    Parenthetical,
}

impl SpanKind {
    /// Tag used inside placeholders
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ImagePrompt => "IMG",
            Self::Bracketed => "BR",
            Self::Parenthetical => "VO",
        }
    }

    /// Parse a placeholder tag, ignoring case
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "IMG" => Some(Self::ImagePrompt),
            "BR" => Some(Self::Bracketed),
            "VO" => Some(Self::Parenthetical),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ImagePrompt => "AI image prompt",
            Self::Bracketed => "bracketed direction",
            Self::Parenthetical => "parenthetical voice note",
        };
        write!(f, "{}", name)
    }
}

/// A substring that must survive an external transform unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedSpan {
    pub kind: SpanKind,
    /// Numeric identity, unique within the session
    pub index: usize,
    /// Exact substring, delimiters included
    pub original_text: String,
    /// Token substituted in its place
    pub placeholder: String,
    /// Byte offset in the unmasked text
    pub start: usize,
}

/// Placeholder to span mapping for one mask/transform/restore cycle.
///
/// Indices are handed out by the session itself, so two sessions never share
/// a counter. A session must not be reused for an unrelated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskingSession {
    id: Uuid,
    next_index: usize,
    spans: Vec<ProtectedSpan>,
}

impl MaskingSession {
    /// Create an empty session numbering from zero
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create an empty session numbering from `first_index`
    pub fn starting_at(first_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            next_index: first_index,
            spans: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of spans recorded
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Spans in document order
    pub fn spans(&self) -> &[ProtectedSpan] {
        &self.spans
    }

    /// Look up a span by its placeholder index
    pub fn get(&self, index: usize) -> Option<&ProtectedSpan> {
        self.spans.iter().find(|span| span.index == index)
    }

    /// Record a span and return its placeholder
    fn record(&mut self, kind: SpanKind, original_text: &str, start: usize) -> &str {
        let index = self.next_index;
        self.next_index += 1;
        self.spans.push(ProtectedSpan {
            kind,
            index,
            original_text: original_text.to_string(),
            placeholder: format_placeholder(kind, index),
            start,
        });
        &self.spans[self.spans.len() - 1].placeholder
    }
}

impl Default for MaskingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Diagnostics from one masking pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskReport {
    /// Spans masked, per kind
    pub spans_by_kind: BTreeMap<SpanKind, usize>,
    /// Unterminated constructs left unmasked, plus `EmptyInput`
    pub warnings: Vec<PipelineWarning>,
}

impl MaskReport {
    /// Count of unmasked but suspicious constructs
    pub fn suspicious_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, PipelineWarning::MalformedSpan { .. }))
            .count()
    }

    /// Spans masked for one kind
    pub fn count(&self, kind: SpanKind) -> usize {
        self.spans_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// Output of `mask`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedText {
    /// Text with placeholders in place of protected spans
    pub text: String,
    pub session: MaskingSession,
    pub report: MaskReport,
}

impl MaskedText {
    /// Split into `(masked_text, session)`
    pub fn into_parts(self) -> (String, MaskingSession) {
        (self.text, self.session)
    }
}

/// Diagnostics from one restoration pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReport {
    /// Spans recorded in the session
    pub expected: usize,
    /// Distinct session spans found and restored
    pub restored: usize,
    /// Session indices never found
    pub missing: Vec<usize>,
    /// Placeholder-shaped tokens whose index the session does not know
    pub unknown_tokens: usize,
    /// Placeholders whose tag disagreed with the recorded kind
    pub tag_mismatches: usize,
    /// Extra occurrences of an already restored placeholder
    pub duplicates: usize,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// The `RestorationIncomplete` warning, if any placeholder was lost
    pub fn incomplete(&self) -> Option<PipelineWarning> {
        if self.is_complete() {
            return None;
        }
        Some(PipelineWarning::RestorationIncomplete {
            expected: self.expected,
            found: self.restored,
            missing: self.missing.clone(),
        })
    }
}

/// Output of `restore`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoredText {
    pub text: String,
    pub report: RestoreReport,
}

/// Where each protected span sits in a text
#[derive(Debug, Clone, Default)]
pub struct SpanScan {
    /// Claimed spans sorted by start offset
    pub spans: Vec<(SpanKind, Range<usize>)>,
    /// Unterminated openers
    pub warnings: Vec<PipelineWarning>,
}

/// Masks and restores protected spans.
///
/// Detectors run in the order given; an earlier detector wins any overlap.
#[derive(Debug)]
pub struct SpanProtector {
    detectors: Vec<Box<dyn SpanDetector>>,
}

impl SpanProtector {
    /// Build a protector from detectors in precedence order
    pub fn new(detectors: Vec<Box<dyn SpanDetector>>) -> Self {
        Self { detectors }
    }

    /// Image prompts, then brackets, then parentheticals
    pub fn standard() -> Self {
        Self::from_config(&ProtectorConfig::default())
    }

    /// Standard precedence restricted to the kinds enabled in config
    pub fn from_config(config: &ProtectorConfig) -> Self {
        let mut detectors: Vec<Box<dyn SpanDetector>> = Vec::new();
        if config.protect_image_prompts {
            detectors.push(Box::new(ImagePromptDetector));
        }
        if config.protect_directions {
            detectors.push(Box::new(DelimitedDetector::brackets()));
        }
        if config.protect_voice_notes {
            detectors.push(Box::new(DelimitedDetector::parentheses()));
        }
        Self::new(detectors)
    }

    /// Kinds this protector recognizes, in precedence order
    pub fn kinds(&self) -> Vec<SpanKind> {
        self.detectors.iter().map(|d| d.kind()).collect()
    }

    /// Locate every protected span without masking anything
    pub fn scan(&self, text: &str) -> SpanScan {
        let mut claimed: Vec<(SpanKind, Range<usize>)> = Vec::new();
        let mut shadow = text.to_string();

        for detector in &self.detectors {
            // Blanking keeps later detectors out of claimed spans, but a pair of
            // delimiters can still enclose one. Such a pair is not a span, so
            // look for spans inside it instead.
            let mut found = Vec::new();
            let mut pending = detector.find(&shadow);
            while let Some(range) = pending.pop() {
                if claimed
                    .iter()
                    .any(|(_, c)| c.start < range.end && range.start < c.end)
                {
                    pending.extend(detector.find_nested(&shadow, range));
                } else {
                    found.push(range);
                }
            }
            if found.is_empty() {
                continue;
            }
            found.sort_by_key(|range| range.start);
            shadow = detectors::blank_out(&shadow, &found);
            claimed.extend(found.into_iter().map(|range| (detector.kind(), range)));
        }
        claimed.sort_by_key(|(_, range)| range.start);

        let mut warnings: Vec<(usize, PipelineWarning)> = self
            .detectors
            .iter()
            .flat_map(|detector| {
                let kind = detector.kind();
                detector
                    .find_unterminated(&shadow)
                    .into_iter()
                    .map(move |offset| (offset, PipelineWarning::MalformedSpan { kind, offset }))
            })
            .collect();
        warnings.sort_by_key(|(offset, _)| *offset);

        SpanScan {
            spans: claimed,
            warnings: warnings.into_iter().map(|(_, w)| w).collect(),
        }
    }

    /// Replace every protected span with a placeholder
    pub fn mask(&self, text: &str) -> MaskedText {
        if text.trim().is_empty() {
            return MaskedText {
                text: text.to_string(),
                session: MaskingSession::new(),
                report: MaskReport {
                    spans_by_kind: BTreeMap::new(),
                    warnings: vec![PipelineWarning::EmptyInput],
                },
            };
        }

        let scan = self.scan(text);

        // Number clear of any placeholder already in the text so the restore
        // pass cannot confuse it with one of ours.
        let taken: BTreeSet<usize> = find_placeholders(text).into_iter().map(|t| t.index).collect();
        let first_index = placeholder::first_free_index(&taken, scan.spans.len());
        let mut session = MaskingSession::starting_at(first_index);
        let mut masked = String::with_capacity(text.len());
        let mut spans_by_kind = BTreeMap::new();
        let mut cursor = 0;

        for (kind, range) in &scan.spans {
            masked.push_str(&text[cursor..range.start]);
            masked.push_str(session.record(*kind, &text[range.clone()], range.start));
            *spans_by_kind.entry(*kind).or_insert(0) += 1;
            cursor = range.end;
        }
        masked.push_str(&text[cursor..]);

        for warning in &scan.warnings {
            warn!("Left unmasked: {}", warning);
        }
        debug!(
            "Masked {} span(s) in session {}, {} suspicious",
            session.len(),
            session.id(),
            scan.warnings.len()
        );

        MaskedText {
            text: masked,
            session,
            report: MaskReport {
                spans_by_kind,
                warnings: scan.warnings,
            },
        }
    }

    /// Swap placeholders back for their original spans
    pub fn restore(&self, text: &str, session: &MaskingSession) -> RestoredText {
        restore(text, session)
    }
}

impl Default for SpanProtector {
    fn default() -> Self {
        Self::standard()
    }
}

/// Mask with the standard detector set
pub fn mask(text: &str) -> MaskedText {
    SpanProtector::standard().mask(text)
}

/// Replace every recognizable placeholder with its span from `session`.
///
/// Tokens whose index the session does not know are left in place. Calling
/// this again on restored text changes nothing.
pub fn restore(text: &str, session: &MaskingSession) -> RestoredText {
    let mut seen: HashMap<usize, usize> = HashMap::new();
    let mut unknown_tokens = 0;
    let mut tag_mismatches = 0;

    let mut restored = String::with_capacity(text.len());
    let mut cursor = 0;

    for token in find_placeholders(text) {
        restored.push_str(&text[cursor..token.range.start]);
        cursor = token.range.end;

        match session.get(token.index) {
            Some(span) => {
                *seen.entry(span.index).or_insert(0) += 1;
                if token.kind != Some(span.kind) {
                    tag_mismatches += 1;
                }
                restored.push_str(&span.original_text);
            }
            None => {
                unknown_tokens += 1;
                restored.push_str(&text[token.range]);
            }
        }
    }
    restored.push_str(&text[cursor..]);

    let missing: Vec<usize> = session
        .spans()
        .iter()
        .map(|span| span.index)
        .filter(|index| !seen.contains_key(index))
        .collect();

    let report = RestoreReport {
        expected: session.len(),
        restored: seen.len(),
        missing,
        unknown_tokens,
        tag_mismatches,
        duplicates: seen.values().map(|count| count - 1).sum(),
    };

    if let Some(warning) = report.incomplete() {
        warn!("{} (session {})", warning, session.id());
    }
    debug!(
        "Restored {}/{} span(s), {} unknown token(s), {} duplicate(s)",
        report.restored, report.expected, report.unknown_tokens, report.duplicates
    );

    RestoredText {
        text: restored,
        report,
    }
}
