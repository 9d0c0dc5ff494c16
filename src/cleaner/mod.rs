/*!
 * Script cleaning for speech synthesis.
 *
 * Turns an author-formatted script into the text a voice should read:
 *
 * 1. time ranges such as `(0:30 - 0:45)` are removed with their wrapper
 * 2. directions, image prompts, voice notes, non-spoken lines, scene/shot
 *    headers, speaker labels and emphasis markup are stripped
 * 3. cue lines repeated in near succession are collapsed to the first one
 *
 * Cleaning never fails. Text with no recognizable structure comes back with
 * only its spacing tidied.
 *
 * # Architecture
 *
 * - `timestamps`: time-range grammar, shared with the estimator
 * - `markup`: line-level label, header and emphasis handling
 * - `dedup`: duplicate cue collapse
 */

pub mod dedup;
pub mod markup;
pub mod timestamps;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app_config::{CleanerConfig, ProtectorConfig};
use crate::errors::PipelineWarning;
use crate::protector::SpanProtector;

pub use dedup::{CueDeduplicator, CueMatching};
use markup::LabelMatcher;

/// What a cleaning pass removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    pub timestamps_removed: usize,
    /// Directions, image prompts and voice notes
    pub spans_removed: usize,
    /// Lines dropped because of a non-spoken label
    pub non_spoken_lines: usize,
    /// Header and speaker labels stripped
    pub labels_removed: usize,
    pub duplicates_collapsed: usize,
    /// Unterminated spans left in the text, or `EmptyInput`
    pub warnings: Vec<PipelineWarning>,
}

/// Speakable text plus what was removed to get there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedScript {
    pub text: String,
    pub report: CleanReport,
}

/// Converts raw scripts into speakable plain text
#[derive(Debug)]
pub struct ScriptCleaner {
    spans: SpanProtector,
    non_spoken: LabelMatcher,
    speakers: LabelMatcher,
    dedup: CueDeduplicator,
}

impl ScriptCleaner {
    pub fn new(config: &CleanerConfig) -> Self {
        // Same detectors and precedence as masking, limited to what we strip
        let spans = SpanProtector::from_config(&ProtectorConfig {
            protect_image_prompts: config.strip_image_prompts,
            protect_directions: config.strip_directions,
            protect_voice_notes: config.strip_voice_notes,
        });

        Self {
            spans,
            non_spoken: LabelMatcher::new(&config.non_spoken_labels),
            speakers: LabelMatcher::new(&config.speaker_labels),
            dedup: CueDeduplicator::new(
                config.dedup_min_words,
                config.dedup_window,
                config.cue_matching,
            ),
        }
    }

    /// Speakable text for `raw`
    pub fn clean(&self, raw: &str) -> String {
        self.clean_with_report(raw).text
    }

    /// Speakable text for `raw`, with counts of everything removed
    pub fn clean_with_report(&self, raw: &str) -> CleanedScript {
        let mut report = CleanReport::default();
        if raw.trim().is_empty() {
            report.warnings.push(PipelineWarning::EmptyInput);
            return CleanedScript {
                text: String::new(),
                report,
            };
        }

        let (text, timestamps_removed) = timestamps::strip_time_ranges(raw);
        report.timestamps_removed = timestamps_removed;

        let text = self.remove_spans(&text, &mut report);
        let lines = self.strip_directives(&text, &mut report);

        let (lines, duplicates) = self.dedup.collapse(&lines);
        report.duplicates_collapsed = duplicates;

        debug!(
            "Cleaned script: {} timestamp(s), {} span(s), {} label(s), {} non-spoken line(s), {} duplicate(s)",
            report.timestamps_removed,
            report.spans_removed,
            report.labels_removed,
            report.non_spoken_lines,
            report.duplicates_collapsed
        );

        CleanedScript {
            text: join_paragraphs(&lines),
            report,
        }
    }

    /// Cut out directions, image prompts and voice notes
    fn remove_spans(&self, text: &str, report: &mut CleanReport) -> String {
        let scan = self.spans.scan(text);
        report.spans_removed = scan.spans.len();
        report.warnings.extend(scan.warnings);

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (_, range) in &scan.spans {
            out.push_str(&text[cursor..range.start]);
            out.push(' ');
            cursor = range.end;
        }
        out.push_str(&text[cursor..]);
        out
    }

    /// Per-line label, header and markup stripping.
    ///
    /// Blank source lines are kept as empty strings; lines emptied by
    /// stripping are dropped.
    fn strip_directives(&self, text: &str, report: &mut CleanReport) -> Vec<String> {
        let mut lines = Vec::new();

        for raw_line in text.lines() {
            if raw_line.trim().is_empty() {
                lines.push(String::new());
                continue;
            }

            let line = markup::strip_markup(raw_line);
            if self.non_spoken.matches(&line) {
                report.non_spoken_lines += 1;
                continue;
            }

            let mut rest = line.as_str();
            if let Some(stripped) = markup::strip_header_label(rest) {
                rest = stripped;
                report.labels_removed += 1;
            }
            // "Character: Narrator: ..." carries two labels
            for _ in 0..2 {
                match self.speakers.strip(rest) {
                    Some(stripped) => {
                        rest = stripped;
                        report.labels_removed += 1;
                    }
                    None => break,
                }
            }
            if self.non_spoken.matches(rest) {
                report.non_spoken_lines += 1;
                continue;
            }

            let spoken = markup::tidy_spacing(markup::unwrap_quotes(rest));
            if markup::has_speech(&spoken) {
                lines.push(spoken);
            }
        }

        lines
    }
}

impl Default for ScriptCleaner {
    fn default() -> Self {
        Self::new(&CleanerConfig::default())
    }
}

/// Join lines, collapsing runs of blank lines and trimming the ends
fn join_paragraphs(lines: &[String]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty() && out.last().is_none_or(|last| last.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|last| last.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Clean with the default rules
pub fn clean(raw: &str) -> String {
    ScriptCleaner::default().clean(raw)
}
