/*!
 * Duplicate cue collapse.
 *
 * Templated generators often write the same spoken line twice, once under a
 * character label and once under a dialogue label. A line is dropped when
 * one of its cues matches a cue of a recently kept line.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Straight or curly double-quoted segment on one line
static QUOTED_CUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"\n]+)"|“([^”\n]+)”"#).expect("Invalid quoted cue regex")
});

/// How cue text is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueMatching {
    /// Trimmed, whitespace-collapsed text must be equal
    #[default]
    Exact,
    /// Also ignores case and punctuation
    Loose,
}

impl CueMatching {
    /// Comparison key for a cue
    pub fn key(&self, cue: &str) -> String {
        match self {
            Self::Exact => collapse_whitespace(cue),
            Self::Loose => {
                let letters: String = cue
                    .chars()
                    .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
                    .collect();
                collapse_whitespace(&letters.to_lowercase())
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The cues a line carries: its quoted segments, or the whole line
pub fn cues(line: &str) -> Vec<&str> {
    let quoted: Vec<&str> = QUOTED_CUE_REGEX
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
        .collect();

    if quoted.is_empty() {
        vec![line]
    } else {
        quoted
    }
}

/// Collapses cue lines repeated within a short window
#[derive(Debug, Clone)]
pub struct CueDeduplicator {
    min_words: usize,
    window: usize,
    matching: CueMatching,
}

impl CueDeduplicator {
    pub fn new(min_words: usize, window: usize, matching: CueMatching) -> Self {
        Self {
            min_words,
            window: window.max(1),
            matching,
        }
    }

    /// Keys of the cues on `line` long enough to take part in dedup
    fn eligible_keys(&self, line: &str) -> Vec<String> {
        cues(line)
            .into_iter()
            .filter(|cue| cue.split_whitespace().count() >= self.min_words)
            .map(|cue| self.matching.key(cue))
            .collect()
    }

    /// Drop repeated cue lines, keeping the first occurrence.
    ///
    /// Blank lines pass through and do not count toward the window. Returns
    /// the kept lines and the number dropped.
    pub fn collapse<S: AsRef<str>>(&self, lines: &[S]) -> (Vec<String>, usize) {
        let mut kept = Vec::with_capacity(lines.len());
        let mut recent: VecDeque<Vec<String>> = VecDeque::with_capacity(self.window + 1);
        let mut dropped = 0;

        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                kept.push(line.to_string());
                continue;
            }

            let keys = self.eligible_keys(line);
            let repeated = keys
                .iter()
                .any(|key| recent.iter().any(|previous| previous.contains(key)));

            if repeated {
                dropped += 1;
                continue;
            }

            kept.push(line.to_string());
            recent.push_back(keys);
            if recent.len() > self.window {
                recent.pop_front();
            }
        }

        (kept, dropped)
    }
}
