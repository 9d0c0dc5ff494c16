/*!
 * Shot and word count estimation for raw scripts.
 *
 * Shot count trusts whichever structural signal is most prevalent in the
 * document. With no signal at all it falls back to grouping non-empty lines.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app_config::EstimatorConfig;
use crate::cleaner::timestamps;

/// `[Shot 3]`, `[SHOT #3: Close-up]`
static BRACKETED_SHOT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[[^\S\n]*shot[^\S\n]*#?\d+[^\]\n]*\]").expect("Invalid bracketed shot regex")
});

/// `Shot 3:` / `**Shot 3 -** ...` at the start of a line
static SHOT_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[^\S\n]*[#>*_\-]*[^\S\n]*shot[^\S\n]*#?\d+[*_]*[^\S\n]*[:.\-–—]")
        .expect("Invalid shot label regex")
});

/// Which heuristic produced the shot count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotSignal {
    BracketedShot,
    ShotLabel,
    TimestampRange,
    LineHeuristic,
    Empty,
}

/// Structural metrics of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureEstimate {
    pub shot_count: usize,
    pub word_count: usize,
    pub signal: ShotSignal,
}

impl StructureEstimate {
    /// Spoken duration at the given pace, rounded up to a whole second
    pub fn estimated_speech_secs(&self, words_per_minute: u32) -> u64 {
        if words_per_minute == 0 {
            return 0;
        }
        (self.word_count as u64 * 60).div_ceil(u64::from(words_per_minute))
    }
}

/// Estimates shot and word counts
#[derive(Debug, Clone)]
pub struct StructureEstimator {
    lines_per_shot: usize,
}

impl StructureEstimator {
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            lines_per_shot: config.lines_per_shot.max(1),
        }
    }

    pub fn estimate(&self, raw: &str) -> StructureEstimate {
        if raw.trim().is_empty() {
            return StructureEstimate {
                shot_count: 0,
                word_count: 0,
                signal: ShotSignal::Empty,
            };
        }

        let (shot_count, signal) = self.shot_count(raw);
        let word_count = word_count(raw);
        debug!(
            "Estimated {} shot(s) via {:?}, {} word(s)",
            shot_count, signal, word_count
        );

        StructureEstimate {
            shot_count,
            word_count,
            signal,
        }
    }

    fn shot_count(&self, raw: &str) -> (usize, ShotSignal) {
        let candidates = [
            (BRACKETED_SHOT_REGEX.find_iter(raw).count(), ShotSignal::BracketedShot),
            (SHOT_LABEL_REGEX.find_iter(raw).count(), ShotSignal::ShotLabel),
            (timestamps::count_time_ranges(raw), ShotSignal::TimestampRange),
        ];

        // Earliest pattern wins a tie
        let best = candidates
            .iter()
            .fold(None::<(usize, ShotSignal)>, |best, &(count, signal)| match best {
                Some((top, _)) if top >= count => best,
                _ => Some((count, signal)),
            });

        match best {
            Some((count, signal)) if count > 0 => (count, signal),
            _ => {
                let lines = raw.lines().filter(|line| !line.trim().is_empty()).count();
                ((lines / self.lines_per_shot).max(1), ShotSignal::LineHeuristic)
            }
        }
    }
}

impl Default for StructureEstimator {
    fn default() -> Self {
        Self::new(&EstimatorConfig::default())
    }
}

/// Whitespace-separated words once time ranges are removed
pub fn word_count(raw: &str) -> usize {
    let (text, _) = timestamps::strip_time_ranges(raw);
    text.split_whitespace().count()
}

/// Estimate with the default settings
pub fn estimate(raw: &str) -> StructureEstimate {
    StructureEstimator::default().estimate(raw)
}
