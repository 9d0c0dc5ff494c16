/*!
 * Span detectors.
 *
 * Each detector recognizes one `SpanKind`. The protector runs them in
 * precedence order over a shadow of the text in which spans claimed by
 * earlier detectors are blanked out, so a detector only needs to know how to
 * find its own construct.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Debug;
use std::ops::Range;

use super::SpanKind;

/// Marker phrase followed by a quoted prompt closed by the same quote character
static IMAGE_PROMPT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)AI[\s_\-]*IMAGE[\s_\-]*PROMPT[\s:*]*(?:"[^"]*"|'[^']*'|“[^”]*”)"#)
        .expect("Invalid image prompt regex")
});

/// Marker phrase followed by an opening quote, used to spot unterminated prompts
static IMAGE_PROMPT_OPENER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)AI[\s_\-]*IMAGE[\s_\-]*PROMPT[\s:*]*["'“]"#)
        .expect("Invalid image prompt opener regex")
});

/// Recognizes one kind of protected span
pub trait SpanDetector: Send + Sync + Debug {
    /// Kind of span this detector produces
    fn kind(&self) -> SpanKind;

    /// Byte ranges of every span in `text`, in document order, non-overlapping
    fn find(&self, text: &str) -> Vec<Range<usize>>;

    /// Byte offsets of openers that never close
    ///
    /// Called on the shadow left after every detector has claimed its spans.
    fn find_unterminated(&self, text: &str) -> Vec<usize>;

    /// Spans nested inside `outer`, a span this detector found but could not claim
    fn find_nested(&self, _text: &str, _outer: Range<usize>) -> Vec<Range<usize>> {
        Vec::new()
    }
}

/// `AI IMAGE PROMPT: "..."` spans
#[derive(Debug, Default, Clone)]
pub struct ImagePromptDetector;

impl SpanDetector for ImagePromptDetector {
    fn kind(&self) -> SpanKind {
        SpanKind::ImagePrompt
    }

    fn find(&self, text: &str) -> Vec<Range<usize>> {
        IMAGE_PROMPT_REGEX.find_iter(text).map(|m| m.range()).collect()
    }

    fn find_unterminated(&self, text: &str) -> Vec<usize> {
        IMAGE_PROMPT_OPENER_REGEX.find_iter(text).map(|m| m.start()).collect()
    }
}

/// Balanced single-line delimiter pair such as `[...]` or `(...)`
///
/// Nested pairs are absorbed into the outermost pair. An opener whose
/// balancing closer is not found before the end of the line is skipped, and
/// scanning resumes at the next character.
#[derive(Debug, Clone)]
pub struct DelimitedDetector {
    kind: SpanKind,
    open: char,
    close: char,
}

impl DelimitedDetector {
    pub fn new(kind: SpanKind, open: char, close: char) -> Self {
        Self { kind, open, close }
    }

    /// `[CAMERA: Close-up]` style stage directions
    pub fn brackets() -> Self {
        Self::new(SpanKind::Bracketed, '[', ']')
    }

    /// `(whispering)` style voice notes
    pub fn parentheses() -> Self {
        Self::new(SpanKind::Parenthetical, '(', ')')
    }

    fn scan(&self, text: &str) -> (Vec<Range<usize>>, Vec<usize>) {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut spans = Vec::new();
        let mut unterminated = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let (start, c) = chars[i];
            if c != self.open {
                i += 1;
                continue;
            }

            match self.balance_from(&chars, i) {
                Some((last, end)) => {
                    spans.push(start..end);
                    i = last + 1;
                }
                None => {
                    unterminated.push(start);
                    i += 1;
                }
            }
        }

        (spans, unterminated)
    }

    /// Index of the balancing closer and the byte offset just past it
    fn balance_from(&self, chars: &[(usize, char)], from: usize) -> Option<(usize, usize)> {
        let mut depth = 0usize;
        for (j, &(pos, ch)) in chars.iter().enumerate().skip(from) {
            if ch == '\n' {
                return None;
            }
            if ch == self.open {
                depth += 1;
            } else if ch == self.close {
                depth -= 1;
                if depth == 0 {
                    return Some((j, pos + ch.len_utf8()));
                }
            }
        }
        None
    }
}

impl SpanDetector for DelimitedDetector {
    fn kind(&self) -> SpanKind {
        self.kind
    }

    fn find(&self, text: &str) -> Vec<Range<usize>> {
        self.scan(text).0
    }

    fn find_unterminated(&self, text: &str) -> Vec<usize> {
        self.scan(text).1
    }

    fn find_nested(&self, text: &str, outer: Range<usize>) -> Vec<Range<usize>> {
        let inner = outer.start + self.open.len_utf8()..outer.end - self.close.len_utf8();
        self.scan(&text[inner.clone()])
            .0
            .into_iter()
            .map(|range| range.start + inner.start..range.end + inner.start)
            .collect()
    }
}

/// Replace the bytes of each range with spaces, keeping newlines and length.
///
/// Ranges must fall on char boundaries. Every byte of a multi-byte char is
/// replaced, so the result stays valid UTF-8 with identical offsets.
pub fn blank_out(text: &str, ranges: &[Range<usize>]) -> String {
    let mut bytes = text.as_bytes().to_vec();
    for range in ranges {
        for b in &mut bytes[range.clone()] {
            if *b != b'\n' {
                *b = b' ';
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
