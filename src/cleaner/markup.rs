/*!
 * Line-level authoring markup: labels, headers and emphasis.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Markdown heading, blockquote and bullet prefixes
static LINE_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\S\n]*(?:#{1,6}[^\S\n]*|>[^\S\n]*|[-•][^\S\n]+|\*[^\S\n]+)+")
        .expect("Invalid line prefix regex")
});

/// Emphasis and code characters
static EMPHASIS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*+|__+|`+").expect("Invalid emphasis regex")
});

/// Leading `Scene 2:`, `SHOT 3 -`, `[Shot 1]` header label.
///
/// An unbracketed label needs a separator or the end of the line after its
/// number, so narration such as `Scene 2 shows the kitchen` is left alone.
static HEADER_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^[^\S\n]*(?:",
        r"\[[^\S\n]*(?:scene|shot)[^\S\n]*#?\d+[^\S\n]*\]",
        r"|(?:scene|shot)[^\S\n]*#?\d+[^\S\n]*(?:[:.\-–—]|$)",
        r")[^\S\n]*(?:[:.\-–—][^\S\n]*)?",
    ))
    .expect("Invalid header label regex")
});

static MULTI_SPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\S\n]{2,}").expect("Invalid whitespace regex")
});

/// Space left before punctuation by a removed span
static SPACE_BEFORE_PUNCT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\S\n]+([,.!?;:])").expect("Invalid punctuation spacing regex")
});

/// Matches a configured set of `Label:` prefixes
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    regex: Option<Regex>,
}

impl LabelMatcher {
    /// Labels are matched case-insensitively and may carry a
    /// parenthetical, as in `Host (excited):`.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let alternatives: Vec<String> = labels
            .iter()
            .map(|l| l.as_ref().trim())
            .filter(|l| !l.is_empty())
            .map(|l| regex::escape(l).replace(' ', r"[^\S\n]+"))
            .collect();

        if alternatives.is_empty() {
            return Self { regex: None };
        }

        let pattern = format!(
            r"(?i)^[^\S\n]*(?:{})[^\S\n]*(?:\([^)\n]*\)[^\S\n]*)?:[^\S\n]*",
            alternatives.join("|")
        );
        Self {
            regex: Regex::new(&pattern).ok(),
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Remove the label, returning the rest of the line if one was found
    pub fn strip<'a>(&self, line: &'a str) -> Option<&'a str> {
        let re = self.regex.as_ref()?;
        re.find(line).map(|m| &line[m.end()..])
    }
}

/// Remove heading hashes, bullets, blockquote markers and emphasis
pub fn strip_markup(line: &str) -> String {
    let line = LINE_PREFIX_REGEX.replace(line, "");
    EMPHASIS_REGEX.replace_all(&line, "").into_owned()
}

/// Remove a leading scene/shot header label
pub fn strip_header_label(line: &str) -> Option<&str> {
    HEADER_LABEL_REGEX.find(line).map(|m| &line[m.end()..])
}

/// Unwrap a line fully enclosed in matching double quotes
pub fn unwrap_quotes(line: &str) -> &str {
    let trimmed = line.trim();
    for (open, close) in [('"', '"'), ('“', '”')] {
        if let Some(inner) = trimmed.strip_prefix(open).and_then(|s| s.strip_suffix(close)) {
            if !inner.contains(open) && !inner.contains(close) {
                return inner.trim();
            }
        }
    }
    trimmed
}

/// Collapse runs of spaces, pull punctuation back to its word, trim
pub fn tidy_spacing(line: &str) -> String {
    let collapsed = MULTI_SPACE_REGEX.replace_all(line, " ");
    SPACE_BEFORE_PUNCT_REGEX
        .replace_all(&collapsed, "$1")
        .trim()
        .to_string()
}

/// Whether a line still carries anything speakable
pub fn has_speech(line: &str) -> bool {
    line.chars().any(char::is_alphanumeric)
}
