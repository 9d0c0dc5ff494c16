/*!
 * Placeholder tokens substituted for protected spans.
 *
 * A placeholder looks like `§§BR_3§§`. Translation engines tend to leave the
 * section sign alone, but they do lower-case tags, pad tokens with spaces and
 * occasionally drop one of the two delimiters. Recognition is therefore
 * lenient about everything except the numeric index.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;

use super::SpanKind;

/// Delimiter wrapped around every placeholder
pub const PLACEHOLDER_DELIMITER: &str = "§§";

/// Lenient placeholder pattern, up to and including the first closing `§`.
///
/// `[^\S\n]` is whitespace other than a newline, so a token never spans lines.
/// The second closing `§` is claimed afterwards by `find_placeholders`, since
/// it may just as well be the opener of a neighbouring token.
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)§(?:[^\S\n]*§)?[^\S\n]*(IMG|BR|VO)[^\S\n]*[_\-]?[^\S\n]*(\d+)[^\S\n]*§")
        .expect("Invalid placeholder regex")
});

/// Optional second closing delimiter right after a token
static TRAILING_DELIMITER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\S\n]*§").expect("Invalid trailing delimiter regex")
});

/// Build the canonical placeholder for a span
pub fn format_placeholder(kind: SpanKind, index: usize) -> String {
    format!("{PLACEHOLDER_DELIMITER}{}_{index}{PLACEHOLDER_DELIMITER}", kind.tag())
}

/// A placeholder-shaped token found in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderToken {
    /// Byte range of the whole token, delimiters and drift included
    pub range: Range<usize>,
    /// Kind named by the tag, if the tag is one we know
    pub kind: Option<SpanKind>,
    /// Numeric identity of the placeholder
    pub index: usize,
}

/// Find every placeholder-shaped token with a parseable index, in order.
///
/// A `§` after a token's first closer joins that token unless it opens the
/// next one, so `§BR_0§§VO_1§` yields two tokens.
pub fn find_placeholders(text: &str) -> Vec<PlaceholderToken> {
    let mut tokens: Vec<PlaceholderToken> = PLACEHOLDER_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let index = caps.get(2)?.as_str().parse().ok()?;
            Some(PlaceholderToken {
                range: whole.range(),
                kind: caps.get(1).and_then(|m| SpanKind::from_tag(m.as_str())),
                index,
            })
        })
        .collect();

    for i in 0..tokens.len() {
        let end = tokens[i].range.end;
        let next_start = tokens.get(i + 1).map_or(text.len(), |next| next.range.start);
        if let Some(m) = TRAILING_DELIMITER_REGEX.find(&text[end..next_start]) {
            tokens[i].range.end = end + m.end();
        }
    }
    tokens
}

/// Index for the first of `count` new placeholders.
///
/// Numbers above the largest index in `taken` that still leaves room for
/// `count` indices, so new placeholders never collide with existing ones.
pub fn first_free_index(taken: &BTreeSet<usize>, count: usize) -> usize {
    let fits = |start: usize| {
        start
            .checked_add(count)
            .is_some_and(|end| taken.range(start..end).next().is_none())
    };
    taken
        .iter()
        .rev()
        .filter_map(|index| index.checked_add(1))
        .find(|&start| fits(start))
        .unwrap_or(0)
}
