/*!
 * Time-range grammar shared by the cleaner and the estimator.
 *
 * A range is `H:MM - H:MM` (seconds optional on either side), with `-`, `–`
 * or `—` between the two times and optional spaces around the dash. It may
 * be wrapped in `(...)` or `[...]`, in which case the wrapper goes with it.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// One clock time, `0:30`, `12:05` or `1:02:03`
const TIME: &str = r"\d{1,2}:\d{2}(?::\d{2})?";

/// Whitespace other than a newline
const SPACE: &str = r"[^\S\n]*";

/// Bare time range, used for counting
static TIME_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b{TIME}{SPACE}[-–—]{SPACE}{TIME}\b")).expect("Invalid time range regex")
});

/// Time range with its optional wrapper, a trailing colon and the spaces after it
static TIME_RANGE_PHRASE_REGEX: Lazy<Regex> = Lazy::new(|| {
    let range = format!(r"{TIME}{SPACE}[-–—]{SPACE}{TIME}");
    Regex::new(&format!(
        r"(?:\({SPACE}{range}{SPACE}\)|\[{SPACE}{range}{SPACE}\]|\b{range}\b)(?:{SPACE}:)?{SPACE}"
    ))
    .expect("Invalid time range phrase regex")
});

/// Number of time ranges in the text
pub fn count_time_ranges(text: &str) -> usize {
    TIME_RANGE_REGEX.find_iter(text).count()
}

/// Remove every time range, wrapper included. Returns the text and how many went.
pub fn strip_time_ranges(text: &str) -> (String, usize) {
    let count = TIME_RANGE_PHRASE_REGEX.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    (TIME_RANGE_PHRASE_REGEX.replace_all(text, "").into_owned(), count)
}
