use regex::Regex;
use std::sync::OnceLock;

/// Shape of a merchant ID: four digits, a space, four digits, a space,
/// seven digits. ASCII digits only.
const MID_PATTERN: &str = r"[0-9]{4} [0-9]{4} [0-9]{7}";

fn mid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MID_PATTERN).expect("hard-coded MID pattern compiles"))
}

/// Extracts merchant IDs from raw text.
///
/// The scan is global, left-to-right and non-overlapping; matches are
/// returned verbatim in the order they appear. Extraction is total: any
/// string input yields a (possibly empty) list, never an error.
pub struct MidMatcher {
    pattern: &'static Regex,
}

impl MidMatcher {
    pub fn new() -> Self {
        Self {
            pattern: mid_regex(),
        }
    }

    /// Collects every MID in `raw_text` in order of first character position.
    ///
    /// Digit-group boundaries are exact: a candidate sitting inside a longer
    /// digit run (a fifth digit before the first group, an eighth after the
    /// last) is not a MID and is skipped.
    pub fn extract(&self, raw_text: &str) -> Vec<String> {
        let bytes = raw_text.as_bytes();

        self.pattern
            .find_iter(raw_text)
            .filter(|m| {
                let before = m.start().checked_sub(1).map(|i| bytes[i]);
                let after = bytes.get(m.end()).copied();
                !before.is_some_and(|b| b.is_ascii_digit())
                    && !after.is_some_and(|b| b.is_ascii_digit())
            })
            .map(|m| m.as_str().to_string())
            .collect()
    }

}

impl Default for MidMatcher {
    fn default() -> Self {
        Self::new()
    }
}
