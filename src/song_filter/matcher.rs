//! `StringMatcher` (song-filter spec §3, §4.2): a small value object that
//! knows how to test a single string, either literally or against a
//! compiled regex, and whether to negate the result.

use std::sync::Arc;

#[cfg(feature = "regex")]
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Anywhere,
    Prefix,
    Full,
}

/// Wraps `Regex` in `Arc` so cloning a matcher (and the node tree it
/// lives in, per spec §3's "clones are deep") never recompiles the
/// pattern; `Regex` itself has no `Clone` cost worth sharing cheaply,
/// but `Arc` keeps clone a pointer copy regardless.
#[derive(Debug, Clone)]
pub struct StringMatcher {
    value: String,
    position: Position,
    fold_case: bool,
    negated: bool,
    #[cfg(feature = "regex")]
    regex: Option<Arc<Regex>>,
}

impl PartialEq for StringMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && self.position == other.position
            && self.fold_case == other.fold_case
            && self.negated == other.negated
            && self.is_regex() == other.is_regex()
    }
}
impl Eq for StringMatcher {}

impl StringMatcher {
    pub fn new(value: String, position: Position, fold_case: bool, negated: bool) -> Self {
        Self {
            value,
            position,
            fold_case,
            negated,
            #[cfg(feature = "regex")]
            regex: None,
        }
    }

    /// Compile `pattern` as a regex matcher. Position is always `Full`
    /// once a regex is attached (spec §3 invariant); `fold_case`
    /// controls the regex's own case-insensitivity flag so the two
    /// never disagree.
    #[cfg(feature = "regex")]
    pub fn new_regex(pattern: &str, fold_case: bool, negated: bool) -> Result<Self, regex::Error> {
        let full_pattern = format!("(?{}s)\\A(?:{})\\z", if fold_case { "i" } else { "-i" }, pattern);
        let regex = Regex::new(&full_pattern)?;
        Ok(Self {
            value: pattern.to_string(),
            position: Position::Full,
            fold_case,
            negated,
            regex: Some(Arc::new(regex)),
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn fold_case(&self) -> bool {
        self.fold_case
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    #[cfg(feature = "regex")]
    pub fn is_regex(&self) -> bool {
        self.regex.is_some()
    }

    #[cfg(not(feature = "regex"))]
    pub fn is_regex(&self) -> bool {
        false
    }

    /// Evaluate against `input` per spec §4.2: regex decides first if
    /// attached, otherwise the fold-cased literal comparison, then XOR
    /// with `negated`.
    pub fn matches(&self, input: &str) -> bool {
        #[cfg(feature = "regex")]
        let raw = if let Some(regex) = &self.regex {
            regex.is_match(input)
        } else if self.fold_case {
            Self::raw_match(self.position, &self.value.to_ascii_lowercase(), &input.to_ascii_lowercase())
        } else {
            Self::raw_match(self.position, &self.value, input)
        };
        #[cfg(not(feature = "regex"))]
        let raw = if self.fold_case {
            Self::raw_match(self.position, &self.value.to_ascii_lowercase(), &input.to_ascii_lowercase())
        } else {
            Self::raw_match(self.position, &self.value, input)
        };
        raw ^ self.negated
    }

    fn raw_match(position: Position, needle: &str, hay: &str) -> bool {
        match position {
            Position::Full => hay == needle,
            Position::Prefix => hay.starts_with(needle),
            Position::Anywhere => hay.contains(needle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anywhere_case_sensitive() {
        let m = StringMatcher::new("Rai".to_string(), Position::Anywhere, false, false);
        assert!(m.matches("Rain"));
        assert!(!m.matches("rain"));
    }

    #[test]
    fn negation_is_xor() {
        let m = StringMatcher::new("björk".to_string(), Position::Full, false, false);
        assert!(!m.matches("Björk"));
        let negated = StringMatcher::new("björk".to_string(), Position::Full, false, true);
        assert!(negated.matches("Björk"));
    }

    #[test]
    fn fold_case_is_ascii_only() {
        let m = StringMatcher::new("BJORK".to_string(), Position::Full, true, false);
        // ASCII-fold only: 'ö' has no ASCII-case counterpart, so it must
        // still mismatch the literal 'o' in the pattern.
        assert!(!m.matches("björk"));
        assert!(m.matches("BJORK".to_ascii_lowercase().as_str()));
    }

    #[cfg(feature = "regex")]
    #[test]
    fn regex_full_match_only() {
        let m = StringMatcher::new_regex("Rai.", false, false).unwrap();
        assert!(m.matches("Rain"));
        assert!(!m.matches("Rainy"));
    }
}
