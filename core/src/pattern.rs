//! `InputPattern` — Relaxed comparison for a single field
//!
//! A pattern replaces exact equality for the value at one path. Two forms:
//!
//! - [`InputPattern::Wildcard`] — any value is accepted (the key must still exist)
//! - [`InputPattern::Regex`] — the value must match the regex *at its start*
//!
//! # Prefix semantics
//!
//! A regex succeeds when some match begins at offset 0. It does not need to consume
//! the whole value, so `\d+` accepts `"12345x"`. Anchor both ends (`^\d+$`) for a
//! full match.

use crate::{MatchError, MAX_REGEX_PATTERN_LENGTH, WILDCARD};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A field-level pattern from `input_patterns`.
///
/// # Example
///
/// ```
/// use callmatch::InputPattern;
///
/// let anchored = InputPattern::parse(r"^[0-9]+$").unwrap();
/// assert!(anchored.matches_str("12345"));
/// assert!(!anchored.matches_str("12345x"));
///
/// let loose = InputPattern::parse("[0-9]+").unwrap();
/// assert!(loose.matches_str("12345x"));
/// assert!(!loose.matches_str("x12345"));
///
/// assert!(InputPattern::parse("*").unwrap().is_wildcard());
/// ```
#[derive(Debug, Clone)]
pub enum InputPattern {
    /// Skip the value check entirely.
    Wildcard,
    /// Regular expression (Rust `regex` crate syntax, linear time), prefix-matched.
    Regex(regex::Regex),
}

impl InputPattern {
    /// Parse the wire form: [`WILDCARD`] or a regex.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::PatternTooLong`] or [`MatchError::InvalidPattern`]
    /// if the regex cannot be used.
    pub fn parse(pattern: &str) -> Result<Self, MatchError> {
        if pattern == WILDCARD {
            Ok(Self::Wildcard)
        } else {
            Self::regex(pattern)
        }
    }

    /// Compile a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::PatternTooLong`] if the pattern exceeds
    /// [`MAX_REGEX_PATTERN_LENGTH`], or [`MatchError::InvalidPattern`] if it fails
    /// to compile.
    pub fn regex(pattern: &str) -> Result<Self, MatchError> {
        if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(MatchError::PatternTooLong {
                len: pattern.len(),
                max: MAX_REGEX_PATTERN_LENGTH,
            });
        }
        regex::Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| MatchError::InvalidPattern {
                pattern: pattern.to_owned(),
                source: e.to_string(),
            })
    }

    /// Returns `true` for [`InputPattern::Wildcard`].
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// Check a string value.
    ///
    /// Leftmost-first search reports the earliest starting match, so a match
    /// exists at offset 0 exactly when the leftmost one starts there.
    #[must_use]
    pub fn matches_str(&self, value: &str) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Regex(re) => re.find(value).is_some_and(|m| m.start() == 0),
        }
    }

    /// The wire form of this pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wildcard => WILDCARD,
            Self::Regex(re) => re.as_str(),
        }
    }
}

impl PartialEq for InputPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for InputPattern {}

impl fmt::Display for InputPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("Wildcard"),
            Self::Regex(re) => write!(f, "Regex(\"{}\")", re.as_str()),
        }
    }
}

impl Serialize for InputPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InputPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
