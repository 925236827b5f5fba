//! `FieldPath` and `PatternSet` — path-addressed pattern overlay
//!
//! Path expressions address nested locations inside `tool_input`:
//!
//! | Expression | Segments |
//! |------------|----------|
//! | `id` | `Key("id")` |
//! | `filters.status` | `Key("filters")`, `Key("status")` |
//! | `associations.types[0].associationTypeId` | `Key`, `Key`, `Index(0)`, `Key` |
//!
//! A [`PatternSet`] keeps expressions as written and parses only the part below
//! a top-level key when that key is compared, so keys that themselves contain
//! `.` stay addressable.

use crate::{InputPattern, MatchError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Mapping key (`.name`).
    Key(String),
    /// Sequence index (`[3]`).
    Index(usize),
}

/// A location inside a tool input, as a list of segments.
///
/// The empty path is the root of whatever value is being compared.
///
/// # Example
///
/// ```
/// use callmatch::{FieldPath, PathSegment};
///
/// let path = FieldPath::parse("types[0].associationTypeId").unwrap();
/// assert_eq!(path.segments()[1], PathSegment::Index(0));
/// assert_eq!(path.to_string(), "types[0].associationTypeId");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A single-key path.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Key(key.into())],
        }
    }

    /// Parse a path expression such as `a.b[0].c`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidPath`] for empty paths, empty key segments,
    /// unclosed or non-numeric brackets, and stray `]`.
    pub fn parse(path: &str) -> Result<Self, MatchError> {
        let invalid = |reason: &str| MatchError::InvalidPath {
            path: path.to_owned(),
            reason: reason.to_owned(),
        };

        if path.is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut segments = Vec::new();
        let mut rest = path;

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                let close = after.find(']').ok_or_else(|| invalid("unclosed `[`"))?;
                let digits = &after[..close];
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("index must be a non-negative integer"));
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| invalid("index out of range"))?;
                segments.push(PathSegment::Index(index));
                rest = &after[close + 1..];
            } else {
                let body = if segments.is_empty() {
                    rest
                } else {
                    rest.strip_prefix('.')
                        .ok_or_else(|| invalid("expected `.` or `[` between segments"))?
                };
                let end = body.find(&['.', '[', ']'][..]).unwrap_or(body.len());
                if end == 0 {
                    return Err(invalid("empty key segment"));
                }
                segments.push(PathSegment::Key(body[..end].to_owned()));
                rest = &body[end..];
            }
        }

        Ok(Self { segments })
    }

    /// The segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The leading key, if the path starts with one.
    #[must_use]
    pub fn first_key(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Key(k)) => Some(k),
            _ => None,
        }
    }

    /// Append a key segment.
    pub fn push_key(&mut self, key: &str) {
        self.segments.push(PathSegment::Key(key.to_owned()));
    }

    /// Append an index segment.
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    /// Remove the last segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// This path with its first segment removed.
    #[must_use]
    pub fn rebased(&self) -> Self {
        Self {
            segments: self.segments.iter().skip(1).cloned().collect(),
        }
    }

    /// This path nested under a top-level key.
    #[must_use]
    pub fn under(&self, key: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(PathSegment::Key(key.to_owned()));
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if i == 0 => f.write_str(k)?,
                PathSegment::Key(k) => write!(f, ".{k}")?,
                PathSegment::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PatternSet
// ═══════════════════════════════════════════════════════════════════════════════

/// Patterns keyed by the path expression as written.
///
/// Lookups work on the raw expression so that a top-level key containing `.` or
/// `[` (e.g. `"properties.email"`) is still addressable. An entry whose whole
/// expression equals a key replaces exact comparison for that key. Entries
/// extending a key with `.` or `[` switch the key's value to deep structural
/// comparison; see [`deep_for`](Self::deep_for).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    entries: BTreeMap<String, InputPattern>,
}

impl PatternSet {
    /// Create an empty pattern set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern at a path expression.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidPath`] if the expression does not parse or does
    /// not start with a key (tool inputs are always mappings at the top).
    pub fn insert(&mut self, path: &str, pattern: InputPattern) -> Result<(), MatchError> {
        let parsed = FieldPath::parse(path)?;
        if parsed.first_key().is_none() {
            return Err(MatchError::InvalidPath {
                path: path.to_owned(),
                reason: "must start with a key".to_owned(),
            });
        }
        self.entries.insert(path.to_owned(), pattern);
        Ok(())
    }

    /// Pattern registered directly on a top-level key.
    #[must_use]
    pub fn direct(&self, key: &str) -> Option<&InputPattern> {
        self.entries.get(key)
    }

    /// Patterns below `key` (`key.x`, `key[0]`, ...), rebased relative to `key`.
    ///
    /// Only the part after `key` is parsed, so `key` itself may contain `.`.
    /// A non-empty result means the key's value is compared structurally.
    #[must_use]
    pub fn deep_for(&self, key: &str) -> NestedPatterns {
        let entries = self
            .entries
            .iter()
            .filter_map(|(raw, pattern)| {
                let rest = raw.strip_prefix(key)?;
                let relative = match rest.strip_prefix('.') {
                    Some(tail) => tail,
                    None if rest.starts_with('[') => rest,
                    None => return None,
                };
                // Suffixes of a path that parsed at insert time parse again.
                let path = FieldPath::parse(relative).ok()?;
                Some((path, pattern.clone()))
            })
            .collect();
        NestedPatterns { entries }
    }

    /// Number of registered patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no pattern is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PatternSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.entries)
    }
}

impl<'de> Deserialize<'de> for PatternSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, InputPattern>::deserialize(deserializer)?;
        let mut set = Self::new();
        for (path, pattern) in raw {
            set.insert(&path, pattern).map_err(serde::de::Error::custom)?;
        }
        Ok(set)
    }
}

/// Patterns below one top-level key, addressed relative to that key's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedPatterns {
    entries: BTreeMap<FieldPath, InputPattern>,
}

impl NestedPatterns {
    /// Pattern registered at exactly this relative path.
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&InputPattern> {
        self.entries.get(path)
    }

    /// Number of patterns below the key.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the key has no nested patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
