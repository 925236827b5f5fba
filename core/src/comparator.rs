//! Structural comparator — does one observed call satisfy one expectation?
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. tool name, then status (exact)
//! 2. decode both inputs
//! 3. every non-optional expected key is present
//! 4. no unexpected top-level keys (unless `allow_additional_keys`)
//! 5. per key: deep comparison if sub-path patterns exist, else the direct
//!    pattern, else exact equality
//!
//! The first failing check is reported as a [`Mismatch`] so callers can explain
//! why a candidate was rejected.

use crate::deep::deep_compare;
use crate::value::values_equal;
use crate::{
    ActualCall, ExpectedCall, FieldPath, InputMap, InputPattern, InputSide, MatchError,
    ValueKind,
};
use std::fmt;

/// Why an observed call does not satisfy an expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Tool names differ.
    ToolName {
        /// Expected tool name.
        expected: String,
        /// Observed tool name.
        actual: String,
    },
    /// Output statuses differ.
    Status {
        /// Expected status.
        expected: String,
        /// Observed status.
        actual: String,
    },
    /// A required key is absent from the observed value.
    MissingKey {
        /// Full path of the missing key.
        path: FieldPath,
    },
    /// Top-level keys present in the observed input but not expected.
    UnexpectedKeys {
        /// The unexpected keys, sorted.
        keys: Vec<String>,
    },
    /// A top-level regex pattern was applied to a non-string value.
    NotAString {
        /// Path of the value.
        path: FieldPath,
        /// Kind actually found.
        actual: ValueKind,
    },
    /// A regex pattern did not match at the start of the value.
    PatternMismatch {
        /// Path of the value.
        path: FieldPath,
        /// Pattern source.
        pattern: String,
        /// The value as the pattern saw it.
        value: String,
    },
    /// Expected and observed values have different structural kinds.
    KindMismatch {
        /// Path of the value.
        path: FieldPath,
        /// Expected kind.
        expected: ValueKind,
        /// Observed kind.
        actual: ValueKind,
    },
    /// Sequences have different lengths.
    LengthMismatch {
        /// Path of the sequence.
        path: FieldPath,
        /// Expected length.
        expected: usize,
        /// Observed length.
        actual: usize,
    },
    /// Values differ under exact comparison.
    ValueMismatch {
        /// Path of the value.
        path: FieldPath,
    },
}

impl Mismatch {
    /// Prefix every path in this mismatch with a top-level key.
    #[must_use]
    pub(crate) fn under(self, key: &str) -> Self {
        match self {
            Self::MissingKey { path } => Self::MissingKey {
                path: path.under(key),
            },
            Self::NotAString { path, actual } => Self::NotAString {
                path: path.under(key),
                actual,
            },
            Self::PatternMismatch {
                path,
                pattern,
                value,
            } => Self::PatternMismatch {
                path: path.under(key),
                pattern,
                value,
            },
            Self::KindMismatch {
                path,
                expected,
                actual,
            } => Self::KindMismatch {
                path: path.under(key),
                expected,
                actual,
            },
            Self::LengthMismatch {
                path,
                expected,
                actual,
            } => Self::LengthMismatch {
                path: path.under(key),
                expected,
                actual,
            },
            Self::ValueMismatch { path } => Self::ValueMismatch {
                path: path.under(key),
            },
            other @ (Self::ToolName { .. } | Self::Status { .. } | Self::UnexpectedKeys { .. }) => {
                other
            }
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolName { expected, actual } => {
                write!(f, "tool name is \"{actual}\", expected \"{expected}\"")
            }
            Self::Status { expected, actual } => {
                write!(f, "status is \"{actual}\", expected \"{expected}\"")
            }
            Self::MissingKey { path } => write!(f, "key `{path}` is missing"),
            Self::UnexpectedKeys { keys } => {
                write!(f, "unexpected keys: {}", keys.join(", "))
            }
            Self::NotAString { path, actual } => {
                write!(f, "`{path}` is a {actual}, but its pattern needs a string")
            }
            Self::PatternMismatch {
                path,
                pattern,
                value,
            } => write!(f, "`{path}` value \"{value}\" does not match \"{pattern}\""),
            Self::KindMismatch {
                path,
                expected,
                actual,
            } => write!(f, "`{path}` is a {actual}, expected a {expected}"),
            Self::LengthMismatch {
                path,
                expected,
                actual,
            } => write!(f, "`{path}` has {actual} elements, expected {expected}"),
            Self::ValueMismatch { path } => write!(f, "`{path}` differs from expected value"),
        }
    }
}

/// Result of comparing one expectation with one observed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// The observed call satisfies the expectation.
    Match,
    /// The first failing check.
    Mismatch(Mismatch),
}

impl Comparison {
    /// Returns `true` for [`Comparison::Match`].
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    /// The mismatch, if any.
    #[must_use]
    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Match => None,
            Self::Mismatch(m) => Some(m),
        }
    }
}

impl From<Result<(), Mismatch>> for Comparison {
    fn from(result: Result<(), Mismatch>) -> Self {
        match result {
            Ok(()) => Self::Match,
            Err(m) => Self::Mismatch(m),
        }
    }
}

/// Compare one observed call against one expectation.
///
/// # Errors
///
/// Returns [`MatchError::MalformedInput`] if either input is an encoded string that
/// does not decode to a JSON object. Name and status are checked first, so a
/// malformed input is only reported for a call that could otherwise match.
pub fn compare(expected: &ExpectedCall, actual: &ActualCall) -> Result<Comparison, MatchError> {
    if expected.tool_name != actual.tool_name {
        return Ok(Comparison::Mismatch(Mismatch::ToolName {
            expected: expected.tool_name.clone(),
            actual: actual.tool_name.clone(),
        }));
    }
    if expected.expected_status != actual.tool_output_status {
        return Ok(Comparison::Mismatch(Mismatch::Status {
            expected: expected.expected_status.clone(),
            actual: actual.tool_output_status.clone(),
        }));
    }

    let malformed = |side: InputSide| {
        move |source: String| MatchError::MalformedInput {
            tool_name: expected.tool_name.clone(),
            side,
            source,
        }
    };
    let expected_input = expected
        .expected_input
        .resolve()
        .map_err(malformed(InputSide::Expected))?;
    let actual_input = actual
        .tool_input
        .resolve()
        .map_err(malformed(InputSide::Actual))?;

    Ok(compare_inputs(expected, &expected_input, &actual_input).into())
}

/// [`compare`] reduced to a boolean.
///
/// # Errors
///
/// Same as [`compare`].
pub fn matches(expected: &ExpectedCall, actual: &ActualCall) -> Result<bool, MatchError> {
    compare(expected, actual).map(|c| c.is_match())
}

fn compare_inputs(
    call: &ExpectedCall,
    expected: &InputMap,
    actual: &InputMap,
) -> Result<(), Mismatch> {
    let optional = &call.optional_tool_input_keys;

    if let Some(key) = expected
        .keys()
        .find(|k| !optional.contains(*k) && !actual.contains_key(*k))
    {
        return Err(Mismatch::MissingKey {
            path: FieldPath::key(key.as_str()),
        });
    }

    // Top level only; nested mappings are always lenient.
    if !call.allow_additional_keys {
        let unexpected: Vec<String> = actual
            .keys()
            .filter(|k| !optional.contains(*k) && !expected.contains_key(*k))
            .cloned()
            .collect();
        if !unexpected.is_empty() {
            return Err(Mismatch::UnexpectedKeys { keys: unexpected });
        }
    }

    for (key, expected_value) in expected {
        let Some(actual_value) = actual.get(key) else {
            if optional.contains(key) {
                continue;
            }
            return Err(Mismatch::MissingKey {
                path: FieldPath::key(key.as_str()),
            });
        };

        let deep = call.input_patterns.deep_for(key);
        if !deep.is_empty() {
            deep_compare(expected_value, actual_value, &deep).map_err(|m| m.under(key))?;
            continue;
        }

        match call.input_patterns.direct(key) {
            Some(InputPattern::Wildcard) => {}
            Some(pattern) => {
                let Some(text) = actual_value.as_str() else {
                    return Err(Mismatch::NotAString {
                        path: FieldPath::key(key.as_str()),
                        actual: ValueKind::of(actual_value),
                    });
                };
                if !pattern.matches_str(text) {
                    return Err(Mismatch::PatternMismatch {
                        path: FieldPath::key(key.as_str()),
                        pattern: pattern.as_str().to_owned(),
                        value: text.to_owned(),
                    });
                }
            }
            None => {
                if !values_equal(expected_value, actual_value) {
                    return Err(Mismatch::ValueMismatch {
                        path: FieldPath::key(key.as_str()),
                    });
                }
            }
        }
    }

    Ok(())
}
