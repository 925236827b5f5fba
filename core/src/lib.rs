//! callmatch - Expected-vs-actual tool-call matching for agent benchmarks
//!
//! Decides whether the tool calls observed during an agent run satisfy a
//! declarative list of expected calls. A run passes when every required
//! expected call pairs with a distinct observed call.
//!
//! # Architecture
//!
//! Two layers, both pure (no I/O, inputs are never mutated):
//!
//! - [`match_calls`] — Sequence matcher. Splits expectations into required and
//!   optional groups and pairs each one with the first still-available observed
//!   call that satisfies it (greedy, no backtracking).
//! - [`compare`] / [`matches`] — Structural comparator. Decides whether one
//!   [`ActualCall`] satisfies one [`ExpectedCall`]: tool name, status, key sets,
//!   path-addressed [`InputPattern`]s and exact value equality.
//!
//! # Key Design Insights
//!
//! 1. **Bag pairing**: expected order only matters for diagnostics. Observed calls
//!    are consumed from a pool of tombstoned slots, so indices stay stable.
//!
//! 2. **Wildcard is not absence**: [`InputPattern::Wildcard`] still requires the key
//!    to be present. A key without any registered pattern falls back to exact
//!    equality (or deep comparison when sub-path patterns exist).
//!
//! 3. **Prefix regex semantics**: a pattern matches when it matches at the start of
//!    the value. `^\d+$` is a full match, `\d+` accepts `"12x"`.
//!
//! 4. **Strict top, lenient below**: unexpected keys fail only at the top level of
//!    `tool_input`. Nested mappings tolerate extra keys.
//!
//! # Example
//!
//! ```
//! use callmatch::prelude::*;
//! use serde_json::json;
//!
//! let expected = vec![
//!     ExpectedCall::new("create_contact", json!({"email": "a@b.c", "id": "<id>"}), "success")
//!         .pattern("id", r"^\d+$")
//!         .unwrap(),
//!     ExpectedCall::new("send_email", json!({"to": "a@b.c"}), "success").optional(),
//! ];
//!
//! let actual = vec![ActualCall::new(
//!     "create_contact",
//!     json!({"email": "a@b.c", "id": "1042"}),
//!     "success",
//! )];
//!
//! let outcome = match_calls(&expected, &actual).unwrap();
//! assert!(outcome.success);
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod call;
mod comparator;
mod config;
mod deep;
mod path;
mod pattern;
mod report;
mod sequence;
mod trace;
mod value;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Data model
pub use call::{ActualCall, ExpectedCall};
pub use path::{FieldPath, NestedPatterns, PathSegment, PatternSet};
pub use pattern::InputPattern;
pub use value::{InputMap, InputSide, ToolInput, ValueKind};

// Matching
pub use comparator::{compare, matches, Comparison, Mismatch};
pub use sequence::{match_calls, match_calls_with_trace, MatchOutcome};

// Trace types
pub use trace::{MatchTrace, Rejection, Resolution, TemplateStep};

// Case files and reporting
pub use config::BenchmarkCase;
pub use report::{BenchmarkReport, CaseResult, DurationStats};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use callmatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Matching
        compare,
        match_calls,
        match_calls_with_trace,
        matches,
        // Data model
        ActualCall,
        // Case files
        BenchmarkCase,
        BenchmarkReport,
        CaseResult,
        Comparison,
        ExpectedCall,
        FieldPath,
        InputPattern,
        // Errors
        MatchError,
        MatchOutcome,
        MatchTrace,
        Mismatch,
        PatternSet,
        ToolInput,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Wire spelling of [`InputPattern::Wildcard`].
///
/// `*` on its own is not a valid regex, so the sentinel can never shadow a real pattern.
pub const WILDCARD: &str = "*";

/// Maximum length for regex patterns in `input_patterns`.
///
/// Regex compilation is expensive even with the linear-time Rust `regex` crate,
/// and patterns come from user-authored benchmark files.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from building expectations or parsing call inputs.
///
/// A failed comparison is NOT an error: it is reported as a [`Mismatch`] or an
/// unsuccessful [`MatchOutcome`]. These variants mean the inputs themselves are
/// unusable and the benchmark case cannot be scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// A `tool_input` (or `expected_input`) string is not a JSON object.
    MalformedInput {
        /// Tool whose input failed to parse.
        tool_name: String,
        /// Which side of the comparison carried the bad input.
        side: InputSide,
        /// The underlying parse error message.
        source: String,
    },
    /// A regex pattern failed to compile.
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        source: String,
    },
    /// A regex pattern exceeds [`MAX_REGEX_PATTERN_LENGTH`].
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// A path expression in `input_patterns` is not well-formed.
    InvalidPath {
        /// The offending path expression.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A benchmark case or call record failed to deserialize.
    InvalidConfig {
        /// The underlying error message.
        source: String,
    },
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput {
                tool_name,
                side,
                source,
            } => {
                write!(
                    f,
                    "malformed {side} input for tool \"{tool_name}\": {source}"
                )
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid pattern \"{pattern}\": {source}")
            }
            Self::PatternTooLong { len, max } => {
                write!(f, "pattern length is {len}, but maximum allowed is {max}")
            }
            Self::InvalidPath { path, reason } => {
                write!(f, "invalid path expression \"{path}\": {reason}")
            }
            Self::InvalidConfig { source } => {
                write!(f, "invalid config: {source}")
            }
        }
    }
}

impl std::error::Error for MatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_tool_and_side() {
        let err = MatchError::MalformedInput {
            tool_name: "search".into(),
            side: InputSide::Actual,
            source: "expected value at line 1 column 1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("search"));
        assert!(msg.contains("actual"));
    }

    #[test]
    fn public_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExpectedCall>();
        assert_send_sync::<ActualCall>();
        assert_send_sync::<MatchOutcome>();
        assert_send_sync::<MatchTrace>();
        assert_send_sync::<MatchError>();
    }
}
