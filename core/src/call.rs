//! `ActualCall` and `ExpectedCall` — the two record types being matched
//!
//! Both deserialize from the JSON captured by agent benchmark harnesses. The
//! output status is accepted either flat (`tool_output_status`, `expected_status`)
//! or nested the way harness captures store it (`tool_output: { status }`).

use crate::{InputPattern, MatchError, PatternSet, ToolInput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A tool invocation observed during an agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawActualCall")]
pub struct ActualCall {
    /// Name of the invoked tool.
    pub tool_name: String,
    /// Arguments as captured (decoded or JSON-encoded).
    pub tool_input: ToolInput,
    /// Status reported by the tool execution (e.g. `"success"`).
    pub tool_output_status: String,
}

impl ActualCall {
    /// Create an observed call record.
    pub fn new(
        tool_name: impl Into<String>,
        tool_input: impl Into<ToolInput>,
        tool_output_status: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_input: tool_input.into(),
            tool_output_status: tool_output_status.into(),
        }
    }
}

/// A template describing a call the agent is expected to make.
///
/// # Example
///
/// ```
/// use callmatch::ExpectedCall;
/// use serde_json::json;
///
/// let call: ExpectedCall = serde_json::from_value(json!({
///     "tool_name": "hubspot_create_contact",
///     "tool_input": {"email": "jane@example.com", "id": "<id>"},
///     "tool_output": {"status": "success"},
///     "optional_tool_input_keys": ["phone"],
///     "input_patterns": {"id": "*"}
/// }))
/// .unwrap();
///
/// assert_eq!(call.expected_status, "success");
/// assert!(!call.optional);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExpectedCall")]
pub struct ExpectedCall {
    /// Tool name; must equal the observed call's name exactly.
    pub tool_name: String,
    /// Expected arguments.
    pub expected_input: ToolInput,
    /// Expected execution status; compared exactly.
    pub expected_status: String,
    /// When `true`, no observed call is required for this template.
    pub optional: bool,
    /// When `false`, top-level observed keys not listed anywhere cause a mismatch.
    pub allow_additional_keys: bool,
    /// Keys of `expected_input` that may be absent from the observed input.
    pub optional_tool_input_keys: BTreeSet<String>,
    /// Path-addressed patterns relaxing value comparison.
    pub input_patterns: PatternSet,
    /// Accepted for format compatibility. Pairing is unordered for every call.
    pub any_order: bool,
}

impl ExpectedCall {
    /// Create a required expectation with exact-match semantics.
    pub fn new(
        tool_name: impl Into<String>,
        expected_input: impl Into<ToolInput>,
        expected_status: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            expected_input: expected_input.into(),
            expected_status: expected_status.into(),
            optional: false,
            allow_additional_keys: false,
            optional_tool_input_keys: BTreeSet::new(),
            input_patterns: PatternSet::new(),
            any_order: false,
        }
    }

    /// Mark this expectation optional (builder pattern).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Tolerate unexpected top-level keys in the observed input.
    #[must_use]
    pub fn allow_additional_keys(mut self) -> Self {
        self.allow_additional_keys = true;
        self
    }

    /// Allow `key` to be missing from the observed input.
    #[must_use]
    pub fn optional_key(mut self, key: impl Into<String>) -> Self {
        self.optional_tool_input_keys.insert(key.into());
        self
    }

    /// Set the inert `any_order` flag.
    #[must_use]
    pub fn any_order(mut self) -> Self {
        self.any_order = true;
        self
    }

    /// Register a pattern (regex or [`WILDCARD`](crate::WILDCARD)) at a path.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidPath`], [`MatchError::InvalidPattern`] or
    /// [`MatchError::PatternTooLong`].
    pub fn pattern(mut self, path: &str, pattern: &str) -> Result<Self, MatchError> {
        self.input_patterns
            .insert(path, InputPattern::parse(pattern)?)?;
        Ok(self)
    }

    /// Register a wildcard at a path.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidPath`] if the path does not parse.
    pub fn wildcard(mut self, path: &str) -> Result<Self, MatchError> {
        self.input_patterns.insert(path, InputPattern::Wildcard)?;
        Ok(self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Wire forms
// ═══════════════════════════════════════════════════════════════════════════════

/// `tool_output` object as stored by harness captures. Only `status` is read.
#[derive(Debug, Deserialize)]
struct ToolOutput {
    status: String,
}

fn resolve_status(
    flat: Option<String>,
    nested: Option<ToolOutput>,
    field: &str,
    tool_name: &str,
) -> Result<String, MatchError> {
    flat.or_else(|| nested.map(|o| o.status))
        .ok_or_else(|| MatchError::InvalidConfig {
            source: format!(
                "call to \"{tool_name}\" has neither `{field}` nor `tool_output.status`"
            ),
        })
}

#[derive(Debug, Deserialize)]
struct RawActualCall {
    tool_name: String,
    #[serde(default)]
    tool_input: ToolInput,
    #[serde(default)]
    tool_output_status: Option<String>,
    #[serde(default)]
    tool_output: Option<ToolOutput>,
}

impl TryFrom<RawActualCall> for ActualCall {
    type Error = MatchError;

    fn try_from(raw: RawActualCall) -> Result<Self, Self::Error> {
        let status = resolve_status(
            raw.tool_output_status,
            raw.tool_output,
            "tool_output_status",
            &raw.tool_name,
        )?;
        Ok(Self {
            tool_name: raw.tool_name,
            tool_input: raw.tool_input,
            tool_output_status: status,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawExpectedCall {
    tool_name: String,
    #[serde(default, alias = "tool_input")]
    expected_input: ToolInput,
    #[serde(default)]
    expected_status: Option<String>,
    #[serde(default)]
    tool_output: Option<ToolOutput>,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    allow_additional_keys: bool,
    #[serde(default)]
    optional_tool_input_keys: BTreeSet<String>,
    #[serde(default)]
    input_patterns: PatternSet,
    #[serde(default)]
    any_order: bool,
}

impl TryFrom<RawExpectedCall> for ExpectedCall {
    type Error = MatchError;

    fn try_from(raw: RawExpectedCall) -> Result<Self, Self::Error> {
        let status = resolve_status(
            raw.expected_status,
            raw.tool_output,
            "expected_status",
            &raw.tool_name,
        )?;
        Ok(Self {
            tool_name: raw.tool_name,
            expected_input: raw.expected_input,
            expected_status: status,
            optional: raw.optional,
            allow_additional_keys: raw.allow_additional_keys,
            optional_tool_input_keys: raw.optional_tool_input_keys,
            input_patterns: raw.input_patterns,
            any_order: raw.any_order,
        })
    }
}
