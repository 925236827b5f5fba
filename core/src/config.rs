//! Benchmark case files.
//!
//! A case bundles the expectations for one prompt with the calls an agent run
//! actually made. Harnesses write these as JSON or YAML; both deserialize into
//! [`BenchmarkCase`].
//!
//! ```yaml
//! name: create contact with generated id
//! expected_tool_calls:
//!   - tool_name: hubspot_create_contact
//!     expected_input: { email: jane@example.com, id: "<id>" }
//!     expected_status: success
//!     input_patterns: { id: '^\d+$' }
//! actual_tool_calls:
//!   - tool_name: hubspot_create_contact
//!     tool_input: '{"email": "jane@example.com", "id": "5521"}'
//!     tool_output: { status: success }
//! duration_seconds: 4.2
//! ```

use crate::{
    match_calls, match_calls_with_trace, ActualCall, ExpectedCall, MatchError, MatchOutcome,
    MatchTrace,
};
use serde::{Deserialize, Serialize};

/// One benchmark case: expectations plus the observed calls of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkCase {
    /// Case identifier, used in reports.
    pub name: String,

    /// Free-form description (usually the prompt given to the agent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Calls the agent is expected to make.
    pub expected_tool_calls: Vec<ExpectedCall>,

    /// Calls the agent actually made.
    #[serde(default)]
    pub actual_tool_calls: Vec<ActualCall>,

    /// Wall-clock duration of the agent run, when the harness recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

impl BenchmarkCase {
    /// Parse a case from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidConfig`] if the text is not a valid case.
    pub fn from_json(json: &str) -> Result<Self, MatchError> {
        serde_json::from_str(json).map_err(|e| MatchError::InvalidConfig {
            source: e.to_string(),
        })
    }

    /// Score this case.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MalformedInput`] if a call input cannot be decoded.
    pub fn evaluate(&self) -> Result<MatchOutcome, MatchError> {
        match_calls(&self.expected_tool_calls, &self.actual_tool_calls)
    }

    /// Score this case and keep the pairing trace.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MalformedInput`] if a call input cannot be decoded.
    pub fn evaluate_with_trace(&self) -> Result<MatchTrace, MatchError> {
        match_calls_with_trace(&self.expected_tool_calls, &self.actual_tool_calls)
    }
}
