//! callmatch-test: Builders and conformance fixtures
//!
//! Provides shorthand for writing matcher tests: a [`Transcript`] that records
//! observed calls the way an agent run would, and [`expect`] for templates with
//! the common `"success"` status. The `fixtures` feature adds a YAML fixture
//! runner used by the conformance suite.
//!
//! # Example
//!
//! ```
//! use callmatch_test::prelude::*;
//! use serde_json::json;
//!
//! let run = Transcript::new()
//!     .call("search", json!({"q": "rust"}))
//!     .failed_call("fetch", json!({"url": "https://example.com"}));
//!
//! let expected = vec![expect("search", json!({"q": "rust"}))];
//! assert!(run.evaluate(&expected).unwrap().success);
//! ```

use callmatch::prelude::*;
use callmatch::ToolInput;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Status recorded for calls that completed normally.
pub const SUCCESS: &str = "success";

/// Status recorded by [`Transcript::failed_call`].
pub const ERROR: &str = "error";

/// Observed calls of one agent run, in call order.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    calls: Vec<ActualCall>,
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful call (builder pattern).
    #[must_use]
    pub fn call(self, tool_name: &str, input: impl Into<ToolInput>) -> Self {
        self.call_with_status(tool_name, input, SUCCESS)
    }

    /// Record a call whose tool reported an error.
    #[must_use]
    pub fn failed_call(self, tool_name: &str, input: impl Into<ToolInput>) -> Self {
        self.call_with_status(tool_name, input, ERROR)
    }

    /// Record a call with an explicit status.
    #[must_use]
    pub fn call_with_status(
        mut self,
        tool_name: &str,
        input: impl Into<ToolInput>,
        status: &str,
    ) -> Self {
        self.calls.push(ActualCall::new(tool_name, input, status));
        self
    }

    /// The recorded calls.
    #[must_use]
    pub fn calls(&self) -> &[ActualCall] {
        &self.calls
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Match `expected` against the recorded calls.
    ///
    /// # Errors
    ///
    /// Propagates [`MatchError::MalformedInput`] from the matcher.
    pub fn evaluate(&self, expected: &[ExpectedCall]) -> Result<MatchOutcome, MatchError> {
        match_calls(expected, &self.calls)
    }

    /// Consume the transcript, returning the calls.
    #[must_use]
    pub fn into_calls(self) -> Vec<ActualCall> {
        self.calls
    }
}

/// Required template expecting [`SUCCESS`].
#[must_use]
pub fn expect(tool_name: &str, input: impl Into<ToolInput>) -> ExpectedCall {
    ExpectedCall::new(tool_name, input, SUCCESS)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{expect, Transcript, ERROR, SUCCESS};
    pub use callmatch::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transcript_records_in_order() {
        let run = Transcript::new()
            .call("a", json!({}))
            .failed_call("b", json!({}))
            .call_with_status("c", json!({}), "timeout");

        assert_eq!(run.len(), 3);
        let statuses: Vec<_> = run
            .calls()
            .iter()
            .map(|c| c.tool_output_status.as_str())
            .collect();
        assert_eq!(statuses, ["success", "error", "timeout"]);
    }

    #[test]
    fn failed_call_does_not_satisfy_success_template() {
        let run = Transcript::new().failed_call("search", json!({"q": "rust"}));
        let outcome = run.evaluate(&[expect("search", json!({"q": "rust"}))]).unwrap();
        assert!(!outcome.success);
    }

    #[test]
    fn empty_transcript() {
        let run = Transcript::new();
        assert!(run.is_empty());
        assert!(run.evaluate(&[]).unwrap().success);
        assert!(run.into_calls().is_empty());
    }

    #[test]
    fn encoded_input_is_accepted() {
        let run = Transcript::new().call("search", r#"{"q": "rust"}"#);
        assert!(run
            .evaluate(&[expect("search", json!({"q": "rust"}))])
            .unwrap()
            .success);
    }
}
