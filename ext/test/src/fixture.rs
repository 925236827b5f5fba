//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them through the sequence matcher. Each fixture
//! holds cases; each case lists expected and observed calls in the same wire
//! format benchmark harnesses use, plus the verdict the matcher must reach.
//!
//! ```yaml
//! name: optional calls
//! description: unseen optional templates never fail a run
//! cases:
//!   - name: optional absent
//!     expected:
//!       - { tool_name: search, expected_input: { q: rust }, expected_status: success }
//!       - { tool_name: summarize, expected_status: success, optional: true }
//!     actual:
//!       - { tool_name: search, tool_input: { q: rust }, tool_output_status: success }
//!     expect: pass
//! ```

use callmatch::prelude::*;
use serde::Deserialize;
use std::fmt;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub expected: Vec<ExpectedCall>,
    #[serde(default)]
    pub actual: Vec<ActualCall>,
    pub expect: Verdict,
    /// Substring the outcome reason (or error message) must contain.
    #[serde(default)]
    pub reason_contains: Option<String>,
}

/// What the matcher should conclude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// `success: true`
    Pass,
    /// `success: false`
    Fail,
    /// The matcher returned an error.
    Error,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("pass"),
            Self::Fail => f.write_str("fail"),
            Self::Error => f.write_str("error"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Verdict,
    pub actual: Verdict,
    /// Outcome reason or error message.
    pub detail: String,
}

impl TestCase {
    /// Run the matcher and compare against the declared verdict.
    pub fn run(&self) -> CaseResult {
        let (actual, detail) = match match_calls(&self.expected, &self.actual) {
            Ok(outcome) if outcome.success => (Verdict::Pass, outcome.reason),
            Ok(outcome) => (Verdict::Fail, outcome.reason),
            Err(err) => (Verdict::Error, err.to_string()),
        };
        let reason_ok = self
            .reason_contains
            .as_deref()
            .map_or(true, |needle| detail.contains(needle));

        CaseResult {
            case_name: self.name.clone(),
            passed: actual == self.expect && reason_ok,
            expected: self.expect,
            actual,
            detail,
        }
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results
    pub fn run(&self) -> Vec<CaseResult> {
        self.cases.iter().map(TestCase::run).collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        for (case, result) in self.cases.iter().zip(self.run()) {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}{}, got {} ({})",
                self.name,
                result.case_name,
                result.expected,
                case.reason_contains
                    .as_deref()
                    .map(|r| format!(" containing {r:?}"))
                    .unwrap_or_default(),
                result.actual,
                result.detail
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: smoke
cases:
  - name: pass
    expected:
      - { tool_name: a, expected_input: { x: 1 }, expected_status: success }
    actual:
      - { tool_name: a, tool_input: { x: 1.0 }, tool_output_status: success }
    expect: pass
  - name: count
    expected:
      - { tool_name: a, expected_status: success }
    expect: fail
    reason_contains: "got 0 actual calls"
---
name: errors
cases:
  - name: malformed
    expected:
      - { tool_name: a, expected_input: { x: 1 }, expected_status: success }
    actual:
      - { tool_name: a, tool_input: "[1, 2]", tool_output_status: success }
    expect: error
"#;

    #[test]
    fn parse_and_run_multi_document() {
        let fixtures = Fixture::from_yaml_multi(YAML).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].cases.len(), 2);
        for fixture in &fixtures {
            fixture.run_and_assert();
        }
    }

    #[test]
    fn wrong_verdict_is_reported() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong
cases:
  - name: claims pass
    expected: [{ tool_name: a, expected_status: success }]
    expect: pass
"#,
        )
        .unwrap();
        let results = fixture.run();
        assert!(!results[0].passed);
        assert_eq!(results[0].actual, Verdict::Fail);
    }

    #[test]
    fn reason_mismatch_fails_case() {
        let fixture = Fixture::from_yaml(
            r#"
name: reason
cases:
  - name: wrong reason
    expected: [{ tool_name: a, expected_status: success }]
    expect: fail
    reason_contains: "this text is not in the reason"
"#,
        )
        .unwrap();
        assert!(!fixture.run()[0].passed);
    }
}
