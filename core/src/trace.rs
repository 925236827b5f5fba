//! Evaluation trace types for debugging pairing decisions.
//!
//! A [`MatchTrace`] carries the same outcome as [`match_calls`](crate::match_calls)
//! plus one [`TemplateStep`] per expectation that was processed: which pool slot
//! it consumed, and why every slot it looked at before that was rejected.
//!
//! # Example
//!
//! ```
//! use callmatch::prelude::*;
//! use callmatch::Resolution;
//! use serde_json::json;
//!
//! let expected = vec![
//!     ExpectedCall::new("search", json!({"q": "rust"}), "success"),
//!     ExpectedCall::new("summarize", json!({}), "success").optional(),
//! ];
//! let actual = vec![
//!     ActualCall::new("search", json!({"q": "go"}), "success"),
//!     ActualCall::new("search", json!({"q": "rust"}), "success"),
//! ];
//!
//! let trace = match_calls_with_trace(&expected, &actual).unwrap();
//! assert!(trace.outcome.success);
//! assert_eq!(trace.steps[0].resolution, Resolution::Paired { slot: 1 });
//! assert_eq!(trace.steps[0].rejections[0].slot, 0);
//! assert_eq!(trace.steps[1].resolution, Resolution::Unmatched);
//! assert_eq!(trace.unconsumed, [0]);
//! ```

use crate::{MatchOutcome, Mismatch};
use std::fmt;

/// Trace of a full sequence match.
///
/// # INV: `outcome` == `match_calls()` outcome
///
/// Steps appear in processing order (required first, then optional) and stop
/// at the first required expectation that found no pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchTrace {
    /// The final outcome (identical to what `match_calls()` returns).
    pub outcome: MatchOutcome,
    /// One step per processed expectation.
    pub steps: Vec<TemplateStep>,
    /// Pool slots never consumed (extra observed calls, not an error).
    pub unconsumed: Vec<usize>,
}

impl MatchTrace {
    /// Slot paired with the expectation at `expected_index`, if any.
    #[must_use]
    pub fn paired_slot(&self, expected_index: usize) -> Option<usize> {
        self.steps
            .iter()
            .find(|s| s.index == expected_index)
            .and_then(|s| match s.resolution {
                Resolution::Paired { slot } => Some(slot),
                Resolution::Skipped | Resolution::Unmatched => None,
            })
    }
}

/// One expectation's resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateStep {
    /// Index in the caller's expected list (0-based).
    pub index: usize,
    /// Expected tool name.
    pub tool_name: String,
    /// Whether the expectation is optional.
    pub optional: bool,
    /// How the expectation was resolved.
    pub resolution: Resolution,
    /// Available slots that were compared and rejected, in pool order.
    pub rejections: Vec<Rejection>,
}

/// How an expectation was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Consumed the observed call at this pool slot.
    Paired {
        /// Index in the caller's actual list (0-based).
        slot: usize,
    },
    /// Optional expectation skipped because every slot was already consumed.
    Skipped,
    /// No available slot matched.
    Unmatched,
}

/// A pool slot that was compared and rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Index in the caller's actual list (0-based).
    pub slot: usize,
    /// Why it was rejected.
    pub mismatch: Mismatch,
}

impl fmt::Display for MatchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.outcome.success { "PASS" } else { "FAIL" };
        writeln!(f, "{verdict}: {}", self.outcome.reason)?;
        for step in &self.steps {
            let kind = if step.optional { "optional" } else { "required" };
            write!(f, "  expected[{}] {} ({kind}): ", step.index, step.tool_name)?;
            match step.resolution {
                Resolution::Paired { slot } => writeln!(f, "paired with actual[{slot}]")?,
                Resolution::Skipped => writeln!(f, "skipped, no actual calls left")?,
                Resolution::Unmatched => writeln!(f, "unmatched")?,
            }
            for rejection in &step.rejections {
                writeln!(
                    f,
                    "    actual[{}] rejected: {}",
                    rejection.slot, rejection.mismatch
                )?;
            }
        }
        if !self.unconsumed.is_empty() {
            let slots: Vec<String> = self.unconsumed.iter().map(usize::to_string).collect();
            writeln!(f, "  unconsumed actual calls: {}", slots.join(", "))?;
        }
        Ok(())
    }
}
