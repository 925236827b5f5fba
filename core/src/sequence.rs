//! Sequence matcher — pairs expectations with observed calls
//!
//! Pairing is a bag match: each expectation consumes at most one observed call and
//! each observed call satisfies at most one expectation. Expectations are processed
//! required-first, each taking the first available observed call that the
//! comparator accepts.
//!
//! # INV: Greedy, no backtracking
//!
//! An early expectation may consume a call that a later one needed, even when a
//! different assignment would satisfy both. The pass/fail verdict of existing
//! benchmark suites depends on this behavior.
//!
//! # INV: Extra observed calls are never flagged
//!
//! Observed calls left over after every required expectation is paired do not
//! affect the outcome.

use crate::trace::{MatchTrace, Rejection, Resolution, TemplateStep};
use crate::{compare, ActualCall, Comparison, ExpectedCall, MatchError, Mismatch};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Verdict for one benchmark case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Whether every required expectation was paired.
    pub success: bool,
    /// Human-readable explanation.
    pub reason: String,
}

impl MatchOutcome {
    /// A successful outcome.
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            success: true,
            reason: reason.into(),
        }
    }

    /// A failed outcome.
    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: reason.into(),
        }
    }
}

/// Observed calls with tombstones. Slots are flagged, never removed, so slot
/// indices always equal indices into the caller's slice.
struct Pool<'a> {
    calls: &'a [ActualCall],
    consumed: Vec<bool>,
    remaining: usize,
}

impl<'a> Pool<'a> {
    fn new(calls: &'a [ActualCall]) -> Self {
        Self {
            calls,
            consumed: vec![false; calls.len()],
            remaining: calls.len(),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    fn available(&self) -> impl Iterator<Item = (usize, &'a ActualCall)> + '_ {
        self.calls
            .iter()
            .enumerate()
            .filter(|(slot, _)| !self.consumed[*slot])
    }

    fn consume(&mut self, slot: usize) {
        debug_assert!(!self.consumed[slot], "slot {slot} consumed twice");
        self.consumed[slot] = true;
        self.remaining -= 1;
    }

    fn unconsumed(&self) -> Vec<usize> {
        self.available().map(|(slot, _)| slot).collect()
    }
}

/// Decide whether `actual` satisfies `expected`.
///
/// # Errors
///
/// Returns [`MatchError::MalformedInput`] if an input that had to be inspected is
/// not a JSON object. Inputs are only decoded for calls whose tool name and
/// status already match.
///
/// # Example
///
/// ```
/// use callmatch::prelude::*;
/// use serde_json::json;
///
/// let expected = vec![ExpectedCall::new("search", json!({"q": "rust"}), "success")];
/// let actual = vec![
///     ActualCall::new("search", json!({"q": "rust"}), "success"),
///     ActualCall::new("fetch", json!({"url": "https://example.com"}), "success"),
/// ];
///
/// // The extra `fetch` call is not flagged.
/// assert!(match_calls(&expected, &actual).unwrap().success);
/// ```
pub fn match_calls(
    expected: &[ExpectedCall],
    actual: &[ActualCall],
) -> Result<MatchOutcome, MatchError> {
    run(expected, actual, None)
}

/// Like [`match_calls`], also recording how each expectation was resolved.
///
/// # Errors
///
/// Same as [`match_calls`].
pub fn match_calls_with_trace(
    expected: &[ExpectedCall],
    actual: &[ActualCall],
) -> Result<MatchTrace, MatchError> {
    let mut steps = Vec::new();
    let mut unconsumed = Vec::new();
    let outcome = run(expected, actual, Some((&mut steps, &mut unconsumed)))?;
    Ok(MatchTrace {
        outcome,
        steps,
        unconsumed,
    })
}

type Recorder<'r> = Option<(&'r mut Vec<TemplateStep>, &'r mut Vec<usize>)>;

fn run(
    expected: &[ExpectedCall],
    actual: &[ActualCall],
    mut recorder: Recorder<'_>,
) -> Result<MatchOutcome, MatchError> {
    let (required, optional): (Vec<_>, Vec<_>) =
        expected.iter().enumerate().partition(|(_, call)| !call.optional);

    if required.len() > actual.len() {
        debug!(
            required = required.len(),
            actual = actual.len(),
            "fewer actual calls than required expectations"
        );
        return Ok(MatchOutcome::fail(format!(
            "Tool call count mismatch: expected at least {} required calls, got {} actual calls",
            required.len(),
            actual.len()
        )));
    }

    let mut pool = Pool::new(actual);
    let mut optional_paired = 0usize;

    for (index, call) in required.iter().chain(&optional).copied() {
        if call.optional && pool.is_exhausted() {
            debug!(index, tool = %call.tool_name, "optional call skipped, pool exhausted");
            record(&mut recorder, index, call, Resolution::Skipped, Vec::new());
            continue;
        }

        let mut rejections = Vec::new();
        let mut paired = None;
        for (slot, candidate) in pool.available() {
            match compare(call, candidate)? {
                Comparison::Match => {
                    paired = Some(slot);
                    break;
                }
                Comparison::Mismatch(mismatch) => {
                    trace!(index, slot, tool = %call.tool_name, %mismatch, "candidate rejected");
                    rejections.push(Rejection { slot, mismatch });
                }
            }
        }

        match paired {
            Some(slot) => {
                debug!(index, slot, tool = %call.tool_name, "paired");
                pool.consume(slot);
                if call.optional {
                    optional_paired += 1;
                }
                record(
                    &mut recorder,
                    index,
                    call,
                    Resolution::Paired { slot },
                    rejections,
                );
            }
            None if call.optional => {
                debug!(index, tool = %call.tool_name, "optional call unmatched");
                record(&mut recorder, index, call, Resolution::Unmatched, rejections);
            }
            None => {
                debug!(index, tool = %call.tool_name, "required call unmatched");
                let reason = unmatched_reason(index, call, &rejections);
                record(&mut recorder, index, call, Resolution::Unmatched, rejections);
                finish(&mut recorder, &pool);
                return Ok(MatchOutcome::fail(reason));
            }
        }
    }

    finish(&mut recorder, &pool);
    Ok(MatchOutcome::pass(format!(
        "All required tool calls matched ({} required, {} of {} optional)",
        required.len(),
        optional_paired,
        optional.len()
    )))
}

/// Failure reason for a required expectation, naming the closest candidate:
/// the first rejected call that at least carried the same tool name.
fn unmatched_reason(index: usize, call: &ExpectedCall, rejections: &[Rejection]) -> String {
    let mut reason = format!(
        "No matching actual call found for required tool call {} (\"{}\")",
        index + 1,
        call.tool_name
    );
    if let Some(closest) = rejections
        .iter()
        .find(|r| !matches!(r.mismatch, Mismatch::ToolName { .. }))
    {
        reason.push_str(&format!(
            "; closest candidate was actual call {}: {}",
            closest.slot + 1,
            closest.mismatch
        ));
    }
    reason
}

fn record(
    recorder: &mut Recorder<'_>,
    index: usize,
    call: &ExpectedCall,
    resolution: Resolution,
    rejections: Vec<Rejection>,
) {
    if let Some((steps, _)) = recorder {
        steps.push(TemplateStep {
            index,
            tool_name: call.tool_name.clone(),
            optional: call.optional,
            resolution,
            rejections,
        });
    }
}

fn finish(recorder: &mut Recorder<'_>, pool: &Pool<'_>) {
    if let Some((_, unconsumed)) = recorder {
        **unconsumed = pool.unconsumed();
    }
}
