//! Deep structural comparison of one top-level value.
//!
//! Walks the expected value and the observed value in lockstep, tracking the path
//! relative to the top-level key. Patterns are looked up by that relative path.
//!
//! Unlike the top level, mappings here tolerate extra observed keys: only keys
//! present in the expected mapping are visited.

use crate::comparator::Mismatch;
use crate::value::{stringify, values_equal};
use crate::{FieldPath, InputPattern, NestedPatterns, ValueKind};
use serde_json::Value;

/// Compare `actual` against `expected` with patterns keyed relative to this value.
pub(crate) fn deep_compare(
    expected: &Value,
    actual: &Value,
    patterns: &NestedPatterns,
) -> Result<(), Mismatch> {
    let mut path = FieldPath::root();
    compare_at(expected, actual, patterns, &mut path)
}

fn compare_at(
    expected: &Value,
    actual: &Value,
    patterns: &NestedPatterns,
    path: &mut FieldPath,
) -> Result<(), Mismatch> {
    let (expected_kind, actual_kind) = (ValueKind::of(expected), ValueKind::of(actual));
    if expected_kind != actual_kind {
        return Err(Mismatch::KindMismatch {
            path: path.clone(),
            expected: expected_kind,
            actual: actual_kind,
        });
    }

    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => {
            for (key, expected_value) in expected {
                path.push_key(key);
                let result = match actual.get(key) {
                    Some(actual_value) => compare_at(expected_value, actual_value, patterns, path),
                    None => Err(Mismatch::MissingKey { path: path.clone() }),
                };
                path.pop();
                result?;
            }
            Ok(())
        }
        (Value::Array(expected), Value::Array(actual)) => {
            if expected.len() != actual.len() {
                return Err(Mismatch::LengthMismatch {
                    path: path.clone(),
                    expected: expected.len(),
                    actual: actual.len(),
                });
            }
            for (index, (expected_value, actual_value)) in expected.iter().zip(actual).enumerate() {
                path.push_index(index);
                let result = compare_at(expected_value, actual_value, patterns, path);
                path.pop();
                result?;
            }
            Ok(())
        }
        _ => compare_primitive(expected, actual, patterns.get(path), path),
    }
}

fn compare_primitive(
    expected: &Value,
    actual: &Value,
    pattern: Option<&InputPattern>,
    path: &FieldPath,
) -> Result<(), Mismatch> {
    match pattern {
        Some(InputPattern::Wildcard) => Ok(()),
        Some(pattern) => {
            let text = stringify(actual);
            if pattern.matches_str(&text) {
                Ok(())
            } else {
                Err(Mismatch::PatternMismatch {
                    path: path.clone(),
                    pattern: pattern.as_str().to_owned(),
                    value: text.into_owned(),
                })
            }
        }
        None if values_equal(expected, actual) => Ok(()),
        None => Err(Mismatch::ValueMismatch { path: path.clone() }),
    }
}
