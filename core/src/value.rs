//! `ToolInput` and value helpers — the JSON shapes that flow through comparison
//!
//! Agent harnesses capture tool arguments either as decoded JSON objects or as the
//! raw JSON string the model emitted. [`ToolInput`] holds either form and decodes
//! on demand, so records are never rewritten after capture.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::fmt;

/// A decoded tool input: string keys to arbitrary JSON values.
pub type InputMap = serde_json::Map<String, Value>;

/// Tool arguments as captured: decoded, or still JSON-encoded.
///
/// # Example
///
/// ```
/// use callmatch::ToolInput;
/// use serde_json::json;
///
/// let decoded = ToolInput::from(json!({"id": 7}));
/// let encoded = ToolInput::from(r#"{"id": 7}"#);
/// assert_eq!(decoded.resolve().unwrap(), encoded.resolve().unwrap());
///
/// let broken = ToolInput::from("{not json");
/// assert!(broken.resolve().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolInput {
    /// Already-decoded mapping.
    Structured(InputMap),
    /// JSON text that must decode to an object.
    Encoded(String),
}

impl ToolInput {
    /// Decode into a mapping, borrowing when already structured.
    ///
    /// # Errors
    ///
    /// Returns the parse error message if the encoded text is not valid JSON
    /// or does not decode to an object.
    pub fn resolve(&self) -> Result<Cow<'_, InputMap>, String> {
        match self {
            Self::Structured(map) => Ok(Cow::Borrowed(map)),
            Self::Encoded(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => Ok(Cow::Owned(map)),
                Ok(other) => Err(format!(
                    "expected a JSON object, found {}",
                    ValueKind::of(&other)
                )),
                Err(e) => Err(e.to_string()),
            },
        }
    }
}

impl Default for ToolInput {
    fn default() -> Self {
        Self::Structured(InputMap::new())
    }
}

impl From<InputMap> for ToolInput {
    fn from(map: InputMap) -> Self {
        Self::Structured(map)
    }
}

impl From<String> for ToolInput {
    fn from(text: String) -> Self {
        Self::Encoded(text)
    }
}

impl From<&str> for ToolInput {
    fn from(text: &str) -> Self {
        Self::Encoded(text.to_owned())
    }
}

/// Objects become [`ToolInput::Structured`], strings become [`ToolInput::Encoded`].
/// Any other value is kept as its JSON text and is rejected by [`ToolInput::resolve`].
impl From<Value> for ToolInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Structured(map),
            Value::String(text) => Self::Encoded(text),
            other => Self::Encoded(other.to_string()),
        }
    }
}

/// Which side of a comparison a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSide {
    /// The expectation (`expected_input`).
    Expected,
    /// The observed call (`tool_input`).
    Actual,
}

impl fmt::Display for InputSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => f.write_str("expected"),
            Self::Actual => f.write_str("actual"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Value kinds
// ═══════════════════════════════════════════════════════════════════════════════

/// Structural kind of a JSON value.
///
/// Integers and floats share [`ValueKind::Number`], so `1` and `1.5` are the same
/// kind for deep comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// JSON object.
    Mapping,
    /// JSON array.
    Sequence,
    /// Integer or floating point number.
    Number,
    /// JSON string.
    String,
    /// `true` or `false`.
    Bool,
    /// `null`.
    Null,
}

impl ValueKind {
    /// Classify a value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Mapping,
            Value::Array(_) => Self::Sequence,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Bool(_) => Self::Bool,
            Value::Null => Self::Null,
        }
    }

    /// Lowercase name used in diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mapping => "mapping",
            Self::Sequence => "sequence",
            Self::Number => "number",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Equality and stringification
// ═══════════════════════════════════════════════════════════════════════════════

/// Structural equality where numbers compare by value (`1 == 1.0`).
///
/// `serde_json`'s own `PartialEq` keeps integer and float representations apart.
pub(crate) fn values_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, x)| b.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => expected == actual,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    if a.is_f64() || b.is_f64() {
        return matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y);
    }
    // One side is a negative i64 and the other a u64 above i64::MAX.
    false
}

/// Render a primitive the way a pattern sees it.
///
/// Strings are used verbatim; everything else uses its JSON spelling
/// (`42`, `1.5`, `true`, `null`). Floats always keep a fractional part, so a
/// float `2.0` reads `"2.0"` while the integer `2` reads `"2"`.
pub(crate) fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Null => Cow::Borrowed("null"),
        other => Cow::Owned(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_structured_borrows() {
        let input = ToolInput::from(json!({"a": 1}));
        assert!(matches!(input.resolve().unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn resolve_encoded_parses_once() {
        let input = ToolInput::from(r#"{"a": [1, 2]}"#);
        let map = input.resolve().unwrap();
        assert_eq!(map.get("a"), Some(&json!([1, 2])));
    }

    #[test]
    fn resolve_rejects_non_object_json() {
        let err = ToolInput::from("[1, 2]").resolve().unwrap_err();
        assert!(err.contains("sequence"), "got: {err}");
    }

    #[test]
    fn resolve_rejects_invalid_json() {
        assert!(ToolInput::from("{\"a\":").resolve().is_err());
    }

    #[test]
    fn non_object_value_becomes_unresolvable() {
        let input = ToolInput::from(json!(42));
        assert!(input.resolve().is_err());
    }

    #[test]
    fn deserialize_accepts_both_forms() {
        let structured: ToolInput = serde_json::from_value(json!({"k": "v"})).unwrap();
        assert!(matches!(structured, ToolInput::Structured(_)));

        let encoded: ToolInput = serde_json::from_value(json!("{\"k\": \"v\"}")).unwrap();
        assert!(matches!(encoded, ToolInput::Encoded(_)));

        assert!(serde_json::from_value::<ToolInput>(json!(12)).is_err());
    }

    #[test]
    fn kinds_group_integers_and_floats() {
        assert_eq!(ValueKind::of(&json!(1)), ValueKind::of(&json!(1.5)));
        assert_ne!(ValueKind::of(&json!("1")), ValueKind::of(&json!(1)));
        assert_eq!(ValueKind::of(&json!(null)).as_str(), "null");
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!({"a": [2.0]}), &json!({"a": [2]})));
        assert!(!values_equal(&json!(1), &json!(1.5)));
        assert!(!values_equal(&json!(-1), &json!(u64::MAX)));
    }

    #[test]
    fn objects_must_have_identical_key_sets() {
        assert!(!values_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!values_equal(&json!({"a": 1, "b": 2}), &json!({"a": 1})));
    }

    #[test]
    fn stringify_uses_json_spelling() {
        assert_eq!(stringify(&json!("x")), "x");
        assert_eq!(stringify(&json!(12)), "12");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(null)), "null");
    }

    #[test]
    fn stringify_floats() {
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(2.0)), "2.0");
        assert_eq!(stringify(&json!(-0.25)), "-0.25");
        assert_eq!(stringify(&json!(0.1)), "0.1");
        assert_eq!(stringify(&json!(-7)), "-7");
        assert_eq!(stringify(&json!(u64::MAX)), "18446744073709551615");
    }
}
