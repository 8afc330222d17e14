//! Cell contents: value descriptors and cell messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One value held by a cell: the underlying value and its user-facing form.
///
/// Plain columns carry the same value in both fields. Lookup columns carry
/// the foreign key in `raw` and the looked-up text in `display`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDescriptor {
    pub raw: Value,
    pub display: Value,
}

impl ValueDescriptor {
    pub fn new(raw: impl Into<Value>, display: impl Into<Value>) -> Self {
        Self { raw: raw.into(), display: display.into() }
    }

    /// Descriptor whose raw and display are the same text.
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self { raw: Value::String(text.clone()), display: Value::String(text) }
    }

    /// `raw` is null or blank text.
    pub fn is_raw_empty(&self) -> bool {
        match &self.raw {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn display_text(&self) -> String {
        value_text(&self.display)
    }

    pub fn raw_text(&self) -> String {
        value_text(&self.raw)
    }
}

/// Validation or paste annotation attached to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMessage {
    pub message: String,
}

impl CellMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// A cell is empty when it has no descriptor with a usable raw value.
pub fn is_empty_cell(values: &[ValueDescriptor]) -> bool {
    values.iter().all(ValueDescriptor::is_raw_empty)
}

/// Text form of a JSON value as a user would type it (strings unquoted, null empty).
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_cell() {
        assert!(is_empty_cell(&[]));
        assert!(is_empty_cell(&[ValueDescriptor::new(Value::Null, "x")]));
        assert!(is_empty_cell(&[ValueDescriptor::literal("  "), ValueDescriptor::literal("")]));
        assert!(!is_empty_cell(&[ValueDescriptor::new(0, "0")]));
        assert!(!is_empty_cell(&[ValueDescriptor::literal(""), ValueDescriptor::literal("a")]));
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!("abc")), "abc");
        assert_eq!(value_text(&json!(1.5)), "1.5");
        assert_eq!(value_text(&json!(true)), "true");
    }
}
