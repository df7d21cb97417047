//! Attribute key/value types shared by spans, metric points, and log records.
//!
//! Attribute values are restricted to the scalar types the collector accepts.
//! Keep keys low-cardinality.

use serde::Serialize;
use std::collections::HashMap;

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// String value
    Str(String),
    /// Boolean value
    Bool(bool),
    /// Signed integer value
    Int(i64),
    /// Floating point value
    Float(f64),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Attribute map attached to spans, metric points, and span events.
pub type Attributes = HashMap<String, AttrValue>;

/// Build an attribute map from key/value pairs.
///
/// # Examples
///
/// ```
/// use telemetry_core::attributes::attrs;
///
/// let attributes = attrs([("cache.key", "user:42".into()), ("cache.hit", true.into())]);
/// assert_eq!(attributes.len(), 2);
/// ```
#[must_use]
pub fn attrs<const N: usize>(pairs: [(&str, AttrValue); N]) -> Attributes {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(AttrValue::from("x"), AttrValue::Str("x".to_string()));
        assert_eq!(AttrValue::from(true), AttrValue::Bool(true));
        assert_eq!(AttrValue::from(7i64), AttrValue::Int(7));
        assert_eq!(AttrValue::from(7u32), AttrValue::Int(7));
        assert_eq!(AttrValue::from(0.5), AttrValue::Float(0.5));
    }

    #[test]
    fn test_attrs_builder() {
        let attributes = attrs([("a", 1i64.into()), ("b", "two".into())]);
        assert_eq!(attributes.get("a"), Some(&AttrValue::Int(1)));
        assert_eq!(attributes.get("b"), Some(&AttrValue::Str("two".to_string())));
    }

    #[test]
    fn test_serialization_is_untagged() {
        let attributes = attrs([("count", 3i64.into())]);
        let json = serde_json::to_string(&attributes).unwrap();
        assert_eq!(json, r#"{"count":3}"#);
    }
}
