use serde::{Deserialize, Serialize};

/// A dynamically typed configuration value.
///
/// Untagged so raw records read from a store deserialize from plain JSON
/// (`{"dataset": "kb1", "parse": true}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b).is_eq(),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Null, or text that is blank after trimming.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
        }
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_counts_as_empty() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::from("").is_empty());
        assert!(FieldValue::from("  \n").is_empty());
        assert!(!FieldValue::from("kb1").is_empty());
        assert!(!FieldValue::Boolean(false).is_empty());
    }

    #[test]
    fn untagged_json_shapes() {
        let v: FieldValue = serde_json::from_str("\"kb1\"").unwrap();
        assert_eq!(v, FieldValue::from("kb1"));
        let v: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, FieldValue::Boolean(true));
        let v: FieldValue = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
        let v: FieldValue = serde_json::from_str("7").unwrap();
        assert_eq!(v, FieldValue::Integer(7));
    }

    #[test]
    fn msgpack_preserves_variant() {
        for value in [
            FieldValue::Null,
            FieldValue::Boolean(true),
            FieldValue::Integer(-3),
            FieldValue::Float(1.5),
            FieldValue::from("text/markdown"),
        ] {
            let bytes = value.to_msgpack().unwrap();
            assert_eq!(FieldValue::from_msgpack(&bytes).unwrap(), value);
        }
    }
}
