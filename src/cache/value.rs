//! Cache Value Module
//!
//! The value type stored in the cache and its encoding at the store boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

// == Cache Value ==
/// A cached value: string, integer or boolean.
///
/// Encoded as JSON text in the store (`"text"`, `42`, `true`), so the variant
/// survives the round trip through a string-only backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl CacheValue {
    // == Encode ==
    /// Renders the value in its stored form.
    pub fn encode(&self) -> String {
        match self {
            CacheValue::Bool(b) => b.to_string(),
            CacheValue::Int(i) => i.to_string(),
            CacheValue::Str(s) => serde_json::Value::from(s.as_str()).to_string(),
        }
    }

    // == Decode ==
    /// Parses a stored value. Anything that is not a JSON string, integer or
    /// boolean is rejected.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl fmt::Display for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheValue::Bool(b) => write!(f, "{}", b),
            CacheValue::Int(i) => write!(f, "{}", i),
            CacheValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::Str(value.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::Str(value)
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        CacheValue::Int(value)
    }
}

impl From<i32> for CacheValue {
    fn from(value: i32) -> Self {
        CacheValue::Int(i64::from(value))
    }
}

impl From<bool> for CacheValue {
    fn from(value: bool) -> Self {
        CacheValue::Bool(value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_forms() {
        assert_eq!(CacheValue::from("hi").encode(), r#""hi""#);
        assert_eq!(CacheValue::from(-7).encode(), "-7");
        assert_eq!(CacheValue::from(true).encode(), "true");
    }

    #[test]
    fn test_decode_keeps_variant() {
        assert_eq!(CacheValue::decode("42").unwrap(), CacheValue::Int(42));
        assert_eq!(CacheValue::decode("false").unwrap(), CacheValue::Bool(false));
        assert_eq!(
            CacheValue::decode(r#""42""#).unwrap(),
            CacheValue::Str("42".to_string())
        );
    }

    #[test]
    fn test_string_with_quotes_and_newlines() {
        let value = CacheValue::from("say \"hi\"\nbye");
        assert_eq!(CacheValue::decode(&value.encode()).unwrap(), value);
    }

    #[test]
    fn test_decode_rejects_other_json() {
        assert!(CacheValue::decode("1.5").is_err());
        assert!(CacheValue::decode("null").is_err());
        assert!(CacheValue::decode("[1]").is_err());
        assert!(CacheValue::decode("plain text").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(CacheValue::from("x").to_string(), "x");
        assert_eq!(CacheValue::from(3).to_string(), "3");
        assert_eq!(CacheValue::from(false).to_string(), "false");
    }
}
