//! Key-value attributes carried by a canonical error

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// A structured key-value attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    key: String,
    value: Value,
}

impl Attr {
    /// Creates an attribute from any value serde_json can represent.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parses `key=value` as given on a command line.
    ///
    /// The value is read as JSON when it parses as such (numbers, booleans,
    /// quoted strings), otherwise it is kept as a plain string.
    pub fn parse_pair(pair: &str) -> Option<Self> {
        let (key, raw) = pair.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::from(raw));
        Some(Self::new(key, value))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(s) => write!(f, "{}={}", self.key, s),
            other => write!(f, "{}={}", self.key, other),
        }
    }
}

/// A borrowed, ordered group of attributes.
///
/// Displays as `[k1=v1 k2=v2]` and serializes as a map in insertion order.
#[derive(Clone, Copy, Debug)]
pub struct AttrGroup<'a>(pub &'a [Attr]);

impl fmt::Display for AttrGroup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, attr) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{attr}")?;
        }
        f.write_str("]")
    }
}

impl Serialize for AttrGroup<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attr in self.0 {
            map.serialize_entry(&attr.key, &attr.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_display() {
        assert_eq!(Attr::new("host", "example.com").to_string(), "host=example.com");
        assert_eq!(Attr::new("port", 443).to_string(), "port=443");
        assert_eq!(Attr::new("tls", true).to_string(), "tls=true");
    }

    #[test]
    fn test_group_display() {
        let attrs = vec![Attr::new("host", "example.com"), Attr::new("port", 443)];
        assert_eq!(AttrGroup(&attrs).to_string(), "[host=example.com port=443]");
        assert_eq!(AttrGroup(&[]).to_string(), "[]");
    }

    #[test]
    fn test_group_serializes_in_insertion_order() {
        let attrs = vec![Attr::new("zeta", 1), Attr::new("alpha", "a")];
        let json = serde_json::to_string(&AttrGroup(&attrs)).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":"a"}"#);
    }

    #[test]
    fn test_parse_pair() {
        let attr = Attr::parse_pair("retries=3").unwrap();
        assert_eq!(attr.key(), "retries");
        assert_eq!(attr.value(), &Value::from(3));

        let attr = Attr::parse_pair("host=example.com").unwrap();
        assert_eq!(attr.value(), &Value::from("example.com"));

        let attr = Attr::parse_pair("query=a=b").unwrap();
        assert_eq!(attr.value(), &Value::from("a=b"));
    }

    #[test]
    fn test_parse_pair_rejects_missing_key() {
        assert!(Attr::parse_pair("novalue").is_none());
        assert!(Attr::parse_pair("=1").is_none());
    }
}
