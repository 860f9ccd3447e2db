//! Rendering of [`ErrorX`] as text and as structured data
//!
//! Text form: `errKind=<kind> [k=v ...] leaf1<sep>leaf2<sep>...leafN`, where the
//! kind and attribute prefixes only appear when present.
//! Structured form: `{"kind": ..., "errors": [...], "attrs": {...}}`, with
//! `attrs` omitted when empty.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{AttrGroup, ErrorX};

impl fmt::Display for ErrorX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = self.raw_kind() {
            write!(f, "errKind={kind} ")?;
        }
        if !self.attrs().is_empty() {
            write!(f, "{} ", AttrGroup(self.attrs()))?;
        }
        let separator = self.classifier().separator();
        for (i, leaf) in self.errors().iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            write!(f, "{leaf}")?;
        }
        Ok(())
    }
}

impl Serialize for ErrorX {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_attrs = !self.attrs().is_empty();
        let mut map = serializer.serialize_map(Some(if has_attrs { 3 } else { 2 }))?;
        map.serialize_entry("kind", &self.kind())?;
        let errors: Vec<&str> = self.errors().iter().map(|leaf| leaf.message()).collect();
        map.serialize_entry("errors", &errors)?;
        if has_attrs {
            map.serialize_entry("attrs", &AttrGroup(self.attrs()))?;
        }
        map.end()
    }
}

impl ErrorX {
    /// Serializes the error to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the error to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Attr, Classifier, ErrKind, Leaf};
    use crate::settings::Settings;
    use serde_json::json;

    #[test]
    fn test_render_leaves_only() {
        let mut x = ErrorX::new("a");
        x.msg("b").msg("c");
        assert_eq!(x.to_string(), "a; b; c");
    }

    #[test]
    fn test_render_with_kind() {
        let x = ErrorX::new("refused").with_kind(ErrKind::NetworkPermanent);
        assert_eq!(x.to_string(), "errKind=network-permanent-error refused");
    }

    #[test]
    fn test_render_with_kind_and_attrs() {
        let x = ErrorX::new("refused")
            .with_kind(ErrKind::NetworkPermanent)
            .with_attr("host", "example.com")
            .with_attr("port", 443);
        assert_eq!(
            x.to_string(),
            "errKind=network-permanent-error [host=example.com port=443] refused"
        );
    }

    #[test]
    fn test_render_custom_separator() {
        let classifier = Classifier::new(Settings::new().with_separator(" | "));
        let x = classifier.classify(&Leaf::new("a; b"));
        assert_eq!(x.to_string(), "a | b");
    }

    #[test]
    fn test_render_arrow_input_in_causal_order() {
        let x = Classifier::default().classify(&Leaf::new("disk full <- write failed <- save config"));
        assert_eq!(x.to_string(), "save config; write failed; disk full");
    }

    #[test]
    fn test_serialize_without_attrs() {
        let mut x = ErrorX::new("a");
        x.msg("b");
        assert_eq!(
            x.to_json_value().unwrap(),
            json!({"kind": "unknown-error", "errors": ["a", "b"]})
        );
    }

    #[test]
    fn test_serialize_with_attrs() {
        let mut x = ErrorX::new("a").with_kind(ErrKind::Deadline);
        x.set_attrs([Attr::new("timeout_ms", 500)]);
        assert_eq!(
            x.to_json().unwrap(),
            r#"{"kind":"deadline-exceeded","errors":["a"],"attrs":{"timeout_ms":500}}"#
        );
    }
}
