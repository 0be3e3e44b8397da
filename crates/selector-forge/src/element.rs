//! Normalized description of a UI element reported by visual analysis.
//!
//! Analysis output is semi-structured JSON: fields can be missing, `null`,
//! or of the wrong type. [`ElementDescriptor::from_value`] coerces such input
//! once so strategies only ever see plain strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fully typed UI element. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    /// Lowercased tag or category, e.g. `button`, `input`, `link`.
    pub element_type: String,
    /// Visible label, trimmed.
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    /// Lowercased layout hint such as `top` or `footer`.
    pub position: String,
    pub section: String,
    pub critical: bool,
}

impl ElementDescriptor {
    /// Build a descriptor from an element type and visible text.
    pub fn new(element_type: &str, text: &str) -> Self {
        Self {
            element_type: element_type.trim().to_lowercase(),
            text: text.trim().to_string(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_position(mut self, position: &str) -> Self {
        self.position = position.trim().to_lowercase();
        self
    }

    /// Normalize an arbitrary JSON value into a descriptor.
    ///
    /// Non-object input yields an empty descriptor. String fields that hold
    /// anything other than a string are treated as absent. Attribute values
    /// keep strings and stringify numbers and booleans; other values are
    /// dropped.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let string_field = |keys: &[&str]| -> String {
            keys.iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str))
                .unwrap_or("")
                .trim()
                .to_string()
        };

        let attributes = obj
            .get("attributes")
            .and_then(Value::as_object)
            .map(|attrs| {
                attrs
                    .iter()
                    .filter_map(|(k, v)| attribute_value(v).map(|v| (k.clone(), v)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            element_type: string_field(&["type", "elementType", "element_type"]).to_lowercase(),
            text: string_field(&["text"]),
            attributes,
            position: string_field(&["position"]).to_lowercase(),
            section: string_field(&["section"]),
            critical: obj.get("critical").and_then(Value::as_bool).unwrap_or(false),
        }
    }

    /// Attribute value, or `""` when absent.
    pub fn attr(&self, key: &str) -> &str {
        self.attributes.get(key).map(String::as_str).unwrap_or("")
    }

    /// Lowercased `key: value` dump of every attribute.
    pub fn attribute_dump(&self) -> String {
        self.attributes
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ")
            .to_lowercase()
    }

    /// Whether `needle` (lowercase) occurs in the visible text or any attribute.
    pub fn mentions(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle) || self.attribute_dump().contains(needle)
    }

    pub fn is_type(&self, types: &[&str]) -> bool {
        types.contains(&self.element_type.as_str())
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

fn attribute_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_full() {
        let el = ElementDescriptor::from_value(&json!({
            "type": "Button",
            "text": "  Sign In ",
            "attributes": {"type": "submit"},
            "position": "Top",
            "section": "nav",
            "critical": true,
            "purpose": "ignored"
        }));
        assert_eq!(el.element_type, "button");
        assert_eq!(el.text, "Sign In");
        assert_eq!(el.attr("type"), "submit");
        assert_eq!(el.position, "top");
        assert_eq!(el.section, "nav");
        assert!(el.critical);
    }

    #[test]
    fn test_from_value_mistyped_fields() {
        let el = ElementDescriptor::from_value(&json!({
            "type": 42,
            "text": null,
            "attributes": ["not", "a", "map"],
            "position": {"x": 1},
            "critical": "yes"
        }));
        assert_eq!(el, ElementDescriptor::default());
    }

    #[test]
    fn test_from_value_non_object() {
        assert_eq!(ElementDescriptor::from_value(&json!("button")), ElementDescriptor::default());
        assert_eq!(ElementDescriptor::from_value(&Value::Null), ElementDescriptor::default());
    }

    #[test]
    fn test_attribute_coercion() {
        let el = ElementDescriptor::from_value(&json!({
            "type": "input",
            "attributes": {"maxlength": 10, "required": true, "data": {"a": 1}, "name": null}
        }));
        assert_eq!(el.attr("maxlength"), "10");
        assert_eq!(el.attr("required"), "true");
        assert_eq!(el.attr("data"), "");
        assert_eq!(el.attributes.len(), 2);
    }

    #[test]
    fn test_element_type_alias() {
        let el = ElementDescriptor::from_value(&json!({"elementType": "LINK"}));
        assert_eq!(el.element_type, "link");
    }

    #[test]
    fn test_mentions_checks_keys_and_values() {
        let el = ElementDescriptor::new("input", "")
            .with_attribute("aria-label", "Search")
            .with_attribute("placeholder", "Your EMAIL");
        assert!(el.mentions("email"));
        assert!(el.mentions("aria-label"));
        assert!(!el.mentions("password"));
    }
}
