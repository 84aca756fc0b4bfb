/// Variant definitions for color x size combinations
use serde::Serialize;
use serde_json::Value;

/// A single swatch option (one color or one size)
///
/// Ids are kept as opaque strings exactly as the storefront publishes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwatchOption {
    pub id: String,
    pub label: String,
}

impl SwatchOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// One color x size combination and the outcome of its lookup call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantRecord {
    /// Identifier reported by the lookup endpoint; `None` when the lookup failed
    pub variant_id: Option<String>,

    /// Color label
    pub color: String,
    pub color_id: String,

    /// Size label
    pub size: String,
    pub size_id: String,

    /// Raw lookup payload; `None` when the lookup failed
    pub response: Option<Value>,
}

impl VariantRecord {
    /// Builds a record from a decoded lookup response
    pub fn resolved(color: &SwatchOption, size: &SwatchOption, response: Value) -> Self {
        let variant_id = response.get("id").and_then(id_to_string);
        Self {
            variant_id,
            response: Some(response),
            ..Self::unresolved(color, size)
        }
    }

    /// Builds the null-marker record for a lookup that produced no usable data
    pub fn unresolved(color: &SwatchOption, size: &SwatchOption) -> Self {
        Self {
            variant_id: None,
            color: color.label.clone(),
            color_id: color.id.clone(),
            size: size.label.clone(),
            size_id: size.id.clone(),
            response: None,
        }
    }

    /// Returns true if the lookup call produced a usable response
    pub fn is_resolved(&self) -> bool {
        self.response.is_some()
    }
}

/// Renders a JSON scalar id as a string; objects, arrays and null yield `None`
pub(crate) fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
