//! Field schema resolution for the block property form.
//!
//! Known kinds use the schema their catalog entry declares. Unknown kinds fall
//! back to guessing a field type from each stored value; that path is flagged
//! as [`SchemaSource::Inferred`] so callers can surface a degraded state, and
//! it is never used to validate anything.

use crate::catalog::{ComponentCatalog, FieldSchema, FieldType};
use cmsedit_common::Configuration;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    /// Taken from the catalog entry of the block kind
    Declared,
    /// Guessed from the block's stored configuration
    Inferred,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub kind: String,
    pub fields: Vec<FieldSchema>,
    pub source: SchemaSource,
}

impl ResolvedSchema {
    pub fn is_degraded(&self) -> bool {
        self.source == SchemaSource::Inferred
    }

    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Resolve the property-form schema for a block
pub fn resolve_schema(
    catalog: &ComponentCatalog,
    kind: &str,
    configuration: &Configuration,
) -> ResolvedSchema {
    if let Some(definition) = catalog.get(kind) {
        return ResolvedSchema {
            kind: kind.to_string(),
            fields: definition.fields.clone(),
            source: SchemaSource::Declared,
        };
    }

    tracing::warn!(kind, "no declared schema, inferring fields from stored configuration");

    let fields = configuration
        .iter()
        .filter_map(|(key, value)| {
            infer_field_type(value)
                .map(|field_type| FieldSchema::new(key.clone(), key.clone(), field_type))
        })
        .collect();

    ResolvedSchema {
        kind: kind.to_string(),
        fields,
        source: SchemaSource::Inferred,
    }
}

/// Guess a field type from a stored value. Non-scalar values are not editable.
pub fn infer_field_type(value: &Value) -> Option<FieldType> {
    match value {
        Value::String(s) if s.contains('\n') => Some(FieldType::Textarea),
        Value::String(_) => Some(FieldType::Text),
        Value::Number(_) => Some(FieldType::Number),
        Value::Bool(_) => Some(FieldType::Boolean),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configuration(value: Value) -> Configuration {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_known_kind_uses_declared_schema() {
        let schema = resolve_schema(
            ComponentCatalog::builtin(),
            "Hero",
            &configuration(json!({ "title": "x", "legacy": 1 })),
        );
        assert_eq!(schema.source, SchemaSource::Declared);
        assert!(schema.field("legacy").is_none());
        assert_eq!(schema.field("ctaUrl").unwrap().field_type, FieldType::Url);
    }

    #[test]
    fn test_unknown_kind_infers_scalar_fields() {
        let schema = resolve_schema(
            ComponentCatalog::builtin(),
            "LegacyBanner",
            &configuration(json!({
                "heading": "Sale",
                "body": "line one\nline two",
                "discount": 20,
                "sticky": true,
                "items": [1, 2],
                "meta": null
            })),
        );

        assert!(schema.is_degraded());
        assert_eq!(schema.field("heading").unwrap().field_type, FieldType::Text);
        assert_eq!(schema.field("body").unwrap().field_type, FieldType::Textarea);
        assert_eq!(schema.field("discount").unwrap().field_type, FieldType::Number);
        assert_eq!(schema.field("sticky").unwrap().field_type, FieldType::Boolean);
        assert!(schema.field("items").is_none());
        assert!(schema.field("meta").is_none());
    }
}
