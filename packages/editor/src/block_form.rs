//! # Block Property Form
//!
//! Edits the configuration of one block. Fields come from the kind's
//! declared schema, or are inferred from the stored configuration when the
//! kind is unknown to the catalog. Input is coerced to the field's type but
//! never validated: a number field that does not parse keeps the raw text.

use crate::errors::EditorError;
use cmsedit_catalog::{resolve_schema, ComponentCatalog, FieldSchema, FieldType, ResolvedSchema};
use cmsedit_common::{Block, Configuration};
use serde_json::{Number, Value};

#[derive(Debug, Clone)]
pub struct BlockForm {
    index: usize,
    block_id: String,
    schema: ResolvedSchema,
    values: Configuration,
}

impl BlockForm {
    /// Open the form for the block at `index`, prefilled with its configuration
    pub fn open(index: usize, block: &Block, catalog: &ComponentCatalog) -> Self {
        Self {
            index,
            block_id: block.id.clone(),
            schema: resolve_schema(catalog, &block.kind, &block.configuration),
            values: block.configuration.clone(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn block_id(&self) -> &str {
        &self.block_id
    }

    pub fn kind(&self) -> &str {
        &self.schema.kind
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.schema.fields
    }

    /// The schema was guessed from stored values
    pub fn is_degraded(&self) -> bool {
        self.schema.is_degraded()
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a field from raw input text, coerced to the field's type
    pub fn set_input(&mut self, key: &str, raw: &str) -> Result<(), EditorError> {
        let field = self
            .schema
            .field(key)
            .ok_or_else(|| EditorError::UnknownField(key.to_string()))?;
        let value = coerce(&field.field_type, raw);
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: Value) -> Result<(), EditorError> {
        if self.schema.field(key).is_none() {
            return Err(EditorError::UnknownField(key.to_string()));
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Submitted configuration. Keys outside the schema are carried through.
    pub fn into_configuration(self) -> Configuration {
        self.values
    }
}

fn coerce(field_type: &FieldType, raw: &str) -> Value {
    match field_type {
        FieldType::Number => {
            parse_number(raw.trim()).unwrap_or_else(|| Value::String(raw.to_string()))
        }
        FieldType::Boolean => Value::Bool(matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "true" | "on" | "yes" | "1"
        )),
        _ => Value::String(raw.to_string()),
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::from(int));
    }
    let float = raw.parse::<f64>().ok()?;
    Number::from_f64(float).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(kind: &str, configuration: Value) -> Block {
        Block::new("b1", kind).with_configuration(configuration.as_object().cloned().unwrap())
    }

    #[test]
    fn test_declared_schema_fields() {
        let hero = block("Hero", json!({ "title": "Headline" }));
        let form = BlockForm::open(0, &hero, ComponentCatalog::builtin());
        assert!(!form.is_degraded());
        let keys: Vec<&str> = form.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["title", "subtitle", "backgroundImage", "ctaLabel", "ctaUrl"]);
    }

    #[test]
    fn test_coercion() {
        let grid = block("FeatureGrid", json!({ "title": "Features", "columns": 3 }));
        let mut form = BlockForm::open(2, &grid, ComponentCatalog::builtin());

        form.set_input("columns", "4").unwrap();
        assert_eq!(form.value("columns"), Some(&json!(4)));

        form.set_input("columns", "2.5").unwrap();
        assert_eq!(form.value("columns"), Some(&json!(2.5)));

        form.set_input("columns", "many").unwrap();
        assert_eq!(form.value("columns"), Some(&json!("many")));

        let contact = block("ContactForm", json!({ "showPhone": false }));
        let mut form = BlockForm::open(0, &contact, ComponentCatalog::builtin());
        form.set_input("showPhone", "on").unwrap();
        assert_eq!(form.value("showPhone"), Some(&json!(true)));
    }

    #[test]
    fn test_inferred_schema_is_degraded() {
        let legacy = block("LegacyBanner", json!({ "heading": "Old", "width": 800, "nested": {} }));
        let mut form = BlockForm::open(0, &legacy, ComponentCatalog::builtin());
        assert!(form.is_degraded());
        assert_eq!(form.fields().len(), 2);

        form.set_input("width", "640").unwrap();
        let config = form.into_configuration();
        assert_eq!(config["width"], json!(640));
        assert_eq!(config["nested"], json!({}));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let hero = block("Hero", json!({}));
        let mut form = BlockForm::open(0, &hero, ComponentCatalog::builtin());
        assert!(matches!(
            form.set_input("color", "red"),
            Err(EditorError::UnknownField(key)) if key == "color"
        ));
    }
}
