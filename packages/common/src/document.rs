//! # Remote Documents
//!
//! A document is a structured content entry owned by the external content
//! system. Its scalar fields live in `fields`; its body is the ordered list of
//! `blocks`. The editor never persists a document itself, it only reads one
//! and derives pending changes against it.

use crate::error::CommonError;
use crate::result::CommonResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the structural field holding a document's block list
pub const BLOCKS_FIELD: &str = "blocks";

/// Configuration map of a block (field name to stored value)
pub type Configuration = Map<String, Value>;

/// One structural unit within a document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// List identity only; carries no meaning for the content system
    pub id: String,

    /// Which renderer and config schema applies
    #[serde(alias = "type", alias = "component")]
    pub kind: String,

    #[serde(default, alias = "props")]
    pub configuration: Configuration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Block>>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            configuration: Configuration::new(),
            children: None,
        }
    }

    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = Some(children);
        self
    }

    /// Get a configuration value by key
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.configuration.get(key)
    }

    /// Serialize this block to the JSON form used in structural markers
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A remotely-stored document as fetched from the content API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    #[serde(alias = "documentId")]
    pub id: String,

    #[serde(alias = "documentKind")]
    pub kind: String,

    #[serde(default)]
    pub fields: Map<String, Value>,

    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl RemoteDocument {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            fields: Map::new(),
            blocks: Vec::new(),
        }
    }

    /// Parse a document as returned by the content API
    pub fn from_json(source: &str) -> CommonResult<Self> {
        let document: RemoteDocument = serde_json::from_str(source)?;
        if document.id.is_empty() {
            return Err(CommonError::InvalidDocument("empty document id".to_string()));
        }
        Ok(document)
    }

    pub fn with_field(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(path.into(), value.into());
        self
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Resolve a field path.
    ///
    /// A path that names a top-level field directly wins; otherwise dotted
    /// segments walk into nested objects (`hero.title`).
    pub fn field(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(path) {
            return Some(value);
        }

        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn require_field(&self, path: &str) -> CommonResult<&Value> {
        self.field(path)
            .ok_or_else(|| CommonError::FieldNotFound(format!("{}/{}", self.id, path)))
    }

    /// Field value as display text.
    ///
    /// Strings are returned as-is, other scalars as their JSON text, and
    /// missing or null fields as the empty string.
    pub fn field_text(&self, path: &str) -> String {
        match self.field(path) {
            Some(value) => value_to_text(value),
            None => String::new(),
        }
    }

    /// Ids of the body blocks in order
    pub fn block_ids(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.id.as_str()).collect()
    }
}

/// Render a JSON value the way a text field shows it
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_lookup_walks_dotted_paths() {
        let doc: RemoteDocument = serde_json::from_value(json!({
            "id": "home",
            "kind": "page",
            "fields": {
                "title": "Welcome",
                "hero": { "title": "Big news", "stats": [1, 2] },
                "seo.title": "Literal dotted key"
            }
        }))
        .unwrap();

        assert_eq!(doc.field_text("title"), "Welcome");
        assert_eq!(doc.field_text("hero.title"), "Big news");
        assert_eq!(doc.field_text("hero.stats.1"), "2");
        assert_eq!(doc.field_text("seo.title"), "Literal dotted key");
        assert_eq!(doc.field_text("missing"), "");
    }

    #[test]
    fn test_from_json_rejects_empty_id() {
        let err = RemoteDocument::from_json(r#"{"id": "", "kind": "page"}"#).unwrap_err();
        assert!(matches!(err, CommonError::InvalidDocument(_)));

        let doc = RemoteDocument::from_json(r#"{"id": "home", "kind": "page"}"#).unwrap();
        assert!(matches!(
            doc.require_field("title"),
            Err(CommonError::FieldNotFound(path)) if path == "home/title"
        ));
    }

    #[test]
    fn test_block_accepts_type_alias() {
        let block: Block = serde_json::from_value(json!({
            "id": "b1",
            "type": "Hero",
            "props": { "title": "Hi" }
        }))
        .unwrap();

        assert_eq!(block.kind, "Hero");
        assert_eq!(block.config_value("title"), Some(&json!("Hi")));
        assert!(block.children.is_none());
    }

    #[test]
    fn test_document_accepts_api_field_names() {
        let doc: RemoteDocument = serde_json::from_value(json!({
            "documentId": "doc-1",
            "documentKind": "page",
            "blocks": [{ "id": "a", "kind": "Spacer" }]
        }))
        .unwrap();

        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.kind, "page");
        assert_eq!(doc.block_ids(), vec!["a"]);
    }
}
