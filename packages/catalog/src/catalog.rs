//! The static table of insertable block kinds.

use crate::error::CatalogError;
use cmsedit_common::Configuration;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Picker grouping of block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Layout,
    Content,
    Media,
    Marketing,
    Forms,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Layout,
        Category::Content,
        Category::Media,
        Category::Marketing,
        Category::Forms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Layout => "layout",
            Category::Content => "content",
            Category::Media => "media",
            Category::Marketing => "marketing",
            Category::Forms => "forms",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Layout => "Layout",
            Category::Content => "Content",
            Category::Media => "Media",
            Category::Marketing => "Marketing",
            Category::Forms => "Forms",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}

/// Input widget a property-form field is edited with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldType {
    Text,
    Textarea,
    RichText,
    Number,
    Boolean,
    Url,
    Image,
    Select { options: Vec<String> },
}

impl FieldType {
    /// Whether values of this type are stored as JSON strings
    pub fn is_textual(&self) -> bool {
        !matches!(self, FieldType::Number | FieldType::Boolean)
    }
}

/// One editable property of a block kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub key: String,
    pub label: String,
    pub field_type: FieldType,
}

impl FieldSchema {
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
        }
    }
}

/// Catalog entry for one block kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub kind: String,
    pub display_name: String,
    pub description: String,
    pub category: Category,
    pub default_configuration: Configuration,
    pub fields: Vec<FieldSchema>,
}

impl ComponentDefinition {
    /// Case-insensitive substring match on display name or description
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.display_name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }

    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Fixed catalog of block kinds
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    definitions: Vec<ComponentDefinition>,
}

impl ComponentCatalog {
    pub fn new(definitions: Vec<ComponentDefinition>) -> Self {
        Self { definitions }
    }

    /// The built-in catalog shared by the picker and the property form
    pub fn builtin() -> &'static ComponentCatalog {
        static BUILTIN: OnceLock<ComponentCatalog> = OnceLock::new();
        BUILTIN.get_or_init(|| ComponentCatalog::new(builtin_definitions()))
    }

    pub fn definitions(&self) -> &[ComponentDefinition] {
        &self.definitions
    }

    pub fn get(&self, kind: &str) -> Option<&ComponentDefinition> {
        self.definitions.iter().find(|d| d.kind == kind)
    }

    pub fn require(&self, kind: &str) -> Result<&ComponentDefinition, CatalogError> {
        self.get(kind)
            .ok_or_else(|| CatalogError::UnknownKind(kind.to_string()))
    }

    /// Categories that have at least one entry, in declaration order
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.definitions.iter().any(|d| d.category == *c))
            .collect()
    }

    /// Entries grouped by category, both in catalog order
    pub fn by_category(&self) -> Vec<(Category, Vec<&ComponentDefinition>)> {
        self.categories()
            .into_iter()
            .map(|c| {
                let entries = self.definitions.iter().filter(|d| d.category == c).collect();
                (c, entries)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn config(value: Value) -> Configuration {
    match value {
        Value::Object(map) => map,
        _ => Configuration::new(),
    }
}

fn define(
    kind: &str,
    display_name: &str,
    description: &str,
    category: Category,
    default_configuration: Value,
    fields: Vec<FieldSchema>,
) -> ComponentDefinition {
    ComponentDefinition {
        kind: kind.to_string(),
        display_name: display_name.to_string(),
        description: description.to_string(),
        category,
        default_configuration: config(default_configuration),
        fields,
    }
}

fn builtin_definitions() -> Vec<ComponentDefinition> {
    use FieldType::*;

    let alignment = Select {
        options: vec!["left".into(), "center".into(), "right".into()],
    };

    vec![
        define(
            "Spacer",
            "Spacer",
            "Vertical whitespace between sections",
            Category::Layout,
            json!({ "height": 48 }),
            vec![FieldSchema::new("height", "Height (px)", Number)],
        ),
        define(
            "Divider",
            "Divider",
            "Horizontal rule separating sections",
            Category::Layout,
            json!({ "style": "solid" }),
            vec![FieldSchema::new(
                "style",
                "Line style",
                Select {
                    options: vec!["solid".into(), "dashed".into(), "dotted".into()],
                },
            )],
        ),
        define(
            "Hero",
            "Hero",
            "Full-width banner with headline and call to action",
            Category::Content,
            json!({
                "title": "Headline",
                "subtitle": "Supporting text",
                "backgroundImage": "",
                "ctaLabel": "Get started",
                "ctaUrl": "/contact"
            }),
            vec![
                FieldSchema::new("title", "Title", Text),
                FieldSchema::new("subtitle", "Subtitle", Textarea),
                FieldSchema::new("backgroundImage", "Background image", Image),
                FieldSchema::new("ctaLabel", "Button label", Text),
                FieldSchema::new("ctaUrl", "Button link", Url),
            ],
        ),
        define(
            "TextBlock",
            "Text",
            "Formatted paragraphs, lists and links",
            Category::Content,
            json!({ "content": "<p>Start writing…</p>", "alignment": "left" }),
            vec![
                FieldSchema::new("content", "Content", RichText),
                FieldSchema::new("alignment", "Alignment", alignment.clone()),
            ],
        ),
        define(
            "Testimonial",
            "Testimonial",
            "Customer quote with attribution",
            Category::Content,
            json!({ "quote": "", "author": "", "role": "" }),
            vec![
                FieldSchema::new("quote", "Quote", Textarea),
                FieldSchema::new("author", "Author", Text),
                FieldSchema::new("role", "Role", Text),
            ],
        ),
        define(
            "FAQ",
            "FAQ",
            "Question and answer pair",
            Category::Content,
            json!({ "question": "Question?", "answer": "<p>Answer.</p>" }),
            vec![
                FieldSchema::new("question", "Question", Text),
                FieldSchema::new("answer", "Answer", RichText),
            ],
        ),
        define(
            "ImageBlock",
            "Image",
            "Single image with caption",
            Category::Media,
            json!({ "src": "", "alt": "", "caption": "" }),
            vec![
                FieldSchema::new("src", "Image", Image),
                FieldSchema::new("alt", "Alt text", Text),
                FieldSchema::new("caption", "Caption", Text),
            ],
        ),
        define(
            "Video",
            "Video",
            "Embedded video player",
            Category::Media,
            json!({ "url": "", "autoplay": false }),
            vec![
                FieldSchema::new("url", "Video URL", Url),
                FieldSchema::new("autoplay", "Autoplay", Boolean),
            ],
        ),
        define(
            "CallToAction",
            "Call to action",
            "Highlighted banner prompting the visitor to act",
            Category::Marketing,
            json!({
                "title": "Ready to talk?",
                "description": "",
                "buttonLabel": "Contact us",
                "buttonUrl": "/contact"
            }),
            vec![
                FieldSchema::new("title", "Title", Text),
                FieldSchema::new("description", "Description", Textarea),
                FieldSchema::new("buttonLabel", "Button label", Text),
                FieldSchema::new("buttonUrl", "Button link", Url),
            ],
        ),
        define(
            "FeatureGrid",
            "Feature grid",
            "Grid of product features with icons",
            Category::Marketing,
            json!({ "title": "Features", "columns": 3 }),
            vec![
                FieldSchema::new("title", "Title", Text),
                FieldSchema::new("columns", "Columns", Number),
            ],
        ),
        define(
            "ContactForm",
            "Contact form",
            "Lead capture form sending enquiries by email",
            Category::Forms,
            json!({ "title": "Get in touch", "submitLabel": "Send", "showPhone": false }),
            vec![
                FieldSchema::new("title", "Title", Text),
                FieldSchema::new("submitLabel", "Submit label", Text),
                FieldSchema::new("showPhone", "Ask for phone number", Boolean),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds_are_unique() {
        let catalog = ComponentCatalog::builtin();
        let mut kinds: Vec<&str> = catalog.definitions().iter().map(|d| d.kind.as_str()).collect();
        let total = kinds.len();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), total);
    }

    #[test]
    fn test_default_configuration_covers_declared_fields() {
        for def in ComponentCatalog::builtin().definitions() {
            for field in &def.fields {
                assert!(
                    def.default_configuration.contains_key(&field.key),
                    "{} is missing a default for {}",
                    def.kind,
                    field.key
                );
            }
        }
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Media".parse::<Category>().unwrap(), Category::Media);
        assert!("widgets".parse::<Category>().is_err());
    }

    #[test]
    fn test_grouping_preserves_catalog_order() {
        let groups = ComponentCatalog::builtin().by_category();
        assert_eq!(groups[0].0, Category::Layout);
        assert_eq!(groups[0].1[0].kind, "Spacer");
        let content: Vec<&str> = groups[1].1.iter().map(|d| d.kind.as_str()).collect();
        assert_eq!(content, vec!["Hero", "TextBlock", "Testimonial", "FAQ"]);
    }
}
