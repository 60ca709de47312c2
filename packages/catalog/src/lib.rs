//! # Component Catalog
//!
//! The fixed table of block kinds an editor can insert, grouped by category.
//! It is the single source of truth for two consumers:
//!
//! - the component picker, which searches it and returns a kind together with
//!   its default configuration
//! - the block property form, which looks up the declared field schema of a
//!   kind (falling back to introspection for kinds the catalog doesn't know)

mod catalog;
mod error;
mod picker;
mod schema;

pub use catalog::{Category, ComponentCatalog, ComponentDefinition, FieldSchema, FieldType};
pub use error::CatalogError;
pub use picker::{ComponentPicker, PickedComponent};
pub use schema::{resolve_schema, infer_field_type, ResolvedSchema, SchemaSource};
