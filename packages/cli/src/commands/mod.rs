pub mod catalog;
pub mod edit;
pub mod script;

pub use catalog::{catalog, CatalogArgs};
pub use edit::{edit, EditArgs};
