//! # Component Picker
//!
//! A value-returning selection dialog over the catalog. It never touches the
//! document: confirming yields the chosen kind and a copy of its default
//! configuration, and the caller decides where to splice the new block.

use crate::catalog::{Category, ComponentCatalog, ComponentDefinition};
use crate::error::CatalogError;
use cmsedit_common::Configuration;

/// Result of a confirmed pick
#[derive(Debug, Clone, PartialEq)]
pub struct PickedComponent {
    pub kind: String,
    pub configuration: Configuration,
}

/// Search/filter/select state of one picker dialog
#[derive(Debug, Clone)]
pub struct ComponentPicker<'a> {
    catalog: &'a ComponentCatalog,
    query: String,
    category: Option<Category>,
    chosen: Option<String>,
}

impl<'a> ComponentPicker<'a> {
    pub fn new(catalog: &'a ComponentCatalog) -> Self {
        Self {
            catalog,
            query: String::new(),
            category: None,
            chosen: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn chosen(&self) -> Option<&str> {
        self.chosen.as_deref()
    }

    /// Update the free-text search
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.drop_hidden_choice();
    }

    /// Restrict results to one category, or `None` for all
    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
        self.drop_hidden_choice();
    }

    /// Entries visible under the current search and category, in catalog order
    pub fn results(&self) -> Vec<&'a ComponentDefinition> {
        self.catalog
            .definitions()
            .iter()
            .filter(|d| self.category.map_or(true, |c| d.category == c))
            .filter(|d| d.matches(&self.query))
            .collect()
    }

    /// Visible entries grouped by category, empty groups omitted
    pub fn grouped_results(&self) -> Vec<(Category, Vec<&'a ComponentDefinition>)> {
        let results = self.results();
        Category::ALL
            .into_iter()
            .filter_map(|c| {
                let entries: Vec<_> = results.iter().copied().filter(|d| d.category == c).collect();
                (!entries.is_empty()).then_some((c, entries))
            })
            .collect()
    }

    /// Select a kind; it must exist in the catalog
    pub fn choose(&mut self, kind: &str) -> Result<(), CatalogError> {
        self.catalog.require(kind)?;
        self.chosen = Some(kind.to_string());
        Ok(())
    }

    /// Confirm the dialog. `None` when nothing was chosen.
    pub fn confirm(self) -> Option<PickedComponent> {
        let kind = self.chosen?;
        let definition = self.catalog.get(&kind)?;
        Some(PickedComponent {
            kind,
            configuration: definition.default_configuration.clone(),
        })
    }

    fn drop_hidden_choice(&mut self) {
        if let Some(kind) = &self.chosen {
            if !self.results().iter().any(|d| &d.kind == kind) {
                self.chosen = None;
            }
        }
    }
}
