use anyhow::Result;
use clap::Args;
use cmsedit_catalog::{Category, ComponentCatalog, ComponentPicker};
use colored::Colorize;

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Only show one category (layout, content, media, marketing, forms)
    #[arg(short, long)]
    pub category: Option<Category>,

    /// Filter by display name or description
    #[arg(short, long)]
    pub search: Option<String>,
}

pub fn catalog(args: CatalogArgs) -> Result<()> {
    let mut picker = ComponentPicker::new(ComponentCatalog::builtin());
    if let Some(query) = args.search {
        picker.set_query(query);
    }
    picker.set_category(args.category);

    let groups = picker.grouped_results();
    if groups.is_empty() {
        println!("{}", "No matching components".yellow());
        return Ok(());
    }

    for (category, definitions) in groups {
        println!("{}", category.display_name().bright_blue().bold());
        for definition in definitions {
            println!(
                "  {} {} - {}",
                format!("{:<14}", definition.kind).green(),
                definition.display_name,
                definition.description.dimmed()
            );
        }
        println!();
    }

    Ok(())
}
