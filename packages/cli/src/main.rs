mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{catalog, edit, CatalogArgs, EditArgs};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// cmsedit - In-place content editing from the command line
#[derive(Parser, Debug)]
#[command(name = "cmsedit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./cmsedit.config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the component catalog
    Catalog(CatalogArgs),

    /// Replay an edit script against a document and optionally save it
    Edit(EditArgs),
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_file(path),
        None => {
            let cwd = std::env::current_dir()?.display().to_string();
            Config::load(&cwd)
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config);

    match cli.command {
        Command::Catalog(args) => catalog(args),
        Command::Edit(args) => edit(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
