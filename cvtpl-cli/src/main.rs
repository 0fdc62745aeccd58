//! cvtpl: CV template processor CLI.
//!
//! # Usage
//!
//! ```text
//! cvtpl render <template> --data <file> [--document] [--orientation portrait|landscape] [--title <t>] [--out <file>]
//! cvtpl template add <name> <file.html> [--orientation ...] [--description <d>] [--replace]
//! cvtpl template list [--json]
//! cvtpl template remove <name>
//! cvtpl export <template> --data <file|dir> [--out <dir>] [--orientation ...] [--dry-run]
//! cvtpl diff <template> --data <file|dir> [--out <dir>]
//! cvtpl filters
//! ```
//!
//! `<template>` is a stored template name or a path to an `.html` file.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, export::ExportArgs, filters::FiltersArgs, render::RenderArgs,
    template::TemplateCommand,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "cvtpl",
    version,
    about = "Render CV data records through directive-based HTML templates",
    long_about = None,
)]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one data record through a template.
    Render(RenderArgs),

    /// Manage the stored template library.
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },

    /// Render data records to `<out>/<slug>.html` documents.
    Export(ExportArgs),

    /// Show unified diff of what export would write.
    Diff(DiffArgs),

    /// List the available value filters.
    Filters(FiltersArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Render(args) => args.run(),
        Commands::Template { command } => commands::template::run(command),
        Commands::Export(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Filters(args) => args.run(),
    }
}
