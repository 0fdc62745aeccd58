//! `cvtpl export <template> --data <file|dir>`: render records to HTML files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cvtpl_core::{config, Orientation};
use cvtpl_export::{
    pipeline::{self, ExportScope},
    resolve_template, ExportOptions, WriteResult,
};

use super::home_dir;

/// Arguments for `cvtpl export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Stored template name, or a path to an `.html` file.
    pub template: String,

    /// Data record file, or a directory of `.json` / `.yaml` / `.yml` files.
    #[arg(long, short = 'd', value_name = "FILE|DIR")]
    pub data: PathBuf,

    /// Output directory. Defaults to `export_dir` from the config, then `.`.
    #[arg(long, short = 'o', value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Page orientation: portrait | landscape. Defaults to the template's.
    #[arg(long)]
    pub orientation: Option<Orientation>,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let config = config::load_at(&home).context("failed to load config")?;
        let template = resolve_template(&home, &self.template, &config)
            .with_context(|| format!("template '{}' not found", self.template))?;
        let opts = ExportOptions {
            out_dir: output_dir(self.out, config.export_dir),
            orientation: self.orientation,
            dry_run: self.dry_run,
        };
        tracing::debug!(out_dir = %opts.out_dir.display(), "resolved output directory");

        let result = pipeline::run(&home, &template, &ExportScope::from_path(&self.data), &opts)
            .with_context(|| format!("export failed for '{}'", template.name))?;
        print_results(&result.template_name, &result.writes, self.dry_run);
        Ok(())
    }
}

/// `--out`, else the configured `export_dir`, else the current directory.
pub(crate) fn output_dir(out: Option<PathBuf>, configured: Option<PathBuf>) -> PathBuf {
    out.or(configured).unwrap_or_else(|| PathBuf::from("."))
}

fn print_results(template_name: &str, writes: &[WriteResult], dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let written = writes
        .iter()
        .filter(|r| matches!(r, WriteResult::Written { .. } | WriteResult::WouldWrite { .. }))
        .count();
    let unchanged = writes.len() - written;

    println!("{prefix}✓ '{template_name}' exported ({written} written, {unchanged} unchanged)");

    for r in writes {
        match r {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }
}
