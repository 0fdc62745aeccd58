//! `cvtpl diff <template> --data <file|dir>`: unified diffs for what export would write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cvtpl_core::{config, Orientation};
use cvtpl_export::{
    pipeline::{self, ExportScope},
    resolve_template, ExportOptions,
};

use super::export::output_dir;
use super::home_dir;

/// Arguments for `cvtpl diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Stored template name, or a path to an `.html` file.
    pub template: String,

    /// Data record file, or a directory of data files.
    #[arg(long, short = 'd', value_name = "FILE|DIR")]
    pub data: PathBuf,

    /// Directory holding the previously exported files.
    #[arg(long, short = 'o', value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Page orientation: portrait | landscape. Defaults to the template's.
    #[arg(long)]
    pub orientation: Option<Orientation>,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let config = config::load_at(&home).context("failed to load config")?;
        let template = resolve_template(&home, &self.template, &config)
            .with_context(|| format!("template '{}' not found", self.template))?;
        let opts = ExportOptions {
            out_dir: output_dir(self.out, config.export_dir),
            orientation: self.orientation,
            dry_run: true,
        };

        let result = pipeline::diff(&home, &template, &ExportScope::from_path(&self.data), &opts)
            .with_context(|| format!("diff failed for '{}'", template.name))?;

        if result.diffs.is_empty() {
            println!("No differences for '{}'.", result.template_name);
            return Ok(());
        }

        for diff in result.diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
