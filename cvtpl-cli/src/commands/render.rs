//! `cvtpl render <template> --data <file>`: render one record.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cvtpl_core::Orientation;
use cvtpl_export::{data, pipeline, resolve_template};
use cvtpl_renderer::DocumentOptions;

use super::home_dir;

/// Arguments for `cvtpl render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Stored template name, or a path to an `.html` file.
    pub template: String,

    /// Data record file (.json, .yaml or .yml).
    #[arg(long, short = 'd', value_name = "FILE")]
    pub data: PathBuf,

    /// Wrap the output into a standalone document with orientation styling.
    #[arg(long)]
    pub document: bool,

    /// Page orientation: portrait | landscape. Defaults to the template's.
    #[arg(long, requires = "document")]
    pub orientation: Option<Orientation>,

    /// Document title. Defaults to the record's first and last name.
    #[arg(long, requires = "document")]
    pub title: Option<String>,

    /// Write to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: Option<PathBuf>,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let (config, renderer) = pipeline::renderer_at(&home).context("failed to set up renderer")?;
        let template = resolve_template(&home, &self.template, &config)
            .with_context(|| format!("template '{}' not found", self.template))?;
        let record = data::load_record(&self.data)
            .with_context(|| format!("failed to load data from {}", self.data.display()))?;

        let rendered = if self.document {
            let options = DocumentOptions {
                orientation: self.orientation.unwrap_or(template.orientation),
                title: self.title,
                ..DocumentOptions::default()
            };
            renderer.render_document(&template.html, &record.record, &options)
        } else {
            renderer.process(&template.html, &record.record)
        };
        let output = rendered.with_context(|| format!("render failed for '{}'", template.name))?;

        match self.out {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(&path, &output)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("✓ Rendered '{}' to {}", template.name, path.display());
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(output.as_bytes())
                    .context("failed to write to stdout")?;
                stdout.flush().context("failed to flush stdout")?;
            }
        }
        Ok(())
    }
}
