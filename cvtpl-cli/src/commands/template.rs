//! `cvtpl template add|list|remove`: manage the stored template library.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use cvtpl_core::{config, library, CvTemplate, Orientation, TemplateName};

use super::home_dir;

/// Manage templates stored under `~/.cvtpl/templates`.
#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// Store an HTML file as a named template.
    Add(AddArgs),

    /// List stored templates.
    List(ListArgs),

    /// Delete a stored template.
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Template name (letters, digits, `-` and `_`).
    pub name: String,

    /// HTML file with directive markers.
    pub file: PathBuf,

    /// Page orientation: portrait | landscape. Defaults to the configured default.
    #[arg(long)]
    pub orientation: Option<Orientation>,

    /// Short description shown by `template list`.
    #[arg(long)]
    pub description: Option<String>,

    /// Overwrite an existing template of the same name.
    #[arg(long)]
    pub replace: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    pub name: String,
}

pub fn run(cmd: TemplateCommand) -> Result<()> {
    match cmd {
        TemplateCommand::Add(args) => add(args),
        TemplateCommand::List(args) => list(args),
        TemplateCommand::Remove(args) => remove(args),
    }
}

fn add(args: AddArgs) -> Result<()> {
    let home = home_dir()?;
    let html = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let orientation = match args.orientation {
        Some(o) => o,
        None => config::load_at(&home).context("failed to load config")?.default_orientation,
    };

    let name = TemplateName::from(args.name.clone());
    let existed = library::template_path_at(&home, &name).exists();
    let template = library::add_template_at(
        &home,
        name,
        html,
        orientation,
        args.description,
        args.replace,
    )
    .with_context(|| format!("failed to add template '{}'", args.name))?;

    if existed && !args.replace {
        println!(
            "· Template '{}' already exists, unchanged (use --replace to overwrite)",
            template.name
        );
    } else if existed {
        println!("✓ Replaced template '{}' ({})", template.name, template.orientation);
    } else {
        println!("✓ Added template '{}' ({})", template.name, template.orientation);
    }
    Ok(())
}

#[derive(Serialize)]
struct TemplateJson {
    name: String,
    orientation: Orientation,
    description: Option<String>,
    updated_at: String,
}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "orientation")]
    orientation: String,
    #[tabled(rename = "description")]
    description: String,
    #[tabled(rename = "updated")]
    updated: String,
}

fn list(args: ListArgs) -> Result<()> {
    let home = home_dir()?;
    let templates = library::list_templates_at(&home).context("failed to read template library")?;

    if args.json {
        let items: Vec<TemplateJson> = templates.iter().map(to_json).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if templates.is_empty() {
        println!("No templates stored.");
        println!("Run: cvtpl template add <name> <file.html>");
        return Ok(());
    }

    println!("{}", "TEMPLATES".bold());
    let rows: Vec<TemplateRow> = templates
        .iter()
        .map(|t| TemplateRow {
            name: t.name.to_string(),
            orientation: t.orientation.to_string(),
            description: t.description.clone().unwrap_or_default(),
            updated: t.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn to_json(t: &CvTemplate) -> TemplateJson {
    TemplateJson {
        name: t.name.to_string(),
        orientation: t.orientation,
        description: t.description.clone(),
        updated_at: t.updated_at.to_rfc3339(),
    }
}

fn remove(args: RemoveArgs) -> Result<()> {
    let home = home_dir()?;
    library::remove_template_at(&home, &TemplateName::from(args.name.clone()))
        .with_context(|| format!("failed to remove template '{}'", args.name))?;
    println!("✓ Removed template '{}'", args.name);
    Ok(())
}
