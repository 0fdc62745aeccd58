//! `cvtpl filters`: list the value filters usable in `{{employee.path | filter}}`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use cvtpl_renderer::Filter;

/// Arguments for `cvtpl filters`.
#[derive(Args, Debug)]
pub struct FiltersArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled, Serialize)]
struct FilterRow {
    #[tabled(rename = "filter")]
    name: &'static str,
    #[tabled(rename = "usage")]
    usage: &'static str,
    #[tabled(rename = "description")]
    description: &'static str,
}

impl FiltersArgs {
    pub fn run(self) -> Result<()> {
        let rows: Vec<FilterRow> = Filter::all()
            .iter()
            .map(|f| FilterRow {
                name: f.name(),
                usage: f.usage(),
                description: f.description(),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        println!("{}", "FILTERS".bold());
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        println!("Unknown filters and filter errors render the raw value.");
        Ok(())
    }
}
