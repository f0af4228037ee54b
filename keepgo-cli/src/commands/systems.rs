//! `keepgo systems`: which init systems exist here and which one wins.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use keepgo_service::Registry;

#[derive(Args, Debug)]
pub struct SystemsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct SystemJson {
    name: &'static str,
    detected: bool,
    active: bool,
}

#[derive(Tabled)]
struct SystemRow {
    #[tabled(rename = "init system")]
    name: String,
    #[tabled(rename = "detected")]
    detected: String,
    #[tabled(rename = "active")]
    active: String,
}

impl SystemsArgs {
    pub fn run(self) -> Result<()> {
        let registry = Registry::detect();
        let rows: Vec<SystemJson> = super::all_systems()
            .iter()
            .map(|system| SystemJson {
                name: system.name(),
                detected: system.detect(registry.host()),
                active: system.name() == registry.platform(),
            })
            .collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize systems JSON")?
            );
            return Ok(());
        }

        let interactive = if registry.interactive() { "interactive" } else { "service" };
        match registry.platform() {
            "" => println!("{} ({interactive} session)", "no init system detected".red()),
            platform => println!("active: {} ({interactive} session)", platform.bold()),
        }

        let table_rows: Vec<SystemRow> = rows
            .into_iter()
            .map(|row| SystemRow {
                name: row.name.to_string(),
                detected: if row.detected { "yes".green().to_string() } else { "no".bright_black().to_string() },
                active: if row.active { "●".green().to_string() } else { String::new() },
            })
            .collect();
        let mut table = Table::new(table_rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
