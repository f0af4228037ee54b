//! `keepgo status`.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use keepgo_service::{ServiceError, Status};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson {
    service: String,
    platform: &'static str,
    status: Status,
    installed: bool,
    error: Option<String>,
}

impl StatusArgs {
    pub fn run(self, config: &Path) -> Result<()> {
        let service = super::open(config)?;
        let result = service.status();

        let (status, installed, error) = match &result {
            Ok(status) => (*status, true, None),
            Err(e) => (Status::Unknown, !e.is_not_installed(), Some(e.to_string())),
        };

        if self.json {
            let payload = StatusJson {
                service: service.config().name.clone(),
                platform: service.platform(),
                status,
                installed,
                error,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        println!("{} ({}): {}", service, service.platform(), label(&result));
        if let Some(error) = error.filter(|_| installed) {
            println!("  {}", error.bright_black());
        }
        Ok(())
    }
}

fn label(result: &Result<Status, ServiceError>) -> colored::ColoredString {
    match result {
        Ok(Status::Running) => "running".green().bold(),
        Ok(Status::Stopped) => "stopped".yellow(),
        Ok(Status::Unknown) => "unknown".red(),
        Err(e) if e.is_not_installed() => "not installed".bright_black(),
        Err(ServiceError::FailedState) => "failed".red().bold(),
        Err(_) => "unknown".red(),
    }
}
