//! `keepgo run`: what an installed unit executes. Starts the workload,
//! waits for the init system to ask for shutdown, then stops it.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::controller::ProcessController;
use crate::service_file::ServiceFile;

pub fn run(config: &Path) -> Result<()> {
    let file = ServiceFile::load(config)?;
    let workload = file
        .workload
        .clone()
        .with_context(|| format!("{} has no workload section", config.display()))?;

    let service = super::bind(config, &file, Arc::new(ProcessController::new(workload)))?;
    let logger = service.logger(None);
    logger.info(&format!("running under {}", service.platform()));

    if let Err(e) = service.run() {
        logger.error(&format!("service exited with error: {e}"));
        return Err(e).context("service run failed");
    }
    logger.info("shut down cleanly");
    Ok(())
}
