//! Subcommand implementations.

pub mod lifecycle;
pub mod render;
pub mod run;
pub mod status;
pub mod systems;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use keepgo_service::backend::{
    launchd::Launchd, openrc::OpenRc, rcs::Rcs, systemd::Systemd, sysv::SysV, upstart::Upstart,
};
use keepgo_service::{Controller, ControllerError, InitSystem, Registry, Service};

use crate::service_file::ServiceFile;

/// Every init system keepgo knows, whatever the build target.
pub fn all_systems() -> Vec<Arc<dyn InitSystem>> {
    vec![
        Arc::new(Systemd) as Arc<dyn InitSystem>,
        Arc::new(Upstart),
        Arc::new(OpenRc),
        Arc::new(Rcs),
        Arc::new(SysV),
        Arc::new(Launchd),
    ]
}

/// Lifecycle commands never call `run`, so their controller does nothing.
struct Idle;

impl Controller for Idle {
    fn start(&self, _service: &Service) -> Result<(), ControllerError> {
        Ok(())
    }

    fn stop(&self, _service: &Service) -> Result<(), ControllerError> {
        Ok(())
    }
}

/// Load `config` and bind it to the detected init system.
pub fn open(config: &Path) -> Result<Service> {
    let file = ServiceFile::load(config)?;
    bind(config, &file, Arc::new(Idle))
}

pub fn bind(config: &Path, file: &ServiceFile, controller: Arc<dyn Controller>) -> Result<Service> {
    let registry = Registry::detect();
    tracing::debug!(platform = registry.platform(), "init system selected");

    registry
        .new_service(controller, file.to_config(config)?)
        .with_context(|| format!("failed to set up service from {}", config.display()))
}
