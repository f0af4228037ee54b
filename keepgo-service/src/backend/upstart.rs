//! Upstart: jobs in `/etc/init`, picked up without a registration step.

use std::path::PathBuf;
use std::sync::Arc;

use keepgo_core::{Host, ServiceConfig, Status};
use keepgo_detector as detect;
use keepgo_renderer::{Capabilities, UnitKind};

use super::{ensure_absent, ensure_installed, remove_unit, render_config, write_unit, Backend};
use crate::error::ServiceError;
use crate::paths;
use crate::registry::{interactive_or_assume, InitSystem};

pub const PLATFORM: &str = "linux-upstart";

#[derive(Debug, Clone, Copy, Default)]
pub struct Upstart;

impl InitSystem for Upstart {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn detect(&self, host: &Host) -> bool {
        detect::is_upstart(host)
    }

    fn interactive(&self, host: &Host) -> bool {
        interactive_or_assume(detect::is_interactive(host))
    }

    fn backend(&self, host: Host, config: Arc<ServiceConfig>) -> Result<Box<dyn Backend>, ServiceError> {
        Ok(Box::new(UpstartService { host, config }))
    }
}

#[derive(Debug)]
pub struct UpstartService {
    host: Host,
    config: Arc<ServiceConfig>,
}

impl UpstartService {
    fn initctl(&self, action: &str) -> Result<(), ServiceError> {
        self.host.runner().run("initctl", &[action, self.config.name.as_str()])?;
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        let version = detect::upstart_version(&self.host).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "upstart version unknown");
            None
        });
        Capabilities {
            has_kill_stanza: detect::upstart_has_kill_stanza(version),
            has_setuid_stanza: detect::upstart_has_setuid_stanza(version),
            ..Capabilities::default()
        }
    }
}

impl Backend for UpstartService {
    fn platform(&self) -> &'static str {
        PLATFORM
    }

    fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn config_path(&self) -> Result<PathBuf, ServiceError> {
        if self.config.options.user_service {
            return Err(ServiceError::UserServiceUnsupported { platform: PLATFORM });
        }
        Ok(paths::upstart_job(&self.config.name))
    }

    fn render(&self) -> Result<String, ServiceError> {
        render_config(&self.config, UnitKind::Upstart, self.capabilities())
    }

    fn install(&self) -> Result<(), ServiceError> {
        let path = self.config_path()?;
        ensure_absent(&self.host, &path)?;
        let job = self.render()?;
        write_unit(&self.host, &path, &job, UnitKind::Upstart)?;
        tracing::info!(service = %self.config.name, path = %path.display(), "installed upstart job");
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        let path = self.config_path()?;
        ensure_installed(&self.host, &path)?;
        remove_unit(&self.host, &path)?;
        tracing::info!(service = %self.config.name, "uninstalled upstart job");
        Ok(())
    }

    fn start(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.initctl("start")
    }

    fn stop(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.initctl("stop")
    }

    fn restart(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.initctl("restart")
    }

    fn status(&self) -> Result<Status, ServiceError> {
        let name = self.config.name.as_str();
        let out = self.host.runner().output("initctl", &["status", name])?;

        if out.stdout.starts_with(&format!("{name} start/running")) {
            Ok(Status::Running)
        } else if out.stdout.starts_with(&format!("{name} stop/waiting")) {
            Ok(Status::Stopped)
        } else {
            Err(ServiceError::NotInstalled)
        }
    }
}
