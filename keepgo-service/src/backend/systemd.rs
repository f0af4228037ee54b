//! systemd: units in `/etc/systemd/system`, or the user manager's unit
//! directory for user services, driven through `systemctl`.

use std::path::PathBuf;
use std::sync::Arc;

use keepgo_core::{Host, ServiceConfig, Status};
use keepgo_detector as detect;
use keepgo_renderer::{Capabilities, UnitKind};

use super::{ensure_absent, ensure_installed, remove_unit, render_config, write_unit, Backend};
use crate::error::ServiceError;
use crate::paths;
use crate::registry::{interactive_or_assume, InitSystem};

pub const PLATFORM: &str = "linux-systemd";

#[derive(Debug, Clone, Copy, Default)]
pub struct Systemd;

impl InitSystem for Systemd {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn detect(&self, host: &Host) -> bool {
        detect::is_systemd(host)
    }

    fn interactive(&self, host: &Host) -> bool {
        interactive_or_assume(detect::is_interactive(host))
    }

    fn backend(&self, host: Host, config: Arc<ServiceConfig>) -> Result<Box<dyn Backend>, ServiceError> {
        Ok(Box::new(SystemdService { host, config }))
    }
}

#[derive(Debug)]
pub struct SystemdService {
    host: Host,
    config: Arc<ServiceConfig>,
}

impl SystemdService {
    fn unit(&self) -> String {
        paths::systemd_unit_name(&self.config.name)
    }

    fn user(&self) -> bool {
        self.config.options.user_service
    }

    /// `systemctl [--user] <args>`, failing on a non-zero exit.
    fn systemctl(&self, args: &[&str]) -> Result<(), ServiceError> {
        let args = self.args(args);
        self.host.runner().run("systemctl", &args)?;
        Ok(())
    }

    fn args<'a>(&self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = Vec::with_capacity(args.len() + 1);
        if self.user() {
            full.push("--user");
        }
        full.extend_from_slice(args);
        full
    }

    fn capabilities(&self) -> Capabilities {
        let version = detect::systemd_version(&self.host).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "systemd version unknown");
            None
        });
        Capabilities {
            has_output_file_support: detect::systemd_supports_output_file(version),
            ..Capabilities::default()
        }
    }
}

impl Backend for SystemdService {
    fn platform(&self) -> &'static str {
        PLATFORM
    }

    fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn config_path(&self) -> Result<PathBuf, ServiceError> {
        if !self.user() {
            return Ok(paths::systemd_system_unit(&self.config.name));
        }
        let home = self.host.home().ok_or(ServiceError::NoHomeDirectory)?;
        Ok(paths::systemd_user_unit(home, &self.config.name))
    }

    fn render(&self) -> Result<String, ServiceError> {
        render_config(&self.config, UnitKind::Systemd, self.capabilities())
    }

    fn install(&self) -> Result<(), ServiceError> {
        let path = self.config_path()?;
        ensure_absent(&self.host, &path)?;
        let unit = self.render()?;
        write_unit(&self.host, &path, &unit, UnitKind::Systemd)?;

        let name = self.unit();
        self.systemctl(&["enable", name.as_str()])?;
        self.systemctl(&["daemon-reload"])?;
        tracing::info!(service = %self.config.name, path = %path.display(), "installed systemd unit");
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        let path = self.config_path()?;
        ensure_installed(&self.host, &path)?;

        let name = self.unit();
        self.systemctl(&["disable", name.as_str()])?;
        remove_unit(&self.host, &path)?;
        self.systemctl(&["daemon-reload"])?;
        tracing::info!(service = %self.config.name, "uninstalled systemd unit");
        Ok(())
    }

    fn start(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.systemctl(&["start", self.unit().as_str()])
    }

    fn stop(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.systemctl(&["stop", self.unit().as_str()])
    }

    fn restart(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.systemctl(&["restart", self.unit().as_str()])
    }

    fn status(&self) -> Result<Status, ServiceError> {
        let unit = self.unit();
        let out = self.host.runner().output("systemctl", &self.args(&["is-active", unit.as_str()]))?;
        let state = out.stdout.trim_start();

        if state.starts_with("active") || state.starts_with("activating") {
            return Ok(Status::Running);
        }
        if state.starts_with("inactive") {
            let files = self
                .host
                .runner()
                .output("systemctl", &self.args(&["list-unit-files", "-t", "service", unit.as_str()]))?;
            if files.stdout.contains(unit.as_str()) {
                return Ok(Status::Stopped);
            }
            return Err(ServiceError::NotInstalled);
        }
        if state.starts_with("failed") {
            return Err(ServiceError::FailedState);
        }
        Err(ServiceError::NotInstalled)
    }
}
