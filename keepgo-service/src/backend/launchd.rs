//! launchd: property lists in `/Library/LaunchDaemons` (or the user's
//! `LaunchAgents`), loaded with `launchctl bootstrap` and unloaded with
//! `bootout`.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use keepgo_core::{Host, ServiceConfig, Status};
use keepgo_detector as detect;
use keepgo_renderer::{Capabilities, UnitKind};

use super::{ensure_absent, ensure_installed, remove_unit, render_config, write_unit, Backend};
use crate::error::ServiceError;
use crate::paths;
use crate::registry::InitSystem;

pub const PLATFORM: &str = "darwin-launchd";

#[derive(Debug, Clone, Copy, Default)]
pub struct Launchd;

impl InitSystem for Launchd {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn detect(&self, host: &Host) -> bool {
        detect::is_launchd(host)
    }

    fn interactive(&self, host: &Host) -> bool {
        detect::is_interactive_darwin(host)
    }

    fn backend(&self, host: Host, config: Arc<ServiceConfig>) -> Result<Box<dyn Backend>, ServiceError> {
        Ok(Box::new(LaunchdService { host, config }))
    }
}

#[derive(Debug)]
pub struct LaunchdService {
    host: Host,
    config: Arc<ServiceConfig>,
}

impl LaunchdService {
    fn user(&self) -> bool {
        self.config.options.user_service
    }

    /// `system` for daemons, `gui/<uid>` for user agents.
    fn domain(&self) -> Result<String, ServiceError> {
        if !self.user() {
            return Ok("system".to_string());
        }

        let output = self.host.runner().output("id", &["-u"])?;
        if !output.success() {
            return Err(ServiceError::Launchd(format!(
                "failed to resolve current uid (status {:?})",
                output.code
            )));
        }
        let uid = output.stdout.trim();
        if uid.is_empty() {
            return Err(ServiceError::Launchd("current uid from `id -u` was empty".to_string()));
        }
        Ok(format!("gui/{uid}"))
    }

    fn service_target(&self) -> Result<String, ServiceError> {
        Ok(format!("{}/{}", self.domain()?, self.config.name))
    }

    fn launchctl(&self, args: &[&str]) -> Result<(), ServiceError> {
        self.host.runner().run("launchctl", args)?;
        Ok(())
    }
}

fn pid_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""PID" = ([0-9]+);"#).expect("static regex pattern is valid"))
}

impl Backend for LaunchdService {
    fn platform(&self) -> &'static str {
        PLATFORM
    }

    fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn config_path(&self) -> Result<PathBuf, ServiceError> {
        if !self.user() {
            return Ok(paths::launch_daemon_plist(&self.config.name));
        }
        let home = self.host.home().ok_or(ServiceError::NoHomeDirectory)?;
        Ok(paths::launch_agent_plist(home, &self.config.name))
    }

    fn render(&self) -> Result<String, ServiceError> {
        render_config(&self.config, UnitKind::Launchd, Capabilities::default())
    }

    fn install(&self) -> Result<(), ServiceError> {
        let plist = self.config_path()?;
        ensure_absent(&self.host, &plist)?;
        let contents = self.render()?;
        write_unit(&self.host, &plist, &contents, UnitKind::Launchd)?;
        tracing::info!(service = %self.config.name, path = %plist.display(), "installed launchd plist");
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        let plist = self.config_path()?;
        ensure_installed(&self.host, &plist)?;

        // bootout fails whenever the job is not loaded.
        let target = self.service_target()?;
        if let Err(e) = self.launchctl(&["bootout", target.as_str()]) {
            tracing::warn!(service = %self.config.name, error = %e, "launchctl bootout failed; continuing");
        }
        remove_unit(&self.host, &plist)?;
        tracing::info!(service = %self.config.name, "uninstalled launchd plist");
        Ok(())
    }

    fn start(&self) -> Result<(), ServiceError> {
        let plist = self.config_path()?;
        ensure_installed(&self.host, &plist)?;
        let domain = self.domain()?;
        let plist = plist.display().to_string();
        self.launchctl(&["bootstrap", domain.as_str(), plist.as_str()])
    }

    fn stop(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        let target = self.service_target()?;
        self.launchctl(&["bootout", target.as_str()])
    }

    fn restart(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        let target = self.service_target()?;
        self.launchctl(&["kickstart", "-k", target.as_str()])
    }

    fn status(&self) -> Result<Status, ServiceError> {
        let out = self.host.runner().output("launchctl", &["list", self.config.name.as_str()])?;
        if pid_pattern().is_match(&out.stdout) {
            return Ok(Status::Running);
        }
        if self.host.exists(self.config_path()?) {
            return Ok(Status::Stopped);
        }
        Err(ServiceError::NotInstalled)
    }
}
