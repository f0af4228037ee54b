//! OpenRC: `openrc-run` scripts in `/etc/init.d`, registered with
//! `rc-update` and driven through `rc-service`.

use std::path::PathBuf;
use std::sync::Arc;

use keepgo_core::{Host, RunnerError, ServiceConfig, Status};
use keepgo_detector as detect;
use keepgo_renderer::{Capabilities, UnitKind};

use super::{
    ensure_absent, ensure_installed, remove_unit, render_config, stop_then_start, write_unit,
    Backend,
};
use crate::error::ServiceError;
use crate::paths;
use crate::registry::{interactive_or_assume, InitSystem};

pub const PLATFORM: &str = "linux-openrc";

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenRc;

impl InitSystem for OpenRc {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn detect(&self, host: &Host) -> bool {
        detect::is_openrc(host)
    }

    fn interactive(&self, host: &Host) -> bool {
        interactive_or_assume(detect::is_interactive(host))
    }

    fn backend(&self, host: Host, config: Arc<ServiceConfig>) -> Result<Box<dyn Backend>, ServiceError> {
        Ok(Box::new(OpenRcService { host, config }))
    }
}

#[derive(Debug)]
pub struct OpenRcService {
    host: Host,
    config: Arc<ServiceConfig>,
}

impl OpenRcService {
    fn rc_update(&self, action: &str) -> Result<(), ServiceError> {
        self.host.runner().run("rc-update", &[action, self.config.name.as_str()])?;
        Ok(())
    }

    fn rc_service(&self, action: &str) -> Result<(), ServiceError> {
        self.host.runner().run("rc-service", &[self.config.name.as_str(), action])?;
        Ok(())
    }
}

impl Backend for OpenRcService {
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
        Ok(paths::init_script(&self.config.name))
    }

    fn render(&self) -> Result<String, ServiceError> {
        render_config(&self.config, UnitKind::OpenRc, Capabilities::default())
    }

    fn install(&self) -> Result<(), ServiceError> {
        let path = self.config_path()?;
        ensure_absent(&self.host, &path)?;
        let script = self.render()?;
        write_unit(&self.host, &path, &script, UnitKind::OpenRc)?;
        self.rc_update("add")?;
        tracing::info!(service = %self.config.name, path = %path.display(), "installed openrc script");
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        let path = self.config_path()?;
        ensure_installed(&self.host, &path)?;
        self.rc_update("delete")?;
        remove_unit(&self.host, &path)?;
        tracing::info!(service = %self.config.name, "uninstalled openrc script");
        Ok(())
    }

    fn start(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.rc_service("start")
    }

    fn stop(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.rc_service("stop")
    }

    fn restart(&self) -> Result<(), ServiceError> {
        stop_then_start(self)
    }

    /// `rc-service` exits with errno values: 1 EPERM, 2 ENOENT, 3 ESRCH.
    fn status(&self) -> Result<Status, ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        let name = self.config.name.as_str();
        let out = self.host.runner().output("rc-service", &[name, "status"])?;
        match out.code {
            Some(0) => Ok(Status::Running),
            Some(1) => Err(ServiceError::Command(RunnerError::Exit {
                command: format!("rc-service {name} status"),
                code: out.code,
                stderr: out.stderr.trim().to_string(),
            })),
            Some(2) => Err(ServiceError::NotInstalled),
            Some(3) => Ok(Status::Stopped),
            code => Err(ServiceError::UnexpectedStatus { code, output: out.stdout }),
        }
    }
}
