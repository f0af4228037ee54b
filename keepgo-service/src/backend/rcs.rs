//! BusyBox-style rcS: scripts in `/etc/init.d`, invoked directly.

use std::path::PathBuf;
use std::sync::Arc;

use keepgo_core::{Host, ServiceConfig, Status};
use keepgo_detector as detect;
use keepgo_renderer::{Capabilities, UnitKind};

use super::{
    ensure_absent, ensure_installed, lsb_status, remove_unit, render_config, stop_then_start,
    write_unit, Backend,
};
use crate::error::ServiceError;
use crate::paths;
use crate::registry::{interactive_or_assume, InitSystem};

pub const PLATFORM: &str = "linux-rcs";

#[derive(Debug, Clone, Copy, Default)]
pub struct Rcs;

impl InitSystem for Rcs {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn detect(&self, host: &Host) -> bool {
        detect::is_rcs(host)
    }

    fn interactive(&self, host: &Host) -> bool {
        interactive_or_assume(detect::is_interactive(host))
    }

    fn backend(&self, host: Host, config: Arc<ServiceConfig>) -> Result<Box<dyn Backend>, ServiceError> {
        Ok(Box::new(RcsService { host, config }))
    }
}

#[derive(Debug)]
pub struct RcsService {
    host: Host,
    config: Arc<ServiceConfig>,
}

impl RcsService {
    fn script(&self) -> String {
        paths::init_script(&self.config.name).display().to_string()
    }
}

impl Backend for RcsService {
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
        render_config(&self.config, UnitKind::Rcs, Capabilities::default())
    }

    fn install(&self) -> Result<(), ServiceError> {
        let path = self.config_path()?;
        ensure_absent(&self.host, &path)?;
        let script = self.render()?;
        write_unit(&self.host, &path, &script, UnitKind::Rcs)?;
        tracing::info!(service = %self.config.name, path = %path.display(), "installed rcS script");
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        let path = self.config_path()?;
        ensure_installed(&self.host, &path)?;
        remove_unit(&self.host, &path)?;
        tracing::info!(service = %self.config.name, "uninstalled rcS script");
        Ok(())
    }

    fn start(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.host.runner().run(&self.script(), &["start"])?;
        Ok(())
    }

    fn stop(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.host.runner().run(&self.script(), &["stop"])?;
        Ok(())
    }

    fn restart(&self) -> Result<(), ServiceError> {
        stop_then_start(self)
    }

    fn status(&self) -> Result<Status, ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        let out = self.host.runner().output(&self.script(), &["status"])?;
        lsb_status(out.code, out.stdout)
    }
}
