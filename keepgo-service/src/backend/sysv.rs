//! Generic SysV init: LSB scripts in `/etc/init.d`, enabled through
//! `/etc/rcN.d` links and driven through `service`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use keepgo_core::{Host, ServiceConfig, Status};
use keepgo_detector as detect;
use keepgo_renderer::{Capabilities, UnitKind};

use super::{
    ensure_absent, ensure_installed, lsb_status, remove_unit, render_config, write_unit, Backend,
};
use crate::error::{io_err, ServiceError};
use crate::paths;
use crate::registry::{interactive_or_assume, InitSystem};

pub const PLATFORM: &str = "unix-systemv";

/// Last-resort candidate: always detected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysV;

impl InitSystem for SysV {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn detect(&self, _host: &Host) -> bool {
        true
    }

    fn interactive(&self, host: &Host) -> bool {
        interactive_or_assume(detect::is_interactive(host))
    }

    fn backend(&self, host: Host, config: Arc<ServiceConfig>) -> Result<Box<dyn Backend>, ServiceError> {
        Ok(Box::new(SysVService { host, config }))
    }
}

#[derive(Debug)]
pub struct SysVService {
    host: Host,
    config: Arc<ServiceConfig>,
}

impl SysVService {
    fn service(&self, action: &str) -> Result<(), ServiceError> {
        self.host.runner().run("service", &[self.config.name.as_str(), action])?;
        Ok(())
    }

    fn link_rc_dirs(&self, script: &Path) -> Result<(), ServiceError> {
        for link in paths::sysv_rc_links(&self.config.name) {
            let target = self.host.resolve(&link);
            if let Some(dir) = target.parent() {
                fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
            }
            // Leftover from an earlier install.
            if fs::symlink_metadata(&target).is_ok() {
                tracing::warn!(link = %link.display(), "replacing stale rc link");
                remove_link(&target)?;
            }
            symlink(script, &target).map_err(|e| io_err(&target, e))?;
        }
        Ok(())
    }

    fn unlink_rc_dirs(&self) -> Result<(), ServiceError> {
        for link in paths::sysv_rc_links(&self.config.name) {
            remove_link(&self.host.resolve(&link))?;
        }
        Ok(())
    }
}

fn remove_link(target: &Path) -> Result<(), ServiceError> {
    match fs::remove_file(target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(target, e)),
    }
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(not(unix))]
fn symlink(_original: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "rc links need a unix host"))
}

impl Backend for SysVService {
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
        render_config(&self.config, UnitKind::SysV, Capabilities::default())
    }

    fn install(&self) -> Result<(), ServiceError> {
        let path = self.config_path()?;
        ensure_absent(&self.host, &path)?;
        let script = self.render()?;
        write_unit(&self.host, &path, &script, UnitKind::SysV)?;
        if let Err(err) = self.link_rc_dirs(&path) {
            // Leave nothing behind so the next install starts clean.
            for link in paths::sysv_rc_links(&self.config.name) {
                let _ = remove_link(&self.host.resolve(&link));
            }
            let _ = remove_unit(&self.host, &path);
            return Err(err);
        }
        tracing::info!(service = %self.config.name, path = %path.display(), "installed sysv script");
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        let path = self.config_path()?;
        ensure_installed(&self.host, &path)?;
        self.unlink_rc_dirs()?;
        remove_unit(&self.host, &path)?;
        tracing::info!(service = %self.config.name, "uninstalled sysv script");
        Ok(())
    }

    fn start(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.service("start")
    }

    fn stop(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.service("stop")
    }

    fn restart(&self) -> Result<(), ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        self.service("restart")
    }

    fn status(&self) -> Result<Status, ServiceError> {
        ensure_installed(&self.host, &self.config_path()?)?;
        let out = self.host.runner().output("service", &[self.config.name.as_str(), "status"])?;
        lsb_status(out.code, out.stdout)
    }
}
