//! One [`Backend`] per init system, plus the unit-file plumbing they share.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use keepgo_core::{Host, ServiceConfig, Status};
use keepgo_renderer::{render_unit, Capabilities, TemplateContext, UnitKind};

use crate::error::{io_err, ServiceError};
use crate::paths::RESTART_SETTLE_DELAY;

pub mod launchd;
pub mod openrc;
pub mod rcs;
pub mod systemd;
pub mod sysv;
pub mod upstart;

/// Lifecycle operations of a service under one init system.
///
/// `status` reports `Err` whenever the state is unknown;
/// [`ServiceError::NotInstalled`] means no config file is present.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Descriptive name of the init system, e.g. `linux-systemd`.
    fn platform(&self) -> &'static str;

    fn config(&self) -> &ServiceConfig;

    /// Logical path of the config artifact this backend installs.
    fn config_path(&self) -> Result<PathBuf, ServiceError>;

    /// The artifact `install` would write.
    fn render(&self) -> Result<String, ServiceError>;

    fn install(&self) -> Result<(), ServiceError>;
    fn uninstall(&self) -> Result<(), ServiceError>;
    fn start(&self) -> Result<(), ServiceError>;
    fn stop(&self) -> Result<(), ServiceError>;
    fn restart(&self) -> Result<(), ServiceError>;
    fn status(&self) -> Result<Status, ServiceError>;
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Render `kind` for `config`, honouring a user override template.
pub(crate) fn render_config(
    config: &ServiceConfig,
    kind: UnitKind,
    capabilities: Capabilities,
) -> Result<String, ServiceError> {
    let exec = config.exec_path().map_err(ServiceError::Executable)?;
    let ctx = TemplateContext::new(config, &exec, kind, capabilities);
    let custom = config.options.template(kind.override_key());
    Ok(render_unit(kind, &ctx, custom)?)
}

/// Fail with `AlreadyExists` when something is already at `path`.
pub(crate) fn ensure_absent(host: &Host, path: &Path) -> Result<(), ServiceError> {
    if host.exists(path) {
        return Err(ServiceError::AlreadyExists { path: path.to_path_buf() });
    }
    Ok(())
}

/// Fail with `NotInstalled` unless the config artifact exists.
pub(crate) fn ensure_installed(host: &Host, path: &Path) -> Result<(), ServiceError> {
    if !host.exists(path) {
        return Err(ServiceError::NotInstalled);
    }
    Ok(())
}

/// Write a new unit file, creating its directory. Never overwrites.
pub(crate) fn write_unit(
    host: &Host,
    path: &Path,
    contents: &str,
    kind: UnitKind,
) -> Result<(), ServiceError> {
    let target = host.resolve(path);
    if let Some(dir) = target.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
    }

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ServiceError::AlreadyExists { path: path.to_path_buf() },
            _ => io_err(&target, e),
        })?;
    file.write_all(contents.as_bytes()).map_err(|e| io_err(&target, e))?;
    set_mode(&target, if kind.is_script() { 0o755 } else { 0o644 })
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), ServiceError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), ServiceError> {
    Ok(())
}

pub(crate) fn remove_unit(host: &Host, path: &Path) -> Result<(), ServiceError> {
    let target = host.resolve(path);
    fs::remove_file(&target).map_err(|e| io_err(&target, e))
}

/// Stop, pause briefly, start.
pub(crate) fn stop_then_start(backend: &dyn Backend) -> Result<(), ServiceError> {
    backend.stop()?;
    std::thread::sleep(RESTART_SETTLE_DELAY);
    backend.start()
}

/// Classify an init script's `status` exit code: 0 running, 3 stopped.
pub(crate) fn lsb_status(code: Option<i32>, output: String) -> Result<Status, ServiceError> {
    match code {
        Some(0) => Ok(Status::Running),
        Some(3) => Ok(Status::Stopped),
        code => Err(ServiceError::UnexpectedStatus { code, output }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepgo_core::RecordingRunner;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn host(root: &TempDir) -> Host {
        Host::at(root.path(), Arc::new(RecordingRunner::new()))
    }

    #[test]
    fn write_unit_refuses_to_overwrite() {
        let root = TempDir::new().unwrap();
        let h = host(&root);
        let path = Path::new("/etc/init/web.conf");

        write_unit(&h, path, "first\n", UnitKind::Upstart).unwrap();
        let err = write_unit(&h, path, "second\n", UnitKind::Upstart).unwrap_err();

        assert!(matches!(err, ServiceError::AlreadyExists { .. }), "got: {err}");
        assert_eq!(fs::read_to_string(h.resolve(path)).unwrap(), "first\n");
    }

    #[cfg(unix)]
    #[test]
    fn scripts_are_executable_and_units_are_not() {
        use std::os::unix::fs::PermissionsExt;
        let root = TempDir::new().unwrap();
        let h = host(&root);

        write_unit(&h, Path::new("/etc/init.d/web"), "#!/bin/sh\n", UnitKind::SysV).unwrap();
        write_unit(&h, Path::new("/etc/systemd/system/web.service"), "[Unit]\n", UnitKind::Systemd).unwrap();

        let mode = |p: &str| fs::metadata(h.resolve(p)).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode("/etc/init.d/web"), 0o755);
        assert_eq!(mode("/etc/systemd/system/web.service"), 0o644);
    }

    #[test]
    fn lsb_status_codes() {
        assert_eq!(lsb_status(Some(0), String::new()).unwrap(), Status::Running);
        assert_eq!(lsb_status(Some(3), String::new()).unwrap(), Status::Stopped);
        let err = lsb_status(Some(4), "weird\n".into()).unwrap_err();
        assert!(matches!(err, ServiceError::UnexpectedStatus { code: Some(4), .. }));
    }
}
