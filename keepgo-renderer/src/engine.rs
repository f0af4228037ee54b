//! [`UnitKind`] and the [`render_unit`] entry point.
//!
//! | Kind    | Artifact                  | Override option  |
//! |---------|---------------------------|------------------|
//! | Systemd | `<name>.service` unit     | `SystemdScript`  |
//! | Upstart | `<name>.conf` job         | `UpstartScript`  |
//! | OpenRc  | `openrc-run` script       | `OpenRCScript`   |
//! | Rcs     | BusyBox rcS init script   | `RCSScript`      |
//! | SysV    | LSB init script           | `SysvScript`     |
//! | Launchd | XML property list         | `LaunchdConfig`  |

use std::fmt;

use tera::Tera;

use keepgo_core::options;

use crate::builtin;
use crate::context::TemplateContext;
use crate::error::RenderError;

/// Every artifact format keepgo can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Systemd,
    Upstart,
    OpenRc,
    Rcs,
    SysV,
    Launchd,
}

impl UnitKind {
    /// All kinds in a stable order.
    pub fn all() -> &'static [UnitKind] {
        &[
            UnitKind::Systemd,
            UnitKind::Upstart,
            UnitKind::OpenRc,
            UnitKind::Rcs,
            UnitKind::SysV,
            UnitKind::Launchd,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Systemd => "systemd",
            UnitKind::Upstart => "upstart",
            UnitKind::OpenRc  => "openrc",
            UnitKind::Rcs     => "rcs",
            UnitKind::SysV    => "sysv",
            UnitKind::Launchd => "launchd",
        }
    }

    /// Option key whose value replaces the built-in template.
    pub fn override_key(&self) -> &'static str {
        match self {
            UnitKind::Systemd => options::SYSTEMD_SCRIPT,
            UnitKind::Upstart => options::UPSTART_SCRIPT,
            UnitKind::OpenRc  => options::OPENRC_SCRIPT,
            UnitKind::Rcs     => options::RCS_SCRIPT,
            UnitKind::SysV    => options::SYSV_SCRIPT,
            UnitKind::Launchd => options::LAUNCHD_CONFIG,
        }
    }

    /// Log directory used when `LogDirectory` is unset.
    pub fn default_log_directory(&self) -> &'static str {
        match self {
            UnitKind::Launchd => "/usr/local/var/log",
            _ => "/var/log",
        }
    }

    /// Whether the artifact is an executable script.
    pub fn is_script(&self) -> bool {
        matches!(self, UnitKind::OpenRc | UnitKind::Rcs | UnitKind::SysV)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the artifact for `kind`.
///
/// With `custom` set, that tera template is rendered against `ctx` instead
/// of the built-in format. Autoescaping is off; the context already carries
/// pre-escaped fields.
pub fn render_unit(
    kind: UnitKind,
    ctx: &TemplateContext,
    custom: Option<&str>,
) -> Result<String, RenderError> {
    if let Some(template) = custom {
        let tera_ctx = ctx.to_tera_context()?;
        return Tera::one_off(template, &tera_ctx, false).map_err(|source| RenderError::Override {
            key: kind.override_key(),
            source,
        });
    }

    let rendered = match kind {
        UnitKind::Systemd => builtin::systemd(ctx)?,
        UnitKind::Upstart => builtin::upstart(ctx)?,
        UnitKind::OpenRc  => builtin::openrc(ctx)?,
        UnitKind::Rcs     => builtin::rcs(ctx)?,
        UnitKind::SysV    => builtin::sysv(ctx)?,
        UnitKind::Launchd => builtin::launchd(ctx)?,
    };
    Ok(rendered)
}
