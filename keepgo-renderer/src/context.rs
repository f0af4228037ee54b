//! Template context: the serializable rendering payload built from a
//! [`ServiceConfig`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use keepgo_core::ServiceConfig;

use crate::engine::UnitKind;
use crate::error::RenderError;
use crate::escape::{cmd_escape, cmd_quote};

/// Feature flags derived from the installed manager's version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// systemd `StandardOutput=file:` (systemd 236+).
    pub has_output_file_support: bool,
    /// Upstart `kill signal` stanza.
    pub has_kill_stanza: bool,
    /// Upstart `setuid` stanza.
    pub has_setuid_stanza: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            has_output_file_support: true,
            has_kill_stanza: true,
            has_setuid_stanza: true,
        }
    }
}

/// Everything a unit file can mention.
///
/// Raw values sit next to their pre-escaped forms (`path_escaped`,
/// `arguments_quoted`, `exec_start`) so user templates never need filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub user_name: Option<String>,

    /// Absolute program path.
    pub path: String,
    /// `path` with systemd escaping applied.
    pub path_escaped: String,
    pub arguments: Vec<String>,
    /// Each argument double-quoted, space separated.
    pub arguments_quoted: String,
    /// `path_escaped` followed by `arguments_quoted`.
    pub exec_start: String,

    pub dependencies: Vec<String>,
    pub working_directory: Option<String>,
    pub chroot: Option<String>,
    pub env_vars: BTreeMap<String, String>,

    pub keep_alive: bool,
    pub run_at_load: bool,
    pub session_create: bool,
    pub user_service: bool,
    pub log_output: bool,
    pub log_directory: String,
    pub prefix: String,
    pub reload_signal: Option<String>,
    pub pid_file: Option<String>,
    pub limit_nofile: Option<u64>,
    pub restart: Option<String>,
    pub success_exit_status: Option<String>,

    pub capabilities: Capabilities,
}

impl TemplateContext {
    /// Build the context for `kind` from a config and the resolved program
    /// path.
    pub fn new(
        config: &ServiceConfig,
        path: &Path,
        kind: UnitKind,
        capabilities: Capabilities,
    ) -> Self {
        let opts = &config.options;
        let path = path.display().to_string();
        let path_escaped = cmd_escape(&path);
        let arguments_quoted = config
            .arguments
            .iter()
            .map(|a| cmd_quote(a))
            .collect::<Vec<_>>()
            .join(" ");
        let exec_start = if arguments_quoted.is_empty() {
            path_escaped.clone()
        } else {
            format!("{path_escaped} {arguments_quoted}")
        };
        let log_directory = opts
            .log_directory
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| kind.default_log_directory().to_string());
        let display = |p: &Option<std::path::PathBuf>| p.as_ref().map(|p| p.display().to_string());

        Self {
            name: config.name.clone(),
            display_name: config.display_name.clone(),
            description: config.description.clone(),
            user_name: config.user_name.clone().filter(|u| !u.is_empty()),
            path,
            path_escaped,
            arguments: config.arguments.clone(),
            arguments_quoted,
            exec_start,
            dependencies: config.dependencies.clone(),
            working_directory: display(&config.working_directory),
            chroot: display(&config.chroot),
            env_vars: config.env_vars.clone(),
            keep_alive: opts.keep_alive,
            run_at_load: opts.run_at_load,
            session_create: opts.session_create,
            user_service: opts.user_service,
            log_output: opts.log_output,
            log_directory,
            prefix: opts.prefix.clone(),
            reload_signal: opts.reload_signal.clone(),
            pid_file: opts.pid_file.clone(),
            limit_nofile: opts.limit_nofile,
            restart: opts.restart.clone(),
            success_exit_status: opts.success_exit_status.clone(),
            capabilities,
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> ServiceConfig {
        let mut cfg = ServiceConfig::new("app");
        cfg.arguments = vec!["--port".into(), "80 80".into()];
        cfg
    }

    #[test]
    fn exec_start_combines_escaped_path_and_quoted_args() {
        let ctx = TemplateContext::new(
            &config(),
            Path::new("/opt/my app/app"),
            UnitKind::Systemd,
            Capabilities::default(),
        );
        assert_eq!(ctx.path_escaped, r"/opt/my\x20app/app");
        assert_eq!(ctx.arguments_quoted, r#""--port" "80 80""#);
        assert_eq!(ctx.exec_start, r#"/opt/my\x20app/app "--port" "80 80""#);
    }

    #[test]
    fn exec_start_without_arguments_is_just_the_path() {
        let ctx = TemplateContext::new(
            &ServiceConfig::new("app"),
            Path::new("/usr/bin/app"),
            UnitKind::Systemd,
            Capabilities::default(),
        );
        assert_eq!(ctx.exec_start, "/usr/bin/app");
    }

    #[test]
    fn log_directory_defaults_per_kind_and_honours_override() {
        let mut cfg = config();
        let ctx = TemplateContext::new(&cfg, Path::new("/a"), UnitKind::Launchd, Capabilities::default());
        assert_eq!(ctx.log_directory, "/usr/local/var/log");

        cfg.options.log_directory = Some(PathBuf::from("/srv/log"));
        let ctx = TemplateContext::new(&cfg, Path::new("/a"), UnitKind::Systemd, Capabilities::default());
        assert_eq!(ctx.log_directory, "/srv/log");
    }

    #[test]
    fn empty_user_name_is_treated_as_unset() {
        let mut cfg = config();
        cfg.user_name = Some(String::new());
        let ctx = TemplateContext::new(&cfg, Path::new("/a"), UnitKind::Systemd, Capabilities::default());
        assert_eq!(ctx.user_name, None);
    }

    #[test]
    fn to_tera_context_succeeds() {
        let ctx = TemplateContext::new(&config(), Path::new("/a"), UnitKind::Upstart, Capabilities::default());
        let tera_ctx = ctx.to_tera_context().expect("context conversion");
        assert!(tera_ctx.get("exec_start").is_some());
        assert!(tera_ctx.get("capabilities").is_some());
    }
}
