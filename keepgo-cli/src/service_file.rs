//! YAML service files.
//!
//! ```yaml
//! name: web
//! display_name: Web Frontend
//! description: Serves the dashboard
//! options:
//!   KeepAlive: true
//!   UserService: false
//! workload:
//!   exec: /usr/bin/python3
//!   args: ["-m", "http.server", "8080"]
//!   dir: /srv/www
//!   env:
//!     PYTHONUNBUFFERED: "1"
//! ```
//!
//! Without `executable`/`arguments` the installed unit runs
//! `keepgo run --config <this file>`, which supervises `workload`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use keepgo_core::{KeyValue, ServiceConfig, ServiceOptions};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceFile {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub user_name: Option<String>,
    pub executable: Option<PathBuf>,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub working_directory: Option<PathBuf>,
    pub chroot: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub options: KeyValue,
    pub workload: Option<Workload>,
}

/// The program `keepgo run` starts and stops.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Workload {
    pub exec: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ServiceFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read service file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse service file {}", path.display()))
    }

    /// Map onto a [`ServiceConfig`]. `path` is where this file was loaded
    /// from; the default command line points back at it.
    pub fn to_config(&self, path: &Path) -> Result<ServiceConfig> {
        let (executable, arguments) = if self.executable.is_none() && self.arguments.is_empty() {
            let exe = std::env::current_exe().context("failed to locate the keepgo binary")?;
            let file = std::path::absolute(path)
                .with_context(|| format!("failed to resolve {}", path.display()))?;
            let args = vec!["run".to_string(), "--config".to_string(), file.display().to_string()];
            (Some(exe), args)
        } else {
            (self.executable.clone(), self.arguments.clone())
        };

        Ok(ServiceConfig {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            user_name: self.user_name.clone(),
            arguments,
            executable,
            dependencies: self.dependencies.clone(),
            working_directory: self.working_directory.clone(),
            chroot: self.chroot.clone(),
            env_vars: self.env.clone(),
            options: ServiceOptions::from_key_values(&self.options),
        })
    }
}
