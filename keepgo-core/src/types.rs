//! Domain types shared by every keepgo crate.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::ServiceOptions;

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Declarative description of one service.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Unique identifier; embedded in unit file names.
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Account the service runs as.
    pub user_name: Option<String>,
    pub arguments: Vec<String>,
    /// Explicit program path; the running binary when unset.
    pub executable: Option<PathBuf>,
    /// Backend-specific directive lines, emitted verbatim.
    pub dependencies: Vec<String>,
    pub working_directory: Option<PathBuf>,
    pub chroot: Option<PathBuf>,
    pub env_vars: BTreeMap<String, String>,
    pub options: ServiceOptions,
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Absolute path of the program the service runs.
    pub fn exec_path(&self) -> io::Result<PathBuf> {
        match &self.executable {
            Some(path) => std::path::absolute(path),
            None => std::env::current_exe(),
        }
    }

    /// Display name, falling back to the name.
    pub fn display_string(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Normalized service state.
///
/// `Unknown` covers both "not installed" and "could not tell"; the error
/// returned alongside it tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Unknown,
    Running,
    Stopped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unknown => write!(f, "unknown"),
            Status::Running => write!(f, "running"),
            Status::Stopped => write!(f, "stopped"),
        }
    }
}

// ---------------------------------------------------------------------------
// ControlAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Start,
    Stop,
    Restart,
    Install,
    Uninstall,
}

impl ControlAction {
    pub const ALL: [ControlAction; 5] = [
        ControlAction::Start,
        ControlAction::Stop,
        ControlAction::Restart,
        ControlAction::Install,
        ControlAction::Uninstall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlAction::Start => "start",
            ControlAction::Stop => "stop",
            ControlAction::Restart => "restart",
            ControlAction::Install => "install",
            ControlAction::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`ControlAction::from_str`] for anything but the exact
/// lowercase action names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action {0:?}")]
pub struct UnknownAction(pub String);

impl FromStr for ControlAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
