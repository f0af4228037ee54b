//! The machine view shared by probes and backends.
//!
//! Paths handed to a [`Host`] are *logical* absolute paths such as
//! `/etc/systemd/system/app.service`. [`Host::resolve`] maps them under the
//! host's filesystem root, which is `/` in production and a temporary
//! directory in tests. Commands still receive logical paths.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::runner::{CommandRunner, SystemRunner};

/// Directories searched for native binaries when no `PATH` is inherited.
pub const DEFAULT_SEARCH_PATH: &[&str] = &[
    "/usr/local/sbin",
    "/usr/local/bin",
    "/usr/sbin",
    "/usr/bin",
    "/sbin",
    "/bin",
];

#[derive(Clone)]
pub struct Host {
    root: PathBuf,
    search_path: Vec<PathBuf>,
    home: Option<PathBuf>,
    parent_pid: u32,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("root", &self.root)
            .field("search_path", &self.search_path)
            .field("home", &self.home)
            .field("parent_pid", &self.parent_pid)
            .finish_non_exhaustive()
    }
}

impl Host {
    /// The running machine: root `/`, inherited `PATH`, real home directory
    /// and parent process, commands executed for real.
    pub fn system() -> Self {
        let search_path = match std::env::var_os("PATH") {
            Some(path) => std::env::split_paths(&path).collect(),
            None => default_search_path(),
        };
        Self {
            root: PathBuf::from("/"),
            search_path,
            home: dirs::home_dir(),
            parent_pid: current_parent_pid(),
            runner: Arc::new(SystemRunner),
        }
    }

    /// A host rooted at `root` with the default search path, no home
    /// directory and parent pid 0.
    pub fn at(root: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            root: root.into(),
            search_path: default_search_path(),
            home: None,
            parent_pid: 0,
            runner,
        }
    }

    pub fn with_search_path(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_path = dirs;
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_parent_pid(mut self, pid: u32) -> Self {
        self.parent_pid = pid;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Logical home directory, if known.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    pub fn parent_pid(&self) -> u32 {
        self.parent_pid
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Map a logical path onto the host's filesystem root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if self.root == Path::new("/") {
            return path.to_path_buf();
        }
        self.root.join(path.strip_prefix("/").unwrap_or(path))
    }

    /// Whether anything exists at the logical `path`.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.resolve(path).exists()
    }

    pub fn read_to_string(&self, path: impl AsRef<Path>) -> std::io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }

    /// Locate an executable by bare name on the host's search path.
    pub fn find_executable(&self, name: &str) -> Option<PathBuf> {
        let dirs: Vec<PathBuf> = self.search_path.iter().map(|d| self.resolve(d)).collect();
        let joined: OsString = std::env::join_paths(dirs).ok()?;
        which::which_in(name, Some(joined), &self.root).ok()
    }
}

fn default_search_path() -> Vec<PathBuf> {
    DEFAULT_SEARCH_PATH.iter().map(PathBuf::from).collect()
}

#[cfg(unix)]
fn current_parent_pid() -> u32 {
    std::os::unix::process::parent_id()
}

#[cfg(not(unix))]
fn current_parent_pid() -> u32 {
    0
}
