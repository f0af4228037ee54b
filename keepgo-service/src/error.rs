use std::path::PathBuf;

use thiserror::Error;

use keepgo_core::{ControlAction, RunnerError, UnknownAction};
use keepgo_renderer::RenderError;

/// Boxed error returned by caller-supplied [`Controller`](crate::Controller)
/// hooks.
pub type ControllerError = Box<dyn std::error::Error + Send + Sync>;

/// Error surface for registry selection, backends and the service facade.
///
/// A status query that fails reports the service as unknown; the variant
/// says why. [`ServiceError::NotInstalled`] is the "no config file" case.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service name is required")]
    NameRequired,

    #[error("invalid service name {name:?}: path separators are not allowed")]
    InvalidName { name: String },

    #[error("no supported init system detected")]
    NoSystemDetected,

    #[error("{platform} does not support user services")]
    UserServiceUnsupported { platform: &'static str },

    #[error("no home directory available for a user service")]
    NoHomeDirectory,

    #[error("init file already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("the service is not installed")]
    NotInstalled,

    #[error(transparent)]
    Command(#[from] RunnerError),

    #[error("the service is in a failed state")]
    FailedState,

    #[error("unexpected status {}: {output}", code.map_or_else(|| "signal".to_string(), |c| format!("code {c}")))]
    UnexpectedStatus { code: Option<i32>, output: String },

    #[error("failed to {action} {service}: {source}")]
    Control {
        action: ControlAction,
        service: String,
        #[source]
        source: Box<ServiceError>,
    },

    #[error(transparent)]
    UnknownAction(#[from] UnknownAction),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to resolve the service executable: {0}")]
    Executable(#[source] std::io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("controller {phase} failed: {source}")]
    Controller {
        phase: &'static str,
        #[source]
        source: ControllerError,
    },

    #[error("failed to wait for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),

    #[error("launchd error: {0}")]
    Launchd(String),
}

impl ServiceError {
    /// Whether this is the "not installed" sentinel, directly or wrapped by
    /// `control`.
    pub fn is_not_installed(&self) -> bool {
        match self {
            ServiceError::NotInstalled => true,
            ServiceError::Control { source, .. } => source.is_not_installed(),
            _ => false,
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ServiceError {
    ServiceError::Io {
        path: path.into(),
        source,
    }
}
