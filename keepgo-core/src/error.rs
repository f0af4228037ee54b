//! Error types for keepgo-core.

use thiserror::Error;

/// Failures from the native command boundary.
///
/// A command that ran and exited non-zero is only an error when it goes
/// through [`CommandRunner::run`](crate::runner::CommandRunner::run);
/// [`CommandRunner::output`](crate::runner::CommandRunner::output) reports
/// the exit code as data.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The process could not be spawned (binary missing, permission denied).
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully.
    #[error("`{command}` exited with {}: {stderr}", code.map_or_else(|| "signal".to_string(), |c| format!("status {c}")))]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl RunnerError {
    /// Exit code of the failed command, if it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunnerError::Spawn { .. } => None,
            RunnerError::Exit { code, .. } => *code,
        }
    }
}

/// Errors from version comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("version length mismatch: {left} vs {right} components")]
    LengthMismatch { left: usize, right: usize },
}
