//! The native command boundary.
//!
//! Every interaction with an init system goes through a [`CommandRunner`]:
//! `output` for queries whose exit code and stdout are classified by the
//! caller, `run` for fire-and-forget actions where any non-zero exit is an
//! error.

use std::collections::HashMap;
use std::fmt;
use std::process::Command;
use std::sync::{Mutex, PoisonError};

use crate::error::RunnerError;

/// Captured result of a native command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(code: i32, stdout: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes native OS commands on behalf of probes and backends.
pub trait CommandRunner: Send + Sync + fmt::Debug {
    /// Run `command` with `args` and capture its output.
    ///
    /// Only failures to run the process at all are errors; a non-zero exit
    /// code is reported in [`CommandOutput::code`].
    fn output(&self, command: &str, args: &[&str]) -> Result<CommandOutput, RunnerError>;

    /// Run `command` and treat any unsuccessful exit as an error.
    fn run(&self, command: &str, args: &[&str]) -> Result<(), RunnerError> {
        let output = self.output(command, args)?;
        if output.success() {
            return Ok(());
        }
        Err(RunnerError::Exit {
            command: command_line(command, args),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        })
    }
}

/// `command arg1 arg2 ...` as a single display string.
pub fn command_line(command: &str, args: &[&str]) -> String {
    let mut line = command.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Runs commands with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, command: &str, args: &[&str]) -> Result<CommandOutput, RunnerError> {
        let line = command_line(command, args);
        tracing::debug!(command = %line, "running native command");

        let output = Command::new(command)
            .args(args)
            .output()
            .map_err(|source| RunnerError::Spawn {
                command: line.clone(),
                source,
            })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(command = %line, code = ?result.code, "native command finished");
        Ok(result)
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Output(CommandOutput),
    Missing,
}

/// Records every invocation and answers from a script instead of running
/// anything.
///
/// Responses are keyed by the full command line (see [`command_line`]).
/// Unscripted commands succeed with empty output.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    responses: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `line` with `output` from now on.
    pub fn respond(&self, line: &str, output: CommandOutput) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(line.to_string(), Scripted::Output(output));
        self
    }

    /// Make `line` fail as if its binary did not exist.
    pub fn respond_missing(&self, line: &str) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(line.to_string(), Scripted::Missing);
        self
    }

    /// Command lines run so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl CommandRunner for RecordingRunner {
    fn output(&self, command: &str, args: &[&str]) -> Result<CommandOutput, RunnerError> {
        let line = command_line(command, args);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.clone());

        let scripted = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&line)
            .cloned();
        match scripted {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::Missing) => Err(RunnerError::Spawn {
                command: line,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
            None => Ok(CommandOutput::new(0, "")),
        }
    }
}
