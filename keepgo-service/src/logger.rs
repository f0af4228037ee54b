//! Log sinks handed out by [`Service::logger`](crate::Service::logger).

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// Minimal logging surface for service code; format at the call site.
pub trait Logger: Send + Sync + fmt::Debug {
    fn error(&self, message: &str);
    fn warning(&self, message: &str);
    fn info(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
    Info,
}

/// An error or warning copied to the caller's channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
struct Forward(Option<UnboundedSender<LogEntry>>);

impl Forward {
    fn send(&self, level: Level, message: &str) {
        if let Some(tx) = &self.0 {
            // A dropped receiver just means nobody is listening any more.
            let _ = tx.send(LogEntry { level, message: message.to_string() });
        }
    }
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// Logs through `tracing`, for interactive runs.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    service: String,
    forward: Forward,
}

impl ConsoleLogger {
    pub fn new(service: impl Into<String>, errs: Option<UnboundedSender<LogEntry>>) -> Self {
        Self { service: service.into(), forward: Forward(errs) }
    }
}

impl Logger for ConsoleLogger {
    fn error(&self, message: &str) {
        tracing::error!(service = %self.service, "{message}");
        self.forward.send(Level::Error, message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!(service = %self.service, "{message}");
        self.forward.send(Level::Warning, message);
    }

    fn info(&self, message: &str) {
        tracing::info!(service = %self.service, "{message}");
    }
}

// ---------------------------------------------------------------------------
// Syslog
// ---------------------------------------------------------------------------

/// Writes to the local syslog daemon under the `user` facility, tagging
/// each line with the service name.
#[derive(Debug, Clone)]
pub struct SysLogger {
    service: String,
    forward: Forward,
}

impl SysLogger {
    pub fn new(service: impl Into<String>, errs: Option<UnboundedSender<LogEntry>>) -> Self {
        Self { service: service.into(), forward: Forward(errs) }
    }

    #[cfg(unix)]
    fn write(&self, level: Level, message: &str) {
        use std::ffi::CString;

        let priority = match level {
            Level::Error => libc::LOG_ERR,
            Level::Warning => libc::LOG_WARNING,
            Level::Info => libc::LOG_INFO,
        };
        let line = format!("{}: {}", self.service, message).replace('\0', " ");
        let Ok(line) = CString::new(line) else { return };
        unsafe {
            libc::syslog(
                libc::LOG_USER | priority,
                b"%s\0".as_ptr() as *const libc::c_char,
                line.as_ptr(),
            );
        }
    }

    #[cfg(not(unix))]
    fn write(&self, level: Level, message: &str) {
        match level {
            Level::Error => tracing::error!(service = %self.service, "{message}"),
            Level::Warning => tracing::warn!(service = %self.service, "{message}"),
            Level::Info => tracing::info!(service = %self.service, "{message}"),
        }
    }
}

impl Logger for SysLogger {
    fn error(&self, message: &str) {
        self.write(Level::Error, message);
        self.forward.send(Level::Error, message);
    }

    fn warning(&self, message: &str) {
        self.write(Level::Warning, message);
        self.forward.send(Level::Warning, message);
    }

    fn info(&self, message: &str) {
        self.write(Level::Info, message);
    }
}
