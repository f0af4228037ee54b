//! Install and drive a program as a background service under whichever
//! init system governs the host: systemd, Upstart, OpenRC, rcS, SysV or
//! launchd.

pub mod backend;
mod error;
pub mod logger;
pub mod paths;
mod registry;
mod service;

pub use backend::Backend;
pub use error::{ControllerError, ServiceError};
pub use logger::{ConsoleLogger, Level, LogEntry, Logger, SysLogger};
pub use registry::{default_systems, validate_name, InitSystem, Registry};
pub use service::{control, Controller, Service};

pub use keepgo_core::{ControlAction, Host, ServiceConfig, Status};
