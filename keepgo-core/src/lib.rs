//! keepgo core library: service configuration, options, status types,
//! version helpers and the native command boundary.
//!
//! - [`types`]: [`ServiceConfig`], [`Status`], [`ControlAction`]
//! - [`options`]: typed [`ServiceOptions`] and the [`KeyValue`] bag
//! - [`runner`]: [`CommandRunner`] and its system/recording implementations
//! - [`host`]: the [`Host`] probes and backends operate on
//! - [`version`]: dotted version parsing for capability gates

pub mod error;
pub mod host;
pub mod options;
pub mod runner;
pub mod types;
pub mod version;

pub use error::{RunnerError, VersionError};
pub use host::Host;
pub use options::{KeyValue, OptionValue, RunWait, ServiceOptions};
pub use runner::{CommandOutput, CommandRunner, RecordingRunner, SystemRunner};
pub use types::{ControlAction, ServiceConfig, Status, UnknownAction};
pub use version::{parse_version, version_at_most, version_compare, Version};
