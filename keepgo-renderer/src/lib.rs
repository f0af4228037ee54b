//! # keepgo-renderer
//!
//! Renders the configuration artifact each init system reads: systemd units,
//! Upstart jobs, OpenRC/RCS/SysV init scripts and launchd property lists.
//!
//! Built-in formats are plain formatting routines with explicit escaping.
//! A service may replace any of them with its own tera template through the
//! matching option key (see [`UnitKind::override_key`]).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use keepgo_core::ServiceConfig;
//! use keepgo_renderer::{render_unit, Capabilities, TemplateContext, UnitKind};
//!
//! let config = ServiceConfig::new("web");
//! let ctx = TemplateContext::new(&config, Path::new("/usr/bin/web"), UnitKind::Systemd, Capabilities::default());
//! if let Ok(unit) = render_unit(UnitKind::Systemd, &ctx, None) {
//!     println!("{unit}");
//! }
//! ```

mod builtin;
pub mod context;
pub mod engine;
pub mod error;
pub mod escape;

pub use context::{Capabilities, TemplateContext};
pub use engine::{render_unit, UnitKind};
pub use error::RenderError;
pub use escape::{cmd_escape, cmd_quote, shell_quote, xml_escape};
