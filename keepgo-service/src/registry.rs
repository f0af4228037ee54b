//! Init-system selection.
//!
//! A [`Registry`] probes an ordered candidate list once, when it is built,
//! and pins the first system that detects. It never changes afterwards.

use std::fmt;
use std::sync::Arc;

use keepgo_core::{Host, ServiceConfig};
use keepgo_detector::DetectError;

use crate::backend::Backend;
use crate::error::ServiceError;
use crate::service::{Controller, Service};

/// One init-system flavor: how to recognise it and how to build a backend
/// for it.
pub trait InitSystem: Send + Sync + fmt::Debug {
    /// Descriptive platform name, e.g. `linux-openrc`.
    fn name(&self) -> &'static str;

    /// Side-effect-free probe; safe to call speculatively.
    fn detect(&self, host: &Host) -> bool;

    /// Whether the current process looks like it was started by a user
    /// rather than by this init system.
    fn interactive(&self, host: &Host) -> bool;

    fn backend(&self, host: Host, config: Arc<ServiceConfig>) -> Result<Box<dyn Backend>, ServiceError>;
}

/// Probe failures count as interactive.
pub(crate) fn interactive_or_assume(probe: Result<bool, DetectError>) -> bool {
    probe.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "interactivity probe failed; assuming interactive");
        true
    })
}

/// Candidates for the compile target, in detection order.
pub fn default_systems() -> Vec<Arc<dyn InitSystem>> {
    #[cfg(target_os = "linux")]
    {
        use crate::backend::{openrc::OpenRc, rcs::Rcs, systemd::Systemd, sysv::SysV, upstart::Upstart};
        vec![
            Arc::new(Systemd) as Arc<dyn InitSystem>,
            Arc::new(Upstart),
            Arc::new(OpenRc),
            Arc::new(Rcs),
            Arc::new(SysV),
        ]
    }
    #[cfg(target_os = "macos")]
    {
        vec![Arc::new(crate::backend::launchd::Launchd) as Arc<dyn InitSystem>]
    }
    #[cfg(all(unix, not(any(target_os = "linux", target_os = "macos"))))]
    {
        vec![Arc::new(crate::backend::sysv::SysV) as Arc<dyn InitSystem>]
    }
    #[cfg(not(unix))]
    {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    host: Host,
    candidates: Vec<Arc<dyn InitSystem>>,
    chosen: Option<usize>,
}

impl Registry {
    /// Record `candidates` and pin the first one that detects on `host`.
    pub fn choose(host: Host, candidates: Vec<Arc<dyn InitSystem>>) -> Self {
        let chosen = candidates.iter().position(|system| system.detect(&host));
        match chosen {
            Some(i) => tracing::debug!(platform = candidates[i].name(), "init system detected"),
            None => tracing::debug!(candidates = candidates.len(), "no init system detected"),
        }
        Self { host, candidates, chosen }
    }

    /// Probe the running machine with [`default_systems`].
    pub fn detect() -> Self {
        Self::choose(Host::system(), default_systems())
    }

    /// Name of the active system, or `""` when none detected.
    pub fn platform(&self) -> &'static str {
        self.chosen().map_or("", |system| system.name())
    }

    /// Interactivity per the active system; `true` when none is active.
    pub fn interactive(&self) -> bool {
        self.chosen().map_or(true, |system| system.interactive(&self.host))
    }

    pub fn chosen(&self) -> Option<&dyn InitSystem> {
        self.chosen.map(|i| self.candidates[i].as_ref())
    }

    pub fn available(&self) -> &[Arc<dyn InitSystem>] {
        &self.candidates
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Bind `config` and `controller` to the active system.
    pub fn new_service(
        &self,
        controller: Arc<dyn Controller>,
        config: ServiceConfig,
    ) -> Result<Service, ServiceError> {
        validate_name(&config.name)?;
        let system = self.chosen().ok_or(ServiceError::NoSystemDetected)?;

        let config = Arc::new(config);
        let backend = system.backend(self.host.clone(), Arc::clone(&config))?;
        Ok(Service::new(backend, controller, config, system.interactive(&self.host)))
    }
}

/// Service names become file names under the init system's config dirs.
pub fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.is_empty() {
        return Err(ServiceError::NameRequired);
    }
    if name.contains(&['/', '\\'][..]) {
        return Err(ServiceError::InvalidName { name: name.to_string() });
    }
    Ok(())
}
