//! The uniform service facade: lifecycle, `run` and `control`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use keepgo_core::{ControlAction, ServiceConfig, Status};

use crate::backend::Backend;
use crate::error::{ControllerError, ServiceError};
use crate::logger::{ConsoleLogger, LogEntry, Logger, SysLogger};

/// Caller-supplied start/stop hooks invoked by [`Service::run`].
///
/// `start` must return promptly and do its real work in the background.
pub trait Controller: Send + Sync {
    fn start(&self, service: &Service) -> Result<(), ControllerError>;
    fn stop(&self, service: &Service) -> Result<(), ControllerError>;
}

/// A configured service bound to the detected init system.
pub struct Service {
    backend: Box<dyn Backend>,
    controller: Arc<dyn Controller>,
    config: Arc<ServiceConfig>,
    interactive: bool,
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("backend", &self.backend)
            .field("interactive", &self.interactive)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config.display_string())
    }
}

impl Service {
    pub(crate) fn new(
        backend: Box<dyn Backend>,
        controller: Arc<dyn Controller>,
        config: Arc<ServiceConfig>,
        interactive: bool,
    ) -> Self {
        Self { backend, controller, config, interactive }
    }

    pub fn platform(&self) -> &'static str {
        self.backend.platform()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Whether the process was started from a terminal rather than by the
    /// init system, as judged when the service was created.
    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn config_path(&self) -> Result<PathBuf, ServiceError> {
        self.backend.config_path()
    }

    pub fn render(&self) -> Result<String, ServiceError> {
        self.backend.render()
    }

    pub fn install(&self) -> Result<(), ServiceError> {
        self.backend.install()
    }

    pub fn uninstall(&self) -> Result<(), ServiceError> {
        self.backend.uninstall()
    }

    pub fn start(&self) -> Result<(), ServiceError> {
        self.backend.start()
    }

    pub fn stop(&self) -> Result<(), ServiceError> {
        self.backend.stop()
    }

    pub fn restart(&self) -> Result<(), ServiceError> {
        self.backend.restart()
    }

    /// Current state. Any `Err` means the state is unknown.
    pub fn status(&self) -> Result<Status, ServiceError> {
        self.backend.status()
    }

    /// Start the controller, block until shutdown is requested, then stop it.
    ///
    /// Shutdown is the `RunWait` handler returning when one is configured,
    /// otherwise SIGTERM or SIGINT.
    pub fn run(&self) -> Result<(), ServiceError> {
        self.controller
            .start(self)
            .map_err(|source| ServiceError::Controller { phase: "start", source })?;
        tracing::info!(service = %self, "controller started; waiting for shutdown");

        match &self.config.options.run_wait {
            Some(wait) => wait(),
            None => wait_for_signal()?,
        }

        tracing::info!(service = %self, "stopping controller");
        self.controller
            .stop(self)
            .map_err(|source| ServiceError::Controller { phase: "stop", source })
    }

    /// Syslog when running under the init system, the console otherwise.
    pub fn logger(&self, errs: Option<UnboundedSender<LogEntry>>) -> Box<dyn Logger> {
        if self.interactive {
            Box::new(ConsoleLogger::new(self.config.name.clone(), errs))
        } else {
            self.system_logger(errs)
        }
    }

    pub fn system_logger(&self, errs: Option<UnboundedSender<LogEntry>>) -> Box<dyn Logger> {
        Box::new(SysLogger::new(self.config.name.clone(), errs))
    }
}

fn wait_for_signal() -> Result<(), ServiceError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ServiceError::Signal)?;

    runtime.block_on(async {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut term = signal(SignalKind::terminate()).map_err(ServiceError::Signal)?;
            let mut int = signal(SignalKind::interrupt()).map_err(ServiceError::Signal)?;
            tokio::select! {
                _ = term.recv() => tracing::info!("received SIGTERM"),
                _ = int.recv() => tracing::info!("received SIGINT"),
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.map_err(ServiceError::Signal)?;
            tracing::info!("received ctrl-c");
        }
        Ok::<(), ServiceError>(())
    })
}

/// Dispatch one of `start`, `stop`, `restart`, `install`, `uninstall`.
///
/// Unknown actions fail before anything runs. Backend failures are wrapped
/// with the action and the service's display string.
pub fn control(service: &Service, action: &str) -> Result<(), ServiceError> {
    let action: ControlAction = action.parse()?;
    let result = match action {
        ControlAction::Start => service.start(),
        ControlAction::Stop => service.stop(),
        ControlAction::Restart => service.restart(),
        ControlAction::Install => service.install(),
        ControlAction::Uninstall => service.uninstall(),
    };
    result.map_err(|source| ServiceError::Control {
        action,
        service: service.to_string(),
        source: Box::new(source),
    })
}
