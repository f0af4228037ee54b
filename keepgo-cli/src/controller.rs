//! Controller behind `keepgo run`: spawns the workload on start, kills it
//! on stop.

use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, PoisonError};

use keepgo_service::{Controller, ControllerError, Service};

use crate::service_file::Workload;

pub struct ProcessController {
    workload: Workload,
    child: Mutex<Option<Child>>,
}

impl ProcessController {
    pub fn new(workload: Workload) -> Self {
        Self { workload, child: Mutex::new(None) }
    }
}

impl Controller for ProcessController {
    fn start(&self, service: &Service) -> Result<(), ControllerError> {
        let mut cmd = Command::new(&self.workload.exec);
        cmd.args(&self.workload.args)
            .envs(&self.workload.env)
            .stdin(Stdio::null());
        if let Some(dir) = &self.workload.dir {
            cmd.current_dir(dir);
        }

        let child = cmd
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {e}", self.workload.exec.display()))?;
        tracing::info!(service = %service, pid = child.id(), "workload started");
        *self.child.lock().unwrap_or_else(PoisonError::into_inner) = Some(child);
        Ok(())
    }

    fn stop(&self, service: &Service) -> Result<(), ControllerError> {
        let Some(mut child) = self.child.lock().unwrap_or_else(PoisonError::into_inner).take() else {
            return Ok(());
        };

        // Already exited on its own: just reap it.
        if let Some(status) = child.try_wait()? {
            tracing::warn!(service = %service, %status, "workload had already exited");
            return Ok(());
        }
        child.kill()?;
        let status = child.wait()?;
        tracing::info!(service = %service, %status, "workload stopped");
        Ok(())
    }
}
