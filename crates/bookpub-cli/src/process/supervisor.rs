use tokio::process::Child;

use super::handle::{ExitOutcome, ProcessHandle, ProcessNotifier};
use super::spec::ProcessSpec;

/// Spawns OS processes and reports their lifecycle through handles.
///
/// `spawn` never fails: a process that cannot start yields a handle whose
/// only event is `Exited(SpawnFailed)`. There is no restart policy here.
#[derive(Debug, Clone, Copy, Default)]
pub struct Supervisor;

impl Supervisor {
    pub fn new() -> Self {
        Self
    }

    /// Start one process. Must be called from within a tokio runtime.
    pub fn spawn(&self, spec: &ProcessSpec) -> ProcessHandle {
        let (handle, notifier) = ProcessHandle::channel(spec.name());

        match spec.to_command().spawn() {
            Ok(child) => {
                let pid = child.id();
                tracing::debug!(process = spec.name(), pid, command = %spec, "spawned");
                tokio::spawn(monitor(spec.name().to_string(), child, notifier));
                handle.with_pid(pid)
            }
            Err(e) => {
                tracing::warn!(process = spec.name(), command = %spec, error = %e, "spawn failed");
                notifier.exited(ExitOutcome::SpawnFailed(e.to_string()));
                handle
            }
        }
    }

    /// Spawn and wait for the terminal outcome.
    pub async fn run(&self, spec: &ProcessSpec) -> ExitOutcome {
        self.spawn(spec).wait().await
    }
}

async fn monitor(name: String, mut child: Child, mut notifier: ProcessNotifier) {
    let outcome = tokio::select! {
        status = child.wait() => match status {
            Ok(status) => ExitOutcome::from_status(status),
            Err(e) => ExitOutcome::Failed(e.to_string()),
        },
        _ = notifier.stop_requested() => {
            if let Err(e) = child.kill().await {
                tracing::warn!(process = %name, error = %e, "failed to kill");
            }
            ExitOutcome::Stopped
        }
    };

    tracing::debug!(process = %name, %outcome, "process ended");
    notifier.exited(outcome);
}
