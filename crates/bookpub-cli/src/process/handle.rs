//! Lifecycle notifications for one supervised process.

use std::fmt;

use tokio::sync::{mpsc, oneshot};

/// Terminal outcome of a supervised process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exited on its own with a status code
    Exited(i32),
    /// Killed by a signal (number when the platform reports one)
    Signaled(Option<i32>),
    /// Could not be started at all
    SpawnFailed(String),
    /// Started, but waiting on it failed
    Failed(String),
    /// Ended because its owner asked it to stop
    Stopped,
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Exited(0))
    }

    /// Success, or a stop requested by the owner.
    pub fn is_clean(&self) -> bool {
        self.is_success() || matches!(self, ExitOutcome::Stopped)
    }

    /// Ended by Ctrl+C: SIGINT, or the conventional `128 + 2` status shells
    /// and Node tools report for it.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, ExitOutcome::Signaled(Some(2)) | ExitOutcome::Exited(130))
    }

    pub fn from_status(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            ExitOutcome::Signaled(status.signal())
        }

        #[cfg(not(unix))]
        {
            ExitOutcome::Signaled(None)
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "exited with code {code}"),
            ExitOutcome::Signaled(Some(sig)) => write!(f, "was terminated by signal {sig}"),
            ExitOutcome::Signaled(None) => f.write_str("was terminated by a signal"),
            ExitOutcome::SpawnFailed(msg) => write!(f, "failed to start: {msg}"),
            ExitOutcome::Failed(msg) => write!(f, "failed: {msg}"),
            ExitOutcome::Stopped => f.write_str("was stopped"),
        }
    }
}

/// Notification delivered by a [`ProcessHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// The process restarted its work (watcher batches)
    Restarted,
    /// Terminal; no events follow
    Exited(ExitOutcome),
}

/// Owner side of one supervised process.
///
/// Exactly one owner holds a handle. Dropping it asks the producer to stop,
/// which for OS processes means killing the child.
#[derive(Debug)]
pub struct ProcessHandle {
    name: String,
    pid: Option<u32>,
    events: mpsc::UnboundedReceiver<ProcessEvent>,
    stop: Option<oneshot::Sender<()>>,
    outcome: Option<ExitOutcome>,
}

/// Producer side paired with a [`ProcessHandle`].
#[derive(Debug)]
pub struct ProcessNotifier {
    events: mpsc::UnboundedSender<ProcessEvent>,
    stop: oneshot::Receiver<()>,
    stop_seen: bool,
}

impl ProcessHandle {
    /// Create a handle driven by an in-process producer.
    pub fn channel(name: impl Into<String>) -> (Self, ProcessNotifier) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let handle = Self {
            name: name.into(),
            pid: None,
            events: events_rx,
            stop: Some(stop_tx),
            outcome: None,
        };
        let notifier = ProcessNotifier {
            events: events_tx,
            stop: stop_rx,
            stop_seen: false,
        };
        (handle, notifier)
    }

    pub(crate) fn with_pid(mut self, pid: Option<u32>) -> Self {
        self.pid = pid;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS process id, when the handle wraps a started OS process.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Terminal outcome, once observed.
    pub fn outcome(&self) -> Option<&ExitOutcome> {
        self.outcome.as_ref()
    }

    /// Next lifecycle notification. `None` after the terminal event.
    ///
    /// Cancel safe: usable as a `select!` branch.
    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        if self.outcome.is_some() {
            return None;
        }

        let event = match self.events.recv().await {
            Some(event) => event,
            None => ProcessEvent::Exited(ExitOutcome::Failed(
                "process monitor ended without an exit status".to_string(),
            )),
        };

        if let ProcessEvent::Exited(outcome) = &event {
            self.outcome = Some(outcome.clone());
        }
        Some(event)
    }

    /// Wait for the terminal outcome, discarding restart notifications.
    pub async fn wait(&mut self) -> ExitOutcome {
        loop {
            if let Some(outcome) = &self.outcome {
                return outcome.clone();
            }
            if let Some(ProcessEvent::Exited(outcome)) = self.next_event().await {
                return outcome;
            }
        }
    }

    /// Ask the process to stop. Idempotent; the outcome arrives as an event.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            tracing::debug!(process = %self.name, "stop requested");
            let _ = tx.send(());
        }
    }
}

impl ProcessNotifier {
    /// Report a restart. Returns `false` once the owner is gone.
    pub fn restarted(&self) -> bool {
        self.events.send(ProcessEvent::Restarted).is_ok()
    }

    /// Report the terminal outcome, consuming the notifier.
    pub fn exited(self, outcome: ExitOutcome) {
        let _ = self.events.send(ProcessEvent::Exited(outcome));
    }

    /// Resolves when the owner calls [`ProcessHandle::stop`] or drops the handle.
    ///
    /// Cancel safe, and returns immediately once a stop has been seen.
    pub async fn stop_requested(&mut self) {
        if self.stop_seen {
            return;
        }
        let _ = (&mut self.stop).await;
        self.stop_seen = true;
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_order_and_end_at_exit() {
        let (mut handle, notifier) = ProcessHandle::channel("watcher");
        assert!(notifier.restarted());
        notifier.exited(ExitOutcome::Exited(0));

        assert_eq!(handle.next_event().await, Some(ProcessEvent::Restarted));
        assert_eq!(
            handle.next_event().await,
            Some(ProcessEvent::Exited(ExitOutcome::Exited(0)))
        );
        assert_eq!(handle.next_event().await, None);
        assert_eq!(handle.outcome(), Some(&ExitOutcome::Exited(0)));
    }

    #[test]
    fn interrupt_outcomes() {
        assert!(ExitOutcome::Signaled(Some(2)).is_interrupt());
        assert!(ExitOutcome::Exited(130).is_interrupt());
        assert!(!ExitOutcome::Signaled(Some(9)).is_interrupt());
        assert!(!ExitOutcome::Exited(1).is_interrupt());
        assert!(!ExitOutcome::Signaled(Some(2)).is_clean());
    }

    #[tokio::test]
    async fn wait_skips_restarts() {
        let (mut handle, notifier) = ProcessHandle::channel("watcher");
        notifier.restarted();
        notifier.restarted();
        notifier.exited(ExitOutcome::Signaled(Some(15)));

        assert_eq!(handle.wait().await, ExitOutcome::Signaled(Some(15)));
        // Repeated waits return the stored outcome.
        assert_eq!(handle.wait().await, ExitOutcome::Signaled(Some(15)));
    }

    #[tokio::test]
    async fn dropped_notifier_is_a_failure() {
        let (mut handle, notifier) = ProcessHandle::channel("server");
        drop(notifier);
        assert!(matches!(handle.wait().await, ExitOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn stop_reaches_the_producer() {
        let (mut handle, mut notifier) = ProcessHandle::channel("server");
        handle.stop();
        handle.stop();
        notifier.stop_requested().await;
        notifier.stop_requested().await;
        notifier.exited(ExitOutcome::Stopped);
        assert_eq!(handle.wait().await, ExitOutcome::Stopped);
    }

    #[tokio::test]
    async fn dropping_the_handle_requests_stop() {
        let (handle, mut notifier) = ProcessHandle::channel("server");
        drop(handle);
        notifier.stop_requested().await;
        assert!(notifier.is_closed());
        assert!(!notifier.restarted());
    }

    #[test]
    fn outcome_classification() {
        assert!(ExitOutcome::Exited(0).is_success());
        assert!(!ExitOutcome::Exited(2).is_success());
        assert!(ExitOutcome::Stopped.is_clean());
        assert!(!ExitOutcome::SpawnFailed("nope".into()).is_clean());
        assert_eq!(ExitOutcome::Exited(3).to_string(), "exited with code 3");
    }
}
