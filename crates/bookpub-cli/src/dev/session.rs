//! Dev session runner: drives [`SessionState`] against real or synthetic
//! processes and the build dispatcher.

use std::collections::VecDeque;
use std::time::Duration;

use bookpub_config::{OutputType, WatcherConfig};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};

use super::server::{server_spec, SERVER_NAME};
use super::state::{Action, SessionEvent, SessionState};
use super::watcher::FileWatcher;
use crate::context::ProjectContext;
use crate::error::{BuildError, CliError, Result};
use crate::pipeline::{BuildReport, BuildRequest, Dispatcher, RenderStatus};
use crate::process::{ExitOutcome, ProcessEvent, ProcessHandle, Supervisor};
use crate::ui;

/// How long a stopped process gets to report its exit during shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Starts the two long-lived processes of a session.
pub trait SessionProcesses {
    fn start_server(&mut self, output_type: OutputType) -> ProcessHandle;
    fn start_watcher(&mut self, config: &WatcherConfig) -> ProcessHandle;
}

/// Real processes: the configured bundler and the in-process file watcher.
pub struct ProjectProcesses<'a> {
    ctx: &'a ProjectContext,
    supervisor: Supervisor,
}

impl<'a> ProjectProcesses<'a> {
    pub fn new(ctx: &'a ProjectContext) -> Self {
        Self {
            ctx,
            supervisor: Supervisor::new(),
        }
    }
}

impl SessionProcesses for ProjectProcesses<'_> {
    fn start_server(&mut self, output_type: OutputType) -> ProcessHandle {
        match server_spec(self.ctx, output_type) {
            Some(spec) => {
                ui::info(&format!("Starting dev server: {spec}"));
                self.supervisor.spawn(&spec)
            }
            None => {
                let (handle, notifier) = ProcessHandle::channel(SERVER_NAME);
                notifier.exited(ExitOutcome::SpawnFailed(
                    "no dev server command configured".to_string(),
                ));
                handle
            }
        }
    }

    fn start_watcher(&mut self, config: &WatcherConfig) -> ProcessHandle {
        FileWatcher::start(&self.ctx.root, config, self.supervisor)
    }
}

/// Counters reported when a session completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub rebuilds: usize,
    pub failed_rebuilds: usize,
}

/// One `dev` invocation.
///
/// `run` is the session's completion signal: `Ok` when the watcher (or the
/// dev server) ends cleanly or the interrupt fires, `Err` when the initial
/// build fails or either process ends with a failure.
pub struct DevSession<'a, P> {
    dispatcher: &'a Dispatcher,
    processes: P,
    request: BuildRequest,
    watch: WatcherConfig,
    interrupt: BoxFuture<'static, ()>,
}

impl<'a, P: SessionProcesses> DevSession<'a, P> {
    pub fn new(
        dispatcher: &'a Dispatcher,
        processes: P,
        request: BuildRequest,
        watch: WatcherConfig,
    ) -> Self {
        Self {
            dispatcher,
            processes,
            request,
            watch,
            interrupt: std::future::pending().boxed(),
        }
    }

    /// End the session cleanly when `interrupt` resolves. Without one the
    /// session only ends through its processes.
    pub fn with_interrupt(mut self, interrupt: BoxFuture<'static, ()>) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub async fn run(mut self) -> Result<SessionSummary> {
        let dispatcher = self.dispatcher;
        let mut state = SessionState::Idle;
        let mut pending = VecDeque::from([SessionEvent::Start]);
        let mut server: Option<ProcessHandle> = None;
        let mut watcher: Option<ProcessHandle> = None;
        let mut rebuilds = FuturesUnordered::new();
        let mut summary = SessionSummary::default();
        let mut initial_error: Option<BuildError> = None;
        let mut result: Option<std::result::Result<(), String>> = None;
        let interrupt = std::mem::replace(&mut self.interrupt, std::future::pending().boxed());
        let mut interrupt = interrupt.fuse();

        loop {
            while let Some(event) = pending.pop_front() {
                tracing::debug!(?event, ?state, "session event");
                let (next, actions) = state.on(event);
                state = next;

                for action in actions {
                    match action {
                        Action::RunInitialBuild => {
                            let ok = match dispatcher.build(self.request.clone()).await {
                                Ok(report) => {
                                    report_build(&report);
                                    true
                                }
                                Err(e) => {
                                    ui::error(&format!("Initial build failed: {e}"));
                                    initial_error = Some(e);
                                    false
                                }
                            };
                            pending.push_back(SessionEvent::InitialBuildFinished { ok });
                        }
                        Action::StartServer => {
                            server = Some(self.processes.start_server(self.request.output_type));
                        }
                        Action::StartWatcher => {
                            watcher = Some(self.processes.start_watcher(&self.watch));
                        }
                        Action::RunRebuild => {
                            summary.rebuilds += 1;
                            rebuilds.push(rebuild(dispatcher, self.request.clone()));
                        }
                        Action::StopServer => stop(&mut server),
                        Action::StopWatcher => stop(&mut watcher),
                        Action::Complete => result = Some(Ok(())),
                        Action::Fail(reason) => result = Some(Err(reason)),
                    }
                }
            }

            if state.is_terminated() {
                break;
            }

            let event = tokio::select! {
                biased;
                _ = &mut interrupt => {
                    ui::info("Stopping dev session...");
                    SessionEvent::Interrupted
                }
                Some(event) = next_event(&mut watcher) => match event {
                    ProcessEvent::Restarted => SessionEvent::WatcherRestarted,
                    ProcessEvent::Exited(outcome) => SessionEvent::WatcherExited(outcome),
                },
                Some(event) = next_event(&mut server) => match event {
                    ProcessEvent::Restarted => continue,
                    ProcessEvent::Exited(outcome) => SessionEvent::ServerExited(outcome),
                },
                Some(ok) = rebuilds.next() => {
                    if !ok {
                        summary.failed_rebuilds += 1;
                    }
                    SessionEvent::RebuildFinished { ok }
                }
                else => break,
            };
            pending.push_back(event);
        }

        stop(&mut server);
        stop(&mut watcher);

        // In-flight rebuilds cannot be cancelled; let them finish writing.
        while let Some(ok) = rebuilds.next().await {
            if !ok {
                summary.failed_rebuilds += 1;
            }
        }

        for mut handle in [server, watcher].into_iter().flatten() {
            if tokio::time::timeout(SHUTDOWN_GRACE, handle.wait()).await.is_err() {
                tracing::warn!(process = handle.name(), "did not exit after stop");
            }
        }

        tracing::debug!(?summary, "session ended");
        match result {
            Some(Ok(())) => Ok(summary),
            Some(Err(reason)) => Err(match initial_error {
                Some(e) => e.into(),
                None => CliError::Session(reason),
            }),
            None => Err(CliError::Session(
                "session ended without a terminal event".to_string(),
            )),
        }
    }
}

async fn next_event(handle: &mut Option<ProcessHandle>) -> Option<ProcessEvent> {
    match handle {
        Some(handle) => handle.next_event().await,
        None => std::future::pending().await,
    }
}

fn stop(handle: &mut Option<ProcessHandle>) {
    if let Some(handle) = handle {
        if handle.outcome().is_none() {
            handle.stop();
        }
    }
}

async fn rebuild(dispatcher: &Dispatcher, request: BuildRequest) -> bool {
    ui::info(&format!("Rebuilding {}...", request.output_type));
    match dispatcher.build(request).await {
        Ok(report) => {
            report_build(&report);
            true
        }
        Err(e) => {
            ui::error(&format!("Rebuild failed: {e}"));
            false
        }
    }
}

/// Render failures during dev are reported and otherwise ignored.
fn report_build(report: &BuildReport) {
    match &report.render {
        Some(RenderStatus::Failed(e)) => ui::warning(&format!("PDF render failed: {e}")),
        _ => ui::success(&format!(
            "Built {} in {}",
            report.request.output_type,
            ui::format_duration(report.duration)
        )),
    }
}
