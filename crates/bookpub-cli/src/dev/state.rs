//! Dev session state machine.
//!
//! `Idle → Building → Watching ⇄ Rebuilding → Terminated`. The transition
//! function is pure: it maps (state, event) to the next state plus the
//! actions the runner must perform, so every transition can be tested by
//! feeding synthetic events.

use crate::process::ExitOutcome;

/// Lifecycle state of a dev session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has happened yet
    Idle,
    /// Initial build in progress; no processes running
    Building,
    /// Dev server and watcher running, no rebuild in flight
    Watching,
    /// Rebuilds in flight. Overlapping rebuilds are counted, never dropped.
    Rebuilding { in_flight: usize },
    /// Session over
    Terminated(Termination),
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    Completed,
    Failed(String),
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    InitialBuildFinished { ok: bool },
    WatcherRestarted,
    RebuildFinished { ok: bool },
    WatcherExited(ExitOutcome),
    ServerExited(ExitOutcome),
    /// Ctrl+C reached the session
    Interrupted,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RunInitialBuild,
    StartServer,
    StartWatcher,
    RunRebuild,
    StopServer,
    StopWatcher,
    Complete,
    Fail(String),
}

impl SessionState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated(_))
    }

    /// Number of rebuilds currently running.
    pub fn in_flight(&self) -> usize {
        match self {
            SessionState::Rebuilding { in_flight } => *in_flight,
            _ => 0,
        }
    }

    /// Apply one event.
    ///
    /// Events that make no sense in the current state (a restart before the
    /// watcher was started, anything after termination) leave it unchanged.
    pub fn on(self, event: SessionEvent) -> (SessionState, Vec<Action>) {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::Idle, E::Start) => (S::Building, vec![Action::RunInitialBuild]),

            (S::Building, E::InitialBuildFinished { ok: true }) => (
                S::Watching,
                vec![Action::StartServer, Action::StartWatcher],
            ),
            (S::Building, E::InitialBuildFinished { ok: false }) => {
                let reason = "initial build failed".to_string();
                (
                    S::Terminated(Termination::Failed(reason.clone())),
                    vec![Action::Fail(reason)],
                )
            }

            (S::Watching, E::WatcherRestarted) => {
                (S::Rebuilding { in_flight: 1 }, vec![Action::RunRebuild])
            }
            (S::Rebuilding { in_flight }, E::WatcherRestarted) => (
                S::Rebuilding {
                    in_flight: in_flight + 1,
                },
                vec![Action::RunRebuild],
            ),
            (S::Rebuilding { in_flight }, E::RebuildFinished { .. }) => {
                if in_flight <= 1 {
                    (S::Watching, vec![])
                } else {
                    (
                        S::Rebuilding {
                            in_flight: in_flight - 1,
                        },
                        vec![],
                    )
                }
            }

            (S::Watching | S::Rebuilding { .. }, E::WatcherExited(outcome)) => {
                if outcome.is_clean() {
                    (
                        S::Terminated(Termination::Completed),
                        vec![Action::StopServer, Action::Complete],
                    )
                } else {
                    let reason = format!("watcher {outcome}");
                    (
                        S::Terminated(Termination::Failed(reason.clone())),
                        vec![Action::StopServer, Action::Fail(reason)],
                    )
                }
            }
            (S::Watching | S::Rebuilding { .. }, E::Interrupted) => (
                S::Terminated(Termination::Completed),
                vec![Action::StopServer, Action::StopWatcher, Action::Complete],
            ),
            // The terminal delivers Ctrl+C to the dev server too, and its exit
            // can be observed before the session's own interrupt.
            (S::Watching | S::Rebuilding { .. }, E::ServerExited(outcome)) => {
                if outcome.is_clean() || outcome.is_interrupt() {
                    (
                        S::Terminated(Termination::Completed),
                        vec![Action::StopWatcher, Action::Complete],
                    )
                } else {
                    let reason = format!("dev server {outcome}");
                    (
                        S::Terminated(Termination::Failed(reason.clone())),
                        vec![Action::StopWatcher, Action::Fail(reason)],
                    )
                }
            }

            (state, _) => (state, vec![]),
        }
    }
}
