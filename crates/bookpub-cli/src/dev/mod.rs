//! Dev Orchestrator.
//!
//! Runs an initial build, then keeps a dev server and a manuscript watcher
//! alive side by side, rebuilding on every watcher restart:
//! - [`state`]: pure session state machine
//! - [`session`]: runner that executes the machine's actions
//! - [`watcher`]: `notify` based watcher exposed as a process handle
//! - [`server`]: bundler dev server command

pub mod server;
pub mod session;
pub mod state;
pub mod watcher;

pub use server::server_spec;
pub use session::{DevSession, ProjectProcesses, SessionProcesses, SessionSummary};
pub use state::{Action, SessionEvent, SessionState, Termination};
pub use watcher::FileWatcher;
