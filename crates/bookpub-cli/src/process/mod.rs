//! Process Supervisor.
//!
//! Spawns external commands (renderer, dev server, watcher commands) with
//! inherited terminal streams and turns their lifecycle into events on a
//! [`ProcessHandle`]. In-process producers such as the file watcher use the
//! same handle type through [`ProcessHandle::channel`].

mod handle;
mod spec;
mod supervisor;

pub use handle::{ExitOutcome, ProcessEvent, ProcessHandle, ProcessNotifier};
pub use spec::{ProcessSpec, StdioMode};
pub use supervisor::Supervisor;
