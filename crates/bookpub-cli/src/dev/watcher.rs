//! Manuscript watcher.
//!
//! Watches the configured directory in-process with `notify`, batches change
//! bursts over the configured delay and reports each batch as a `Restarted`
//! event on a [`ProcessHandle`], the same interface an external watcher
//! process would have. For a user watch config the matching `execMap`
//! command is run on every batch, replacing the previous run.

use std::path::{Path, PathBuf};
use std::pin::pin;

use bookpub_config::WatcherConfig;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::process::{ExitOutcome, ProcessHandle, ProcessNotifier, ProcessSpec, Supervisor};
use crate::ui;

/// Handle name used in logs.
pub const WATCHER_NAME: &str = "watcher";

/// In-process file watcher exposed as a supervised process.
pub struct FileWatcher;

impl FileWatcher {
    /// Start watching. Never fails directly: setup errors arrive as the
    /// handle's `Exited(Failed)` event.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(root: &Path, config: &WatcherConfig, supervisor: Supervisor) -> ProcessHandle {
        let (handle, notifier) = ProcessHandle::channel(WATCHER_NAME);
        let watch_roots = config.watch_roots(root);

        let (tx, rx) = mpsc::channel(100);
        let filter = config.clone();
        let filter_roots = watch_roots.clone();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else { return };
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                return;
            }
            for path in event.paths {
                if !should_ignore(&path, &filter_roots, &filter) {
                    // Runs on notify's thread, outside the runtime
                    let _ = tx.blocking_send(path);
                }
            }
        })
        .map_err(|e| (root.to_path_buf(), e))
        .and_then(|mut watcher| {
            for dir in &watch_roots {
                watcher
                    .watch(dir, RecursiveMode::Recursive)
                    .map_err(|e| (dir.clone(), e))?;
            }
            Ok(watcher)
        });

        match watcher {
            Ok(watcher) => {
                for dir in &watch_roots {
                    tracing::info!(root = %dir.display(), "watching for changes");
                }
                tokio::spawn(run(
                    watcher,
                    rx,
                    config.clone(),
                    root.to_path_buf(),
                    supervisor,
                    notifier,
                ));
            }
            Err((dir, e)) => {
                tracing::warn!(root = %dir.display(), error = %e, "cannot watch");
                notifier.exited(ExitOutcome::Failed(format!(
                    "cannot watch {}: {e}",
                    dir.display()
                )));
            }
        }

        handle
    }
}

async fn run(
    _watcher: RecommendedWatcher,
    mut changes: mpsc::Receiver<PathBuf>,
    config: WatcherConfig,
    root: PathBuf,
    supervisor: Supervisor,
    mut notifier: ProcessNotifier,
) {
    let mut command: Option<ProcessHandle> = None;

    let outcome = loop {
        let first = tokio::select! {
            _ = notifier.stop_requested() => break ExitOutcome::Stopped,
            change = changes.recv() => match change {
                Some(path) => path,
                None => break ExitOutcome::Failed("file watcher closed".to_string()),
            },
        };

        let batch = collect_batch(first, &mut changes, &config).await;
        tracing::debug!(files = batch.len(), "change batch");
        if let Some(path) = batch.first() {
            ui::info(&format!("Changed: {}", path.strip_prefix(&root).unwrap_or(path).display()));
        }

        if config.is_user_supplied() {
            if let Some(mut previous) = command.take() {
                previous.stop();
            }
            command = batch
                .first()
                .and_then(|path| config.command_for(path))
                .and_then(ProcessSpec::from_command_line)
                .map(|spec| supervisor.spawn(&spec.named("watch-exec").cwd(&root)));
        }

        if !notifier.restarted() {
            break ExitOutcome::Stopped;
        }
    };

    if let Some(mut previous) = command.take() {
        previous.stop();
    }
    tracing::debug!(%outcome, "watcher ended");
    notifier.exited(outcome);
}

/// Gather further changes until the quiet period passes.
async fn collect_batch(
    first: PathBuf,
    changes: &mut mpsc::Receiver<PathBuf>,
    config: &WatcherConfig,
) -> Vec<PathBuf> {
    let mut batch = vec![first];
    let mut quiet = pin!(tokio::time::sleep(config.delay));

    loop {
        tokio::select! {
            _ = &mut quiet => break,
            change = changes.recv() => match change {
                Some(path) => {
                    if !batch.contains(&path) {
                        batch.push(path);
                    }
                }
                None => break,
            },
        }
    }
    batch
}

/// Paths outside every watch root, hidden paths and unwatched extensions are ignored.
fn should_ignore(path: &Path, roots: &[PathBuf], config: &WatcherConfig) -> bool {
    let Some(rel_path) = roots.iter().find_map(|root| path.strip_prefix(root).ok()) else {
        return true;
    };

    for component in rel_path.components() {
        if let Some(name) = component.as_os_str().to_str() {
            if name.starts_with('.') && name != "." && name != ".." {
                return true;
            }
        }
    }

    !config.matches(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessEvent;
    use bookpub_config::OutputType;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config() -> WatcherConfig {
        let mut config = WatcherConfig::default_for(OutputType::Html, "bookpub", None);
        config.delay = Duration::from_millis(50);
        config
    }

    #[test]
    fn test_should_ignore_outside_root() {
        let root = [PathBuf::from("/book/manuscript")];
        assert!(should_ignore(Path::new("/book/build/html/index.html"), &root, &config()));
        assert!(!should_ignore(Path::new("/book/manuscript/ch1.md"), &root, &config()));
    }

    #[test]
    fn test_should_ignore_checks_every_root() {
        let roots = [PathBuf::from("/book/manuscript"), PathBuf::from("/book/styles")];
        assert!(!should_ignore(Path::new("/book/styles/print.css"), &roots, &config()));
        assert!(!should_ignore(Path::new("/book/manuscript/ch1.md"), &roots, &config()));
        assert!(should_ignore(Path::new("/book/build/index.css"), &roots, &config()));
    }

    #[test]
    fn test_should_ignore_hidden_and_unwatched() {
        let root = [PathBuf::from("/book/manuscript")];
        assert!(should_ignore(Path::new("/book/manuscript/.ch1.md.swp"), &root, &config()));
        assert!(should_ignore(Path::new("/book/manuscript/.git/HEAD"), &root, &config()));
        assert!(should_ignore(Path::new("/book/manuscript/cover.png"), &root, &config()));
        assert!(!should_ignore(Path::new("/book/manuscript/parts/style.scss"), &root, &config()));
    }

    #[tokio::test]
    async fn missing_watch_root_is_reported_as_exit() {
        let dir = TempDir::new().unwrap();
        let mut handle = FileWatcher::start(dir.path(), &config(), Supervisor::new());
        assert!(matches!(handle.wait().await, ExitOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn change_emits_restart_and_stop_ends_watcher() {
        let dir = TempDir::new().unwrap();
        let manuscript = dir.path().join("manuscript");
        std::fs::create_dir_all(&manuscript).unwrap();

        let mut handle = FileWatcher::start(dir.path(), &config(), Supervisor::new());
        std::fs::write(manuscript.join("ch1.md"), "# One").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(10), handle.next_event())
            .await
            .expect("no restart within timeout");
        assert_eq!(event, Some(ProcessEvent::Restarted));

        handle.stop();
        let outcome = tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("watcher did not stop");
        assert_eq!(outcome, ExitOutcome::Stopped);
    }

    #[tokio::test]
    async fn second_watch_root_also_restarts() {
        let dir = TempDir::new().unwrap();
        let styles = dir.path().join("styles");
        std::fs::create_dir_all(dir.path().join("manuscript")).unwrap();
        std::fs::create_dir_all(&styles).unwrap();

        let mut config = config();
        config.watch = vec![PathBuf::from("manuscript"), PathBuf::from("styles")];
        let mut handle = FileWatcher::start(dir.path(), &config, Supervisor::new());
        std::fs::write(styles.join("print.css"), "body {}").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(10), handle.next_event())
            .await
            .expect("no restart within timeout");
        assert_eq!(event, Some(ProcessEvent::Restarted));
        handle.stop();
    }
}
