//! Dev session tests.
//!
//! The session runs against synthetic process handles so every watcher event
//! is fed by the test; the last tests run the real binary.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_cmd::Command;
use async_trait::async_trait;
use bookpub_cli::context::ProjectContext;
use bookpub_cli::dev::{DevSession, SessionProcesses, SessionSummary};
use bookpub_cli::error::BuildError;
use bookpub_cli::pipeline::{BuildRequest, Converter, Dispatcher, RenderStatus, Renderer};
use bookpub_cli::process::{ExitOutcome, ProcessHandle, ProcessNotifier};
use bookpub_cli::{CliError, Result};
use bookpub_config::{BookConfig, OutputType, WatcherConfig};
use futures::FutureExt;
use predicates::prelude::*;
use tempfile::TempDir;
use tokio::sync::{oneshot, Semaphore};

type Log = Arc<Mutex<Vec<String>>>;

/// Records every build; rebuilds (all builds after the first) wait on `gate`
/// when one is set. Builds whose index is in `fail_on` fail, 0 being the
/// initial build.
struct FakeConverter {
    log: Log,
    builds: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
    fail_on: Vec<usize>,
}

impl FakeConverter {
    fn new(log: Log) -> Self {
        Self {
            log,
            builds: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            gate: None,
            fail_on: Vec::new(),
        }
    }
}

#[async_trait]
impl Converter for FakeConverter {
    async fn convert(
        &self,
        _book: Option<&BookConfig>,
        request: &BuildRequest,
    ) -> std::result::Result<(), BuildError> {
        let n = self.builds.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap()
            .push(format!("convert:{}", request.output_type));

        if n > 0 {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        if self.fail_on.contains(&n) {
            return Err(BuildError::EmptyManuscript(request.manuscript.clone()));
        }

        tokio::fs::create_dir_all(&request.output_dir).await.unwrap();
        tokio::fs::write(request.entry_file(), "<html></html>").await.unwrap();
        Ok(())
    }
}

struct NoRender;

#[async_trait]
impl Renderer for NoRender {
    async fn render(&self, _entry: &std::path::Path, request: &BuildRequest) -> RenderStatus {
        RenderStatus::Rendered(request.output_dir.join("index.pdf"))
    }
}

/// Hands the watcher's notifier to the test; the server runs until stopped
/// unless it is set to fail on start.
struct FakeProcesses {
    log: Log,
    server_fails: bool,
    watcher: Option<oneshot::Sender<ProcessNotifier>>,
}

/// Producer that reports `Stopped` as soon as a stop is requested.
fn until_stopped(name: &str) -> ProcessHandle {
    let (handle, mut notifier) = ProcessHandle::channel(name);
    tokio::spawn(async move {
        notifier.stop_requested().await;
        notifier.exited(ExitOutcome::Stopped);
    });
    handle
}

impl SessionProcesses for FakeProcesses {
    fn start_server(&mut self, output_type: OutputType) -> ProcessHandle {
        self.log.lock().unwrap().push(format!("server:{output_type}"));
        if self.server_fails {
            let (handle, notifier) = ProcessHandle::channel("dev-server");
            notifier.exited(ExitOutcome::SpawnFailed("npx: not found".into()));
            return handle;
        }
        until_stopped("dev-server")
    }

    fn start_watcher(&mut self, _config: &WatcherConfig) -> ProcessHandle {
        self.log.lock().unwrap().push("watcher".to_string());
        match self.watcher.take() {
            Some(tx) => {
                let (handle, notifier) = ProcessHandle::channel("watcher");
                let _ = tx.send(notifier);
                handle
            }
            None => until_stopped("watcher"),
        }
    }
}

struct Harness {
    _dir: TempDir,
    ctx: ProjectContext,
    log: Log,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        Self {
            ctx: ProjectContext::new(dir.path()),
            _dir: dir,
            log: Arc::default(),
        }
    }

    fn watch(&self) -> WatcherConfig {
        WatcherConfig::default_for(OutputType::Html, "bookpub", None)
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    while !condition() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

async fn within<T>(fut: impl std::future::Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(10), fut)
        .await
        .expect("dev session did not finish in time")
}

#[tokio::test]
async fn restart_triggers_exactly_one_rebuild_and_exit_completes() {
    let h = Harness::new();
    let converter = Arc::new(FakeConverter::new(h.log.clone()));
    let dispatcher = Dispatcher::new(converter.clone(), Arc::new(NoRender));
    let (tx, rx) = oneshot::channel();
    let processes = FakeProcesses {
        log: h.log.clone(),
        server_fails: false,
        watcher: Some(tx),
    };
    let session = DevSession::new(
        &dispatcher,
        processes,
        BuildRequest::new(&h.ctx, OutputType::Html),
        h.watch(),
    );

    let driver = async {
        let watcher = rx.await.unwrap();
        assert!(watcher.restarted());
        eventually(|| converter.builds.load(Ordering::SeqCst) == 2).await;
        watcher.exited(ExitOutcome::Exited(0));
    };

    let (summary, ()) = within(async { tokio::join!(session.run(), driver) }).await;

    assert_eq!(
        summary.unwrap(),
        SessionSummary {
            rebuilds: 1,
            failed_rebuilds: 0
        }
    );
    assert_eq!(
        h.log(),
        vec!["convert:html", "server:html", "watcher", "convert:html"]
    );
}

#[tokio::test]
async fn overlapping_restarts_run_two_rebuilds() {
    let h = Harness::new();
    let gate = Arc::new(Semaphore::new(0));
    let converter = Arc::new(FakeConverter {
        gate: Some(gate.clone()),
        ..FakeConverter::new(h.log.clone())
    });
    let dispatcher = Dispatcher::new(converter.clone(), Arc::new(NoRender));
    let (tx, rx) = oneshot::channel();
    let processes = FakeProcesses {
        log: h.log.clone(),
        server_fails: false,
        watcher: Some(tx),
    };
    let session = DevSession::new(
        &dispatcher,
        processes,
        BuildRequest::new(&h.ctx, OutputType::Pdf),
        h.watch(),
    );

    let driver = async {
        let watcher = rx.await.unwrap();
        assert!(watcher.restarted());
        assert!(watcher.restarted());
        eventually(|| converter.in_flight.load(Ordering::SeqCst) == 2).await;
        gate.add_permits(2);
        eventually(|| converter.builds.load(Ordering::SeqCst) == 3).await;
        watcher.exited(ExitOutcome::Exited(0));
    };

    let (summary, ()) = within(async { tokio::join!(session.run(), driver) }).await;

    assert_eq!(summary.unwrap().rebuilds, 2);
    assert_eq!(converter.max_in_flight.load(Ordering::SeqCst), 2);
    assert_eq!(
        h.log().iter().filter(|l| *l == "convert:pdf").count(),
        3
    );
}

#[tokio::test]
async fn watcher_crash_fails_the_session() {
    let h = Harness::new();
    let dispatcher = Dispatcher::new(
        Arc::new(FakeConverter::new(h.log.clone())),
        Arc::new(NoRender),
    );
    let (tx, rx) = oneshot::channel();
    let processes = FakeProcesses {
        log: h.log.clone(),
        server_fails: false,
        watcher: Some(tx),
    };
    let session = DevSession::new(
        &dispatcher,
        processes,
        BuildRequest::new(&h.ctx, OutputType::Html),
        h.watch(),
    );

    let driver = async {
        let watcher = rx.await.unwrap();
        watcher.exited(ExitOutcome::Exited(2));
    };

    let (result, ()): (Result<SessionSummary>, ()) =
        within(async { tokio::join!(session.run(), driver) }).await;

    match result {
        Err(CliError::Session(reason)) => assert!(reason.contains("watcher exited with code 2")),
        other => panic!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn server_spawn_failure_ends_the_session() {
    let h = Harness::new();
    let dispatcher = Dispatcher::new(
        Arc::new(FakeConverter::new(h.log.clone())),
        Arc::new(NoRender),
    );
    let processes = FakeProcesses {
        log: h.log.clone(),
        server_fails: true,
        watcher: None,
    };
    let session = DevSession::new(
        &dispatcher,
        processes,
        BuildRequest::new(&h.ctx, OutputType::Html),
        h.watch(),
    );

    let result = within(session.run()).await;

    match result {
        Err(CliError::Session(reason)) => assert!(reason.contains("dev server failed to start")),
        other => panic!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn failed_initial_build_starts_no_processes() {
    let h = Harness::new();
    let converter = FakeConverter {
        fail_on: vec![0],
        ..FakeConverter::new(h.log.clone())
    };
    let dispatcher = Dispatcher::new(Arc::new(converter), Arc::new(NoRender));
    let processes = FakeProcesses {
        log: h.log.clone(),
        server_fails: false,
        watcher: None,
    };
    let session = DevSession::new(
        &dispatcher,
        processes,
        BuildRequest::new(&h.ctx, OutputType::Html),
        h.watch(),
    );

    let result = within(session.run()).await;

    assert!(matches!(result, Err(CliError::Build(BuildError::EmptyManuscript(_)))));
    assert_eq!(h.log(), vec!["convert:html"]);
}

#[tokio::test]
async fn failed_rebuild_keeps_the_session_running() {
    let h = Harness::new();
    let converter = Arc::new(FakeConverter {
        fail_on: vec![1],
        ..FakeConverter::new(h.log.clone())
    });
    let dispatcher = Dispatcher::new(converter.clone(), Arc::new(NoRender));
    let (tx, rx) = oneshot::channel();
    let processes = FakeProcesses {
        log: h.log.clone(),
        server_fails: false,
        watcher: Some(tx),
    };
    let session = DevSession::new(
        &dispatcher,
        processes,
        BuildRequest::new(&h.ctx, OutputType::Html),
        h.watch(),
    );

    let driver = async {
        let watcher = rx.await.unwrap();
        assert!(watcher.restarted());
        eventually(|| converter.builds.load(Ordering::SeqCst) == 2).await;
        // The failed rebuild must not have stopped the watcher
        assert!(watcher.restarted());
        eventually(|| converter.builds.load(Ordering::SeqCst) == 3).await;
        watcher.exited(ExitOutcome::Exited(0));
    };

    let (summary, ()) = within(async { tokio::join!(session.run(), driver) }).await;

    assert_eq!(
        summary.unwrap(),
        SessionSummary {
            rebuilds: 2,
            failed_rebuilds: 1
        }
    );
    assert_eq!(
        h.log(),
        vec![
            "convert:html",
            "server:html",
            "watcher",
            "convert:html",
            "convert:html"
        ]
    );
}

#[tokio::test]
async fn interrupt_completes_the_session() {
    let h = Harness::new();
    let dispatcher = Dispatcher::new(
        Arc::new(FakeConverter::new(h.log.clone())),
        Arc::new(NoRender),
    );
    let (watcher_tx, watcher_rx) = oneshot::channel();
    let (interrupt_tx, interrupt_rx) = oneshot::channel::<()>();
    let processes = FakeProcesses {
        log: h.log.clone(),
        server_fails: false,
        watcher: Some(watcher_tx),
    };
    let session = DevSession::new(
        &dispatcher,
        processes,
        BuildRequest::new(&h.ctx, OutputType::Html),
        h.watch(),
    )
    .with_interrupt(
        async {
            let _ = interrupt_rx.await;
        }
        .boxed(),
    );

    let driver = async {
        let mut watcher = watcher_rx.await.unwrap();
        interrupt_tx.send(()).unwrap();
        // The session stops the watcher itself
        watcher.stop_requested().await;
        watcher.exited(ExitOutcome::Stopped);
    };

    let (summary, ()) = within(async { tokio::join!(session.run(), driver) }).await;

    assert_eq!(summary.unwrap(), SessionSummary::default());
}

fn dev_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let manuscript = temp.path().join("manuscript");
    std::fs::create_dir_all(&manuscript).unwrap();
    std::fs::write(manuscript.join("01.md"), "# One\n").unwrap();
    temp
}

fn bookpub(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bookpub").unwrap();
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("BOOKPUB_CWD")
        .env_remove("BOOKPUB_BUNDLER")
        .timeout(Duration::from_secs(30));
    cmd
}

#[cfg(unix)]
#[test]
fn watch_file_without_html_exec_falls_back_to_defaults() {
    let temp = dev_project();
    std::fs::write(
        temp.path().join("bookpub.watch.json"),
        r#"{ "watch": "manuscript", "execMap": { "md": "echo changed" } }"#,
    )
    .unwrap();

    // `true` stands in for a dev server that exits cleanly right away
    bookpub(&temp)
        .args(["dev", "--type", "html", "--bundler", "true"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Using default watch settings with outputType: html.",
        ));

    assert!(temp.path().join("build/html/index.html").is_file());
}

#[cfg(unix)]
#[test]
fn valid_watch_file_is_used() {
    let temp = dev_project();
    std::fs::write(
        temp.path().join("bookpub.watch.json"),
        r#"{ "execMap": { "html": "bookpub build --type html" } }"#,
    )
    .unwrap();

    bookpub(&temp)
        .args(["dev", "--bundler", "true"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Using watch settings from bookpub.watch.json"))
        .stderr(predicate::str::contains("Using default watch settings").not());
}

#[cfg(unix)]
#[test]
fn failing_dev_server_exits_non_zero() {
    let temp = dev_project();

    bookpub(&temp)
        .args(["dev", "--bundler", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dev server exited with code 1"));
}

#[test]
fn missing_bundler_exits_non_zero() {
    let temp = dev_project();

    bookpub(&temp)
        .args(["dev", "--bundler", "bookpub-no-such-bundler"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dev server failed to start"));
}

#[test]
fn dev_rejects_unknown_type() {
    let temp = dev_project();

    bookpub(&temp)
        .args(["dev", "--type", "epub"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid output type specified"));

    assert!(!temp.path().join("build").exists());
}
