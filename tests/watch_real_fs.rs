// tests/watch_real_fs.rs
//
// End-to-end tests against the real filesystem and the `notify` backend.
// The command itself is faked so only the watching is real.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

use as_soon::engine::{EventSender, RunId, Runtime, RuntimeOptions, WatchEvent, event_channel};
use as_soon::exec::{CommandSpec, DebouncedExecutor};
use as_soon::fs::{FileSystem, RealFileSystem};
use as_soon::watch::{NotifyNotifier, resolve_targets};
use as_soon_test_utils::fake_executor::FakeExecutor;
use as_soon_test_utils::{eventually, init_tracing, with_timeout};

const DEBOUNCE: Duration = Duration::from_millis(100);
const SETTLE: Duration = Duration::from_millis(150);
const PATIENCE: Duration = Duration::from_secs(3);

struct Running {
    root: PathBuf,
    tx: EventSender,
    executed: Arc<Mutex<Vec<RunId>>>,
    handle: JoinHandle<as_soon::errors::Result<()>>,
    _dir: tempfile::TempDir,
}

impl Running {
    fn runs(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    async fn wait_for_runs(&self, n: usize) -> bool {
        let executed = Arc::clone(&self.executed);
        eventually(PATIENCE, move || executed.lock().unwrap().len() >= n).await
    }

    async fn stop(self) {
        self.tx.send(WatchEvent::ShutdownRequested).unwrap();
        with_timeout(self.handle)
            .await
            .expect("runtime task panicked")
            .expect("runtime failed");
    }
}

async fn watch(setup: impl FnOnce(&Path), raws: &[&str]) -> Running {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    setup(&root);

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let raws: Vec<String> = raws.iter().map(|s| s.to_string()).collect();
    let targets = resolve_targets(fs.as_ref(), &raws, &root);

    let (tx, rx) = event_channel();
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = DebouncedExecutor::new(
        CommandSpec::new("true", Vec::new()),
        FakeExecutor::new(tx.clone(), executed.clone()),
        DEBOUNCE,
    );
    let notifier = NotifyNotifier::new(tx.clone(), Arc::clone(&fs));
    let runtime = Runtime::new(
        targets,
        fs,
        notifier,
        executor,
        (tx.clone(), rx),
        RuntimeOptions { settle: SETTLE },
    );

    let running = Running {
        root,
        tx,
        executed,
        handle: tokio::spawn(runtime.run()),
        _dir: dir,
    };
    assert!(running.wait_for_runs(1).await, "startup run never happened");
    // Give the watchers a moment to become live.
    sleep(Duration::from_millis(100)).await;
    running
}

#[tokio::test]
async fn writing_into_a_watched_directory_reruns() {
    let r = watch(|root| std::fs::create_dir(root.join("src")).unwrap(), &["src"]).await;

    std::fs::write(r.path("src/lib.rs"), "pub fn f() {}").unwrap();
    assert!(r.wait_for_runs(2).await, "change was not picked up");

    r.stop().await;
}

#[tokio::test]
async fn watched_file_ignores_sibling_writes() {
    let r = watch(
        |root| {
            std::fs::write(root.join("main.rs"), "v1").unwrap();
            std::fs::write(root.join("notes.txt"), "").unwrap();
        },
        &["main.rs"],
    )
    .await;

    std::fs::write(r.path("notes.txt"), "scribble").unwrap();
    sleep(DEBOUNCE * 4).await;
    assert_eq!(r.runs(), 1, "sibling write must not rerun");

    std::fs::write(r.path("main.rs"), "v2").unwrap();
    assert!(r.wait_for_runs(2).await, "write to the watched file was missed");

    r.stop().await;
}

#[tokio::test]
async fn output_directory_created_after_startup_is_watched() {
    let r = watch(|_| {}, &["out"]).await;

    std::fs::create_dir(r.path("out")).unwrap();
    sleep(SETTLE + DEBOUNCE * 3).await;
    assert_eq!(r.runs(), 1, "creating the directory is not itself a change");

    std::fs::write(r.path("out/foo.txt"), "x").unwrap();
    assert!(r.wait_for_runs(2).await, "write inside the new directory was missed");

    r.stop().await;
}

#[tokio::test]
async fn directory_removed_and_recreated_keeps_being_watched() {
    let r = watch(|root| std::fs::create_dir(root.join("src")).unwrap(), &["src"]).await;

    std::fs::remove_dir(r.path("src")).unwrap();
    sleep(DEBOUNCE * 3).await;
    std::fs::create_dir(r.path("src")).unwrap();
    sleep(SETTLE + DEBOUNCE * 3).await;

    let before = r.runs();
    std::fs::write(r.path("src/new.rs"), "").unwrap();
    assert!(
        r.wait_for_runs(before + 1).await,
        "recreated directory is not watched"
    );

    r.stop().await;
}
