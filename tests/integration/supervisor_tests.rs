use pdfdedupe::duplicates::{DetectionRun, RunError, RunOptions, RunPhase};
use pdfdedupe::progress::{ProgressCallback, ProgressEvent, StatusTracker};
use pdfdedupe::supervisor::{RunSupervisor, SupervisorError};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Parks the run thread at the start of scanning until released.
struct Gate {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl ProgressCallback for Gate {
    fn on_event(&self, event: &ProgressEvent) {
        if let ProgressEvent::PhaseStarted {
            phase: RunPhase::Scanning,
            ..
        } = event
        {
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv_timeout(Duration::from_secs(30));
        }
    }
}

fn folders(files: &[(&str, &[u8])]) -> (TempDir, PathBuf, PathBuf) {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    fs::create_dir(&source).unwrap();
    for (name, content) in files {
        fs::write(source.join(name), content).unwrap();
    }
    let dest = root.path().join("dest");
    (root, source, dest)
}

#[test]
fn test_second_run_rejected_while_busy() {
    let (_root, source, dest) = folders(&[("a.pdf", b"1"), ("b.pdf", b"1")]);
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let gate = Arc::new(Gate {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });

    let supervisor = RunSupervisor::new();
    let handle = supervisor
        .start(DetectionRun::new(RunOptions::new(&source, &dest)).with_progress_callback(gate))
        .unwrap();
    entered_rx.recv_timeout(Duration::from_secs(30)).unwrap();

    assert!(supervisor.is_busy());
    let second = supervisor.start(DetectionRun::new(RunOptions::new(&source, &dest)));
    assert!(matches!(second, Err(SupervisorError::Busy)));

    release_tx.send(()).unwrap();
    let stats = handle.join().unwrap();
    assert_eq!(stats.removed_count, 1);
    assert!(!supervisor.is_busy());

    let third = supervisor
        .start(DetectionRun::new(RunOptions::new(&source, &dest)))
        .unwrap();
    let stats = third.join().unwrap();
    assert_eq!(stats.total_scanned, 0);
}

#[test]
fn test_cancel_interrupts_run() {
    let (_root, source, dest) = folders(&[("a.pdf", b"1"), ("b.pdf", b"2")]);
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let gate = Arc::new(Gate {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });

    let supervisor = RunSupervisor::new();
    let handle = supervisor
        .start(DetectionRun::new(RunOptions::new(&source, &dest)).with_progress_callback(gate))
        .unwrap();
    entered_rx.recv_timeout(Duration::from_secs(30)).unwrap();

    handle.cancel();
    release_tx.send(()).unwrap();

    match handle.join() {
        Err(RunError::Interrupted { stats }) => assert_eq!(stats.total_scanned, 2),
        other => panic!("expected interruption, got {other:?}"),
    }
    assert!(source.join("a.pdf").exists());
    assert!(source.join("b.pdf").exists());
    assert!(!dest.exists());
}

#[test]
fn test_status_tracker_follows_run() {
    let (_root, source, dest) = folders(&[("a.pdf", b"1"), ("b.pdf", b"1"), ("c.pdf", b"2")]);
    let tracker = Arc::new(StatusTracker::new());
    assert!(!tracker.snapshot().is_processing);

    let stats = DetectionRun::new(RunOptions::new(&source, &dest))
        .with_progress_callback(tracker.clone())
        .run()
        .unwrap();

    let snapshot = tracker.snapshot();
    assert!(!snapshot.is_processing);
    assert_eq!(snapshot.progress, 100);
    assert_eq!(snapshot.status, "Completed!");
    assert_eq!(snapshot.stats, Some(stats));
    assert!(snapshot.error.is_none());
}

#[test]
fn test_status_tracker_records_failure() {
    let root = TempDir::new().unwrap();
    let tracker = Arc::new(StatusTracker::new());

    let result = DetectionRun::new(RunOptions::new(root.path().join("missing"), root.path().join("out")))
        .with_progress_callback(tracker.clone())
        .run();

    assert!(result.is_err());
    let snapshot = tracker.snapshot();
    assert!(!snapshot.is_processing);
    assert!(snapshot.error.is_some());
}
