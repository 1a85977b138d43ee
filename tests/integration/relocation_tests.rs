use pdfdedupe::actions::{RelocateError, Relocator};
use pdfdedupe::scanner::FileRecord;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::SystemTime;
use tempfile::TempDir;

fn record(dir: &Path, name: &str, content: &[u8]) -> FileRecord {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    FileRecord::new(path, content.len() as u64, SystemTime::now())
}

#[test]
fn test_same_name_from_several_sources() {
    let dst = TempDir::new().unwrap();
    let sources: Vec<TempDir> = (0..3).map(|_| TempDir::new().unwrap()).collect();
    let relocator = Relocator::new(dst.path());

    let targets: Vec<_> = sources
        .iter()
        .enumerate()
        .map(|(i, dir)| {
            let file = record(dir.path(), "report.pdf", format!("v{i}").as_bytes());
            relocator.relocate(&file).unwrap()
        })
        .collect();

    assert_eq!(
        targets,
        vec![
            dst.path().join("report.pdf"),
            dst.path().join("report_1.pdf"),
            dst.path().join("report_2.pdf"),
        ]
    );
    assert_eq!(fs::read(dst.path().join("report.pdf")).unwrap(), b"v0");
    assert_eq!(fs::read(dst.path().join("report_2.pdf")).unwrap(), b"v2");
}

#[test]
fn test_concurrent_relocations_never_share_a_name() {
    let dst = TempDir::new().unwrap();
    let relocator = Arc::new(Relocator::new(dst.path()));
    let sources: Vec<TempDir> = (0..8).map(|_| TempDir::new().unwrap()).collect();
    let files: Vec<FileRecord> = sources
        .iter()
        .enumerate()
        .map(|(i, dir)| record(dir.path(), "scan.pdf", format!("copy {i}").as_bytes()))
        .collect();

    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let relocator = Arc::clone(&relocator);
            thread::spawn(move || relocator.relocate(&file).unwrap())
        })
        .collect();
    let mut targets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    targets.sort();
    targets.dedup();

    assert_eq!(targets.len(), 8);
    assert_eq!(fs::read_dir(dst.path()).unwrap().count(), 8);
}

#[test]
fn test_remove_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let file = FileRecord::new(dir.path().join("gone.pdf"), 0, SystemTime::now());

    let err = Relocator::new(dir.path()).remove(&file).unwrap_err();

    assert!(matches!(err, RelocateError::NotFound(_)));
    assert_eq!(err.path(), dir.path().join("gone.pdf"));
}

#[test]
fn test_ensure_destination_creates_parents() {
    let root = TempDir::new().unwrap();
    let nested = root.path().join("a").join("b").join("final");

    let relocator = Relocator::new(&nested);
    relocator.ensure_destination().unwrap();
    relocator.ensure_destination().unwrap();

    assert!(nested.is_dir());
    assert_eq!(relocator.destination(), nested.as_path());
}
