use filetime::FileTime;
use pdfdedupe::audit::AuditLog;
use pdfdedupe::duplicates::{DetectionRun, RunError, RunOptions, RunStats};
use pdfdedupe::scanner::ScanError;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct Workspace {
    _root: TempDir,
    source: PathBuf,
    dest: PathBuf,
}

impl Workspace {
    fn new(files: &[(&str, &[u8])]) -> Self {
        let root = TempDir::new().unwrap();
        let source = root.path().join("source_pdfs");
        let dest = root.path().join("final_pdfs");
        fs::create_dir(&source).unwrap();
        for (name, content) in files {
            fs::write(source.join(name), content).unwrap();
        }
        Self {
            _root: root,
            source,
            dest,
        }
    }

    fn options(&self) -> RunOptions {
        RunOptions::new(&self.source, &self.dest)
    }
}

fn contents(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    if !dir.exists() {
        return BTreeMap::new();
    }
    fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (
                e.file_name().into_string().unwrap(),
                fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

#[test]
fn test_end_to_end_keeps_first_of_each_group() {
    let ws = Workspace::new(&[("a.pdf", b"%PDF-1.4 same"), ("b.pdf", b"%PDF-1.4 same"), ("c.pdf", b"%PDF-1.4 other")]);

    let stats = DetectionRun::new(ws.options()).run().unwrap();

    assert_eq!(
        stats,
        RunStats {
            total_scanned: 3,
            unique_count: 2,
            duplicate_count: 1,
            removed_count: 1,
            error_count: 0,
        }
    );
    let dest = contents(&ws.dest);
    assert_eq!(dest.keys().collect::<Vec<_>>(), vec!["a.pdf", "c.pdf"]);
    assert_eq!(dest["a.pdf"], b"%PDF-1.4 same");
    assert_eq!(dest["c.pdf"], b"%PDF-1.4 other");
    assert!(contents(&ws.source).is_empty());
}

#[test]
fn test_distinct_files_all_relocated() {
    let files: Vec<(String, Vec<u8>)> = (0..6)
        .map(|i| (format!("doc{i}.pdf"), format!("content {i}").into_bytes()))
        .collect();
    let borrowed: Vec<(&str, &[u8])> = files.iter().map(|(n, c)| (n.as_str(), c.as_slice())).collect();
    let ws = Workspace::new(&borrowed);

    let stats = DetectionRun::new(ws.options()).run().unwrap();

    assert_eq!(stats.total_scanned, 6);
    assert_eq!(stats.unique_count, 6);
    assert_eq!(stats.duplicate_count, 0);
    assert_eq!(stats.removed_count, 0);
    let dest = contents(&ws.dest);
    for (name, content) in &files {
        assert_eq!(&dest[name], content);
    }
}

#[test]
fn test_uppercase_extension_scanned_and_other_files_ignored() {
    let ws = Workspace::new(&[
        ("A.PDF", b"dup"),
        ("b.pdf", b"dup"),
        ("notes.txt", b"dup"),
        ("scan.pdf.bak", b"dup"),
    ]);

    let stats = DetectionRun::new(ws.options()).run().unwrap();

    assert_eq!(stats.total_scanned, 2);
    assert_eq!(stats.removed_count, 1);
    // "A.PDF" sorts before "b.pdf" by bytes
    assert_eq!(contents(&ws.dest).keys().collect::<Vec<_>>(), vec!["A.PDF"]);
    let source = contents(&ws.source);
    assert_eq!(
        source.keys().collect::<Vec<_>>(),
        vec!["notes.txt", "scan.pdf.bak"]
    );
}

#[test]
fn test_empty_source_changes_nothing() {
    let ws = Workspace::new(&[("readme.txt", b"not a pdf")]);

    let stats = DetectionRun::new(ws.options()).run().unwrap();

    assert_eq!(stats, RunStats::default());
    assert!(!ws.dest.exists());
    assert_eq!(contents(&ws.source).len(), 1);
}

#[test]
fn test_missing_source_is_directory_error() {
    let root = TempDir::new().unwrap();
    let options = RunOptions::new(root.path().join("absent"), root.path().join("out"));

    let result = DetectionRun::new(options).run();

    assert!(matches!(
        result,
        Err(RunError::Directory(ScanError::NotFound(_)))
    ));
    assert!(!root.path().join("out").exists());
}

#[test]
fn test_dry_run_touches_nothing() {
    let ws = Workspace::new(&[("a.pdf", b"x"), ("b.pdf", b"x"), ("c.pdf", b"y")]);
    let before = contents(&ws.source);
    let audit = Captured::default();

    let stats = DetectionRun::new(ws.options().with_dry_run(true))
        .with_audit_log(Arc::new(AuditLog::from_writer(audit.clone())))
        .run()
        .unwrap();

    assert_eq!(stats.duplicate_count, 1);
    assert_eq!(stats.removed_count, 1);
    assert_eq!(contents(&ws.source), before);
    assert!(!ws.dest.exists());

    let log = audit.text();
    assert!(log.contains("Would delete duplicate: b.pdf"));
    assert!(log.contains("Would move: a.pdf"));
}

#[test]
fn test_survivor_ignores_modification_time() {
    let ws = Workspace::new(&[("a.pdf", b"same"), ("b.pdf", b"same")]);
    // b is much older and a is brand new; the name still decides
    filetime::set_file_mtime(ws.source.join("b.pdf"), FileTime::from_unix_time(1_000_000, 0)).unwrap();
    filetime::set_file_mtime(ws.source.join("a.pdf"), FileTime::from_unix_time(2_000_000_000, 0)).unwrap();

    DetectionRun::new(ws.options()).run().unwrap();

    assert_eq!(contents(&ws.dest).keys().collect::<Vec<_>>(), vec!["a.pdf"]);
}

#[test]
fn test_existing_destination_file_not_overwritten() {
    let ws = Workspace::new(&[("report.pdf", b"new report")]);
    fs::create_dir(&ws.dest).unwrap();
    fs::write(ws.dest.join("report.pdf"), b"old report").unwrap();

    let stats = DetectionRun::new(ws.options()).run().unwrap();

    assert_eq!(stats.error_count, 0);
    let dest = contents(&ws.dest);
    assert_eq!(dest["report.pdf"], b"old report");
    assert_eq!(dest["report_1.pdf"], b"new report");
}

#[test]
fn test_audit_log_records_decisions() {
    let ws = Workspace::new(&[("a.pdf", b"same"), ("b.pdf", b"same"), ("c.pdf", b"same")]);
    let audit = Captured::default();

    DetectionRun::new(ws.options())
        .with_audit_log(Arc::new(AuditLog::from_writer(audit.clone())))
        .run()
        .unwrap();

    let log = audit.text();
    assert!(log.contains("Starting Duplicate PDF Detection Process"));
    assert!(log.contains("Found 3 PDF files"));
    assert!(log.contains("Keeping: a.pdf"));
    assert!(log.contains("Deleting duplicate: b.pdf"));
    assert!(log.contains("Deleting duplicate: c.pdf"));
    assert!(log.contains("Moving: a.pdf -> a.pdf"));
    assert!(log.contains("Duplicates removed: 2"));
}
