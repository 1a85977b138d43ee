use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfdedupe::scanner::{compare_pages, ContentHasher, TextFingerprinter};
use std::path::Path;
use tempfile::tempdir;

fn write_pdf(path: &Path, pages: &[&str], title: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.save(path).unwrap();
}

#[test]
fn test_text_fingerprint_is_stable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.pdf");
    write_pdf(&path, &["Hello", "World"], "Quarterly report");

    let first = TextFingerprinter::fingerprint(&path).unwrap();
    let second = TextFingerprinter::fingerprint(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.pages, 2);
}

#[test]
fn test_text_fingerprint_includes_metadata() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("b.pdf");
    write_pdf(&a, &["Same text"], "Title A");
    write_pdf(&b, &["Same text"], "Title B");

    let fp_a = TextFingerprinter::fingerprint(&a).unwrap();
    let fp_b = TextFingerprinter::fingerprint(&b).unwrap();

    assert_ne!(fp_a.fingerprint, fp_b.fingerprint);
}

#[test]
fn test_copies_compare_identical() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("b.pdf");
    write_pdf(&a, &["Page one", "Page two"], "Copy");
    std::fs::copy(&a, &b).unwrap();

    assert!(compare_pages(&a, &b).unwrap());
    let hasher = ContentHasher::new();
    assert_eq!(hasher.hash(&a).unwrap(), hasher.hash(&b).unwrap());
}

#[test]
fn test_compare_detects_differences() {
    let dir = tempdir().unwrap();
    let one_page = dir.path().join("one.pdf");
    let two_pages = dir.path().join("two.pdf");
    let other_text = dir.path().join("other.pdf");
    write_pdf(&one_page, &["Alpha"], "Doc");
    write_pdf(&two_pages, &["Alpha", "Beta"], "Doc");
    write_pdf(&other_text, &["Gamma"], "Doc");

    assert!(!compare_pages(&one_page, &two_pages).unwrap());
    assert!(!compare_pages(&one_page, &other_text).unwrap());
}

#[test]
fn test_compare_rejects_non_pdf() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.pdf");
    let bad = dir.path().join("bad.pdf");
    write_pdf(&good, &["Alpha"], "Doc");
    std::fs::write(&bad, b"plain text").unwrap();

    assert!(compare_pages(&good, &bad).is_err());
}
