use bibcloud_core::bib::importer::{bibliography_files, parse_bibliography};
use bibcloud_core::{import_directory, import_file, ImportError};
use std::fs;

const TWO_ENTRIES: &str = r#"
@article{smith2020,
  title = {Machine {Learning} Models},
  abstract = "Deep   learning
              networks",
  keywords = {ai, models}
}

@inproceedings{doe2021,
  title = {No abstract here},
  keyword = {graphs}
}
"#;

#[test]
fn entries_map_to_records_with_defaults() {
    let import = parse_bibliography(TWO_ENTRIES).unwrap();
    assert_eq!(import.records.len(), 2);

    let first = &import.records[0];
    assert_eq!(first.id, "smith2020");
    assert_eq!(first.title, "Machine Learning Models");
    assert_eq!(first.abstract_text, "Deep learning networks");
    assert_eq!(first.keywords, "ai, models");

    let second = &import.records[1];
    assert_eq!(second.id, "doe2021");
    assert_eq!(second.abstract_text, "");
    assert_eq!(second.keywords, "graphs");
}

#[test]
fn malformed_document_does_not_abort_siblings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a_good.bib"), TWO_ENTRIES).unwrap();
    fs::write(dir.path().join("b_broken.BIB"), "@article{x, title = {never closed").unwrap();
    fs::write(dir.path().join("notes.txt"), "@article{ignored, title={x}}").unwrap();

    let import = import_directory(dir.path()).unwrap();
    assert_eq!(import.documents_parsed, 1);
    assert_eq!(import.failed_documents.len(), 1);
    assert!(import.failed_documents[0].path.ends_with("b_broken.BIB"));
    assert_eq!(import.records.len(), 2);
}

#[test]
fn directory_listing_is_sorted_and_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("z.bib"), "").unwrap();
    fs::write(dir.path().join("A.Bib"), "").unwrap();
    fs::write(dir.path().join("records.csv"), "").unwrap();

    let files = bibliography_files(dir.path()).unwrap();
    let names = files
        .iter()
        .map(|path| path.file_name().unwrap().to_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["A.Bib", "z.bib"]);
}

#[test]
fn missing_directory_imports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let import = import_directory(&dir.path().join("absent")).unwrap();
    assert!(import.records.is_empty());
    assert_eq!(import.documents_parsed, 0);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = import_file(&dir.path().join("gone.bib")).unwrap_err();
    assert!(matches!(err, ImportError::Io { .. }));
}

#[test]
fn trailing_comment_with_email_keeps_entries() {
    let import = parse_bibliography(
        "@article{a, abstract = {graph neural networks}}\n% maintained by someone@example.org\n",
    )
    .unwrap();
    assert_eq!(import.records.len(), 1);
    assert_eq!(import.records[0].id, "a");
    assert_eq!(import.records[0].abstract_text, "graph neural networks");
}
