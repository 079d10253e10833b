use bibcloud_core::{merge_records, CsvRecordStore, Record, RecordStore};
use std::fs;

fn record(id: &str, abstract_text: &str) -> Record {
    Record::new(id)
        .with_title(format!("title {id}"))
        .with_abstract(abstract_text)
        .with_keywords("kw")
}

#[test]
fn merge_creates_store_with_header() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvRecordStore::new(dir.path().join("records.csv"));
    assert!(!store.exists());

    let report = store.merge(&[record("a", "first"), record("b", "second")]).unwrap();
    assert!(report.created);
    assert_eq!(report.added, 2);
    assert_eq!(report.total, 2);

    let body = fs::read_to_string(store.path()).unwrap();
    assert!(body.starts_with("id,title,abstract,keywords"));
    assert!(!dir.path().join("records.csv.tmp").exists());
}

#[test]
fn merging_existing_id_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvRecordStore::new(dir.path().join("records.csv"));
    store.merge(&[record("a", "original abstract")]).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let report = store.merge(&[record("a", "replacement abstract")]).unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(report.skipped_existing, 1);
    assert_eq!(report.total, 1);
    assert!(!report.created);

    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    let loaded = store.load().unwrap();
    assert_eq!(loaded.records[0].abstract_text, "original abstract");
}

#[test]
fn merge_preserves_existing_order_and_appends_in_input_order() {
    let existing = vec![record("c", ""), record("a", "")];
    let incoming = vec![record("d", ""), record("a", ""), record("b", ""), record("d", "")];

    let outcome = merge_records(existing, &incoming);
    let ids = outcome
        .records
        .iter()
        .map(|record| record.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["c", "a", "d", "b"]);
    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.skipped_existing, 2);
}

#[test]
fn load_roundtrips_quoted_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvRecordStore::new(dir.path().join("records.csv"));
    let tricky = Record::new("q1")
        .with_title("Commas, \"quotes\" and\nnewlines")
        .with_abstract("análisis léxico")
        .with_keywords("nlp; text");
    store.save(&[tricky.clone()]).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.records, vec![tricky]);
    assert_eq!(loaded.skipped_rows, 0);
    assert_eq!(store.count_rows().unwrap(), 1);
}

#[test]
fn load_tolerates_short_rows_and_singular_keyword_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.csv");
    fs::write(&path, "id,title,abstract,keyword\nx1,Only title\nx2,T,body text,tags\n").unwrap();

    let loaded = CsvRecordStore::new(&path).load().unwrap();
    assert_eq!(loaded.records.len(), 2);
    assert_eq!(loaded.records[0].abstract_text, "");
    assert_eq!(loaded.records[0].keywords, "");
    assert_eq!(loaded.records[1].keywords, "tags");
}
