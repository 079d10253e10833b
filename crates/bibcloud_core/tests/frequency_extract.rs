use bibcloud_core::cache::FrequencyCache;
use bibcloud_core::text::extract::extract_from_store;
use bibcloud_core::{
    extract_frequencies, select_frequencies, CsvRecordStore, FrequencySource, Record, RecordStore,
    TermFrequencies,
};
use std::fs;

fn scenario_records() -> Vec<Record> {
    vec![
        Record::new("a")
            .with_abstract("machine learning models")
            .with_keywords("ai"),
        Record::new("b")
            .with_abstract("deep learning networks")
            .with_keywords("ai models"),
    ]
}

#[test]
fn scenario_counts_three_char_tokens_only() {
    let frequencies = extract_frequencies(&scenario_records());

    let expected: TermFrequencies = [
        ("learning", 2),
        ("machine", 1),
        ("models", 2),
        ("deep", 1),
        ("networks", 1),
    ]
    .into_iter()
    .collect();
    assert_eq!(frequencies, expected);
    assert_eq!(frequencies.get("ai"), 0);
}

#[test]
fn stopwords_numbers_and_case_are_normalized() {
    let records = vec![Record::new("s")
        .with_abstract("The Results of THE analysis using 2024 data and 3d-printing")
        .with_keywords("Printing; printing")];
    let frequencies = extract_frequencies(&records);

    assert_eq!(frequencies.get("the"), 0);
    assert_eq!(frequencies.get("results"), 0);
    assert_eq!(frequencies.get("analysis"), 0);
    assert_eq!(frequencies.get("2024"), 0);
    assert_eq!(frequencies.get("3d-printing"), 1);
    assert_eq!(frequencies.get("printing"), 2);
}

#[test]
fn extraction_is_idempotent_over_its_own_output() {
    let first = extract_frequencies(&scenario_records());
    let text = first
        .iter()
        .flat_map(|(term, count)| std::iter::repeat(term).take(count as usize))
        .collect::<Vec<_>>()
        .join(" ");

    let second = extract_frequencies(&[Record::new("echo").with_abstract(text)]);
    assert_eq!(first, second);
}

#[test]
fn unreadable_store_yields_empty_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.csv");
    fs::create_dir(&path).unwrap();

    let store = CsvRecordStore::new(&path);
    assert!(extract_from_store(&store).is_empty());
}

#[test]
fn selection_prefers_non_empty_cache() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvRecordStore::new(dir.path().join("records.csv"));
    store.save(&scenario_records()).unwrap();
    let cache = FrequencyCache::new(dir.path().join("frequencies.json"));
    cache
        .save(&[("cached", 7u64)].into_iter().collect())
        .unwrap();

    let selection = select_frequencies(&cache, &store, true);
    assert_eq!(selection.source, FrequencySource::Cache);
    assert_eq!(selection.frequencies.get("cached"), 7);

    let refreshed = select_frequencies(&cache, &store, false);
    assert_eq!(refreshed.source, FrequencySource::RecordStore);
    assert_eq!(refreshed.frequencies.get("learning"), 2);
}

#[test]
fn selection_ignores_empty_cache_and_reports_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvRecordStore::new(dir.path().join("records.csv"));
    let cache = FrequencyCache::new(dir.path().join("frequencies.json"));
    fs::write(cache.path(), r#"{"total_terms": 0, "terms": {}}"#).unwrap();

    let selection = select_frequencies(&cache, &store, true);
    assert!(selection.is_input_missing());
    assert!(selection.frequencies.is_empty());
}
