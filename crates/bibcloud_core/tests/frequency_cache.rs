use bibcloud_core::{FrequencyCache, TermFrequencies};
use std::fs;

#[test]
fn save_and_load_roundtrip_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FrequencyCache::new(dir.path().join("nested").join("frequencies.json"));
    let frequencies: TermFrequencies = [("análisis", 3u64), ("learning", 2), ("red", 1)]
        .into_iter()
        .collect();

    cache.save(&frequencies).unwrap();
    assert_eq!(cache.load(), frequencies);
}

#[test]
fn snapshot_is_pretty_utf8_with_recomputed_total() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FrequencyCache::new(dir.path().join("frequencies.json"));
    cache
        .save(&[("señal", 4u64), ("ruido", 1)].into_iter().collect())
        .unwrap();

    let body = fs::read_to_string(cache.path()).unwrap();
    assert!(body.contains("señal"));
    assert!(body.contains('\n'));

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["total_terms"], 5);
    assert_eq!(value["terms"]["señal"], 4);
}

#[test]
fn missing_or_corrupt_snapshot_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FrequencyCache::new(dir.path().join("frequencies.json"));
    assert!(cache.load().is_empty());

    fs::write(cache.path(), "{ not json").unwrap();
    assert!(cache.load().is_empty());
}

#[test]
fn stored_total_is_not_trusted() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FrequencyCache::new(dir.path().join("frequencies.json"));
    fs::write(
        cache.path(),
        r#"{"total_terms": 999, "terms": {"alpha": 2, "beta": 1}}"#,
    )
    .unwrap();

    let loaded = cache.load();
    assert_eq!(loaded.total(), 3);
}

#[test]
fn malformed_total_does_not_discard_terms() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FrequencyCache::new(dir.path().join("frequencies.json"));

    for total in [r#""stale""#, "-1", "2.0", "null"] {
        fs::write(
            cache.path(),
            format!(r#"{{"total_terms": {total}, "terms": {{"graph": 2}}}}"#),
        )
        .unwrap();
        let loaded = cache.load();
        assert_eq!(loaded.get("graph"), 2, "total_terms = {total}");
        assert_eq!(loaded.total(), 2);
    }
}
