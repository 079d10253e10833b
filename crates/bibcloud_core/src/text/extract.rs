//! Frequency extraction and source selection.
//!
//! # Responsibility
//! - Aggregate token counts over record abstracts and keywords.
//! - Choose between the frequency cache and a fresh extraction, once per run.
//!
//! # Invariants
//! - Extraction never fails: unreadable input yields an empty mapping.
//! - A store that exists but cannot be read is reported on the selection.
//! - A non-empty cache wins over the store when cache use is allowed.

use crate::cache::FrequencyCache;
use crate::model::frequency::TermFrequencies;
use crate::model::record::Record;
use crate::store::record_store::{RecordStore, StoreResult};
use crate::text::tokenizer::tokenize;
use log::{info, warn};
use serde::Serialize;

/// Where the selected mapping came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencySource {
    Cache,
    RecordStore,
    /// Neither a usable cache nor a store exists.
    None,
}

impl FrequencySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::RecordStore => "record_store",
            Self::None => "none",
        }
    }
}

/// Mapping chosen for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencySelection {
    pub frequencies: TermFrequencies,
    pub source: FrequencySource,
    /// Read failure of a present store; the mapping is then empty.
    pub store_error: Option<String>,
}

impl FrequencySelection {
    /// `true` when no input data was found at all.
    pub fn is_input_missing(&self) -> bool {
        self.source == FrequencySource::None
    }
}

/// Counts tokens of `abstract + keywords` over all records.
pub fn extract_frequencies(records: &[Record]) -> TermFrequencies {
    let mut frequencies = TermFrequencies::new();
    for record in records {
        for token in tokenize(&record.frequency_text()) {
            frequencies.increment(&token);
        }
    }
    frequencies
}

/// Extracts from a store; a missing or unreadable store yields an empty mapping.
pub fn extract_from_store<S: RecordStore>(store: &S) -> TermFrequencies {
    if !store.exists() {
        return TermFrequencies::new();
    }
    try_extract_from_store(store).unwrap_or_default()
}

fn try_extract_from_store<S: RecordStore>(store: &S) -> StoreResult<TermFrequencies> {
    store
        .load()
        .map(|loaded| extract_frequencies(&loaded.records))
        .map_err(|err| {
            warn!(
                "event=extract module=text status=error error_code=store_unreadable error={}",
                err
            );
            err
        })
}

/// Applies the selection policy: cache, then store, then nothing.
pub fn select_frequencies<S: RecordStore>(
    cache: &FrequencyCache,
    store: &S,
    prefer_cache: bool,
) -> FrequencySelection {
    if prefer_cache {
        let cached = cache.load();
        if !cached.is_empty() {
            info!(
                "event=frequency_select module=text status=ok source=cache terms={}",
                cached.len()
            );
            return FrequencySelection {
                frequencies: cached,
                source: FrequencySource::Cache,
                store_error: None,
            };
        }
    }

    if store.exists() {
        let (extracted, store_error) = match try_extract_from_store(store) {
            Ok(extracted) => (extracted, None),
            Err(err) => (TermFrequencies::new(), Some(err.to_string())),
        };
        info!(
            "event=frequency_select module=text status=ok source=record_store terms={} total={}",
            extracted.len(),
            extracted.total()
        );
        return FrequencySelection {
            frequencies: extracted,
            source: FrequencySource::RecordStore,
            store_error,
        };
    }

    info!("event=frequency_select module=text status=skip source=none");
    FrequencySelection {
        frequencies: TermFrequencies::new(),
        source: FrequencySource::None,
        store_error: None,
    }
}
