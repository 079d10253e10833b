//! Record store contracts and CSV implementation.
//!
//! # Responsibility
//! - Read and rewrite the four-column tabular record file.
//! - Merge incoming entries by identity without touching existing rows.
//!
//! # Invariants
//! - Merge is append-only: existing rows keep their order and fields.
//! - First-seen identity wins, both against the store and inside one batch.
//! - The store is rewritten in full, through a sibling temp file and rename.

use crate::model::record::{Record, RECORD_COLUMNS};
use log::{info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Accepted header names per logical column, first match wins.
const ID_COLUMN_ALIASES: &[&str] = &["id"];
const TITLE_COLUMN_ALIASES: &[&str] = &["title"];
const ABSTRACT_COLUMN_ALIASES: &[&str] = &["abstract"];
const KEYWORDS_COLUMN_ALIASES: &[&str] = &["keywords", "keyword"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer error for file access and CSV encoding.
#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: std::io::Error },
    Csv { path: PathBuf, source: csv::Error },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "record store io error at `{}`: {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "record store csv error at `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
        }
    }
}

/// Rows read from a store, with the count of rows the reader could not decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedRecords {
    pub records: Vec<Record>,
    pub skipped_rows: usize,
}

/// Pure merge result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub records: Vec<Record>,
    pub added: usize,
    pub skipped_existing: usize,
    pub skipped_invalid: usize,
}

/// Summary of one store merge, returned to pipeline callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub added: usize,
    pub skipped_existing: usize,
    pub skipped_invalid: usize,
    /// Store length after the merge.
    pub total: usize,
    /// Whether this merge created the store file.
    pub created: bool,
}

/// Merges `new_entries` into `existing` by identity.
///
/// Entries with an id already present (in the store or earlier in the batch)
/// are dropped; entries with an empty id are dropped as invalid; everything
/// else is appended in encounter order.
pub fn merge_records(existing: Vec<Record>, new_entries: &[Record]) -> MergeOutcome {
    let mut seen = existing
        .iter()
        .map(|record| record.id.clone())
        .collect::<HashSet<_>>();
    let mut records = existing;
    let mut added = 0;
    let mut skipped_existing = 0;
    let mut skipped_invalid = 0;

    for entry in new_entries {
        if entry.validate().is_err() {
            skipped_invalid += 1;
            continue;
        }
        if !seen.insert(entry.id.clone()) {
            skipped_existing += 1;
            continue;
        }
        records.push(entry.clone());
        added += 1;
    }

    MergeOutcome {
        records,
        added,
        skipped_existing,
        skipped_invalid,
    }
}

/// Persistence interface for the record collection.
pub trait RecordStore {
    fn exists(&self) -> bool;
    fn load(&self) -> StoreResult<LoadedRecords>;
    fn save(&self, records: &[Record]) -> StoreResult<()>;

    /// Read-merge-rewrite. The file is only rewritten when something was added.
    fn merge(&self, new_entries: &[Record]) -> StoreResult<MergeReport> {
        let existed = self.exists();
        let existing = if existed {
            self.load()?.records
        } else {
            Vec::new()
        };

        let outcome = merge_records(existing, new_entries);
        if outcome.added > 0 {
            self.save(&outcome.records)?;
        }

        Ok(MergeReport {
            added: outcome.added,
            skipped_existing: outcome.skipped_existing,
            skipped_invalid: outcome.skipped_invalid,
            total: outcome.records.len(),
            created: !existed && outcome.added > 0,
        })
    }
}

/// CSV-backed record store (`id,title,abstract,keywords`).
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Counts data rows without decoding fields.
    pub fn count_rows(&self) -> StoreResult<usize> {
        let mut reader = self.open_reader()?;
        let mut total = 0;
        let mut row = csv::ByteRecord::new();
        loop {
            match reader.read_byte_record(&mut row) {
                Ok(true) => total += 1,
                Ok(false) => break,
                Err(err) => return Err(self.csv_error(err)),
            }
        }
        Ok(total)
    }

    fn open_reader(&self) -> StoreResult<csv::Reader<File>> {
        let file = File::open(&self.path).map_err(|source| self.io_error(source))?;
        Ok(csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(file))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|value| value.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RecordStore for CsvRecordStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> StoreResult<LoadedRecords> {
        let started_at = Instant::now();
        let mut reader = self.open_reader()?;
        let headers = reader
            .byte_headers()
            .map_err(|err| self.csv_error(err))?
            .iter()
            .map(|value| String::from_utf8_lossy(value).trim().to_ascii_lowercase())
            .collect::<Vec<_>>();
        let columns = ColumnIndex::resolve(&headers);

        let mut loaded = LoadedRecords::default();
        let mut row = csv::ByteRecord::new();
        loop {
            match reader.read_byte_record(&mut row) {
                Ok(true) => loaded.records.push(columns.record_from(&row)),
                Ok(false) => break,
                Err(err) if err.is_io_error() => return Err(self.csv_error(err)),
                Err(err) => {
                    loaded.skipped_rows += 1;
                    warn!(
                        "event=store_row_skip module=store status=skip path={} error={}",
                        self.path.display(),
                        err
                    );
                }
            }
        }

        info!(
            "event=store_load module=store status=ok path={} rows={} skipped={} duration_ms={}",
            self.path.display(),
            loaded.records.len(),
            loaded.skipped_rows,
            started_at.elapsed().as_millis()
        );
        Ok(loaded)
    }

    fn save(&self, records: &[Record]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let temp_path = self.temp_path();
        let write_result = (|| -> StoreResult<()> {
            let mut writer = csv::Writer::from_path(&temp_path).map_err(|err| self.csv_error(err))?;
            writer
                .write_record(RECORD_COLUMNS)
                .map_err(|err| self.csv_error(err))?;
            for record in records {
                writer
                    .write_record([
                        record.id.as_str(),
                        record.title.as_str(),
                        record.abstract_text.as_str(),
                        record.keywords.as_str(),
                    ])
                    .map_err(|err| self.csv_error(err))?;
            }
            writer
                .flush()
                .map_err(|source| self.io_error(source))?;
            Ok(())
        })();

        if let Err(err) = write_result {
            let _ = fs::remove_file(&temp_path);
            warn!(
                "event=store_save module=store status=error path={} error={}",
                self.path.display(),
                err
            );
            return Err(err);
        }

        fs::rename(&temp_path, &self.path).map_err(|source| self.io_error(source))?;
        info!(
            "event=store_save module=store status=ok path={} rows={}",
            self.path.display(),
            records.len()
        );
        Ok(())
    }
}

/// Header positions for the logical columns; missing columns read as empty.
struct ColumnIndex {
    id: Option<usize>,
    title: Option<usize>,
    abstract_text: Option<usize>,
    keywords: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Self {
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| headers.iter().position(|header| header == alias))
        };
        Self {
            id: find(ID_COLUMN_ALIASES),
            title: find(TITLE_COLUMN_ALIASES),
            abstract_text: find(ABSTRACT_COLUMN_ALIASES),
            keywords: find(KEYWORDS_COLUMN_ALIASES),
        }
    }

    fn record_from(&self, row: &csv::ByteRecord) -> Record {
        let field = |index: Option<usize>| {
            index
                .and_then(|i| row.get(i))
                .map(|value| String::from_utf8_lossy(value).into_owned())
                .unwrap_or_default()
        };
        Record {
            id: field(self.id),
            title: field(self.title),
            abstract_text: field(self.abstract_text),
            keywords: field(self.keywords),
        }
    }
}
