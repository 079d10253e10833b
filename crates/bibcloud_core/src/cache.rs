//! Frequency cache snapshot.
//!
//! # Responsibility
//! - Persist the term mapping as pretty-printed JSON `{total_terms, terms}`.
//! - Load the mapping back, treating absence or damage as "no cache".
//!
//! # Invariants
//! - `total_terms` is recomputed on every save and ignored on load.
//! - Loading never returns an error.

use crate::model::frequency::TermFrequencies;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache write failure.
#[derive(Debug)]
pub enum CacheError {
    Io { path: PathBuf, source: std::io::Error },
    Encode(serde_json::Error),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot write frequency cache `{}`: {source}", path.display())
            }
            Self::Encode(err) => write!(f, "cannot encode frequency cache: {err}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// On-disk snapshot shape written by [`FrequencyCache::save`].
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub total_terms: u64,
    pub terms: TermFrequencies,
}

/// Shape read back on load; every field other than `terms` is ignored, so a
/// stale or foreign `total_terms` never invalidates the mapping.
#[derive(Debug, Deserialize)]
struct StoredSnapshot {
    #[serde(default)]
    terms: TermFrequencies,
}

impl CacheSnapshot {
    pub fn from_frequencies(frequencies: &TermFrequencies) -> Self {
        Self {
            total_terms: frequencies.total(),
            terms: frequencies.clone(),
        }
    }
}

/// File-backed frequency cache.
#[derive(Debug, Clone)]
pub struct FrequencyCache {
    path: PathBuf,
}

impl FrequencyCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Writes the snapshot, creating the parent directory when needed.
    pub fn save(&self, frequencies: &TermFrequencies) -> CacheResult<()> {
        let snapshot = CacheSnapshot::from_frequencies(frequencies);
        let body = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        fs::write(&self.path, body).map_err(|source| self.io_error(source))?;

        info!(
            "event=cache_save module=cache status=ok path={} terms={} total_terms={}",
            self.path.display(),
            frequencies.len(),
            snapshot.total_terms
        );
        Ok(())
    }

    /// Loads the mapping; missing or unreadable snapshots yield an empty one.
    pub fn load(&self) -> TermFrequencies {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(err) => {
                debug!(
                    "event=cache_load module=cache status=skip path={} error={}",
                    self.path.display(),
                    err
                );
                return TermFrequencies::new();
            }
        };

        match serde_json::from_str::<StoredSnapshot>(&body) {
            Ok(snapshot) => {
                info!(
                    "event=cache_load module=cache status=ok path={} terms={}",
                    self.path.display(),
                    snapshot.terms.len()
                );
                snapshot.terms
            }
            Err(err) => {
                warn!(
                    "event=cache_load module=cache status=error error_code=cache_corrupt path={} error={}",
                    self.path.display(),
                    err
                );
                TermFrequencies::new()
            }
        }
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
