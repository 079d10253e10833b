//! Data-directory intake: staging source files and counting what is there.
//!
//! # Responsibility
//! - Copy `.bib` documents and pre-built data files into the data directory.
//! - Report how many records the next run would see.
//!
//! # Invariants
//! - Destination names are reduced to their file-name component.
//! - A bibliography never silently replaces an existing file unless asked to.
//! - Only `records.csv` and `frequencies.json` are accepted as data files.

use crate::bib::importer::{
    bibliography_files, has_bibliography_extension, ImportError, BIBLIOGRAPHY_EXTENSION,
};
use crate::bib::parser::parse_bibtex;
use crate::config::{FREQUENCIES_FILE_NAME, RECORDS_FILE_NAME};
use crate::store::record_store::{CsvRecordStore, StoreError};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Data files that may be staged verbatim.
pub const STAGEABLE_DATA_FILES: &[&str] = &[RECORDS_FILE_NAME, FREQUENCIES_FILE_NAME];

/// Suffixed names tried before staging a colliding bibliography gives up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

pub type StagingResult<T> = Result<T, StagingError>;

/// Intake error.
#[derive(Debug)]
pub enum StagingError {
    SourceMissing(PathBuf),
    NotBibliography(PathBuf),
    InvalidName(String),
    UnsupportedDataFile(String),
    Io { path: PathBuf, source: std::io::Error },
    Store(StoreError),
    Import(ImportError),
}

impl Display for StagingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceMissing(path) => write!(f, "source file not found: {}", path.display()),
            Self::NotBibliography(path) => {
                write!(f, "only .bib files are accepted: {}", path.display())
            }
            Self::InvalidName(name) => write!(f, "invalid destination name `{name}`"),
            Self::UnsupportedDataFile(name) => write!(
                f,
                "unsupported data file `{name}`; allowed: {}",
                STAGEABLE_DATA_FILES.join(", ")
            ),
            Self::Io { path, source } => write!(f, "i/o error at `{}`: {source}", path.display()),
            Self::Store(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StagingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Store(err) => Some(err),
            Self::Import(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for StagingError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ImportError> for StagingError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

/// Where a staged file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    pub path: PathBuf,
    pub file_name: String,
    /// An existing file at `path` was overwritten.
    pub replaced: bool,
}

/// Which collection [`count_records`] counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTotalSource {
    Records,
    Bibliography,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordTotal {
    #[serde(rename = "total_records")]
    pub total: usize,
    pub source: RecordTotalSource,
}

/// Copies a `.bib` document into `data_dir`.
///
/// `name` overrides the destination file name. Without `overwrite`, a name
/// collision stages the file as `<stem>_<unix_seconds>.bib`, or
/// `<stem>_<unix_seconds>_<n>.bib` when that is taken too.
pub fn stage_bibliography(
    source: &Path,
    data_dir: &Path,
    name: Option<&str>,
    overwrite: bool,
) -> StagingResult<StagedFile> {
    ensure_source_file(source)?;
    if !has_bibliography_extension(source) {
        return Err(StagingError::NotBibliography(source.to_path_buf()));
    }

    let file_name = match name {
        Some(name) => {
            let file_name = safe_file_name(name)?;
            if !has_bibliography_extension(Path::new(&file_name)) {
                return Err(StagingError::InvalidName(name.to_string()));
            }
            file_name
        }
        None => safe_file_name(&source.to_string_lossy())?,
    };

    create_dir(data_dir)?;
    let requested = data_dir.join(&file_name);
    let staged = if overwrite {
        let replaced = requested.exists();
        copy_file(source, &requested)?;
        staged_file(requested, replaced)
    } else {
        let destination = copy_to_free_name(source, data_dir, &requested)?;
        staged_file(destination, false)
    };
    info!(
        "event=stage_bib module=intake status=ok file_name={} replaced={}",
        staged.file_name, staged.replaced
    );
    Ok(staged)
}

/// Copies `records.csv` or `frequencies.json` into `data_dir`, replacing any
/// existing copy.
pub fn stage_data_file(source: &Path, data_dir: &Path) -> StagingResult<StagedFile> {
    ensure_source_file(source)?;
    let file_name = safe_file_name(&source.to_string_lossy())?;
    if !STAGEABLE_DATA_FILES.contains(&file_name.as_str()) {
        return Err(StagingError::UnsupportedDataFile(file_name));
    }

    create_dir(data_dir)?;
    let destination = data_dir.join(&file_name);
    let replaced = destination.exists();
    copy_file(source, &destination)?;

    let staged = staged_file(destination, replaced);
    info!(
        "event=stage_data module=intake status=ok file_name={} replaced={}",
        staged.file_name, staged.replaced
    );
    Ok(staged)
}

/// Records available to the next run.
///
/// The record store wins when present. Otherwise entries across parseable
/// bibliography documents are counted; unparseable documents are ignored.
pub fn count_records(data_dir: &Path) -> StagingResult<RecordTotal> {
    let store = CsvRecordStore::new(data_dir.join(RECORDS_FILE_NAME));
    if store.path().exists() {
        let total = store.count_rows()?;
        return Ok(RecordTotal {
            total,
            source: RecordTotalSource::Records,
        });
    }

    let mut total = 0;
    for path in bibliography_files(data_dir)? {
        let text = match fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                warn!(
                    "event=count_records module=intake status=skip path={} error={}",
                    path.display(),
                    err
                );
                continue;
            }
        };
        match parse_bibtex(&text) {
            Ok(document) => total += document.entries.len(),
            Err(err) => warn!(
                "event=count_records module=intake status=skip path={} error={}",
                path.display(),
                err
            ),
        }
    }

    if total > 0 {
        Ok(RecordTotal {
            total,
            source: RecordTotalSource::Bibliography,
        })
    } else {
        Ok(RecordTotal {
            total: 0,
            source: RecordTotalSource::None,
        })
    }
}

fn ensure_source_file(source: &Path) -> StagingResult<()> {
    if source.is_file() {
        Ok(())
    } else {
        Err(StagingError::SourceMissing(source.to_path_buf()))
    }
}

/// Final path component of `raw`, rejecting names that resolve to nothing.
fn safe_file_name(raw: &str) -> StagingResult<String> {
    Path::new(raw.trim())
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StagingError::InvalidName(raw.to_string()))
}

/// Copies `source` to the first name in the collision sequence that does not
/// exist yet: `requested`, then `<stem>_<secs>.bib`, then `<stem>_<secs>_1.bib`
/// and so on. Each candidate is claimed with `create_new`, so concurrent
/// stagings never share a destination.
fn copy_to_free_name(source: &Path, data_dir: &Path, requested: &Path) -> StagingResult<PathBuf> {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();

    let mut candidate = requested.to_path_buf();
    for attempt in 0..MAX_NAME_ATTEMPTS {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut file) => {
                write_copy(source, &candidate, &mut file)?;
                return Ok(candidate);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                candidate = data_dir.join(timestamped_name(requested, seconds, attempt));
            }
            Err(source) => {
                return Err(StagingError::Io {
                    path: candidate,
                    source,
                })
            }
        }
    }

    Err(StagingError::Io {
        path: requested.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::AlreadyExists,
            "no free destination name left",
        ),
    })
}

fn write_copy(source: &Path, destination: &Path, file: &mut fs::File) -> StagingResult<()> {
    let copied = fs::File::open(source)
        .map_err(|err| StagingError::Io {
            path: source.to_path_buf(),
            source: err,
        })
        .and_then(|mut reader| {
            io::copy(&mut reader, file).map_err(|err| StagingError::Io {
                path: destination.to_path_buf(),
                source: err,
            })
        });
    if copied.is_err() {
        // Leave no half-written file claiming the name.
        let _ = fs::remove_file(destination);
    }
    copied.map(|_| ())
}

/// `<stem>_<seconds>.bib` for the first retry, `<stem>_<seconds>_<n>.bib` after.
fn timestamped_name(requested: &Path, seconds: u64, attempt: u32) -> String {
    let stem = requested
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    if attempt == 0 {
        format!("{stem}_{seconds}.{BIBLIOGRAPHY_EXTENSION}")
    } else {
        format!("{stem}_{seconds}_{attempt}.{BIBLIOGRAPHY_EXTENSION}")
    }
}

fn create_dir(dir: &Path) -> StagingResult<()> {
    fs::create_dir_all(dir).map_err(|source| StagingError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn copy_file(source: &Path, destination: &Path) -> StagingResult<()> {
    fs::copy(source, destination)
        .map(|_| ())
        .map_err(|source| StagingError::Io {
            path: destination.to_path_buf(),
            source,
        })
}

fn staged_file(path: PathBuf, replaced: bool) -> StagedFile {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    StagedFile {
        path,
        file_name,
        replaced,
    }
}
