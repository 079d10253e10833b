//! Bibliography importer.
//!
//! # Responsibility
//! - Map parsed entries onto `Record` values through ordered alias lists.
//! - Import every `.bib` document of a directory, skipping broken ones.
//!
//! # Invariants
//! - Entries without a usable identity never become records.
//! - One malformed document never prevents its siblings from importing.
//! - Documents are visited in file-name order.

use crate::bib::parser::{parse_bibtex, BibDocument, BibEntry, BibParseError};
use crate::model::record::Record;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of bibliography documents, matched case-insensitively.
pub const BIBLIOGRAPHY_EXTENSION: &str = "bib";

/// Where a logical field value may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSource {
    /// Entry citation key (`@article{<key>, ...}`), exposed as `ID`.
    CitationKey,
    /// Named field, lower-cased.
    Field(&'static str),
}

const IDENTITY_ALIASES: &[FieldSource] = &[
    FieldSource::CitationKey,
    FieldSource::Field("key"),
    FieldSource::Field("id"),
];
const TITLE_ALIASES: &[FieldSource] = &[FieldSource::Field("title")];
const ABSTRACT_ALIASES: &[FieldSource] = &[FieldSource::Field("abstract")];
const KEYWORD_ALIASES: &[FieldSource] = &[
    FieldSource::Field("keywords"),
    FieldSource::Field("keyword"),
];

pub type ImportResult<T> = Result<T, ImportError>;

/// Document-level import failure.
#[derive(Debug)]
pub enum ImportError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: BibParseError },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read `{}`: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "cannot parse `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Records from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryImport {
    pub records: Vec<Record>,
    /// Broken entries plus entries without identity.
    pub skipped_entries: usize,
}

/// A document skipped during directory import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Aggregate result of importing a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryImport {
    pub records: Vec<Record>,
    pub documents_parsed: usize,
    pub skipped_entries: usize,
    pub failed_documents: Vec<SourceFailure>,
}

/// Converts parsed entries to records.
pub fn records_from_document(document: &BibDocument) -> EntryImport {
    let mut import = EntryImport {
        records: Vec::with_capacity(document.entries.len()),
        skipped_entries: document.skipped_entries,
    };
    for entry in &document.entries {
        match record_from_entry(entry) {
            Some(record) => import.records.push(record),
            None => import.skipped_entries += 1,
        }
    }
    import
}

/// Maps one entry; `None` when no identity alias resolves.
pub fn record_from_entry(entry: &BibEntry) -> Option<Record> {
    let id = resolve(entry, IDENTITY_ALIASES)?;
    Some(Record {
        id: id.to_string(),
        title: resolve(entry, TITLE_ALIASES).unwrap_or_default().to_string(),
        abstract_text: resolve(entry, ABSTRACT_ALIASES)
            .unwrap_or_default()
            .to_string(),
        keywords: resolve(entry, KEYWORD_ALIASES)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Parses bibliography text into records.
pub fn parse_bibliography(text: &str) -> Result<EntryImport, BibParseError> {
    parse_bibtex(text).map(|document| records_from_document(&document))
}

/// Reads and parses one document. Invalid UTF-8 is replaced, not rejected.
pub fn import_file(path: &Path) -> ImportResult<EntryImport> {
    let bytes = fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    parse_bibliography(&text).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Lists `.bib` documents directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn bibliography_files(dir: &Path) -> ImportResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let read_dir = fs::read_dir(dir).map_err(|source| ImportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = read_dir
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_bibliography_extension(path))
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

/// Imports every document in `dir`; failing documents are recorded and skipped.
pub fn import_directory(dir: &Path) -> ImportResult<DirectoryImport> {
    let mut import = DirectoryImport::default();

    for path in bibliography_files(dir)? {
        match import_file(&path) {
            Ok(entries) => {
                info!(
                    "event=bib_import module=bib status=ok path={} records={} skipped={}",
                    path.display(),
                    entries.records.len(),
                    entries.skipped_entries
                );
                import.documents_parsed += 1;
                import.skipped_entries += entries.skipped_entries;
                import.records.extend(entries.records);
            }
            Err(err) => {
                warn!(
                    "event=bib_import module=bib status=skip path={} error={}",
                    path.display(),
                    err
                );
                import.failed_documents.push(SourceFailure {
                    path,
                    message: err.to_string(),
                });
            }
        }
    }

    Ok(import)
}

pub(crate) fn has_bibliography_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(BIBLIOGRAPHY_EXTENSION))
}

fn resolve<'a>(entry: &'a BibEntry, aliases: &[FieldSource]) -> Option<&'a str> {
    aliases.iter().find_map(|source| {
        let value = match source {
            FieldSource::CitationKey => Some(entry.key.as_str()),
            FieldSource::Field(name) => entry.field(name),
        };
        value.map(str::trim).filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::{has_bibliography_extension, record_from_entry};
    use crate::bib::parser::BibEntry;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn entry(key: &str, fields: &[(&str, &str)]) -> BibEntry {
        BibEntry {
            entry_type: "article".to_string(),
            key: key.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn identity_falls_back_to_key_then_id_fields() {
        let from_key_field = entry("", &[("key", "k-1"), ("id", "i-1")]);
        assert_eq!(record_from_entry(&from_key_field).unwrap().id, "k-1");

        let from_id_field = entry(" ", &[("id", "i-1")]);
        assert_eq!(record_from_entry(&from_id_field).unwrap().id, "i-1");

        assert!(record_from_entry(&entry("", &[("title", "t")])).is_none());
    }

    #[test]
    fn keyword_field_accepts_singular_name() {
        let record = record_from_entry(&entry("a", &[("keyword", "graphs")])).unwrap();
        assert_eq!(record.keywords, "graphs");
        assert_eq!(record.abstract_text, "");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(has_bibliography_extension(Path::new("refs.BIB")));
        assert!(!has_bibliography_extension(Path::new("refs.bibx")));
    }
}
