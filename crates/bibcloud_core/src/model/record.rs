//! Bibliographic record model.
//!
//! # Responsibility
//! - Define the canonical four-field record shared by the store, importer and
//!   extractor.
//! - Validate identity before a record enters the store.
//!
//! # Invariants
//! - `id` is non-empty after trimming; it is the only identity.
//! - Free-text fields may be empty and are never interpreted.
//!
//! # See also
//! - `crate::store::record_store` for persistence and merge rules.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identity of a record inside the store.
pub type RecordId = String;

/// Column order of the tabular store.
pub const RECORD_COLUMNS: [&str; 4] = ["id", "title", "abstract", "keywords"];

/// Validation errors for record identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// `id` is empty or whitespace only.
    EmptyId,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "record id must not be empty"),
        }
    }
}

impl Error for RecordValidationError {}

/// One bibliographic entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    /// Serialized as `abstract` to match the store header.
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: String,
}

impl Record {
    /// Creates a record with empty free-text fields.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = abstract_text.into();
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    /// Checks identity invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id.trim().is_empty() {
            return Err(RecordValidationError::EmptyId);
        }
        Ok(())
    }

    /// Text unit fed to frequency extraction: abstract then keywords.
    pub fn frequency_text(&self) -> String {
        format!("{} {}", self.abstract_text, self.keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordValidationError};

    #[test]
    fn validate_rejects_blank_id() {
        let record = Record::new("   ");
        assert_eq!(record.validate(), Err(RecordValidationError::EmptyId));
    }

    #[test]
    fn frequency_text_joins_abstract_and_keywords() {
        let record = Record::new("a")
            .with_title("ignored title")
            .with_abstract("deep learning")
            .with_keywords("ai models");
        assert_eq!(record.frequency_text(), "deep learning ai models");
    }
}
