//! Bibliography import.
//!
//! # Responsibility
//! - Parse BibTeX documents (`parser`).
//! - Turn entries into store records and walk source directories (`importer`).

pub mod importer;
pub mod parser;
