//! Core pipeline for bibcloud.
//! Turns bibliographic records into term frequencies and a rendered word cloud.

pub mod bib;
pub mod cache;
pub mod config;
pub mod intake;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod text;

pub use bib::importer::{import_directory, import_file, DirectoryImport, ImportError};
pub use bib::parser::{parse_bibtex, BibDocument, BibEntry, BibParseError};
pub use cache::{CacheError, CacheSnapshot, FrequencyCache};
pub use config::{ConfigError, PipelineConfig, RenderSettings};
pub use intake::{
    count_records, stage_bibliography, stage_data_file, RecordTotal, RecordTotalSource,
    StagedFile, StagingError,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::frequency::TermFrequencies;
pub use model::record::{Record, RecordId, RecordValidationError};
pub use pipeline::{run_pipeline, Pipeline, PipelineReport, PipelineStatus};
pub use render::{render_cloud, RenderError, RenderMethod, RenderReport, RenderTargets};
pub use store::record_store::{
    merge_records, CsvRecordStore, MergeReport, RecordStore, StoreError, StoreResult,
};
pub use text::extract::{extract_frequencies, select_frequencies, FrequencySource};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
