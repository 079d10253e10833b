//! Single-pass word-cloud pipeline.
//!
//! # Responsibility
//! - Run import, merge, selection, cache persistence and rendering in order.
//! - Fold every stage outcome into one serializable report.
//!
//! # Invariants
//! - The pipeline never returns an error; failures are report states.
//! - Persistence failures become warnings and never discard the in-memory result.
//! - The cache is written only after a successful fresh extraction from the store.
//! - An unreadable store is a warning, never a silent empty cloud.
//! - Without input data nothing is rendered unless `render_when_empty` is set.
//!
//! # See also
//! - `text::extract::select_frequencies` for the source selection policy.

use crate::bib::importer::{import_directory, DirectoryImport};
use crate::cache::FrequencyCache;
use crate::config::PipelineConfig;
use crate::model::frequency::TermFrequencies;
use crate::render::{render_cloud, RenderMethod, RenderTargets};
use crate::store::record_store::{CsvRecordStore, MergeReport, RecordStore};
use crate::text::extract::{select_frequencies, FrequencySource};
use log::{error, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

/// Overall outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Artifacts written with at least one term.
    Populated,
    /// Artifacts written for an empty mapping.
    EmptyCloud,
    /// Neither cache nor store held data; nothing rendered.
    InputMissing,
    /// No artifact could be produced.
    Failed,
}

/// Bibliography import counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub documents_parsed: usize,
    pub documents_failed: usize,
    pub entries_imported: usize,
    pub entries_skipped: usize,
}

impl From<&DirectoryImport> for ImportSummary {
    fn from(value: &DirectoryImport) -> Self {
        Self {
            documents_parsed: value.documents_parsed,
            documents_failed: value.failed_documents.len(),
            entries_imported: value.records.len(),
            entries_skipped: value.skipped_entries,
        }
    }
}

/// Structured result of [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub status: PipelineStatus,
    pub success: bool,
    pub raster_path: Option<PathBuf>,
    pub vector_path: Option<PathBuf>,
    pub method: RenderMethod,
    pub source: FrequencySource,
    /// Distinct terms in the selected mapping.
    pub term_count: usize,
    /// Sum of all counts in the selected mapping.
    pub total_terms: u64,
    pub import: ImportSummary,
    pub merge: Option<MergeReport>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl PipelineReport {
    fn new() -> Self {
        Self {
            status: PipelineStatus::Failed,
            success: false,
            raster_path: None,
            vector_path: None,
            method: RenderMethod::None,
            source: FrequencySource::None,
            term_count: 0,
            total_terms: 0,
            import: ImportSummary::default(),
            merge: None,
            warnings: Vec::new(),
            error: None,
        }
    }
}

/// Pipeline bound to one configuration and record store.
pub struct Pipeline<S: RecordStore> {
    config: PipelineConfig,
    store: S,
    cache: FrequencyCache,
}

impl Pipeline<CsvRecordStore> {
    /// Pipeline over the CSV store inside `config.data_dir`.
    pub fn from_config(config: PipelineConfig) -> Self {
        let store = CsvRecordStore::new(config.records_path());
        Self::new(config, store)
    }
}

impl<S: RecordStore> Pipeline<S> {
    pub fn new(config: PipelineConfig, store: S) -> Self {
        let cache = FrequencyCache::new(config.frequencies_path());
        Self {
            config,
            store,
            cache,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage once.
    pub fn run(&self) -> PipelineReport {
        let started_at = Instant::now();
        let mut report = PipelineReport::new();

        if let Err(err) = self.config.validate() {
            error!(
                "event=pipeline_run module=pipeline status=error error_code=invalid_config error={}",
                err
            );
            report.error = Some(err.to_string());
            return report;
        }
        info!(
            "event=pipeline_run module=pipeline status=start data_dir={} output_dir={} prefer_cache={}",
            self.config.data_dir.display(),
            self.config.output_dir.display(),
            self.config.prefer_cache
        );

        self.import_and_merge(&mut report);

        let selection = select_frequencies(&self.cache, &self.store, self.config.prefer_cache);
        report.source = selection.source;
        report.term_count = selection.frequencies.len();
        report.total_terms = selection.frequencies.total();
        if let Some(err) = &selection.store_error {
            warn!(
                "event=pipeline_select module=pipeline status=warn error_code=store_unreadable error={}",
                err
            );
            report.warnings.push(format!("record store unreadable: {err}"));
        }

        if selection.is_input_missing() && !self.config.render_when_empty {
            report.status = PipelineStatus::InputMissing;
            report.error = Some("no input data".to_string());
            info!(
                "event=pipeline_run module=pipeline status=skip reason=input_missing duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return report;
        }

        let fresh_extraction =
            selection.source == FrequencySource::RecordStore && selection.store_error.is_none();
        if fresh_extraction {
            self.persist_cache(&selection.frequencies, &mut report);
        }

        self.render(&selection.frequencies, &mut report);

        info!(
            "event=pipeline_run module=pipeline status={} outcome={:?} method={} terms={} warnings={} duration_ms={}",
            if report.success { "ok" } else { "error" },
            report.status,
            report.method.as_str(),
            report.term_count,
            report.warnings.len(),
            started_at.elapsed().as_millis()
        );
        report
    }

    fn import_and_merge(&self, report: &mut PipelineReport) {
        let import = match import_directory(&self.config.data_dir) {
            Ok(import) => import,
            Err(err) => {
                warn!(
                    "event=pipeline_import module=pipeline status=warn error={}",
                    err
                );
                report.warnings.push(format!("bibliography import skipped: {err}"));
                return;
            }
        };

        report.import = ImportSummary::from(&import);
        for failure in &import.failed_documents {
            report.warnings.push(format!(
                "malformed bibliography `{}` skipped: {}",
                failure.path.display(),
                failure.message
            ));
        }
        if import.records.is_empty() {
            return;
        }

        match self.store.merge(&import.records) {
            Ok(merge) => {
                info!(
                    "event=pipeline_merge module=pipeline status=ok added={} skipped_existing={} total={}",
                    merge.added, merge.skipped_existing, merge.total
                );
                report.merge = Some(merge);
            }
            Err(err) => {
                warn!(
                    "event=pipeline_merge module=pipeline status=warn error_code=persistence_failure error={}",
                    err
                );
                report.warnings.push(format!("record store not updated: {err}"));
            }
        }
    }

    fn persist_cache(&self, frequencies: &TermFrequencies, report: &mut PipelineReport) {
        if let Err(err) = self.cache.save(frequencies) {
            warn!(
                "event=pipeline_cache module=pipeline status=warn error_code=persistence_failure error={}",
                err
            );
            report.warnings.push(format!("frequency cache not written: {err}"));
        }
    }

    fn render(&self, frequencies: &TermFrequencies, report: &mut PipelineReport) {
        let targets = RenderTargets {
            raster: self.config.raster_path(),
            vector: self.config.vector_path(),
        };
        let rendered = render_cloud(frequencies, &self.config.render, &targets);

        report.method = rendered.method;
        report.raster_path = rendered.raster_path.clone();
        report.vector_path = rendered.vector_path.clone();
        report.success = rendered.is_success();

        if !rendered.is_success() {
            report.status = PipelineStatus::Failed;
            report.error = rendered.error;
            return;
        }
        if rendered.vector_path.is_none() {
            report
                .warnings
                .push("vector document unavailable".to_string());
        }
        report.status = if frequencies.is_empty() {
            PipelineStatus::EmptyCloud
        } else {
            PipelineStatus::Populated
        };
    }
}

/// Runs the pipeline over the CSV store inside `config.data_dir`.
pub fn run_pipeline(config: &PipelineConfig) -> PipelineReport {
    Pipeline::from_config(config.clone()).run()
}
