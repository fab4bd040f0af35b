//! Pipeline orchestration
//!
//! This module provides the public API for aggregating ELAN files.
//! It drives each document through the stages and hands finished datasets to
//! a sink as soon as their grouping is complete.
//!
//! Pipeline stages, per file:
//! 1. EafDocument - Parse the XML
//! 2. Timeline / RunTable - Resolve time slots and runs
//! 3. count_within - Count actions per subject tier and run
//! 4. Normalizer - Per-minute rates (unless summing)
//! 5. DatasetEncoder - Render tables and plot scripts

use std::collections::BTreeMap;
use std::fs;
use std::mem;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::config::{AggregationConfig, Grouping, Normalization};
use crate::counter::count_within;
use crate::eaf::EafDocument;
use crate::encoder::{DatasetEncoder, DatasetKind, EncodedDataset};
use crate::error::AnnotationError;
use crate::normalizer::{
    child_display_id, group_id, per_minute, per_participant, sum_all, sum_occurrences,
};
use crate::sinks::DatasetSink;
use crate::types::ActionCounts;
use crate::{PRODUCER_NAME, VERSION};

/// Aggregate a batch of .eaf files and write every dataset to `sink`.
///
/// # Example
/// ```ignore
/// let config = AggregationConfig::new("study").with_grouping(Grouping::PerChild);
/// let summary = process_files(&config, &["g1_session.eaf"], &mut DirectorySink::new("out"))?;
/// ```
pub fn process_files<P: AsRef<Path>>(
    config: &AggregationConfig,
    files: &[P],
    sink: &mut dyn DatasetSink,
) -> Result<AggregationSummary, AnnotationError> {
    let mut aggregator = ActionAggregator::new(config.clone());
    for file in files {
        aggregator.process_file(file.as_ref(), sink)?;
    }
    aggregator.finish(sink)
}

/// A dataset handed to the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedDataset {
    pub name: String,
    pub kind: DatasetKind,
    pub rows: usize,
    pub sample_size: Option<usize>,
}

impl From<&EncodedDataset> for EmittedDataset {
    fn from(dataset: &EncodedDataset) -> Self {
        Self {
            name: dataset.name.clone(),
            kind: dataset.kind,
            rows: dataset.rows,
            sample_size: dataset.sample_size,
        }
    }
}

/// Report of one aggregation invocation
#[derive(Debug, Clone, Serialize)]
pub struct AggregationSummary {
    pub producer: String,
    pub version: String,
    pub computed_at_utc: String,
    pub config: AggregationConfig,
    pub normalization: Normalization,
    pub files_processed: usize,
    /// Raw action occurrences counted, before any scaling
    pub total_interactions: u64,
    pub datasets: Vec<EmittedDataset>,
}

/// Stateful aggregator for feeding files one at a time.
///
/// Use this when files arrive incrementally or come from memory. After an
/// error the aggregator holds a partial file and should be discarded.
pub struct ActionAggregator {
    config: AggregationConfig,
    normalization: Normalization,
    encoder: DatasetEncoder,
    /// Per-run counts of the grouping currently being built
    run_totals: BTreeMap<String, ActionCounts>,
    /// Per-subject or per-group totals, keyed by display id
    subject_totals: BTreeMap<String, ActionCounts>,
    /// Raw occurrences of the grouping currently being built
    group_interactions: u64,
    total_interactions: u64,
    files_processed: usize,
    emitted: Vec<EmittedDataset>,
}

impl ActionAggregator {
    pub fn new(config: AggregationConfig) -> Self {
        let normalization = config.normalization();
        if config.sum_only && normalization != Normalization::Sum {
            tracing::warn!("Sum mode needs per-child or per-pair grouping; emitting per-run rates");
        }

        Self {
            encoder: DatasetEncoder::from_config(&config),
            config,
            normalization,
            run_totals: BTreeMap::new(),
            subject_totals: BTreeMap::new(),
            group_interactions: 0,
            total_interactions: 0,
            files_processed: 0,
            emitted: Vec::new(),
        }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Per-run counts accumulated so far for the open grouping
    pub fn run_totals(&self) -> &BTreeMap<String, ActionCounts> {
        &self.run_totals
    }

    /// Closed per-subject or per-group totals
    pub fn subject_totals(&self) -> &BTreeMap<String, ActionCounts> {
        &self.subject_totals
    }

    pub fn files_processed(&self) -> usize {
        self.files_processed
    }

    /// Read and aggregate one .eaf file
    pub fn process_file(
        &mut self,
        path: &Path,
        sink: &mut dyn DatasetSink,
    ) -> Result<(), AnnotationError> {
        let xml = fs::read_to_string(path).map_err(|source| AnnotationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.process_document(&path.to_string_lossy(), &xml, sink)
    }

    /// Aggregate one document. `source` is its file path; per-pair grouping
    /// takes the group id from its base name.
    pub fn process_document(
        &mut self,
        source: &str,
        xml: &str,
        sink: &mut dyn DatasetSink,
    ) -> Result<(), AnnotationError> {
        tracing::info!("Processing file {}...", source);

        let doc = EafDocument::parse(xml)?;
        let timeline = doc.timeline()?;
        let runs = doc.runs(&timeline)?;

        for tier in doc.subject_tiers() {
            tracing::info!("Processing subject {}...", tier);
            let annotations = doc.tier_annotations(tier, &timeline)?;

            for run in runs.iter() {
                tracing::debug!("Run {} lasted {:.2}min", run.name, run.duration_minutes());

                let mut counts = count_within(&annotations, &run.interval, self.config.actions);
                self.group_interactions += counts.total() as u64;

                if self.normalization == Normalization::PerMinute {
                    counts = per_minute(&counts, run)?;
                }
                self.merge_run(&run.name, counts)?;
            }

            if self.config.grouping == Grouping::PerChild {
                let id = child_display_id(tier)?;
                tracing::info!("Total interactions for {}: {}", tier, self.group_interactions);
                self.close_group(id, sink)?;
            }
        }

        if self.config.grouping == Grouping::PerPair {
            tracing::info!("Total interactions for this group: {}", self.group_interactions);
            self.close_group(group_id(source), sink)?;
        }

        self.files_processed += 1;
        Ok(())
    }

    /// Emit the combined dataset, if the grouping calls for one, and report
    pub fn finish(
        mut self,
        sink: &mut dyn DatasetSink,
    ) -> Result<AggregationSummary, AnnotationError> {
        match (self.normalization, self.config.grouping) {
            (Normalization::Sum, _) => {
                let dataset = self
                    .encoder
                    .encode_subjects(&self.config.name, &self.subject_totals);
                self.emit(&dataset, sink)?;
            }
            (Normalization::PerMinute, Grouping::Runs) => {
                tracing::info!("Total interactions: {}", self.group_interactions);
                self.close_interactions();
                let runs = mem::take(&mut self.run_totals);
                let sample_size = self.config.grouping.sample_size(self.files_processed);
                let name = self.config.name.clone();
                self.emit_runs(&name, &runs, sample_size, sink)?;
            }
            (Normalization::PerMinute, _) => {}
        }

        Ok(AggregationSummary {
            producer: PRODUCER_NAME.to_string(),
            version: VERSION.to_string(),
            computed_at_utc: Utc::now().to_rfc3339(),
            normalization: self.normalization,
            config: self.config,
            files_processed: self.files_processed,
            total_interactions: self.total_interactions,
            datasets: self.emitted,
        })
    }

    fn merge_run(&mut self, run: &str, counts: ActionCounts) -> Result<(), AnnotationError> {
        match self.run_totals.get_mut(run) {
            Some(total) => *total = sum_occurrences(total, &counts)?,
            None => {
                self.run_totals.insert(run.to_string(), counts);
            }
        }
        Ok(())
    }

    fn close_interactions(&mut self) {
        self.total_interactions += mem::take(&mut self.group_interactions);
    }

    /// Fold the open per-run counts into one subject/group total and start afresh
    fn close_group(
        &mut self,
        id: String,
        sink: &mut dyn DatasetSink,
    ) -> Result<(), AnnotationError> {
        self.close_interactions();
        let runs = mem::take(&mut self.run_totals);

        let total = sum_all(self.config.actions, runs.values())?;
        if self.subject_totals.insert(id.clone(), total).is_some() {
            tracing::warn!("Duplicate subject id {}, keeping the later totals", id);
        }

        if self.normalization == Normalization::PerMinute {
            let sample_size = self.config.grouping.sample_size(1);
            self.emit_runs(&id, &runs, sample_size, sink)?;
        }
        Ok(())
    }

    fn emit_runs(
        &mut self,
        name: &str,
        runs: &BTreeMap<String, ActionCounts>,
        sample_size: usize,
        sink: &mut dyn DatasetSink,
    ) -> Result<(), AnnotationError> {
        tracing::info!("Normalizing data for {} participants", sample_size);
        let rows: BTreeMap<String, ActionCounts> = runs
            .iter()
            .map(|(run, counts)| (run.clone(), per_participant(counts, sample_size)))
            .collect();

        let dataset = self.encoder.encode_runs(name, &rows, sample_size);
        self.emit(&dataset, sink)
    }

    fn emit(
        &mut self,
        dataset: &EncodedDataset,
        sink: &mut dyn DatasetSink,
    ) -> Result<(), AnnotationError> {
        sink.write_dataset(dataset)?;
        self.emitted.push(EmittedDataset::from(dataset));
        Ok(())
    }
}
