//! Run extraction from the reserved `runs` tier

use std::collections::BTreeMap;

use super::EafDocument;
use super::Timeline;
use crate::error::AnnotationError;
use crate::types::Run;

/// Tier holding one annotation per experimental run
pub const RUNS_TIER: &str = "runs";

/// Label prefix marking a run annotation; the rest of the label is its name
pub const RUN_PREFIX: &str = "run ";

/// Runs of one document, ordered by name as strings ("10" sorts before "2")
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTable {
    runs: BTreeMap<String, Run>,
}

impl RunTable {
    /// Insert a run; a run with the same name is replaced
    pub fn insert(&mut self, run: Run) -> Option<Run> {
        self.runs.insert(run.name.clone(), run)
    }

    pub fn get(&self, name: &str) -> Option<&Run> {
        self.runs.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Run> {
        self.runs.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.runs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl EafDocument<'_> {
    /// Collect the `run `-prefixed annotations of the `runs` tier.
    ///
    /// A document without a `runs` tier cannot be aggregated and is rejected.
    pub fn runs(&self, timeline: &Timeline) -> Result<RunTable, AnnotationError> {
        let mut table = RunTable::default();
        for annotation in self.tier_annotations(RUNS_TIER, timeline)? {
            if let Some(name) = annotation.value.strip_prefix(RUN_PREFIX) {
                let run = Run::new(name, annotation.interval.start, annotation.interval.end);
                if table.insert(run).is_some() {
                    tracing::warn!("Duplicate run label {}, keeping the later one", name);
                }
            }
        }

        Ok(table)
    }
}
