//! Aggregation configuration
//!
//! Chosen once before any file is processed and passed explicitly to every
//! stage. Nothing in the pipeline reads global state.

use serde::{Deserialize, Serialize};

use crate::types::ActionSet;

/// Number of children recorded together in one session file
pub const CHILDREN_PER_PAIR: usize = 2;

/// How counts are grouped into emitted tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// One table over all runs of all files
    #[default]
    Runs,
    /// One table per subject tier
    PerChild,
    /// One table per session file (a pair of children)
    PerPair,
}

impl Grouping {
    /// Number of participants each emitted run table is divided by
    pub fn sample_size(&self, files: usize) -> usize {
        match self {
            Grouping::Runs => files * CHILDREN_PER_PAIR,
            Grouping::PerChild => 1,
            Grouping::PerPair => CHILDREN_PER_PAIR,
        }
    }
}

/// How counts are scaled before emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Per-run counts divided by run minutes, then by sample size
    PerMinute,
    /// Raw per-subject or per-group totals
    Sum,
}

/// Settings for one aggregation invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Base name of the combined dataset
    pub name: String,
    /// Recognized action labels
    pub actions: ActionSet,
    pub grouping: Grouping,
    /// Emit only per-subject/per-group totals (needs per-child or per-pair)
    pub sum_only: bool,
    /// Fixed y-axis upper bound for the plots
    pub y_max: Option<u32>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            actions: ActionSet::default(),
            grouping: Grouping::default(),
            sum_only: false,
            y_max: None,
        }
    }
}

impl AggregationConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_actions(mut self, actions: ActionSet) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_sum_only(mut self, sum_only: bool) -> Self {
        self.sum_only = sum_only;
        self
    }

    pub fn with_y_max(mut self, y_max: Option<u32>) -> Self {
        self.y_max = y_max;
        self
    }

    /// Sum mode only applies together with a per-child or per-pair grouping
    pub fn normalization(&self) -> Normalization {
        if self.sum_only && self.grouping != Grouping::Runs {
            Normalization::Sum
        } else {
            Normalization::PerMinute
        }
    }
}
