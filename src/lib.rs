//! ELAN Actions - per-run action statistics from ELAN annotation files
//!
//! Reads child-interaction recordings coded in ELAN (.eaf), counts the coded
//! actions of every subject tier inside each experimental run, and writes
//! gnuplot-ready datasets through a deterministic pipeline: document parsing →
//! run and tier resolution → action counting → normalization → encoding.
//!
//! ## Groupings
//!
//! - **Runs**: one table over every run of every file, rates per minute and per child
//! - **Per child**: one table per subject tier, or a single table of totals
//! - **Per pair**: one table per session file, or a single table of totals

pub mod config;
pub mod counter;
pub mod eaf;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod sinks;
pub mod types;

pub use config::{AggregationConfig, Grouping, Normalization};
pub use error::AnnotationError;
pub use pipeline::{process_files, ActionAggregator, AggregationSummary};
pub use sinks::{DatasetSink, DirectorySink, MemorySink};
pub use types::{Action, ActionCounts, ActionSet};

/// Crate version reported in run summaries
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported in run summaries
pub const PRODUCER_NAME: &str = "elan-actions";
