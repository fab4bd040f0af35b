//! Error types for ELAN action aggregation

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ActionSet;

/// Errors that can occur while reading annotations or aggregating counts
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Missing required section: {0}")]
    MissingSection(String),

    #[error("Missing <{child}> inside <{parent}>")]
    MissingElement { parent: String, child: String },

    #[error("Missing attribute {attribute} on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    #[error("Invalid time value for slot {slot}: {value}")]
    InvalidTimeValue { slot: String, value: String },

    #[error("Undefined time slot: {0}")]
    UndefinedTimeSlot(String),

    #[error("Tier not found: {0}")]
    MissingTier(String),

    #[error("Tier id has no subject segment: {0}")]
    InvalidTierId(String),

    #[error("Run {name} has a non-positive duration ({start}..{end} ms)")]
    DegenerateRun { name: String, start: i64, end: i64 },

    #[error("Action label sets differ: {left:?} vs {right:?}")]
    LabelSetMismatch { left: ActionSet, right: ActionSet },

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
