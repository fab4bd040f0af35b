//! Count normalization
//!
//! Pointwise arithmetic over [`ActionCounts`] plus the conventions used to
//! turn raw counts into comparable rates:
//! - per-minute rates from run duration
//! - per-participant rates from the study's sample size
//! - canonical subject and group ids for sorted output

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::AnnotationError;
use crate::types::{ActionCounts, ActionSet, Run};

/// Pointwise sum of two counts over the same label set
pub fn sum_occurrences(
    a: &ActionCounts,
    b: &ActionCounts,
) -> Result<ActionCounts, AnnotationError> {
    if a.set() != b.set() {
        return Err(AnnotationError::LabelSetMismatch {
            left: a.set(),
            right: b.set(),
        });
    }

    let values = a
        .values()
        .iter()
        .zip(b.values())
        .map(|(x, y)| x + y)
        .collect();
    Ok(ActionCounts::from_values(a.set(), values))
}

/// Multiply every count by `scalar`
pub fn scale_occurrences(counts: &ActionCounts, scalar: f64) -> ActionCounts {
    let values = counts.values().iter().map(|v| v * scalar).collect();
    ActionCounts::from_values(counts.set(), values)
}

/// Sum a sequence of counts; an empty sequence yields zeros for `set`
pub fn sum_all<'a, I>(set: ActionSet, counts: I) -> Result<ActionCounts, AnnotationError>
where
    I: IntoIterator<Item = &'a ActionCounts>,
{
    counts
        .into_iter()
        .try_fold(ActionCounts::zeroed(set), |acc, c| sum_occurrences(&acc, c))
}

/// Convert run counts into occurrences per minute
pub fn per_minute(counts: &ActionCounts, run: &Run) -> Result<ActionCounts, AnnotationError> {
    if run.interval.duration_ms() <= 0 {
        return Err(AnnotationError::DegenerateRun {
            name: run.name.clone(),
            start: run.interval.start,
            end: run.interval.end,
        });
    }
    Ok(scale_occurrences(counts, 1.0 / run.duration_minutes()))
}

/// Divide counts by the number of participants they were pooled over
pub fn per_participant(counts: &ActionCounts, sample_size: usize) -> ActionCounts {
    scale_occurrences(counts, 1.0 / sample_size as f64)
}

fn digit_runs() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("valid regex"))
}

/// Display id of a subject tier: the second `_` segment with every digit run
/// padded to two places (`child_p3_a` → `p03`).
pub fn child_display_id(tier: &str) -> Result<String, AnnotationError> {
    let segment = tier
        .split('_')
        .nth(1)
        .ok_or_else(|| AnnotationError::InvalidTierId(tier.to_string()))?;

    Ok(digit_runs()
        .replace_all(segment, |caps: &regex::Captures<'_>| format!("{:0>2}", &caps[0]))
        .into_owned())
}

/// Group id of a session file: its base name up to the first `_`
pub fn group_id(source: &str) -> String {
    let base = Path::new(source)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());

    match base.split_once('_') {
        Some((group, _)) => group.to_string(),
        None => base,
    }
}
