//! Action counting
//!
//! Counts the recognized action annotations of one subject tier that fall
//! strictly inside one run.

use crate::eaf::{Annotation, EafDocument, Timeline};
use crate::error::AnnotationError;
use crate::types::{ActionCounts, ActionSet, Interval, Run};

/// Count the actions on `tier` that lie strictly inside `run`.
///
/// Every label of `actions` is present in the result; unrecognized labels are
/// ignored.
pub fn count_actions(
    doc: &EafDocument<'_>,
    tier: &str,
    run: &Run,
    timeline: &Timeline,
    actions: ActionSet,
) -> Result<ActionCounts, AnnotationError> {
    let annotations = doc.tier_annotations(tier, timeline)?;
    Ok(count_within(&annotations, &run.interval, actions))
}

/// Count already-resolved annotations against a run interval
pub fn count_within(annotations: &[Annotation<'_>], run: &Interval, actions: ActionSet) -> ActionCounts {
    let mut counts = ActionCounts::zeroed(actions);

    for annotation in annotations {
        if !annotation.interval.is_strictly_within(run) {
            continue;
        }
        if let Some(action) = actions.recognize(annotation.value) {
            counts.increment(action);
        }
    }

    counts
}
