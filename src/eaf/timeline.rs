//! Time-slot resolution

use std::collections::HashMap;

use super::EafDocument;
use crate::error::AnnotationError;

const TIME_ORDER: &str = "TIME_ORDER";
const TIME_SLOT_ID: &str = "TIME_SLOT_ID";
const TIME_VALUE: &str = "TIME_VALUE";

/// Slot id → millisecond offset for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    slots: HashMap<String, i64>,
}

impl Timeline {
    pub fn from_slots<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            slots: slots.into_iter().map(|(id, ms)| (id.into(), ms)).collect(),
        }
    }

    /// Millisecond value of a slot; undefined slots are fatal for the document
    pub fn resolve(&self, slot_id: &str) -> Result<i64, AnnotationError> {
        self.slots
            .get(slot_id)
            .copied()
            .ok_or_else(|| AnnotationError::UndefinedTimeSlot(slot_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl EafDocument<'_> {
    /// Read every slot of the `TIME_ORDER` section
    pub fn timeline(&self) -> Result<Timeline, AnnotationError> {
        let section = self
            .section(TIME_ORDER)
            .ok_or_else(|| AnnotationError::MissingSection(TIME_ORDER.to_string()))?;

        let mut slots = HashMap::new();
        for slot in section.children().filter(|n| n.is_element()) {
            let id = super::required_attribute(slot, TIME_SLOT_ID)?;
            let raw = super::required_attribute(slot, TIME_VALUE)?;
            let value = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| AnnotationError::InvalidTimeValue {
                    slot: id.to_string(),
                    value: raw.to_string(),
                })?;
            slots.insert(id.to_string(), value);
        }

        Ok(Timeline { slots })
    }
}
