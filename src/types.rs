//! Core types for the action aggregation pipeline
//!
//! This module defines the values that flow between stages: action labels and
//! the label sets that select them, per-run intervals, and the per-action
//! occurrence counts that get summed, scaled and emitted.

use serde::{Deserialize, Serialize};

/// Milliseconds in one minute, used for per-minute rates
pub const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// A labeled behavioral category coded on subject tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Show,
    Talk,
    Call,
    Put,
    Rem,
    Touch,
    Mis,
    Ges,
    Exp,
    Look,
    Play,
}

impl Action {
    /// Annotation text used for this action in the .eaf files
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Show => "show",
            Action::Talk => "talk",
            Action::Call => "call",
            Action::Put => "put",
            Action::Rem => "rem",
            Action::Touch => "touch",
            Action::Mis => "mis",
            Action::Ges => "ges",
            Action::Exp => "exp",
            Action::Look => "look",
            Action::Play => "play",
        }
    }

    /// Exact (case-sensitive, untrimmed) match against an annotation value
    pub fn from_label(label: &str) -> Option<Self> {
        let action = match label {
            "show" => Action::Show,
            "talk" => Action::Talk,
            "call" => Action::Call,
            "put" => Action::Put,
            "rem" => Action::Rem,
            "touch" => Action::Touch,
            "mis" => Action::Mis,
            "ges" => Action::Ges,
            "exp" => Action::Exp,
            "look" => Action::Look,
            "play" => Action::Play,
            _ => return None,
        };
        Some(action)
    }

    /// Histogram colour for this action
    pub fn color(&self) -> &'static str {
        match self {
            Action::Mis => "#6bff62",
            Action::Ges => "#dfe934",
            Action::Call => "#c5008d",
            Action::Touch => "#32782e",
            Action::Rem => "#20b9ff",
            Action::Put => "#4852e3",
            Action::Exp => "#f9e0a2",
            Action::Talk => "#c50e00",
            Action::Look => "#f25329",
            Action::Show => "#0f5778",
            Action::Play => "#45170c",
        }
    }
}

const ALL_ACTIONS: [Action; 11] = [
    Action::Show,
    Action::Talk,
    Action::Call,
    Action::Put,
    Action::Rem,
    Action::Touch,
    Action::Mis,
    Action::Ges,
    Action::Exp,
    Action::Look,
    Action::Play,
];

const ENGAGEMENT_ACTIONS: [Action; 7] = [
    Action::Show,
    Action::Talk,
    Action::Touch,
    Action::Mis,
    Action::Ges,
    Action::Look,
    Action::Play,
];

/// The recognized labels for one invocation, in stacking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionSet {
    /// Every coded action
    Full,
    /// Only the actions relevant to engagement
    #[default]
    Engagement,
}

impl ActionSet {
    pub fn actions(&self) -> &'static [Action] {
        match self {
            ActionSet::Full => &ALL_ACTIONS,
            ActionSet::Engagement => &ENGAGEMENT_ACTIONS,
        }
    }

    pub fn len(&self) -> usize {
        self.actions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions().is_empty()
    }

    /// Column index of an action, or `None` if the set does not track it
    pub fn position(&self, action: Action) -> Option<usize> {
        self.actions().iter().position(|a| *a == action)
    }

    /// Resolve an annotation value to a tracked action
    pub fn recognize(&self, label: &str) -> Option<Action> {
        Action::from_label(label).filter(|action| self.position(*action).is_some())
    }
}

/// Occurrence counts for every action of one [`ActionSet`]
///
/// All tracked actions are always present; counts start at zero. Values are
/// whole numbers while counting and become rates once scaled.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCounts {
    set: ActionSet,
    values: Vec<f64>,
}

impl ActionCounts {
    /// All-zero counts for the given label set
    pub fn zeroed(set: ActionSet) -> Self {
        Self {
            set,
            values: vec![0.0; set.len()],
        }
    }

    /// Build counts from `(action, value)` pairs; untracked actions are dropped
    pub fn from_pairs(set: ActionSet, pairs: &[(Action, f64)]) -> Self {
        let mut counts = Self::zeroed(set);
        for (action, value) in pairs {
            if let Some(idx) = set.position(*action) {
                counts.values[idx] = *value;
            }
        }
        counts
    }

    pub fn set(&self) -> ActionSet {
        self.set
    }

    /// Count for an action, `None` when the label set does not track it
    pub fn get(&self, action: Action) -> Option<f64> {
        self.set.position(action).map(|idx| self.values[idx])
    }

    /// Add one occurrence. Returns false for actions outside the set.
    pub fn increment(&mut self, action: Action) -> bool {
        match self.set.position(action) {
            Some(idx) => {
                self.values[idx] += 1.0;
                true
            }
            None => false,
        }
    }

    /// Counts in column order
    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        self.set
            .actions()
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Sum over all actions
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub(crate) fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn from_values(set: ActionSet, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), set.len());
        Self { set, values }
    }
}

/// A `[start, end)` span on the recording timeline, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Strict interior containment: touching either bound does not count
    pub fn is_strictly_within(&self, outer: &Interval) -> bool {
        self.start > outer.start && self.end < outer.end
    }

    pub fn duration_ms(&self) -> i64 {
        self.end - self.start
    }
}

/// One experimental trial, named by its label with the `run ` prefix removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub name: String,
    pub interval: Interval,
}

impl Run {
    pub fn new(name: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            name: name.into(),
            interval: Interval::new(start, end),
        }
    }

    /// Run length in minutes
    pub fn duration_minutes(&self) -> f64 {
        self.interval.duration_ms() as f64 / MILLIS_PER_MINUTE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_is_subset_of_full() {
        for action in ActionSet::Engagement.actions() {
            assert!(ActionSet::Full.position(*action).is_some());
        }
        assert_eq!(ActionSet::Full.len(), 11);
        assert_eq!(ActionSet::Engagement.len(), 7);
    }

    #[test]
    fn test_label_roundtrip_is_exact() {
        for action in ActionSet::Full.actions() {
            assert_eq!(Action::from_label(action.as_str()), Some(*action));
        }
        assert_eq!(Action::from_label("Talk"), None);
        assert_eq!(Action::from_label(" talk"), None);
    }

    #[test]
    fn test_recognize_respects_active_set() {
        assert_eq!(ActionSet::Full.recognize("call"), Some(Action::Call));
        assert_eq!(ActionSet::Engagement.recognize("call"), None);
        assert_eq!(ActionSet::Engagement.recognize("look"), Some(Action::Look));
    }

    #[test]
    fn test_zeroed_counts_have_every_key() {
        let counts = ActionCounts::zeroed(ActionSet::Engagement);
        assert_eq!(counts.iter().count(), 7);
        assert!(counts.iter().all(|(_, v)| v == 0.0));
        assert_eq!(counts.get(Action::Exp), None);
    }

    #[test]
    fn test_increment_ignores_untracked_action() {
        let mut counts = ActionCounts::zeroed(ActionSet::Engagement);
        assert!(counts.increment(Action::Talk));
        assert!(!counts.increment(Action::Put));
        assert_eq!(counts.get(Action::Talk), Some(1.0));
        assert_eq!(counts.total(), 1.0);
    }

    #[test]
    fn test_strict_containment() {
        let run = Interval::new(1000, 61000);
        assert!(Interval::new(2000, 3000).is_strictly_within(&run));
        assert!(!Interval::new(1000, 3000).is_strictly_within(&run));
        assert!(!Interval::new(2000, 61000).is_strictly_within(&run));
        assert!(!Interval::new(1000, 1000).is_strictly_within(&run));
    }

    #[test]
    fn test_run_duration_minutes() {
        let run = Run::new("5", 1000, 61000);
        assert!((run.duration_minutes() - 1.0).abs() < 1e-12);
    }
}
