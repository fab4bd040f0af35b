//! Subject tier enumeration

use super::{EafDocument, RUNS_TIER, TIER_ID};

/// Tier holding scenario timing, not a subject
pub const SCENARIO_TIME_TIER: &str = "scenario-time";

/// Structural tiers skipped when listing subjects
pub const RESERVED_TIERS: [&str; 2] = [RUNS_TIER, SCENARIO_TIME_TIER];

impl EafDocument<'_> {
    /// Ids of every subject tier, in document order
    pub fn subject_tiers(&self) -> Vec<&str> {
        self.tier_nodes()
            .filter_map(|tier| tier.attribute(TIER_ID))
            .filter(|id| !RESERVED_TIERS.contains(id))
            .collect()
    }
}
