//! SectionDelta value object - proposed changes for one section.

use super::fact::Fact;

/// Additions, updates, and removals proposed for a single section during
/// one update cycle.
///
/// Deltas are ephemeral: an external translator builds them from the LLM
/// response, the updater consumes them, nothing persists them. Facts in
/// `additions` and `updates` may arrive without identifiers; the updater
/// assigns ids before the delta reaches a section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionDelta {
    pub additions: Vec<Fact>,
    pub updates: Vec<Fact>,
    pub removals: Vec<String>,
}

impl SectionDelta {
    /// Creates a delta from its three change lists.
    pub fn new(additions: Vec<Fact>, updates: Vec<Fact>, removals: Vec<String>) -> Self {
        Self {
            additions,
            updates,
            removals,
        }
    }

    /// Creates an empty delta.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true when the delta proposes no changes at all.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.updates.is_empty() && self.removals.is_empty()
    }
}
