//! Application layer - the update orchestration service.

mod updater;

pub use updater::{LedgerUpdater, SectionCounts, UpdateError, UpdateOutcome};
