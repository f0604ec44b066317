//! Clock port - injected source of the current date.
//!
//! The updater stamps `first_seen`/`last_seen` and the frontmatter
//! `last_updated` key from this trait instead of reading wall-clock time
//! directly, which keeps the workflow deterministic under test.

use chrono::NaiveDate;

/// Source of "today" for date stamping.
pub trait Clock: Send + Sync {
    /// Returns the current calendar date.
    fn today(&self) -> NaiveDate;
}
