//! Domain layer - pure value objects and the document aggregate.
//!
//! Nothing in this module performs IO; parsing, rendering, merging, and
//! diff application are all synchronous and side-effect free.

mod delta;
mod document;
mod errors;
mod fact;
mod section;

pub use delta::SectionDelta;
pub use document::{is_canonical_section, Document, CANONICAL_SECTIONS};
pub use errors::DocumentError;
pub use fact::{Fact, TABLE_HEADERS};
pub use section::Section;
