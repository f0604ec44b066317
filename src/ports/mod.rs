//! Ports - trait interfaces the application core depends on.
//!
//! Adapters implement these; the domain and application layers only ever
//! see the traits.

mod clock;
mod document_store;

pub use clock::Clock;
pub use document_store::{DocumentStore, StoreError};
