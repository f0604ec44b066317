//! Adapters - concrete implementations of the ports.

mod in_memory_store;
mod local_file_store;
mod system_clock;

pub use in_memory_store::InMemoryStore;
pub use local_file_store::LocalFileStore;
pub use system_clock::{FixedClock, SystemClock};
