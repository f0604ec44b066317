//! fact-ledger - a Markdown-backed long-term fact ledger.
//!
//! The ledger is a single human-readable document: YAML frontmatter
//! followed by per-topic sections, each holding a nine-column fact table.
//! An LLM-driven extraction step proposes per-section deltas; the
//! [`application::LedgerUpdater`] merges them deterministically and
//! re-renders the document round-trip stably.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
