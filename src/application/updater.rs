//! Ledger update orchestration.
//!
//! One linear workflow per consolidation run: load the document, resolve
//! where each proposed delta really belongs, assign identifiers and date
//! stamps, apply the merged deltas, refresh frontmatter bookkeeping, and
//! persist the rendered result. Everything up to the final save is pure;
//! a failure anywhere aborts the run with nothing written.

use std::collections::{BTreeMap, HashMap, HashSet};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RoutingConfig;
use crate::domain::{is_canonical_section, Document, DocumentError, Fact, SectionDelta};
use crate::ports::{Clock, DocumentStore, StoreError};

/// Frontmatter marker identifying the document as a consolidated ledger.
const CONSOLIDATION_TYPE: &str = "persistent";

/// Frontmatter tags ensured on every ledger document.
const DEFAULT_TAGS: [&str; 2] = ["ai_memory", "persistent_facts"];

/// Fallback id slug for facts whose category yields no usable characters.
const FALLBACK_SLUG: &str = "fact";

/// Errors surfaced by the update workflow.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),
}

/// Per-section change counts for one update run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionCounts {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Result of one update run: the persisted document plus an audit summary
/// keyed by resolved section name.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub document: Document,
    pub summary: BTreeMap<String, SectionCounts>,
}

/// Orchestration service merging LLM-proposed deltas into the ledger.
#[derive(Debug, Clone)]
pub struct LedgerUpdater<S, C> {
    store: S,
    routing: RoutingConfig,
    clock: C,
}

impl<S: DocumentStore, C: Clock> LedgerUpdater<S, C> {
    /// Creates an updater over a store, routing rules, and a clock.
    pub fn new(store: S, routing: RoutingConfig, clock: C) -> Self {
        Self {
            store,
            routing,
            clock,
        }
    }

    /// Runs one consolidation cycle.
    ///
    /// `deltas` pairs a proposed section name with the changes filed
    /// under it; the proposal order decides where brand-new residual
    /// sections end up in the document. Facts may arrive without
    /// identifiers; deterministic ids are assigned here. The document is
    /// saved only after every delta applied cleanly.
    pub async fn update(
        &self,
        deltas: Vec<(String, SectionDelta)>,
    ) -> Result<UpdateOutcome, UpdateError> {
        let raw = self.store.load().await?;
        let document = if raw.trim().is_empty() {
            Document::empty()
        } else {
            Document::parse(&raw)?
        };
        let today = self.clock.today();

        let fact_section_index: HashMap<String, String> = document
            .sections
            .iter()
            .flat_map(|section| {
                section
                    .facts
                    .iter()
                    .filter(|fact| !fact.id.is_empty())
                    .map(|fact| (fact.id.clone(), section.name.clone()))
            })
            .collect();
        let mut existing_ids: HashSet<String> = fact_section_index.keys().cloned().collect();

        // Aggregate by resolved target; deltas proposed under different
        // names can land in the same section.
        let mut order: Vec<String> = Vec::new();
        let mut aggregated: HashMap<String, SectionDelta> = HashMap::new();
        for (proposed_name, delta) in &deltas {
            let target = self.resolve_section_name(proposed_name, delta, &fact_section_index);
            debug!(proposed = %proposed_name, resolved = %target, "resolved delta target");

            let entry = aggregated.entry(target.clone()).or_default();
            if !order.contains(&target) {
                order.push(target);
            }

            for fact in &delta.additions {
                let identified = self.identify(fact, &mut existing_ids);
                entry.additions.push(identified.with_stamped_dates(today, true));
            }
            for fact in &delta.updates {
                let identified = self.identify(fact, &mut existing_ids);
                entry.updates.push(identified.with_stamped_dates(today, false));
            }
            for removal_id in &delta.removals {
                if !entry.removals.contains(removal_id) {
                    entry.removals.push(removal_id.clone());
                }
            }
        }

        let processed: Vec<(String, SectionDelta)> = order
            .into_iter()
            .map(|name| {
                let delta = aggregated.remove(&name).unwrap_or_default();
                (name, delta)
            })
            .collect();

        let summary: BTreeMap<String, SectionCounts> = processed
            .iter()
            .map(|(name, delta)| {
                (
                    name.clone(),
                    SectionCounts {
                        added: delta.additions.len(),
                        updated: delta.updates.len(),
                        removed: delta.removals.len(),
                    },
                )
            })
            .collect();

        let updated = document.apply_changes(&processed)?;
        let final_document = Document::new(
            stamp_frontmatter(updated.frontmatter.clone(), today),
            updated.sections,
        );

        self.store.save(&final_document.render()?).await?;
        info!(sections = summary.len(), "ledger updated");

        Ok(UpdateOutcome {
            document: final_document,
            summary,
        })
    }

    /// Resolves the true target section for a delta.
    ///
    /// Priority: canonical proposed name, then the current home of any
    /// id-bearing update or removal, then category routing, then the
    /// configured default.
    fn resolve_section_name(
        &self,
        proposed_name: &str,
        delta: &SectionDelta,
        fact_section_index: &HashMap<String, String>,
    ) -> String {
        let normalized = proposed_name.trim();
        if is_canonical_section(normalized) {
            return normalized.to_string();
        }

        for fact in &delta.updates {
            if let Some(section) = fact_section_index.get(&fact.id) {
                return section.clone();
            }
        }
        for removal_id in &delta.removals {
            if let Some(section) = fact_section_index.get(removal_id) {
                return section.clone();
            }
        }

        for fact in delta.additions.iter().chain(delta.updates.iter()) {
            if let Some(section) = self.routing.section_for(&fact.category) {
                return section.to_string();
            }
        }

        self.routing.default_section.clone()
    }

    /// Returns the fact with an identifier, generating one when missing,
    /// and records it as existing to avoid intra-batch collisions.
    fn identify(&self, fact: &Fact, existing_ids: &mut HashSet<String>) -> Fact {
        let id = if fact.id.is_empty() {
            generate_fact_id(fact, existing_ids)
        } else {
            fact.id.clone()
        };
        existing_ids.insert(id.clone());
        fact.with_id(id)
    }
}

/// Derives a deterministic identifier from a fact's category and
/// statement: a category slug plus the first 8 hex chars of a content
/// hash, with `-1`, `-2`, … suffixes on collision.
fn generate_fact_id(fact: &Fact, existing: &HashSet<String>) -> String {
    let source = format!("{}|{}", fact.category, fact.statement).to_lowercase();
    let digest = Sha256::digest(source.trim().as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();

    let base = format!("{}-{}", slugify(&fact.category), &hex[..8]);
    if !existing.contains(&base) {
        return base;
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Lowercases and collapses non-alphanumeric runs to single dashes.
fn slugify(category: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in category.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Applies the per-run frontmatter bookkeeping: the consolidation marker
/// and default tags when absent, and today's date always.
fn stamp_frontmatter(
    mut frontmatter: serde_yaml::Mapping,
    today: chrono::NaiveDate,
) -> serde_yaml::Mapping {
    use serde_yaml::Value;

    let type_key = Value::String("consolidation_type".to_string());
    if !frontmatter.contains_key(&type_key) {
        frontmatter.insert(type_key, Value::String(CONSOLIDATION_TYPE.to_string()));
    }

    frontmatter.insert(
        Value::String("last_updated".to_string()),
        Value::String(today.format("%Y-%m-%d").to_string()),
    );

    let tags_key = Value::String("tags".to_string());
    if !frontmatter.contains_key(&tags_key) {
        frontmatter.insert(
            tags_key,
            Value::Sequence(
                DEFAULT_TAGS
                    .iter()
                    .map(|tag| Value::String(tag.to_string()))
                    .collect(),
            ),
        );
    }

    frontmatter
}
