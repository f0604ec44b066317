//! Routing configuration.
//!
//! A static table deciding which section a fact's category belongs to,
//! plus the default section for anything unmapped. The table is supplied
//! at construction (or deserialized from whatever format the embedding
//! application uses) and stays immutable for the life of a run.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::CANONICAL_SECTIONS;

/// Category-to-section routing rules.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RoutingConfig {
    /// Maps a fact category string to a canonical section name.
    pub category_to_section: HashMap<String, String>,

    /// Section receiving facts whose category has no mapping.
    pub default_section: String,
}

impl RoutingConfig {
    /// Creates a routing config from an explicit table and default.
    pub fn new(category_to_section: HashMap<String, String>, default_section: impl Into<String>) -> Self {
        Self {
            category_to_section,
            default_section: default_section.into(),
        }
    }

    /// Returns the mapped section for a category, if any.
    pub fn section_for(&self, category: &str) -> Option<&str> {
        self.category_to_section
            .get(category)
            .map(String::as_str)
            .filter(|section| !section.is_empty())
    }

    /// Checks structural invariants: the default section must be set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_section.trim().is_empty() {
            return Err(ConfigError::MissingDefaultSection);
        }
        Ok(())
    }
}

impl Default for RoutingConfig {
    /// Routes the stock categories onto the canonical sections, with the
    /// first canonical section as the default.
    fn default() -> Self {
        let table = [
            ("health", CANONICAL_SECTIONS[0]),
            ("habit", CANONICAL_SECTIONS[0]),
            ("work", CANONICAL_SECTIONS[1]),
            ("productivity", CANONICAL_SECTIONS[1]),
            ("relationship", CANONICAL_SECTIONS[2]),
            ("hobby", CANONICAL_SECTIONS[3]),
            ("project", CANONICAL_SECTIONS[4]),
            ("finance", CANONICAL_SECTIONS[5]),
            ("tooling", CANONICAL_SECTIONS[6]),
            ("travel", CANONICAL_SECTIONS[7]),
        ];
        Self::new(
            table
                .into_iter()
                .map(|(category, section)| (category.to_string(), section.to_string()))
                .collect(),
            CANONICAL_SECTIONS[0],
        )
    }
}

/// Errors raised while validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Routing configuration has no default section")]
    MissingDefaultSection,
}
