//! Section - a named, ordered group of facts sharing a topic.
//!
//! Owns the Markdown table parse/render for its fact rows and the diff
//! application that merges a [`SectionDelta`](super::delta::SectionDelta)
//! into the current fact set.

use std::collections::HashMap;

use super::errors::DocumentError;
use super::fact::{Fact, TABLE_HEADERS};

/// Ordered collection of facts scoped to one topic.
///
/// Within a section, fact identifiers are unique and order is
/// insertion/update order, never sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub facts: Vec<Fact>,
}

impl Section {
    /// Creates a section from a name and facts.
    pub fn new(name: impl Into<String>, facts: Vec<Fact>) -> Self {
        Self {
            name: name.into(),
            facts,
        }
    }

    /// Creates an empty section.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Parses a section body into structured facts.
    ///
    /// An empty (or whitespace-only) body yields an empty section. Any
    /// other body must hold a header row matching the nine fixed columns,
    /// a structurally valid separator row, and zero or more nine-cell data
    /// rows. Blank lines between rows are tolerated; trailing wholly-blank
    /// cells added by table formatters are trimmed before validation.
    pub fn parse(name: impl Into<String>, body: &str) -> Result<Self, DocumentError> {
        let name = name.into();
        let lines: Vec<&str> = body.lines().filter(|line| !line.trim().is_empty()).collect();
        if lines.is_empty() {
            return Ok(Self::empty(name));
        }
        if lines.len() < 2 {
            return Err(DocumentError::missing_table_structure(&name));
        }

        let header_cells = trim_trailing_cells(
            split_row(lines[0], &name)?,
            TABLE_HEADERS.len(),
            |cell| cell.is_empty(),
        );
        if header_cells.len() != TABLE_HEADERS.len()
            || header_cells
                .iter()
                .zip(TABLE_HEADERS.iter())
                .any(|(cell, expected)| cell != expected)
        {
            return Err(DocumentError::unexpected_headers(&name));
        }

        let separator_cells = trim_trailing_cells(
            split_row(lines[1], &name)?,
            TABLE_HEADERS.len(),
            |cell| is_separator_cell(cell),
        );
        if separator_cells.len() != TABLE_HEADERS.len()
            || separator_cells.iter().any(|cell| !is_separator_cell(cell))
        {
            return Err(DocumentError::malformed_separator(&name));
        }

        let mut facts = Vec::new();
        for line in &lines[2..] {
            let cells = trim_trailing_cells(split_row(line, &name)?, TABLE_HEADERS.len(), |cell| {
                cell.is_empty()
            });
            if cells.len() != TABLE_HEADERS.len() {
                return Err(DocumentError::wrong_column_count(&name));
            }
            facts.push(Fact::from_table_row(&cells)?);
        }

        Ok(Self::new(name, facts))
    }

    /// Renders the section as a Markdown table, header and separator
    /// included.
    pub fn render(&self) -> String {
        let mut rows = vec![
            join_row(TABLE_HEADERS.iter().map(|h| h.to_string())),
            join_row(TABLE_HEADERS.iter().map(|_| "---".to_string())),
        ];
        for fact in &self.facts {
            rows.push(join_row(fact.to_table_row().into_iter()));
        }
        rows.join("\n")
    }

    /// Returns a new section after applying the given changes.
    ///
    /// Removals apply first and silently ignore unknown ids; updates and
    /// additions both require identifiers and upsert into the current
    /// order, appending ids seen for the first time. An update or addition
    /// reusing an existing id keeps that id's position.
    pub fn diff(
        &self,
        additions: &[Fact],
        updates: &[Fact],
        removals: &[String],
    ) -> Result<Section, DocumentError> {
        let mut index: HashMap<String, Fact> = self
            .facts
            .iter()
            .map(|fact| (fact.id.clone(), fact.clone()))
            .collect();
        let mut order: Vec<String> = self.facts.iter().map(|fact| fact.id.clone()).collect();

        for removal_id in removals {
            if index.remove(removal_id).is_some() {
                order.retain(|existing| existing != removal_id);
            }
        }

        for updated in updates {
            if updated.id.is_empty() {
                return Err(DocumentError::MissingIdentifier {
                    operation: "Updated",
                });
            }
            if index.insert(updated.id.clone(), updated.clone()).is_none() {
                order.push(updated.id.clone());
            }
        }

        for addition in additions {
            if addition.id.is_empty() {
                return Err(DocumentError::MissingIdentifier { operation: "Added" });
            }
            if index
                .insert(addition.id.clone(), addition.clone())
                .is_none()
            {
                order.push(addition.id.clone());
            }
        }

        let facts = order
            .into_iter()
            .filter_map(|id| index.remove(&id))
            .collect();
        Ok(Section::new(self.name.clone(), facts))
    }
}

/// Splits a `| a | b |` line into its interior cells, trimmed.
fn split_row(line: &str, section: &str) -> Result<Vec<String>, DocumentError> {
    let stripped = line.trim();
    if !stripped.starts_with('|') {
        return Err(DocumentError::malformed_row(section));
    }
    let parts: Vec<&str> = stripped.split('|').collect();
    if parts.len() <= 2 {
        return Ok(Vec::new());
    }
    // The leading and trailing splits are the empty fragments outside the
    // outer pipes.
    Ok(parts[1..parts.len() - 1]
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect())
}

/// Drops formatter-added trailing columns beyond the expected width, as
/// long as they satisfy `removable`.
fn trim_trailing_cells(
    mut cells: Vec<String>,
    expected_width: usize,
    removable: impl Fn(&str) -> bool,
) -> Vec<String> {
    while cells.len() > expected_width && removable(cells.last().map(String::as_str).unwrap_or(""))
    {
        cells.pop();
    }
    cells
}

/// A separator cell holds only `-`, `:` and whitespace; alignment markers
/// are ignored, only structure is validated.
fn is_separator_cell(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':' || c.is_whitespace())
}

fn join_row(cells: impl Iterator<Item = String>) -> String {
    let joined = cells.collect::<Vec<_>>().join(" | ");
    format!("| {} |", joined).trim_end().to_string()
}
