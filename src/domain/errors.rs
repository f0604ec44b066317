//! Error types for the document domain.
//!
//! Every failure here is a fatal-to-the-operation value error: parsing and
//! merging either produce a complete result or abort before anything is
//! written back to storage.

use thiserror::Error;

/// Errors raised while parsing, rendering, or merging a ledger document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A frontmatter opening `---` was found without a closing delimiter.
    #[error("Frontmatter opening delimiter found without closing delimiter")]
    UnterminatedFrontmatter,

    /// The frontmatter block did not deserialize into a key/value mapping.
    #[error("Frontmatter must deserialize into a mapping: {reason}")]
    FrontmatterNotMapping { reason: String },

    /// A frontmatter list contains a nested mapping or list, which the
    /// renderer does not support.
    #[error("Nested collection items are not supported in frontmatter key '{key}'")]
    UnsupportedFrontmatterValue { key: String },

    /// A section body has content but lacks the header + separator rows.
    #[error("Section '{section}' is missing table structure")]
    MissingTableStructure { section: String },

    /// A table line did not start with `|`.
    #[error("Expected Markdown table row to start with '|' in section '{section}'")]
    MalformedRow { section: String },

    /// The header row does not match the fixed nine column names.
    #[error("Unexpected table headers in section '{section}'")]
    UnexpectedHeaders { section: String },

    /// The separator row is structurally invalid.
    #[error("Malformed table separator in section '{section}'")]
    MalformedSeparator { section: String },

    /// A data row has the wrong number of cells.
    #[error("Row in section '{section}' has incorrect column count")]
    WrongColumnCount { section: String },

    /// A cell holds a value that does not parse as its column's type.
    #[error("Invalid {field} value '{value}'")]
    InvalidCell { field: &'static str, value: String },

    /// Two facts with different non-empty identifiers were merged.
    #[error("Cannot merge facts with different identifiers ('{left}' vs '{right}')")]
    MergeConflict { left: String, right: String },

    /// An added or updated fact reached diff application without an id.
    /// The updater assigns ids before applying, so this is an internal
    /// invariant violation when it surfaces.
    #[error("{operation} facts must have identifiers")]
    MissingIdentifier { operation: &'static str },
}

impl DocumentError {
    /// Creates a non-mapping frontmatter error.
    pub fn frontmatter_not_mapping(reason: impl Into<String>) -> Self {
        Self::FrontmatterNotMapping {
            reason: reason.into(),
        }
    }

    /// Creates an unsupported frontmatter value error for a key.
    pub fn unsupported_frontmatter_value(key: impl Into<String>) -> Self {
        Self::UnsupportedFrontmatterValue { key: key.into() }
    }

    /// Creates a missing table structure error.
    pub fn missing_table_structure(section: impl Into<String>) -> Self {
        Self::MissingTableStructure {
            section: section.into(),
        }
    }

    /// Creates a malformed row error.
    pub fn malformed_row(section: impl Into<String>) -> Self {
        Self::MalformedRow {
            section: section.into(),
        }
    }

    /// Creates an unexpected headers error.
    pub fn unexpected_headers(section: impl Into<String>) -> Self {
        Self::UnexpectedHeaders {
            section: section.into(),
        }
    }

    /// Creates a malformed separator error.
    pub fn malformed_separator(section: impl Into<String>) -> Self {
        Self::MalformedSeparator {
            section: section.into(),
        }
    }

    /// Creates a wrong column count error.
    pub fn wrong_column_count(section: impl Into<String>) -> Self {
        Self::WrongColumnCount {
            section: section.into(),
        }
    }

    /// Creates an invalid cell error.
    pub fn invalid_cell(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidCell {
            field,
            value: value.into(),
        }
    }

    /// Creates a merge conflict error.
    pub fn merge_conflict(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::MergeConflict {
            left: left.into(),
            right: right.into(),
        }
    }
}
