//! Fact value object - one atomic piece of tracked knowledge.
//!
//! Facts are immutable: every mutation produces a new instance. They are
//! stored as rows of a nine-column Markdown table and carry provenance
//! metadata (confidence, first/last seen dates, sources).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::errors::DocumentError;

/// The fixed table columns, in the only order the parser accepts.
pub const TABLE_HEADERS: [&str; 9] = [
    "id",
    "statement",
    "category",
    "confidence",
    "first_seen",
    "last_seen",
    "sources",
    "status",
    "notes",
];

/// Immutable representation of one knowledge item.
///
/// An empty `id` means the fact has not been assigned an identifier yet;
/// the updater assigns one before the fact ever reaches a document. Once
/// written, an identifier is stable for the life of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub statement: String,
    pub category: String,
    pub confidence: Option<f64>,
    pub first_seen: Option<NaiveDate>,
    pub last_seen: Option<NaiveDate>,
    pub sources: Vec<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl Fact {
    /// Creates a fact with just the identifying fields; metadata defaults
    /// to absent.
    pub fn new(
        id: impl Into<String>,
        statement: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            statement: statement.into(),
            category: category.into(),
            confidence: None,
            first_seen: None,
            last_seen: None,
            sources: Vec::new(),
            status: None,
            notes: None,
        }
    }

    /// Builds a fact from the nine cells of a table row.
    ///
    /// Cells arrive in [`TABLE_HEADERS`] order, already trimmed by the
    /// section parser. Blank cells become `None` / empty collections.
    pub fn from_table_row(cells: &[String]) -> Result<Self, DocumentError> {
        debug_assert_eq!(cells.len(), TABLE_HEADERS.len());
        Ok(Self {
            id: cells[0].trim().to_string(),
            statement: cells[1].trim().to_string(),
            category: cells[2].trim().to_string(),
            confidence: parse_optional_confidence(&cells[3])?,
            first_seen: parse_optional_date("first_seen", &cells[4])?,
            last_seen: parse_optional_date("last_seen", &cells[5])?,
            sources: parse_sources(&cells[6]),
            status: parse_optional_text(&cells[7]),
            notes: parse_optional_text(&cells[8]),
        })
    }

    /// Renders the fact into the nine cells of a table row, in
    /// [`TABLE_HEADERS`] order.
    pub fn to_table_row(&self) -> [String; 9] {
        [
            self.id.clone(),
            self.statement.clone(),
            self.category.clone(),
            self.confidence.map(format_confidence).unwrap_or_default(),
            format_optional_date(self.first_seen),
            format_optional_date(self.last_seen),
            self.sources.join("; "),
            self.status.clone().unwrap_or_default(),
            self.notes.clone().unwrap_or_default(),
        ]
    }

    /// Merges two facts believed to describe the same knowledge item.
    ///
    /// Precedence rules:
    /// - `statement`, `category`, `status`, `notes`: `other` wins when
    ///   non-empty, otherwise `self` is kept
    /// - `confidence`: `other` wins when present (an explicit `Some(0.0)`
    ///   still wins), otherwise `self`
    /// - `first_seen`: earliest of the non-null dates
    /// - `last_seen`: latest of the non-null dates
    /// - `sources`: deduplicated union, first-occurrence order, `self`
    ///   entries first
    /// - `id`: `self.id` when non-empty, else `other.id`
    ///
    /// Fails with [`DocumentError::MergeConflict`] when both facts carry
    /// different non-empty identifiers.
    pub fn merge(&self, other: &Fact) -> Result<Fact, DocumentError> {
        if !self.id.is_empty() && !other.id.is_empty() && self.id != other.id {
            return Err(DocumentError::merge_conflict(&self.id, &other.id));
        }

        let mut sources = Vec::new();
        for source in self.sources.iter().chain(other.sources.iter()) {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }

        Ok(Fact {
            id: if self.id.is_empty() {
                other.id.clone()
            } else {
                self.id.clone()
            },
            statement: prefer_non_empty(&other.statement, &self.statement),
            category: prefer_non_empty(&other.category, &self.category),
            confidence: other.confidence.or(self.confidence),
            first_seen: min_date(self.first_seen, other.first_seen),
            last_seen: max_date(self.last_seen, other.last_seen),
            sources,
            status: prefer_present(&other.status, &self.status),
            notes: prefer_present(&other.notes, &self.notes),
        })
    }

    /// Returns a copy with the given identifier.
    pub fn with_id(&self, id: impl Into<String>) -> Fact {
        Fact {
            id: id.into(),
            ..self.clone()
        }
    }

    /// Returns a copy whose missing seen-dates are filled with `today`.
    ///
    /// `fill_first` controls whether `first_seen` participates; updates
    /// only refresh `last_seen`.
    pub fn with_stamped_dates(&self, today: NaiveDate, fill_first: bool) -> Fact {
        Fact {
            first_seen: if fill_first {
                self.first_seen.or(Some(today))
            } else {
                self.first_seen
            },
            last_seen: self.last_seen.or(Some(today)),
            ..self.clone()
        }
    }
}

fn prefer_non_empty(preferred: &str, fallback: &str) -> String {
    if preferred.is_empty() {
        fallback.to_string()
    } else {
        preferred.to_string()
    }
}

fn prefer_present(preferred: &Option<String>, fallback: &Option<String>) -> Option<String> {
    preferred.clone().or_else(|| fallback.clone())
}

fn min_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (value, None) | (None, value) => value,
    }
}

fn max_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (value, None) | (None, value) => value,
    }
}

fn parse_optional_date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>, DocumentError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| DocumentError::invalid_cell(field, text))
}

fn format_optional_date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_optional_confidence(raw: &str) -> Result<Option<f64>, DocumentError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| DocumentError::invalid_cell("confidence", text))
}

/// Formats confidence with at most four decimals, trimming trailing zeros
/// and a dangling decimal point (`0.85`, not `0.8500`).
fn format_confidence(value: f64) -> String {
    let formatted = format!("{value:.4}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

fn parse_sources(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_optional_text(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
