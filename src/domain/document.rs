//! Document aggregate - frontmatter plus ordered fact sections.
//!
//! The document is the full persisted artifact: an optional YAML
//! frontmatter block followed by `## `-headed sections, each holding a
//! fact table. Parsing and rendering are exact inverses for canonical
//! input, which is what keeps repeated consolidation runs lossless.

use serde_yaml::{Mapping, Value};

use super::delta::SectionDelta;
use super::errors::DocumentError;
use super::section::Section;

/// Canonical topic sections, in the order they are always rendered.
/// Unrecognized section names follow these in their encountered order.
pub const CANONICAL_SECTIONS: [&str; 8] = [
    "Health & Wellbeing",
    "Work & Productivity",
    "Relationships",
    "Hobbies & Interests",
    "Personal Projects",
    "Finances",
    "Systems & Tools",
    "Travel",
];

/// Returns true when `name` is one of the canonical topic sections.
pub fn is_canonical_section(name: &str) -> bool {
    CANONICAL_SECTIONS.contains(&name)
}

/// Aggregate root for the fact ledger Markdown document.
///
/// The frontmatter mapping is order-preserving (`serde_yaml::Mapping`),
/// so bookkeeping keys keep their position across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub frontmatter: Mapping,
    pub sections: Vec<Section>,
}

impl Document {
    /// Creates a document from parts.
    pub fn new(frontmatter: Mapping, sections: Vec<Section>) -> Self {
        Self {
            frontmatter,
            sections,
        }
    }

    /// Creates an empty document.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses Markdown text into a structured document.
    ///
    /// A line consisting solely of `---` at the very start opens a
    /// frontmatter block that must be closed by a later solitary `---`.
    /// The remaining body splits into sections on `## ` headings; content
    /// before the first heading is discarded.
    pub fn parse(markdown: &str) -> Result<Self, DocumentError> {
        let lines: Vec<&str> = markdown.lines().collect();
        let mut frontmatter = Mapping::new();
        let mut body_start = 0;

        if lines.first().map(|line| line.trim()) == Some("---") {
            let closing = lines
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, line)| line.trim() == "---")
                .map(|(index, _)| index)
                .ok_or(DocumentError::UnterminatedFrontmatter)?;
            frontmatter = parse_frontmatter(&lines[1..closing])?;
            body_start = closing + 1;
        }

        let mut sections = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;
        for line in lines[body_start..].iter().copied() {
            if let Some(name) = line.strip_prefix("## ") {
                if let Some((name, buffer)) = current.take() {
                    sections.push(Section::parse(name, &buffer.join("\n"))?);
                }
                current = Some((name.trim().to_string(), Vec::new()));
            } else if let Some((_, buffer)) = current.as_mut() {
                buffer.push(line);
            }
        }
        if let Some((name, buffer)) = current.take() {
            sections.push(Section::parse(name, &buffer.join("\n"))?);
        }

        Ok(Self::new(frontmatter, sections))
    }

    /// Renders the document back into Markdown.
    ///
    /// Canonical sections come first in their fixed order, residual
    /// sections follow in their original relative order, and the output
    /// always ends with exactly one trailing newline.
    pub fn render(&self) -> Result<String, DocumentError> {
        let mut blocks: Vec<String> = Vec::new();
        if !self.frontmatter.is_empty() {
            blocks.push(render_frontmatter(&self.frontmatter)?);
        }

        let ordered = order_sections(self.sections.clone());
        if !ordered.is_empty() {
            let section_blocks: Vec<String> = ordered
                .iter()
                .map(|section| format!("## {}\n\n{}", section.name, section.render()))
                .collect();
            blocks.push(section_blocks.join("\n\n"));
        }

        let mut rendered = blocks.join("\n\n");
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        Ok(rendered)
    }

    /// Returns a copy with the given section replaced by name, or
    /// appended when no section with that name exists.
    pub fn with_updated_section(&self, section: Section) -> Document {
        let mut sections = self.sections.clone();
        match sections.iter_mut().find(|existing| existing.name == section.name) {
            Some(slot) => *slot = section,
            None => sections.push(section),
        }
        Document::new(self.frontmatter.clone(), sections)
    }

    /// Applies per-section deltas and re-derives the canonical-then-
    /// residual section order.
    ///
    /// Deltas are applied in the given order; a delta targeting a section
    /// that does not exist yet creates it.
    pub fn apply_changes(
        &self,
        deltas: &[(String, SectionDelta)],
    ) -> Result<Document, DocumentError> {
        let mut sections = self.sections.clone();
        for (name, delta) in deltas {
            let updated = match sections.iter().find(|section| &section.name == name) {
                Some(existing) => existing.diff(&delta.additions, &delta.updates, &delta.removals)?,
                None => {
                    Section::empty(name).diff(&delta.additions, &delta.updates, &delta.removals)?
                }
            };
            match sections.iter_mut().find(|section| &section.name == name) {
                Some(slot) => *slot = updated,
                None => sections.push(updated),
            }
        }
        Ok(Document::new(
            self.frontmatter.clone(),
            order_sections(sections),
        ))
    }
}

/// Sorts canonical sections into their fixed order, keeping everything
/// else in its current relative order afterwards.
fn order_sections(sections: Vec<Section>) -> Vec<Section> {
    let mut ordered = Vec::with_capacity(sections.len());
    for name in CANONICAL_SECTIONS {
        if let Some(section) = sections.iter().find(|section| section.name == name) {
            ordered.push(section.clone());
        }
    }
    ordered.extend(
        sections
            .into_iter()
            .filter(|section| !is_canonical_section(&section.name)),
    );
    ordered
}

fn parse_frontmatter(lines: &[&str]) -> Result<Mapping, DocumentError> {
    let yaml_text = lines.join("\n");
    if yaml_text.trim().is_empty() {
        return Ok(Mapping::new());
    }
    let value: Value = serde_yaml::from_str(&yaml_text)
        .map_err(|err| DocumentError::frontmatter_not_mapping(err.to_string()))?;
    match value {
        // YAML's 1.2 core schema resolves bare dates as plain strings, so
        // date scalars arrive already in their ISO-8601 text form.
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(DocumentError::frontmatter_not_mapping(format!(
            "got {}",
            value_kind(&other)
        ))),
    }
}

fn render_frontmatter(frontmatter: &Mapping) -> Result<String, DocumentError> {
    let mut lines = vec!["---".to_string()];
    for (key, value) in frontmatter {
        render_entry(&render_scalar(key)?, value, 0, &mut lines)?;
    }
    lines.push("---".to_string());
    Ok(lines.join("\n"))
}

fn render_entry(
    key: &str,
    value: &Value,
    indent: usize,
    out: &mut Vec<String>,
) -> Result<(), DocumentError> {
    let prefix = " ".repeat(indent);
    match value {
        Value::Mapping(mapping) => {
            out.push(format!("{prefix}{key}:"));
            for (nested_key, nested_value) in mapping {
                render_entry(&render_scalar(nested_key)?, nested_value, indent + 2, out)?;
            }
        }
        Value::Sequence(items) => {
            out.push(format!("{prefix}{key}:"));
            for item in items {
                if matches!(item, Value::Mapping(_) | Value::Sequence(_)) {
                    return Err(DocumentError::unsupported_frontmatter_value(key));
                }
                out.push(format!("{prefix}- {}", render_scalar(item)?));
            }
        }
        scalar => out.push(format!("{prefix}{key}: {}", render_scalar(scalar)?)),
    }
    Ok(())
}

fn render_scalar(value: &Value) -> Result<String, DocumentError> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => Ok(text.clone()),
        Value::Tagged(tagged) => render_scalar(&tagged.value),
        other => Err(DocumentError::frontmatter_not_mapping(format!(
            "cannot render {} as a scalar",
            value_kind(other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fact::Fact;
    use proptest::prelude::*;

    fn fact(id: &str, statement: &str, category: &str) -> Fact {
        Fact::new(id, statement, category)
    }

    fn table(rows: &[&str]) -> String {
        let mut lines = vec![
            "| id | statement | category | confidence | first_seen | last_seen | sources | status | notes |".to_string(),
            "| --- | --- | --- | --- | --- | --- | --- | --- | --- |".to_string(),
        ];
        lines.extend(rows.iter().map(|row| row.to_string()));
        lines.join("\n")
    }

    // ───────────────────────────────────────────────────────────────
    // Parsing
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn parse_document_with_frontmatter_and_sections() {
        let markdown = format!(
            "---\nlast_updated: 2024-03-01\ntags:\n- ai_memory\n---\n\n## Travel\n\n{}\n",
            table(&["| t1 | Visited Oslo | travel |  |  |  |  |  |  |"])
        );

        let document = Document::parse(&markdown).unwrap();

        assert_eq!(
            document.frontmatter.get("last_updated"),
            Some(&Value::String("2024-03-01".to_string()))
        );
        assert_eq!(document.sections.len(), 1);
        assert_eq!(document.sections[0].name, "Travel");
        assert_eq!(document.sections[0].facts[0].id, "t1");
    }

    #[test]
    fn parse_blank_input_yields_empty_document() {
        let document = Document::parse("").unwrap();
        assert!(document.frontmatter.is_empty());
        assert!(document.sections.is_empty());
    }

    #[test]
    fn parse_discards_content_before_first_heading() {
        let markdown = format!("stray preamble\n\n## Travel\n\n{}\n", table(&[]));
        let document = Document::parse(&markdown).unwrap();
        assert_eq!(document.sections.len(), 1);
        assert_eq!(document.sections[0].name, "Travel");
    }

    #[test]
    fn parse_unterminated_frontmatter_fails() {
        let err = Document::parse("---\nkey: value\n").unwrap_err();
        assert_eq!(err, DocumentError::UnterminatedFrontmatter);
    }

    #[test]
    fn parse_non_mapping_frontmatter_fails() {
        let err = Document::parse("---\n- just\n- a list\n---\n").unwrap_err();
        assert!(matches!(err, DocumentError::FrontmatterNotMapping { .. }));
    }

    #[test]
    fn parse_empty_frontmatter_block_is_allowed() {
        let document = Document::parse("---\n---\n").unwrap();
        assert!(document.frontmatter.is_empty());
    }

    // ───────────────────────────────────────────────────────────────
    // Rendering
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn render_orders_canonical_sections_before_residuals() {
        let document = Document::new(
            Mapping::new(),
            vec![
                Section::new("Zeta Custom", vec![fact("z1", "Custom", "misc")]),
                Section::new("Travel", vec![fact("t1", "Visited Oslo", "travel")]),
                Section::new("Finances", vec![fact("m1", "Budgets monthly", "money")]),
                Section::new("Alpha Custom", vec![fact("a1", "Other", "misc")]),
            ],
        );

        let rendered = document.render().unwrap();
        let headings: Vec<&str> = rendered
            .lines()
            .filter(|line| line.starts_with("## "))
            .collect();
        assert_eq!(
            headings,
            vec!["## Finances", "## Travel", "## Zeta Custom", "## Alpha Custom"]
        );
    }

    #[test]
    fn render_ends_with_exactly_one_newline() {
        let document = Document::new(
            Mapping::new(),
            vec![Section::new("Travel", vec![fact("t1", "Visited Oslo", "travel")])],
        );
        let rendered = document.render().unwrap();
        assert!(rendered.ends_with('\n'));
        assert!(!rendered.ends_with("\n\n"));
    }

    #[test]
    fn render_nested_frontmatter_mapping_and_list() {
        let mut inner = Mapping::new();
        inner.insert(
            Value::String("model".to_string()),
            Value::String("consolidator".to_string()),
        );
        let mut frontmatter = Mapping::new();
        frontmatter.insert(
            Value::String("pipeline".to_string()),
            Value::Mapping(inner),
        );
        frontmatter.insert(
            Value::String("tags".to_string()),
            Value::Sequence(vec![
                Value::String("ai_memory".to_string()),
                Value::String("persistent_facts".to_string()),
            ]),
        );

        let rendered = Document::new(frontmatter, Vec::new()).render().unwrap();
        assert_eq!(
            rendered,
            "---\npipeline:\n  model: consolidator\ntags:\n- ai_memory\n- persistent_facts\n---\n"
        );
    }

    #[test]
    fn render_rejects_nested_collections_inside_lists() {
        let mut frontmatter = Mapping::new();
        frontmatter.insert(
            Value::String("bad".to_string()),
            Value::Sequence(vec![Value::Sequence(vec![Value::Null])]),
        );

        let err = Document::new(frontmatter, Vec::new()).render().unwrap_err();
        assert_eq!(
            err,
            DocumentError::unsupported_frontmatter_value("bad")
        );
    }

    // ───────────────────────────────────────────────────────────────
    // Round-trip law
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn canonical_input_renders_identically_after_parse() {
        let markdown = format!(
            "---\nconsolidation_type: persistent\nlast_updated: 2024-03-01\ntags:\n- ai_memory\n- persistent_facts\n---\n\n## Finances\n\n{}\n\n## Travel\n\n{}\n",
            table(&["| m1 | Budgets monthly | money | 0.8 | 2024-01-01 | 2024-02-01 | ledger | active |  |"]),
            table(&["| t1 | Visited Oslo | travel |  |  |  |  |  |  |"]),
        );

        let document = Document::parse(&markdown).unwrap();
        assert_eq!(document.render().unwrap(), markdown);
    }

    #[test]
    fn parse_render_parse_is_stable_for_padded_input() {
        // Formatter-padded tables are accepted on parse and normalized on
        // render; a second round trip must be a fixed point.
        let markdown = "## Travel\n\n\
            | id | statement | category | confidence | first_seen | last_seen | sources | status | notes |  |\n\
            | --- | --- | --- | --- | --- | --- | --- | --- | --- | --- |\n\
            | t1 | Visited Oslo | travel |  |  |  |  |  |  |  |\n";

        let first = Document::parse(markdown).unwrap();
        let rendered = first.render().unwrap();
        let second = Document::parse(&rendered).unwrap();
        assert_eq!(second, first);
        assert_eq!(second.render().unwrap(), rendered);
    }

    // ───────────────────────────────────────────────────────────────
    // Section replacement and delta application
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn with_updated_section_replaces_by_name() {
        let document = Document::new(
            Mapping::new(),
            vec![Section::new("Travel", vec![fact("t1", "Visited Oslo", "travel")])],
        );

        let replaced = document
            .with_updated_section(Section::new("Travel", vec![fact("t2", "Visited Bergen", "travel")]));
        assert_eq!(replaced.sections.len(), 1);
        assert_eq!(replaced.sections[0].facts[0].id, "t2");
    }

    #[test]
    fn with_updated_section_appends_unknown_name() {
        let document = Document::empty();
        let appended = document.with_updated_section(Section::empty("Travel"));
        assert_eq!(appended.sections.len(), 1);
    }

    #[test]
    fn apply_changes_creates_missing_sections_and_reorders() {
        let document = Document::new(
            Mapping::new(),
            vec![Section::new("Custom", vec![fact("c1", "Odd one", "misc")])],
        );

        let deltas = vec![
            (
                "Travel".to_string(),
                SectionDelta::new(vec![fact("t1", "Visited Oslo", "travel")], Vec::new(), Vec::new()),
            ),
            (
                "Finances".to_string(),
                SectionDelta::new(vec![fact("m1", "Budgets monthly", "money")], Vec::new(), Vec::new()),
            ),
        ];

        let updated = document.apply_changes(&deltas).unwrap();
        let names: Vec<&str> = updated.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Finances", "Travel", "Custom"]);
    }

    #[test]
    fn apply_changes_removes_and_updates_in_one_pass() {
        let document = Document::new(
            Mapping::new(),
            vec![Section::new(
                "Travel",
                vec![fact("t1", "Visited Oslo", "travel"), fact("t2", "Visited Bergen", "travel")],
            )],
        );

        let deltas = vec![(
            "Travel".to_string(),
            SectionDelta::new(
                Vec::new(),
                vec![fact("t2", "Visited Bergen twice", "travel")],
                vec!["t1".to_string()],
            ),
        )];

        let updated = document.apply_changes(&deltas).unwrap();
        assert_eq!(updated.sections[0].facts.len(), 1);
        assert_eq!(updated.sections[0].facts[0].statement, "Visited Bergen twice");
    }

    // ───────────────────────────────────────────────────────────────
    // Property: render/parse round trip
    // ───────────────────────────────────────────────────────────────

    prop_compose! {
        fn arb_word()(word in "[a-z]{1,10}") -> String { word }
    }

    prop_compose! {
        fn arb_text()(words in prop::collection::vec(arb_word(), 0..4)) -> String {
            words.join(" ")
        }
    }

    prop_compose! {
        fn arb_date()(days in 0i64..3650) -> chrono::NaiveDate {
            chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                + chrono::Duration::days(days)
        }
    }

    prop_compose! {
        fn arb_fact(index: usize)(
            statement in arb_text(),
            category in arb_word(),
            confidence in prop::option::of(0u32..10_000u32),
            first_seen in prop::option::of(arb_date()),
            last_seen in prop::option::of(arb_date()),
            sources in prop::collection::vec(arb_word(), 0..3),
            status in prop::option::of(arb_word()),
            notes in prop::option::of(arb_text().prop_filter("non-empty", |t| !t.is_empty())),
        ) -> Fact {
            Fact {
                id: format!("{category}-{index}"),
                statement,
                category,
                confidence: confidence.map(|raw| f64::from(raw) / 10_000.0),
                first_seen,
                last_seen,
                sources,
                status,
                notes,
            }
        }
    }

    fn arb_section(name: &'static str) -> impl Strategy<Value = Section> {
        (0usize..5).prop_flat_map(move |count| {
            (0..count)
                .map(arb_fact)
                .collect::<Vec<_>>()
                .prop_map(move |facts| Section::new(name, facts))
        })
    }

    proptest! {
        #[test]
        fn rendered_documents_round_trip_exactly(
            travel in arb_section("Travel"),
            custom in arb_section("Reading List"),
        ) {
            let document = Document::new(Mapping::new(), vec![travel, custom]);

            let rendered = document.render().unwrap();
            let reparsed = Document::parse(&rendered).unwrap();
            prop_assert_eq!(reparsed.render().unwrap(), rendered);
        }
    }
}
