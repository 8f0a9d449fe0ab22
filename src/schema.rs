use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One normalized observation taken from a report workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Fact {
    #[schemars(description = "Calendar year of the observation")]
    pub year: i32,

    #[schemars(description = "Calendar month of the observation (1 = January, 12 = December)")]
    pub month: u32,

    #[schemars(description = "Name of the worksheet the value was read from")]
    pub sheet_name: String,

    #[schemars(
        description = "Report classification the value belongs to, e.g. 'Budget Revision', 'Projection', 'Cash Flow'"
    )]
    pub financial_type: String,

    #[schemars(
        description = "Dot-segmented line item identifier such as '2.4.1'. Codes without a dot are category rows."
    )]
    pub item_code: String,

    #[schemars(description = "Line item description (the trade column), e.g. 'Gross Profit'")]
    pub data_type: String,

    #[schemars(description = "Numeric value; blank or non-numeric source cells become 0")]
    pub value: f64,
}

impl Fact {
    /// Category rows carry a code without any dot segment (`"2"`, `"3"`).
    pub fn is_structural(&self) -> bool {
        !self.item_code.contains('.')
    }

    /// True when this fact's item code is `prefix` itself or a descendant of it.
    pub fn item_code_within(&self, prefix: &str) -> bool {
        code_within(&self.item_code, prefix)
    }
}

/// `"2.1.3"` is within `"2"` and `"2.1"`, but `"21.1"` is not within `"2"`.
pub fn code_within(item_code: &str, prefix: &str) -> bool {
    item_code == prefix
        || item_code
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Ordered collection of facts for one workbook. Built once by the normalizer
/// and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactTable {
    facts: Vec<Fact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub rows: usize,
    pub year_range: Option<(i32, i32)>,
    pub sheets: Vec<String>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn extend(&mut self, facts: impl IntoIterator<Item = Fact>) {
        self.facts.extend(facts);
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fact> {
        self.facts.iter()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Sheet names in first-seen order, row count and covered years.
    pub fn summary(&self) -> TableSummary {
        let mut seen = BTreeSet::new();
        let mut sheets = Vec::new();
        for fact in &self.facts {
            if seen.insert(fact.sheet_name.as_str()) {
                sheets.push(fact.sheet_name.clone());
            }
        }

        let min_year = self.facts.iter().map(|f| f.year).min();
        let max_year = self.facts.iter().map(|f| f.year).max();

        TableSummary {
            rows: self.facts.len(),
            year_range: min_year.zip(max_year),
            sheets,
        }
    }
}

impl FromIterator<Fact> for FactTable {
    fn from_iter<T: IntoIterator<Item = Fact>>(iter: T) -> Self {
        Self {
            facts: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FactTable {
    type Item = &'a Fact;
    type IntoIter = std::slice::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// The sheet matches neither the status nor the time-series layout.
    UnrecognizedLayout,
    /// A required metadata cell (the report date) could not be read.
    MissingMetadata,
    /// No year could be determined for a time-series sheet.
    MissingYear,
    /// A configured sheet is absent from the workbook.
    MissingSheet,
}

/// A recoverable ingestion problem, reported next to whatever facts were
/// still produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub sheet: String,
    pub row: Option<usize>,
    pub column: Option<usize>,
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn sheet(sheet: &str, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            sheet: sheet.to_string(),
            row: None,
            column: None,
            kind,
            message: message.into(),
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn at_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}", self.sheet)?;
        if let Some(row) = self.row {
            write!(f, " row {}", row + 1)?;
        }
        if let Some(col) = self.column {
            write!(f, " col {}", col + 1)?;
        }
        write!(f, "] {:?}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(sheet: &str, year: i32, code: &str) -> Fact {
        Fact {
            year,
            month: 6,
            sheet_name: sheet.to_string(),
            financial_type: sheet.to_string(),
            item_code: code.to_string(),
            data_type: "Trade".to_string(),
            value: 0.0,
        }
    }

    #[test]
    fn test_item_code_within() {
        let f = fact("Projection", 2024, "2.1.3");
        assert!(f.item_code_within("2"));
        assert!(f.item_code_within("2.1"));
        assert!(f.item_code_within("2.1.3"));
        assert!(!f.item_code_within("2.2"));
        assert!(!fact("Projection", 2024, "21.1").item_code_within("2"));
        assert!(!f.is_structural());
        assert!(fact("Projection", 2024, "2").is_structural());
    }

    #[test]
    fn test_summary() {
        let table: FactTable = vec![
            fact("Financial Status", 2024, "1"),
            fact("Projection", 2025, "1.1"),
            fact("Projection", 2024, "1.2"),
        ]
        .into_iter()
        .collect();

        let summary = table.summary();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.year_range, Some((2024, 2025)));
        assert_eq!(summary.sheets, vec!["Financial Status", "Projection"]);

        assert_eq!(FactTable::new().summary().year_range, None);
    }

    #[test]
    fn test_fact_schema_generation() {
        let schema = schemars::schema_for!(Fact);
        let json = serde_json::to_string_pretty(&schema).unwrap();
        assert!(json.contains("item_code"));
        assert!(json.contains("financial_type"));
    }
}
