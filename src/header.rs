//! Reconstructs merged, multi-row column headers into single labels.
//!
//! Report templates stack a header over several rows (a stage name, a
//! revision date, a column letter, a helper formula like `D=B+C`). Only the
//! semantic fragments survive; spreadsheet helper labels are dropped.

use crate::grid::{Cell, CellGrid};
use once_cell::sync::Lazy;
use regex::Regex;

static SINGLE_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]$").unwrap());

/// `D=B+C`, `E=E/D`, `H = F - G`
static COLUMN_FORMULA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{1,3}\s*=\s*[A-Z]{1,3}(?:\s*[-+*/]\s*[A-Z]{1,3})*$").unwrap()
});

static BALANCE_HELPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+Balance\b").unwrap());

static TIME_RATIO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^%\s*of\s+time").unwrap());

/// Removes formula and quoting markers, keeping leading whitespace intact so
/// the indentation-sensitive helper patterns still see it.
fn strip_markers(raw: &str) -> &str {
    let without_formula = raw.strip_prefix('=').unwrap_or(raw);
    without_formula.trim_end().trim_matches(|c| c == '"' || c == '\'')
}

/// True when a header fragment is a helper label generated by the template's
/// formulas rather than a classification.
pub fn is_formula_indicator(fragment: &str) -> bool {
    let trimmed = fragment.trim();
    SINGLE_LETTER.is_match(trimmed)
        || COLUMN_FORMULA.is_match(trimmed)
        || BALANCE_HELPER.is_match(fragment)
        || TIME_RATIO.is_match(trimmed)
}

/// Combines the header band `first_row..=last_row` at `column` into one label.
/// Returns `None` when no semantic fragment survives.
pub fn trace_header(
    grid: &CellGrid,
    first_row: usize,
    last_row: usize,
    column: usize,
) -> Option<String> {
    let fragments: Vec<String> = (first_row..=last_row)
        .filter_map(|row| match grid.get(row, column) {
            Cell::Text(text) => Some(text.clone()),
            other => other.as_label(),
        })
        .filter_map(|raw| {
            let stripped = strip_markers(&raw);
            if stripped.trim().is_empty() || is_formula_indicator(stripped) {
                None
            } else {
                Some(stripped.split_whitespace().collect::<Vec<_>>().join(" "))
            }
        })
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_grid(cells: &[&str]) -> CellGrid {
        CellGrid::from_strings(cells.iter().map(|c| vec![*c]))
    }

    #[test]
    fn test_formula_row_and_blank_row_dropped() {
        let grid = column_grid(&["", "D=B+C", "Gross Profit"]);
        assert_eq!(trace_header(&grid, 0, 2, 0).as_deref(), Some("Gross Profit"));
    }

    #[test]
    fn test_fragments_joined_in_order() {
        let grid = column_grid(&["Budget", "=Revision as at", "G", "31/03/2024"]);
        assert_eq!(
            trace_header(&grid, 0, 3, 0).as_deref(),
            Some("Budget Revision as at 31/03/2024")
        );
    }

    #[test]
    fn test_helper_patterns() {
        assert!(is_formula_indicator("D"));
        assert!(is_formula_indicator("D=B+C"));
        assert!(is_formula_indicator("E=E/D"));
        assert!(is_formula_indicator("H = F - G"));
        assert!(is_formula_indicator(" Balance to complete"));
        assert!(is_formula_indicator("% of time elapsed"));
        assert!(!is_formula_indicator("Projection"));
        assert!(!is_formula_indicator("Balance Sheet"));
        assert!(!is_formula_indicator("WIP"));
    }

    #[test]
    fn test_quoted_and_formula_prefixed_labels() {
        let grid = column_grid(&["=\"Audit Report\"", "'(WIP)'"]);
        assert_eq!(
            trace_header(&grid, 0, 1, 0).as_deref(),
            Some("Audit Report (WIP)")
        );
    }

    #[test]
    fn test_unlabelled_column() {
        let grid = column_grid(&["", "C", "% of time"]);
        assert_eq!(trace_header(&grid, 0, 2, 0), None);
        assert_eq!(trace_header(&grid, 0, 2, 7), None);
    }
}
