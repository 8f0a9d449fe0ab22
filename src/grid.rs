//! Raw workbook access: a 2-D grid of cells per sheet plus sheet enumeration.
//!
//! The normalizer never cares where a grid came from. Tests build grids by
//! hand, the optional `xlsx` feature converts calamine ranges.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display form used for labels and item codes. Integral numbers drop
    /// their fractional part so that an item code typed as `2` reads `"2"`.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Number(n) => Some(format_number_label(*n)),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Numeric coercion. `None` means the cell holds nothing usable as a
    /// number; callers decide whether that means zero.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_numeric_text(s),
            _ => None,
        }
    }

    /// Coerces to a number, substituting zero for blank or non-numeric content.
    pub fn number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }
}

fn format_number_label(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parses spreadsheet-style numeric text: thousands separators, currency
/// markers, a trailing percent sign and accounting negatives like `(1,234)`.
pub fn parse_numeric_text(raw: &str) -> Option<f64> {
    let mut text = raw.trim();
    if text.is_empty() || text == "-" {
        return None;
    }

    let mut negative = false;
    if text.starts_with('(') && text.ends_with(')') && text.len() > 2 {
        negative = true;
        text = &text[1..text.len() - 1];
    }

    let cleaned: String = text
        .trim_start_matches("HK$")
        .trim_start_matches("HKD")
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' ' | '%'))
        .collect();

    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellGrid {
    rows: Vec<Vec<Cell>>,
}

impl CellGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Builds a grid from string rows; blank strings become empty cells and
    /// strings that parse as plain numbers become numeric cells.
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|s| {
                        let s = s.as_ref();
                        if s.trim().is_empty() {
                            Cell::Empty
                        } else if let Ok(n) = s.trim().parse::<f64>() {
                            Cell::Number(n)
                        } else {
                            Cell::Text(s.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let target = &mut self.rows[row];
        if target.len() <= col {
            target.resize(col + 1, Cell::Empty);
        }
        target[col] = cell;
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Read access to a workbook: sheet enumeration in workbook order plus a grid
/// per sheet.
pub trait Workbook {
    fn sheet_names(&self) -> Vec<String>;
    fn sheet(&self, name: &str) -> Option<&CellGrid>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkbook {
    sheets: Vec<(String, CellGrid)>,
}

impl InMemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, grid: CellGrid) -> Self {
        self.add_sheet(name, grid);
        self
    }

    /// Adds a sheet, replacing any existing sheet of the same name in place.
    pub fn add_sheet(&mut self, name: impl Into<String>, grid: CellGrid) {
        let name = name.into();
        if let Some(slot) = self.sheets.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = grid;
        } else {
            self.sheets.push((name, grid));
        }
    }
}

impl Workbook for InMemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(n, _)| n.clone()).collect()
    }

    fn sheet(&self, name: &str) -> Option<&CellGrid> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Cell::Number(12.5).as_number(), Some(12.5));
        assert_eq!(Cell::text("1,234.50").as_number(), Some(1234.5));
        assert_eq!(Cell::text("(500)").as_number(), Some(-500.0));
        assert_eq!(Cell::text("HK$ 2,000").as_number(), Some(2000.0));
        assert_eq!(Cell::text("n/a").as_number(), None);
        assert_eq!(Cell::text("-").number_or_zero(), 0.0);
        assert_eq!(Cell::Empty.number_or_zero(), 0.0);
        assert_eq!(Cell::Bool(true).number_or_zero(), 0.0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Cell::Number(2.0).as_label().as_deref(), Some("2"));
        assert_eq!(Cell::Number(2.1).as_label().as_deref(), Some("2.1"));
        assert_eq!(Cell::text("  Trade ").as_label().as_deref(), Some("Trade"));
        assert_eq!(Cell::text("   ").as_label(), None);
    }

    #[test]
    fn test_grid_out_of_range_is_empty() {
        let mut grid = CellGrid::from_strings(vec![vec!["a", "", "3"]]);
        assert_eq!(grid.get(0, 2), &Cell::Number(3.0));
        assert!(grid.get(0, 1).is_blank());
        assert!(grid.get(5, 5).is_blank());

        grid.set(3, 4, Cell::text("x"));
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.width(), 5);
    }
}
