//! Loads `.xlsx`/`.xls`/`.ods` files into an [`InMemoryWorkbook`] using
//! calamine. Enabled with the `xlsx` feature.

use crate::error::{FactResolverError, Result};
use crate::grid::{Cell, CellGrid, InMemoryWorkbook};
use calamine::{open_workbook_auto, Data, Range, Reader};
use log::{debug, warn};
use std::path::Path;

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => Cell::Date(datetime.date()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

/// Copies a calamine range into a grid anchored at A1, so that layout
/// offsets keep meaning the same thing when the used range starts later.
pub fn range_to_grid(range: &Range<Data>) -> CellGrid {
    let mut grid = CellGrid::default();
    let Some((start_row, start_col)) = range.start() else {
        return grid;
    };
    for (row, col, data) in range.used_cells() {
        let cell = convert(data);
        if !cell.is_blank() {
            grid.set(
                start_row as usize + row,
                start_col as usize + col,
                cell,
            );
        }
    }
    grid
}

/// Reads every sheet of the workbook at `path`. Sheets that fail to parse are
/// skipped with a warning; failing to open the file is an error.
pub fn load_workbook(path: impl AsRef<Path>) -> Result<InMemoryWorkbook> {
    let path = path.as_ref();
    let mut source = open_workbook_auto(path).map_err(|e| FactResolverError::WorkbookOpen {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;

    let mut workbook = InMemoryWorkbook::new();
    for name in source.sheet_names() {
        match source.worksheet_range(&name) {
            Ok(range) => {
                let grid = range_to_grid(&range);
                debug!(
                    "Loaded sheet '{}' ({} x {})",
                    name,
                    grid.height(),
                    grid.width()
                );
                workbook.add_sheet(name, grid);
            }
            Err(e) => warn!("Skipping unreadable sheet '{}': {}", name, e),
        }
    }
    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_offset_is_preserved() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Item".to_string()));
        range.set_value((3, 2), Data::Int(42));

        let grid = range_to_grid(&range);
        assert_eq!(grid.get(2, 1), &Cell::text("Item"));
        assert_eq!(grid.get(3, 2), &Cell::Number(42.0));
        assert!(grid.get(0, 0).is_blank());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_workbook("/nonexistent/report.xlsx").unwrap_err();
        assert!(matches!(err, FactResolverError::WorkbookOpen { .. }));
    }
}
