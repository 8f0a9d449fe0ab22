use crate::grid::{Cell, CellGrid};
use crate::header::trace_header;
use crate::layout::{is_sentinel, CellRef, StatusLayout, TimeSeriesLayout};
use crate::schema::{Fact, Warning, WarningKind};
use crate::utils::{fiscal_calendar_year, month_from_header, parse_period_cell, Period};
use chrono::Datelike;
use log::{debug, info, warn};

/// Facts and warnings produced by one sheet, plus the report period the
/// sheet's metadata cell declared (if readable).
#[derive(Debug, Clone, Default)]
pub struct SheetOutput {
    pub facts: Vec<Fact>,
    pub warnings: Vec<Warning>,
    pub period: Option<Period>,
}

impl SheetOutput {
    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Column roles of a status sheet after header tracing.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusColumns {
    pub item_code: usize,
    pub data_type: usize,
    /// `(column, financial type)` for every column with a traced label.
    pub classifications: Vec<(usize, String)>,
}

impl StatusColumns {
    pub fn resolve(grid: &CellGrid, layout: &StatusLayout) -> Self {
        let classifications = (layout.first_value_column..grid.width())
            .filter(|&col| col != layout.item_code_column && col != layout.data_type_column)
            .filter_map(|col| {
                let label =
                    trace_header(grid, layout.header_first_row, layout.header_last_row, col);
                if label.is_none() {
                    debug!("Column {} has no header label, skipping", col + 1);
                }
                label.map(|l| (col, l))
            })
            .collect();

        Self {
            item_code: layout.item_code_column,
            data_type: layout.data_type_column,
            classifications,
        }
    }
}

/// Column roles of a time-series sheet: which columns hold which month.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesColumns {
    pub item_code: usize,
    pub data_type: usize,
    pub months: Vec<(usize, u32)>,
}

impl TimeSeriesColumns {
    pub fn resolve(grid: &CellGrid, layout: &TimeSeriesLayout) -> Self {
        let months = (layout.first_value_column..grid.width())
            .filter_map(|col| {
                let month = match grid.get(layout.header_row, col) {
                    Cell::Date(d) => Some(d.month()),
                    Cell::Text(text) => month_from_header(text),
                    _ => None,
                };
                month.map(|m| (col, m))
            })
            .collect();

        Self {
            item_code: layout.item_code_column,
            data_type: layout.data_type_column,
            months,
        }
    }
}

/// Reads `(item_code, data_type)` for a data row, or `None` when the row is
/// blank or a template/unit sentinel.
fn row_identity(
    grid: &CellGrid,
    row: usize,
    item_col: usize,
    data_type_col: usize,
    sentinels: &[String],
) -> Option<(String, String)> {
    let item_code = grid.get(row, item_col).as_label()?;
    if is_sentinel(sentinels, &item_code) {
        debug!("Row {} is a sentinel row ('{}'), skipping", row + 1, item_code);
        return None;
    }
    let data_type = grid
        .get(row, data_type_col)
        .as_label()
        .unwrap_or_default();
    Some((item_code, data_type))
}

/// Zero-valued dotted rows are dropped; category rows survive even when zero.
fn keeps_value(item_code: &str, value: f64) -> bool {
    value != 0.0 || !item_code.contains('.')
}

fn read_period(grid: &CellGrid, cell: CellRef) -> Option<Period> {
    parse_period_cell(grid.get(cell.row, cell.column))
}

/// Consolidated status sheet: one fact per (row, classification column), all
/// dated with the report period from the metadata cell.
pub fn normalize_status_sheet(name: &str, grid: &CellGrid, layout: &StatusLayout) -> SheetOutput {
    let mut output = SheetOutput::default();

    let Some(period) = read_period(grid, layout.report_date_cell) else {
        output.warn(
            Warning::sheet(
                name,
                WarningKind::MissingMetadata,
                "report date cell is unreadable; sheet skipped",
            )
            .at_row(layout.report_date_cell.row)
            .at_column(layout.report_date_cell.column),
        );
        return output;
    };
    output.period = Some(period);

    let columns = StatusColumns::resolve(grid, layout);
    if columns.classifications.is_empty() {
        output.warn(Warning::sheet(
            name,
            WarningKind::UnrecognizedLayout,
            "header band defines no classification columns",
        ));
        return output;
    }

    for row in layout.data_start_row..grid.height() {
        let Some((item_code, data_type)) = row_identity(
            grid,
            row,
            columns.item_code,
            columns.data_type,
            &layout.row_sentinels,
        ) else {
            continue;
        };

        for (col, financial_type) in &columns.classifications {
            let value = grid.get(row, *col).number_or_zero();
            if !keeps_value(&item_code, value) {
                continue;
            }
            output.facts.push(Fact {
                year: period.year,
                month: period.month,
                sheet_name: name.to_string(),
                financial_type: financial_type.clone(),
                item_code: item_code.clone(),
                data_type: data_type.clone(),
                value,
            });
        }
    }

    info!(
        "Status sheet '{}' ({}): {} classifications, {} facts",
        name,
        period,
        columns.classifications.len(),
        output.facts.len()
    );
    output
}

/// Monthly sheet: the sheet name is the financial type and each month column
/// yields one fact per row. The year comes from the sheet's own metadata cell
/// or, failing that, from `base_period`.
pub fn normalize_time_series_sheet(
    name: &str,
    grid: &CellGrid,
    layout: &TimeSeriesLayout,
    base_period: Option<Period>,
    fiscal_year_start_month: u32,
) -> SheetOutput {
    let mut output = SheetOutput::default();

    let columns = TimeSeriesColumns::resolve(grid, layout);
    if columns.months.is_empty() {
        output.warn(
            Warning::sheet(
                name,
                WarningKind::UnrecognizedLayout,
                "header row names no months; sheet skipped",
            )
            .at_row(layout.header_row),
        );
        return output;
    }

    let own_period = read_period(grid, layout.report_date_cell);
    output.period = own_period;
    let Some(period) = own_period.or(base_period) else {
        output.warn(Warning::sheet(
            name,
            WarningKind::MissingYear,
            "no report date on the sheet and no base year from the status sheet",
        ));
        return output;
    };
    if own_period.is_none() {
        debug!("Sheet '{}' uses base period {}", name, period);
    }

    for row in layout.data_start_row..grid.height() {
        let Some((item_code, data_type)) = row_identity(
            grid,
            row,
            columns.item_code,
            columns.data_type,
            &layout.row_sentinels,
        ) else {
            continue;
        };

        for (col, month) in &columns.months {
            let value = grid.get(row, *col).number_or_zero();
            if !keeps_value(&item_code, value) {
                continue;
            }
            output.facts.push(Fact {
                year: fiscal_calendar_year(period, fiscal_year_start_month, *month),
                month: *month,
                sheet_name: name.to_string(),
                financial_type: name.to_string(),
                item_code: item_code.clone(),
                data_type: data_type.clone(),
                value,
            });
        }
    }

    info!(
        "Time-series sheet '{}': {} month columns, {} facts",
        name,
        columns.months.len(),
        output.facts.len()
    );
    output
}
