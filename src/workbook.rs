use crate::grid::{CellGrid, Workbook};
use crate::layout::NormalizerConfig;
use crate::schema::{FactTable, Warning, WarningKind};
use crate::sheet::{normalize_status_sheet, normalize_time_series_sheet};
use crate::utils::Period;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Project header block read from the top of the status sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub company: Option<String>,
    pub project_code: Option<String>,
    pub project_name: Option<String>,
    pub report_date: Option<String>,
    pub start_date: Option<String>,
    pub complete_date: Option<String>,
    pub target_complete_date: Option<String>,
}

/// Result of normalizing one workbook. Warnings accompany, never replace,
/// whatever facts could still be produced.
#[derive(Debug, Clone, Default)]
pub struct NormalizedWorkbook {
    pub facts: FactTable,
    pub warnings: Vec<Warning>,
    pub base_period: Option<Period>,
    pub project_info: ProjectInfo,
}

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

const METADATA_ROWS: usize = 10;

fn clean_date_text(raw: &str) -> String {
    ISO_DATE
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.lines().next().unwrap_or("").trim().to_string())
}

/// Scans the metadata block for `Label:` cells and reads the value to their
/// right. The company name sits in `A1`.
pub fn extract_project_info(grid: &CellGrid) -> ProjectInfo {
    let mut info = ProjectInfo {
        company: grid.get(0, 0).as_label(),
        ..ProjectInfo::default()
    };

    for row in 0..METADATA_ROWS.min(grid.height()) {
        for (col, cell) in grid.row(row).iter().enumerate() {
            let Some(label) = cell.as_label() else {
                continue;
            };
            let value = || grid.get(row, col + 1).as_label();

            if label.contains("Project Code:") {
                info.project_code = value();
            } else if label.contains("Project Name:") {
                info.project_name = value();
            } else if label.contains("Report Date:") {
                info.report_date = value();
            } else if label.contains("Start Date:") {
                info.start_date = value();
            } else if label.contains("Target Complete Date:") {
                info.target_complete_date = value().map(|v| clean_date_text(&v));
            } else if label.contains("Complete Date:") {
                info.complete_date = value().map(|v| clean_date_text(&v));
            }
        }
    }

    info
}

pub struct WorkbookNormalizer<'a> {
    config: &'a NormalizerConfig,
}

impl<'a> WorkbookNormalizer<'a> {
    pub fn new(config: &'a NormalizerConfig) -> Self {
        Self { config }
    }

    /// Status sheet first (it provides the base period), then every
    /// time-series sheet in workbook order.
    pub fn normalize(&self, workbook: &dyn Workbook) -> NormalizedWorkbook {
        let mut result = NormalizedWorkbook::default();
        let status_name = &self.config.status.sheet_name;

        match workbook.sheet(status_name) {
            Some(grid) => {
                result.project_info = extract_project_info(grid);
                let output = normalize_status_sheet(status_name, grid, &self.config.status);
                if output.facts.is_empty() {
                    warn!(
                        "Status sheet '{}' produced no facts; base year is undefined",
                        status_name
                    );
                } else {
                    result.base_period = output.period;
                }
                result.facts.extend(output.facts);
                result.warnings.extend(output.warnings);
            }
            None => {
                let warning = Warning::sheet(
                    status_name,
                    WarningKind::MissingSheet,
                    "status sheet not found in workbook",
                );
                warn!("{}", warning);
                result.warnings.push(warning);
            }
        }

        for name in self.time_series_sheets(workbook) {
            let Some(grid) = workbook.sheet(&name) else {
                let warning = Warning::sheet(
                    &name,
                    WarningKind::MissingSheet,
                    "configured time-series sheet not found in workbook",
                );
                warn!("{}", warning);
                result.warnings.push(warning);
                continue;
            };

            let output = normalize_time_series_sheet(
                &name,
                grid,
                &self.config.time_series,
                result.base_period,
                self.config.fiscal_year_start_month,
            );
            result.facts.extend(output.facts);
            result.warnings.extend(output.warnings);
        }

        let summary = result.facts.summary();
        info!(
            "Normalized workbook: {} facts from {} sheets, {} warnings",
            summary.rows,
            summary.sheets.len(),
            result.warnings.len()
        );
        result
    }

    fn time_series_sheets(&self, workbook: &dyn Workbook) -> Vec<String> {
        if self.config.time_series.sheets.is_empty() {
            workbook
                .sheet_names()
                .into_iter()
                .filter(|name| *name != self.config.status.sheet_name)
                .collect()
        } else {
            self.config.time_series.sheets.clone()
        }
    }
}

pub fn normalize(workbook: &dyn Workbook, config: &NormalizerConfig) -> NormalizedWorkbook {
    WorkbookNormalizer::new(config).normalize(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn test_extract_project_info() {
        let mut grid = CellGrid::default();
        grid.set(0, 0, Cell::text("Acme Construction Ltd"));
        grid.set(2, 0, Cell::text("Project Code:"));
        grid.set(2, 1, Cell::text("P-1024"));
        grid.set(3, 0, Cell::text("Project Name:"));
        grid.set(3, 1, Cell::text("Harbour Road Tower"));
        grid.set(4, 0, Cell::text("Report Date:"));
        grid.set(4, 1, Cell::text("2024-06-30"));
        grid.set(6, 0, Cell::text("Complete Date:"));
        grid.set(6, 1, Cell::text("2025-12-31 (revised)\nsee EOT claim"));
        grid.set(7, 0, Cell::text("Target Complete Date:"));
        grid.set(7, 1, Cell::text("March 2026\nper programme"));

        let info = extract_project_info(&grid);
        assert_eq!(info.company.as_deref(), Some("Acme Construction Ltd"));
        assert_eq!(info.project_code.as_deref(), Some("P-1024"));
        assert_eq!(info.project_name.as_deref(), Some("Harbour Road Tower"));
        assert_eq!(info.report_date.as_deref(), Some("2024-06-30"));
        assert_eq!(info.complete_date.as_deref(), Some("2025-12-31"));
        assert_eq!(info.target_complete_date.as_deref(), Some("March 2026"));
        assert_eq!(info.start_date, None);
    }
}
