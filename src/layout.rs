//! Declared column roles for the two sheet layouts.
//!
//! Offsets are 0-based (row 0 is spreadsheet row 1, column 0 is column A).
//! The defaults describe the construction-project report template: a
//! consolidated "Financial Status" sheet with a four-row merged header band,
//! plus one monthly sheet per report type.

use crate::error::{FactResolverError, Result};
use crate::utils::validate_month;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CellRef {
    pub row: usize,
    pub column: usize,
}

impl CellRef {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StatusLayout {
    #[schemars(description = "Name of the consolidated status sheet")]
    pub sheet_name: String,

    #[schemars(description = "Cell holding the report date")]
    pub report_date_cell: CellRef,

    #[schemars(description = "First row of the merged header band")]
    pub header_first_row: usize,

    #[schemars(description = "Last row of the merged header band (inclusive)")]
    pub header_last_row: usize,

    #[schemars(description = "First data row")]
    pub data_start_row: usize,

    pub item_code_column: usize,

    pub data_type_column: usize,

    #[schemars(description = "First column that may carry a report classification")]
    pub first_value_column: usize,

    #[schemars(
        description = "Item code cell values (case-insensitive) marking template or unit rows rather than data"
    )]
    pub row_sentinels: Vec<String>,
}

impl Default for StatusLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Financial Status".to_string(),
            report_date_cell: CellRef::new(4, 1),
            header_first_row: 11,
            header_last_row: 14,
            data_start_row: 15,
            item_code_column: 0,
            data_type_column: 1,
            first_value_column: 2,
            row_sentinels: default_sentinels(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TimeSeriesLayout {
    #[schemars(
        description = "Sheets to read with this layout. Empty means every sheet except the status sheet."
    )]
    pub sheets: Vec<String>,

    pub report_date_cell: CellRef,

    #[schemars(description = "Row whose cells name the month of each column")]
    pub header_row: usize,

    pub data_start_row: usize,

    pub item_code_column: usize,

    pub data_type_column: usize,

    pub first_value_column: usize,

    pub row_sentinels: Vec<String>,
}

impl Default for TimeSeriesLayout {
    fn default() -> Self {
        Self {
            sheets: Vec::new(),
            report_date_cell: CellRef::new(4, 1),
            header_row: 10,
            data_start_row: 12,
            item_code_column: 0,
            data_type_column: 1,
            first_value_column: 2,
            row_sentinels: default_sentinels(),
        }
    }
}

fn default_sentinels() -> Vec<String> {
    ["Item", "Item Code", "Code", "Trade", "Description", "HK$", "HKD", "$", "$'000", "(HK$)"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NormalizerConfig {
    pub status: StatusLayout,

    pub time_series: TimeSeriesLayout,

    #[schemars(
        description = "First month of the fiscal year. Time-series months earlier than this belong to the following calendar year. 1 means calendar years."
    )]
    pub fiscal_year_start_month: u32,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            status: StatusLayout::default(),
            time_series: TimeSeriesLayout::default(),
            fiscal_year_start_month: 1,
        }
    }
}

impl NormalizerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        validate_month(self.fiscal_year_start_month)?;

        let status = &self.status;
        if status.header_last_row < status.header_first_row {
            return Err(FactResolverError::InvalidConfig(format!(
                "status header band is empty (rows {}..={})",
                status.header_first_row, status.header_last_row
            )));
        }
        if status.data_start_row <= status.header_last_row {
            return Err(FactResolverError::InvalidConfig(format!(
                "status data rows start at {} inside the header band ending at {}",
                status.data_start_row, status.header_last_row
            )));
        }
        if self.time_series.data_start_row <= self.time_series.header_row {
            return Err(FactResolverError::InvalidConfig(format!(
                "time-series data rows start at {} before the header row {}",
                self.time_series.data_start_row, self.time_series.header_row
            )));
        }
        Ok(())
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(NormalizerConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::json_schema())
    }
}

pub(crate) fn is_sentinel(sentinels: &[String], value: &str) -> bool {
    sentinels.iter().any(|s| s.eq_ignore_ascii_case(value))
}
