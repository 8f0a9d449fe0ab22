//! Flat tabular export of a fact table, one record per fact with the
//! canonical column names.

use crate::error::{FactResolverError, Result};
use crate::schema::{Fact, FactTable};
use crate::utils::validate_month;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Sheet_Name")]
    pub sheet_name: String,
    #[serde(rename = "Financial_Type")]
    pub financial_type: String,
    #[serde(rename = "Item_Code")]
    pub item_code: String,
    #[serde(rename = "Data_Type")]
    pub data_type: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

impl From<&Fact> for FlatRow {
    fn from(f: &Fact) -> Self {
        Self {
            year: f.year,
            month: f.month,
            sheet_name: f.sheet_name.clone(),
            financial_type: f.financial_type.clone(),
            item_code: f.item_code.clone(),
            data_type: f.data_type.clone(),
            value: f.value,
        }
    }
}

impl From<FlatRow> for Fact {
    fn from(r: FlatRow) -> Self {
        Self {
            year: r.year,
            month: r.month,
            sheet_name: r.sheet_name,
            financial_type: r.financial_type,
            item_code: r.item_code,
            data_type: r.data_type,
            value: r.value,
        }
    }
}

pub fn flat_export(table: &FactTable) -> Vec<FlatRow> {
    table.iter().map(FlatRow::from).collect()
}

/// Writes the table as CSV with a header row, in table order.
pub fn write_flat_csv<W: Write>(table: &FactTable, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in flat_export(table) {
        csv.serialize(row)?;
    }
    csv.flush()?;
    debug!("Wrote {} fact rows as CSV", table.len());
    Ok(())
}

/// Reads a previously exported table. Rows with an empty item code or an
/// out-of-range month are rejected.
pub fn read_flat_csv<R: Read>(reader: R) -> Result<FactTable> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut facts = Vec::new();

    for (i, record) in csv.deserialize::<FlatRow>().enumerate() {
        let row = record?;
        if row.item_code.trim().is_empty() {
            return Err(FactResolverError::InvalidRow {
                row: i + 1,
                details: "empty item code".to_string(),
            });
        }
        validate_month(row.month).map_err(|e| FactResolverError::InvalidRow {
            row: i + 1,
            details: e.to_string(),
        })?;
        facts.push(Fact::from(row));
    }

    Ok(facts.into_iter().collect())
}
