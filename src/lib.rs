//! # Financial Fact Resolver
//!
//! Turns construction-project financial report workbooks into one flat table
//! of facts and answers loosely-worded questions against it.
//!
//! ## Core Concepts
//!
//! - **Fact**: one `(year, month, sheet, financial type, item code, data type, value)`
//!   observation read from a workbook
//! - **Status sheet**: the consolidated sheet whose merged header band names a
//!   report classification per column
//! - **Time-series sheets**: one sheet per classification with one column per month
//! - **Candidate**: a grouped, scored projection of facts proposed as an answer
//! - **Preference**: a user-confirmed query → candidate mapping that biases
//!   later scoring
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_fact_resolver::*;
//!
//! let workbook = load_workbook("reports/P-1024_2024-06.xlsx")?; // feature "xlsx"
//! let mut service = FactResolverService::new(NormalizerConfig::default(), ResolverConfig::default())?;
//! let report = service.ingest("P-1024", &workbook);
//! for warning in &report.warnings {
//!     eprintln!("{}", warning);
//! }
//!
//! let prefs = PreferenceStore::json_file("prefs/P-1024.json");
//! let context = QueryContext::at(report.base_period);
//! match service.query(&Scope::project("P-1024"), "What is the GP?", &context, &prefs)? {
//!     QueryOutcome::Answer(answer) => println!("{}", answer.text),
//!     QueryOutcome::Ambiguous(candidates) => {
//!         let chosen = Selection::from(&candidates[0]);
//!         let answer = service.resolve(&Scope::project("P-1024"), "What is the GP?", &chosen, &prefs)?;
//!         println!("{}", answer.text);
//!     }
//!     other => println!("{:?}", other),
//! }
//! ```

pub mod error;
pub mod export;
pub mod grid;
pub mod header;
pub mod layout;
pub mod preferences;
pub mod resolver;
pub mod schema;
pub mod sheet;
pub mod store;
pub mod text;
pub mod utils;
pub mod workbook;

#[cfg(feature = "xlsx")]
pub mod xlsx;

pub use error::{FactResolverError, Result};
pub use export::{flat_export, read_flat_csv, write_flat_csv, FlatRow};
pub use grid::{Cell, CellGrid, InMemoryWorkbook, Workbook};
pub use header::trace_header;
pub use layout::{CellRef, NormalizerConfig, StatusLayout, TimeSeriesLayout};
pub use preferences::{
    normalize_query_key, JsonFileBackend, MemoryBackend, PreferenceBackend, PreferenceEntry,
    PreferenceMap, PreferenceStore,
};
pub use resolver::{
    format_amount, Answer, CategoryBreakdown, QueryContext, QueryOutcome, Resolver,
    ResolverConfig, Selection,
};
pub use schema::*;
pub use store::{
    enumerate_candidates, Candidate, FactFilter, FactStore, Field, Scalar, Scope,
};
pub use utils::Period;
pub use workbook::{extract_project_info, normalize, NormalizedWorkbook, ProjectInfo};

#[cfg(feature = "xlsx")]
pub use xlsx::load_workbook;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What ingesting one project's workbook produced, minus the facts
/// themselves (those are published to the store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub project: String,
    pub summary: TableSummary,
    pub warnings: Vec<Warning>,
    pub base_period: Option<Period>,
    pub project_info: ProjectInfo,
}

/// Holds the published fact tables of every ingested project together with
/// the configuration used to build and query them.
pub struct FactResolverService {
    normalizer: NormalizerConfig,
    resolver: Resolver,
    store: FactStore,
}

impl FactResolverService {
    pub fn new(normalizer: NormalizerConfig, resolver: ResolverConfig) -> Result<Self> {
        normalizer.validate()?;
        Ok(Self {
            normalizer,
            resolver: Resolver::new(resolver),
            store: FactStore::new(),
        })
    }

    /// Normalizes `workbook` to completion, then publishes its table under
    /// `project`, replacing any earlier table for that project.
    pub fn ingest(&mut self, project: &str, workbook: &dyn Workbook) -> IngestReport {
        let normalized = normalize(workbook, &self.normalizer);
        self.publish(project, normalized)
    }

    /// Publishes a workbook that was normalized elsewhere, e.g. on another
    /// thread.
    pub fn publish(&mut self, project: &str, normalized: NormalizedWorkbook) -> IngestReport {
        let summary = normalized.facts.summary();
        info!(
            "Publishing {} facts for project '{}' ({} warnings)",
            summary.rows,
            project,
            normalized.warnings.len()
        );
        self.store.publish(project, normalized.facts);
        IngestReport {
            project: project.to_string(),
            summary,
            warnings: normalized.warnings,
            base_period: normalized.base_period,
            project_info: normalized.project_info,
        }
    }

    pub fn table(&self, project: &str) -> Result<Arc<FactTable>> {
        self.store.table(project)
    }

    pub fn store(&self) -> &FactStore {
        &self.store
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn query(
        &self,
        scope: &Scope,
        query: &str,
        context: &QueryContext,
        preferences: &PreferenceStore,
    ) -> Result<QueryOutcome> {
        debug!("Query for project '{}': {}", scope.project, query);
        let context = QueryContext {
            fiscal_year_start_month: self.normalizer.fiscal_year_start_month,
            ..*context
        };
        self.resolver
            .query(&self.store, scope, query, &context, preferences)
    }

    pub fn resolve(
        &self,
        scope: &Scope,
        query: &str,
        selection: &Selection,
        preferences: &PreferenceStore,
    ) -> Result<Answer> {
        self.resolver
            .resolve(&self.store, scope, query, selection, preferences)
    }

    pub fn flat_export(&self, project: &str) -> Result<Vec<FlatRow>> {
        let table = self.store.table(project)?;
        Ok(flat_export(&table))
    }
}

/// Validates `config` and normalizes one workbook.
pub fn normalize_workbook(
    workbook: &dyn Workbook,
    config: &NormalizerConfig,
) -> Result<NormalizedWorkbook> {
    config.validate()?;
    Ok(normalize(workbook, config))
}
