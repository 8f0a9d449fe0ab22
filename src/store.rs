//! Read-only fact store, typed filtering and candidate enumeration.

use crate::error::{FactResolverError, Result};
use crate::schema::{Fact, FactTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Year,
    Month,
    SheetName,
    FinancialType,
    ItemCode,
    DataType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterValue {
    One(Scalar),
    AnyOf(Vec<Scalar>),
}

impl FilterValue {
    fn accepts(&self, actual: &Scalar) -> bool {
        match self {
            FilterValue::One(expected) => expected == actual,
            FilterValue::AnyOf(options) => options.contains(actual),
        }
    }
}

/// Field → value-or-set predicate. Fields are ANDed, set members are ORed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactFilter {
    conditions: BTreeMap<Field, FilterValue>,
}

impl FactFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: Field, value: impl Into<Scalar>) -> Self {
        self.conditions
            .insert(field, FilterValue::One(value.into()));
        self
    }

    pub fn any_of<V: Into<Scalar>>(
        mut self,
        field: Field,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.insert(
            field,
            FilterValue::AnyOf(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, fact: &Fact) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| value.accepts(&field_value(fact, *field)))
    }

    pub fn apply<'a>(&self, facts: impl IntoIterator<Item = &'a Fact>) -> Vec<&'a Fact> {
        facts.into_iter().filter(|f| self.matches(f)).collect()
    }
}

fn field_value(fact: &Fact, field: Field) -> Scalar {
    match field {
        Field::Year => Scalar::Int(fact.year as i64),
        Field::Month => Scalar::Int(fact.month as i64),
        Field::SheetName => Scalar::Text(fact.sheet_name.clone()),
        Field::FinancialType => Scalar::Text(fact.financial_type.clone()),
        Field::ItemCode => Scalar::Text(fact.item_code.clone()),
        Field::DataType => Scalar::Text(fact.data_type.clone()),
    }
}

/// Which facts a query may see: one project, optionally one sheet, plus any
/// further field restrictions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub project: String,
    pub sheet: Option<String>,
    #[serde(default)]
    pub filter: FactFilter,
}

impl Scope {
    pub fn project(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            sheet: None,
            filter: FactFilter::default(),
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_filter(mut self, filter: FactFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Published fact tables keyed by project. Tables are immutable once
/// published; republishing a project swaps in a new table.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    tables: HashMap<String, Arc<FactTable>>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, project: impl Into<String>, table: FactTable) -> Arc<FactTable> {
        let table = Arc::new(table);
        self.tables.insert(project.into(), Arc::clone(&table));
        table
    }

    pub fn table(&self, project: &str) -> Result<Arc<FactTable>> {
        self.tables
            .get(project)
            .cloned()
            .ok_or_else(|| FactResolverError::UnknownProject(project.to_string()))
    }

    pub fn projects(&self) -> Vec<String> {
        let mut projects: Vec<String> = self.tables.keys().cloned().collect();
        projects.sort();
        projects
    }

    /// Facts visible to `scope`. Never crosses project boundaries.
    pub fn select(&self, scope: &Scope) -> Result<Vec<&Fact>> {
        let table = self
            .tables
            .get(&scope.project)
            .ok_or_else(|| FactResolverError::UnknownProject(scope.project.clone()))?;

        Ok(table
            .iter()
            .filter(|f| scope.sheet.as_ref().is_none_or(|s| f.sheet_name == *s))
            .filter(|f| scope.filter.matches(f))
            .collect())
    }
}

/// One grouped `(sheet, financial type, data type, item code, month)`
/// projection with its summed value and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub sheet_name: String,
    pub financial_type: String,
    pub data_type: String,
    pub item_code: String,
    pub month: u32,
    pub value: f64,
    pub score: i64,
    /// Number of query terms found in the financial or data type.
    pub matched_terms: usize,
    /// Facts summed into `value`.
    pub fact_count: usize,
}

impl Candidate {
    pub fn matches_fields(&self, financial_type: &str, data_type: &str, item_code: &str) -> bool {
        self.financial_type == financial_type
            && self.data_type == data_type
            && self.item_code == item_code
    }
}

type GroupKey = (String, String, String, String, u32);

/// Groups facts and sums values within each group. The sum is per group;
/// nothing accumulates across groups.
pub fn enumerate_candidates<'a>(facts: impl IntoIterator<Item = &'a Fact>) -> Vec<Candidate> {
    let mut groups: BTreeMap<GroupKey, (f64, usize)> = BTreeMap::new();
    for fact in facts {
        let key = (
            fact.sheet_name.clone(),
            fact.financial_type.clone(),
            fact.data_type.clone(),
            fact.item_code.clone(),
            fact.month,
        );
        let group = groups.entry(key).or_insert((0.0, 0));
        group.0 += fact.value;
        group.1 += 1;
    }

    groups
        .into_iter()
        .map(|(key, (value, fact_count))| {
            let (sheet_name, financial_type, data_type, item_code, month) = key;
            Candidate {
                sheet_name,
                financial_type,
                data_type,
                item_code,
                month,
                value,
                score: 0,
                matched_terms: 0,
                fact_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(sheet: &str, code: &str, month: u32, value: f64) -> Fact {
        Fact {
            year: 2024,
            month,
            sheet_name: sheet.to_string(),
            financial_type: sheet.to_string(),
            item_code: code.to_string(),
            data_type: "Site staff".to_string(),
            value,
        }
    }

    fn table() -> FactTable {
        vec![
            fact("Projection", "2.1.3", 5, 100.0),
            fact("Projection", "2.1.3", 6, 500.0),
            fact("Projection", "2.1.3", 6, 25.0),
            fact("Accrual", "2.1.3", 6, 40.0),
            fact("Accrual", "2", 6, 0.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_filter_and_across_fields_or_within_set() {
        let table = table();
        let filter = FactFilter::new()
            .eq(Field::SheetName, "Projection")
            .any_of(Field::Month, [5u32, 7u32]);
        let hits = filter.apply(&table);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].month, 5);

        assert_eq!(FactFilter::new().apply(&table).len(), 5);
        assert!(FactFilter::new()
            .eq(Field::Year, 2023)
            .apply(&table)
            .is_empty());
        // type mismatch never matches
        assert!(FactFilter::new()
            .eq(Field::Month, "6")
            .apply(&table)
            .is_empty());
    }

    #[test]
    fn test_enumerate_candidates_sums_per_group() {
        let table = table();
        let candidates = enumerate_candidates(&table);
        assert_eq!(candidates.len(), 4);

        let june_projection = candidates
            .iter()
            .find(|c| c.sheet_name == "Projection" && c.month == 6)
            .unwrap();
        assert_eq!(june_projection.value, 525.0);
        assert_eq!(june_projection.fact_count, 2);
        assert!(candidates.iter().all(|c| c.score == 0));
    }

    #[test]
    fn test_store_scope_isolation() {
        let mut store = FactStore::new();
        store.publish("A", table());
        store.publish("B", vec![fact("Projection", "9.9", 6, 1.0)].into_iter().collect());

        let b = store.select(&Scope::project("B")).unwrap();
        assert_eq!(b.len(), 1);
        assert!(b.iter().all(|f| f.item_code == "9.9"));

        let a_accrual = store
            .select(&Scope::project("A").with_sheet("Accrual"))
            .unwrap();
        assert_eq!(a_accrual.len(), 2);

        assert!(matches!(
            store.select(&Scope::project("C")),
            Err(FactResolverError::UnknownProject(_))
        ));
        assert_eq!(store.projects(), vec!["A", "B"]);
    }
}
