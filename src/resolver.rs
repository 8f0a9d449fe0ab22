//! Scores candidate groupings against a free-text question and resolves it
//! to an answer, a disambiguation list, or a per-classification breakdown.

use crate::error::Result;
use crate::preferences::{normalize_query_key, PreferenceEntry, PreferenceStore};
use crate::schema::{code_within, Fact};
use crate::store::{enumerate_candidates, Candidate, FactStore, Scope};
use crate::text::{contains_phrase, expand_acronyms, month_in_text, query_terms, words};
use crate::utils::{fiscal_calendar_year, month_abbreviation, Period};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const WORD_MATCH_SCORE: i64 = 10;
pub const KEYWORD_BONUS: i64 = 30;
pub const PHRASE_BONUS: i64 = 20;
pub const ITEM_CODE_HINT_BONUS: i64 = 5;
pub const PREFERENCE_BONUS: i64 = 200;
pub const FULL_COVERAGE_BONUS: i64 = 30;

/// A qualifier word that points at an item-code class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCodeHint {
    pub qualifier: String,
    pub item_code_prefix: String,
}

/// A query keyword that earns a bonus when the candidate's financial type
/// carries `financial_type_marker`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordBonus {
    pub keyword: String,
    pub financial_type_marker: String,
}

/// A category name that maps onto an item-code prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySynonym {
    pub synonym: String,
    pub item_code_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub acronyms: BTreeMap<String, String>,
    pub stop_words: Vec<String>,
    pub item_code_hints: Vec<ItemCodeHint>,
    pub keyword_bonuses: Vec<KeywordBonus>,
    pub phrases: Vec<String>,
    pub categories: Vec<CategorySynonym>,
    pub monthly_keyword: String,
    pub candidate_limit: usize,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let acronyms = [
            ("gp", "gross profit"),
            ("np", "net profit"),
            ("vo", "variation order"),
            ("vos", "variation orders"),
            ("ce", "compensation event"),
            ("bp", "business plan"),
            ("cf", "cash flow"),
            ("eot", "extension of time"),
            ("prelim", "preliminaries"),
            ("prelims", "preliminaries"),
            ("subcon", "subcontractor"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let item_code_hints = [("net", "5"), ("adjusted", "4"), ("gross", "3")]
            .iter()
            .map(|(q, p)| ItemCodeHint {
                qualifier: q.to_string(),
                item_code_prefix: p.to_string(),
            })
            .collect();

        let keyword_bonuses = [
            ("projection", "projection"),
            ("projected", "projection"),
            ("budget", "budget"),
            ("committed", "committed"),
            ("commitment", "committed"),
            ("commitments", "committed"),
            ("accrual", "accrual"),
            ("accrued", "accrual"),
            ("cash", "cash flow"),
            ("wip", "wip"),
            ("audit", "audit"),
            ("business", "business plan"),
        ]
        .iter()
        .map(|(k, m)| KeywordBonus {
            keyword: k.to_string(),
            financial_type_marker: m.to_string(),
        })
        .collect();

        let categories = [
            ("income", "1"),
            ("cost", "2"),
            ("costs", "2"),
            ("preliminaries", "2.1"),
            ("materials", "2.2"),
            ("labour", "2.3"),
            ("plant", "2.4"),
            ("subcontractor", "2.5"),
            ("subcontract", "2.5"),
        ]
        .iter()
        .map(|(s, p)| CategorySynonym {
            synonym: s.to_string(),
            item_code_prefix: p.to_string(),
        })
        .collect();

        Self {
            acronyms,
            stop_words: owned(&[
                "what", "what's", "whats", "is", "are", "was", "were", "the", "of", "for", "in",
                "on", "at", "by", "to", "an", "and", "me", "my", "our", "show", "tell", "give",
                "get", "how", "much", "many", "please", "value", "amount", "this", "that",
                "there", "do", "does", "we", "have", "has", "it", "its", "as", "about", "which",
                "can", "you", "current",
            ]),
            item_code_hints,
            keyword_bonuses,
            phrases: owned(&[
                "gross profit",
                "net profit",
                "total income",
                "total cost",
                "cash flow",
                "business plan",
                "budget revision",
                "committed cost",
                "variation order",
                "compensation event",
                "audit report",
                "extension of time",
                "contract sum",
            ]),
            categories,
            monthly_keyword: "monthly".to_string(),
            candidate_limit: 10,
        }
    }
}

impl ResolverConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Caller-held context for a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    /// The reporting period currently selected by the caller; used when a
    /// monthly category question names no month, and to pick the month of a
    /// remembered line item.
    pub current_period: Option<Period>,
    /// First month of the fiscal year the facts were normalized with.
    pub fiscal_year_start_month: u32,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self {
            current_period: None,
            fiscal_year_start_month: 1,
        }
    }
}

impl QueryContext {
    pub fn at(current_period: Option<Period>) -> Self {
        Self {
            current_period,
            ..Self::default()
        }
    }
}

/// The identifying fields of a candidate chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub sheet_name: String,
    pub financial_type: String,
    pub data_type: String,
    pub item_code: String,
    pub month: u32,
}

impl From<&Candidate> for Selection {
    fn from(c: &Candidate) -> Self {
        Self {
            sheet_name: c.sheet_name.clone(),
            financial_type: c.financial_type.clone(),
            data_type: c.data_type.clone(),
            item_code: c.item_code.clone(),
            month: c.month,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub query: String,
    pub selection: Selection,
    pub value: f64,
    pub fact_count: usize,
    /// `None` when nothing was confirmed (auto-resolved answers), otherwise
    /// whether the confirmation reached the preference store.
    pub preference_saved: Option<bool>,
    pub text: String,
}

/// Per-classification subtotals for one item-code category in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub item_code_prefix: String,
    pub period: Period,
    pub subtotals: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryOutcome {
    Answer(Answer),
    /// Several candidates scored; ranked best first.
    Ambiguous(Vec<Candidate>),
    Breakdown(CategoryBreakdown),
    /// Facts exist in scope but none scored against the query.
    NoMatch { query: String },
    /// The scope holds no facts at all.
    NoData { query: String },
}

/// Parsed form of a query, computed once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub raw_key: String,
    pub expanded_key: String,
    pub words: Vec<String>,
    pub terms: Vec<String>,
    pub month: Option<u32>,
    pub hint_prefixes: Vec<String>,
}

impl ParsedQuery {
    /// Keys under which a preference for this query is stored: the raw
    /// normalized text, plus the expanded text when expansion changed it.
    pub fn preference_keys(&self) -> Vec<String> {
        if self.expanded_key == self.raw_key {
            vec![self.raw_key.clone()]
        } else {
            vec![self.raw_key.clone(), self.expanded_key.clone()]
        }
    }
}

pub struct Resolver {
    config: ResolverConfig,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn parse(&self, query: &str) -> ParsedQuery {
        let raw_key = normalize_query_key(query);
        let expanded_key = expand_acronyms(&raw_key, &self.config.acronyms);
        let words = words(&expanded_key);
        let hint_prefixes = self
            .config
            .item_code_hints
            .iter()
            .filter(|h| words.iter().any(|w| *w == h.qualifier))
            .map(|h| h.item_code_prefix.clone())
            .collect();

        let mut terms = query_terms(&raw_key, &self.config.acronyms, &self.config.stop_words);
        terms.retain(|t| *t != self.config.monthly_keyword);

        ParsedQuery {
            terms,
            month: month_in_text(&raw_key),
            raw_key,
            expanded_key,
            words,
            hint_prefixes,
        }
    }

    /// Returns `(score, matched term count)` for one candidate.
    pub fn score_candidate(
        &self,
        candidate: &Candidate,
        query: &ParsedQuery,
        preference: Option<&PreferenceEntry>,
    ) -> (i64, usize) {
        let financial_type = candidate.financial_type.to_lowercase();
        let data_type = candidate.data_type.to_lowercase();
        let mut score = 0;
        let mut matched = 0;

        for term in &query.terms {
            let in_type = financial_type.contains(term.as_str());
            let in_data = data_type.contains(term.as_str());
            if in_type {
                score += WORD_MATCH_SCORE;
            }
            if in_data {
                score += WORD_MATCH_SCORE;
            }
            if in_type || in_data {
                matched += 1;
            }
        }

        for bonus in &self.config.keyword_bonuses {
            if query.words.iter().any(|w| *w == bonus.keyword)
                && financial_type.contains(&bonus.financial_type_marker)
            {
                score += KEYWORD_BONUS;
            }
        }

        for phrase in &self.config.phrases {
            if query.expanded_key.contains(phrase.as_str())
                && (financial_type.contains(phrase.as_str()) || data_type.contains(phrase.as_str()))
            {
                score += PHRASE_BONUS;
            }
        }

        if query
            .hint_prefixes
            .iter()
            .any(|prefix| code_within(&candidate.item_code, prefix))
        {
            score += ITEM_CODE_HINT_BONUS;
        }

        if let Some(pref) = preference {
            if candidate.matches_fields(&pref.financial_type, &pref.data_type, &pref.item_code) {
                score += PREFERENCE_BONUS;
            }
        }

        if !query.terms.is_empty() && matched == query.terms.len() {
            score += FULL_COVERAGE_BONUS;
        }

        (score, matched)
    }

    /// Scores, drops zero scores and sorts by `(score desc, matched terms desc)`.
    /// Ties keep enumeration order.
    pub fn rank(
        &self,
        candidates: Vec<Candidate>,
        query: &ParsedQuery,
        preference: Option<&PreferenceEntry>,
    ) -> Vec<Candidate> {
        let mut ranked: Vec<Candidate> = candidates
            .into_iter()
            .filter_map(|mut c| {
                let (score, matched) = self.score_candidate(&c, query, preference);
                c.score = score;
                c.matched_terms = matched;
                (score > 0).then_some(c)
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.matched_terms.cmp(&a.matched_terms))
        });
        ranked
    }

    pub fn query(
        &self,
        store: &FactStore,
        scope: &Scope,
        query: &str,
        context: &QueryContext,
        preferences: &PreferenceStore,
    ) -> Result<QueryOutcome> {
        let facts = store.select(scope)?;
        if facts.is_empty() {
            info!("No facts in scope for project '{}'", scope.project);
            return Ok(QueryOutcome::NoData {
                query: query.to_string(),
            });
        }

        let parsed = self.parse(query);

        if let Some(breakdown) = self.category_breakdown(&facts, &parsed, context) {
            return Ok(QueryOutcome::Breakdown(breakdown));
        }

        let in_month: Vec<&Fact> = match parsed.month {
            Some(month) => facts.iter().copied().filter(|f| f.month == month).collect(),
            None => facts,
        };

        let preference = preferences.get_any(&parsed.preference_keys());
        let ranked = self.rank(enumerate_candidates(in_month), &parsed, preference.as_ref());
        debug!(
            "Query '{}' (terms {:?}) scored {} candidates",
            parsed.raw_key,
            parsed.terms,
            ranked.len()
        );

        if ranked.is_empty() {
            return Ok(QueryOutcome::NoMatch {
                query: query.to_string(),
            });
        }

        let preferred: Vec<&Candidate> = ranked
            .iter()
            .filter(|c| c.score >= PREFERENCE_BONUS)
            .collect();
        let chosen = match (ranked.len(), preferred.as_slice()) {
            (1, _) => Some(&ranked[0]),
            (_, []) => None,
            (_, several) => pick_remembered(several, context),
        };

        if let Some(candidate) = chosen {
            let selection = Selection::from(candidate);
            let answer = self.answer(
                &parsed,
                query,
                selection,
                candidate.value,
                candidate.fact_count,
                None,
            );
            return Ok(QueryOutcome::Answer(answer));
        }

        let mut ranked = ranked;
        ranked.truncate(self.config.candidate_limit);
        Ok(QueryOutcome::Ambiguous(ranked))
    }

    /// Aggregates the chosen field combination and records the choice for
    /// both the raw and the acronym-expanded query text.
    pub fn resolve(
        &self,
        store: &FactStore,
        scope: &Scope,
        query: &str,
        selection: &Selection,
        preferences: &PreferenceStore,
    ) -> Result<Answer> {
        let facts = store.select(scope)?;
        let matching: Vec<&Fact> = facts
            .into_iter()
            .filter(|f| {
                f.sheet_name == selection.sheet_name
                    && f.financial_type == selection.financial_type
                    && f.data_type == selection.data_type
                    && f.item_code == selection.item_code
                    && f.month == selection.month
            })
            .collect();
        let value: f64 = matching.iter().map(|f| f.value).sum();

        let parsed = self.parse(query);
        let entry = PreferenceEntry {
            normalized_query: parsed.raw_key.clone(),
            financial_type: selection.financial_type.clone(),
            data_type: selection.data_type.clone(),
            item_code: selection.item_code.clone(),
        };
        let saved = match preferences.put_all(&parsed.preference_keys(), entry) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not persist preference for '{}': {}", parsed.raw_key, e);
                false
            }
        };

        Ok(self.answer(
            &parsed,
            query,
            selection.clone(),
            value,
            matching.len(),
            Some(saved),
        ))
    }

    fn answer(
        &self,
        parsed: &ParsedQuery,
        query: &str,
        selection: Selection,
        value: f64,
        fact_count: usize,
        preference_saved: Option<bool>,
    ) -> Answer {
        let text = format!(
            "{} - {} (item {}, {}, sheet '{}'): {}",
            selection.financial_type,
            selection.data_type,
            selection.item_code,
            month_abbreviation(selection.month),
            selection.sheet_name,
            format_amount(value)
        );
        info!("Resolved '{}' -> {}", parsed.raw_key, text);
        Answer {
            query: query.to_string(),
            selection,
            value,
            fact_count,
            preference_saved,
            text,
        }
    }

    /// Most specific category named in the query, if the query asks for a
    /// monthly breakdown.
    fn requested_category(&self, parsed: &ParsedQuery) -> Option<&CategorySynonym> {
        if !parsed.words.iter().any(|w| *w == self.config.monthly_keyword) {
            return None;
        }
        self.config
            .categories
            .iter()
            .filter(|c| contains_phrase(&parsed.expanded_key, &c.synonym))
            .max_by_key(|c| (c.item_code_prefix.len(), c.synonym.len()))
    }

    /// "monthly <category>" questions bypass scoring: each classification
    /// sheet gets its own subtotal for the category's item codes in one
    /// month. Classifications are reporting stages, so they are never summed
    /// together.
    pub fn category_breakdown(
        &self,
        facts: &[&Fact],
        parsed: &ParsedQuery,
        context: &QueryContext,
    ) -> Option<CategoryBreakdown> {
        let category = self.requested_category(parsed)?;
        let classification_facts: Vec<&Fact> = facts
            .iter()
            .copied()
            .filter(|f| f.sheet_name == f.financial_type)
            .collect();

        let period = match (parsed.month, context.current_period) {
            (Some(month), Some(current)) => Period {
                year: fiscal_calendar_year(current, context.fiscal_year_start_month, month),
                month,
            },
            (None, Some(current)) => current,
            (Some(month), None) => Period {
                year: classification_facts
                    .iter()
                    .filter(|f| f.month == month)
                    .map(|f| f.year)
                    .max()?,
                month,
            },
            (None, None) => classification_facts
                .iter()
                .map(|f| Period {
                    year: f.year,
                    month: f.month,
                })
                .max()?,
        };

        let mut subtotals: BTreeMap<String, f64> = BTreeMap::new();
        for fact in classification_facts {
            if fact.year == period.year
                && fact.month == period.month
                && fact.item_code_within(&category.item_code_prefix)
            {
                *subtotals.entry(fact.financial_type.clone()).or_insert(0.0) += fact.value;
            }
        }

        info!(
            "Monthly '{}' (prefix {}) for {}: {} classifications",
            category.synonym,
            category.item_code_prefix,
            period,
            subtotals.len()
        );
        Some(CategoryBreakdown {
            category: category.synonym.clone(),
            item_code_prefix: category.item_code_prefix.clone(),
            period,
            subtotals,
        })
    }
}

/// A preference names a line item, not a month, so on a monthly sheet it
/// matches every month column. Picks the current month, else the latest,
/// favouring classification sheets over the status sheet.
fn pick_remembered<'a>(
    preferred: &[&'a Candidate],
    context: &QueryContext,
) -> Option<&'a Candidate> {
    let current_month = context.current_period.map(|p| p.month);
    preferred.iter().copied().max_by_key(|c| {
        (
            Some(c.month) == current_month,
            c.sheet_name == c.financial_type,
            c.month,
        )
    })
}

/// `1234567.891` → `"1,234,567.89"`.
pub fn format_amount(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((&rounded, "00"));
    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(financial_type: &str, data_type: &str, item_code: &str) -> Candidate {
        Candidate {
            sheet_name: financial_type.to_string(),
            financial_type: financial_type.to_string(),
            data_type: data_type.to_string(),
            item_code: item_code.to_string(),
            month: 6,
            value: 0.0,
            score: 0,
            matched_terms: 0,
            fact_count: 1,
        }
    }

    #[test]
    fn test_gp_example_scores_sixty() {
        let resolver = Resolver::default();
        let parsed = resolver.parse("What is the GP?");
        assert_eq!(parsed.terms, vec!["gross profit"]);
        assert_eq!(parsed.expanded_key, "what is the gross profit?");

        let gp = candidate("Projection", "Gross Profit", "6");
        let np = candidate("Projection", "Net Profit", "7");
        assert_eq!(resolver.score_candidate(&gp, &parsed, None), (60, 1));
        assert_eq!(resolver.score_candidate(&np, &parsed, None).0, 0);

        let ranked = resolver.rank(vec![np, gp], &parsed, None);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].data_type, "Gross Profit");
    }

    #[test]
    fn test_item_code_hint_adds_small_bonus() {
        let resolver = Resolver::default();
        let parsed = resolver.parse("gross profit");
        let in_class = candidate("Projection", "Gross Profit", "3");
        let out_of_class = candidate("Projection", "Gross Profit", "5");
        let (a, _) = resolver.score_candidate(&in_class, &parsed, None);
        let (b, _) = resolver.score_candidate(&out_of_class, &parsed, None);
        assert_eq!(a - b, ITEM_CODE_HINT_BONUS);
        assert!(b > 0, "hint never excludes a candidate");
    }

    #[test]
    fn test_keyword_bonus() {
        let resolver = Resolver::default();
        let parsed = resolver.parse("projection gross profit");
        let projection = candidate("Projection", "Gross Profit", "6");
        let accrual = candidate("Accrual", "Gross Profit", "6");
        let (p, _) = resolver.score_candidate(&projection, &parsed, None);
        let (a, _) = resolver.score_candidate(&accrual, &parsed, None);
        // word match on the financial type, keyword bonus, full coverage
        assert_eq!(p - a, WORD_MATCH_SCORE + KEYWORD_BONUS + FULL_COVERAGE_BONUS);
    }

    #[test]
    fn test_preference_dominates() {
        let resolver = Resolver::default();
        let parsed = resolver.parse("gross profit");
        let first = candidate("Projection", "Gross Profit", "6");
        let second = candidate("Accrual", "Gross Profit", "6");
        let pref = PreferenceEntry {
            normalized_query: "gross profit".to_string(),
            financial_type: "Accrual".to_string(),
            data_type: "Gross Profit".to_string(),
            item_code: "6".to_string(),
        };

        let without = resolver.rank(vec![first.clone(), second.clone()], &parsed, None);
        assert_eq!(without[0].score, without[1].score);

        let with = resolver.rank(vec![first, second], &parsed, Some(&pref));
        assert_eq!(with[0].financial_type, "Accrual");
        assert!(with[0].score > with[1].score);
        assert_eq!(with[0].score - with[1].score, PREFERENCE_BONUS);
    }

    #[test]
    fn test_rank_tie_breaks_on_matched_terms() {
        let resolver = Resolver::new(ResolverConfig {
            phrases: Vec::new(),
            keyword_bonuses: Vec::new(),
            ..ResolverConfig::default()
        });
        let parsed = resolver.parse("site staff cost");
        // "cost" twice vs "site" and "staff" once each: both 20 before coverage.
        let double = candidate("Committed Cost", "Cost", "2.1");
        let spread = candidate("Accrual", "Site staff", "2.1");
        let ranked = resolver.rank(vec![double, spread], &parsed, None);
        assert_eq!(ranked[0].score, ranked[1].score);
        assert_eq!(ranked[0].data_type, "Site staff");
        assert_eq!(ranked[0].matched_terms, 2);
    }

    #[test]
    fn test_preference_keys() {
        let resolver = Resolver::default();
        assert_eq!(
            resolver.parse("  GP ").preference_keys(),
            vec!["gp".to_string(), "gross profit".to_string()]
        );
        assert_eq!(
            resolver.parse("Total Cost").preference_keys(),
            vec!["total cost".to_string()]
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(-500.0), "-500.00");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.999), "1,000.00");
    }

    #[test]
    fn test_monthly_keyword_is_not_a_term() {
        let resolver = Resolver::default();
        let parsed = resolver.parse("monthly gross profit");
        assert_eq!(parsed.terms, vec!["gross", "profit"]);

        let gp = candidate("Projection", "Gross Profit", "6");
        let (score, matched) = resolver.score_candidate(&gp, &parsed, None);
        assert_eq!(matched, 2);
        assert_eq!(score, 10 + 10 + PHRASE_BONUS + FULL_COVERAGE_BONUS);
    }

    #[test]
    fn test_pick_remembered_month() {
        let mut april = candidate("Projection", "Site staff", "2.1.3");
        april.month = 4;
        let mut june = candidate("Projection", "Site staff", "2.1.3");
        june.month = 6;
        let mut status = candidate("Projection", "Site staff", "2.1.3");
        status.sheet_name = "Financial Status".to_string();
        status.month = 6;
        let preferred = vec![&april, &status, &june];

        let at_april = QueryContext::at(Some(Period { year: 2024, month: 4 }));
        assert_eq!(pick_remembered(&preferred, &at_april).unwrap().month, 4);

        let latest = pick_remembered(&preferred, &QueryContext::default()).unwrap();
        assert_eq!(latest.month, 6);
        assert_eq!(latest.sheet_name, "Projection");
    }

    #[test]
    fn test_config_from_partial_json() {
        let config =
            ResolverConfig::from_json_str(r#"{ "candidate_limit": 3, "acronyms": { "tc": "total cost" } }"#)
                .unwrap();
        assert_eq!(config.candidate_limit, 3);
        assert_eq!(config.acronyms.len(), 1);
        assert_eq!(config.monthly_keyword, "monthly");
    }
}
