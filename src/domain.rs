use chrono::{DateTime, NaiveDate};
use serde::Serialize;

/// One solicitation fetched from the search API, normalized to the fields the
/// pipeline consumes. Immutable once constructed; owned by the run.
#[derive(Debug, Clone)]
pub struct Opportunity {
    /// Upstream listing key. May be empty when the source omits it.
    pub notice_id: String,
    pub solicitation_number: Option<String>,
    pub title: String,
    pub agency: String,
    pub naics: String,
    pub posted_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub estimated_value: Option<ValueRange>,
    /// Requirement text, sent verbatim as scoring input.
    pub description: String,
    pub sam_url: String,
}

/// Estimated contract value in dollars, when the listing states one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub low: f64,
    pub high: f64,
}

impl ValueRange {
    pub fn label(&self) -> String {
        format!("${:.0}-${:.0}", self.low, self.high)
    }
}

/// Model-assigned fitness score for exactly one opportunity.
///
/// Score 0 is the sentinel for "the model response had no usable entry for
/// this record"; real scores are clamped into 1..=10.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    pub score: u8,
    pub reasoning: String,
    pub key_requirements: String,
}

impl ScoreResult {
    pub const NOT_SCORED: &'static str = "not scored";

    pub fn sentinel() -> Self {
        Self {
            score: 0,
            reasoning: Self::NOT_SCORED.to_string(),
            key_requirements: String::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.score == 0
    }
}

/// An opportunity paired with its score. After scoring completes, every
/// fetched opportunity appears in exactly one of these.
#[derive(Debug, Clone)]
pub struct ScoredOpportunity {
    pub opportunity: Opportunity,
    pub result: ScoreResult,
}

/// Flattened view of a report-worthy scored opportunity. Created after
/// filtering, consumed by the report renderer, not retained.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub title: String,
    pub agency: String,
    pub solicitation_number: Option<String>,
    pub naics: String,
    pub deadline: Option<NaiveDate>,
    pub estimated_value: Option<String>,
    pub score: u8,
    pub reasoning: String,
    pub key_requirements: String,
    pub sam_url: String,
}

impl ReportRow {
    pub fn from_pair(pair: &ScoredOpportunity) -> Self {
        Self {
            title: pair.opportunity.title.clone(),
            agency: pair.opportunity.agency.clone(),
            solicitation_number: pair.opportunity.solicitation_number.clone(),
            naics: pair.opportunity.naics.clone(),
            deadline: pair.opportunity.deadline,
            estimated_value: pair.opportunity.estimated_value.map(|value| value.label()),
            score: pair.result.score,
            reasoning: pair.result.reasoning.clone(),
            key_requirements: pair.result.key_requirements.clone(),
            sam_url: pair.opportunity.sam_url.clone(),
        }
    }
}

/// Parse the date formats the source API mixes freely: RFC 3339 timestamps,
/// plain ISO dates, and US-style `MM/DD/YYYY`.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    NaiveDate::parse_from_str(trimmed, "%m/%d/%Y").ok()
}
