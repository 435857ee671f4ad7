use crate::domain::{ReportRow, ScoredOpportunity};
use std::cmp::Ordering;

/// Select the report set: every pair scoring at or above the threshold,
/// ordered by score descending. Ties go to the soonest known deadline;
/// deadline-unknown records sort after deadline-known ones at equal scores.
pub fn select_report_rows(scored: &[ScoredOpportunity], threshold: u8) -> Vec<ReportRow> {
    let mut selected: Vec<&ScoredOpportunity> = scored
        .iter()
        .filter(|pair| pair.result.score >= threshold)
        .collect();

    selected.sort_by(|a, b| rank_order(a, b));
    selected.into_iter().map(ReportRow::from_pair).collect()
}

fn rank_order(a: &ScoredOpportunity, b: &ScoredOpportunity) -> Ordering {
    b.result
        .score
        .cmp(&a.result.score)
        .then_with(|| match (a.opportunity.deadline, b.opportunity.deadline) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
