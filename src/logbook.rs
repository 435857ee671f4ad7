use crate::domain::ScoredOpportunity;
use chrono::NaiveDate;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const COLUMNS: [&str; 11] = [
    "date_found",
    "title",
    "solicitation_id",
    "naics",
    "agency",
    "estimated_value",
    "deadline",
    "score",
    "reasoning",
    "sam_url",
    "status",
];

#[derive(Debug, thiserror::Error)]
pub enum LogbookError {
    #[error("failed to write opportunity log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode opportunity log row: {0}")]
    Csv(#[from] csv::Error),
}

/// Append one row per scored record for this run. The header is written only
/// when the file does not exist yet. The whole batch is serialized to memory
/// first and appended with a single write so a crash mid-run cannot leave a
/// partially logged batch. Zero records means no append and no file creation.
pub fn append_run(
    path: &Path,
    scored: &[ScoredOpportunity],
    date_found: NaiveDate,
) -> Result<usize, LogbookError> {
    if scored.is_empty() {
        return Ok(0);
    }

    let write_header = !path.exists();

    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        if write_header {
            writer.write_record(COLUMNS)?;
        }
        for pair in scored {
            writer.write_record(&[
                date_found.to_string(),
                pair.opportunity.title.clone(),
                pair.opportunity
                    .solicitation_number
                    .clone()
                    .unwrap_or_default(),
                pair.opportunity.naics.clone(),
                pair.opportunity.agency.clone(),
                pair.opportunity
                    .estimated_value
                    .map(|value| value.label())
                    .unwrap_or_default(),
                pair.opportunity
                    .deadline
                    .map(|date| date.to_string())
                    .unwrap_or_default(),
                pair.result.score.to_string(),
                pair.result.reasoning.clone(),
                pair.opportunity.sam_url.clone(),
                "new".to_string(),
            ])?;
        }
        writer.flush()?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(&buffer)?;
    file.flush()?;

    Ok(scored.len())
}
