use crate::clients::claude::{ModelError, ScoreModel};
use crate::domain::{Opportunity, ScoreResult, ScoredOpportunity};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

/// Qualitative signals the model weighs when scoring a batch. Not a numeric
/// formula; the lists are rendered into the prompt verbatim.
#[derive(Debug, Clone)]
pub struct ScoringRubric {
    pub engagement_types: Vec<&'static str>,
    pub boost_keywords: Vec<&'static str>,
    pub red_flags: Vec<&'static str>,
    /// Contract value sweet-spot in dollars.
    pub value_band: (u32, u32),
    /// Minimum days between the run date and the response deadline.
    pub min_lead_days: u32,
}

impl ScoringRubric {
    /// The fixed rubric for the consulting practice this job scouts for.
    pub fn consulting() -> Self {
        Self {
            engagement_types: vec![
                "consulting",
                "training",
                "research",
                "assessments",
            ],
            boost_keywords: vec![
                "process improvement",
                "Agile",
                "consulting",
                "assessment",
                "recommendations",
                "training",
                "facilitation",
                "strategic planning",
            ],
            red_flags: vec![
                "staff augmentation or body-shop contracts",
                "full-time on-site requirements",
                "security clearance requirements",
                "very large or very small dollar values outside the sweet-spot",
            ],
            value_band: (75_000, 250_000),
            min_lead_days: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("scoring model call failed: {0}")]
    Model(#[from] ModelError),
    #[error("scoring response could not be parsed: {reason}")]
    Unparseable {
        reason: String,
        /// Raw model output, kept for operator diagnostics.
        raw: String,
    },
    #[error("failed to build scoring payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Scores a batch of opportunities with a single model call and guarantees
/// exactly one `ScoreResult` per submitted record.
pub struct ScoringEngine {
    model: Box<dyn ScoreModel>,
    rubric: ScoringRubric,
}

impl ScoringEngine {
    pub fn new(model: Box<dyn ScoreModel>, rubric: ScoringRubric) -> Self {
        Self { model, rubric }
    }

    /// Score the whole batch. One outbound call regardless of batch size;
    /// an empty batch makes no call at all.
    ///
    /// Fallback policy: a wholly unparseable response aborts with
    /// `ScoringError::Unparseable`; a record the response omits gets the
    /// sentinel result; out-of-range scores are clamped into 1..=10 with the
    /// reasoning text preserved verbatim.
    pub async fn score_batch(
        &self,
        batch: Vec<Opportunity>,
    ) -> Result<Vec<ScoredOpportunity>, ScoringError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = self.build_prompt(&batch)?;
        info!(count = batch.len(), "requesting scores for batch");

        let raw = self.model.complete(&prompt).await?;
        let entries = parse_score_entries(&raw)?;
        info!(entries = entries.len(), "model returned score entries");

        Ok(merge_scores(batch, entries))
    }

    fn build_prompt(&self, batch: &[Opportunity]) -> Result<String, ScoringError> {
        let slim: Vec<Value> = batch
            .iter()
            .map(|opp| {
                serde_json::json!({
                    "noticeId": opp.notice_id,
                    "title": opp.title,
                    "description": opp.description,
                    "naicsCode": opp.naics,
                    "agency": opp.agency,
                    "postedDate": opp.posted_date.map(|date| date.to_string()),
                    "responseDeadLine": opp.deadline.map(|date| date.to_string()),
                    "solicitationNumber": opp.solicitation_number,
                    "uiLink": opp.sam_url,
                })
            })
            .collect();
        let payload = serde_json::to_string_pretty(&slim)?;

        let (low, high) = self.rubric.value_band;
        let mut prompt = String::new();
        prompt.push_str(
            "You are a government contracting analyst. Evaluate each opportunity below \
             and score it 1-10 for fit with a small consulting firm that specializes in:\n",
        );
        prompt.push_str(&format!(
            "- Deliverables-based work ({})\n",
            self.rubric.engagement_types.join(", ")
        ));
        prompt.push_str(&format!(
            "- Contract value sweet-spot: ${}-${}\n",
            low, high
        ));
        prompt.push_str(&format!(
            "- Deadline at least {} days away\n",
            self.rubric.min_lead_days
        ));
        prompt.push_str(&format!(
            "- Keywords that boost score: {}\n\n",
            self.rubric.boost_keywords.join(", ")
        ));
        prompt.push_str("Red flags that lower the score:\n");
        for flag in &self.rubric.red_flags {
            prompt.push_str(&format!("- {}\n", flag));
        }
        prompt.push_str(
            "\nFor each opportunity return a JSON object with:\n\
             - noticeId (string)\n\
             - score (integer 1-10)\n\
             - reasoning (string, 1-2 sentences)\n\
             - key_requirements (string, brief summary of what the government wants)\n\n\
             Return ONLY a JSON array of objects, one per opportunity, no markdown \
             fences, no commentary.\n\nOpportunities:\n",
        );
        prompt.push_str(&payload);

        Ok(prompt)
    }
}

/// One normalized entry from the model response.
#[derive(Debug)]
pub(crate) struct ScoreEntry {
    notice_id: String,
    score: Option<i64>,
    reasoning: String,
    key_requirements: String,
}

impl ScoreEntry {
    fn into_result(self) -> ScoreResult {
        match self.score {
            Some(value) => ScoreResult {
                score: value.clamp(1, 10) as u8,
                reasoning: self.reasoning,
                key_requirements: self.key_requirements,
            },
            // Non-numeric score: keep whatever rationale came back, but mark
            // the record as unscored rather than inventing a number.
            None => ScoreResult {
                score: 0,
                reasoning: if self.reasoning.is_empty() {
                    ScoreResult::NOT_SCORED.to_string()
                } else {
                    self.reasoning
                },
                key_requirements: self.key_requirements,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawScoreEntry {
    #[serde(default, rename = "noticeId")]
    notice_id: String,
    #[serde(default)]
    score: Value,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    key_requirements: String,
}

impl RawScoreEntry {
    fn normalize(self) -> ScoreEntry {
        let score = match &self.score {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|float| float.round() as i64)),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };

        ScoreEntry {
            notice_id: self.notice_id,
            score,
            reasoning: self.reasoning,
            key_requirements: self.key_requirements,
        }
    }
}

/// Locate the JSON array inside the response, tolerating markdown fences and
/// prose before or after the payload.
fn extract_payload(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

pub(crate) fn parse_score_entries(raw: &str) -> Result<Vec<ScoreEntry>, ScoringError> {
    let payload = extract_payload(raw).ok_or_else(|| ScoringError::Unparseable {
        reason: "no JSON array found in response".to_string(),
        raw: raw.to_string(),
    })?;

    let entries: Vec<RawScoreEntry> =
        serde_json::from_str(payload).map_err(|err| ScoringError::Unparseable {
            reason: err.to_string(),
            raw: raw.to_string(),
        })?;

    Ok(entries.into_iter().map(RawScoreEntry::normalize).collect())
}

/// Attach entries to opportunities by notice id, falling back to positional
/// order for listings without an id. Records the response omitted get the
/// sentinel result so every input has exactly one output.
fn merge_scores(batch: Vec<Opportunity>, entries: Vec<ScoreEntry>) -> Vec<ScoredOpportunity> {
    let mut slots: Vec<Option<ScoreEntry>> = entries.into_iter().map(Some).collect();

    let mut index_of: HashMap<String, usize> = HashMap::new();
    for (idx, slot) in slots.iter().enumerate() {
        if let Some(entry) = slot {
            if !entry.notice_id.is_empty() {
                // First entry wins when the model repeats an id.
                index_of.entry(entry.notice_id.clone()).or_insert(idx);
            }
        }
    }

    batch
        .into_iter()
        .enumerate()
        .map(|(position, opportunity)| {
            let entry = if !opportunity.notice_id.is_empty() {
                index_of
                    .get(&opportunity.notice_id)
                    .and_then(|&idx| slots[idx].take())
            } else {
                slots.get_mut(position).and_then(|slot| match slot {
                    Some(candidate) if candidate.notice_id.is_empty() => slot.take(),
                    _ => None,
                })
            };

            let result = match entry {
                Some(entry) => entry.into_result(),
                None => {
                    warn!(
                        notice_id = %opportunity.notice_id,
                        title = %opportunity.title,
                        "model response omitted record, assigning sentinel score"
                    );
                    ScoreResult::sentinel()
                }
            };

            ScoredOpportunity {
                opportunity,
                result,
            }
        })
        .collect()
}
