use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use contract_scout::clients::claude::{ModelError, ScoreModel};
use contract_scout::clients::mailer::{MailerError, ReportSender};
use contract_scout::clients::sam::{OpportunitySource, SearchError};
use contract_scout::config::RunConfig;
use contract_scout::domain::Opportunity;
use contract_scout::error::AppError;
use contract_scout::pipeline::ranking::select_report_rows;
use contract_scout::pipeline::scoring::{ScoringEngine, ScoringError, ScoringRubric};
use contract_scout::pipeline::{Pipeline, RunSummary};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns a canned response and counts how often it is asked.
struct ScriptedModel {
    response: String,
    calls: Arc<AtomicUsize>,
}

impl ScriptedModel {
    fn new(response: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                response: response.to_string(),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl ScoreModel for ScriptedModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

fn opportunity(notice_id: &str, title: &str, deadline: Option<NaiveDate>) -> Opportunity {
    Opportunity {
        notice_id: notice_id.to_string(),
        solicitation_number: Some(format!("SOL-{notice_id}")),
        title: title.to_string(),
        agency: "Dept of Labor".to_string(),
        naics: "541611".to_string(),
        posted_date: None,
        deadline,
        estimated_value: None,
        description: "Process improvement and Agile coaching engagement.".to_string(),
        sam_url: format!("https://sam.gov/opp/{notice_id}/view"),
    }
}

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 30).expect("valid run date")
}

#[tokio::test]
async fn every_submitted_record_gets_exactly_one_result() {
    let (model, calls) = ScriptedModel::new(
        r#"[{"noticeId": "b", "score": 8, "reasoning": "solid fit"}]"#,
    );
    let engine = ScoringEngine::new(Box::new(model), ScoringRubric::consulting());

    let batch = vec![
        opportunity("a", "Alpha", None),
        opportunity("b", "Beta", None),
        opportunity("c", "Gamma", None),
    ];
    let scored = engine.score_batch(batch).await.expect("batch scores");

    assert_eq!(scored.len(), 3, "one result per submitted record");
    assert_eq!(calls.load(Ordering::SeqCst), 1, "single batched model call");

    let beta = scored
        .iter()
        .find(|pair| pair.opportunity.notice_id == "b")
        .expect("beta present");
    assert_eq!(beta.result.score, 8);

    for pair in scored.iter().filter(|pair| pair.opportunity.notice_id != "b") {
        assert!(pair.result.is_sentinel(), "omitted records get the sentinel");
        assert_eq!(pair.result.reasoning, "not scored");
    }
}

#[tokio::test]
async fn prose_wrapped_response_still_parses() {
    let (model, _) = ScriptedModel::new(
        "Sure! Here is my evaluation:\n\n```json\n[\n  {\"noticeId\": \"a\", \"score\": 13, \
         \"reasoning\": \"exceptional fit\"},\n  {\"noticeId\": \"b\", \"score\": -2, \
         \"reasoning\": \"all red flags\"}\n]\n```\nHope that helps.",
    );
    let engine = ScoringEngine::new(Box::new(model), ScoringRubric::consulting());

    let batch = vec![
        opportunity("a", "Alpha", None),
        opportunity("b", "Beta", None),
    ];
    let scored = engine.score_batch(batch).await.expect("batch scores");

    assert_eq!(scored[0].result.score, 10, "13 clamps to 10");
    assert_eq!(scored[0].result.reasoning, "exceptional fit");
    assert_eq!(scored[1].result.score, 1, "-2 clamps to 1");
    assert_eq!(scored[1].result.reasoning, "all red flags");
}

#[tokio::test]
async fn unparseable_response_aborts_the_batch() {
    let (model, _) =
        ScriptedModel::new("I'm sorry, I can't evaluate these opportunities today.");
    let engine = ScoringEngine::new(Box::new(model), ScoringRubric::consulting());

    let batch = vec![opportunity("a", "Alpha", None)];
    let error = engine
        .score_batch(batch)
        .await
        .expect_err("prose-only response must abort");

    match error {
        ScoringError::Unparseable { raw, .. } => {
            assert!(raw.contains("can't evaluate"), "raw text kept for diagnostics");
        }
        other => panic!("expected unparseable error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_batch_makes_no_model_call() {
    let (model, calls) = ScriptedModel::new("[]");
    let engine = ScoringEngine::new(Box::new(model), ScoringRubric::consulting());

    let scored = engine.score_batch(Vec::new()).await.expect("empty batch ok");
    assert!(scored.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn scored_batch_flows_through_filter_and_rank() {
    let (model, _) = ScriptedModel::new(
        r#"[
            {"noticeId": "a", "score": 8, "reasoning": "good"},
            {"noticeId": "b", "score": 8, "reasoning": "good, sooner"},
            {"noticeId": "c", "score": 9, "reasoning": "best"},
            {"noticeId": "d", "score": 6, "reasoning": "below threshold"}
        ]"#,
    );
    let engine = ScoringEngine::new(Box::new(model), ScoringRubric::consulting());

    let batch = vec![
        opportunity("a", "Alpha", Some(run_date() + Duration::days(5))),
        opportunity("b", "Beta", Some(run_date() + Duration::days(2))),
        opportunity("c", "Gamma", Some(run_date() + Duration::days(30))),
        opportunity("d", "Delta", Some(run_date() + Duration::days(3))),
    ];
    let scored = engine.score_batch(batch).await.expect("batch scores");

    let rows = select_report_rows(&scored, 7);
    let titles: Vec<&str> = rows.iter().map(|row| row.title.as_str()).collect();
    assert_eq!(titles, ["Gamma", "Beta", "Alpha"]);
}

/// Serves a fixed set of listings.
struct StubSearch {
    listings: Vec<Opportunity>,
}

#[async_trait]
impl OpportunitySource for StubSearch {
    async fn search_window(&self) -> Result<Vec<Opportunity>, SearchError> {
        Ok(self.listings.clone())
    }
}

/// Accepts every report and counts the deliveries.
struct RecordingMailer {
    sent: Arc<AtomicUsize>,
}

#[async_trait]
impl ReportSender for RecordingMailer {
    async fn send_report(&self, _subject: &str, _html: &str) -> Result<(), MailerError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Rejects every report, as a relay outage would.
struct FailingMailer;

#[async_trait]
impl ReportSender for FailingMailer {
    async fn send_report(&self, _subject: &str, _html: &str) -> Result<(), MailerError> {
        Err(MailerError::Api {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "relay down".to_string(),
        })
    }
}

fn pipeline_with(
    listings: Vec<Opportunity>,
    model: ScriptedModel,
    mailer: Option<Box<dyn ReportSender>>,
    log_file: PathBuf,
) -> Pipeline {
    Pipeline::new(
        Box::new(StubSearch { listings }),
        ScoringEngine::new(Box::new(model), ScoringRubric::consulting()),
        mailer,
        RunConfig {
            log_file,
            min_score: 7,
        },
    )
}

#[tokio::test]
async fn prose_only_response_leaves_the_log_untouched() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log_file = dir.path().join("opportunities_log.csv");

    let (model, _) = ScriptedModel::new("I'd rather chat about something else.");
    let sent = Arc::new(AtomicUsize::new(0));
    let mailer = RecordingMailer {
        sent: Arc::clone(&sent),
    };

    let error = pipeline_with(
        vec![opportunity("a", "Alpha", None)],
        model,
        Some(Box::new(mailer)),
        log_file.clone(),
    )
    .execute()
    .await
    .expect_err("unscoreable batch must fail the run");

    assert!(matches!(error, AppError::Scoring(_)), "got {error:?}");
    assert!(!log_file.exists(), "no rows may be logged for a failed batch");
    assert_eq!(sent.load(Ordering::SeqCst), 0, "no report goes out either");
}

#[tokio::test]
async fn empty_search_appends_nothing_and_sends_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log_file = dir.path().join("opportunities_log.csv");

    let (model, calls) = ScriptedModel::new("[]");
    let sent = Arc::new(AtomicUsize::new(0));
    let mailer = RecordingMailer {
        sent: Arc::clone(&sent),
    };

    let summary = pipeline_with(Vec::new(), model, Some(Box::new(mailer)), log_file.clone())
        .execute()
        .await
        .expect("empty window is a clean run");

    assert_eq!(summary, RunSummary::default());
    assert!(!log_file.exists(), "no log file for an empty window");
    assert_eq!(calls.load(Ordering::SeqCst), 0, "model never consulted");
    assert_eq!(sent.load(Ordering::SeqCst), 0, "no email for an empty window");
}

#[tokio::test]
async fn full_run_logs_rows_and_sends_the_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log_file = dir.path().join("opportunities_log.csv");

    let (model, _) = ScriptedModel::new(
        r#"[
            {"noticeId": "a", "score": 9, "reasoning": "strong fit"},
            {"noticeId": "b", "score": 4, "reasoning": "weak fit"}
        ]"#,
    );
    let sent = Arc::new(AtomicUsize::new(0));
    let mailer = RecordingMailer {
        sent: Arc::clone(&sent),
    };

    let summary = pipeline_with(
        vec![
            opportunity("a", "Alpha", Some(run_date() + Duration::days(20))),
            opportunity("b", "Beta", None),
        ],
        model,
        Some(Box::new(mailer)),
        log_file.clone(),
    )
    .execute()
    .await
    .expect("happy path run");

    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.scored, 2);
    assert_eq!(summary.reported, 1, "only the above-threshold record");
    assert_eq!(summary.logged, 2, "every scored record is logged");
    assert!(summary.email_sent);
    assert_eq!(sent.load(Ordering::SeqCst), 1);

    let log = std::fs::read_to_string(&log_file).expect("log written");
    assert!(log.contains("Alpha"));
    assert!(log.contains("Beta"), "below-threshold rows are logged too");
}

#[tokio::test]
async fn delivery_failure_does_not_lose_logged_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log_file = dir.path().join("opportunities_log.csv");

    let (model, _) = ScriptedModel::new(
        r#"[{"noticeId": "a", "score": 9, "reasoning": "strong fit"}]"#,
    );

    let error = pipeline_with(
        vec![opportunity("a", "Alpha", None)],
        model,
        Some(Box::new(FailingMailer)),
        log_file.clone(),
    )
    .execute()
    .await
    .expect_err("relay outage fails the run");

    assert!(matches!(error, AppError::Delivery(_)), "got {error:?}");
    let log = std::fs::read_to_string(&log_file).expect("rows logged before delivery");
    assert!(log.contains("Alpha"));
}
