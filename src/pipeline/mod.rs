pub mod ranking;
pub mod scoring;

use crate::clients::claude::ClaudeClient;
use crate::clients::mailer::{MailRelay, ReportSender};
use crate::clients::sam::{OpportunitySource, SearchClient};
use crate::config::{AppConfig, RunConfig};
use crate::error::AppError;
use crate::{logbook, report};
use chrono::Utc;
use scoring::{ScoringEngine, ScoringRubric};
use tracing::{info, warn};

/// Outcome counters for one completed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub scored: usize,
    pub reported: usize,
    pub logged: usize,
    pub email_sent: bool,
}

/// One search-score-report cycle over injected collaborators. Steps run
/// strictly in sequence; any failure is terminal for the run, and nothing is
/// logged unless the whole batch scored.
pub struct Pipeline {
    search: Box<dyn OpportunitySource>,
    engine: ScoringEngine,
    mailer: Option<Box<dyn ReportSender>>,
    settings: RunConfig,
}

impl Pipeline {
    pub fn new(
        search: Box<dyn OpportunitySource>,
        engine: ScoringEngine,
        mailer: Option<Box<dyn ReportSender>>,
        settings: RunConfig,
    ) -> Self {
        Self {
            search,
            engine,
            mailer,
            settings,
        }
    }

    pub async fn execute(&self) -> Result<RunSummary, AppError> {
        let opportunities = self.search.search_window().await?;
        if opportunities.is_empty() {
            info!("no opportunities found for the window, nothing to score");
            return Ok(RunSummary::default());
        }
        let fetched = opportunities.len();

        let scored = self.engine.score_batch(opportunities).await?;

        let rows = ranking::select_report_rows(&scored, self.settings.min_score);
        info!(
            scored = scored.len(),
            reported = rows.len(),
            min_score = self.settings.min_score,
            "scoring complete"
        );

        // The full scored set goes to the log, not just the report subset,
        // and it goes in before delivery so a mail failure cannot lose the
        // records.
        let run_date = Utc::now().date_naive();
        let logged = logbook::append_run(&self.settings.log_file, &scored, run_date)?;
        info!(
            rows = logged,
            path = %self.settings.log_file.display(),
            "appended run to opportunity log"
        );

        let mut email_sent = false;
        if rows.is_empty() {
            info!(
                min_score = self.settings.min_score,
                "no opportunities met the report threshold, no email sent"
            );
        } else if let Some(mailer) = &self.mailer {
            let html = report::render_html(&rows, self.settings.min_score, run_date);
            mailer
                .send_report(&report::subject(run_date), &html)
                .await?;
            email_sent = true;
        } else {
            warn!("mail relay not configured, skipping report email");
        }

        Ok(RunSummary {
            fetched,
            scored: scored.len(),
            reported: rows.len(),
            logged,
            email_sent,
        })
    }
}

/// Wire the production collaborators and execute one run.
pub async fn run(config: &AppConfig) -> Result<RunSummary, AppError> {
    let search = SearchClient::new(config.search.clone())?;
    let model = ClaudeClient::new(config.scoring.clone())?;
    let engine = ScoringEngine::new(Box::new(model), ScoringRubric::consulting());

    let mailer: Option<Box<dyn ReportSender>> = match &config.email {
        Some(email) => Some(Box::new(MailRelay::new(email.clone())?)),
        None => None,
    };

    Pipeline::new(Box::new(search), engine, mailer, config.run.clone())
        .execute()
        .await
}
