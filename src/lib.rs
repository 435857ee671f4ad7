mod cli;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod logbook;
pub mod pipeline;
pub mod report;
pub mod telemetry;

use error::AppError;
use tracing::info;

pub async fn run() -> Result<(), AppError> {
    let args = cli::parse();
    let mut config = config::AppConfig::load()?;
    config.apply(&args)?;
    telemetry::init(&config.telemetry)?;

    info!("contract scout starting");
    let summary = pipeline::run(&config).await?;
    info!(
        fetched = summary.fetched,
        scored = summary.scored,
        reported = summary.reported,
        logged = summary.logged,
        email_sent = summary.email_sent,
        "contract scout finished"
    );

    Ok(())
}
