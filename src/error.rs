use crate::clients::claude::ModelError;
use crate::clients::mailer::MailerError;
use crate::clients::sam::SearchError;
use crate::config::ConfigError;
use crate::logbook::LogbookError;
use crate::pipeline::scoring::ScoringError;
use crate::telemetry::TelemetryError;
use std::fmt;

/// Run-terminal errors. Each variant maps to a distinct operator remediation:
/// delivery failures happen after the log append and only affect notification,
/// while search/scoring/log failures abort before any partial state is kept.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Search(SearchError),
    Scoring(ScoringError),
    Log(LogbookError),
    Delivery(MailerError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Search(err) => write!(f, "search error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Log(err) => write!(f, "opportunity log error: {}", err),
            AppError::Delivery(err) => write!(f, "report delivery error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Search(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Log(err) => Some(err),
            AppError::Delivery(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<SearchError> for AppError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

impl From<ScoringError> for AppError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<ModelError> for AppError {
    fn from(value: ModelError) -> Self {
        Self::Scoring(ScoringError::Model(value))
    }
}

impl From<LogbookError> for AppError {
    fn from(value: LogbookError) -> Self {
        Self::Log(value)
    }
}

impl From<MailerError> for AppError {
    fn from(value: MailerError) -> Self {
        Self::Delivery(value)
    }
}
