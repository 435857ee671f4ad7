use crate::cli::RunArgs;
use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_SAM_URL: &str = "https://api.sam.gov/opportunities/v2/search";
const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const DEFAULT_NAICS: &str = "541611,541990,611430,541519,541720";
const DEFAULT_LOG_FILE: &str = "opportunities_log.csv";

/// Top-level configuration for a run. Loaded once from the environment and
/// passed into the pipeline; nothing reads env vars after this.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub scoring: ScoringConfig,
    pub email: Option<EmailConfig>,
    pub run: RunConfig,
    pub telemetry: TelemetryConfig,
}

/// Settings for the opportunity search call.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub base_url: String,
    pub naics_codes: Vec<String>,
    pub lookback_days: i64,
    pub limit: u32,
}

/// Settings for the scoring model call.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Mail relay credentials. All required fields must be present for delivery
/// to run; otherwise the report email is skipped with a warning.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub relay_url: String,
    pub relay_token: String,
    pub from: String,
    pub to: String,
    pub recipient_name: String,
}

/// Knobs that shape a single run's output.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub log_file: PathBuf,
    pub min_score: u8,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let search = SearchConfig {
            api_key: require("SAM_API_KEY")?,
            base_url: env::var("SAM_API_URL").unwrap_or_else(|_| DEFAULT_SAM_URL.to_string()),
            naics_codes: env::var("SCOUT_NAICS_CODES")
                .unwrap_or_else(|_| DEFAULT_NAICS.to_string())
                .split(',')
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty())
                .collect(),
            lookback_days: lookback(parse_var("SCOUT_LOOKBACK_DAYS", 2)?)?,
            limit: parse_var("SCOUT_SEARCH_LIMIT", 100)?,
        };

        let scoring = ScoringConfig {
            api_key: require("ANTHROPIC_API_KEY")?,
            base_url: env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_URL.to_string()),
            model: env::var("SCOUT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        };

        let run = RunConfig {
            log_file: PathBuf::from(
                env::var("SCOUT_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string()),
            ),
            min_score: parse_var("SCOUT_MIN_SCORE", 7)?,
        };

        let telemetry = TelemetryConfig {
            log_level: env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        Ok(Self {
            search,
            scoring,
            email: load_email(),
            run,
            telemetry,
        })
    }

    /// Fold CLI overrides into the loaded configuration.
    pub(crate) fn apply(&mut self, args: &RunArgs) -> Result<(), ConfigError> {
        if let Some(days) = args.lookback_days {
            self.search.lookback_days = lookback(days)?;
        }
        if let Some(path) = &args.log_file {
            self.run.log_file = path.clone();
        }
        if let Some(score) = args.min_score {
            self.run.min_score = score;
        }
        if args.skip_email {
            self.email = None;
        }
        Ok(())
    }
}

/// A negative window would invert the search date range, so reject it here
/// instead of letting the search API refuse it downstream.
fn lookback(days: i64) -> Result<i64, ConfigError> {
    if days < 0 {
        return Err(ConfigError::NegativeLookback { days });
    }
    Ok(days)
}

fn load_email() -> Option<EmailConfig> {
    Some(EmailConfig {
        relay_url: env::var("MAIL_RELAY_URL").ok()?,
        relay_token: env::var("MAIL_RELAY_TOKEN").ok()?,
        from: env::var("MAIL_FROM").ok()?,
        to: env::var("MAIL_TO").ok()?,
        recipient_name: env::var("MAIL_RECIPIENT_NAME").unwrap_or_else(|_| "User".to_string()),
    })
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar { name }),
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVar { name: &'static str },
    InvalidNumber { name: &'static str },
    NegativeLookback { days: i64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar { name } => {
                write!(f, "required environment variable {} is not set", name)
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{} must be a valid number", name)
            }
            ConfigError::NegativeLookback { days } => {
                write!(f, "lookback window must be zero or more days, got {}", days)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
