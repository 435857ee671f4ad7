use crate::config::SearchConfig;
use crate::domain::{self, Opportunity};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Seam between the pipeline and the search transport, so tests can feed
/// fixed result sets without a network.
#[async_trait]
pub trait OpportunitySource: Send + Sync {
    async fn search_window(&self) -> Result<Vec<Opportunity>, SearchError>;
}

/// Client for the SAM.gov opportunity search endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    config: SearchConfig,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(super::REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl OpportunitySource for SearchClient {
    /// Fetch all listings posted inside the configured lookback window for
    /// the configured NAICS codes, newest window boundary being today (UTC).
    async fn search_window(&self) -> Result<Vec<Opportunity>, SearchError> {
        let posted_to = Utc::now().date_naive();
        let posted_from = posted_to - Duration::days(self.config.lookback_days);

        let params = [
            ("api_key", self.config.api_key.clone()),
            ("postedFrom", posted_from.format("%m/%d/%Y").to_string()),
            ("postedTo", posted_to.format("%m/%d/%Y").to_string()),
            ("ptype", "o,k".to_string()),
            ("naics", self.config.naics_codes.join(",")),
            ("limit", self.config.limit.to_string()),
        ];

        info!(
            posted_from = %posted_from,
            posted_to = %posted_to,
            naics = self.config.naics_codes.len(),
            "searching opportunity listings"
        );

        let request = self.http.get(&self.config.base_url).query(&params);
        let response = super::send_with_retry(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api { status, body });
        }

        let payload: SearchResponse = response.json().await?;
        info!(
            count = payload.opportunities_data.len(),
            "search API returned listings"
        );

        Ok(payload
            .opportunities_data
            .into_iter()
            .map(RawListing::into_opportunity)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    opportunities_data: Vec<RawListing>,
}

/// Raw listing as the search API serializes it. Every field is optional so a
/// sparse upstream record degrades to unknowns instead of failing the run.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawListing {
    #[serde(default)]
    notice_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    solicitation_number: Option<String>,
    #[serde(default)]
    naics_code: String,
    #[serde(default)]
    full_parent_path_name: Option<String>,
    #[serde(default)]
    department_name: Option<String>,
    #[serde(default)]
    posted_date: Option<String>,
    #[serde(default)]
    response_dead_line: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    ui_link: Option<String>,
}

impl RawListing {
    fn into_opportunity(self) -> Opportunity {
        let agency = self
            .full_parent_path_name
            .or(self.department_name)
            .unwrap_or_default();

        Opportunity {
            notice_id: self.notice_id,
            solicitation_number: self
                .solicitation_number
                .filter(|number| !number.trim().is_empty()),
            title: self.title,
            agency,
            naics: self.naics_code,
            posted_date: self.posted_date.as_deref().and_then(domain::parse_date),
            deadline: self
                .response_dead_line
                .as_deref()
                .and_then(domain::parse_date),
            // The search response carries no value estimate; listings state
            // it in the description when they state it at all.
            estimated_value: None,
            description: self.description.unwrap_or_default(),
            sam_url: self.ui_link.unwrap_or_default(),
        }
    }
}
