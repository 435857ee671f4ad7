use crate::config::EmailConfig;
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail relay returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Seam between the pipeline and report delivery, so tests can observe or
/// fail sends without a network.
#[async_trait]
pub trait ReportSender: Send + Sync {
    async fn send_report(&self, subject: &str, html: &str) -> Result<(), MailerError>;
}

/// Client for the HTTP mail relay that delivers the report.
#[derive(Debug, Clone)]
pub struct MailRelay {
    http: reqwest::Client,
    config: EmailConfig,
}

impl MailRelay {
    pub fn new(config: EmailConfig) -> Result<Self, MailerError> {
        let http = reqwest::Client::builder()
            .timeout(super::REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl ReportSender for MailRelay {
    async fn send_report(&self, subject: &str, html: &str) -> Result<(), MailerError> {
        let url = format!("{}/messages", self.config.relay_url.trim_end_matches('/'));
        let to = recipient_header(&self.config.recipient_name, &self.config.to);
        let body = OutboundMessage {
            from: &self.config.from,
            to: &to,
            subject,
            html,
        };

        info!(to = %self.config.to, subject, "sending report email");

        let request = self
            .http
            .post(url)
            .bearer_auth(&self.config.relay_token)
            .json(&body);
        let response = super::send_with_retry(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Api { status, body });
        }

        info!("report email accepted by relay");
        Ok(())
    }
}

fn recipient_header(name: &str, address: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        address.to_string()
    } else {
        format!("{} <{}>", name, address)
    }
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}
