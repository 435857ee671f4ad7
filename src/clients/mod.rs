pub mod claude;
pub mod mailer;
pub mod sam;

use std::time::Duration;
use tracing::warn;

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Send the request, retrying exactly once after a short backoff when the
/// transport fails or the upstream returns a 5xx. Client errors (4xx) are
/// never retried; the caller turns those into its own API error.
pub(crate) async fn send_with_retry(
    builder: reqwest::RequestBuilder,
) -> Result<reqwest::Response, reqwest::Error> {
    let retry = match builder.try_clone() {
        Some(clone) => clone,
        // Streaming bodies cannot be cloned; fall back to a single attempt.
        None => return builder.send().await,
    };

    match builder.send().await {
        Ok(response) if response.status().is_server_error() => {
            warn!(status = %response.status(), "upstream returned server error, retrying once");
            tokio::time::sleep(RETRY_BACKOFF).await;
            retry.send().await
        }
        Ok(response) => Ok(response),
        Err(err) => {
            warn!(error = %err, "request failed, retrying once");
            tokio::time::sleep(RETRY_BACKOFF).await;
            retry.send().await
        }
    }
}
