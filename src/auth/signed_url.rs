//! Signed URL exchange (`GET /v1/convai/conversation/get-signed-url`).

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::TaraError;
use crate::http::{api_key_headers, shared_client, status_to_error};

pub const SIGNED_URL_PATH: &str = "/v1/convai/conversation/get-signed-url";

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(default)]
    signed_url: Option<String>,
}

/// Exchanges the API key for a pre-authenticated WebSocket URL.
#[derive(Debug, Clone)]
pub struct SignedUrlClient {
    api_key: String,
    agent_id: String,
    base_url: String,
    timeout: Duration,
}

impl SignedUrlClient {
    pub fn new(
        api_key: impl Into<String>,
        agent_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            agent_id: agent_id.into(),
            base_url: base_url.into(),
            timeout: crate::config::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_key, &config.agent_id, &config.base_url)
            .with_timeout(config.request_timeout)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}{SIGNED_URL_PATH}", self.base_url.trim_end_matches('/'))
    }

    /// Request a signed URL for the configured agent.
    ///
    /// Any non-2xx status, a body that is not JSON, or a missing
    /// `signed_url` field is an [`TaraError::Authentication`] error.
    pub async fn get_signed_url(&self) -> Result<String, TaraError> {
        if self.api_key.trim().is_empty() {
            return Err(TaraError::Authentication("Missing API key".into()));
        }
        let headers = api_key_headers(&self.api_key)?;
        info!(agent_id = %self.agent_id, "requesting signed URL");

        tokio::time::timeout(self.timeout, self.request(headers))
            .await
            .map_err(|_| TaraError::Timeout(self.timeout.as_millis() as u64))?
    }

    async fn request(&self, headers: HeaderMap) -> Result<String, TaraError> {
        let response = shared_client()
            .get(self.endpoint())
            .headers(headers)
            .query(&[("agent_id", self.agent_id.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "signed URL request rejected");
            return Err(status_to_error(status.as_u16(), &body));
        }

        parse_signed_url(&body)
    }
}

fn parse_signed_url(body: &str) -> Result<String, TaraError> {
    let parsed: SignedUrlResponse = serde_json::from_str(body).map_err(|error| {
        TaraError::Authentication(format!("Malformed signed URL response: {error}"))
    })?;
    parsed
        .signed_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| TaraError::Authentication("No signed URL received from API".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_signed_url_extracts_field() {
        let url = parse_signed_url(r#"{"signed_url":"wss://example.test/convai?token=abc"}"#)
            .unwrap();
        assert_eq!(url, "wss://example.test/convai?token=abc");
    }

    #[test]
    fn parse_signed_url_rejects_missing_field() {
        let err = parse_signed_url(r#"{"other":1}"#).unwrap_err();
        assert!(matches!(err, TaraError::Authentication(msg) if msg.contains("No signed URL")));
    }

    #[test]
    fn parse_signed_url_rejects_empty_field() {
        let err = parse_signed_url(r#"{"signed_url":""}"#).unwrap_err();
        assert!(matches!(err, TaraError::Authentication(_)));
    }

    #[test]
    fn parse_signed_url_rejects_non_json() {
        let err = parse_signed_url("<html>").unwrap_err();
        assert!(matches!(err, TaraError::Authentication(msg) if msg.contains("Malformed")));
    }

    #[test]
    fn endpoint_joins_base_url_without_double_slash() {
        let client = SignedUrlClient::new("k", "a", "http://localhost:1234/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:1234/v1/convai/conversation/get-signed-url"
        );
    }
}
