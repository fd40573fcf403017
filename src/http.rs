//! Shared HTTP client, header builders and status mapping.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::error::TaraError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Header carrying the ElevenLabs API key.
pub const API_KEY_HEADER: &str = "xi-api-key";

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Build default headers for an `xi-api-key` authenticated request.
pub fn api_key_headers(api_key: &str) -> Result<HeaderMap, TaraError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let value = HeaderValue::from_str(api_key).map_err(|_| {
        TaraError::Configuration("API key contains characters not allowed in a header".into())
    })?;
    headers.insert(API_KEY_HEADER, value);
    Ok(headers)
}

/// Map a non-success status to an error.
///
/// Every rejection of the signed-URL request means the credentials or the
/// agent id are unusable, so all of them surface as authentication errors.
pub fn status_to_error(status: u16, body: &str) -> TaraError {
    let detail = extract_detail(body).unwrap_or_else(|| body.trim().to_string());
    match status {
        401 | 403 => TaraError::Authentication(format!("credentials rejected ({status}): {detail}")),
        _ => TaraError::Authentication(format!("signed URL request failed ({status}): {detail}")),
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    let detail = value.get("detail")?;
    detail
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| detail.as_str())
        .map(ToString::to_string)
}
