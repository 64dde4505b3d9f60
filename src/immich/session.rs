use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use super::error::ImmichError;

const API_KEY_HEADER: &str = "x-api-key";

/// Minimal async JSON transport used by [`super::ImmichClient`].
///
/// Credentials and content negotiation headers are the implementor's
/// responsibility; callers only deal in URLs and JSON bodies.
#[async_trait::async_trait]
pub trait ApiSession: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, ImmichError>;

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ImmichError>;

    async fn put_json(&self, url: &str, body: &Value) -> Result<Value, ImmichError>;
}

/// Build a `reqwest::Client` that sends the Immich API key and JSON headers
/// on every request.
pub fn build_http_client(api_key: &str, timeout: Duration) -> Result<reqwest::Client, ImmichError> {
    let mut key = HeaderValue::from_str(api_key).map_err(|_| ImmichError::InvalidApiKey)?;
    key.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

#[async_trait::async_trait]
impl ApiSession for reqwest::Client {
    async fn get_json(&self, url: &str) -> Result<Value, ImmichError> {
        let resp = self.get(url).send().await?;
        read_json(url, resp).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ImmichError> {
        let resp = self.post(url).json(body).send().await?;
        read_json(url, resp).await
    }

    async fn put_json(&self, url: &str, body: &Value) -> Result<Value, ImmichError> {
        let resp = self.put(url).json(body).send().await?;
        read_json(url, resp).await
    }
}

async fn read_json(url: &str, resp: reqwest::Response) -> Result<Value, ImmichError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ImmichError::Status {
            endpoint: url.to_owned(),
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ImmichError::decode(url, e))
}

/// Immich error bodies look like `{"message": ..., "statusCode": ...}`, where
/// `message` is either a string or a list of validation messages.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    match parsed.as_ref().and_then(|v| v.get("message")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_owned))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => body.trim().to_owned(),
    }
}
