//! HTTP client for the API gateway.
//!
//! Every endpoint speaks the same JSON envelope `{success, data, message?}`
//! over HTTPS. This client owns authentication headers, envelope
//! unwrapping, and error classification; nothing above it ever sees a raw
//! HTTP status or reqwest error.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, ErrorKind, Result};

use super::api_types::Envelope;

/// Gateway API client with bearer authentication.
#[derive(Clone)]
pub struct GatewayClient {
  http: Client,
  base_url: Url,
}

impl GatewayClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()
      .map_err(|e| ApiError::new(ErrorKind::Unauthorized, e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(
      AUTHORIZATION,
      HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ApiError::new(ErrorKind::Unknown, e.to_string()))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static("octosync"));

    let http = Client::builder()
      .default_headers(headers)
      .build()
      .map_err(ApiError::from)?;

    let base_url = Url::parse(&config.gateway.url)
      .map_err(|e| ApiError::new(ErrorKind::Unknown, format!("Invalid gateway URL: {}", e)))?;

    Ok(Self { http, base_url })
  }

  /// GET an envelope-wrapped resource.
  pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
    self.request(Method::GET, path, query, None).await
  }

  pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
    self.request(Method::POST, path, &[], Some(body)).await
  }

  pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
    self.request(Method::PATCH, path, &[], Some(body)).await
  }

  pub async fn put<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
    self.request(Method::PUT, path, &[], Some(body)).await
  }

  /// DELETE; the gateway may legitimately omit `data` here.
  pub async fn delete(&self, path: &str) -> Result<Value> {
    match self
      .request::<Option<Value>>(Method::DELETE, path, &[], None)
      .await
    {
      Ok(data) => Ok(data.unwrap_or(Value::Null)),
      Err(err) if err.message == MISSING_DATA => Ok(Value::Null),
      Err(err) => Err(err),
    }
  }

  fn endpoint(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.base_url.as_str().trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }

  async fn request<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, String)],
    body: Option<&Value>,
  ) -> Result<T> {
    let url = self.endpoint(path);
    debug!(method = %method, path, "gateway request");

    let mut request = self.http.request(method, &url);
    if !query.is_empty() {
      request = request.query(query);
    }
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = request.send().await.map_err(ApiError::from)?;
    let status = response.status();

    if !status.is_success() {
      // Failure envelopes still carry a message worth surfacing.
      let message = response
        .json::<Envelope<Value>>()
        .await
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("HTTP {}", status));
      return Err(ApiError::from_status(status.as_u16(), message));
    }

    let envelope: Envelope<T> = response.json().await.map_err(ApiError::from)?;
    if !envelope.success {
      return Err(ApiError::new(
        ErrorKind::Unknown,
        envelope
          .message
          .unwrap_or_else(|| "Gateway reported failure".to_string()),
      ));
    }

    envelope
      .data
      .ok_or_else(|| ApiError::new(ErrorKind::Unknown, MISSING_DATA))
  }
}

const MISSING_DATA: &str = "Gateway response missing data";

#[cfg(test)]
mod tests {
  use super::*;

  fn client_with_base(url: &str) -> GatewayClient {
    GatewayClient {
      http: Client::new(),
      base_url: Url::parse(url).unwrap(),
    }
  }

  #[test]
  fn test_endpoint_joins_without_double_slashes() {
    let client = client_with_base("https://gw.example.com/api/");
    assert_eq!(
      client.endpoint("/repos/acme/widgets"),
      "https://gw.example.com/api/repos/acme/widgets"
    );
    assert_eq!(
      client.endpoint("notifications"),
      "https://gw.example.com/api/notifications"
    );
  }

  #[test]
  fn test_failure_envelope_parses() {
    let envelope: Envelope<Value> =
      serde_json::from_str(r#"{"success": false, "message": "repo not found"}"#).unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("repo not found"));
    assert!(envelope.data.is_none());
  }
}
