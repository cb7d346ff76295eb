//! Classified error taxonomy for the data layer.
//!
//! Every fallible operation in this crate returns `Result<_, ApiError>`.
//! The classified `kind`, not the raw HTTP status, is what retry and
//! reporting logic switches on, so unexpected upstream status codes degrade
//! to `Unknown` instead of breaking a match arm somewhere downstream.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of error classes consumed by retry and presentation logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
  /// Transport-level failure (no HTTP response at all)
  Network,
  /// 4xx other than auth / not-found / validation
  ClientError,
  /// 5xx
  ServerError,
  /// 404
  NotFound,
  /// 401 or 403
  Unauthorized,
  /// 400 or 422
  Validation,
  /// Anything that doesn't fit the taxonomy
  Unknown,
}

/// A classified gateway error.
///
/// Cloneable so it can live inside cache entries and shared in-flight
/// futures; the original error source is flattened into `message`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
  pub kind: ErrorKind,
  pub http_status: Option<u16>,
  pub message: String,
}

impl ApiError {
  pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      http_status: None,
      message: message.into(),
    }
  }

  /// Classify an HTTP status into the error taxonomy.
  pub fn from_status(status: u16, message: impl Into<String>) -> Self {
    let kind = match status {
      401 | 403 => ErrorKind::Unauthorized,
      404 => ErrorKind::NotFound,
      400 | 422 => ErrorKind::Validation,
      400..=499 => ErrorKind::ClientError,
      500..=599 => ErrorKind::ServerError,
      _ => ErrorKind::Unknown,
    };

    Self {
      kind,
      http_status: Some(status),
      message: message.into(),
    }
  }

  /// Whether the fetch executor may recover this error with a retry.
  ///
  /// Only transport failures qualify; retrying a classified HTTP failure
  /// would just replay the same rejection.
  pub fn is_retryable(&self) -> bool {
    self.kind == ErrorKind::Network
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    // A status-carrying error means the server answered; everything else
    // (connect, timeout, body decode mid-stream) counts as transport.
    match err.status() {
      Some(status) => Self::from_status(status.as_u16(), err.to_string()),
      None => Self::new(ErrorKind::Network, err.to_string()),
    }
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(err: serde_json::Error) -> Self {
    Self::new(ErrorKind::Unknown, format!("Malformed payload: {}", err))
  }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_classification() {
    assert_eq!(ApiError::from_status(401, "").kind, ErrorKind::Unauthorized);
    assert_eq!(ApiError::from_status(403, "").kind, ErrorKind::Unauthorized);
    assert_eq!(ApiError::from_status(404, "").kind, ErrorKind::NotFound);
    assert_eq!(ApiError::from_status(400, "").kind, ErrorKind::Validation);
    assert_eq!(ApiError::from_status(422, "").kind, ErrorKind::Validation);
    assert_eq!(ApiError::from_status(418, "").kind, ErrorKind::ClientError);
    assert_eq!(ApiError::from_status(500, "").kind, ErrorKind::ServerError);
    assert_eq!(ApiError::from_status(503, "").kind, ErrorKind::ServerError);
    assert_eq!(ApiError::from_status(302, "").kind, ErrorKind::Unknown);
  }

  #[test]
  fn test_only_network_is_retryable() {
    assert!(ApiError::new(ErrorKind::Network, "reset").is_retryable());
    assert!(!ApiError::from_status(500, "").is_retryable());
    assert!(!ApiError::from_status(422, "").is_retryable());
    assert!(!ApiError::from_status(401, "").is_retryable());
  }

  #[test]
  fn test_status_preserved_alongside_kind() {
    let err = ApiError::from_status(422, "name already exists");
    assert_eq!(err.http_status, Some(422));
    assert_eq!(err.to_string(), "name already exists");
  }
}
