//! Error types for provider calls and the HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::config::Provider;

/// Failure of a single upstream provider call.
///
/// Callers treat every variant as "source absent"; none of them aborts an
/// aggregation request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider's API key is not configured. Checked before any I/O.
    #[error("{provider} API key not configured")]
    Configuration { provider: Provider },

    /// Non-2xx response from the provider.
    #[error("{provider} returned HTTP {status}")]
    Upstream { provider: Provider, status: u16 },

    /// Transport-level failure (DNS, connect, timeout, reset).
    #[error("{provider} network error: {source}")]
    Network {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    /// A 2xx response whose body was not JSON.
    #[error("{provider} returned an undecodable body: {message}")]
    Decode { provider: Provider, message: String },

    #[error("invalid upstream URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl FetchError {
    /// Missing credentials are an expected, quiet condition.
    pub fn is_expected(&self) -> bool {
        matches!(self, FetchError::Configuration { .. })
    }
}

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request body or parameters (400).
    #[error("{0}")]
    Validation(String),

    /// Server-side failure (500).
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_is_expected() {
        let err = FetchError::Configuration {
            provider: Provider::Ground,
        };
        assert!(err.is_expected());
        assert_eq!(err.to_string(), "EPA AirNow API key not configured");

        let err = FetchError::Upstream {
            provider: Provider::Weather,
            status: 503,
        };
        assert!(!err.is_expected());
        assert_eq!(err.to_string(), "OpenWeather returned HTTP 503");
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let resp = ApiError::Validation("Missing required fields".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::Internal("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
