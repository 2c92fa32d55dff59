//! Gateway error types and their HTTP status mapping.
//!
//! Non-2xx codes are reserved for authorization, validation and
//! initialization failures. Per-block failures travel inside a successful
//! envelope.

use crate::domain::envelope::ApiEnvelope;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tier_verification::VerificationError;

/// Request-level gateway failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Server-side misconfiguration (no admin secret)
    #[error("{0}")]
    Configuration(String),

    /// Missing or mismatched admin secret
    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed request input
    #[error("{0}")]
    Validation(String),

    /// Request body over the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Chain metadata reports an uninitialized chain
    #[error("Chain not initialized")]
    ChainNotInitialized,

    /// Another verification run holds the run guard
    #[error("A verification run is already in progress")]
    RunInProgress,

    /// Unexpected failure; detail is logged, never returned
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ChainNotInitialized => StatusCode::BAD_REQUEST,
            ApiError::RunInProgress => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::ChainNotInitialized => ApiError::ChainNotInitialized,
            VerificationError::InvalidBlockNumber(raw) => {
                ApiError::Validation(format!("Invalid block number: {}", raw))
            }
            VerificationError::RunInProgress => ApiError::RunInProgress,
            VerificationError::ChainMetadata(detail) => {
                ApiError::Internal(format!("chain metadata unavailable: {}", detail))
            }
            VerificationError::Internal(detail) => ApiError::Internal(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed with internal error");
            }
            ApiError::Configuration(detail) => {
                tracing::error!(error = %detail, "request rejected by server misconfiguration");
            }
            _ => {
                tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
            }
        }
        (status, Json(ApiEnvelope::err(self.public_message()))).into_response()
    }
}

/// Server lifecycle failure
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Tier handle could not be constructed
    #[error("storage wiring error: {0}")]
    Storage(String),

    /// The server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(String),
}
