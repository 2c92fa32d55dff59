//! Admin authorization gate.
//!
//! Every privileged endpoint takes an [`AdminAuthorized`] extractor, so the
//! secret is checked before the handler runs and before any tier is touched.
//!
//! Secret resolution order:
//! 1. `x-admin-secret` header
//! 2. `adminSecret` field of a JSON body
//! 3. `secret` field of a JSON body
//!
//! Each candidate is trimmed; empty values fall through to the next source.

use crate::domain::error::ApiError;
use axum::async_trait;
use axum::extract::{FromRef, FromRequest, Request};
use axum::http::HeaderMap;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Header carrying the admin secret
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Authorization failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The server has no secret configured
    #[error("Admin secret not configured")]
    NotConfigured,
    /// Secret missing or mismatched
    #[error("Unauthorized")]
    Unauthorized,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotConfigured => ApiError::Configuration(err.to_string()),
            AuthError::Unauthorized => ApiError::Unauthorized,
        }
    }
}

/// Shared-secret gate for privileged requests
#[derive(Clone)]
pub struct AdminGate {
    secret: Option<String>,
    max_body_bytes: usize,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.is_configured())
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl AdminGate {
    /// Create a gate. A blank secret counts as unconfigured.
    pub fn new(secret: Option<String>, max_body_bytes: usize) -> Self {
        let secret = secret
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            secret,
            max_body_bytes,
        }
    }

    /// Whether a server secret is configured
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Largest body read while looking for a body secret
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Check a provided secret against the configured one.
    pub fn authorize(&self, provided: Option<&str>) -> Result<(), AuthError> {
        let expected = self.secret.as_deref().ok_or(AuthError::NotConfigured)?;
        match provided {
            Some(provided) if constant_time_compare(provided, expected) => Ok(()),
            _ => Err(AuthError::Unauthorized),
        }
    }
}

/// Resolve the caller's secret from the header, then the JSON body.
pub fn resolve_secret(headers: &HeaderMap, body: Option<&Value>) -> Option<String> {
    let header = headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(secret) = header {
        return Some(secret.to_string());
    }

    let body = body?;
    ["adminSecret", "secret"]
        .iter()
        .filter_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Constant-time string comparison.
///
/// Takes the same time however many leading bytes match.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    // Pad to the longer length with different bytes so unequal lengths never match
    let max_len = std::cmp::max(a.len(), b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}

/// Proof that the request carried the admin secret.
///
/// Consumes the request body; must be the last extractor of a handler.
#[derive(Debug, Clone, Default)]
pub struct AdminAuthorized {
    /// Parsed JSON body, when the request had one
    pub body: Option<Value>,
}

#[async_trait]
impl<S> FromRequest<S> for AdminAuthorized
where
    Arc<AdminGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<AdminGate>::from_ref(state);
        if !gate.is_configured() {
            return Err(AuthError::NotConfigured.into());
        }

        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, gate.max_body_bytes())
            .await
            .map_err(|_| ApiError::PayloadTooLarge)?;
        // A non-JSON body simply carries no secret
        let body = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice::<Value>(&bytes).ok()
        };

        let provided = resolve_secret(&parts.headers, body.as_ref());
        if let Err(e) = gate.authorize(provided.as_deref()) {
            warn!(
                path = %parts.uri.path(),
                secret_supplied = provided.is_some(),
                "admin authorization failed"
            );
            return Err(e.into());
        }

        Ok(AdminAuthorized { body })
    }
}
