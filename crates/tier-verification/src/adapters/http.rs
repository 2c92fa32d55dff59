//! HTTP adapters for the content-addressed tier.
//!
//! - [`HttpGatewayTier`]: reads pinned payloads through an IPFS gateway
//! - [`HttpWriteThrough`]: calls the unified block write-through endpoint

use crate::domain::errors::TierError;
use crate::domain::tier::TierKind;
use crate::ports::outbound::{BlockWriteThrough, PutOptions, StorageTier};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use shared_types::{Block, WriteThroughOutcome};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Largest gateway payload read by default (8 MiB)
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 8 * 1024 * 1024;

fn build_client() -> Result<Client, TierError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| TierError::backend(TierKind::Ipfs, e.to_string()))
}

fn request_error(e: reqwest::Error) -> TierError {
    if e.is_connect() {
        TierError::backend(TierKind::Ipfs, format!("connection failed: {}", e))
    } else if e.is_timeout() {
        TierError::backend(TierKind::Ipfs, "request timed out")
    } else {
        TierError::backend(TierKind::Ipfs, e.to_string())
    }
}

/// Read-only content-addressed tier over an IPFS HTTP gateway.
pub struct HttpGatewayTier {
    client: Client,
    base_url: String,
    max_payload_bytes: usize,
}

impl HttpGatewayTier {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TierError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        })
    }

    /// Override the payload size cap.
    pub fn with_max_payload_bytes(mut self, max_payload_bytes: usize) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self
    }

    fn url(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.base_url, cid)
    }

    fn oversized(&self) -> TierError {
        TierError::backend(
            TierKind::Ipfs,
            format!("gateway payload exceeds {} bytes", self.max_payload_bytes),
        )
    }

    /// Read the body in chunks, stopping at the size cap.
    async fn read_capped(&self, mut response: reqwest::Response) -> Result<Vec<u8>, TierError> {
        if response
            .content_length()
            .is_some_and(|len| len > self.max_payload_bytes as u64)
        {
            return Err(self.oversized());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            if body.len() + chunk.len() > self.max_payload_bytes {
                return Err(self.oversized());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl StorageTier for HttpGatewayTier {
    fn kind(&self) -> TierKind {
        TierKind::Ipfs
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TierError> {
        let response = self
            .client
            .get(self.url(key))
            .send()
            .await
            .map_err(request_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => self.read_capped(response).await.map(Some),
            status => Err(TierError::backend(
                TierKind::Ipfs,
                format!("gateway returned {}", status),
            )),
        }
    }

    async fn put(&self, _key: &str, _value: &[u8], _options: &PutOptions) -> Result<(), TierError> {
        Err(TierError::Unsupported {
            tier: TierKind::Ipfs,
            operation: "direct put",
        })
    }

    async fn probe(&self, key: &str) -> Result<bool, TierError> {
        let response = self
            .client
            .head(self.url(key))
            .send()
            .await
            .map_err(request_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(TierError::backend(
                TierKind::Ipfs,
                format!("gateway returned {}", status),
            )),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteThroughRequest<'a> {
    block_number: u64,
    block: &'a Block,
}

/// Client for the unified block write-through endpoint.
pub struct HttpWriteThrough {
    client: Client,
    endpoint: String,
}

impl HttpWriteThrough {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TierError> {
        Ok(Self {
            client: build_client()?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl BlockWriteThrough for HttpWriteThrough {
    async fn write_through(
        &self,
        block_number: u64,
        block: &Block,
    ) -> Result<WriteThroughOutcome, TierError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&WriteThroughRequest {
                block_number,
                block,
            })
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TierError::backend(
                TierKind::Ipfs,
                format!("write-through returned {}", status),
            ));
        }

        response
            .json::<WriteThroughOutcome>()
            .await
            .map_err(|e| TierError::parse(TierKind::Ipfs, e.to_string()))
    }
}
