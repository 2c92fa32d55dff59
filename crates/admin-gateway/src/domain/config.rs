//! Gateway configuration with validation.
//!
//! Every handle the service needs (secret, tier locations, engine layout) is
//! loaded here once and passed down explicitly.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tier_verification::VerificationConfig;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Admin secret configuration
    pub admin: AdminConfig,
    /// Storage tier locations
    pub storage: StorageConfig,
    /// Request limits
    pub limits: LimitsConfig,
    /// Verification engine configuration
    pub verification: VerificationConfig,
}

impl GatewayConfig {
    /// Load configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `LEDGER_HTTP_HOST` | `127.0.0.1` |
    /// | `LEDGER_HTTP_PORT` | `8787` |
    /// | `LEDGER_ADMIN_SECRET` / `ADMIN_SECRET` | unset |
    /// | `LEDGER_DATA_DIR` | `./data` |
    /// | `LEDGER_BLOB_ENABLED` | `true` |
    /// | `LEDGER_IPFS_GATEWAY_URL` | unset (local content store) |
    /// | `LEDGER_WRITE_THROUGH_URL` | unset (local content store) |
    /// | `LEDGER_MAX_BODY_BYTES` | `65536` |
    /// | `LEDGER_REQUEST_TIMEOUT_SECS` | `300` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(host) = var("LEDGER_HTTP_HOST") {
            config.http.host = host
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("LEDGER_HTTP_HOST: {}", host)))?;
        }
        if let Some(port) = var("LEDGER_HTTP_PORT") {
            config.http.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("LEDGER_HTTP_PORT: {}", port)))?;
        }

        config.admin.secret = var("LEDGER_ADMIN_SECRET").or_else(|| var("ADMIN_SECRET"));

        if let Some(dir) = var("LEDGER_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(enabled) = var("LEDGER_BLOB_ENABLED") {
            config.storage.blob_enabled = chain_telemetry::parse_flag(&enabled);
        }
        config.storage.ipfs_gateway_url = var("LEDGER_IPFS_GATEWAY_URL");
        config.storage.write_through_url = var("LEDGER_WRITE_THROUGH_URL");

        if let Some(bytes) = var("LEDGER_MAX_BODY_BYTES") {
            config.limits.max_body_bytes = bytes
                .parse()
                .map_err(|_| ConfigError::InvalidLimit(format!("LEDGER_MAX_BODY_BYTES: {}", bytes)))?;
        }
        if let Some(secs) = var("LEDGER_REQUEST_TIMEOUT_SECS") {
            config.limits.request_timeout_secs = secs.parse().map_err(|_| {
                ConfigError::InvalidLimit(format!("LEDGER_REQUEST_TIMEOUT_SECS: {}", secs))
            })?;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Invalid("http port cannot be 0".into()));
        }

        if self.limits.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit("max_body_bytes cannot be 0".into()));
        }

        if self.limits.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidLimit(
                "request_timeout_secs cannot be 0".into(),
            ));
        }

        // Remote content store needs both halves
        if self.storage.ipfs_gateway_url.is_some() != self.storage.write_through_url.is_some() {
            return Err(ConfigError::Invalid(
                "ipfs_gateway_url and write_through_url must be set together".into(),
            ));
        }

        self.verification
            .validate()
            .map_err(|e| ConfigError::Verification(e.to_string()))
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8787)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8787,
        }
    }
}

/// Admin secret configuration
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared admin secret. Unset means every privileged request fails closed.
    pub secret: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Storage tier locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for the file-backed tiers and the local content store
    pub data_dir: PathBuf,
    /// Whether the blob tier is deployed
    pub blob_enabled: bool,
    /// IPFS HTTP gateway base URL
    pub ipfs_gateway_url: Option<String>,
    /// Unified write-through endpoint
    pub write_through_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            blob_enabled: true,
            ipfs_gateway_url: None,
            write_through_url: None,
        }
    }
}

impl StorageConfig {
    /// Key-value tier directory
    pub fn kv_dir(&self) -> PathBuf {
        self.data_dir.join("kv")
    }

    /// Blob tier directory
    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    /// Local content store payload directory
    pub fn content_dir(&self) -> PathBuf {
        self.data_dir.join("content")
    }

    /// Local content store block number index
    pub fn content_index_dir(&self) -> PathBuf {
        self.data_dir.join("content-index")
    }
}

/// Request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 64KB)
    pub max_body_bytes: usize,
    /// Per-request timeout in seconds; covers full verification runs
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
            request_timeout_secs: 300,
        }
    }
}

impl LimitsConfig {
    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid size or time limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid engine configuration
    #[error("invalid verification config: {0}")]
    Verification(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
