//! # Tier Wiring
//!
//! Builds the explicit [`VerificationDependencies`] bundle from
//! [`StorageConfig`].
//!
//! ```text
//!   data_dir/kv     ──→ FileTier (KV)  ──→ KvChainMetadata
//!   data_dir/blobs  ──→ FileTier (R2)       (when blob_enabled)
//!   gateway + write-through URLs ──→ HttpGatewayTier + HttpWriteThrough
//!   neither URL     ──→ FileContentStore under data_dir/content (content, write-through, index)
//! ```

use crate::domain::config::StorageConfig;
use crate::domain::error::GatewayError;
use std::sync::Arc;
use tier_verification::adapters::{
    FileContentStore, FileTier, HttpGatewayTier, HttpWriteThrough, KvChainMetadata,
    SystemTimeSource,
};
use tier_verification::{
    BlockWriteThrough, ContentIndex, StorageTier, TierKind, VerificationDependencies,
};
use tracing::{info, warn};

/// Wire every tier handle the engine needs.
pub fn build_dependencies(storage: &StorageConfig) -> Result<VerificationDependencies, GatewayError> {
    let kv: Arc<dyn StorageTier> = Arc::new(FileTier::new(TierKind::Kv, storage.kv_dir()));

    let blob: Option<Arc<dyn StorageTier>> = if storage.blob_enabled {
        Some(Arc::new(FileTier::new(TierKind::R2, storage.blob_dir())))
    } else {
        info!("blob tier disabled");
        None
    };

    let (content, write_through, content_index) = build_content_tier(storage)?;

    Ok(VerificationDependencies {
        chain: Arc::new(KvChainMetadata::new(Arc::clone(&kv))),
        kv,
        blob,
        content,
        write_through,
        content_index,
        time: Arc::new(SystemTimeSource),
    })
}

type ContentHandles = (
    Arc<dyn StorageTier>,
    Arc<dyn BlockWriteThrough>,
    Option<Arc<dyn ContentIndex>>,
);

fn build_content_tier(storage: &StorageConfig) -> Result<ContentHandles, GatewayError> {
    match (&storage.ipfs_gateway_url, &storage.write_through_url) {
        (Some(gateway), Some(endpoint)) => {
            let content = HttpGatewayTier::new(gateway.as_str())
                .map_err(|e| GatewayError::Storage(e.to_string()))?;
            let write_through = HttpWriteThrough::new(endpoint.as_str())
                .map_err(|e| GatewayError::Storage(e.to_string()))?;
            info!(gateway = %gateway, write_through = %endpoint, "remote content tier");
            Ok((Arc::new(content), Arc::new(write_through), None))
        }
        (None, None) => {
            warn!(
                root = %storage.content_dir().display(),
                "no IPFS gateway configured; using the local content store"
            );
            let store = Arc::new(FileContentStore::new(
                storage.content_dir(),
                storage.content_index_dir(),
            ));
            Ok((
                Arc::clone(&store) as Arc<dyn StorageTier>,
                Arc::clone(&store) as Arc<dyn BlockWriteThrough>,
                Some(store as Arc<dyn ContentIndex>),
            ))
        }
        _ => Err(GatewayError::Config(
            "ipfs_gateway_url and write_through_url must be set together".into(),
        )),
    }
}
