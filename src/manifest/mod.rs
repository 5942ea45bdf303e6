use crate::error::ManifestError;
use crate::models::layer::{BoundedLayerOptions, LayerManifestEntry, layers_for_region};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub mod local;
pub mod remote;

pub use local::LocalManifest;
pub use remote::RemoteManifest;

/// Where the published list of layers comes from.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch_manifest(&self) -> Result<Vec<BoundedLayerOptions>, ManifestError>;

    /// Human readable location, used in logs and the startup banner.
    fn describe(&self) -> String;
}

/// Fetches the layers of a region and never fails: errors are logged and an
/// empty list is returned so the viewer stays in its loading state.
#[derive(Clone)]
pub struct ManifestLoader {
    source: Arc<dyn ManifestSource>,
    retries: u32,
    backoff: Duration,
}

impl ManifestLoader {
    pub fn new(source: Arc<dyn ManifestSource>) -> Self {
        ManifestLoader {
            source,
            retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Retry failed fetches up to `retries` more times, waiting `backoff * attempt` between them.
    pub fn with_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.retries = retries;
        self.backoff = backoff;
        self
    }

    pub fn source(&self) -> &dyn ManifestSource {
        self.source.as_ref()
    }

    pub async fn fetch_layers(&self, region_id: u32) -> Vec<LayerManifestEntry> {
        let mut attempt = 0;
        let manifest = loop {
            match self.source.fetch_manifest().await {
                Ok(manifest) => break manifest,
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        region = region_id,
                        attempt,
                        "Manifest fetch failed, retrying"
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        region = region_id,
                        source = %self.source.describe(),
                        "Error fetching layer manifest"
                    );
                    return Vec::new();
                }
            }
        };

        let layers = layers_for_region(manifest, region_id);
        if layers.is_empty() {
            tracing::warn!(region = region_id, "Manifest has no layers for region");
        } else {
            tracing::debug!(region = region_id, count = layers.len(), "Fetched layers");
        }
        layers
    }
}
