use super::ManifestSource;
use crate::error::ManifestError;
use crate::models::layer::BoundedLayerOptions;
use async_trait::async_trait;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Manifest published as JSON behind an HTTP endpoint.
pub struct RemoteManifest {
    http: reqwest::Client,
    url: String,
}

impl RemoteManifest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ManifestError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(RemoteManifest {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ManifestSource for RemoteManifest {
    async fn fetch_manifest(&self) -> Result<Vec<BoundedLayerOptions>, ManifestError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ManifestError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
