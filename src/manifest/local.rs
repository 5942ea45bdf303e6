use super::ManifestSource;
use crate::error::ManifestError;
use crate::models::layer::BoundedLayerOptions;
use async_trait::async_trait;
use std::path::PathBuf;

/// Manifest read from a JSON file on disk. Re-read on every fetch so edits show
/// up on the next region selection.
pub struct LocalManifest {
    path: PathBuf,
}

impl LocalManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalManifest { path: path.into() }
    }
}

#[async_trait]
impl ManifestSource for LocalManifest {
    async fn fetch_manifest(&self) -> Result<Vec<BoundedLayerOptions>, ManifestError> {
        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ManifestError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_slice(&content)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_manifest_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"bounds": 2, "maps_options": [{{"display_name": "Oct 2023", "url": "mapbox://a", "key": "k"}}]}}]"#
        )
        .unwrap();

        let manifest = LocalManifest::new(file.path()).fetch_manifest().await.unwrap();
        assert_eq!(manifest[0].maps_options[0].key, "k");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalManifest::new(dir.path().join("missing.json"));
        assert!(matches!(
            source.fetch_manifest().await,
            Err(ManifestError::Io { .. })
        ));
    }
}
