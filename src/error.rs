use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("manifest endpoint returned {status}")]
    Status { status: u16 },
    #[error("manifest is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read region catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("region catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("region catalog is empty")]
    Empty,
    #[error("default region {0} is not in the catalog")]
    UnknownDefault(u32),
}

#[derive(Debug, thiserror::Error)]
pub enum LegendError {
    #[error("invalid legend colour {colour:?}: {reason}")]
    Colour { colour: String, reason: String },
    #[error("legend needs at least two colours, got {0}")]
    TooFewColours(usize),
    #[error("unknown legend palette {0:?}")]
    UnknownPalette(String),
    #[error("legend domain {min}..{max} is empty")]
    EmptyDomain { min: f64, max: f64 },
    #[error("failed to encode legend image: {0}")]
    Encode(#[from] image::ImageError),
}
