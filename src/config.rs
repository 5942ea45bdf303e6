use crate::legend::LegendConfig;
use crate::utils::style::{BUILTIN_PALETTES, is_builtin_palette};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MANIFEST_URL: &str =
    "https://cdn.conflictnightlight.com/conflict-nightlight-bounded-map-options.json";

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Remote(String),
    Local(PathBuf),
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "nightcompare",
    version,
    about = "Side-by-side nightlight comparison viewer"
)]
pub struct Config {
    /// Port to serve the viewer on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// URL of the published layer manifest
    #[arg(long, default_value = DEFAULT_MANIFEST_URL)]
    pub manifest_url: String,

    /// Read the layer manifest from a local JSON file instead of the URL
    #[arg(long)]
    pub manifest_file: Option<PathBuf>,

    /// Replace the built-in regions with a JSON catalog
    #[arg(long)]
    pub regions_file: Option<PathBuf>,

    /// Extra attempts after a failed manifest fetch
    #[arg(long, default_value_t = 2)]
    pub manifest_retries: u32,

    /// Delay before the first retry, grows linearly with each attempt
    #[arg(long, default_value_t = 500)]
    pub retry_backoff_ms: u64,

    /// Timeout for a single manifest request
    #[arg(long, default_value_t = 15)]
    pub fetch_timeout_secs: u64,

    /// Built-in colour palette for the legend (viridis, magma, ...)
    #[arg(long, value_parser = parse_palette)]
    pub legend_palette: Option<String>,

    /// Legend colours from low to high intensity
    #[arg(long, value_delimiter = ',', default_values_t = ["#161616".to_string(), "#929191".to_string()])]
    pub legend_colours: Vec<String>,

    /// Upper bound of the legend's intensity axis
    #[arg(long, default_value_t = 2000.0)]
    pub legend_max: f64,

    /// Basemap drawn under the nightlight layers
    #[arg(
        long,
        default_value = "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png"
    )]
    pub basemap_url: String,

    /// Access token appended to mapbox:// tile locators
    #[arg(long, env = "MAPBOX_TOKEN", hide_env_values = true)]
    pub mapbox_token: Option<String>,

    /// Analytics measurement id injected into the page
    #[arg(long, env = "ANALYTICS_ID", hide_env_values = true)]
    pub analytics_id: Option<String>,
}

fn parse_palette(name: &str) -> Result<String, String> {
    if is_builtin_palette(name) {
        Ok(name.to_string())
    } else {
        Err(format!(
            "unknown palette '{}', expected one of: {}",
            name,
            BUILTIN_PALETTES.join(", ")
        ))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from(["nightcompare"])
    }
}

impl Config {
    pub fn source(&self) -> Source {
        match &self.manifest_file {
            Some(path) => Source::Local(path.clone()),
            None => Source::Remote(self.manifest_url.clone()),
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn legend(&self) -> LegendConfig {
        LegendConfig {
            colours: self.legend_colours.clone(),
            palette: self.legend_palette.clone(),
            max: self.legend_max,
            ..LegendConfig::default()
        }
    }
}
