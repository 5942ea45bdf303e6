use crate::catalog::RegionCatalog;
use crate::config::{Config, Source};
use crate::endpoints::handlers::{
    get_region, get_region_layers, get_region_view, legend_handler, legend_png_handler,
    list_regions, webmap_handler,
};
use crate::endpoints::map::render_page;
use crate::endpoints::ws::viewer_ws;
use crate::legend::ColorLegend;
use crate::manifest::{LocalManifest, ManifestLoader, ManifestSource, RemoteManifest};
use crate::models::layer::layers_for_region;
use crate::utils::summary::print_region_summary;
use crate::utils::tiles::TileUrlResolver;
use anyhow::Context;
use axum::{Router, routing::get};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub catalog: Arc<RegionCatalog>,
    pub loader: ManifestLoader,
    pub tiles: TileUrlResolver,
    pub legend: ColorLegend,
    pub page: String,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let catalog = match &config.regions_file {
            Some(path) => RegionCatalog::from_file(path)
                .with_context(|| format!("loading regions from {}", path.display()))?,
            None => RegionCatalog::default(),
        };

        let source: Arc<dyn ManifestSource> = match config.source() {
            Source::Remote(url) => Arc::new(RemoteManifest::new(url, config.fetch_timeout())?),
            Source::Local(path) => Arc::new(LocalManifest::new(path)),
        };
        let loader = ManifestLoader::new(source)
            .with_retries(config.manifest_retries, config.retry_backoff());

        let legend = ColorLegend::new(config.legend()).context("building legend")?;
        let tiles = TileUrlResolver::new(config.mapbox_token.clone());
        if !tiles.has_token() {
            tracing::warn!("MAPBOX_TOKEN is not set, mapbox:// layers will not load");
        }

        Ok(AppState {
            catalog: Arc::new(catalog),
            loader,
            tiles,
            legend,
            page: render_page(&config.basemap_url, config.analytics_id.as_deref()),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(webmap_handler))
        .route("/map", get(webmap_handler))
        .route("/regions", get(list_regions))
        .route("/regions/{id}", get(get_region))
        .route("/regions/{id}/layers", get(get_region_layers))
        .route("/regions/{id}/view", get(get_region_view))
        .route("/legend", get(legend_handler))
        .route("/legend.png", get(legend_png_handler))
        .route("/ws", get(viewer_ws))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ViewerServer {
    config: Config,
    state: AppState,
}

impl ViewerServer {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let state = AppState::new(&config)?;
        Ok(Self { config, state })
    }

    /// Fetch the manifest once and print what every region will start with.
    async fn print_summary(&self) {
        let source = self.state.loader.source();
        let manifest = match source.fetch_manifest().await {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    source = %source.describe(),
                    "Could not fetch manifest at startup, sessions will retry"
                );
                Vec::new()
            }
        };
        let counts: HashMap<u32, usize> = self
            .state
            .catalog
            .regions()
            .iter()
            .map(|region| {
                let count = layers_for_region(manifest.clone(), region.id).len();
                (region.id, count)
            })
            .collect();

        print_region_summary(
            self.state.catalog.regions(),
            &counts,
            self.state.catalog.default_region().id,
            &self.state.legend,
        );
    }

    pub async fn start(self) -> anyhow::Result<()> {
        self.print_summary().await;

        let describe = self.state.loader.source().describe();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let app = router(Arc::new(self.state));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {}", addr))?;

        println!(
            r#"
    🚀 nightcompare serving on {}

    🛰️ Layer manifest
       → {}

    🌍 Compare nightlight layers side by side
       → http://{}/

    📚 Regions and their layers (JSON)
       → http://{}/regions
       → http://{}/regions/{{id}}/layers

    🎨 Legend
       → http://{}/legend.png
            "#,
            addr, describe, addr, addr, addr, addr
        );
        tracing::info!(%addr, "nightcompare listening");

        axum::serve(listener, app).await.context("server failed")?;

        Ok(())
    }
}
