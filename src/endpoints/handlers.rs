use crate::coordinator::DualPanelCoordinator;
use crate::endpoints::server::AppState;
use crate::models::region::Region;
use crate::viewer::RegionView;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MAX_LEGEND_SIZE: u32 = 2048;

#[derive(Serialize)]
struct LayerResponse {
    display_name: String,
    url: String,
    key: String,
    tile_url: String,
}

#[derive(Deserialize)]
pub struct LegendSize {
    width: Option<u32>,
    height: Option<u32>,
}

/// Any id that is not a known region, numeric or not, falls back to the default region.
fn region_from_path<'a>(state: &'a AppState, id: &str) -> &'a Region {
    match id.parse::<u32>() {
        Ok(id) => state.catalog.get_or_default(id),
        Err(_) => {
            tracing::warn!(region = id, "Invalid region id, using the default region");
            state.catalog.default_region()
        }
    }
}

pub async fn webmap_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(state.page.clone())
}

pub async fn list_regions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.catalog.options())
}

pub async fn get_region(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    Json(region_from_path(&state, &id).clone())
}

pub async fn get_region_layers(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let region = region_from_path(&state, &id);
    let layers: Vec<LayerResponse> = state
        .loader
        .fetch_layers(region.id)
        .await
        .into_iter()
        .map(|layer| LayerResponse {
            tile_url: state.tiles.resolve(&layer.url),
            display_name: layer.display_name,
            url: layer.url,
            key: layer.key,
        })
        .collect();

    (StatusCode::OK, Json(layers))
}

/// The view a fresh session would settle on for this region.
pub async fn get_region_view(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let region = region_from_path(&state, &id);
    let layers = state.loader.fetch_layers(region.id).await;
    let mut coordinator = DualPanelCoordinator::for_region(region);
    coordinator.reset_for_region(region, &layers);

    Json(RegionView::from_coordinator(
        region,
        &layers,
        &coordinator,
        &state.tiles,
    ))
}

pub async fn legend_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.legend.describe())
}

pub async fn legend_png_handler(
    Query(size): Query<LegendSize>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let width = size.width.unwrap_or(300).clamp(1, MAX_LEGEND_SIZE);
    let height = size.height.unwrap_or(8).clamp(1, MAX_LEGEND_SIZE);

    match state.legend.render_png(width, height) {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render legend");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
