use crate::catalog::RegionCatalog;
use crate::coordinator::{DualPanelCoordinator, PanelLink, RegionRequest};
use crate::manifest::ManifestLoader;
use crate::models::camera::{CameraState, Panel};
use crate::models::layer::LayerManifestEntry;
use crate::models::region::Region;
use crate::utils::tiles::TileUrlResolver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Messages from the page.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerEvent {
    SelectRegion { region: u32 },
    MoveStart { panel: Panel },
    Move { panel: Panel, camera: CameraState },
    SelectLayer { panel: Panel, layer: LayerManifestEntry },
}

/// Messages to the page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerUpdate {
    Region(RegionView),
    Camera { camera: CameraState, driver: Panel },
    Panel { panel: Panel, view: Option<PanelView> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStatus {
    Loading,
    Ready,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerOption {
    pub label: String,
    pub value: LayerManifestEntry,
}

/// What one panel should render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub layer: LayerManifestEntry,
    pub tile_url: String,
    /// The panel's tile layer is rebuilt only when this changes.
    pub render_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionView {
    pub region: Region,
    pub status: ViewStatus,
    pub layers: Vec<LayerOption>,
    pub left: Option<PanelView>,
    pub right: Option<PanelView>,
    pub camera: CameraState,
}

impl PanelView {
    pub fn new(layer: &LayerManifestEntry, tiles: &TileUrlResolver) -> Self {
        PanelView {
            tile_url: tiles.resolve(&layer.url),
            render_key: layer.key.clone(),
            layer: layer.clone(),
        }
    }
}

impl RegionView {
    /// Region still waiting for its layers.
    pub fn loading(region: &Region, camera: CameraState) -> Self {
        RegionView {
            region: region.clone(),
            status: ViewStatus::Loading,
            layers: Vec::new(),
            left: None,
            right: None,
            camera,
        }
    }

    pub fn from_coordinator(
        region: &Region,
        layers: &[LayerManifestEntry],
        coordinator: &DualPanelCoordinator,
        tiles: &TileUrlResolver,
    ) -> Self {
        let view = |panel| coordinator.selection(panel).map(|l| PanelView::new(l, tiles));
        RegionView {
            region: region.clone(),
            status: if coordinator.is_ready() {
                ViewStatus::Ready
            } else {
                ViewStatus::Loading
            },
            layers: layers
                .iter()
                .map(|l| LayerOption {
                    label: l.display_name.clone(),
                    value: l.clone(),
                })
                .collect(),
            left: view(Panel::Left),
            right: view(Panel::Right),
            camera: coordinator.camera(),
        }
    }
}

#[derive(Debug)]
struct LoadedManifest {
    request: RegionRequest,
    layers: Vec<LayerManifestEntry>,
}

/// One client's comparison session. Stale manifest fetches are dropped.
pub struct Viewer {
    catalog: Arc<RegionCatalog>,
    loader: ManifestLoader,
    tiles: TileUrlResolver,
    coordinator: DualPanelCoordinator,
    region: Region,
    layers: Vec<LayerManifestEntry>,
}

impl Viewer {
    pub fn new(catalog: Arc<RegionCatalog>, loader: ManifestLoader, tiles: TileUrlResolver) -> Self {
        let region = catalog.default_region().clone();
        Viewer {
            coordinator: DualPanelCoordinator::for_region(&region),
            catalog,
            loader,
            tiles,
            region,
            layers: Vec::new(),
        }
    }

    pub fn coordinator(&self) -> &DualPanelCoordinator {
        &self.coordinator
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Drive the session until the client goes away. Starts on the default region.
    ///
    /// Camera updates never block the session: while `updates` is full only the
    /// newest one is kept and sent once there is room.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ViewerEvent>,
        updates: mpsc::Sender<ViewerUpdate>,
    ) {
        let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel::<LoadedManifest>();

        let initial = self.region.id;
        let (request, update) = self.begin_region(initial);
        self.spawn_fetch(request, loaded_tx.clone());
        if updates.send(update).await.is_err() {
            return;
        }

        // Newest camera update waiting for room in `updates`.
        let mut pending_camera: Option<ViewerUpdate> = None;

        loop {
            let update = tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        ViewerEvent::SelectRegion { region } => {
                            let (request, update) = self.begin_region(region);
                            self.spawn_fetch(request, loaded_tx.clone());
                            Some(update)
                        }
                        other => self.handle(other),
                    }
                }
                Some(loaded) = loaded_rx.recv() => self.apply_manifest(loaded),
                permit = updates.reserve(), if pending_camera.is_some() => {
                    let Ok(permit) = permit else { break };
                    if let Some(camera) = pending_camera.take() {
                        permit.send(camera);
                    }
                    None
                }
            };

            match update {
                None => {}
                Some(camera @ ViewerUpdate::Camera { .. }) => {
                    if pending_camera.is_some() {
                        pending_camera = Some(camera);
                        continue;
                    }
                    match updates.try_send(camera) {
                        Ok(()) => {}
                        Err(TrySendError::Full(camera)) => pending_camera = Some(camera),
                        Err(TrySendError::Closed(_)) => break,
                    }
                }
                Some(update) => {
                    if matches!(update, ViewerUpdate::Region(_)) {
                        pending_camera = None;
                    }
                    if updates.send(update).await.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!(region = self.region.id, "Viewer session ended");
    }

    /// Switch to `region_id` (or the default region if unknown) and show it as
    /// loading until its manifest arrives.
    fn begin_region(&mut self, region_id: u32) -> (RegionRequest, ViewerUpdate) {
        self.region = self.catalog.get_or_default(region_id).clone();
        self.layers.clear();
        let request = self.coordinator.begin_region_request(self.region.id);
        tracing::info!(region = self.region.id, label = %self.region.label, "Region selected");
        let update = ViewerUpdate::Region(RegionView::loading(
            &self.region,
            self.region.initial_camera(),
        ));
        (request, update)
    }

    fn spawn_fetch(&self, request: RegionRequest, done: mpsc::UnboundedSender<LoadedManifest>) {
        let loader = self.loader.clone();
        tokio::spawn(async move {
            let layers = loader.fetch_layers(request.region_id).await;
            // The session may already be gone.
            let _ = done.send(LoadedManifest { request, layers });
        });
    }

    fn apply_manifest(&mut self, loaded: LoadedManifest) -> Option<ViewerUpdate> {
        let region = self.catalog.get_or_default(loaded.request.region_id).clone();
        if !self
            .coordinator
            .complete_region_request(&loaded.request, &region, &loaded.layers)
        {
            return None;
        }
        self.region = region;
        self.layers = loaded.layers;
        if !self.coordinator.is_ready() {
            tracing::warn!(region = self.region.id, "No layers to show, staying on loading screen");
        }
        Some(ViewerUpdate::Region(RegionView::from_coordinator(
            &self.region,
            &self.layers,
            &self.coordinator,
            &self.tiles,
        )))
    }

    /// Panel gestures and layer picks. Region changes go through `run`.
    fn handle(&mut self, event: ViewerEvent) -> Option<ViewerUpdate> {
        match event {
            ViewerEvent::MoveStart { panel } => {
                self.coordinator.panel(panel).report_move_start();
                None
            }
            ViewerEvent::Move { panel, camera } => {
                let mut link = self.coordinator.panel(panel);
                if !link.report_move(camera) {
                    tracing::trace!(%panel, "Ignoring move from inactive panel");
                    return None;
                }
                Some(ViewerUpdate::Camera {
                    camera: link.current_camera_state(),
                    driver: panel,
                })
            }
            ViewerEvent::SelectLayer { panel, layer } => {
                tracing::debug!(%panel, key = %layer.key, "Layer selected");
                let view = PanelView::new(&layer, &self.tiles);
                self.coordinator.select_layer(panel, layer);
                Some(ViewerUpdate::Panel {
                    panel,
                    view: Some(view),
                })
            }
            ViewerEvent::SelectRegion { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManifestError;
    use crate::manifest::ManifestSource;
    use crate::models::layer::BoundedLayerOptions;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn manifest_json(ukraine: usize, palestine: usize) -> String {
        let options = |prefix: &str, n: usize| {
            (0..n)
                .map(|i| {
                    serde_json::json!({
                        "display_name": format!("{} {}", prefix, i),
                        "url": format!("mapbox://nl.{}-{}", prefix, i),
                        "key": format!("{}-{}", prefix, i),
                    })
                })
                .collect::<Vec<_>>()
        };
        serde_json::json!([
            {"bounds": 1, "maps_options": options("ua", ukraine)},
            {"bounds": 2, "maps_options": options("ps", palestine)},
        ])
        .to_string()
    }

    /// Every fetch waits for a permit, then serves the same manifest.
    struct GatedSource {
        gate: Arc<Semaphore>,
        body: String,
    }

    #[async_trait]
    impl ManifestSource for GatedSource {
        async fn fetch_manifest(&self) -> Result<Vec<BoundedLayerOptions>, ManifestError> {
            self.gate.acquire().await.expect("gate closed").forget();
            Ok(serde_json::from_str(&self.body)?)
        }

        fn describe(&self) -> String {
            "gated".to_string()
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ManifestSource for FailingSource {
        async fn fetch_manifest(&self) -> Result<Vec<BoundedLayerOptions>, ManifestError> {
            Err(ManifestError::Status { status: 500 })
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn viewer(source: Arc<dyn ManifestSource>) -> Viewer {
        Viewer::new(
            Arc::new(RegionCatalog::default()),
            ManifestLoader::new(source),
            TileUrlResolver::new(Some("pk.test".to_string())),
        )
    }

    fn entries(prefix: &str, n: usize) -> Vec<LayerManifestEntry> {
        (0..n)
            .map(|i| LayerManifestEntry {
                display_name: format!("{} {}", prefix, i),
                url: format!("mapbox://nl.{}-{}", prefix, i),
                key: format!("{}-{}", prefix, i),
            })
            .collect()
    }

    async fn drain(updates: &mut mpsc::Receiver<ViewerUpdate>) -> Vec<ViewerUpdate> {
        let mut seen = Vec::new();
        while let Ok(Some(update)) =
            tokio::time::timeout(Duration::from_millis(200), updates.recv()).await
        {
            seen.push(update);
        }
        seen
    }

    #[test]
    fn stale_manifest_does_not_overwrite_newer_region() {
        let mut viewer = viewer(Arc::new(FailingSource));
        let (first, _) = viewer.begin_region(1);
        let (second, _) = viewer.begin_region(2);

        let applied = viewer.apply_manifest(LoadedManifest {
            request: second,
            layers: entries("ps", 10),
        });
        let stale = viewer.apply_manifest(LoadedManifest {
            request: first,
            layers: entries("ua", 12),
        });

        assert!(stale.is_none());
        let Some(ViewerUpdate::Region(view)) = applied else {
            panic!("expected a region update");
        };
        assert_eq!(view.status, ViewStatus::Ready);
        assert_eq!(view.left.unwrap().render_key, "ps-7");
        assert_eq!(view.right.unwrap().render_key, "ps-9");
        assert_eq!(viewer.region().id, 2);
        assert_eq!(
            viewer.coordinator().selection(Panel::Right).unwrap().key,
            "ps-9"
        );
    }

    #[test]
    fn empty_manifest_keeps_loading_state() {
        let mut viewer = viewer(Arc::new(FailingSource));
        let (request, _) = viewer.begin_region(2);
        let Some(ViewerUpdate::Region(view)) = viewer.apply_manifest(LoadedManifest {
            request,
            layers: Vec::new(),
        }) else {
            panic!("expected a region update");
        };
        assert_eq!(view.status, ViewStatus::Loading);
        assert!(view.left.is_none() && view.right.is_none());
    }

    #[test]
    fn unknown_region_selects_default() {
        let mut viewer = viewer(Arc::new(FailingSource));
        let (request, update) = viewer.begin_region(404);
        assert_eq!(request.region_id, 2);
        let ViewerUpdate::Region(view) = update else {
            panic!("expected a region update");
        };
        assert_eq!(view.status, ViewStatus::Loading);
        assert_eq!(view.camera, CameraState::new(32.0, 35.0, 8.0));
    }

    #[test]
    fn moves_from_inactive_panel_produce_no_update() {
        let mut viewer = viewer(Arc::new(FailingSource));
        assert!(viewer.handle(ViewerEvent::MoveStart { panel: Panel::Left }).is_none());

        let driven = viewer.handle(ViewerEvent::Move {
            panel: Panel::Left,
            camera: CameraState::new(31.9, 34.8, 8.3),
        });
        let ignored = viewer.handle(ViewerEvent::Move {
            panel: Panel::Right,
            camera: CameraState::new(0.0, 0.0, 2.0),
        });

        assert!(ignored.is_none());
        match driven {
            Some(ViewerUpdate::Camera { camera, driver }) => {
                assert_eq!(driver, Panel::Left);
                assert_eq!(camera, CameraState::new(31.9, 34.8, 8.3));
            }
            other => panic!("expected camera update, got {:?}", other),
        }
    }

    #[test]
    fn selecting_a_layer_resolves_its_tiles() {
        let mut viewer = viewer(Arc::new(FailingSource));
        let layer = entries("ps", 3).remove(1);
        let update = viewer.handle(ViewerEvent::SelectLayer {
            panel: Panel::Right,
            layer: layer.clone(),
        });
        let Some(ViewerUpdate::Panel { panel, view: Some(view) }) = update else {
            panic!("expected panel update");
        };
        assert_eq!(panel, Panel::Right);
        assert_eq!(view.render_key, "ps-1");
        assert_eq!(
            view.tile_url,
            "https://api.mapbox.com/v4/nl.ps-1/{z}/{x}/{y}.png?access_token=pk.test"
        );
        assert_eq!(viewer.coordinator().selection(Panel::Right), Some(&layer));
        assert!(viewer.coordinator().selection(Panel::Left).is_none());
    }

    #[test]
    fn events_parse_from_page_messages() {
        let event: ViewerEvent = serde_json::from_str(
            r#"{"type": "move", "panel": "right", "camera": {"latitude": 1.0, "longitude": 2.0, "zoom": 3.5}}"#,
        )
        .unwrap();
        assert!(matches!(
            event,
            ViewerEvent::Move { panel: Panel::Right, camera } if camera.zoom == 3.5
        ));
        let event: ViewerEvent =
            serde_json::from_str(r#"{"type": "select_region", "region": 1}"#).unwrap();
        assert!(matches!(event, ViewerEvent::SelectRegion { region: 1 }));
    }

    #[tokio::test]
    async fn rapid_region_switch_settles_on_last_region() {
        let gate = Arc::new(Semaphore::new(0));
        let source = Arc::new(GatedSource {
            gate: gate.clone(),
            body: manifest_json(12, 10),
        });
        let (event_tx, event_rx) = mpsc::channel(16);
        let (update_tx, mut update_rx) = mpsc::channel(16);
        tokio::spawn(viewer(source).run(event_rx, update_tx));

        event_tx.send(ViewerEvent::SelectRegion { region: 1 }).await.unwrap();
        event_tx.send(ViewerEvent::SelectRegion { region: 2 }).await.unwrap();

        let loading = drain(&mut update_rx).await;
        assert_eq!(loading.len(), 3);
        assert!(loading.iter().all(|u| matches!(
            u,
            ViewerUpdate::Region(view) if view.status == ViewStatus::Loading
        )));

        // Release every fetch at once; completion order does not matter.
        gate.add_permits(3);
        let settled = drain(&mut update_rx).await;

        let ready: Vec<&RegionView> = settled
            .iter()
            .filter_map(|u| match u {
                ViewerUpdate::Region(view) if view.status == ViewStatus::Ready => Some(view),
                _ => None,
            })
            .collect();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].region.id, 2);
        assert_eq!(ready[0].left.as_ref().unwrap().render_key, "ps-7");
        assert_eq!(ready[0].right.as_ref().unwrap().render_key, "ps-9");
        assert_eq!(ready[0].layers.len(), 10);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_session_loading() {
        let (event_tx, event_rx) = mpsc::channel(16);
        let (update_tx, mut update_rx) = mpsc::channel(16);
        tokio::spawn(viewer(Arc::new(FailingSource)).run(event_rx, update_tx));

        let updates = drain(&mut update_rx).await;
        assert!(!updates.is_empty());
        assert!(updates.iter().all(|u| matches!(
            u,
            ViewerUpdate::Region(view) if view.status == ViewStatus::Loading && view.left.is_none()
        )));

        // The session keeps serving gestures.
        event_tx.send(ViewerEvent::MoveStart { panel: Panel::Right }).await.unwrap();
        event_tx
            .send(ViewerEvent::Move {
                panel: Panel::Right,
                camera: CameraState::new(31.0, 34.0, 7.0),
            })
            .await
            .unwrap();
        assert!(matches!(
            update_rx.recv().await,
            Some(ViewerUpdate::Camera { driver: Panel::Right, .. })
        ));
    }

    #[tokio::test]
    async fn camera_flood_does_not_stall_the_session() {
        let source = Arc::new(GatedSource {
            gate: Arc::new(Semaphore::new(0)),
            body: manifest_json(0, 10),
        });
        let (event_tx, event_rx) = mpsc::channel(64);
        let (update_tx, mut update_rx) = mpsc::channel(64);
        tokio::spawn(viewer(source).run(event_rx, update_tx));

        let last = CameraState::new(31.5, 34.5, 9.0);
        let flood = async {
            event_tx.send(ViewerEvent::MoveStart { panel: Panel::Left }).await.unwrap();
            for i in 0..1000 {
                let camera = if i == 999 {
                    last
                } else {
                    CameraState::new(32.0, 35.0, 8.0 + i as f64 / 1000.0)
                };
                event_tx
                    .send(ViewerEvent::Move {
                        panel: Panel::Left,
                        camera,
                    })
                    .await
                    .unwrap();
            }
        };
        tokio::time::timeout(Duration::from_secs(5), flood)
            .await
            .expect("session stopped reading events");

        let updates = drain(&mut update_rx).await;
        match updates.last() {
            Some(ViewerUpdate::Camera { camera, driver }) => {
                assert_eq!(*driver, Panel::Left);
                assert_eq!(*camera, last);
            }
            other => panic!("expected the newest camera last, got {:?}", other),
        }
    }
}
