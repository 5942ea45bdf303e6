use crate::models::camera::{CameraState, Panel};
use crate::models::layer::LayerManifestEntry;
use crate::models::region::Region;

/// Ticket for an in-flight region change. Only the most recent one may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRequest {
    pub region_id: u32,
    generation: u64,
}

/// Shared camera and per-panel selection. Only the active panel moves the camera.
#[derive(Debug, Clone)]
pub struct DualPanelCoordinator {
    camera: CameraState,
    active: Option<Panel>,
    left: Option<LayerManifestEntry>,
    right: Option<LayerManifestEntry>,
    generation: u64,
}

impl DualPanelCoordinator {
    pub fn new(camera: CameraState) -> Self {
        DualPanelCoordinator {
            camera,
            active: None,
            left: None,
            right: None,
            generation: 0,
        }
    }

    pub fn for_region(region: &Region) -> Self {
        Self::new(region.initial_camera())
    }

    pub fn camera(&self) -> CameraState {
        self.camera
    }

    pub fn active_panel(&self) -> Option<Panel> {
        self.active
    }

    pub fn selection(&self, panel: Panel) -> Option<&LayerManifestEntry> {
        match panel {
            Panel::Left => self.left.as_ref(),
            Panel::Right => self.right.as_ref(),
        }
    }

    /// Both panels have a layer to render.
    pub fn is_ready(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn on_panel_move_start(&mut self, panel: Panel) {
        self.active = Some(panel);
    }

    /// Returns whether the camera was updated.
    pub fn on_panel_move(&mut self, panel: Panel, camera: CameraState) -> bool {
        if self.active != Some(panel) {
            return false;
        }
        self.camera = camera;
        true
    }

    pub fn select_layer(&mut self, panel: Panel, entry: LayerManifestEntry) {
        match panel {
            Panel::Left => self.left = Some(entry),
            Panel::Right => self.right = Some(entry),
        }
    }

    pub fn reset_for_region(&mut self, region: &Region, layers: &[LayerManifestEntry]) {
        let (left, right) = region.default_layers(layers);
        self.left = left;
        self.right = right;
        self.camera = region.initial_camera();
        self.active = None;
    }

    /// Start a region change; any request begun earlier becomes stale.
    pub fn begin_region_request(&mut self, region_id: u32) -> RegionRequest {
        self.generation += 1;
        RegionRequest {
            region_id,
            generation: self.generation,
        }
    }

    pub fn is_current(&self, request: &RegionRequest) -> bool {
        request.generation == self.generation
    }

    /// Apply the manifest fetched for `request`, unless a newer request has
    /// started since. Returns whether the reset was applied.
    pub fn complete_region_request(
        &mut self,
        request: &RegionRequest,
        region: &Region,
        layers: &[LayerManifestEntry],
    ) -> bool {
        if !self.is_current(request) {
            tracing::debug!(
                region = request.region_id,
                "Discarding manifest for superseded region request"
            );
            return false;
        }
        self.reset_for_region(region, layers);
        true
    }

    /// Capability handed to one panel.
    pub fn panel(&mut self, panel: Panel) -> PanelHandle<'_> {
        PanelHandle {
            coordinator: self,
            panel,
        }
    }
}

/// What a panel is allowed to do with the shared view.
pub trait PanelLink {
    fn report_move_start(&mut self);
    fn report_move(&mut self, camera: CameraState) -> bool;
    fn current_camera_state(&self) -> CameraState;
}

pub struct PanelHandle<'a> {
    coordinator: &'a mut DualPanelCoordinator,
    panel: Panel,
}

impl PanelLink for PanelHandle<'_> {
    fn report_move_start(&mut self) {
        self.coordinator.on_panel_move_start(self.panel);
    }

    fn report_move(&mut self, camera: CameraState) -> bool {
        self.coordinator.on_panel_move(self.panel, camera)
    }

    fn current_camera_state(&self) -> CameraState {
        self.coordinator.camera()
    }
}
