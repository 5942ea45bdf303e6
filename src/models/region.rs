use crate::models::camera::CameraState;
use crate::models::layer::LayerManifestEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: u32,
    pub label: String,
    pub zoom: ZoomBounds,
    /// `[[min_lon, min_lat], [max_lon, max_lat]]`
    pub bounds: [[f64; 2]; 2],
    pub starting_location: LatLon,
    pub map_selections: LayerSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSelection {
    pub left_map_index: LayerIndex,
    pub right_map_index: LayerIndex,
}

/// Position of a default layer in a region's manifest. `-1` on the wire is the last layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum LayerIndex {
    At(usize),
    Last,
}

impl TryFrom<i64> for LayerIndex {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(LayerIndex::Last),
            v if v >= 0 => usize::try_from(v)
                .map(LayerIndex::At)
                .map_err(|e| format!("Invalid layer index {}: {}", v, e)),
            v => Err(format!(
                "Invalid layer index {}: only -1 (last layer) may be negative",
                v
            )),
        }
    }
}

impl From<LayerIndex> for i64 {
    fn from(index: LayerIndex) -> Self {
        match index {
            // Saturates; anything that large is past the end and clamps anyway.
            LayerIndex::At(i) => i64::try_from(i).unwrap_or(i64::MAX),
            LayerIndex::Last => -1,
        }
    }
}

impl LayerIndex {
    /// Resolve against a manifest of `len` layers. Indices past the end clamp to
    /// the last layer; an empty manifest resolves to nothing.
    pub fn resolve(self, len: usize) -> Option<usize> {
        let last = len.checked_sub(1)?;
        Some(match self {
            LayerIndex::Last => last,
            LayerIndex::At(i) => i.min(last),
        })
    }

    /// True when the index points past a manifest of `len` layers and will be clamped.
    pub fn is_out_of_range(self, len: usize) -> bool {
        matches!(self, LayerIndex::At(i) if len > 0 && i >= len)
    }
}

impl Region {
    pub fn initial_camera(&self) -> CameraState {
        CameraState::new(
            self.starting_location.latitude,
            self.starting_location.longitude,
            self.zoom.default,
        )
    }

    /// Default left/right layers for a freshly fetched manifest.
    pub fn default_layers(
        &self,
        layers: &[LayerManifestEntry],
    ) -> (Option<LayerManifestEntry>, Option<LayerManifestEntry>) {
        let pick = |index: LayerIndex| index.resolve(layers.len()).map(|i| layers[i].clone());
        (
            pick(self.map_selections.left_map_index),
            pick(self.map_selections.right_map_index),
        )
    }
}
