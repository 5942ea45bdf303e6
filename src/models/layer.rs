use serde::{Deserialize, Serialize};

/// A single selectable raster dataset, e.g. one month of nightlight imagery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerManifestEntry {
    pub display_name: String,
    /// Tile-source locator, either `mapbox://<tileset>` or an XYZ template.
    pub url: String,
    /// Stable identity, e.g. `Monthly-PalestineA_2023-10-1`.
    pub key: String,
}

/// One element of the published manifest: every layer available for a region.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundedLayerOptions {
    pub bounds: u32,
    #[serde(default)]
    pub maps_options: Vec<LayerManifestEntry>,
}

/// Pick the layers published for `region_id`, in manifest order.
pub fn layers_for_region(manifest: Vec<BoundedLayerOptions>, region_id: u32) -> Vec<LayerManifestEntry> {
    manifest
        .into_iter()
        .find(|options| options.bounds == region_id)
        .map(|options| options.maps_options)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"[
        {"bounds": 1, "maps_options": [
            {"display_name": "Jan 2022", "url": "mapbox://nl.ua-2022-01", "key": "Monthly-UkraineAnd_2022-1-1",
             "map": {"date": {"day": 1, "month": 1, "year": 2022}}}
        ]},
        {"bounds": 2, "maps_options": [
            {"display_name": "Sep 2023", "url": "mapbox://nl.ps-2023-09", "key": "Monthly-PalestineA_2023-9-1"},
            {"display_name": "Oct 2023", "url": "mapbox://nl.ps-2023-10", "key": "Monthly-PalestineA_2023-10-1"}
        ]},
        {"bounds": 3}
    ]"#;

    #[test]
    fn picks_layers_for_the_matching_bounds_in_order() {
        let manifest: Vec<BoundedLayerOptions> = serde_json::from_str(MANIFEST).unwrap();
        let layers = layers_for_region(manifest, 2);
        let names: Vec<_> = layers.iter().map(|l| l.display_name.as_str()).collect();
        assert_eq!(names, ["Sep 2023", "Oct 2023"]);
    }

    #[test]
    fn unknown_fields_are_ignored_and_missing_options_are_empty() {
        let manifest: Vec<BoundedLayerOptions> = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(manifest[0].maps_options[0].key, "Monthly-UkraineAnd_2022-1-1");
        assert!(layers_for_region(manifest, 3).is_empty());
    }

    #[test]
    fn region_missing_from_manifest_has_no_layers() {
        let manifest: Vec<BoundedLayerOptions> = serde_json::from_str(MANIFEST).unwrap();
        assert!(layers_for_region(manifest, 42).is_empty());
    }
}
