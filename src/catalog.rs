use crate::error::CatalogError;
use crate::models::region::{LatLon, LayerIndex, LayerSelection, Region, ZoomBounds};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_REGION_ID: u32 = 2;

/// Entry of the region dropdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionOption {
    pub id: u32,
    pub label: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    default_region: u32,
    regions: Vec<Region>,
}

/// Static, read-only list of the regions the viewer can show.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    default_region: u32,
}

impl Default for RegionCatalog {
    fn default() -> Self {
        RegionCatalog {
            regions: builtin_regions(),
            default_region: DEFAULT_REGION_ID,
        }
    }
}

impl RegionCatalog {
    pub fn new(regions: Vec<Region>, default_region: u32) -> Result<Self, CatalogError> {
        if regions.is_empty() {
            return Err(CatalogError::Empty);
        }
        if !regions.iter().any(|r| r.id == default_region) {
            return Err(CatalogError::UnknownDefault(default_region));
        }
        Ok(RegionCatalog {
            regions,
            default_region,
        })
    }

    /// Load a catalog from a JSON file of the form `{"default_region": 2, "regions": [...]}`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        Self::new(file.regions, file.default_region)
    }

    pub fn get_region(&self, id: u32) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn default_region(&self) -> &Region {
        self.get_region(self.default_region)
            .unwrap_or(&self.regions[0])
    }

    /// Look up `id`, falling back to the default region when it is unknown.
    pub fn get_or_default(&self, id: u32) -> &Region {
        match self.get_region(id) {
            Some(region) => region,
            None => {
                let fallback = self.default_region();
                tracing::warn!(
                    region = id,
                    fallback = fallback.id,
                    "Region not found, using default region"
                );
                fallback
            }
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn options(&self) -> Vec<RegionOption> {
        self.regions
            .iter()
            .map(|r| RegionOption {
                id: r.id,
                label: r.label.clone(),
            })
            .collect()
    }
}

fn builtin_regions() -> Vec<Region> {
    vec![
        Region {
            id: 1,
            label: "Ukraine".to_string(),
            zoom: ZoomBounds {
                min: 4.0,
                max: 8.0,
                default: 5.0,
            },
            bounds: [[21.0, 43.3], [41.3, 54.5]],
            starting_location: LatLon {
                latitude: 48.5,
                longitude: 32.5,
            },
            map_selections: LayerSelection {
                left_map_index: LayerIndex::At(7),
                right_map_index: LayerIndex::Last,
            },
        },
        Region {
            id: 2,
            label: "Palestine".to_string(),
            zoom: ZoomBounds {
                min: 5.0,
                max: 9.0,
                default: 8.0,
            },
            bounds: [[33.6, 30.05], [37.5, 34.85]],
            starting_location: LatLon {
                latitude: 32.0,
                longitude: 35.0,
            },
            map_selections: LayerSelection {
                left_map_index: LayerIndex::At(7),
                right_map_index: LayerIndex::Last,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_defaults_to_palestine() {
        let catalog = RegionCatalog::default();
        let region = catalog.default_region();
        assert_eq!(region.id, 2);
        assert_eq!(region.zoom.default, 8.0);
        assert_eq!(region.starting_location.latitude, 32.0);
        assert_eq!(region.starting_location.longitude, 35.0);
    }

    #[test]
    fn unknown_region_falls_back_to_default() {
        let catalog = RegionCatalog::default();
        assert!(catalog.get_region(99).is_none());
        assert_eq!(catalog.get_or_default(99).id, DEFAULT_REGION_ID);
        assert_eq!(catalog.get_or_default(1).label, "Ukraine");
    }

    #[test]
    fn options_list_every_region_in_order() {
        let options = RegionCatalog::default().options();
        let ids: Vec<u32> = options.iter().map(|o| o.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn loads_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"default_region": 5, "regions": [{{
                "id": 5, "label": "Sudan",
                "zoom": {{"min": 4, "max": 9, "default": 6}},
                "bounds": [[21.8, 8.6], [38.6, 22.2]],
                "starting_location": {{"latitude": 15.5, "longitude": 32.5}},
                "map_selections": {{"left_map_index": 0, "right_map_index": -1}}
            }}]}}"#
        )
        .unwrap();

        let catalog = RegionCatalog::from_file(file.path()).unwrap();
        let region = catalog.default_region();
        assert_eq!(region.label, "Sudan");
        assert_eq!(region.map_selections.right_map_index, LayerIndex::Last);
    }

    #[test]
    fn rejects_default_that_is_not_listed() {
        let regions = RegionCatalog::default().regions().to_vec();
        assert!(matches!(
            RegionCatalog::new(regions, 7),
            Err(CatalogError::UnknownDefault(7))
        ));
        assert!(matches!(RegionCatalog::new(Vec::new(), 1), Err(CatalogError::Empty)));
    }
}
