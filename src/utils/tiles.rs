const MAPBOX_SCHEME: &str = "mapbox://";
const MAPBOX_RASTER_API: &str = "https://api.mapbox.com/v4";

/// Turns manifest tile locators into XYZ templates the map panels can load.
#[derive(Debug, Clone, Default)]
pub struct TileUrlResolver {
    access_token: Option<String>,
}

impl TileUrlResolver {
    pub fn new(access_token: Option<String>) -> Self {
        TileUrlResolver {
            access_token: access_token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// `mapbox://<tileset>` becomes the raster tiles API template; anything else
    /// is assumed to already be an XYZ template and is passed through.
    pub fn resolve(&self, locator: &str) -> String {
        let Some(tileset) = locator.strip_prefix(MAPBOX_SCHEME) else {
            return locator.to_string();
        };
        let mut url = format!("{}/{}/{{z}}/{{x}}/{{y}}.png", MAPBOX_RASTER_API, tileset);
        if let Some(token) = &self.access_token {
            url.push_str("?access_token=");
            url.push_str(token);
        }
        url
    }
}
