use serde::{Deserialize, Serialize};
use std::fmt;

/// Viewport shared by both panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl CameraState {
    pub fn new(latitude: f64, longitude: f64, zoom: f64) -> Self {
        CameraState {
            latitude,
            longitude,
            zoom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Left,
    Right,
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Panel::Left => f.write_str("left"),
            Panel::Right => f.write_str("right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_names_on_the_wire_are_lowercase() {
        assert_eq!(serde_json::to_string(&Panel::Left).unwrap(), "\"left\"");
        let right: Panel = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(right, Panel::Right);
        assert_eq!(right.to_string(), "right");
    }
}
