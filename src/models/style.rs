use serde::Serialize;

/// One stop of the legend gradient, positioned in percent along the bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColourStop {
    pub offset: f32,
    pub colour: String,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}
