use crate::error::LegendError;
use colorgrad::{BlendMode, Color, Gradient, GradientBuilder, LinearGradient, preset};

pub const BUILTIN_PALETTES: &[&str] = &[
    "viridis",
    "magma",
    "plasma",
    "inferno",
    "turbo",
    "cubehelix_default",
    "rainbow",
    "spectral",
    "sinebow",
];

pub fn is_builtin_palette(name: &str) -> bool {
    BUILTIN_PALETTES.contains(&name)
}

pub fn get_builtin_gradient(name: &str) -> Option<Box<dyn Gradient>> {
    Some(match name {
        "viridis" => Box::new(preset::viridis()),
        "magma" => Box::new(preset::magma()),
        "plasma" => Box::new(preset::plasma()),
        "inferno" => Box::new(preset::inferno()),
        "turbo" => Box::new(preset::turbo()),
        "cubehelix_default" => Box::new(preset::cubehelix_default()),
        "rainbow" => Box::new(preset::rainbow()),
        "spectral" => Box::new(preset::spectral()),
        "sinebow" => Box::new(preset::sinebow()),
        _ => return None,
    })
}

/// Straight RGB interpolation between evenly spaced html colours.
pub fn gradient_from_colours(colours: &[String]) -> Result<Box<dyn Gradient>, LegendError> {
    if colours.len() < 2 {
        return Err(LegendError::TooFewColours(colours.len()));
    }
    for colour in colours {
        Color::from_html(colour).map_err(|e| LegendError::Colour {
            colour: colour.clone(),
            reason: e.to_string(),
        })?;
    }
    let gradient = GradientBuilder::new()
        .html_colors(colours)
        .mode(BlendMode::Rgb)
        .build::<LinearGradient>()
        .map_err(|e| LegendError::Colour {
            colour: colours.join(", "),
            reason: e.to_string(),
        })?;
    Ok(Box::new(gradient))
}

/// A run of truecolour blocks for terminal output.
pub fn ansi_colourbar(samples: &[[u8; 4]]) -> String {
    let mut s = String::new();
    for [r, g, b, _] in samples {
        s.push_str(&format!("\x1b[38;2;{};{};{}m█\x1b[0m", r, g, b));
    }
    s
}
