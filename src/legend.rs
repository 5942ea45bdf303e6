use crate::error::LegendError;
use crate::models::style::ColourStop;
use crate::utils::style::{get_builtin_gradient, gradient_from_colours};
use image::{ColorType, ImageEncoder, Rgba, RgbaImage, codecs::png::PngEncoder};
use serde::Serialize;
use std::io::Cursor;

const LOOKUP_SIZE: usize = 256;

#[derive(Debug, Clone)]
pub struct LegendConfig {
    pub title: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub ticks: usize,
    pub colours: Vec<String>,
    /// Built-in colorgrad palette, takes precedence over `colours`.
    pub palette: Option<String>,
}

impl Default for LegendConfig {
    fn default() -> Self {
        LegendConfig {
            title: "Light Intensity".to_string(),
            unit: "nanoWatts/cm²/sr".to_string(),
            min: 0.0,
            max: 2000.0,
            ticks: 5,
            colours: vec!["#161616".to_string(), "#929191".to_string()],
            palette: None,
        }
    }
}

/// Linear colour scale over the intensity domain, sampled into a lookup table.
#[derive(Debug, Clone)]
pub struct ColorLegend {
    config: LegendConfig,
    lookup: Vec<[u8; 4]>,
}

#[derive(Debug, Serialize)]
pub struct LegendResponse {
    pub title: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<f64>,
    pub stops: Vec<ColourStop>,
}

impl ColorLegend {
    pub fn new(config: LegendConfig) -> Result<Self, LegendError> {
        if !(config.max > config.min) {
            return Err(LegendError::EmptyDomain {
                min: config.min,
                max: config.max,
            });
        }
        let gradient = match &config.palette {
            Some(name) => get_builtin_gradient(name)
                .ok_or_else(|| LegendError::UnknownPalette(name.clone()))?,
            None => gradient_from_colours(&config.colours)?,
        };
        let lookup = (0..LOOKUP_SIZE)
            .map(|i| {
                let t = i as f32 / (LOOKUP_SIZE - 1) as f32;
                gradient.at(t).to_rgba8()
            })
            .collect();
        Ok(ColorLegend { config, lookup })
    }

    pub fn config(&self) -> &LegendConfig {
        &self.config
    }

    /// Colour at position `t` in `[0, 1]` along the bar; out of range values clamp.
    pub fn sample(&self, t: f64) -> [u8; 4] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let i = (t * (LOOKUP_SIZE - 1) as f64).round() as usize;
        self.lookup[i]
    }

    /// Colour for a light-intensity value in the legend's domain.
    pub fn colour_for(&self, value: f64) -> [u8; 4] {
        self.sample((value - self.config.min) / (self.config.max - self.config.min))
    }

    /// Axis labels across the intensity domain.
    pub fn ticks(&self) -> Vec<f64> {
        nice_ticks(self.config.min, self.config.max, self.config.ticks)
    }

    /// Gradient stops placed at the ticks of the unit interval.
    pub fn stops(&self) -> Vec<ColourStop> {
        let positions = nice_ticks(0.0, 1.0, self.config.ticks);
        let last = positions.len().saturating_sub(1).max(1) as f32;
        positions
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let [red, green, blue, alpha] = self.sample(*t);
                ColourStop {
                    offset: 100.0 * i as f32 / last,
                    colour: format!("#{:02x}{:02x}{:02x}", red, green, blue),
                    red,
                    green,
                    blue,
                    alpha,
                }
            })
            .collect()
    }

    pub fn describe(&self) -> LegendResponse {
        LegendResponse {
            title: self.config.title.clone(),
            unit: self.config.unit.clone(),
            min: self.config.min,
            max: self.config.max,
            ticks: self.ticks(),
            stops: self.stops(),
        }
    }

    /// Evenly spaced samples for terminal colour bars.
    pub fn swatches(&self, n: usize) -> Vec<[u8; 4]> {
        let last = n.saturating_sub(1).max(1) as f64;
        (0..n).map(|i| self.sample(i as f64 / last)).collect()
    }

    /// Horizontal colour bar, low values on the left.
    pub fn render_png(&self, width: u32, height: u32) -> Result<Vec<u8>, LegendError> {
        let width = width.max(1);
        let height = height.max(1);
        let mut img = RgbaImage::new(width, height);
        let span = (width - 1).max(1) as f64;
        for x in 0..width {
            let px = Rgba(self.sample(x as f64 / span));
            for y in 0..height {
                img.put_pixel(x, y, px);
            }
        }

        let mut png_data = Vec::new();
        PngEncoder::new(Cursor::new(&mut png_data)).write_image(
            img.as_raw(),
            width,
            height,
            ColorType::Rgba8.into(),
        )?;
        Ok(png_data)
    }
}

/// Round tick values in the manner of d3's `ticks`: steps of 1, 2 or 5 times a
/// power of ten, chosen so roughly `count` intervals cover `[start, stop]`.
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi) = if start < stop { (start, stop) } else { (stop, start) };
    let step = tick_step(lo, hi, count);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    let mut ticks: Vec<f64> = (first..=last).map(|i| round_to_step(i as f64 * step, step)).collect();
    if start > stop {
        ticks.reverse();
    }
    ticks
}

fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    power * factor
}

// Drop float noise such as 0.6000000000000001.
fn round_to_step(value: f64, step: f64) -> f64 {
    let decimals = (-step.log10().floor()).max(0.0) as i32;
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
