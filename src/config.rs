use eframe::egui;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;
use crate::geometry::{LineSegment, Point};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_egui(&self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(
            (self.r * 255.0) as u8,
            (self.g * 255.0) as u8,
            (self.b * 255.0) as u8,
            (self.a * 255.0) as u8,
        )
    }
}

pub const BLACK: Color4 = Color4::rgb(0.0, 0.0, 0.0);
/// matplotlib's "tab:red".
pub const TAB_RED: Color4 = Color4::rgb(0.839, 0.153, 0.157);

/// Optional JSON settings. Read once at startup, never written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Handle pick-up tolerance in screen pixels.
    pub grab_range: f32,
    pub line_thickness: f32,
    pub marker_radius: f32,
    pub reference_color: Color4,
    pub target_color: Color4,
    pub reference_length: Option<f64>,
    pub units: Option<String>,
    pub reference_line: Option<[(f32, f32); 2]>,
    pub target_line: Option<[(f32, f32); 2]>,
    pub window_size: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grab_range: 10.0,
            line_thickness: 2.0,
            marker_radius: 5.0,
            reference_color: BLACK,
            target_color: TAB_RED,
            reference_length: None,
            units: None,
            reference_line: None,
            target_line: None,
            window_size: [1200.0, 800.0],
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let config_err = |reason: String| Error::Config {
            path: path.to_path_buf(),
            reason,
        };
        let data = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        let settings: Settings =
            serde_json::from_str(&data).map_err(|e| config_err(e.to_string()))?;
        log::debug!("settings from {}: {settings:?}", path.display());
        Ok(settings)
    }

    /// Initial (reference, target) lines for an image of the given size.
    pub fn initial_lines(&self, image_size: [usize; 2]) -> (LineSegment, LineSegment) {
        let (reference, target) = default_lines(image_size);
        let pick = |configured: Option<[(f32, f32); 2]>, fallback| match configured {
            Some([a, b]) => LineSegment::new(a.into(), b.into()),
            None => fallback,
        };
        (
            pick(self.reference_line, reference),
            pick(self.target_line, target),
        )
    }
}

/// Horizontal reference and vertical target, both through the image centre
/// and spanning its middle half.
pub fn default_lines(image_size: [usize; 2]) -> (LineSegment, LineSegment) {
    let w = image_size[0] as f32;
    let h = image_size[1] as f32;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let reference = LineSegment::new(Point::new(w * 0.25, cy), Point::new(w * 0.75, cy));
    let target = LineSegment::new(Point::new(cx, h * 0.25), Point::new(cx, h * 0.75));
    (reference, target)
}
