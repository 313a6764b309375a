use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::brush::{MIN_BRUSH_SIZE, SpeedPolicy};
use crate::export::ExportFormat;

/// Storage key holding the gallery and canvas size
pub const WORKSPACE_KEY: &str = "dtd-workspace";
/// Storage key holding [`Settings`]
pub const SETTINGS_KEY: &str = "dtd-settings";

pub const DEFAULT_CANVAS_SIZE: (usize, usize) = (32, 32);
/// Longest side of the drawing surface in screen pixels
pub const MAX_CANVAS_PIXELS: usize = 600;
/// Side of a gallery thumbnail in screen pixels
pub const THUMBNAIL_SIZE: f32 = 60.0;
pub const MAX_BRUSH_SIZE: u32 = 20;

pub const SIZE_PRESETS: &[(usize, usize)] = &[(16, 16), (28, 28), (32, 32), (64, 64)];

/// Screen pixels per cell for a canvas of the given size.
///
/// Never below one pixel; callers reject canvases wider than
/// [`MAX_CANVAS_PIXELS`] before getting here.
pub fn cell_size_for(width: usize, height: usize) -> f32 {
    let by_width = MAX_CANVAS_PIXELS / width.max(1);
    let by_height = MAX_CANVAS_PIXELS / height.max(1);
    by_width.min(by_height).max(1) as f32
}

/// User preferences that survive restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old settings
pub struct Settings {
    pub brush_size: u32,
    pub speed_adjust: bool,
    pub speed_policy: SpeedPolicy,
    pub export_format: ExportFormat,
    /// Directory that receives exported archives
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brush_size: MIN_BRUSH_SIZE,
            speed_adjust: false,
            speed_policy: SpeedPolicy::default(),
            export_format: ExportFormat::default(),
            export_dir: default_export_dir(),
        }
    }
}

impl Settings {
    /// Clamps values that may have been edited by hand in storage.
    pub fn sanitized(mut self) -> Self {
        self.brush_size = self.brush_size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        if !(self.speed_policy.speed_factor.is_finite() && self.speed_policy.speed_factor >= 0.0) {
            log::warn!(
                "Invalid speed factor {}, using the default",
                self.speed_policy.speed_factor
            );
            self.speed_policy.speed_factor = SpeedPolicy::default().speed_factor;
        }
        self.speed_policy.max_size_floor = self.speed_policy.max_size_floor.max(MIN_BRUSH_SIZE);
        self
    }
}

fn default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
