//! Speed-adaptive round brush over a binary [`Grid`].
//!
//! Sizing and rasterization are separate steps: [`compute_effective_brush_size`]
//! turns the current pointer sample plus the previous one into a diameter in
//! cells, and [`rasterize_stroke`] stamps a filled disc of that diameter.

use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::grid::{CellCoord, Grid};

/// Smallest diameter the brush ever produces.
pub const MIN_BRUSH_SIZE: u32 = 1;

/// Tuning for how pointer speed shrinks the brush.
///
/// The adjusted diameter is `max(max_size_floor, 2 * base) - speed * speed_factor`,
/// clamped to `[1, max]`, with speed measured in pixels per millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedPolicy {
    pub speed_factor: f32,
    pub max_size_floor: u32,
}

impl Default for SpeedPolicy {
    fn default() -> Self {
        Self {
            speed_factor: 5.0,
            max_size_floor: 10,
        }
    }
}

impl SpeedPolicy {
    /// Upper bound of the adjusted diameter for a given base size.
    pub fn max_size(&self, base_size: u32) -> u32 {
        self.max_size_floor.max(base_size.saturating_mul(2))
    }
}

/// Brush configuration plus the motion history of the current stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushState {
    size: u32,
    pub speed_adjust: bool,
    pub policy: SpeedPolicy,
    last_position: Option<Pos2>,
    last_timestamp: Option<f64>,
}

impl Default for BrushState {
    fn default() -> Self {
        Self::new(MIN_BRUSH_SIZE, false)
    }
}

impl BrushState {
    pub fn new(size: u32, speed_adjust: bool) -> Self {
        Self {
            size: size.max(MIN_BRUSH_SIZE),
            speed_adjust,
            policy: SpeedPolicy::default(),
            last_position: None,
            last_timestamp: None,
        }
    }

    pub fn with_policy(mut self, policy: SpeedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Base diameter in cells, always at least 1.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.max(MIN_BRUSH_SIZE);
    }

    pub fn last_position(&self) -> Option<Pos2> {
        self.last_position
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// Remembers `position` at `time_ms` as the previous sample of the stroke.
    pub fn record_sample(&mut self, position: Pos2, time_ms: f64) {
        self.last_position = Some(position);
        self.last_timestamp = Some(time_ms);
    }

    /// Forgets the motion history so the next stroke starts fresh.
    pub fn end_stroke(&mut self) {
        self.last_position = None;
        self.last_timestamp = None;
    }
}

/// Diameter in cells to use for a sample at `current` taken at `now_ms`.
///
/// Falls back to the base size when speed adjustment is off, when there is
/// no previous sample, or when no time has elapsed since it.
pub fn compute_effective_brush_size(current: Pos2, now_ms: f64, state: &BrushState) -> u32 {
    let base = state.size;
    if !state.speed_adjust {
        return base;
    }
    let (Some(last_pos), Some(last_time)) = (state.last_position, state.last_timestamp) else {
        return base;
    };

    let elapsed = now_ms - last_time;
    // Clocks only move forward; a backwards step is treated like a same-tick sample.
    if elapsed <= 0.0 || !elapsed.is_finite() {
        return base;
    }

    let distance = f64::from((current - last_pos).length());
    let speed = distance / elapsed;
    if !speed.is_finite() {
        return base;
    }

    let max_size = f64::from(state.policy.max_size(base));
    let adjusted = max_size - speed * f64::from(state.policy.speed_factor);
    adjusted.clamp(f64::from(MIN_BRUSH_SIZE), max_size).round() as u32
}

/// Maps a pixel position on the canvas to (possibly out of range) cell indices.
pub fn pixel_to_cell(point: Pos2, cell_size: f32) -> (i64, i64) {
    let x = (f64::from(point.x) / f64::from(cell_size)).floor() as i64;
    let y = (f64::from(point.y) / f64::from(cell_size)).floor() as i64;
    (x, y)
}

/// Stamps a filled disc of `diameter` cells centered on the cell under `point`.
///
/// Cells outside the grid are skipped. Returns exactly the cells that went
/// from white to black, in row-major order.
pub fn rasterize_stroke(point: Pos2, diameter: u32, cell_size: f32, grid: &mut Grid) -> Vec<CellCoord> {
    if !(cell_size.is_finite() && cell_size > 0.0) {
        log::warn!("Ignoring brush stamp with invalid cell size {cell_size}");
        return Vec::new();
    }

    let (center_x, center_y) = pixel_to_cell(point, cell_size);
    let radius = f64::from(diameter.max(MIN_BRUSH_SIZE)) / 2.0;
    let (cx, cy) = (center_x as f64, center_y as f64);

    let min_x = ((cx - radius).floor() as i64).max(0);
    let max_x = ((cx + radius).ceil() as i64).min(grid.width() as i64 - 1);
    let min_y = ((cy - radius).floor() as i64).max(0);
    let max_y = ((cy + radius).ceil() as i64).min(grid.height() as i64 - 1);

    let mut changed = Vec::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            if (dx * dx + dy * dy).sqrt() <= radius && grid.paint(x as usize, y as usize) {
                changed.push(CellCoord::new(x as usize, y as usize));
            }
        }
    }
    changed
}
