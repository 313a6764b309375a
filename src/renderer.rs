use egui::{Color32, ColorImage, Painter, Pos2, Rect, Stroke, TextureHandle, TextureOptions, pos2, vec2};

use crate::config;
use crate::gallery::GalleryEntry;
use crate::grid::{CellCoord, Grid};
use crate::texture_manager::{TextureGenerationError, TextureManager};

pub const GRID_LINE_COLOR: Color32 = Color32::from_rgb(0xee, 0xee, 0xee);
pub const GRID_LINE_WIDTH: f32 = 0.5;

const THUMBNAIL_CACHE_SIZE: usize = 256;

/// One pixel per cell: painted black, the rest white.
pub fn grid_image(grid: &Grid) -> ColorImage {
    let mut image = ColorImage::new([grid.width(), grid.height()], Color32::WHITE);
    for cell in grid.painted_cells() {
        image.pixels[cell.y * grid.width() + cell.x] = Color32::BLACK;
    }
    image
}

/// Segments of the cell grid over a canvas at `origin`, vertical lines first.
pub fn grid_lines(origin: Pos2, width: usize, height: usize, cell_size: f32) -> Vec<[Pos2; 2]> {
    let right = origin.x + width as f32 * cell_size;
    let bottom = origin.y + height as f32 * cell_size;
    let vertical = (0..=width).map(|x| {
        let x = origin.x + x as f32 * cell_size;
        [pos2(x, origin.y), pos2(x, bottom)]
    });
    let horizontal = (0..=height).map(|y| {
        let y = origin.y + y as f32 * cell_size;
        [pos2(origin.x, y), pos2(right, y)]
    });
    vertical.chain(horizontal).collect()
}

/// Area a `width`x`height` drawing occupies inside a thumbnail box, anchored
/// at the box's top-left corner.
pub fn thumbnail_rect(frame: Rect, width: usize, height: usize) -> Rect {
    let scale = (frame.width() / width.max(1) as f32).min(frame.height() / height.max(1) as f32);
    Rect::from_min_size(frame.min, vec2(width as f32 * scale, height as f32 * scale))
}

/// Draws the live canvas and gallery thumbnails.
///
/// The canvas is kept as a one-pixel-per-cell image; changed cells are
/// written into it and the texture is re-uploaded once per frame at most.
pub struct Renderer {
    canvas_image: ColorImage,
    canvas_texture: Option<TextureHandle>,
    dirty: bool,
    thumbnails: TextureManager,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            canvas_image: ColorImage::new([1, 1], Color32::WHITE),
            canvas_texture: None,
            dirty: true,
            thumbnails: TextureManager::new(THUMBNAIL_CACHE_SIZE),
        }
    }

    /// Replaces the canvas image with the full contents of `grid`.
    pub fn rebuild(&mut self, grid: &Grid) {
        self.canvas_image = grid_image(grid);
        self.dirty = true;
    }

    /// Marks freshly painted cells for the next upload.
    pub fn mark_cells(&mut self, cells: &[CellCoord]) {
        let [width, height] = self.canvas_image.size;
        for cell in cells.iter().filter(|c| c.x < width && c.y < height) {
            self.canvas_image.pixels[cell.y * width + cell.x] = Color32::BLACK;
            self.dirty = true;
        }
    }

    pub fn needs_upload(&self) -> bool {
        self.dirty
    }

    pub fn canvas_pixel(&self, x: usize, y: usize) -> Option<Color32> {
        let [width, height] = self.canvas_image.size;
        (x < width && y < height).then(|| self.canvas_image.pixels[y * width + x])
    }

    /// Renders the drawing surface for `grid` into `rect`.
    pub fn render_canvas(&mut self, ctx: &egui::Context, painter: &Painter, rect: Rect, grid: &Grid, cell_size: f32) {
        if self.canvas_image.size != [grid.width(), grid.height()] {
            self.rebuild(grid);
        }

        match &mut self.canvas_texture {
            Some(texture) if self.dirty => texture.set(self.canvas_image.clone(), TextureOptions::NEAREST),
            Some(_) => {}
            None => {
                self.canvas_texture =
                    Some(ctx.load_texture("canvas", self.canvas_image.clone(), TextureOptions::NEAREST));
            }
        }
        self.dirty = false;

        let canvas_rect = Rect::from_min_size(
            rect.min,
            vec2(grid.width() as f32 * cell_size, grid.height() as f32 * cell_size),
        );
        if let Some(texture) = &self.canvas_texture {
            let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
            painter.image(texture.id(), canvas_rect, uv, Color32::WHITE);
        }

        let stroke = Stroke::new(GRID_LINE_WIDTH, GRID_LINE_COLOR);
        for segment in grid_lines(canvas_rect.min, grid.width(), grid.height(), cell_size) {
            painter.line_segment(segment, stroke);
        }
    }

    /// Call once per frame before drawing thumbnails.
    pub fn begin_gallery(&mut self, entries: &[GalleryEntry]) {
        self.thumbnails.begin_frame();
        self.thumbnails.retain_entries(entries.iter().map(GalleryEntry::id));
    }

    /// Draws `entry` scaled into the thumbnail box `frame`.
    pub fn render_thumbnail(&mut self, ctx: &egui::Context, painter: &Painter, frame: Rect, entry: &GalleryEntry) {
        painter.rect_filled(frame, 0.0, Color32::WHITE);
        let texture = self.thumbnails.get_or_create_texture(
            entry.id(),
            || {
                if entry.width() == 0 || entry.height() == 0 {
                    return Err(TextureGenerationError::InvalidDimensions);
                }
                Ok(grid_image(entry.grid()))
            },
            ctx,
        );
        match texture {
            Ok(id) => {
                let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                painter.image(id, thumbnail_rect(frame, entry.width(), entry.height()), uv, Color32::WHITE);
            }
            Err(err) => log::warn!("Skipping thumbnail for {}: {}", entry.id(), err),
        }
    }

    /// Side of a thumbnail box in screen pixels
    pub fn thumbnail_size() -> f32 {
        config::THUMBNAIL_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_image_maps_cells_to_pixels() {
        let mut grid = Grid::new(3, 2);
        grid.paint(2, 1);
        let image = grid_image(&grid);
        assert_eq!(image.size, [3, 2]);
        assert_eq!(image.pixels[5], Color32::BLACK);
        assert_eq!(image.pixels.iter().filter(|p| **p == Color32::WHITE).count(), 5);
    }

    #[test]
    fn grid_lines_cover_every_cell_border() {
        let lines = grid_lines(pos2(10.0, 0.0), 4, 2, 5.0);
        assert_eq!(lines.len(), 5 + 3);
        assert_eq!(lines[4], [pos2(30.0, 0.0), pos2(30.0, 10.0)]);
        assert_eq!(lines[7], [pos2(10.0, 10.0), pos2(30.0, 10.0)]);
    }

    #[test]
    fn thumbnails_keep_aspect_ratio() {
        let frame = Rect::from_min_size(pos2(0.0, 0.0), vec2(60.0, 60.0));
        assert_eq!(thumbnail_rect(frame, 32, 32).size(), vec2(60.0, 60.0));
        assert_eq!(thumbnail_rect(frame, 64, 16).size(), vec2(60.0, 15.0));
    }

    #[test]
    fn marked_cells_update_the_canvas_image() {
        let mut renderer = Renderer::new();
        renderer.rebuild(&Grid::new(4, 4));
        renderer.mark_cells(&[CellCoord::new(1, 2), CellCoord::new(9, 9)]);
        assert!(renderer.needs_upload());
        assert_eq!(renderer.canvas_pixel(1, 2), Some(Color32::BLACK));
        assert_eq!(renderer.canvas_pixel(0, 0), Some(Color32::WHITE));
        assert_eq!(renderer.canvas_pixel(9, 9), None);
    }

    #[test]
    fn render_canvas_uploads_once() {
        let ctx = egui::Context::default();
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(40.0, 40.0));
        let painter = Painter::new(ctx.clone(), egui::LayerId::background(), rect);
        let mut renderer = Renderer::new();
        let grid = Grid::new(4, 4);

        renderer.render_canvas(&ctx, &painter, rect, &grid, 10.0);
        assert!(!renderer.needs_upload());
        assert_eq!(renderer.canvas_pixel(3, 3), Some(Color32::WHITE));
    }
}
