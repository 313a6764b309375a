use std::path::PathBuf;

use super::EditorState;
use super::persistence::{self, StoredWorkspace};
use crate::brush::BrushState;
use crate::config::{self, Settings};
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::export::{ExportFormat, ExportJob};
use crate::gallery::{Gallery, GalleryEntry};
use crate::grid::{CellCoord, Grid};
use crate::input::{self, InputEvent};

/// A canvas size change that would drop gallery entries and is waiting for
/// the user to confirm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingResize {
    pub width: usize,
    pub height: usize,
    pub entries_to_drop: usize,
}

/// Result of asking for a new canvas size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeChange {
    /// The gallery was empty, so the new size is already in effect
    Applied,
    /// Nothing changed yet; call [`Workspace::confirm_canvas_size`] to proceed
    NeedsConfirmation(PendingResize),
}

/// Parses user-typed canvas dimensions.
pub fn parse_dimensions(width: &str, height: &str) -> WorkspaceResult<(usize, usize)> {
    let parse = |text: &str| {
        text.trim()
            .parse::<i64>()
            .ok()
            .filter(|value| *value > 0)
            .and_then(|value| usize::try_from(value).ok())
            .ok_or(WorkspaceError::InvalidDimensions)
    };
    let dimensions = (parse(width)?, parse(height)?);
    validate_dimensions(dimensions.0, dimensions.1)?;
    Ok(dimensions)
}

pub fn validate_dimensions(width: usize, height: usize) -> WorkspaceResult<()> {
    if width == 0 || height == 0 {
        return Err(WorkspaceError::InvalidDimensions);
    }
    let max = config::MAX_CANVAS_PIXELS;
    if width > max || height > max {
        return Err(WorkspaceError::DimensionsTooLarge { width, height, max });
    }
    Ok(())
}

/// All mutable application state: the live drawing, its stroke state and
/// the gallery.
///
/// Operations that change the gallery or the canvas size write the workspace
/// to the given store right away. A failed write is logged and kept as a
/// warning for the UI; it never undoes the in-memory change.
#[derive(Debug)]
pub struct Workspace {
    grid: Grid,
    gallery: Gallery,
    cell_size: f32,
    editor_state: EditorState,
    brush: BrushState,
    persistence_warning: Option<String>,
}

impl Default for Workspace {
    fn default() -> Self {
        let (width, height) = config::DEFAULT_CANVAS_SIZE;
        Self::new(width, height)
    }
}

impl Workspace {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new(width, height),
            gallery: Gallery::new(width, height),
            cell_size: config::cell_size_for(width, height),
            editor_state: EditorState::Idle,
            brush: BrushState::default(),
            persistence_warning: None,
        }
    }

    /// Restores the gallery and canvas size from storage; the live drawing
    /// always starts blank.
    pub fn from_stored(stored: StoredWorkspace, settings: &Settings) -> Self {
        let (width, height) = (stored.canvas_width, stored.canvas_height);
        let mut workspace = Self::new(width, height);
        workspace.gallery = Gallery::from_entries(width, height, stored.gallery_entries);
        workspace.apply_settings(settings);
        log::info!(
            "Loaded workspace: {}x{} canvas, {} gallery entries",
            width,
            height,
            workspace.gallery.len()
        );
        workspace
    }

    pub fn to_stored(&self) -> StoredWorkspace {
        let (canvas_width, canvas_height) = self.canvas_size();
        StoredWorkspace {
            gallery_entries: self.gallery.list().to_vec(),
            canvas_width,
            canvas_height,
            last_modified: 0,
        }
    }

    /// Copies brush preferences into the live brush.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.brush.set_size(settings.brush_size);
        self.brush.speed_adjust = settings.speed_adjust;
        self.brush.policy = settings.speed_policy;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn canvas_size(&self) -> (usize, usize) {
        self.grid.dimensions()
    }

    /// Screen pixels per cell
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn editor_state(&self) -> EditorState {
        self.editor_state
    }

    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    /// Feeds one canvas event through the stroke state machine. Returns the
    /// cells that need repainting.
    pub fn handle_input(&mut self, event: &InputEvent) -> Vec<CellCoord> {
        input::route_event(
            event,
            &mut self.editor_state,
            &mut self.brush,
            &mut self.grid,
            self.cell_size,
        )
    }

    fn end_stroke(&mut self) {
        self.editor_state = EditorState::Idle;
        self.brush.end_stroke();
    }

    /// Clears the live drawing; the gallery is untouched.
    pub fn reset_canvas(&mut self) {
        self.end_stroke();
        self.grid.clear();
    }

    /// Snapshots the live drawing into the gallery, persists, and starts a
    /// fresh canvas.
    pub fn save_to_gallery(&mut self, store: &mut dyn eframe::Storage) -> WorkspaceResult<GalleryEntry> {
        let entry = self.gallery.save(&self.grid)?.clone();
        log::info!(
            "Saved {} to gallery ({} painted cells, {} entries)",
            entry.id(),
            entry.grid().painted_count(),
            self.gallery.len()
        );
        self.persist(store);
        self.reset_canvas();
        Ok(entry)
    }

    /// Empties the gallery. Fails if it is already empty.
    pub fn clear_gallery(&mut self, store: &mut dyn eframe::Storage) -> WorkspaceResult<usize> {
        let removed = self.gallery.clear()?;
        log::info!("Cleared {removed} gallery entries");
        self.persist(store);
        Ok(removed)
    }

    /// Asks to switch the canvas to `width`x`height`.
    ///
    /// With an empty gallery the change happens immediately. Otherwise the
    /// workspace is left untouched and the returned [`PendingResize`] must be
    /// confirmed; dropping it declines the change.
    pub fn request_canvas_size(
        &mut self,
        width: usize,
        height: usize,
        store: &mut dyn eframe::Storage,
    ) -> WorkspaceResult<SizeChange> {
        validate_dimensions(width, height)?;
        if self.gallery.is_empty() {
            self.apply_canvas_size(width, height, store);
            return Ok(SizeChange::Applied);
        }
        Ok(SizeChange::NeedsConfirmation(PendingResize {
            width,
            height,
            entries_to_drop: self.gallery.len(),
        }))
    }

    /// Applies a confirmed size change, dropping every gallery entry.
    pub fn confirm_canvas_size(&mut self, pending: PendingResize, store: &mut dyn eframe::Storage) -> WorkspaceResult<()> {
        validate_dimensions(pending.width, pending.height)?;
        self.apply_canvas_size(pending.width, pending.height, store);
        Ok(())
    }

    fn apply_canvas_size(&mut self, width: usize, height: usize, store: &mut dyn eframe::Storage) {
        let dropped = self.gallery.reset_dimensions(width, height);
        self.end_stroke();
        self.grid = Grid::new(width, height);
        self.cell_size = config::cell_size_for(width, height);
        log::info!("Canvas resized to {width}x{height}, dropped {dropped} gallery entries");
        self.persist(store);
    }

    /// Prepares an export of the whole gallery.
    pub fn export_job(&self, format: ExportFormat, output_dir: PathBuf) -> WorkspaceResult<ExportJob> {
        if self.gallery.is_empty() {
            return Err(WorkspaceError::EmptyGallery);
        }
        Ok(ExportJob {
            entries: self.gallery.list().to_vec(),
            format,
            output_dir,
        })
    }

    /// Writes the workspace to `store`. Failures are logged and kept for
    /// [`Self::take_persistence_warning`].
    pub fn persist(&mut self, store: &mut dyn eframe::Storage) {
        if let Err(err) = persistence::save_workspace(store, &self.to_stored()) {
            log::error!("Failed to persist workspace: {err}");
            self.persistence_warning = Some(format!("Could not save the gallery to storage: {err}"));
        }
    }

    pub fn take_persistence_warning(&mut self) -> Option<String> {
        self.persistence_warning.take()
    }
}
