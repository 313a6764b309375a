#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod brush;
pub mod config;
pub mod error;
pub mod export;
pub mod gallery;
pub mod grid;
pub mod input;
pub mod panels;
pub mod renderer;
pub mod state;
pub mod texture_manager;
pub mod util;

pub use app::PaintApp;
pub use brush::{BrushState, SpeedPolicy, compute_effective_brush_size, rasterize_stroke};
pub use config::Settings;
pub use error::WorkspaceError;
pub use export::{ExportError, ExportFormat, ExportTask, TextLayout};
pub use gallery::{Gallery, GalleryEntry};
pub use grid::{CellCoord, Grid};
pub use input::{InputEvent, InputHandler};
pub use renderer::Renderer;
pub use state::{EditorState, Workspace};
