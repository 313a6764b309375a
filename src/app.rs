use std::path::PathBuf;

use crate::config::{self, Settings};
use crate::error::WorkspaceError;
use crate::export::{ExportError, ExportTask};
use crate::input::InputHandler;
use crate::panels;
use crate::renderer::Renderer;
use crate::state::persistence::{self, MemoryStore};
use crate::state::{PendingResize, SizeChange, Workspace, parse_dimensions};

const MAX_NOTICES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message shown to the user in the controls panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// A destructive action waiting for the user's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    ConfirmResize(PendingResize),
    ConfirmClearGallery,
}

/// Requests collected from the panels during a frame, applied afterwards
/// with access to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    SelectSize { width: usize, height: usize },
    ApplyCustomSize,
    SaveDrawing,
    ResetCanvas,
    ClearGallery,
    Export,
    ConfirmDialog,
    CancelDialog,
    SettingsChanged,
}

pub struct PaintApp {
    pub(crate) workspace: Workspace,
    pub(crate) settings: Settings,
    pub(crate) renderer: Renderer,
    pub(crate) input_handler: InputHandler,
    pub(crate) custom_size_mode: bool,
    pub(crate) custom_width: String,
    pub(crate) custom_height: String,
    pub(crate) export_dir_text: String,
    pub(crate) dialog: Option<Dialog>,
    pub(crate) notices: Vec<Notice>,
    pub(crate) export_task: Option<ExportTask>,
    pub(crate) pending_actions: Vec<UiAction>,
    /// Used when the platform provides no persistent storage
    fallback_store: MemoryStore,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_storage(cc.storage)
    }

    /// Restores settings and the workspace from `storage`, or uses defaults.
    pub fn with_storage(storage: Option<&dyn eframe::Storage>) -> Self {
        let settings = persistence::load_settings(storage);
        let workspace = Workspace::from_stored(persistence::load_workspace(storage), &settings);
        let (width, height) = workspace.canvas_size();

        let mut renderer = Renderer::new();
        renderer.rebuild(workspace.grid());

        Self {
            export_dir_text: settings.export_dir.display().to_string(),
            workspace,
            settings,
            renderer,
            input_handler: InputHandler::new(),
            custom_size_mode: !config::SIZE_PRESETS.contains(&(width, height)),
            custom_width: width.to_string(),
            custom_height: height.to_string(),
            dialog: None,
            notices: Vec::new(),
            export_task: None,
            pending_actions: Vec::new(),
            fallback_store: MemoryStore::new(),
        }
    }

    /// Replaces the loaded preferences without persisting them.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        let settings = settings.sanitized();
        self.workspace.apply_settings(&settings);
        self.export_dir_text = settings.export_dir.display().to_string();
        self.settings = settings;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dialog(&self) -> Option<Dialog> {
        self.dialog
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_exporting(&self) -> bool {
        self.export_task.is_some()
    }

    pub fn push_action(&mut self, action: UiAction) {
        self.pending_actions.push(action);
    }

    pub(crate) fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        let text = text.into();
        match level {
            NoticeLevel::Info => log::info!("{text}"),
            NoticeLevel::Warning => log::warn!("{text}"),
            NoticeLevel::Error => log::error!("{text}"),
        }
        self.notices.push(Notice { level, text });
        if self.notices.len() > MAX_NOTICES {
            let excess = self.notices.len() - MAX_NOTICES;
            self.notices.drain(..excess);
        }
    }

    fn report(&mut self, err: &WorkspaceError) {
        self.notify(NoticeLevel::Error, err.to_string());
    }

    /// Applies one UI request. `ctx` is woken when a background export ends.
    pub fn dispatch(&mut self, action: UiAction, store: &mut dyn eframe::Storage, ctx: Option<&egui::Context>) {
        log::debug!("Dispatching {action:?}");
        match action {
            UiAction::SelectSize { width, height } => {
                self.custom_size_mode = false;
                self.request_canvas_size(width, height, store);
            }
            UiAction::ApplyCustomSize => {
                match parse_dimensions(&self.custom_width, &self.custom_height) {
                    Ok((width, height)) => self.request_canvas_size(width, height, store),
                    Err(err) => self.report(&err),
                }
            }
            UiAction::SaveDrawing => match self.workspace.save_to_gallery(store) {
                Ok(entry) => {
                    self.renderer.rebuild(self.workspace.grid());
                    self.notify(NoticeLevel::Info, format!("Saved image #{}", self.workspace.gallery().len()));
                    log::debug!("Saved entry {}", entry.id());
                }
                Err(err) => self.report(&err),
            },
            UiAction::ResetCanvas => {
                self.workspace.reset_canvas();
                self.renderer.rebuild(self.workspace.grid());
            }
            UiAction::ClearGallery => {
                if self.workspace.gallery().is_empty() {
                    self.report(&WorkspaceError::GalleryAlreadyEmpty);
                } else {
                    self.dialog = Some(Dialog::ConfirmClearGallery);
                }
            }
            UiAction::Export => self.start_export(ctx.cloned()),
            UiAction::ConfirmDialog => self.confirm_dialog(store),
            UiAction::CancelDialog => self.cancel_dialog(),
            UiAction::SettingsChanged => {
                self.settings.export_dir = PathBuf::from(self.export_dir_text.trim());
                self.workspace.apply_settings(&self.settings);
                if let Err(err) = persistence::save_settings(store, &self.settings) {
                    self.notify(NoticeLevel::Warning, format!("Could not save settings: {err}"));
                }
            }
        }

        if let Some(warning) = self.workspace.take_persistence_warning() {
            self.notify(NoticeLevel::Warning, warning);
        }
    }

    /// Applies every queued action in order.
    pub fn dispatch_pending(&mut self, store: &mut dyn eframe::Storage, ctx: Option<&egui::Context>) {
        for action in std::mem::take(&mut self.pending_actions) {
            self.dispatch(action, store, ctx);
        }
    }

    fn request_canvas_size(&mut self, width: usize, height: usize, store: &mut dyn eframe::Storage) {
        if self.workspace.canvas_size() == (width, height) && !self.custom_size_mode {
            return;
        }
        match self.workspace.request_canvas_size(width, height, store) {
            Ok(SizeChange::Applied) => self.after_resize(),
            Ok(SizeChange::NeedsConfirmation(pending)) => self.dialog = Some(Dialog::ConfirmResize(pending)),
            Err(err) => self.report(&err),
        }
    }

    fn after_resize(&mut self) {
        let (width, height) = self.workspace.canvas_size();
        self.custom_width = width.to_string();
        self.custom_height = height.to_string();
        self.renderer.rebuild(self.workspace.grid());
        self.input_handler.reset();
    }

    fn confirm_dialog(&mut self, store: &mut dyn eframe::Storage) {
        match self.dialog.take() {
            Some(Dialog::ConfirmResize(pending)) => match self.workspace.confirm_canvas_size(pending, store) {
                Ok(()) => {
                    self.after_resize();
                    self.notify(
                        NoticeLevel::Info,
                        format!("Canvas is now {}x{}, gallery cleared", pending.width, pending.height),
                    );
                }
                Err(err) => self.report(&err),
            },
            Some(Dialog::ConfirmClearGallery) => match self.workspace.clear_gallery(store) {
                Ok(removed) => self.notify(NoticeLevel::Info, format!("Removed {removed} images")),
                Err(err) => self.report(&err),
            },
            None => {}
        }
    }

    /// Declining leaves everything as it was; the size selector shows the
    /// current canvas size again.
    fn cancel_dialog(&mut self) {
        if let Some(Dialog::ConfirmResize(_)) = self.dialog.take() {
            let (width, height) = self.workspace.canvas_size();
            self.custom_size_mode = !config::SIZE_PRESETS.contains(&(width, height));
            self.custom_width = width.to_string();
            self.custom_height = height.to_string();
        }
    }

    fn start_export(&mut self, ctx: Option<egui::Context>) {
        if self.export_task.is_some() {
            self.notify(NoticeLevel::Warning, "An export is already running");
            return;
        }
        let job = match self
            .workspace
            .export_job(self.settings.export_format, self.settings.export_dir.clone())
        {
            Ok(job) => job,
            Err(err) => return self.report(&err),
        };
        match ExportTask::spawn(job, ctx) {
            Ok(task) => self.export_task = Some(task),
            Err(err) => self.notify(NoticeLevel::Error, err.to_string()),
        }
    }

    /// Collects the result of a finished export, if any.
    pub fn poll_export(&mut self) {
        let Some(task) = &mut self.export_task else {
            return;
        };
        let Some(result) = task.poll_result() else {
            return;
        };
        self.export_task = None;
        match result {
            Ok(outcome) => self.notify(
                NoticeLevel::Info,
                format!("Exported {} images to {}", outcome.image_count, outcome.path.display()),
            ),
            Err(ExportError::EmptyGallery) => self.report(&WorkspaceError::EmptyGallery),
            Err(err) => self.notify(NoticeLevel::Error, format!("Export failed: {err}")),
        }
    }

    /// Waits for a running export; used where no frame loop drives polling.
    pub async fn finish_export(&mut self) -> Option<Result<crate::export::ExportOutcome, ExportError>> {
        let task = self.export_task.take()?;
        Some(task.await)
    }

    fn with_store(&mut self, frame: &mut eframe::Frame, f: impl FnOnce(&mut Self, &mut dyn eframe::Storage)) {
        match frame.storage_mut() {
            Some(store) => f(self, store),
            None => {
                let mut fallback = std::mem::take(&mut self.fallback_store);
                f(self, &mut fallback);
                self.fallback_store = fallback;
            }
        }
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.workspace.persist(storage);
        if let Err(err) = persistence::save_settings(storage, &self.settings) {
            log::error!("Failed to save settings on shutdown: {err}");
        }
    }

    /// Called each time the UI needs repainting.
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.poll_export();

        panels::tools_panel(self, ctx);
        panels::gallery_panel(self, ctx);
        panels::central_panel(self, ctx);
        panels::dialog_window(self, ctx);

        if !self.pending_actions.is_empty() {
            self.with_store(frame, |app, store| app.dispatch_pending(store, Some(ctx)));
        }
    }
}
