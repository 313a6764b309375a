use crate::PaintApp;
use crate::app::{Dialog, UiAction};

/// Confirmation window for destructive actions
pub fn dialog_window(app: &mut PaintApp, ctx: &egui::Context) {
    let Some(dialog) = app.dialog else {
        return;
    };

    let message = match dialog {
        Dialog::ConfirmResize(pending) => format!(
            "Changing the canvas to {}x{} will delete all {} images in the gallery. Continue?",
            pending.width, pending.height, pending.entries_to_drop
        ),
        Dialog::ConfirmClearGallery => format!(
            "Delete all {} images in the gallery?",
            app.workspace.gallery().len()
        ),
    };

    egui::Window::new("Confirm")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.horizontal(|ui| {
                if ui.button("Continue").clicked() {
                    app.push_action(UiAction::ConfirmDialog);
                }
                if ui.button("Cancel").clicked() {
                    app.push_action(UiAction::CancelDialog);
                }
            });
        });
}
