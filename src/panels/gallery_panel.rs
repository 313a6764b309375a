use crate::PaintApp;
use crate::app::UiAction;
use crate::renderer::Renderer;

pub fn gallery_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::right("gallery_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Gallery");
                ui.label(format!("({})", app.workspace.gallery().len()));
            });
            if ui.button("Clear gallery").clicked() {
                app.push_action(UiAction::ClearGallery);
            }
            ui.separator();

            let PaintApp {
                workspace, renderer, ..
            } = app;
            let entries = workspace.gallery().list();
            renderer.begin_gallery(entries);

            let thumb = egui::Vec2::splat(Renderer::thumbnail_size());
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for entry in entries {
                        let (rect, response) = ui.allocate_exact_size(thumb, egui::Sense::hover());
                        if ui.is_rect_visible(rect) {
                            renderer.render_thumbnail(ctx, ui.painter(), rect, entry);
                        }
                        response.on_hover_text(entry.id());
                    }
                });
            });
        });
}
