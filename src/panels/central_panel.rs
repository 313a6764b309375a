use crate::PaintApp;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let grid_size = app.workspace.canvas_size();
        let cell_size = app.workspace.cell_size();
        let canvas_size = egui::vec2(grid_size.0 as f32 * cell_size, grid_size.1 as f32 * cell_size);

        let (response, painter) = ui.allocate_painter(canvas_size, egui::Sense::drag());
        app.input_handler.set_canvas_rect(response.rect);

        // A modal dialog owns the pointer; strokes resume after it closes.
        if app.dialog.is_some() {
            app.input_handler.reset();
        } else {
            let mut painted = false;
            for event in app.input_handler.process_input(ctx) {
                let changed = app.workspace.handle_input(&event);
                painted |= !changed.is_empty();
                app.renderer.mark_cells(&changed);
            }
            if painted {
                ctx.request_repaint();
            }
        }

        let PaintApp {
            workspace, renderer, ..
        } = app;
        renderer.render_canvas(ctx, &painter, response.rect, workspace.grid(), workspace.cell_size());
    });
}
