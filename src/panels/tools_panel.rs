use crate::PaintApp;
use crate::app::{NoticeLevel, UiAction};
use crate::brush::MIN_BRUSH_SIZE;
use crate::config;
use crate::export::{ExportFormat, TextLayout};

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(230.0)
        .show(ctx, |ui| {
            ui.heading("Canvas");
            size_controls(app, ui);

            ui.separator();
            ui.heading("Brush");
            brush_controls(app, ui);

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Save to gallery").clicked() {
                    app.push_action(UiAction::SaveDrawing);
                }
                if ui.button("Reset").clicked() {
                    app.push_action(UiAction::ResetCanvas);
                }
            });

            ui.separator();
            ui.heading("Export");
            export_controls(app, ui);

            ui.separator();
            notices(app, ui);
        });
}

fn size_label((width, height): (usize, usize)) -> String {
    format!("{width}x{height}")
}

fn size_controls(app: &mut PaintApp, ui: &mut egui::Ui) {
    let current = app.workspace.canvas_size();
    let selected_text = if app.custom_size_mode {
        "Custom…".to_owned()
    } else {
        size_label(current)
    };

    egui::ComboBox::from_label("Size")
        .selected_text(selected_text)
        .show_ui(ui, |ui| {
            for &(width, height) in config::SIZE_PRESETS {
                let selected = !app.custom_size_mode && current == (width, height);
                if ui.selectable_label(selected, size_label((width, height))).clicked() {
                    app.push_action(UiAction::SelectSize { width, height });
                }
            }
            if ui.selectable_label(app.custom_size_mode, "Custom…").clicked() {
                app.custom_size_mode = true;
            }
        });

    if app.custom_size_mode {
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut app.custom_width).desired_width(40.0));
            ui.label("x");
            ui.add(egui::TextEdit::singleline(&mut app.custom_height).desired_width(40.0));
            if ui.button("Apply").clicked() {
                app.push_action(UiAction::ApplyCustomSize);
            }
        });
    }
}

fn brush_controls(app: &mut PaintApp, ui: &mut egui::Ui) {
    let mut changed = false;
    changed |= ui
        .add(egui::Slider::new(&mut app.settings.brush_size, MIN_BRUSH_SIZE..=config::MAX_BRUSH_SIZE).text("Size"))
        .changed();
    changed |= ui
        .checkbox(&mut app.settings.speed_adjust, "Thinner when drawing fast")
        .changed();
    if app.settings.speed_adjust {
        changed |= ui
            .add(egui::Slider::new(&mut app.settings.speed_policy.speed_factor, 0.0..=20.0).text("Speed factor"))
            .changed();
    }
    ui.label(format!("State: {}", app.workspace.editor_state().name()));

    if changed {
        app.push_action(UiAction::SettingsChanged);
    }
}

fn export_controls(app: &mut PaintApp, ui: &mut egui::Ui) {
    let mut format = app.settings.export_format;
    ui.radio_value(&mut format, ExportFormat::Bitmap, "Bitmap images (.bmp)");
    let text_selected = matches!(format, ExportFormat::Text(_));
    if ui.radio(text_selected, "Text arrays (.txt)").clicked() && !text_selected {
        format = ExportFormat::Text(TextLayout::default());
    }
    if let ExportFormat::Text(layout) = &mut format {
        ui.indent("text_layout", |ui| {
            ui.radio_value(layout, TextLayout::PerImage, "One file per image");
            ui.radio_value(layout, TextLayout::Combined, "Single dataset file");
        });
    }
    if format != app.settings.export_format {
        app.settings.export_format = format;
        app.push_action(UiAction::SettingsChanged);
    }

    ui.horizontal(|ui| {
        ui.label("Folder:");
        if ui.text_edit_singleline(&mut app.export_dir_text).lost_focus() {
            app.push_action(UiAction::SettingsChanged);
        }
    });

    ui.horizontal(|ui| {
        let exporting = app.is_exporting();
        if ui.add_enabled(!exporting, egui::Button::new("Export dataset")).clicked() {
            app.push_action(UiAction::Export);
        }
        if exporting {
            ui.add(egui::Spinner::new());
        }
    });
}

fn notices(app: &mut PaintApp, ui: &mut egui::Ui) {
    if app.notices.is_empty() {
        return;
    }
    for notice in &app.notices {
        let color = match notice.level {
            NoticeLevel::Info => ui.visuals().text_color(),
            NoticeLevel::Warning => ui.visuals().warn_fg_color,
            NoticeLevel::Error => ui.visuals().error_fg_color,
        };
        ui.colored_label(color, notice.text.as_str());
    }
    if ui.small_button("Dismiss").clicked() {
        app.notices.clear();
    }
}
