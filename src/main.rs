#![warn(clippy::all, rust_2018_idioms)]

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Dataset Paint"),
        ..Default::default()
    };

    eframe::run_native(
        "dataset_paint",
        native_options,
        Box::new(|cc| Ok(Box::new(dataset_paint::PaintApp::new(cc)))),
    )
}
