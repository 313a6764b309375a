use std::io::{Cursor, Read};
use std::path::PathBuf;

use dataset_paint::app::UiAction;
use dataset_paint::export::{self, ExportFormat, ExportJob, ExportTask, TextLayout};
use dataset_paint::gallery::Gallery;
use dataset_paint::grid::Grid;
use dataset_paint::state::MemoryStore;
use dataset_paint::PaintApp;

fn sample_gallery() -> Gallery {
    let mut gallery = Gallery::new(4, 3);
    let mut grid = Grid::new(4, 3);
    grid.paint(0, 0);
    grid.paint(3, 2);
    gallery.save(&grid).unwrap();
    grid.clear();
    grid.paint(1, 1);
    gallery.save(&grid).unwrap();
    gallery
}

fn read_archive(bytes: Vec<u8>) -> zip::ZipArchive<Cursor<Vec<u8>>> {
    zip::ZipArchive::new(Cursor::new(bytes)).unwrap()
}

fn read_entry(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
    let mut contents = Vec::new();
    archive.by_name(name).unwrap().read_to_end(&mut contents).unwrap();
    contents
}

fn scratch_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dataset-paint-{label}-{}", uuid::Uuid::new_v4().simple()))
}

#[test]
fn test_bitmap_archive_has_one_image_per_entry() {
    let gallery = sample_gallery();
    let mut archive = read_archive(export::build_archive(gallery.list(), ExportFormat::Bitmap).unwrap());

    let mut names: Vec<String> = archive.file_names().map(str::to_owned).collect();
    names.sort();
    assert_eq!(names, vec!["image_0.bmp", "image_1.bmp"]);

    let decoded = image::load_from_memory(&read_entry(&mut archive, "image_0.bmp"))
        .unwrap()
        .to_rgb8();
    assert_eq!(decoded.dimensions(), (4, 3));
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(decoded.get_pixel(3, 2).0, [0, 0, 0]);
    assert_eq!(decoded.get_pixel(1, 0).0, [255, 255, 255]);
}

#[test]
fn test_text_archive_per_image() {
    let gallery = sample_gallery();
    let format = ExportFormat::Text(TextLayout::PerImage);
    let mut archive = read_archive(export::build_archive(gallery.list(), format).unwrap());
    assert_eq!(archive.len(), 2);

    let text = String::from_utf8(read_entry(&mut archive, "image_1.txt")).unwrap();
    let rows: Vec<Vec<u8>> = serde_json::from_str(&text).unwrap();
    assert_eq!(rows, vec![vec![0, 0, 0, 0], vec![0, 1, 0, 0], vec![0, 0, 0, 0]]);
}

#[test]
fn test_text_archive_combined() {
    let gallery = sample_gallery();
    let format = ExportFormat::Text(TextLayout::Combined);
    let mut archive = read_archive(export::build_archive(gallery.list(), format).unwrap());
    assert_eq!(archive.len(), 1);

    let text = String::from_utf8(read_entry(&mut archive, "dataset.txt")).unwrap();
    let dataset: Vec<Vec<Vec<u8>>> = serde_json::from_str(&text).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset[0][0], vec![1, 0, 0, 0]);
    assert_eq!(dataset[0][2], vec![0, 0, 0, 1]);
}

#[test]
fn test_export_task_writes_archive() {
    let gallery = sample_gallery();
    let dir = scratch_dir("task");
    let job = ExportJob {
        entries: gallery.list().to_vec(),
        format: ExportFormat::Bitmap,
        output_dir: dir.clone(),
    };

    let task = ExportTask::spawn(job, None).unwrap();
    let outcome = futures::executor::block_on(task).unwrap();

    assert_eq!(outcome.image_count, 2);
    assert!(outcome.path.starts_with(&dir));
    let file_name = outcome.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("dtd-dataset-") && file_name.ends_with(".zip"));

    let bytes = std::fs::read(&outcome.path).unwrap();
    assert_eq!(bytes.len(), outcome.bytes);
    assert_eq!(read_archive(bytes).len(), 2);

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_app_export_runs_in_background() {
    let mut store = MemoryStore::new();
    let mut app = PaintApp::with_storage(None);
    app.dispatch(UiAction::SaveDrawing, &mut store, None);

    let dir = scratch_dir("app");
    let mut settings = app.settings().clone();
    settings.export_dir = dir.clone();
    let mut app = app.with_settings(settings);

    app.dispatch(UiAction::Export, &mut store, None);
    assert!(app.is_exporting());

    let outcome = futures::executor::block_on(app.finish_export()).unwrap().unwrap();
    assert!(!app.is_exporting());
    assert_eq!(outcome.image_count, 1);
    assert!(outcome.path.exists());

    std::fs::remove_dir_all(dir).unwrap();
}
