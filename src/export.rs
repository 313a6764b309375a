//! Dataset export: gallery entries to BMP or JSON text, packed into a zip.
//!
//! Archive assembly runs on a worker thread behind an [`ExportTask`] so the
//! UI keeps drawing. The task can be polled each frame or awaited; it always
//! runs to completion.

use std::future::Future;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use image::{ImageFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::gallery::GalleryEntry;
use crate::grid::Grid;
use crate::util::time;

/// How text exports are split into files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextLayout {
    /// `image_{i}.txt`, one 2D array per file
    #[default]
    PerImage,
    /// `dataset.txt`, a single 3D array
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    /// `image_{i}.bmp`, one pixel per cell
    #[default]
    Bitmap,
    Text(TextLayout),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("The gallery is empty, draw and save an image first")]
    EmptyGallery,

    #[error("Failed to encode bitmap: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to serialize drawing: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export task ended without a result")]
    TaskDropped,
}

pub type ExportResult<T> = Result<T, ExportError>;

/// One file inside the dataset archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Encodes a grid as a BMP: painted cells black, the rest white.
pub fn encode_bitmap(grid: &Grid) -> ExportResult<Vec<u8>> {
    let image = RgbImage::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        if grid.is_painted(x as usize, y as usize) {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Bmp)?;
    Ok(bytes)
}

/// Encodes a grid as a JSON 2D array.
pub fn encode_text(grid: &Grid) -> ExportResult<String> {
    Ok(serde_json::to_string(grid)?)
}

/// Encodes every entry as one JSON 3D array, in gallery order.
pub fn encode_dataset(entries: &[GalleryEntry]) -> ExportResult<String> {
    let grids: Vec<&Grid> = entries.iter().map(GalleryEntry::grid).collect();
    Ok(serde_json::to_string(&grids)?)
}

/// The files an export of `entries` in `format` consists of.
pub fn dataset_files(entries: &[GalleryEntry], format: ExportFormat) -> ExportResult<Vec<ExportFile>> {
    if entries.is_empty() {
        return Err(ExportError::EmptyGallery);
    }

    match format {
        ExportFormat::Bitmap => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                Ok(ExportFile {
                    name: format!("image_{i}.bmp"),
                    contents: encode_bitmap(entry.grid())?,
                })
            })
            .collect(),
        ExportFormat::Text(TextLayout::PerImage) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                Ok(ExportFile {
                    name: format!("image_{i}.txt"),
                    contents: encode_text(entry.grid())?.into_bytes(),
                })
            })
            .collect(),
        ExportFormat::Text(TextLayout::Combined) => Ok(vec![ExportFile {
            name: "dataset.txt".to_owned(),
            contents: encode_dataset(entries)?.into_bytes(),
        }]),
    }
}

/// Builds the zip archive for `entries` in memory.
pub fn build_archive(entries: &[GalleryEntry], format: ExportFormat) -> ExportResult<Vec<u8>> {
    let files = dataset_files(entries, format)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for file in &files {
        writer.start_file(file.name.as_str(), options)?;
        writer.write_all(&file.contents)?;
    }
    Ok(writer.finish()?.into_inner())
}

pub fn archive_file_name(timestamp_millis: u64) -> String {
    format!("dtd-dataset-{timestamp_millis}.zip")
}

/// Everything a worker needs to produce one archive.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub entries: Vec<GalleryEntry>,
    pub format: ExportFormat,
    pub output_dir: PathBuf,
}

/// Where a finished export landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub image_count: usize,
    pub bytes: usize,
}

impl ExportJob {
    /// Builds the archive and writes it into the output directory.
    pub fn run(self, timestamp_millis: u64) -> ExportResult<ExportOutcome> {
        let archive = build_archive(&self.entries, self.format)?;
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(archive_file_name(timestamp_millis));
        std::fs::write(&path, &archive)?;
        Ok(ExportOutcome {
            path,
            image_count: self.entries.len(),
            bytes: archive.len(),
        })
    }
}

/// An in-flight export running on a worker thread.
#[derive(Debug)]
pub struct ExportTask {
    receiver: oneshot::Receiver<ExportResult<ExportOutcome>>,
}

impl ExportTask {
    /// Starts `job` in the background. An empty gallery is rejected up front
    /// and no task is created. `repaint` is woken when the result is ready.
    pub fn spawn(job: ExportJob, repaint: Option<egui::Context>) -> ExportResult<Self> {
        if job.entries.is_empty() {
            return Err(ExportError::EmptyGallery);
        }

        let (sender, receiver) = oneshot::channel();
        let timestamp = time::timestamp_millis();
        log::info!(
            "Exporting {} images as {:?} to {}",
            job.entries.len(),
            job.format,
            job.output_dir.display()
        );

        std::thread::Builder::new()
            .name("dataset-export".to_owned())
            .spawn(move || {
                let result = job.run(timestamp);
                // The receiver may already be gone if the app shut down.
                let _ = sender.send(result);
                if let Some(ctx) = repaint {
                    ctx.request_repaint();
                }
            })?;

        Ok(Self { receiver })
    }

    /// Non-blocking check for the result; `None` while still running.
    pub fn poll_result(&mut self) -> Option<ExportResult<ExportOutcome>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(ExportError::TaskDropped)),
        }
    }
}

impl Future for ExportTask {
    type Output = ExportResult<ExportOutcome>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(ExportError::TaskDropped)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::Gallery;

    fn gallery_with_diagonal() -> Gallery {
        let mut grid = Grid::new(3, 2);
        grid.paint(0, 0);
        grid.paint(1, 1);
        let mut gallery = Gallery::new(3, 2);
        gallery.save(&grid).unwrap();
        gallery
    }

    #[test]
    fn bitmap_has_one_pixel_per_cell() {
        let gallery = gallery_with_diagonal();
        let bytes = encode_bitmap(gallery.list()[0].grid()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(decoded.get_pixel(1, 0), &Rgb([255, 255, 255]));
        assert_eq!(decoded.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn text_layouts_name_files_by_index() {
        let mut gallery = gallery_with_diagonal();
        gallery.save(&Grid::new(3, 2)).unwrap();

        let per_image = dataset_files(gallery.list(), ExportFormat::Text(TextLayout::PerImage)).unwrap();
        let names: Vec<_> = per_image.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["image_0.txt", "image_1.txt"]);
        assert_eq!(per_image[0].contents, b"[[1,0,0],[0,1,0]]");

        let combined = dataset_files(gallery.list(), ExportFormat::Text(TextLayout::Combined)).unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].name, "dataset.txt");
        assert_eq!(combined[0].contents, b"[[[1,0,0],[0,1,0]],[[0,0,0],[0,0,0]]]");
    }

    #[test]
    fn empty_gallery_produces_no_archive() {
        assert!(matches!(
            build_archive(&[], ExportFormat::Bitmap),
            Err(ExportError::EmptyGallery)
        ));
        let job = ExportJob {
            entries: Vec::new(),
            format: ExportFormat::Bitmap,
            output_dir: PathBuf::from("unused"),
        };
        assert!(matches!(ExportTask::spawn(job, None), Err(ExportError::EmptyGallery)));
    }

    #[test]
    fn archive_name_carries_the_timestamp() {
        assert_eq!(archive_file_name(1700000000123), "dtd-dataset-1700000000123.zip");
    }
}
