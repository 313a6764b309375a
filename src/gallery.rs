use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::grid::Grid;
use crate::util::time;

/// An immutable snapshot of a finished drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    id: String,
    data: Grid,
    width: usize,
    height: usize,
    /// Milliseconds since the UNIX epoch
    created_at: u64,
}

impl GalleryEntry {
    fn snapshot(grid: &Grid) -> Self {
        Self {
            id: format!("img_{}", Uuid::new_v4().simple()),
            data: grid.clone(),
            width: grid.width(),
            height: grid.height(),
            created_at: time::timestamp_millis(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn grid(&self) -> &Grid {
        &self.data
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Whether the metadata agrees with the stored grid.
    fn is_consistent(&self) -> bool {
        self.data.dimensions() == (self.width, self.height)
    }
}

/// Ordered collection of saved drawings that all share one canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    width: usize,
    height: usize,
    entries: Vec<GalleryEntry>,
}

impl Gallery {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            entries: Vec::new(),
        }
    }

    /// Rebuilds a gallery from stored entries, dropping any that do not match
    /// the canvas size.
    pub fn from_entries(width: usize, height: usize, entries: Vec<GalleryEntry>) -> Self {
        let total = entries.len();
        let entries: Vec<_> = entries
            .into_iter()
            .filter(|entry| entry.is_consistent() && (entry.width, entry.height) == (width, height))
            .collect();
        if entries.len() != total {
            log::warn!(
                "Dropped {} stored gallery entries that do not match the {}x{} canvas",
                total - entries.len(),
                width,
                height
            );
        }
        Self {
            width,
            height,
            entries,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Stores a deep copy of `grid` and returns the new entry.
    pub fn save(&mut self, grid: &Grid) -> WorkspaceResult<&GalleryEntry> {
        if grid.dimensions() != self.dimensions() {
            return Err(WorkspaceError::DimensionMismatch {
                expected: self.dimensions(),
                found: grid.dimensions(),
            });
        }
        self.entries.push(GalleryEntry::snapshot(grid));
        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Removes every entry. Returns how many were removed.
    pub fn clear(&mut self) -> WorkspaceResult<usize> {
        if self.entries.is_empty() {
            return Err(WorkspaceError::GalleryAlreadyEmpty);
        }
        let removed = self.entries.len();
        self.entries.clear();
        Ok(removed)
    }

    /// Switches to a new canvas size. Existing entries no longer fit and are
    /// dropped; returns how many.
    pub fn reset_dimensions(&mut self, width: usize, height: usize) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        self.width = width;
        self.height = height;
        dropped
    }

    /// Entries in insertion order.
    pub fn list(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_assigns_unique_ids_in_order() {
        let mut gallery = Gallery::new(4, 4);
        let grid = Grid::new(4, 4);
        let first = gallery.save(&grid).unwrap().id().to_owned();
        let second = gallery.save(&grid).unwrap().id().to_owned();
        assert_ne!(first, second);
        assert_eq!(gallery.list()[0].id(), first);
        assert_eq!(gallery.list()[1].id(), second);
        assert!(first.starts_with("img_"));
    }

    #[test]
    fn save_rejects_other_dimensions() {
        let mut gallery = Gallery::new(4, 4);
        let err = gallery.save(&Grid::new(5, 4)).unwrap_err();
        assert_eq!(
            err,
            WorkspaceError::DimensionMismatch {
                expected: (4, 4),
                found: (5, 4)
            }
        );
        assert!(gallery.is_empty());
    }

    #[test]
    fn clear_on_empty_gallery_is_an_error() {
        let mut gallery = Gallery::new(2, 2);
        assert_eq!(gallery.clear(), Err(WorkspaceError::GalleryAlreadyEmpty));
        gallery.save(&Grid::new(2, 2)).unwrap();
        assert_eq!(gallery.clear(), Ok(1));
        assert!(gallery.is_empty());
    }

    #[test]
    fn from_entries_drops_mismatched_sizes() {
        let mut small = Gallery::new(2, 2);
        small.save(&Grid::new(2, 2)).unwrap();
        let mut large = Gallery::new(3, 3);
        large.save(&Grid::new(3, 3)).unwrap();

        let mixed = vec![small.list()[0].clone(), large.list()[0].clone()];
        let gallery = Gallery::from_entries(2, 2, mixed);
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.list()[0].width(), 2);
    }

    #[test]
    fn entry_serializes_with_camel_case_keys() {
        let mut gallery = Gallery::new(2, 1);
        let entry = gallery.save(&Grid::new(2, 1)).unwrap();
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json["data"], serde_json::json!([[0, 0]]));
        assert_eq!(json["width"], 2);
        assert!(json["createdAt"].is_u64());
    }
}
