use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{self, Settings};
use crate::gallery::GalleryEntry;
use crate::util::time;

/// Errors that can occur during state persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize state: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid state data: {0}")]
    InvalidState(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// The gallery and canvas size as written under [`config::WORKSPACE_KEY`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoredWorkspace {
    #[serde(deserialize_with = "readable_entries")]
    pub gallery_entries: Vec<GalleryEntry>,
    pub canvas_width: usize,
    pub canvas_height: usize,
    /// Milliseconds since the UNIX epoch of the last write
    pub last_modified: u64,
}

impl Default for StoredWorkspace {
    fn default() -> Self {
        let (canvas_width, canvas_height) = config::DEFAULT_CANVAS_SIZE;
        Self {
            gallery_entries: Vec::new(),
            canvas_width,
            canvas_height,
            last_modified: 0,
        }
    }
}

/// Reads the stored entries one by one, skipping any that no longer parse
/// (e.g. a ragged or non-binary grid).
fn readable_entries<'de, D>(deserializer: D) -> Result<Vec<GalleryEntry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let total = raw.len();
    let entries: Vec<GalleryEntry> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Skipping unreadable gallery entry: {err}");
                None
            }
        })
        .collect();
    if entries.len() != total {
        log::warn!("Dropped {} of {} stored gallery entries", total - entries.len(), total);
    }
    Ok(entries)
}

impl StoredWorkspace {
    fn validate(self) -> PersistenceResult<Self> {
        let max = config::MAX_CANVAS_PIXELS;
        if self.canvas_width == 0 || self.canvas_height == 0 || self.canvas_width > max || self.canvas_height > max {
            return Err(PersistenceError::InvalidState(format!(
                "canvas size {}x{} is out of range",
                self.canvas_width, self.canvas_height
            )));
        }
        Ok(self)
    }
}

/// Reads the stored workspace, falling back to defaults when nothing usable
/// is stored.
pub fn load_workspace(storage: Option<&dyn eframe::Storage>) -> StoredWorkspace {
    let Some(json) = storage.and_then(|s| s.get_string(config::WORKSPACE_KEY)) else {
        log::info!("No stored workspace, starting with defaults");
        return StoredWorkspace::default();
    };

    match parse_workspace(&json) {
        Ok(stored) => stored,
        Err(err) => {
            log::warn!("Ignoring stored workspace: {err}");
            StoredWorkspace::default()
        }
    }
}

pub fn parse_workspace(json: &str) -> PersistenceResult<StoredWorkspace> {
    serde_json::from_str::<StoredWorkspace>(json)?.validate()
}

/// Writes the workspace and flushes the store immediately.
pub fn save_workspace(storage: &mut dyn eframe::Storage, stored: &StoredWorkspace) -> PersistenceResult<()> {
    let stored = StoredWorkspace {
        last_modified: time::timestamp_millis(),
        ..stored.clone()
    };
    let json = serde_json::to_string(&stored)?;
    storage.set_string(config::WORKSPACE_KEY, json);
    storage.flush();
    Ok(())
}

pub fn load_settings(storage: Option<&dyn eframe::Storage>) -> Settings {
    let Some(json) = storage.and_then(|s| s.get_string(config::SETTINGS_KEY)) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&json) {
        Ok(settings) => settings.sanitized(),
        Err(err) => {
            log::warn!("Ignoring stored settings: {err}");
            Settings::default()
        }
    }
}

pub fn save_settings(storage: &mut dyn eframe::Storage, settings: &Settings) -> PersistenceResult<()> {
    let json = serde_json::to_string(settings)?;
    storage.set_string(config::SETTINGS_KEY, json);
    storage.flush();
    Ok(())
}

/// In-memory key-value store, used when the platform offers no storage and
/// in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    flushes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the store has been flushed
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl eframe::Storage for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::Gallery;
    use crate::grid::Grid;
    use eframe::Storage;

    #[test]
    fn missing_or_corrupt_data_yields_defaults() {
        assert_eq!(load_workspace(None), StoredWorkspace::default());

        let mut store = MemoryStore::new();
        store.set_string(config::WORKSPACE_KEY, "{not json".to_owned());
        assert_eq!(load_workspace(Some(&store)), StoredWorkspace::default());

        store.set_string(config::WORKSPACE_KEY, r#"{"canvasWidth":0,"canvasHeight":5}"#.to_owned());
        assert_eq!(load_workspace(Some(&store)), StoredWorkspace::default());
    }

    #[test]
    fn save_then_load_keeps_entries_and_flushes() {
        let mut gallery = Gallery::new(2, 2);
        let mut grid = Grid::new(2, 2);
        grid.paint(1, 0);
        gallery.save(&grid).unwrap();

        let stored = StoredWorkspace {
            gallery_entries: gallery.list().to_vec(),
            canvas_width: 2,
            canvas_height: 2,
            last_modified: 0,
        };
        let mut store = MemoryStore::new();
        save_workspace(&mut store, &stored).unwrap();
        assert_eq!(store.flush_count(), 1);

        let loaded = load_workspace(Some(&store));
        assert_eq!(loaded.gallery_entries, stored.gallery_entries);
        assert_eq!((loaded.canvas_width, loaded.canvas_height), (2, 2));
        assert!(loaded.last_modified > 0);
    }

    #[test]
    fn unreadable_entries_are_skipped() {
        let json = r#"{
            "galleryEntries": [
                {"id": "img_ok", "data": [[0, 1], [1, 0]], "width": 2, "height": 2, "createdAt": 1},
                {"id": "img_ragged", "data": [[0, 1], [1]], "width": 2, "height": 2, "createdAt": 2}
            ],
            "canvasWidth": 2,
            "canvasHeight": 2
        }"#;
        let stored = parse_workspace(json).unwrap();
        assert_eq!(stored.gallery_entries.len(), 1);
        assert_eq!(stored.gallery_entries[0].id(), "img_ok");
    }

    #[test]
    fn stored_json_uses_camel_case_keys() {
        let mut store = MemoryStore::new();
        save_workspace(&mut store, &StoredWorkspace::default()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&store.get_string(config::WORKSPACE_KEY).unwrap()).unwrap();
        assert_eq!(json["canvasWidth"], 32);
        assert!(json["galleryEntries"].is_array());
        assert!(json["lastModified"].is_u64());
    }

    #[test]
    fn settings_round_trip_through_the_store() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            brush_size: 6,
            speed_adjust: true,
            ..Settings::default()
        };
        save_settings(&mut store, &settings).unwrap();
        assert_eq!(load_settings(Some(&store)), settings);
    }
}
