use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Invalid texture dimensions")]
    InvalidDimensions,
}

/// Caches one texture per gallery entry.
///
/// Entries never change after they are saved, so a texture stays valid until
/// its entry leaves the gallery.
pub struct TextureManager {
    /// Cache of textures by entry id
    texture_cache: HashMap<String, TextureHandle>,
    /// Tracks when each texture was last used
    last_used: HashMap<String, u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of textures to cache
    max_cache_size: usize,
}

impl TextureManager {
    /// Creates a new texture manager with the specified cache size
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Gets or creates the texture for the given entry
    pub fn get_or_create_texture<F>(
        &mut self,
        entry_id: &str,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        if let Some(handle) = self.texture_cache.get(entry_id) {
            self.last_used.insert(entry_id.to_owned(), self.current_frame);
            return Ok(handle.id());
        }

        let image = generator()?;
        if image.size[0] == 0 || image.size[1] == 0 {
            return Err(TextureGenerationError::InvalidDimensions);
        }

        // Nearest filtering keeps cell edges crisp when scaled up.
        let handle = ctx.load_texture(format!("thumb_{entry_id}"), image, TextureOptions::NEAREST);
        let id = handle.id();
        self.texture_cache.insert(entry_id.to_owned(), handle);
        self.last_used.insert(entry_id.to_owned(), self.current_frame);
        self.prune_cache_if_needed();

        Ok(id)
    }

    /// Drops textures whose entries are no longer in the gallery
    pub fn retain_entries<'a>(&mut self, live_ids: impl IntoIterator<Item = &'a str>) {
        let live: std::collections::HashSet<&str> = live_ids.into_iter().collect();
        self.texture_cache.retain(|id, _| live.contains(id.as_str()));
        self.last_used.retain(|id, _| live.contains(id.as_str()));
    }

    /// Prunes the cache if it exceeds the maximum size
    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<(String, u64)> = self
            .last_used
            .iter()
            .map(|(id, frame)| (id.clone(), *frame))
            .collect();

        // Oldest first
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() - self.max_cache_size;
        for (id, _) in entries.into_iter().take(to_remove) {
            self.texture_cache.remove(&id);
            self.last_used.remove(&id);
        }
    }

    /// Returns the number of textures currently in the cache
    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    fn get_texture(&self, entry_id: &str) -> Option<&TextureHandle> {
        self.texture_cache.get(entry_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_texture_generator() -> Result<ColorImage, TextureGenerationError> {
        Ok(ColorImage::new([10, 10], egui::Color32::WHITE))
    }

    #[test]
    fn test_cache_hit() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);

        let first = manager.get_or_create_texture("img_a", mock_texture_generator, &ctx).unwrap();
        let second = manager.get_or_create_texture("img_a", mock_texture_generator, &ctx).unwrap();

        assert_eq!(first, second);
        assert_eq!(manager.cache_size(), 1);
    }

    #[test]
    fn test_lru_eviction() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);

        manager.get_or_create_texture("img_1", mock_texture_generator, &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture("img_2", mock_texture_generator, &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture("img_3", mock_texture_generator, &ctx).unwrap();

        assert_eq!(manager.cache_size(), 2);
        assert!(manager.get_texture("img_1").is_none());
        assert!(manager.get_texture("img_2").is_some());
        assert!(manager.get_texture("img_3").is_some());
    }

    #[test]
    fn test_retain_entries() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);
        manager.get_or_create_texture("img_1", mock_texture_generator, &ctx).unwrap();
        manager.get_or_create_texture("img_2", mock_texture_generator, &ctx).unwrap();

        manager.retain_entries(["img_2"]);
        assert_eq!(manager.cache_size(), 1);
        assert!(manager.get_texture("img_2").is_some());

        manager.retain_entries(std::iter::empty());
        assert_eq!(manager.cache_size(), 0);
    }

    #[test]
    fn test_generator_errors_are_reported() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);
        let result = manager.get_or_create_texture("img_x", || Ok(ColorImage::new([0, 4], egui::Color32::WHITE)), &ctx);
        assert!(matches!(result, Err(TextureGenerationError::InvalidDimensions)));
        assert_eq!(manager.cache_size(), 0);
    }
}
