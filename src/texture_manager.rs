use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::RgbaImage;
use thiserror::Error;

use crate::renderer;

/// Errors that can occur while uploading a canvas raster
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Canvas raster is empty")]
    EmptyRaster,
    #[error("Invalid texture dimensions {0}x{1}")]
    InvalidDimensions(usize, usize),
}

type CacheKey = (u64, u64);

/// Keeps GPU textures for canvas rasters, keyed by (canvas, scene version).
///
/// A canvas whose scene has not changed since the last frame reuses its
/// texture; old versions age out least-recently-used first.
pub struct TextureManager {
    texture_cache: HashMap<CacheKey, TextureHandle>,
    last_used: HashMap<CacheKey, u64>,
    current_frame: u64,
    max_cache_size: usize,
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TextureManager {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Texture for `canvas_key` at `version`, uploading `generator()` on a miss
    pub fn get_or_create_texture<F>(
        &mut self,
        canvas_key: u64,
        version: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        let cache_key = (canvas_key, version);

        if let Some(handle) = self.texture_cache.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return Ok(handle.id());
        }

        let image = generator()?;
        let [width, height] = image.size;
        if width == 0 || height == 0 {
            return Err(TextureGenerationError::InvalidDimensions(width, height));
        }

        let name = format!("canvas_{canvas_key}_v{version}");
        let handle = ctx.load_texture(name, image, TextureOptions::LINEAR);
        self.texture_cache.insert(cache_key, handle.clone());
        self.last_used.insert(cache_key, self.current_frame);
        self.prune_cache_if_needed();

        Ok(handle.id())
    }

    /// Convenience wrapper uploading an already rendered canvas raster
    pub fn canvas_texture(
        &mut self,
        canvas_key: u64,
        version: u64,
        raster: &RgbaImage,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError> {
        self.get_or_create_texture(
            canvas_key,
            version,
            || {
                if raster.is_empty() {
                    return Err(TextureGenerationError::EmptyRaster);
                }
                Ok(renderer::to_color_image(raster))
            },
            ctx,
        )
    }

    /// Drops every texture belonging to `canvas_key`
    pub fn invalidate_canvas(&mut self, canvas_key: u64) {
        self.texture_cache.retain(|(key, _), _| *key != canvas_key);
        self.last_used.retain(|(key, _), _| *key != canvas_key);
    }

    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<(CacheKey, u64)> =
            self.last_used.iter().map(|(k, v)| (*k, *v)).collect();
        // oldest first; ties broken by version so stale versions go first
        entries.sort_by_key(|((_, version), frame)| (*frame, *version));

        let to_remove = entries.len() - self.max_cache_size;
        for (key, _) in entries.iter().take(to_remove) {
            self.texture_cache.remove(key);
            self.last_used.remove(key);
        }
    }

    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    pub fn get_texture(&self, canvas_key: u64, version: u64) -> Option<&TextureHandle> {
        self.texture_cache.get(&(canvas_key, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_canvas() -> Result<ColorImage, TextureGenerationError> {
        Ok(ColorImage::new([10, 10], egui::Color32::WHITE))
    }

    #[test]
    fn test_cache_hit() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);

        let first = manager.get_or_create_texture(1, 1, white_canvas, &ctx).unwrap();
        let second = manager
            .get_or_create_texture(1, 1, || panic!("should hit the cache"), &ctx)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(manager.cache_size(), 1);
    }

    #[test]
    fn test_invalidation() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);
        manager.get_or_create_texture(1, 1, white_canvas, &ctx).unwrap();
        manager.get_or_create_texture(2, 1, white_canvas, &ctx).unwrap();

        manager.invalidate_canvas(1);

        assert_eq!(manager.cache_size(), 1);
        assert!(manager.get_texture(2, 1).is_some());
    }

    #[test]
    fn test_lru_eviction() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);

        manager.get_or_create_texture(1, 1, white_canvas, &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture(1, 2, white_canvas, &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture(1, 3, white_canvas, &ctx).unwrap();

        assert_eq!(manager.cache_size(), 2);
        assert!(manager.get_texture(1, 1).is_none());
        assert!(manager.get_texture(1, 2).is_some());
        assert!(manager.get_texture(1, 3).is_some());
    }

    #[test]
    fn test_canvas_raster_upload() {
        let ctx = Context::default();
        let mut manager = TextureManager::default();
        let raster = RgbaImage::from_pixel(4, 3, image::Rgba([255, 255, 255, 255]));

        manager.canvas_texture(7, 1, &raster, &ctx).unwrap();
        let err = manager
            .canvas_texture(7, 2, &RgbaImage::new(0, 0), &ctx)
            .unwrap_err();

        assert!(matches!(err, TextureGenerationError::EmptyRaster));
        assert_eq!(manager.get_texture(7, 1).unwrap().size(), [4, 3]);
    }
}
