use std::sync::Arc;

use egui::{Pos2, Rect, Vec2};
use image::error::{ImageError, LimitError, LimitErrorKind};
use image::{RgbaImage, imageops};
use log::debug;

use super::Element;

/// Tallest image `scaled_to_width` will produce
pub const MAX_SCALED_HEIGHT: u32 = 8192;

/// Bitmap element holding pixels already scaled to their rendered size.
#[derive(Clone)]
pub struct ImageElement {
    source: String,
    position: Pos2,
    pixels: Arc<RgbaImage>,
}

// Custom Debug implementation so logs don't dump pixel buffers
impl std::fmt::Debug for ImageElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageElement")
            .field("source", &self.source)
            .field("position", &self.position)
            .field("rendered_width", &self.rendered_width())
            .field("rendered_height", &self.rendered_height())
            .finish()
    }
}

impl ImageElement {
    pub fn new(source: impl Into<String>, position: Pos2, pixels: Arc<RgbaImage>) -> Self {
        Self {
            source: source.into(),
            position,
            pixels,
        }
    }

    /// Scale `decoded` to `target_width`, preserving its aspect ratio.
    ///
    /// Fails with a dimension limit error when the scaled height would exceed
    /// `MAX_SCALED_HEIGHT`.
    pub fn scaled_to_width(
        source: impl Into<String>,
        decoded: &RgbaImage,
        target_width: f32,
        position: Pos2,
    ) -> Result<Self, ImageError> {
        let (width, height) = fit_width(decoded.width(), decoded.height(), target_width);
        if height > MAX_SCALED_HEIGHT {
            return Err(ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError)));
        }
        let pixels = if (width, height) == decoded.dimensions() {
            decoded.clone()
        } else {
            imageops::resize(decoded, width, height, imageops::FilterType::Triangle)
        };
        debug!(
            "Scaled image {}x{} -> {}x{}",
            decoded.width(),
            decoded.height(),
            width,
            height
        );
        Ok(Self::new(source, position, Arc::new(pixels)))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn rendered_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn rendered_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Target dimensions for a `width`×`height` image scaled to `target_width`.
pub fn fit_width(width: u32, height: u32, target_width: f32) -> (u32, u32) {
    let target = target_width.round().max(1.0) as u32;
    if width == 0 || height == 0 {
        return (target, 1);
    }
    let scale = target as f32 / width as f32;
    let scaled_height = (height as f32 * scale).round().max(1.0) as u32;
    (target, scaled_height)
}

impl Element for ImageElement {
    fn element_type(&self) -> &'static str {
        "image"
    }

    fn position(&self) -> Pos2 {
        self.position
    }

    fn rect(&self) -> Rect {
        Rect::from_min_size(
            self.position,
            Vec2::new(self.rendered_width() as f32, self.rendered_height() as f32),
        )
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn rasterize(&self, canvas: &mut RgbaImage) {
        imageops::overlay(
            canvas,
            self.pixels.as_ref(),
            self.position.x.round() as i64,
            self.position.y.round() as i64,
        );
    }
}
