// src/renderer.rs
//! Turns a Scene into pixels. The visible canvas and the PNG export both come
//! from `render_scene`, so what the user sees is what gets exported.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use log::debug;

use crate::element::Element;
use crate::error::EditorResult;
use crate::scene::Scene;

/// Flatten every object, back to front, over the scene background.
pub fn render_scene(scene: &Scene) -> RgbaImage {
    let size = scene.size();
    let width = size.x.round().max(1.0) as u32;
    let height = size.y.round().max(1.0) as u32;
    let background = Rgba(scene.background().to_srgba_unmultiplied());

    let mut canvas = RgbaImage::from_pixel(width, height, background);
    for object in scene.objects() {
        object.element.rasterize(&mut canvas);
    }
    debug!(
        "Rendered {} objects at {}x{} (scene v{})",
        scene.len(),
        width,
        height,
        scene.version()
    );
    canvas
}

/// Lossless PNG bytes for `raster`.
pub fn encode_png(raster: &RgbaImage) -> EditorResult<Vec<u8>> {
    let mut bytes = Vec::new();
    raster.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Convert a raster for upload as an egui texture.
pub fn to_color_image(raster: &RgbaImage) -> egui::ColorImage {
    let size = [raster.width() as usize, raster.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, raster.as_flat_samples().as_slice())
}

#[cfg(test)]
mod tests {
    use egui::{Color32, Vec2};

    use super::*;
    use crate::config::CanvasConfig;
    use crate::element::{ShapeKind, factory};

    #[test]
    fn test_empty_scene_is_background() {
        let scene = Scene::new(Vec2::new(4.0, 3.0), Color32::from_rgb(10, 20, 30));
        let raster = render_scene(&scene);
        assert_eq!(raster.dimensions(), (4, 3));
        assert!(raster.pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }

    #[test]
    fn test_later_objects_paint_on_top() {
        let config = CanvasConfig::default();
        let mut scene = Scene::new(config.size, config.background);
        scene.add_object(factory::default_shape(ShapeKind::Rectangle, &config));
        scene.add_object(factory::default_shape(ShapeKind::Circle, &config));

        let raster = render_scene(&scene);
        // circle (centre 200, 200) covers the rectangle's lower right part
        assert_eq!(raster.get_pixel(200, 170).0, [255, 0, 0, 255]);
        // rectangle corner outside the circle stays blue
        assert_eq!(raster.get_pixel(101, 101).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_png_decodes_back_to_same_pixels() {
        let config = CanvasConfig::default();
        let mut scene = Scene::new(Vec2::new(240.0, 220.0), config.background);
        scene.add_object(factory::default_shape(ShapeKind::Triangle, &config));
        let raster = render_scene(&scene);

        let png = encode_png(&raster).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, raster);
    }
}
