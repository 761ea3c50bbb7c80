use egui::{Color32, Pos2, Rect};
use image::RgbaImage;

/// Gap between an element's bounds and the selection outline drawn around it
pub const SELECTION_PADDING: f32 = 4.0;

/// Composite `color` onto one canvas pixel, scaled by `coverage` in 0..=1.
/// Out-of-bounds coordinates are ignored.
pub(crate) fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Color32, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let src_a = (a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }

    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    let mix = |s: u8, d: u8| -> u8 {
        if out_a <= 0.0 {
            return 0;
        }
        let v = (s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    dst[0] = mix(r, dst[0]);
    dst[1] = mix(g, dst[1]);
    dst[2] = mix(b, dst[2]);
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Pixel indices whose centres fall inside `rect`, clipped to the canvas.
pub(crate) fn covered_pixels(rect: Rect, canvas: &RgbaImage) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
    let span = |min: f32, max: f32, limit: u32| {
        let start = (min - 0.5).ceil().max(0.0) as u32;
        let end = ((max - 0.5).ceil().max(0.0) as u32).min(limit);
        start.min(end)..end
    };
    (
        span(rect.min.x, rect.max.x, canvas.width()),
        span(rect.min.y, rect.max.y, canvas.height()),
    )
}

pub(crate) fn pixel_center(x: u32, y: u32) -> Pos2 {
    Pos2::new(x as f32 + 0.5, y as f32 + 0.5)
}

/// Same-side test against the three edges, either winding.
pub(crate) fn triangle_contains(p: Pos2, a: Pos2, b: Pos2, c: Pos2) -> bool {
    let edge = |p1: Pos2, p2: Pos2| (p.x - p2.x) * (p1.y - p2.y) - (p1.x - p2.x) * (p.y - p2.y);
    let d1 = edge(a, b);
    let d2 = edge(b, c);
    let d3 = edge(c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// `#rrggbb`, the form the layer panel shows fills in.
pub fn color_hex(color: Color32) -> String {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_opaque_replaces_pixel() {
        let mut canvas = RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 255]));
        blend_pixel(&mut canvas, 1, 1, Color32::from_rgb(0, 0, 255), 1.0);
        assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_blend_out_of_bounds_is_ignored() {
        let mut canvas = RgbaImage::new(2, 2);
        blend_pixel(&mut canvas, -1, 0, Color32::RED, 1.0);
        blend_pixel(&mut canvas, 2, 0, Color32::RED, 1.0);
        assert!(canvas.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_covered_pixels_uses_pixel_centres() {
        let canvas = RgbaImage::new(300, 300);
        let rect = Rect::from_min_size(Pos2::new(100.0, 100.0), egui::vec2(120.0, 80.0));
        let (xs, ys) = covered_pixels(rect, &canvas);
        assert_eq!(xs, 100..220);
        assert_eq!(ys, 100..180);
    }

    #[test]
    fn test_triangle_contains() {
        let (a, b, c) = (Pos2::new(50.0, 0.0), Pos2::new(0.0, 100.0), Pos2::new(100.0, 100.0));
        assert!(triangle_contains(Pos2::new(50.0, 50.0), a, b, c));
        assert!(!triangle_contains(Pos2::new(5.0, 5.0), a, b, c));
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(color_hex(Color32::from_rgb(0, 128, 255)), "#0080ff");
    }
}
