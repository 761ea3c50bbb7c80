use std::sync::OnceLock;

use ab_glyph::{Font, FontRef, ScaleFont};
use egui::{Color32, Pos2, Rect, Vec2};
use image::RgbaImage;
use log::error;

use super::Element;
use super::common::blend_pixel;

static DEFAULT_FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();

/// The proportional font egui ships with, parsed once.
pub(crate) fn default_font() -> Option<&'static FontRef<'static>> {
    DEFAULT_FONT
        .get_or_init(|| match FontRef::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT) {
            Ok(font) => Some(font),
            Err(err) => {
                error!("Failed to parse built-in font: {err}");
                None
            }
        })
        .as_ref()
}

/// Single-style text element. Lines are split on `\n`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    content: String,
    position: Pos2,
    font_size: f32,
    fill: Color32,
    editable_in_place: bool,
}

impl TextElement {
    pub fn new(content: impl Into<String>, position: Pos2, font_size: f32, fill: Color32) -> Self {
        Self {
            content: content.into(),
            position,
            font_size,
            fill,
            editable_in_place: true,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn fill(&self) -> Color32 {
        self.fill
    }

    pub fn is_editable_in_place(&self) -> bool {
        self.editable_in_place
    }

    fn line_height(&self) -> f32 {
        match default_font() {
            Some(font) => {
                let scaled = font.as_scaled(self.font_size);
                scaled.height() + scaled.line_gap()
            }
            None => self.font_size * 1.2,
        }
    }

    /// Width of the longest line and total height of all lines.
    pub fn measure(&self) -> Vec2 {
        let lines = self.content.split('\n').count().max(1) as f32;
        let width = self
            .content
            .split('\n')
            .map(|line| line_width(line, self.font_size))
            .fold(0.0_f32, f32::max);
        Vec2::new(width, lines * self.line_height())
    }
}

fn line_width(line: &str, font_size: f32) -> f32 {
    let Some(font) = default_font() else {
        return line.chars().count() as f32 * font_size * 0.6;
    };
    let scaled = font.as_scaled(font_size);
    let mut width = 0.0;
    let mut prev = None;
    for ch in line.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev_id) = prev {
            width += scaled.kern(prev_id, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev = Some(glyph_id);
    }
    width
}

impl Element for TextElement {
    fn element_type(&self) -> &'static str {
        "text"
    }

    fn position(&self) -> Pos2 {
        self.position
    }

    fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.measure())
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn rasterize(&self, canvas: &mut RgbaImage) {
        let Some(font) = default_font() else {
            return;
        };
        let scaled = font.as_scaled(self.font_size);
        let line_height = self.line_height();

        for (row, line) in self.content.split('\n').enumerate() {
            let baseline = self.position.y + row as f32 * line_height + scaled.ascent();
            let mut cursor = self.position.x;
            let mut prev = None;
            for ch in line.chars() {
                let glyph_id = font.glyph_id(ch);
                if let Some(prev_id) = prev {
                    cursor += scaled.kern(prev_id, glyph_id);
                }
                let glyph = glyph_id
                    .with_scale_and_position(self.font_size, ab_glyph::point(cursor, baseline));
                if let Some(outlined) = font.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    outlined.draw(|x, y, coverage| {
                        blend_pixel(
                            canvas,
                            bounds.min.x as i64 + x as i64,
                            bounds.min.y as i64 + y as i64,
                            self.fill,
                            coverage,
                        );
                    });
                }
                cursor += scaled.h_advance(glyph_id);
                prev = Some(glyph_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_font_parses() {
        assert!(default_font().is_some());
    }

    #[test]
    fn test_measure_grows_with_content() {
        let short = TextElement::new("Hi", Pos2::ZERO, 24.0, Color32::BLACK);
        let long = TextElement::new("Hello there", Pos2::ZERO, 24.0, Color32::BLACK);
        assert!(long.measure().x > short.measure().x);
        assert!(short.measure().y >= 23.9);
    }

    #[test]
    fn test_multiline_measure_stacks_lines() {
        let one = TextElement::new("abc", Pos2::ZERO, 20.0, Color32::BLACK);
        let two = TextElement::new("abc\nabc", Pos2::ZERO, 20.0, Color32::BLACK);
        assert!((two.measure().y - 2.0 * one.measure().y).abs() < 0.01);
        assert!((two.measure().x - one.measure().x).abs() < 0.01);
    }

    #[test]
    fn test_rasterize_paints_inside_rect() {
        let text = TextElement::new("Type Here", Pos2::new(10.0, 10.0), 24.0, Color32::BLACK);
        let mut canvas = RgbaImage::from_pixel(200, 60, image::Rgba([255, 255, 255, 255]));
        text.rasterize(&mut canvas);

        let rect = text.rect().expand(2.0);
        let mut inked = 0;
        for (x, y, pixel) in canvas.enumerate_pixels() {
            if pixel.0 != [255, 255, 255, 255] {
                inked += 1;
                assert!(rect.contains(Pos2::new(x as f32, y as f32)));
            }
        }
        assert!(inked > 0);
    }
}
