use egui::{Pos2, Rect, Vec2};

mod common;
pub(crate) mod image;
pub(crate) mod shape;
pub(crate) mod text;

pub use self::image::{ImageElement, MAX_SCALED_HEIGHT, fit_width};
pub use self::shape::{ShapeElement, ShapeKind};
pub use self::text::TextElement;
pub use common::{SELECTION_PADDING, color_hex};

use crate::id_generator::ElementId;

/// Common trait that all drawable objects implement
pub trait Element {
    /// Short type tag, as shown in the layer panel
    fn element_type(&self) -> &'static str;

    /// Top-left corner in canvas coordinates
    fn position(&self) -> Pos2;

    /// Get the bounding rectangle for this element
    fn rect(&self) -> Rect;

    /// Test if the element contains the given position
    fn hit_test(&self, pos: Pos2) -> bool {
        self.rect().contains(pos)
    }

    /// Translate the element by the given delta
    fn translate(&mut self, delta: Vec2);

    /// Paint the element onto `canvas`, compositing over what is already there
    fn rasterize(&self, canvas: &mut ::image::RgbaImage);
}

/// Enumeration of all drawable object types
#[derive(Debug, Clone)]
pub enum ElementType {
    Image(ImageElement),
    Text(TextElement),
    Shape(ShapeElement),
}

impl ElementType {
    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            ElementType::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextElement> {
        match self {
            ElementType::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageElement> {
        match self {
            ElementType::Image(i) => Some(i),
            _ => None,
        }
    }

}

impl Element for ElementType {
    fn element_type(&self) -> &'static str {
        match self {
            ElementType::Image(i) => i.element_type(),
            ElementType::Text(t) => t.element_type(),
            ElementType::Shape(s) => s.element_type(),
        }
    }

    fn position(&self) -> Pos2 {
        match self {
            ElementType::Image(i) => i.position(),
            ElementType::Text(t) => t.position(),
            ElementType::Shape(s) => s.position(),
        }
    }

    fn rect(&self) -> Rect {
        match self {
            ElementType::Image(i) => i.rect(),
            ElementType::Text(t) => t.rect(),
            ElementType::Shape(s) => s.rect(),
        }
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        match self {
            ElementType::Image(i) => i.hit_test(pos),
            ElementType::Text(t) => t.hit_test(pos),
            ElementType::Shape(s) => s.hit_test(pos),
        }
    }

    fn translate(&mut self, delta: Vec2) {
        match self {
            ElementType::Image(i) => i.translate(delta),
            ElementType::Text(t) => t.translate(delta),
            ElementType::Shape(s) => s.translate(delta),
        }
    }

    fn rasterize(&self, canvas: &mut ::image::RgbaImage) {
        match self {
            ElementType::Image(i) => i.rasterize(canvas),
            ElementType::Text(t) => t.rasterize(canvas),
            ElementType::Shape(s) => s.rasterize(canvas),
        }
    }
}

/// An element together with the identity the Scene assigned to it
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: ElementId,
    pub element: ElementType,
}

/// Factory functions for the objects the toolbar creates
pub mod factory {
    use super::*;
    use crate::config::CanvasConfig;
    use crate::error::{EditorError, EditorResult};

    pub fn default_text(config: &CanvasConfig) -> ElementType {
        ElementType::Text(TextElement::new(
            config.text_content.clone(),
            config.text_position,
            config.text_font_size,
            config.text_fill,
        ))
    }

    pub fn default_shape(kind: ShapeKind, config: &CanvasConfig) -> ElementType {
        let shape = match kind {
            ShapeKind::Circle => {
                ShapeElement::circle(config.circle_position, config.circle_radius, config.circle_fill)
            }
            ShapeKind::Rectangle => ShapeElement::rectangle(
                config.rectangle_position,
                config.rectangle_size,
                config.rectangle_fill,
            ),
            ShapeKind::Triangle => ShapeElement::triangle(
                config.triangle_position,
                config.triangle_size,
                config.triangle_fill,
            ),
        };
        ElementType::Shape(shape)
    }

    /// Scale a decoded image to the configured width and place it at the default offset
    pub fn fitted_image(
        source: &str,
        decoded: &::image::RgbaImage,
        config: &CanvasConfig,
    ) -> EditorResult<ElementType> {
        ImageElement::scaled_to_width(source, decoded, config.image_target_width, config.image_offset)
            .map(ElementType::Image)
            .map_err(|source_err| EditorError::ImageDecode {
                url: source.to_owned(),
                source: source_err,
            })
    }
}
