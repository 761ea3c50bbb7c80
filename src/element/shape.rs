use std::fmt;
use std::str::FromStr;

use egui::{Color32, Pos2, Rect, Vec2};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::Element;
use super::common::{blend_pixel, covered_pixels, pixel_center, triangle_contains};
use crate::error::EditorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Triangle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Circle, ShapeKind::Rectangle, ShapeKind::Triangle];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Triangle => "triangle",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = EditorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(ShapeKind::Circle),
            "rectangle" | "rect" => Ok(ShapeKind::Rectangle),
            "triangle" => Ok(ShapeKind::Triangle),
            _ => Err(EditorError::InvalidShapeKind(name.to_owned())),
        }
    }
}

/// Filled shape. `position` is the top-left of the bounding box for every kind;
/// circles keep a square `size` of twice their radius.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeElement {
    kind: ShapeKind,
    position: Pos2,
    size: Vec2,
    fill: Color32,
}

impl ShapeElement {
    pub fn rectangle(position: Pos2, size: Vec2, fill: Color32) -> Self {
        Self { kind: ShapeKind::Rectangle, position, size, fill }
    }

    pub fn circle(position: Pos2, radius: f32, fill: Color32) -> Self {
        Self {
            kind: ShapeKind::Circle,
            position,
            size: Vec2::splat(radius * 2.0),
            fill,
        }
    }

    pub fn triangle(position: Pos2, size: Vec2, fill: Color32) -> Self {
        Self { kind: ShapeKind::Triangle, position, size, fill }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn fill(&self) -> Color32 {
        self.fill
    }

    pub fn radius(&self) -> Option<f32> {
        match self.kind {
            ShapeKind::Circle => Some(self.size.x / 2.0),
            _ => None,
        }
    }

    /// Apex at top centre, base along the bottom edge
    fn triangle_points(&self) -> [Pos2; 3] {
        let rect = self.rect();
        [
            Pos2::new(rect.center().x, rect.min.y),
            rect.left_bottom(),
            rect.right_bottom(),
        ]
    }

    fn contains(&self, pos: Pos2) -> bool {
        let rect = self.rect();
        match self.kind {
            ShapeKind::Rectangle => rect.contains(pos),
            ShapeKind::Circle => {
                let radius = self.size.x / 2.0;
                rect.center().distance(pos) <= radius
            }
            ShapeKind::Triangle => {
                let [a, b, c] = self.triangle_points();
                triangle_contains(pos, a, b, c)
            }
        }
    }
}

impl Element for ShapeElement {
    fn element_type(&self) -> &'static str {
        self.kind.as_str()
    }

    fn position(&self) -> Pos2 {
        self.position
    }

    fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        self.contains(pos)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn rasterize(&self, canvas: &mut RgbaImage) {
        let (xs, ys) = covered_pixels(self.rect(), canvas);
        for y in ys {
            for x in xs.clone() {
                if self.contains(pixel_center(x, y)) {
                    blend_pixel(canvas, x as i64, y as i64, self.fill, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_kinds() {
        assert_eq!("circle".parse::<ShapeKind>().unwrap(), ShapeKind::Circle);
        assert_eq!("Rectangle".parse::<ShapeKind>().unwrap(), ShapeKind::Rectangle);
        assert_eq!(" triangle ".parse::<ShapeKind>().unwrap(), ShapeKind::Triangle);
    }

    #[test]
    fn test_parse_unknown_kind_is_error() {
        let err = "hexagon".parse::<ShapeKind>().unwrap_err();
        assert!(matches!(err, EditorError::InvalidShapeKind(ref name) if name == "hexagon"));
    }

    #[test]
    fn test_circle_hit_test_excludes_corners() {
        let circle = ShapeElement::circle(Pos2::new(100.0, 100.0), 50.0, Color32::RED);
        assert_eq!(circle.radius(), Some(50.0));
        assert!(circle.hit_test(Pos2::new(150.0, 150.0)));
        assert!(!circle.hit_test(Pos2::new(101.0, 101.0)));
    }

    #[test]
    fn test_triangle_rasterizes_apex_up() {
        let triangle = ShapeElement::triangle(Pos2::ZERO, Vec2::new(20.0, 20.0), Color32::BLACK);
        let mut canvas = RgbaImage::new(20, 20);
        triangle.rasterize(&mut canvas);
        assert_eq!(canvas.get_pixel(10, 1).0[3], 255);
        assert_eq!(canvas.get_pixel(1, 1).0[3], 0);
        assert_eq!(canvas.get_pixel(1, 19).0[3], 255);
    }
}
