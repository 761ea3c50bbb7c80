use serde::Serialize;

use crate::element::{Element, ElementType, SceneObject, color_hex};
use crate::id_generator::ElementId;

/// One row of the layer panel.
///
/// Type-specific attributes are `None` for object types that don't have them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerEntry {
    /// 1-based position in paint order (1 = bottom)
    pub index: usize,
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x: f32,
    pub y: f32,
    /// Bounding box size; `None` when that side is empty
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub text: Option<String>,
    pub fill: Option<String>,
    pub font_size: Option<f32>,
    pub radius: Option<f32>,
}

impl LayerEntry {
    fn from_object(index: usize, object: &SceneObject) -> Self {
        let position = object.element.position();
        let size = object.element.rect().size();
        let mut entry = Self {
            index,
            id: object.id,
            kind: object.element.element_type(),
            x: position.x,
            y: position.y,
            width: (size.x > 0.0).then_some(size.x),
            height: (size.y > 0.0).then_some(size.y),
            text: None,
            fill: None,
            font_size: None,
            radius: None,
        };
        match &object.element {
            ElementType::Image(_) => {}
            ElementType::Text(text) => {
                entry.text = Some(text.content().to_owned());
                entry.fill = Some(color_hex(text.fill()));
                entry.font_size = Some(text.font_size());
            }
            ElementType::Shape(shape) => {
                entry.fill = Some(color_hex(shape.fill()));
                entry.radius = shape.radius();
            }
        }
        entry
    }
}

/// Read-only projection of a Scene's objects, in paint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerSummary {
    entries: Vec<LayerEntry>,
}

impl LayerSummary {
    pub fn from_objects(objects: &[SceneObject]) -> Self {
        Self {
            entries: objects
                .iter()
                .enumerate()
                .map(|(i, object)| LayerEntry::from_object(i + 1, object))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[LayerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&LayerEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use egui::{Color32, Pos2};

    use super::*;
    use crate::element::{ShapeElement, TextElement};

    fn objects() -> Vec<SceneObject> {
        vec![
            SceneObject {
                id: 4,
                element: ElementType::Shape(ShapeElement::circle(Pos2::new(1.0, 2.0), 5.0, Color32::RED)),
            },
            SceneObject {
                id: 7,
                element: ElementType::Text(TextElement::new("hi", Pos2::new(3.0, 4.0), 18.0, Color32::BLACK)),
            },
        ]
    }

    #[test]
    fn test_entries_follow_paint_order() {
        let summary = LayerSummary::from_objects(&objects());
        let indices: Vec<_> = summary.entries().iter().map(|e| (e.index, e.id)).collect();
        assert_eq!(indices, vec![(1, 4), (2, 7)]);
    }

    #[test]
    fn test_type_specific_attributes() {
        let summary = LayerSummary::from_objects(&objects());
        let circle = summary.get(4).unwrap();
        assert_eq!(circle.kind, "circle");
        assert_eq!(circle.radius, Some(5.0));
        assert_eq!((circle.width, circle.height), (Some(10.0), Some(10.0)));
        assert_eq!(circle.fill.as_deref(), Some("#ff0000"));
        assert_eq!(circle.text, None);
        assert_eq!(circle.font_size, None);

        let text = summary.get(7).unwrap();
        assert_eq!(text.text.as_deref(), Some("hi"));
        assert_eq!(text.font_size, Some(18.0));
        assert_eq!(text.radius, None);
        let measured = objects()[1].element.rect().size();
        assert_eq!((text.width, text.height), (Some(measured.x), Some(measured.y)));
        assert!(measured.x > 0.0);
    }

    #[test]
    fn test_json_uses_type_key() {
        let json = LayerSummary::from_objects(&objects()).to_json().unwrap();
        assert!(json.contains("\"type\": \"circle\""));
        assert!(json.contains("\"radius\": null"));
    }
}
