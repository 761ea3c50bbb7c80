//! The Scene Model: ordered drawable objects, selection, and the layer
//! summary derived from them.
//!
//! Every structural mutation recomputes the summary before it returns and then
//! notifies observers, so a caller never sees the two out of step.

use egui::{Color32, Pos2, Vec2};
use log::debug;

use crate::element::{Element, ElementType, SceneObject};
use crate::event::{EventBus, EventHandler, SceneEvent, SurfaceEvent};
use crate::id_generator::{ElementId, IdGenerator};
use crate::layer::LayerSummary;

#[derive(Debug)]
pub struct Scene {
    objects: Vec<SceneObject>,
    selected: Option<ElementId>,
    ids: IdGenerator,
    background: Color32,
    size: Vec2,
    version: u64,
    summary: LayerSummary,
    events: EventBus,
}

impl Scene {
    /// An empty scene. Size and background are fixed for its lifetime.
    pub fn new(size: Vec2, background: Color32) -> Self {
        Self {
            objects: Vec::new(),
            selected: None,
            ids: IdGenerator::default(),
            background,
            size,
            version: 0,
            summary: LayerSummary::default(),
            events: EventBus::new(),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    /// Bumped on every structural mutation; selection changes leave it alone
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Topmost object is the last one painted
    pub fn topmost(&self) -> Option<&SceneObject> {
        self.objects.last()
    }

    pub fn layer_summary(&self) -> &LayerSummary {
        &self.summary
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    /// Append `element` on top, give it the next identity and select it.
    pub fn add_object(&mut self, element: ElementType) -> ElementId {
        let id = self.ids.next_id();
        debug!("Adding {} #{}", element.element_type(), id);
        self.objects.push(SceneObject { id, element });
        self.selected = Some(id);
        self.structural_change(SceneEvent::ObjectAdded { id });
        self.events
            .emit(SurfaceEvent::Scene(SceneEvent::SelectionChanged { selected: Some(id) }));
        id
    }

    /// Remove `id` if present. Absent ids are a no-op, not an error.
    pub fn remove_object(&mut self, id: ElementId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|object| object.id == id)?;
        let removed = self.objects.remove(index);
        let was_selected = self.selected == Some(id);
        if was_selected {
            self.selected = None;
        }
        debug!("Removed {} #{}", removed.element.element_type(), id);
        self.structural_change(SceneEvent::ObjectRemoved { id });
        if was_selected {
            self.events
                .emit(SurfaceEvent::Scene(SceneEvent::SelectionChanged { selected: None }));
        }
        Some(removed)
    }

    pub fn remove_selected(&mut self) -> Option<SceneObject> {
        let id = self.selected?;
        self.remove_object(id)
    }

    /// Sets or clears the selection. Ids not in the scene are refused.
    pub fn set_selection(&mut self, id: Option<ElementId>) -> bool {
        if let Some(id) = id {
            if !self.contains(id) {
                return false;
            }
        }
        if self.selected != id {
            self.selected = id;
            self.events
                .emit(SurfaceEvent::Scene(SceneEvent::SelectionChanged { selected: id }));
        }
        true
    }

    /// Drop every object. Identities keep counting from where they were.
    pub fn clear(&mut self) {
        if self.objects.is_empty() && self.selected.is_none() {
            return;
        }
        self.objects.clear();
        self.selected = None;
        self.structural_change(SceneEvent::Cleared);
    }

    /// Topmost object under `pos`
    pub fn hit_test(&self, pos: Pos2) -> Option<ElementId> {
        self.objects
            .iter()
            .rev()
            .find(|object| object.element.hit_test(pos))
            .map(|object| object.id)
    }

    pub fn translate_object(&mut self, id: ElementId, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        let Some(object) = self.objects.iter_mut().find(|object| object.id == id) else {
            return false;
        };
        object.element.translate(delta);
        self.structural_change(SceneEvent::ObjectChanged { id });
        true
    }

    /// Replace the content of an editable text object
    pub fn set_text_content(&mut self, id: ElementId, content: &str) -> bool {
        let Some(text) = self
            .objects
            .iter_mut()
            .find(|object| object.id == id)
            .and_then(|object| object.element.as_text_mut())
        else {
            return false;
        };
        if !text.is_editable_in_place() || text.content() == content {
            return false;
        }
        text.set_content(content);
        self.structural_change(SceneEvent::ObjectChanged { id });
        true
    }

    pub fn next_id(&self) -> ElementId {
        self.ids.peek()
    }

    fn structural_change(&mut self, event: SceneEvent) {
        self.version += 1;
        self.summary = LayerSummary::from_objects(&self.objects);
        self.events.emit(SurfaceEvent::Scene(event));
    }
}
