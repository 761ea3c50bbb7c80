use crate::id_generator::ElementId;

/// Structural and selection changes of a Scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ObjectAdded { id: ElementId },
    ObjectRemoved { id: ElementId },
    /// Position or content of an existing object changed
    ObjectChanged { id: ElementId },
    Cleared,
    SelectionChanged { selected: Option<ElementId> },
}

/// Everything a Canvas Surface reports to its observers.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Scene(SceneEvent),
    ImageLoadStarted { url: String, epoch: u64 },
    ImageLoaded { url: String, epoch: u64 },
    ImageLoadFailed { url: String, reason: String },
    Exported { bytes: usize },
    TornDown,
}
