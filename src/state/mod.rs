mod controller;
mod editor_state;
mod persistence;

pub use controller::EditorController;
pub use editor_state::EditorPhase;
pub use persistence::{SELECTED_IMAGE_KEY, SourceStore};
