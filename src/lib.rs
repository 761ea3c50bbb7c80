#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod id_generator;
pub mod input;
pub mod layer;
pub mod loader;
pub mod net;
pub mod panels;
pub mod renderer;
pub mod scene;
pub mod search;
pub mod state;
pub mod surface;
pub mod texture_manager;

pub use app::{AnnotateApp, Route};
pub use config::{AppConfig, CanvasConfig, SearchConfig};
pub use element::{ElementType, SceneObject, ShapeKind};
pub use error::{EditorError, EditorResult};
pub use event::{SceneEvent, SurfaceEvent};
pub use id_generator::ElementId;
pub use input::CanvasInput;
pub use layer::{LayerEntry, LayerSummary};
pub use loader::{ImageFetcher, LoadJob, LoadOutcome, NetworkFetcher};
pub use scene::Scene;
pub use search::{Photo, PhotoSearch, SearchError, SearchView, UnsplashClient};
pub use state::{EditorController, EditorPhase, SourceStore};
pub use surface::CanvasSurface;
