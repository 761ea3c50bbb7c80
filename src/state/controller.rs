//! Per-session orchestration: binds one image source to one canvas surface and
//! exposes the toolbar actions.
//!
//! The controller owns at most one `CanvasSurface`. Changing the source tears
//! the old surface down completely before a new one is mounted, so event
//! bindings and initial images never pile up across re-runs.

use std::sync::Arc;

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use super::{EditorPhase, SourceStore};
use crate::app::Route;
use crate::config::CanvasConfig;
use crate::element::ShapeKind;
use crate::error::{EditorError, EditorResult};
use crate::event::SurfaceEvent;
use crate::id_generator::ElementId;
use crate::loader::ImageFetcher;
use crate::surface::CanvasSurface;

/// Errors that can occur during phase transitions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateTransitionError {
    #[error("Cannot move editor from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

pub struct EditorController {
    config: CanvasConfig,
    fetcher: Arc<dyn ImageFetcher>,
    store: SourceStore,
    surface: Option<CanvasSurface>,
    source: Option<String>,
    phase: EditorPhase,
    session: Option<Uuid>,
    /// Last load failure reported by the surface, waiting to be shown
    load_error: Arc<Mutex<Option<String>>>,
}

impl std::fmt::Debug for EditorController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorController")
            .field("phase", &self.phase)
            .field("source", &self.source)
            .field("session", &self.session)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

impl EditorController {
    pub fn new(config: CanvasConfig, fetcher: Arc<dyn ImageFetcher>, store: SourceStore) -> Self {
        Self {
            config,
            fetcher,
            store,
            surface: None,
            source: None,
            phase: EditorPhase::Uninitialized,
            session: None,
            load_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session
    }

    /// The source the current surface was mounted for
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn surface(&self) -> Option<&CanvasSurface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut CanvasSurface> {
        self.surface.as_mut()
    }

    pub fn store(&self) -> &SourceStore {
        &self.store
    }

    fn transition_to(&mut self, next: EditorPhase) -> Result<(), StateTransitionError> {
        if !self.phase.can_transition_to(&next) {
            return Err(StateTransitionError::InvalidTransition {
                from: self.phase.label(),
                to: next.label(),
            });
        }
        debug!("Editor phase {} -> {}", self.phase.label(), next.label());
        self.phase = next;
        Ok(())
    }

    /// Resolve the image source and mount a surface for it.
    ///
    /// `nav_source` is the URL handed over by navigation; without one the
    /// persisted selection is used. Nothing happens if the resolved source is
    /// the one already mounted. Returns whether a new session was started.
    pub fn open(&mut self, nav_source: Option<&str>) -> bool {
        let resolved = nav_source.map(str::to_owned).or_else(|| self.store.get());
        if self.surface.is_some() && resolved == self.source {
            return false;
        }

        self.unmount();

        let session = Uuid::new_v4();
        info!(
            "Editor session {session} opening {}",
            resolved.as_deref().unwrap_or("<no source>")
        );

        let surface = CanvasSurface::new(self.config.clone(), Arc::clone(&self.fetcher));
        let load_error = Arc::clone(&self.load_error);
        surface.subscribe(Box::new(move |event: &SurfaceEvent| {
            if let SurfaceEvent::ImageLoadFailed { url, reason } = event {
                *load_error.lock() = Some(format!("Could not load {url}: {reason}"));
            }
        }));
        self.surface = Some(surface);
        self.source = resolved.clone();
        self.session = Some(session);

        if let Some(url) = &resolved {
            self.store.set(url.clone());
        }

        let next = match self.start_load(resolved.as_deref()) {
            Ok(epoch) if resolved.is_some() => EditorPhase::Loading { epoch },
            Ok(_) => EditorPhase::Ready,
            Err(err) => {
                error!("Session {session} could not start loading: {err}");
                EditorPhase::Ready
            }
        };
        if let Err(err) = self.transition_to(next) {
            error!("{err}");
        }
        true
    }

    fn start_load(&mut self, url: Option<&str>) -> EditorResult<u64> {
        self.surface
            .as_mut()
            .ok_or(EditorError::SurfaceTornDown)?
            .load_image(url)
    }

    /// Apply finished loads. Call once per frame.
    pub fn poll(&mut self) -> usize {
        let Some(surface) = self.surface.as_mut() else {
            return 0;
        };
        let applied = surface.poll_loads();
        if self.phase.is_loading() && !surface.is_loading() {
            if let Err(err) = self.transition_to(EditorPhase::Ready) {
                error!("{err}");
            }
        }
        applied
    }

    /// Take the pending load failure message, if any
    pub fn take_load_error(&self) -> Option<String> {
        self.load_error.lock().take()
    }

    fn surface_for_action(&mut self) -> EditorResult<&mut CanvasSurface> {
        self.surface.as_mut().ok_or(EditorError::SurfaceTornDown)
    }

    pub fn add_text(&mut self) -> EditorResult<ElementId> {
        self.surface_for_action()?.add_text()
    }

    pub fn add_shape(&mut self, kind: ShapeKind) -> EditorResult<ElementId> {
        self.surface_for_action()?.add_shape(kind)
    }

    pub fn add_shape_named(&mut self, name: &str) -> EditorResult<ElementId> {
        self.surface_for_action()?.add_shape_named(name)
    }

    pub fn remove_selected(&mut self) -> EditorResult<Option<ElementId>> {
        self.surface_for_action()?.remove_selected()
    }

    pub fn export_png(&mut self) -> EditorResult<Vec<u8>> {
        self.surface_for_action()?.export_png()
    }

    /// End the session: tear down, forget the persisted selection, go back to search
    pub fn close(&mut self) -> Route {
        if let Some(session) = self.session {
            info!("Closing editor session {session}");
        } else {
            warn!("Closing an editor that was never opened");
        }
        self.unmount();
        self.store.clear();
        Route::Search
    }

    fn unmount(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.teardown();
        }
        self.source = None;
        self.session = None;
        self.load_error.lock().take();
        if self.phase.is_mounted() {
            if let Err(err) = self.transition_to(EditorPhase::Uninitialized) {
                error!("{err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadJob;

    #[derive(Default)]
    struct HeldFetcher {
        jobs: Mutex<Vec<LoadJob>>,
    }

    impl ImageFetcher for HeldFetcher {
        fn fetch(&self, job: LoadJob) {
            self.jobs.lock().push(job);
        }
    }

    fn controller() -> (EditorController, Arc<HeldFetcher>, SourceStore) {
        let fetcher = Arc::new(HeldFetcher::default());
        let store = SourceStore::new();
        let controller = EditorController::new(CanvasConfig::default(), fetcher.clone(), store.clone());
        (controller, fetcher, store)
    }

    #[test]
    fn test_falls_back_to_persisted_source() {
        let (mut controller, fetcher, store) = controller();
        store.set("mem://persisted");
        assert!(controller.open(None));
        assert_eq!(controller.source(), Some("mem://persisted"));
        assert!(controller.phase().is_loading());
        assert_eq!(fetcher.jobs.lock()[0].url(), "mem://persisted");
    }

    #[test]
    fn test_same_source_does_not_remount() {
        let (mut controller, fetcher, _) = controller();
        assert!(controller.open(Some("mem://a")));
        let session = controller.session_id();
        assert!(!controller.open(Some("mem://a")));
        assert_eq!(controller.session_id(), session);
        assert_eq!(fetcher.jobs.lock().len(), 1);

        assert!(controller.open(Some("mem://b")));
        assert_ne!(controller.session_id(), session);
    }

    #[test]
    fn test_no_source_goes_straight_to_ready() {
        let (mut controller, fetcher, _) = controller();
        assert!(controller.open(None));
        assert_eq!(controller.phase(), EditorPhase::Ready);
        assert!(fetcher.jobs.lock().is_empty());
        assert!(controller.surface().unwrap().scene().is_empty());
    }

    #[test]
    fn test_failed_load_settles_ready_with_message() {
        let (mut controller, fetcher, _) = controller();
        controller.open(Some("mem://missing"));
        fetcher.jobs.lock().pop().unwrap().complete(Err("HTTP status 404".to_owned()));

        assert_eq!(controller.poll(), 0);
        assert_eq!(controller.phase(), EditorPhase::Ready);
        assert!(controller.take_load_error().unwrap().contains("mem://missing"));
        assert_eq!(controller.take_load_error(), None);
    }

    #[test]
    fn test_close_clears_store_and_returns_to_search() {
        let (mut controller, _, store) = controller();
        controller.open(Some("mem://a"));
        assert_eq!(store.get().as_deref(), Some("mem://a"));

        assert_eq!(controller.close(), Route::Search);
        assert_eq!(controller.phase(), EditorPhase::Uninitialized);
        assert!(controller.surface().is_none());
        assert_eq!(store.get(), None);
        assert!(matches!(controller.add_text(), Err(EditorError::SurfaceTornDown)));
    }
}
