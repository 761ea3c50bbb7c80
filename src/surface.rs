//! The Canvas Surface: owns one Scene for the lifetime of an editing session,
//! applies gestures to it, keeps the raster in step with it, and receives the
//! decoded source image.
//!
//! Only the most recent `load_image` can land. A completion is applied only when
//! its epoch is still current and the surface has not been torn down.

use std::sync::Arc;

use egui::Vec2;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use image::RgbaImage;
use log::{debug, error, info, warn};

use crate::config::CanvasConfig;
use crate::element::{ShapeKind, factory};
use crate::error::{EditorError, EditorResult};
use crate::event::{EventHandler, SurfaceEvent};
use crate::id_generator::{ElementId, next_load_epoch};
use crate::input::CanvasInput;
use crate::loader::{ImageFetcher, LoadJob, LoadOutcome};
use crate::renderer;
use crate::scene::Scene;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingLoad {
    epoch: u64,
    url: String,
}

pub struct CanvasSurface {
    config: CanvasConfig,
    scene: Scene,
    fetcher: Arc<dyn ImageFetcher>,
    current_epoch: u64,
    pending: Option<PendingLoad>,
    sender: Option<UnboundedSender<LoadOutcome>>,
    receiver: Option<UnboundedReceiver<LoadOutcome>>,
    raster: Option<(u64, Arc<RgbaImage>)>,
    dragging: bool,
    editing_text: Option<ElementId>,
    torn_down: bool,
}

impl std::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("scene", &self.scene)
            .field("current_epoch", &self.current_epoch)
            .field("pending", &self.pending)
            .field("editing_text", &self.editing_text)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl CanvasSurface {
    pub fn new(config: CanvasConfig, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let (sender, receiver) = mpsc::unbounded();
        let scene = Scene::new(config.size, config.background);
        info!("Canvas surface mounted ({}x{})", config.size.x, config.size.y);
        Self {
            config,
            scene,
            fetcher,
            current_epoch: 0,
            pending: None,
            sender: Some(sender),
            receiver: Some(receiver),
            raster: None,
            dragging: false,
            editing_text: None,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// A load has been started and its completion has not been applied yet
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn current_epoch(&self) -> u64 {
        self.current_epoch
    }

    /// Id of the text object being edited in place, if any
    pub fn editing_text(&self) -> Option<ElementId> {
        self.editing_text
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.scene.subscribe(handler);
    }

    fn ensure_live(&self) -> EditorResult<()> {
        if self.torn_down {
            Err(EditorError::SurfaceTornDown)
        } else {
            Ok(())
        }
    }

    /// Clear the canvas and start loading `url`.
    ///
    /// Every call takes a fresh epoch, so whatever was in flight before can no
    /// longer land. `None` leaves the canvas empty.
    pub fn load_image(&mut self, url: Option<&str>) -> EditorResult<u64> {
        self.ensure_live()?;
        self.editing_text = None;
        self.dragging = false;
        self.scene.clear();
        self.refresh_raster();

        let epoch = next_load_epoch();
        if let Some(previous) = self.pending.take() {
            debug!("Load of {} (epoch {}) superseded by epoch {}", previous.url, previous.epoch, epoch);
        }
        self.current_epoch = epoch;

        let (Some(url), Some(sender)) = (url, self.sender.as_ref()) else {
            debug!("No source image; canvas left empty (epoch {epoch})");
            return Ok(epoch);
        };

        info!("Loading source image {url} (epoch {epoch})");
        self.pending = Some(PendingLoad {
            epoch,
            url: url.to_owned(),
        });
        let job = LoadJob::new(epoch, url.to_owned(), sender.clone());
        self.scene.events().emit(SurfaceEvent::ImageLoadStarted {
            url: url.to_owned(),
            epoch,
        });
        self.fetcher.fetch(job);
        Ok(epoch)
    }

    /// Apply every completed load waiting in the channel. Call once per frame.
    ///
    /// Returns how many completions were applied to the scene.
    pub fn poll_loads(&mut self) -> usize {
        let mut applied = 0;
        while let Some(outcome) = self.next_outcome() {
            if self.apply_load(outcome) {
                applied += 1;
            }
        }
        applied
    }

    fn next_outcome(&mut self) -> Option<LoadOutcome> {
        let receiver = self.receiver.as_mut()?;
        // Err means empty; Ok(None) means every sender is gone
        receiver.try_next().ok().flatten()
    }

    /// Apply one finished load. Stale epochs and torn down surfaces drop it.
    pub fn apply_load(&mut self, outcome: LoadOutcome) -> bool {
        if self.torn_down {
            debug!("Dropping load of {}: surface torn down", outcome.url);
            return false;
        }
        if outcome.epoch != self.current_epoch {
            debug!(
                "Dropping stale load of {} (epoch {}, current {})",
                outcome.url, outcome.epoch, self.current_epoch
            );
            return false;
        }
        self.pending = None;

        let fitted = outcome
            .result
            .and_then(|decoded| factory::fitted_image(&outcome.url, &decoded, &self.config));
        match fitted {
            Ok(element) => {
                let id = self.scene.add_object(element);
                self.refresh_raster();
                info!("Source image {} placed as #{}", outcome.url, id);
                self.scene.events().emit(SurfaceEvent::ImageLoaded {
                    url: outcome.url,
                    epoch: outcome.epoch,
                });
                true
            }
            Err(err) => {
                error!("Failed to load source image: {err}");
                self.scene.events().emit(SurfaceEvent::ImageLoadFailed {
                    url: outcome.url,
                    reason: err.to_string(),
                });
                false
            }
        }
    }

    /// Place the default "Type Here" text object and select it
    pub fn add_text(&mut self) -> EditorResult<ElementId> {
        self.ensure_live()?;
        let id = self.scene.add_object(factory::default_text(&self.config));
        self.refresh_raster();
        Ok(id)
    }

    pub fn add_shape(&mut self, kind: ShapeKind) -> EditorResult<ElementId> {
        self.ensure_live()?;
        let id = self.scene.add_object(factory::default_shape(kind, &self.config));
        self.refresh_raster();
        Ok(id)
    }

    /// Like `add_shape`, for a shape named by string. Unknown names change nothing.
    pub fn add_shape_named(&mut self, name: &str) -> EditorResult<ElementId> {
        let kind = name.parse::<ShapeKind>().inspect_err(|err| {
            warn!("Ignoring shape request: {err}");
        })?;
        self.add_shape(kind)
    }

    /// Remove the selected object. Nothing selected is a no-op.
    pub fn remove_selected(&mut self) -> EditorResult<Option<ElementId>> {
        self.ensure_live()?;
        let Some(removed) = self.scene.remove_selected() else {
            return Ok(None);
        };
        if self.editing_text == Some(removed.id) {
            self.editing_text = None;
        }
        self.refresh_raster();
        Ok(Some(removed.id))
    }

    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        !self.torn_down && self.scene.set_selection(id)
    }

    /// Apply one gesture. Returns true when the scene or selection changed.
    pub fn handle_input(&mut self, input: CanvasInput) -> bool {
        if self.torn_down {
            return false;
        }
        match input {
            CanvasInput::PointerDown(pos) => {
                let hit = self.scene.hit_test(pos);
                if self.editing_text.is_some() && self.editing_text != hit {
                    self.finish_text_edit();
                }
                self.dragging = hit.is_some();
                let before = self.scene.selected();
                self.scene.set_selection(hit);
                before != hit
            }
            CanvasInput::Drag(delta) => {
                if !self.dragging || delta == Vec2::ZERO {
                    return false;
                }
                let Some(id) = self.scene.selected() else {
                    return false;
                };
                let moved = self.scene.translate_object(id, delta);
                if moved {
                    self.refresh_raster();
                }
                moved
            }
            CanvasInput::PointerUp => {
                self.dragging = false;
                false
            }
            CanvasInput::DoubleClick(pos) => {
                let Some(id) = self.scene.hit_test(pos) else {
                    return false;
                };
                let editable = self
                    .scene
                    .get(id)
                    .and_then(|object| object.element.as_text())
                    .is_some_and(|text| text.is_editable_in_place());
                self.scene.set_selection(Some(id));
                if editable {
                    debug!("Editing text #{id} in place");
                    self.editing_text = Some(id);
                }
                editable
            }
            CanvasInput::DeleteSelected => {
                if self.editing_text.is_some() {
                    return false;
                }
                matches!(self.remove_selected(), Ok(Some(_)))
            }
        }
    }

    /// Replace the content of the text object being edited in place
    pub fn edit_text(&mut self, content: &str) -> bool {
        let Some(id) = self.editing_text else {
            return false;
        };
        let changed = self.scene.set_text_content(id, content);
        if changed {
            self.refresh_raster();
        }
        changed
    }

    pub fn finish_text_edit(&mut self) {
        if let Some(id) = self.editing_text.take() {
            debug!("Finished editing text #{id}");
        }
    }

    /// Current raster of the scene, re-rendered only when the scene changed
    pub fn render(&mut self) -> Arc<RgbaImage> {
        let version = self.scene.version();
        if let Some((cached, raster)) = &self.raster {
            if *cached == version {
                return Arc::clone(raster);
            }
        }
        let raster = Arc::new(renderer::render_scene(&self.scene));
        self.raster = Some((version, Arc::clone(&raster)));
        raster
    }

    fn refresh_raster(&mut self) {
        self.render();
    }

    /// PNG of exactly what the canvas shows, minus selection chrome
    pub fn export_png(&mut self) -> EditorResult<Vec<u8>> {
        self.ensure_live()?;
        let raster = self.render();
        let bytes = renderer::encode_png(&raster)?;
        info!(
            "Exported {}x{} canvas ({} bytes)",
            raster.width(),
            raster.height(),
            bytes.len()
        );
        self.scene.events().emit(SurfaceEvent::Exported { bytes: bytes.len() });
        Ok(bytes)
    }

    /// Release the raster and close the load channel. Idempotent.
    ///
    /// Loads still in flight find the channel closed and are discarded.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.current_epoch = next_load_epoch();
        if let Some(pending) = self.pending.take() {
            debug!("Abandoning load of {} (epoch {})", pending.url, pending.epoch);
        }
        self.receiver = None;
        self.sender = None;
        self.raster = None;
        self.dragging = false;
        self.editing_text = None;
        self.scene.events().emit(SurfaceEvent::TornDown);
        self.scene.events().clear();
        info!("Canvas surface torn down");
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        self.teardown();
    }
}
