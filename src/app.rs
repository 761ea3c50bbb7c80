use std::sync::Arc;

use log::{error, info, warn};

use crate::config::AppConfig;
use crate::loader::{ImageFetcher, NetworkFetcher};
use crate::panels;
use crate::search::{PhotoSearch, SearchError, SearchView, UnsplashClient};
use crate::state::{EditorController, SourceStore};
use crate::texture_manager::TextureManager;

/// The two screens of the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Search,
    /// `source` is the URL handed over by the search screen. `None` means
    /// "use whatever was persisted".
    Editor { source: Option<String> },
}

pub struct AnnotateApp {
    config: AppConfig,
    route: Route,
    store: SourceStore,
    search: SearchView,
    editor: EditorController,
    textures: TextureManager,
    /// One-line feedback shown in the status bar
    status: Option<String>,
}

impl AnnotateApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let config = AppConfig::from_env();
        let store = cc
            .storage
            .map(SourceStore::load_from)
            .unwrap_or_default();
        let search = Arc::new(UnsplashClient::new(&config.search));
        let search_configured = search.has_credential();
        let mut app = Self::with_backends(config, store, search, Arc::new(NetworkFetcher));
        if !search_configured {
            let hint = SearchError::MissingCredential.to_string();
            warn!("{hint}");
            app.set_status(hint);
        }
        app
    }

    /// Build the app around explicit backends. A persisted selection reopens
    /// the editor straight away.
    pub fn with_backends(
        config: AppConfig,
        store: SourceStore,
        search: Arc<dyn PhotoSearch>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        let search = SearchView::new(search, config.search.page_size);
        let editor = EditorController::new(config.canvas.clone(), fetcher, store.clone());
        let resume = store.get().is_some();
        let mut app = Self {
            config,
            route: Route::Search,
            store,
            search,
            editor,
            textures: TextureManager::default(),
            status: None,
        };
        if resume {
            app.navigate(Route::Editor { source: None });
        }
        app
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn store(&self) -> &SourceStore {
        &self.store
    }

    pub fn search(&self) -> &SearchView {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut SearchView {
        &mut self.search
    }

    pub fn editor(&self) -> &EditorController {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorController {
        &mut self.editor
    }

    pub(crate) fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    /// Texture cache key of the current editor session
    pub(crate) fn canvas_key(&self) -> Option<u64> {
        self.editor.session_id().map(|session| session.as_u64_pair().0)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn navigate(&mut self, route: Route) {
        info!("Route {:?} -> {:?}", self.route, route);
        let previous_canvas = self.canvas_key();
        match &route {
            Route::Search => {
                if matches!(self.route, Route::Editor { .. }) {
                    self.editor.close();
                }
            }
            Route::Editor { source } => {
                self.editor.open(source.as_deref());
            }
        }
        if let Some(key) = previous_canvas.filter(|key| Some(*key) != self.canvas_key()) {
            self.textures.invalidate_canvas(key);
        }
        self.status = None;
        self.route = route;
    }

    /// Choose search result `index` and open it in the editor
    pub fn select_photo(&mut self, index: usize) -> bool {
        let Some(url) = self.search.select(index) else {
            return false;
        };
        self.store.set(url.clone());
        self.navigate(Route::Editor { source: Some(url) });
        true
    }

    pub fn close_editor(&mut self) {
        self.navigate(Route::Search);
    }

    /// Drain finished background work. Called at the top of every frame.
    pub fn tick(&mut self) {
        self.search.poll();
        self.editor.poll();
        if let Some(message) = self.editor.take_load_error() {
            self.status = Some(message);
        }
    }

    /// Export the canvas and offer it as a download under the fixed file name
    pub fn export(&mut self) {
        let file_name = self.config.canvas.export_file_name.clone();
        let result = self
            .editor
            .export_png()
            .map_err(|err| err.to_string())
            .and_then(|bytes| offer_download(&bytes, &file_name));
        match result {
            Ok(()) => self.status = Some(format!("Saved {file_name}")),
            Err(err) => {
                error!("Export failed: {err}");
                self.status = Some(format!("Export failed: {err}"));
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn offer_download(bytes: &[u8], file_name: &str) -> Result<(), String> {
    std::fs::write(file_name, bytes).map_err(|e| e.to_string())?;
    info!("Wrote {file_name} ({} bytes)", bytes.len());
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn offer_download(bytes: &[u8], file_name: &str) -> Result<(), String> {
    use wasm_bindgen::JsCast as _;

    let js_err = |e: wasm_bindgen::JsValue| format!("{e:?}");
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or("No document to download into")?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("image/png");
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_err)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let anchor = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "Could not create download link".to_owned())?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    web_sys::Url::revoke_object_url(&url).map_err(js_err)?;
    info!("Offered {file_name} for download ({} bytes)", bytes.len());
    Ok(())
}

impl eframe::App for AnnotateApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.store.save_to(storage);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tick();
        self.textures.begin_frame();

        panels::status_bar(self, ctx);
        if matches!(self.route, Route::Editor { .. }) {
            panels::tools_panel(self, ctx);
            panels::layers_panel(self, ctx);
            panels::central_panel(self, ctx);
        } else {
            panels::search_panel(self, ctx);
        }

        // keep polling while background work is outstanding
        let editor_busy = self.editor.phase().is_loading();
        if self.search.is_searching() || editor_busy {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }
}
