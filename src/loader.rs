//! Asynchronous fetch + decode of the editor's source image.
//!
//! Each load carries the epoch the surface stamped on it. The surface applies a
//! finished load only if that epoch is still current; anything older is
//! dropped on arrival. Loads are never cancelled, only ignored.

use futures::channel::mpsc::UnboundedSender;
use image::RgbaImage;
use log::{debug, info};

use crate::error::{EditorError, EditorResult};
use crate::net;

/// A finished load, as delivered back to the surface.
#[derive(Debug)]
pub struct LoadOutcome {
    pub epoch: u64,
    pub url: String,
    pub result: EditorResult<RgbaImage>,
}

/// One in-flight load. Whoever holds it finishes it with `complete`.
#[derive(Debug)]
pub struct LoadJob {
    epoch: u64,
    url: String,
    sender: UnboundedSender<LoadOutcome>,
}

impl LoadJob {
    pub(crate) fn new(epoch: u64, url: String, sender: UnboundedSender<LoadOutcome>) -> Self {
        Self { epoch, url, sender }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Decode `bytes` (on the calling thread) and hand the outcome to the surface.
    ///
    /// Returns `false` if the surface that started the load is gone.
    pub fn complete(self, bytes: Result<Vec<u8>, String>) -> bool {
        let result = match bytes {
            Ok(bytes) => decode(&self.url, &bytes),
            Err(reason) => Err(EditorError::ImageFetch {
                url: self.url.clone(),
                reason,
            }),
        };
        let outcome = LoadOutcome {
            epoch: self.epoch,
            url: self.url,
            result,
        };
        match self.sender.unbounded_send(outcome) {
            Ok(()) => true,
            Err(err) => {
                let outcome = err.into_inner();
                debug!(
                    "Discarding load of {} (epoch {}): surface torn down",
                    outcome.url, outcome.epoch
                );
                false
            }
        }
    }
}

pub fn decode(url: &str, bytes: &[u8]) -> EditorResult<RgbaImage> {
    let decoded = image::load_from_memory(bytes).map_err(|source| EditorError::ImageDecode {
        url: url.to_owned(),
        source,
    })?;
    info!("Decoded {} ({}x{})", url, decoded.width(), decoded.height());
    Ok(decoded.to_rgba8())
}

/// Source of image bytes for a surface.
pub trait ImageFetcher: Send + Sync {
    /// Start fetching `job.url()`; call `job.complete` whenever the bytes arrive.
    fn fetch(&self, job: LoadJob);
}

/// Fetches `http(s)://` URLs over the network. Native builds also accept
/// `file://` URLs and plain filesystem paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkFetcher;

impl ImageFetcher for NetworkFetcher {
    fn fetch(&self, job: LoadJob) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(path) = local_path(job.url()).map(str::to_owned) {
                net::spawn_or_fail(
                    "image-read",
                    job,
                    move |job| {
                        let bytes = std::fs::read(&path).map_err(|e| e.to_string());
                        job.complete(bytes);
                    },
                    |job, reason| {
                        job.complete(Err(reason));
                    },
                );
                return;
            }
        }

        let request = net::Request::get(job.url());
        net::fetch(
            request,
            Box::new(move |response| {
                let bytes = response.and_then(|response| {
                    if response.is_success() {
                        Ok(response.bytes)
                    } else {
                        Err(format!("HTTP status {}", response.status))
                    }
                });
                job.complete(bytes);
            }),
        );
    }
}

/// Filesystem path for `file://` URLs and anything without a URL scheme.
pub fn local_path(url: &str) -> Option<&str> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(path);
    }
    if url.contains("://") || url.starts_with("data:") {
        return None;
    }
    Some(url)
}
