//! Minimal HTTP GET shared by the image loader and the search client.
//!
//! Native builds run a blocking request on a worker thread; wasm builds spawn a
//! future on the browser's event loop. Either way the callback runs off the UI
//! frame and must only hand its result over a channel.

#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;

use log::debug;
#[cfg(not(target_arch = "wasm32"))]
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub bytes: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub type FetchCallback = Box<dyn FnOnce(Result<Response, String>) + Send + 'static>;

#[cfg(not(target_arch = "wasm32"))]
pub fn fetch(request: Request, on_done: FetchCallback) {
    debug!("GET {}", request.url);
    spawn_or_fail(
        "http-fetch",
        on_done,
        move |on_done| on_done(fetch_blocking(&request)),
        |on_done, reason| on_done(Err(reason)),
    );
}

/// Run `work(payload)` on a named worker thread.
///
/// If the thread cannot be started, `fail` gets the payload back on the
/// calling thread, so whoever waits on it is still answered.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn spawn_or_fail<T: Send + 'static>(
    name: &str,
    payload: T,
    work: impl FnOnce(T) + Send + 'static,
    fail: impl FnOnce(T, String),
) {
    run_or_fail(
        payload,
        |task| {
            std::thread::Builder::new()
                .name(name.to_owned())
                .spawn(task)
                .map(drop)
        },
        work,
        fail,
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn run_or_fail<T: Send + 'static>(
    payload: T,
    spawn: impl FnOnce(Box<dyn FnOnce() + Send>) -> std::io::Result<()>,
    work: impl FnOnce(T) + Send + 'static,
    fail: impl FnOnce(T, String),
) {
    let slot = Arc::new(Mutex::new(Some(payload)));
    let worker_slot = Arc::clone(&slot);
    let spawned = spawn(Box::new(move || {
        let payload = worker_slot.lock().take();
        if let Some(payload) = payload {
            work(payload);
        }
    }));
    if let Err(err) = spawned {
        log::error!("Failed to spawn worker thread: {err}");
        let payload = slot.lock().take();
        if let Some(payload) = payload {
            fail(payload, err.to_string());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn fetch_blocking(request: &Request) -> Result<Response, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| e.to_string())?;
    let mut builder = client.get(&request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let response = builder.send().map_err(|e| e.to_string())?;
    let status = response.status().as_u16();
    let bytes = response.bytes().map_err(|e| e.to_string())?.to_vec();
    Ok(Response { status, bytes })
}

#[cfg(target_arch = "wasm32")]
pub fn fetch(request: Request, on_done: FetchCallback) {
    debug!("GET {}", request.url);
    wasm_bindgen_futures::spawn_local(async move {
        on_done(fetch_async(&request).await);
    });
}

#[cfg(target_arch = "wasm32")]
async fn fetch_async(request: &Request) -> Result<Response, String> {
    let client = reqwest::Client::new();
    let mut builder = client.get(&request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let response = builder.send().await.map_err(|e| e.to_string())?;
    let status = response.status().as_u16();
    let bytes = response.bytes().await.map_err(|e| e.to_string())?.to_vec();
    Ok(Response { status, bytes })
}
