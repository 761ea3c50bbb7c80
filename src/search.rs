//! Remote photo search feeding the editor.
//!
//! The editor core only ever sees the chosen photo's full-size URL; everything
//! else in here exists to let the user pick one.

use std::sync::Arc;

use futures::channel::oneshot;
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::config::SearchConfig;
use crate::net;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Photo search is not configured: set UNSPLASH_ACCESS_KEY")]
    MissingCredential,
    #[error("Photo search request failed: {0}")]
    Transport(String),
    #[error("Photo search returned HTTP {0}")]
    Status(u16),
    #[error("Photo search returned an unexpected response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: String,
    pub thumb_url: String,
    pub full_url: String,
    pub description: Option<String>,
}

pub type SearchCallback = Box<dyn FnOnce(Result<Vec<Photo>, SearchError>) + Send + 'static>;

/// Anything that can answer a free-text photo query
pub trait PhotoSearch: Send + Sync {
    /// Start a search; `on_done` runs once, possibly on another thread
    fn search(&self, query: &str, per_page: usize, on_done: SearchCallback);
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<RawPhoto>,
}

#[derive(Deserialize)]
struct RawPhoto {
    id: String,
    description: Option<String>,
    alt_description: Option<String>,
    urls: RawUrls,
}

#[derive(Deserialize)]
struct RawUrls {
    small: Option<String>,
    thumb: Option<String>,
    full: String,
}

/// Parse the body of a `/search/photos` response
pub fn parse_search_response(body: &[u8]) -> Result<Vec<Photo>, SearchError> {
    let response: SearchResponse = serde_json::from_slice(body)?;
    Ok(response
        .results
        .into_iter()
        .map(|raw| Photo {
            id: raw.id,
            thumb_url: raw
                .urls
                .small
                .or(raw.urls.thumb)
                .unwrap_or_else(|| raw.urls.full.clone()),
            full_url: raw.urls.full,
            description: raw.description.or(raw.alt_description),
        })
        .collect())
}

/// Unsplash photo search over HTTPS
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    endpoint: String,
    access_key: Option<String>,
}

impl UnsplashClient {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
            access_key: config.access_key.clone(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.access_key.is_some()
    }

    pub fn request(&self, query: &str, per_page: usize) -> Result<net::Request, SearchError> {
        let access_key = self.access_key.as_deref().ok_or(SearchError::MissingCredential)?;
        let per_page = per_page.to_string();
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search/photos", self.endpoint),
            &[("query", query), ("per_page", per_page.as_str())],
        )
        .map_err(|e| SearchError::Transport(e.to_string()))?;
        Ok(net::Request::get(url.as_str())
            .with_header("Accept-Version", "v1")
            .with_header("Authorization", format!("Client-ID {access_key}")))
    }
}

impl PhotoSearch for UnsplashClient {
    fn search(&self, query: &str, per_page: usize, on_done: SearchCallback) {
        let request = match self.request(query, per_page) {
            Ok(request) => request,
            Err(err) => {
                on_done(Err(err));
                return;
            }
        };
        info!("Searching photos for {query:?}");
        net::fetch(
            request,
            Box::new(move |response| {
                let result = response
                    .map_err(SearchError::Transport)
                    .and_then(|response| {
                        if response.is_success() {
                            parse_search_response(&response.bytes)
                        } else {
                            Err(SearchError::Status(response.status))
                        }
                    });
                on_done(result);
            }),
        );
    }
}

/// State behind the search screen
pub struct SearchView {
    backend: Arc<dyn PhotoSearch>,
    page_size: usize,
    pub query: String,
    results: Vec<Photo>,
    error: Option<String>,
    in_flight: Option<oneshot::Receiver<Result<Vec<Photo>, SearchError>>>,
}

impl SearchView {
    pub fn new(backend: Arc<dyn PhotoSearch>, page_size: usize) -> Self {
        Self {
            backend,
            page_size,
            query: String::new(),
            results: Vec::new(),
            error: None,
            in_flight: None,
        }
    }

    pub fn results(&self) -> &[Photo] {
        &self.results
    }

    /// Inline error from the last search
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Search for the current `query`. A newer search replaces one still running.
    pub fn submit(&mut self) {
        let query = self.query.trim();
        if query.is_empty() {
            return;
        }
        let (sender, receiver) = oneshot::channel();
        self.error = None;
        self.in_flight = Some(receiver);
        self.backend.search(
            query,
            self.page_size,
            Box::new(move |result| {
                if sender.send(result).is_err() {
                    debug!("Search result arrived after it was superseded");
                }
            }),
        );
    }

    /// Pick up a finished search. Returns true when results or error changed.
    pub fn poll(&mut self) -> bool {
        let Some(receiver) = self.in_flight.as_mut() else {
            return false;
        };
        let result = match receiver.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => return false,
            Err(oneshot::Canceled) => {
                self.in_flight = None;
                self.error = Some("Search was interrupted".to_owned());
                return true;
            }
        };
        self.in_flight = None;
        match result {
            Ok(photos) => {
                info!("Search returned {} photos", photos.len());
                self.results = photos;
            }
            Err(err) => {
                warn!("{err}");
                self.results.clear();
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Full-size URL of result `index`
    pub fn select(&self, index: usize) -> Option<String> {
        self.results.get(index).map(|photo| photo.full_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "total": 2,
        "results": [
            { "id": "a1", "description": null, "alt_description": "a cat on a sofa",
              "urls": { "thumb": "https://img.example/a1-t", "small": "https://img.example/a1-s",
                        "regular": "https://img.example/a1-r", "full": "https://img.example/a1" } },
            { "id": "b2", "description": "kitten",
              "urls": { "thumb": "https://img.example/b2-t", "small": "https://img.example/b2-s",
                        "regular": "https://img.example/b2-r", "full": "https://img.example/b2" } }
        ]
    }"#;

    struct FixedSearch(Result<&'static str, u16>);

    impl PhotoSearch for FixedSearch {
        fn search(&self, _query: &str, _per_page: usize, on_done: SearchCallback) {
            on_done(match self.0 {
                Ok(body) => parse_search_response(body.as_bytes()),
                Err(status) => Err(SearchError::Status(status)),
            });
        }
    }

    #[test]
    fn test_parse_prefers_description() {
        let photos = parse_search_response(BODY.as_bytes()).unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].description.as_deref(), Some("a cat on a sofa"));
        assert_eq!(photos[1].description.as_deref(), Some("kitten"));
        assert_eq!(photos[1].full_url, "https://img.example/b2");
    }

    #[test]
    fn test_full_resolution_url_is_handed_over() {
        let body = br#"{"results":[{"id":"x","description":null,"alt_description":null,
            "urls":{"thumb":"t","small":"s","regular":"r","full":"f"}}]}"#;
        let photos = parse_search_response(body).unwrap();
        assert_eq!(photos[0].full_url, "f");
        assert_eq!(photos[0].thumb_url, "s");

        let sparse = br#"{"results":[{"id":"y","description":null,"alt_description":null,
            "urls":{"full":"f"}}]}"#;
        let photos = parse_search_response(sparse).unwrap();
        assert_eq!(photos[0].thumb_url, "f");
    }

    #[test]
    fn test_malformed_body() {
        let err = parse_search_response(b"{\"oops\": true}").unwrap_err();
        assert!(matches!(err, SearchError::Malformed(_)));
    }

    #[test]
    fn test_missing_credential_fails_before_request() {
        let client = UnsplashClient::new(&SearchConfig::default());
        assert!(matches!(client.request("cats", 8), Err(SearchError::MissingCredential)));
    }

    #[test]
    fn test_request_shape() {
        let config = SearchConfig {
            endpoint: "https://api.example.com/".to_owned(),
            access_key: Some("k3y".to_owned()),
            page_size: 8,
        };
        let request = UnsplashClient::new(&config).request("red cats", 8).unwrap();
        assert_eq!(
            request.url,
            "https://api.example.com/search/photos?query=red+cats&per_page=8"
        );
        assert!(request
            .headers
            .contains(&("Authorization".to_owned(), "Client-ID k3y".to_owned())));
    }

    #[test]
    fn test_view_shows_results_then_inline_error() {
        let mut view = SearchView::new(Arc::new(FixedSearch(Ok(BODY))), 8);
        view.query = "cats".to_owned();
        view.submit();
        assert!(view.poll());
        assert_eq!(view.results().len(), 2);
        assert_eq!(view.select(1).as_deref(), Some("https://img.example/b2"));
        assert_eq!(view.select(5), None);

        let mut failing = SearchView::new(Arc::new(FixedSearch(Err(403))), 8);
        failing.query = "cats".to_owned();
        failing.submit();
        failing.poll();
        assert!(failing.results().is_empty());
        assert_eq!(failing.error(), Some("Photo search returned HTTP 403"));
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let mut view = SearchView::new(Arc::new(FixedSearch(Ok(BODY))), 8);
        view.query = "   ".to_owned();
        view.submit();
        assert!(!view.is_searching());
    }
}
