//! Index page cache.
//!
//! Frontends may name an index page source. The page is fetched on first
//! use and kept per frontend name until the invalidation worker evicts it.
//!
//! `http(s)://` sources are fetched with `reqwest`; `file://` sources are
//! read from disk. Both run under the configured timeout and are never
//! retried.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cache::invalidation::{FrontendCache, InvalidationError};
use crate::frontend::{Frontend, FrontendName};

#[derive(Debug, Error)]
pub enum IndexHtmlError {
    #[error("fetching index page for '{frontend}' from {source_uri} failed: {source}")]
    Fetch {
        frontend: FrontendName,
        source_uri: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("reading index page for '{frontend}' from {source_uri} failed: {source}")]
    Read {
        frontend: FrontendName,
        source_uri: Url,
        #[source]
        source: std::io::Error,
    },

    #[error("index page for '{frontend}' not loaded within {timeout:?}")]
    Timeout {
        frontend: FrontendName,
        timeout: Duration,
    },

    #[error("unsupported index page source {0}")]
    UnsupportedSource(Url),
}

struct CachedPage {
    source: Url,
    body: Arc<str>,
}

pub struct IndexHtmlCache {
    client: reqwest::Client,
    timeout: Duration,
    pages: DashMap<FrontendName, CachedPage>,
}

impl IndexHtmlCache {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            pages: DashMap::new(),
        }
    }

    /// The frontend's index page, or `None` if it has no source.
    pub async fn get(&self, frontend: &Frontend) -> Result<Option<Arc<str>>, IndexHtmlError> {
        let Some(source) = frontend.index_html_source() else {
            return Ok(None);
        };

        if let Some(page) = self.pages.get(frontend.name()) {
            if page.source == *source {
                return Ok(Some(page.body.clone()));
            }
        }

        let body: Arc<str> = self.load(frontend.name(), source).await?.into();
        tracing::debug!(frontend = %frontend.name(), source = %source, bytes = body.len(), "Index page cached");
        self.pages.insert(
            frontend.name().clone(),
            CachedPage {
                source: source.clone(),
                body: body.clone(),
            },
        );
        Ok(Some(body))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    async fn load(&self, frontend: &FrontendName, source: &Url) -> Result<String, IndexHtmlError> {
        let timeout = || IndexHtmlError::Timeout {
            frontend: frontend.clone(),
            timeout: self.timeout,
        };

        match source.scheme() {
            "http" | "https" => {
                let fetch_error = |source_err| IndexHtmlError::Fetch {
                    frontend: frontend.clone(),
                    source_uri: source.clone(),
                    source: source_err,
                };
                let response = self
                    .client
                    .get(source.clone())
                    .timeout(self.timeout)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|e| if e.is_timeout() { timeout() } else { fetch_error(e) })?;
                response.text().await.map_err(fetch_error)
            }
            "file" => {
                let path = source
                    .to_file_path()
                    .map_err(|_| IndexHtmlError::UnsupportedSource(source.clone()))?;
                tokio::time::timeout(self.timeout, tokio::fs::read_to_string(path))
                    .await
                    .map_err(|_| timeout())?
                    .map_err(|e| IndexHtmlError::Read {
                        frontend: frontend.clone(),
                        source_uri: source.clone(),
                        source: e,
                    })
            }
            _ => Err(IndexHtmlError::UnsupportedSource(source.clone())),
        }
    }
}

impl FrontendCache for IndexHtmlCache {
    fn cache_name(&self) -> &'static str {
        "index_html"
    }

    fn invalidate(&self, frontend: &FrontendName) -> Result<(), InvalidationError> {
        self.pages.remove(frontend);
        Ok(())
    }
}
