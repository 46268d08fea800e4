//! Fetch collaborator
//!
//! The pipeline's only suspension point. `Fetcher` abstracts the HTTP
//! transport so the pipeline can run against a real client or canned
//! pages in tests; retry policy, if any, belongs to the caller.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};

/// Default User-Agent, a browser-like string so origins serve the same
/// markup they serve real visitors.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default upper bound on a single fetch.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A fetched page body with transport metadata.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
    pub content_type: Option<String>,
    pub status: u16,
}

/// Transport abstraction for retrieving page bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one URL, bounded by the implementation's timeout.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;

    /// Implementation name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// HTTP fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a fetcher whose requests abort after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build HTTP client"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Override the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn classify(url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() || error.is_connect() {
            FetchError::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            FetchError::Request {
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        debug!(url = %url, "HTTP fetch starting");

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                Self::classify(url, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| FetchError::Request {
            message: e.to_string(),
        })?;

        debug!(url = %url, bytes = body.len(), "HTTP fetch completed");

        Ok(FetchedPage {
            url: url.to_string(),
            body,
            content_type,
            status: status.as_u16(),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Mock fetcher with canned responses and recorded calls.
#[derive(Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, FetchedPage>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned HTML body for a URL.
    pub fn add_page(&self, url: &str, body: &str) {
        let page = FetchedPage {
            url: url.to_string(),
            body: body.to_string(),
            content_type: Some("text/html".to_string()),
            status: 200,
        };
        self.pages.write().unwrap().insert(url.to_string(), page);
    }

    /// Builder-style page registration.
    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.add_page(url, body);
        self
    }

    /// URLs fetched so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            pages: Arc::clone(&self.pages),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Network {
                url: url.to_string(),
                message: "no canned response".to_string(),
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
