//! Typed errors for the scraping pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can map
//! each kind to a distinct response.

use thiserror::Error;

/// Fatal errors surfaced by a scrape call.
///
/// Non-fatal extraction issues (a script literal that will not parse) are
/// logged and leave the affected key absent; they never appear here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Target URL could not be parsed at all
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// URL host is not within the configured domain; raised before any fetch
    #[error("URL host {host} does not match domain {domain} configured for {site}")]
    DomainMismatch {
        site: String,
        domain: String,
        host: String,
    },

    /// Page fetch failed; the transport-level cause is preserved
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Site configuration missing or malformed
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Transport failures, kept distinguishable for diagnostics but always
/// propagated as a single `ScrapeError::Fetch` kind. Never retried here.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Origin answered with a non-success HTTP status
    #[error("HTTP error: {status}")]
    Status { status: u16 },

    /// Origin unreachable (DNS, connect, timeout)
    #[error("network error: unable to reach {url}: {message}")]
    Network { url: String, message: String },

    /// Anything else that went wrong building or reading the request
    #[error("request error: {message}")]
    Request { message: String },
}

/// Errors from the configuration collaborator.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No site configuration matches the resolved hostname
    #[error("no site configuration for host: {host}")]
    UnknownSite { host: String },

    /// Configuration loaded but failed validation
    #[error("invalid configuration for site {site}: {reason}")]
    Invalid { site: String, reason: String },

    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for a `SiteConfig`
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for scrape operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
