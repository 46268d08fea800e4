//! Configuration-driven web page scraping
//!
//! Extracts structured data from third-party pages using a declarative
//! per-site configuration, then reshapes it into a caller-defined output
//! schema:
//! - embedded script state (`window.VAR = {...}` literals)
//! - DOM values via nested CSS selector trees
//! - field mapping with `||` fallback chains
//! - `{{path}}` placeholder templating
//!
//! The fetch transport is pluggable; everything after it is synchronous
//! computation over request-local value trees.

pub mod config;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod mapper;
pub mod path;
pub mod pipeline;
pub mod script;
pub mod template;

pub use config::{ConfigStore, SelectorTree, SiteConfig};
pub use error::{ConfigError, FetchError, FetchResult, Result, ScrapeError};
pub use fetch::{FetchedPage, Fetcher, HttpFetcher, MockFetcher};
pub use pipeline::Scraper;
