//! Scrape pipeline orchestration
//!
//! Sequences the extraction stages for one URL: domain check, fetch,
//! script-state pass, DOM pass, field mapping, output templating.

use scraper::Html;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::SiteConfig;
use crate::error::{Result, ScrapeError};
use crate::fetch::Fetcher;
use crate::{dom, mapper, script, template};

/// Config-driven scraper over a pluggable fetch transport.
///
/// Holds no per-request state: one instance may serve many concurrent
/// `scrape` calls, each building its own value trees.
pub struct Scraper<F: Fetcher> {
    fetcher: F,
}

impl<F: Fetcher> Scraper<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Scrape one URL according to a site configuration.
    ///
    /// The URL's hostname must contain `config.domain` (substring test) or
    /// the call fails before any network activity. Script-derived values
    /// are merged first, DOM-derived values second, so on a key collision
    /// the DOM value wins. Returns the templated output tree.
    pub async fn scrape(&self, url: &str, config: &SiteConfig) -> Result<Value> {
        let host = host_of(url)?;
        if !host.contains(&config.domain) {
            return Err(ScrapeError::DomainMismatch {
                site: config.site_name.clone(),
                domain: config.domain.clone(),
                host,
            });
        }

        debug!(site = %config.site_name, url = %url, fetcher = self.fetcher.name(), "scrape starting");

        let page = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| ScrapeError::Fetch {
                url: url.to_string(),
                source,
            })?;

        // Script pass first, DOM pass merged second: DOM overwrites on
        // exact-key collision.
        let mut extracted = script::extract_script_state(&page.body, &config.script_selectors);

        let document = Html::parse_document(&page.body);
        for (key, value) in dom::extract_dom_data(&document, &config.selectors) {
            extracted.insert(key, value);
        }

        let extracted = Value::Object(extracted);
        debug!(site = %config.site_name, keys = extracted.as_object().map_or(0, |m| m.len()), "extraction completed");

        let mapped = mapper::apply_data_mapping(&extracted, &config.data_mapping);

        Ok(template::render_template(&config.output_template, &mapped))
    }
}

fn host_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| ScrapeError::InvalidUrl {
        url: url.to_string(),
    })?;

    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| ScrapeError::InvalidUrl {
            url: url.to_string(),
        })
}
