//! Per-site scraping configuration
//!
//! Each target site gets one JSON config describing where its data lives
//! (DOM selectors, embedded script variables) and how to reshape it
//! (field mapping, output template). Configs are immutable once loaded
//! and shared by reference across concurrent scrapes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::ConfigError;
use crate::path;

/// Nested selector specification.
///
/// Leaves are CSS selector strings; named groups nest. The key path to a
/// leaf becomes the dot-notation key of its extracted value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorTree {
    /// A document query expression, e.g. `"h1.product-title"`
    Selector(String),
    /// A named group of nested selectors
    Group(IndexMap<String, SelectorTree>),
}

impl Default for SelectorTree {
    fn default() -> Self {
        SelectorTree::Group(IndexMap::new())
    }
}

fn default_template() -> Value {
    Value::Object(Map::new())
}

/// Configuration for scraping one site.
///
/// Field names mirror the on-disk JSON shape (`siteName`, `dataMapping`,
/// ...). `scriptSelectors` maps extraction keys to `window.VAR` patterns;
/// `dataMapping` maps output field dot-paths to `||`-separated candidate
/// paths; `outputTemplate` is an arbitrary JSON tree whose string leaves
/// may contain `{{path}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub site_name: String,

    /// Hostname substring the target URL must contain
    pub domain: String,

    #[serde(default)]
    pub selectors: SelectorTree,

    #[serde(default)]
    pub script_selectors: IndexMap<String, String>,

    #[serde(default)]
    pub data_mapping: IndexMap<String, String>,

    #[serde(default = "default_template")]
    pub output_template: Value,
}

impl SiteConfig {
    /// Check structural invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.trim().is_empty() {
            return Err(ConfigError::Invalid {
                site: self.site_name.clone(),
                reason: "domain must not be empty".to_string(),
            });
        }

        for field in self.data_mapping.keys() {
            if path::segments(field).is_none() {
                return Err(ConfigError::Invalid {
                    site: self.site_name.clone(),
                    reason: format!("dataMapping key is not a valid dot-path: {field:?}"),
                });
            }
        }

        validate_selector_tree(&self.selectors, &self.site_name)
    }
}

fn validate_selector_tree(tree: &SelectorTree, site: &str) -> Result<(), ConfigError> {
    match tree {
        SelectorTree::Selector(sel) => {
            if sel.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    site: site.to_string(),
                    reason: "empty selector string".to_string(),
                });
            }
        }
        SelectorTree::Group(children) => {
            for (key, child) in children {
                if key.is_empty() || key.contains('.') {
                    return Err(ConfigError::Invalid {
                        site: site.to_string(),
                        reason: format!("invalid selector group key: {key:?}"),
                    });
                }
                validate_selector_tree(child, site)?;
            }
        }
    }
    Ok(())
}

/// Loaded site configurations with hostname dispatch.
#[derive(Debug, Default)]
pub struct ConfigStore {
    configs: Vec<SiteConfig>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in a directory as one `SiteConfig`.
    ///
    /// Files are read in name order so dispatch between overlapping
    /// domains is deterministic.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut store = Self::new();
        for file in paths {
            let text = std::fs::read_to_string(&file).map_err(|source| ConfigError::Io {
                path: file.display().to_string(),
                source,
            })?;
            let config: SiteConfig =
                serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: file.display().to_string(),
                    source,
                })?;
            store.add(config)?;
        }

        Ok(store)
    }

    /// Add a validated config to the store.
    pub fn add(&mut self, config: SiteConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.configs.push(config);
        Ok(())
    }

    /// Find the config whose domain the hostname contains, in load order.
    pub fn for_host(&self, host: &str) -> Option<&SiteConfig> {
        self.configs.iter().find(|c| host.contains(&c.domain))
    }

    /// Resolve a config for a full URL, or fail with `UnknownSite`.
    pub fn for_url(&self, url: &str) -> Result<&SiteConfig, ConfigError> {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| ConfigError::UnknownSite {
                host: url.to_string(),
            })?;

        self.for_host(&host)
            .ok_or(ConfigError::UnknownSite { host })
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
