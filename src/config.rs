//! TOML configuration.
//!
//! Every key has a default, so an empty or missing file is valid:
//!
//! ```toml
//! [api]
//! base_url = "https://jsonplaceholder.typicode.com"
//!
//! [feed]
//! page_size = 6
//! trigger_distance = 1000
//!
//! [routes]
//! prebuild_limit = 12
//! revalidate_secs = 3600
//! seed_retry_secs = 60
//!
//! [log]
//! file = "blog-reader.log"
//! filter = "blog_reader=info"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::routes::{DEFAULT_PREBUILD_LIMIT, DEFAULT_REVALIDATE_SECS, DEFAULT_SEED_RETRY_SECS};
use crate::scroll::DEFAULT_TRIGGER_DISTANCE;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_PAGE_SIZE: u32 = 6;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub routes: RoutesConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Articles per page, including the startup page.
    pub page_size: u32,
    /// Rows from the end of the listing at which the next page is requested.
    pub trigger_distance: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            trigger_distance: DEFAULT_TRIGGER_DISTANCE,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RoutesConfig {
    pub prebuild_limit: usize,
    /// Age after which article pages and the listing's first page are
    /// fetched again.
    pub revalidate_secs: u64,
    /// Delay before fetching the first page again after a failure or an
    /// empty page.
    pub seed_retry_secs: u64,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            prebuild_limit: DEFAULT_PREBUILD_LIMIT,
            revalidate_secs: DEFAULT_REVALIDATE_SECS,
            seed_retry_secs: DEFAULT_SEED_RETRY_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path.  The terminal is owned by the UI, so logs never go to
    /// stdout.
    pub file: String,
    /// `tracing` env-filter directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: "blog-reader.log".to_string(),
            filter: "blog_reader=info".to_string(),
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
