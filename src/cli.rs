//! Command-line interface definitions.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::routes::Route;

/// Terminal blog reader with infinite scroll
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (missing file means defaults)
    #[arg(short = 'C', long, default_value = "blog-reader.toml")]
    pub config: PathBuf,

    /// Override the API base URL
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Override the number of articles per page
    #[arg(short, long)]
    pub page_size: Option<u32>,

    /// Route to open at startup, e.g. `/blog/3`
    #[arg(short, long, value_parser = parse_route, default_value = "/")]
    pub open: Route,
}

fn parse_route(s: &str) -> Result<Route, String> {
    Route::parse(s).ok_or_else(|| format!("unknown route `{s}` (expected `/` or `/blog/<id>`)"))
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(size) = self.page_size {
            config.feed.page_size = size;
        }
    }
}
