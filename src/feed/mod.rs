//! Article sources and the incremental feed loader.
//!
//! This module defines the [`ArticleSource`] trait, the [`Article`] record
//! and the [`FeedLoader`] that pages articles into a de-duplicated list.
//! The only concrete source is [`HttpSource`].
//!
//! ## Adding a new source
//!
//! 1. Create a new file in this directory (e.g. `fixture.rs`).
//! 2. Define a struct and implement [`ArticleSource`] for it.
//! 3. Add `mod fixture;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of `HttpSource`.
//!
//! The loader, the detail cache and the UI never look past the trait.

mod article;
mod error;
mod http;
mod loader;
#[cfg(test)]
pub mod testing;

pub use article::Article;
pub use error::{FeedError, FeedResult};
pub use http::HttpSource;
pub use loader::{FeedLoader, FeedState, LoadOutcome, PageRequest, FIRST_PAGE};

use async_trait::async_trait;

/// Trait that every article source must implement.
///
/// Fetches run on tokio worker tasks, so implementations must be
/// [`Send`] + [`Sync`] and are shared behind an `Arc`.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Human-readable label used in log lines.
    fn name(&self) -> &str;

    /// Fetch one page of articles.  Pages are 1-based; an empty vector means
    /// the source is exhausted.
    async fn fetch_page(&self, page: u32, limit: u32) -> FeedResult<Vec<Article>>;

    /// Fetch a single article.  `Ok(None)` means the source does not know
    /// the id.
    async fn fetch_article(&self, id: u64) -> FeedResult<Option<Article>>;

    /// Fetch the full article index, unpaginated.
    async fn fetch_all(&self) -> FeedResult<Vec<Article>>;
}
