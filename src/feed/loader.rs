//! Incremental feed loading.
//!
//! [`FeedLoader`] owns the growing article list behind the infinite-scroll
//! listing.  Page 1 arrives as a seed at startup; every later page is pulled
//! on demand, merged without duplicates, and the cursor advances only when
//! a non-empty page lands.
//!
//! ## Guard
//!
//! At most one page request is in flight.  [`FeedLoader::begin_load`] sets
//! the loading flag and hands out a [`PageRequest`]; until the matching
//! [`FeedLoader::complete_load`] arrives every further trigger is a no-op.
//! Triggers can therefore fire on every key press without piling up
//! requests, and pages merge in strictly increasing cursor order.
//!
//! The UI uses the two halves so it can keep drawing while a tokio task does
//! the fetch.  [`FeedLoader::request_next_page`] chains them for callers
//! that can simply await.

use std::collections::HashSet;
use std::sync::Arc;

use super::{Article, ArticleSource, FeedResult};

/// The page fetched at startup.  The loader's cursor starts one past it.
pub const FIRST_PAGE: u32 = 1;

/// Snapshot of the feed, read by the renderer.
///
/// Only [`FeedLoader`] mutates it.
#[derive(Debug, Clone)]
pub struct FeedState {
    items: Vec<Article>,
    seen: HashSet<u64>,
    next_page: u32,
    is_loading: bool,
    has_more: bool,
}

impl FeedState {
    fn seeded(seed: Vec<Article>) -> Self {
        let mut state = Self {
            items: Vec::with_capacity(seed.len()),
            seen: HashSet::with_capacity(seed.len()),
            next_page: FIRST_PAGE + 1,
            is_loading: false,
            has_more: true,
        };
        state.append_unseen(seed);
        state
    }

    /// Articles in arrival order, unique by id.
    pub fn items(&self) -> &[Article] {
        &self.items
    }

    /// The page the next request will ask for.
    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// `false` once the source has returned an empty page.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Append articles whose id is new, keeping their order.  Returns how
    /// many were appended.
    fn append_unseen(&mut self, batch: Vec<Article>) -> usize {
        let before = self.items.len();
        for article in batch {
            if self.seen.insert(article.id) {
                self.items.push(article);
            }
        }
        self.items.len() - before
    }

    /// Insert articles whose id is new ahead of the current items, keeping
    /// their order.  Returns how many were inserted.
    fn prepend_unseen(&mut self, batch: Vec<Article>) -> usize {
        let fresh: Vec<Article> = batch
            .into_iter()
            .filter(|article| self.seen.insert(article.id))
            .collect();
        let added = fresh.len();
        self.items.splice(0..0, fresh);
        added
    }
}

/// A page request handed out by [`FeedLoader::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

/// What a load attempt did to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A request was already in flight or the feed is exhausted.
    Skipped,
    /// A non-empty page arrived; `added` of its `fetched` items were new.
    Appended { fetched: usize, added: usize },
    /// An empty page arrived; no further pages will be requested.
    Exhausted,
    /// The fetch failed; the same page will be requested next time.
    Failed,
    /// The completion did not match the request in flight and was dropped.
    Stale,
}

/// Pages articles from an [`ArticleSource`] into a de-duplicated list.
pub struct FeedLoader {
    source: Arc<dyn ArticleSource>,
    page_size: u32,
    state: FeedState,
}

impl FeedLoader {
    /// Create an empty loader.  Call [`initialize`](Self::initialize) with
    /// the startup page before use.
    pub fn new(source: Arc<dyn ArticleSource>, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            state: FeedState::seeded(Vec::new()),
        }
    }

    /// Reset the feed to `seed`.  The seed may be empty when the startup
    /// fetch failed; loading still works from page 2.
    pub fn initialize(&mut self, seed: Vec<Article>) {
        self.state = FeedState::seeded(seed);
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Merge a refetched first page into the feed.
    ///
    /// Articles already in the feed are kept as they are; new ones go to the
    /// front, since the first page precedes every page the cursor has
    /// loaded.  The cursor, the loading flag and exhaustion are untouched.
    /// Returns how many articles were added.
    pub fn merge_first_page(&mut self, batch: Vec<Article>) -> usize {
        let fetched = batch.len();
        let added = self.state.prepend_unseen(batch);
        tracing::debug!(fetched, added, "first page merged");
        added
    }

    /// Claim the next page.  Returns `None` while a request is in flight
    /// or once the feed is exhausted.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.state.is_loading || !self.state.has_more {
            return None;
        }
        self.state.is_loading = true;
        let request = PageRequest {
            page: self.state.next_page,
            limit: self.page_size,
        };
        tracing::debug!(page = request.page, limit = request.limit, "loading page");
        Some(request)
    }

    /// Apply the result of the request returned by [`begin_load`](Self::begin_load).
    pub fn complete_load(
        &mut self,
        request: PageRequest,
        result: FeedResult<Vec<Article>>,
    ) -> LoadOutcome {
        if !self.state.is_loading || request.page != self.state.next_page {
            tracing::debug!(page = request.page, "dropping stale page");
            return LoadOutcome::Stale;
        }
        self.state.is_loading = false;

        match result {
            Ok(batch) if batch.is_empty() => {
                self.state.has_more = false;
                tracing::info!(page = request.page, "feed exhausted");
                LoadOutcome::Exhausted
            }
            Ok(batch) => {
                let fetched = batch.len();
                let added = self.state.append_unseen(batch);
                self.state.next_page += 1;
                tracing::debug!(page = request.page, fetched, added, "page merged");
                LoadOutcome::Appended { fetched, added }
            }
            Err(e) => {
                tracing::warn!(
                    source = self.source.name(),
                    page = request.page,
                    decode = e.is_decode(),
                    error = %e,
                    "error loading more articles"
                );
                LoadOutcome::Failed
            }
        }
    }

    /// Fetch and merge the next page.  Safe to call redundantly: a call
    /// made while loading or after exhaustion does nothing.
    pub async fn request_next_page(&mut self) -> LoadOutcome {
        let Some(request) = self.begin_load() else {
            return LoadOutcome::Skipped;
        };
        let result = self.source.fetch_page(request.page, request.limit).await;
        self.complete_load(request, result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::{article, ids, ScriptedSource};
    use crate::feed::FeedError;

    fn loader_with(source: &Arc<ScriptedSource>) -> FeedLoader {
        FeedLoader::new(source.clone(), 6)
    }

    // -- initialize ----------------------------------------------------------

    #[test]
    fn initialize_sets_defaults() {
        let source = Arc::new(ScriptedSource::new());
        let mut loader = loader_with(&source);
        loader.initialize(vec![article(1), article(2)]);

        let state = loader.state();
        assert_eq!(ids(state.items()), vec![1, 2]);
        assert_eq!(state.next_page(), 2);
        assert!(!state.is_loading());
        assert!(state.has_more());
    }

    #[test]
    fn initialize_drops_duplicate_seed_entries() {
        let source = Arc::new(ScriptedSource::new());
        let mut loader = loader_with(&source);
        loader.initialize(vec![article(1), article(2), article(1)]);

        assert_eq!(ids(loader.state().items()), vec![1, 2]);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let source = Arc::new(ScriptedSource::new());
        let loader = FeedLoader::new(source, 0);
        assert_eq!(loader.page_size(), 1);
    }

    // -- request_next_page ---------------------------------------------------

    #[tokio::test]
    async fn overlapping_page_is_deduplicated() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(vec![article(2), article(3)]));
        let mut loader = loader_with(&source);
        loader.initialize(vec![article(1), article(2)]);

        let outcome = loader.request_next_page().await;

        assert_eq!(outcome, LoadOutcome::Appended { fetched: 2, added: 1 });
        assert_eq!(ids(loader.state().items()), vec![1, 2, 3]);
        assert_eq!(loader.state().next_page(), 3);
        assert!(!loader.state().is_loading());
        assert_eq!(source.page_calls(), vec![(2, 6)]);
    }

    #[tokio::test]
    async fn empty_seed_then_empty_page_exhausts() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(vec![]));
        let mut loader = loader_with(&source);
        loader.initialize(vec![]);

        assert_eq!(loader.request_next_page().await, LoadOutcome::Exhausted);
        assert!(!loader.state().has_more());
        assert!(loader.state().items().is_empty());
        assert_eq!(loader.state().next_page(), 2);
    }

    #[tokio::test]
    async fn exhausted_feed_makes_no_more_calls() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(vec![]));
        let mut loader = loader_with(&source);

        loader.request_next_page().await;
        assert_eq!(loader.request_next_page().await, LoadOutcome::Skipped);
        assert_eq!(loader.request_next_page().await, LoadOutcome::Skipped);

        assert_eq!(source.page_calls().len(), 1);
    }

    #[tokio::test]
    async fn failure_keeps_cursor_and_retries_same_page() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Err(FeedError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)));
        source.push_page(Ok(vec![article(7)]));
        let mut loader = loader_with(&source);
        loader.initialize(vec![article(1)]);

        assert_eq!(loader.request_next_page().await, LoadOutcome::Failed);
        assert_eq!(loader.state().next_page(), 2);
        assert!(loader.state().has_more());
        assert!(!loader.state().is_loading());
        assert_eq!(ids(loader.state().items()), vec![1]);

        assert_eq!(
            loader.request_next_page().await,
            LoadOutcome::Appended { fetched: 1, added: 1 }
        );
        assert_eq!(source.page_calls(), vec![(2, 6), (2, 6)]);
        assert_eq!(loader.state().next_page(), 3);
    }

    #[tokio::test]
    async fn decode_failure_is_retryable() {
        let source = Arc::new(ScriptedSource::new());
        let decode = serde_json::from_str::<Vec<Article>>("nope").unwrap_err();
        source.push_page(Err(decode.into()));
        let mut loader = loader_with(&source);

        assert_eq!(loader.request_next_page().await, LoadOutcome::Failed);
        assert!(loader.state().has_more());
        assert_eq!(loader.state().next_page(), 2);
    }

    #[tokio::test]
    async fn pages_are_requested_in_cursor_order() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(vec![article(7), article(8)]));
        source.push_page(Ok(vec![article(8), article(9)]));
        source.push_page(Ok(vec![]));
        let mut loader = loader_with(&source);
        loader.initialize(vec![article(1)]);

        while loader.request_next_page().await != LoadOutcome::Skipped {}

        assert_eq!(source.page_calls(), vec![(2, 6), (3, 6), (4, 6)]);
        assert_eq!(ids(loader.state().items()), vec![1, 7, 8, 9]);
        assert!(!loader.state().has_more());
    }

    #[tokio::test]
    async fn page_of_only_duplicates_still_advances() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(vec![article(1)]));
        let mut loader = loader_with(&source);
        loader.initialize(vec![article(1)]);

        assert_eq!(
            loader.request_next_page().await,
            LoadOutcome::Appended { fetched: 1, added: 0 }
        );
        assert_eq!(loader.state().next_page(), 3);
        assert!(loader.state().has_more());
    }

    // -- merge_first_page ----------------------------------------------------

    #[tokio::test]
    async fn first_page_recovered_after_failed_seed() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(vec![article(7), article(8)]));
        let mut loader = loader_with(&source);
        loader.initialize(vec![]);
        loader.request_next_page().await;

        let added = loader.merge_first_page(vec![article(1), article(2), article(7)]);

        assert_eq!(added, 2);
        assert_eq!(ids(loader.state().items()), vec![1, 2, 7, 8]);
        assert_eq!(loader.state().next_page(), 3);
        assert!(loader.state().has_more());
    }

    #[test]
    fn first_page_merge_leaves_request_in_flight() {
        let source = Arc::new(ScriptedSource::new());
        let mut loader = loader_with(&source);
        loader.initialize(vec![article(1)]);
        let request = loader.begin_load().unwrap();

        assert_eq!(loader.merge_first_page(vec![article(1)]), 0);
        assert!(loader.state().is_loading());
        assert_eq!(
            loader.complete_load(request, Ok(vec![article(7)])),
            LoadOutcome::Appended { fetched: 1, added: 1 }
        );
        assert_eq!(ids(loader.state().items()), vec![1, 7]);
    }

    // -- guard ---------------------------------------------------------------

    #[tokio::test]
    async fn request_while_loading_is_noop() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(vec![article(9)]));
        let mut loader = loader_with(&source);
        loader.initialize(vec![article(1)]);

        let in_flight = loader.begin_load().unwrap();
        let before = loader.state().clone();

        assert_eq!(loader.request_next_page().await, LoadOutcome::Skipped);
        assert!(loader.begin_load().is_none());
        assert!(source.page_calls().is_empty());
        assert_eq!(ids(loader.state().items()), ids(before.items()));
        assert_eq!(loader.state().next_page(), before.next_page());
        assert!(loader.state().is_loading());

        let outcome = loader.complete_load(in_flight, Ok(vec![article(9)]));
        assert_eq!(outcome, LoadOutcome::Appended { fetched: 1, added: 1 });
        assert!(!loader.state().is_loading());
    }

    #[test]
    fn begin_load_hands_out_cursor_and_page_size() {
        let source = Arc::new(ScriptedSource::new());
        let mut loader = FeedLoader::new(source, 12);

        assert_eq!(loader.begin_load(), Some(PageRequest { page: 2, limit: 12 }));
        assert!(loader.state().is_loading());
    }

    #[test]
    fn completion_after_reinitialize_is_stale() {
        let source = Arc::new(ScriptedSource::new());
        let mut loader = loader_with(&source);

        let request = loader.begin_load().unwrap();
        loader.initialize(vec![article(1)]);

        assert_eq!(loader.complete_load(request, Ok(vec![article(2)])), LoadOutcome::Stale);
        assert_eq!(ids(loader.state().items()), vec![1]);
        assert!(!loader.state().is_loading());
    }

    #[test]
    fn completion_for_wrong_page_is_stale() {
        let source = Arc::new(ScriptedSource::new());
        let mut loader = loader_with(&source);

        let request = loader.begin_load().unwrap();
        let wrong = PageRequest { page: request.page + 1, ..request };

        assert_eq!(loader.complete_load(wrong, Ok(vec![article(2)])), LoadOutcome::Stale);
        assert!(loader.state().is_loading(), "real request is still in flight");
    }
}
