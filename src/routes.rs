//! Listing and detail routes, and the detail page cache.
//!
//! Detail pages behave like statically generated pages with on-demand
//! fallback:
//!
//! * [`prebuild`] fetches the article index at startup and renders the first
//!   few ids ahead of time.
//! * Any other id is fetched the first time it is opened.
//! * Cached pages older than the revalidation window are still shown, and
//!   refreshed in the background.
//!
//! The listing's first page follows the same model: [`warm_up`] fetches it
//! alongside the pre-build, and [`SeedRefresh`] schedules it to be fetched
//! again, sooner when the last attempt came back empty or failed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;

use crate::feed::{Article, ArticleSource, FeedResult, FIRST_PAGE};

/// Default number of detail pages built at startup.
pub const DEFAULT_PREBUILD_LIMIT: usize = 12;

/// Default age after which a cached detail page is refreshed.
pub const DEFAULT_REVALIDATE_SECS: u64 = 3600;

/// Default delay before retrying a first page that failed or came back empty.
pub const DEFAULT_SEED_RETRY_SECS: u64 = 60;

fn seconds(secs: u64) -> Duration {
    Duration::seconds(i64::from(u32::try_from(secs).unwrap_or(u32::MAX)))
}

/// A page of the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Listing,
    Article(u64),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Listing => "/".to_string(),
            Route::Article(id) => format!("/blog/{id}"),
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Some(Route::Listing);
        }
        path.strip_prefix("/blog/")
            .and_then(|slug| slug.parse().ok())
            .map(Route::Article)
    }
}

/// What the detail view can show for an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail<'a> {
    Ready(&'a Article),
    Loading,
    NotFound,
    /// The last fetch failed and nothing is cached.
    Unavailable,
}

struct Entry {
    article: Article,
    fetched_at: DateTime<Utc>,
}

/// Cached detail pages keyed by article id.
pub struct DetailCache {
    entries: HashMap<u64, Entry>,
    not_found: HashSet<u64>,
    in_flight: HashSet<u64>,
    prebuilt: usize,
    revalidate_after: Duration,
}

impl DetailCache {
    pub fn new(revalidate_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            not_found: HashSet::new(),
            in_flight: HashSet::new(),
            prebuilt: 0,
            revalidate_after: seconds(revalidate_secs),
        }
    }

    /// Number of pages rendered at startup.
    pub fn prebuilt_count(&self) -> usize {
        self.prebuilt
    }

    pub fn insert(&mut self, article: Article, now: DateTime<Utc>) {
        self.not_found.remove(&article.id);
        self.entries.insert(article.id, Entry { article, fetched_at: now });
    }

    pub fn detail(&self, id: u64) -> Detail<'_> {
        if let Some(entry) = self.entries.get(&id) {
            Detail::Ready(&entry.article)
        } else if self.in_flight.contains(&id) {
            Detail::Loading
        } else if self.not_found.contains(&id) {
            Detail::NotFound
        } else {
            Detail::Unavailable
        }
    }

    /// Whether `id` should be (re)fetched now: it is missing or stale, and no
    /// request for it is in flight.  Marks the id as in flight when it
    /// returns `true`.
    pub fn begin_fetch(&mut self, id: u64, now: DateTime<Utc>) -> bool {
        if self.in_flight.contains(&id) {
            return false;
        }
        let needed = match self.entries.get(&id) {
            Some(entry) => now - entry.fetched_at >= self.revalidate_after,
            None => true,
        };
        if needed {
            self.in_flight.insert(id);
        }
        needed
    }

    /// Apply the result of a fetch started with [`begin_fetch`](Self::begin_fetch).
    ///
    /// A failure leaves any cached copy in place.
    pub fn complete_fetch(
        &mut self,
        id: u64,
        result: FeedResult<Option<Article>>,
        now: DateTime<Utc>,
    ) {
        self.in_flight.remove(&id);
        match result {
            Ok(Some(article)) => self.insert(article, now),
            Ok(None) => {
                self.entries.remove(&id);
                self.not_found.insert(id);
            }
            Err(e) => tracing::warn!(id, error = %e, "error fetching article"),
        }
    }
}

/// Fetch the index and pre-render the first `limit` detail pages.
///
/// A failure to fetch the index yields an empty pre-built set; a failure on
/// a single page skips that page.  Either way the fallback path still
/// serves the article on demand.
pub async fn prebuild(
    source: Arc<dyn ArticleSource>,
    limit: usize,
    cache: &mut DetailCache,
    now: DateTime<Utc>,
) {
    let index = match source.fetch_all().await {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!(error = %e, "error fetching article index for detail pages");
            return;
        }
    };

    let ids: Vec<u64> = index.iter().take(limit).map(|a| a.id).collect();
    let fetches = ids.iter().map(|&id| {
        let source = Arc::clone(&source);
        async move { (id, source.fetch_article(id).await) }
    });

    for (id, result) in join_all(fetches).await {
        match result {
            Ok(Some(article)) => {
                cache.insert(article, now);
                cache.prebuilt += 1;
            }
            Ok(None) => tracing::debug!(id, "indexed article not found, skipping"),
            Err(e) => tracing::warn!(id, error = %e, "error pre-building article"),
        }
    }
    tracing::info!(count = cache.prebuilt, "detail pages pre-built");
}

/// Fetch the listing's first page and pre-build detail pages concurrently.
///
/// Returns the first page, or an empty one if the fetch failed.
pub async fn warm_up(
    source: Arc<dyn ArticleSource>,
    page_size: u32,
    prebuild_limit: usize,
    cache: &mut DetailCache,
    now: DateTime<Utc>,
) -> Vec<Article> {
    let (seed, ()) = tokio::join!(
        source.fetch_page(FIRST_PAGE, page_size),
        prebuild(Arc::clone(&source), prebuild_limit, cache, now),
    );
    seed.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "error fetching initial articles");
        Vec::new()
    })
}

/// When the listing's first page is fetched again.
///
/// After a successful, non-empty fetch the next one is due after the
/// revalidation window; after a failure or an empty page it is due after the
/// shorter retry delay.  One refresh runs at a time.
#[derive(Debug, Clone)]
pub struct SeedRefresh {
    due: Option<DateTime<Utc>>,
    in_flight: bool,
    revalidate_after: Duration,
    retry_after: Duration,
}

impl Default for SeedRefresh {
    fn default() -> Self {
        Self::new(DEFAULT_REVALIDATE_SECS, DEFAULT_SEED_RETRY_SECS)
    }
}

impl SeedRefresh {
    /// An unscheduled refresh; call [`schedule`](Self::schedule) to arm it.
    pub fn new(revalidate_secs: u64, retry_secs: u64) -> Self {
        Self {
            due: None,
            in_flight: false,
            revalidate_after: seconds(revalidate_secs),
            retry_after: seconds(retry_secs),
        }
    }

    /// Arm the next refresh relative to `now`.
    pub fn schedule(&mut self, retry: bool, now: DateTime<Utc>) {
        let delay = if retry { self.retry_after } else { self.revalidate_after };
        self.due = Some(now + delay);
    }

    pub fn due(&self) -> Option<DateTime<Utc>> {
        self.due
    }

    /// Whether a refresh should start now.  Marks it in flight when it
    /// returns `true`.
    pub fn begin(&mut self, now: DateTime<Utc>) -> bool {
        match self.due {
            Some(due) if !self.in_flight && now >= due => {
                self.in_flight = true;
                true
            }
            _ => false,
        }
    }

    /// Finish the refresh started by [`begin`](Self::begin) and arm the
    /// next one.
    pub fn complete(&mut self, retry: bool, now: DateTime<Utc>) {
        self.in_flight = false;
        self.schedule(retry, now);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
