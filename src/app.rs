use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use crate::feed::{Article, FeedLoader, FeedResult, LoadOutcome, FIRST_PAGE};
use crate::fetch::{Effect, FetchMsg};
use crate::routes::{DetailCache, Route, SeedRefresh};
use crate::scroll::Viewport;

/// Rows one article occupies in the listing (title, excerpt, footer).
pub const CARD_ROWS: usize = 3;

/// `"1 article"`, `"2 articles"`.
pub fn articles(n: usize) -> String {
    if n == 1 {
        "1 article".to_string()
    } else {
        format!("{n} articles")
    }
}

pub struct App {
    /// The paged, de-duplicated article list.
    pub feed: FeedLoader,
    /// Detail pages, pre-built or fetched on demand.
    pub details: DetailCache,
    /// When the listing's first page is fetched again.
    pub seed_refresh: SeedRefresh,
    /// The page currently shown.
    pub route: Route,
    /// Listing selection and scroll offset.
    pub list_state: ListState,
    /// Vertical scroll of the detail view, in lines.
    pub detail_scroll: u16,
    /// Height of the listing viewport, refreshed on every draw.
    pub viewport_rows: usize,
    /// Rows from the end of the listing that trigger the next page.
    pub trigger_distance: usize,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    /// When the last page was merged.
    pub last_loaded: Option<DateTime<Utc>>,
    /// Network work waiting for the main loop.
    effects: Vec<Effect>,
}

impl App {
    pub fn new(feed: FeedLoader, details: DetailCache, trigger_distance: usize) -> Self {
        Self {
            feed,
            details,
            seed_refresh: SeedRefresh::default(),
            route: Route::Listing,
            list_state: ListState::default(),
            detail_scroll: 0,
            viewport_rows: 0,
            trigger_distance,
            quit: false,
            status: "Ready".into(),
            last_loaded: None,
            effects: Vec::new(),
        }
    }

    /// Drain the effects queued since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // -- feed ----------------------------------------------------------------

    /// Request the next page unless one is in flight or the feed is done.
    pub fn load_more(&mut self) {
        if let Some(request) = self.feed.begin_load() {
            self.status = format!("Loading page {}…", request.page);
            self.effects.push(Effect::LoadPage(request));
        }
    }

    /// Start a first-page refresh if one is due.  Called once per frame.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.seed_refresh.begin(now) {
            self.effects.push(Effect::RefreshFirstPage(self.feed.page_size()));
        }
    }

    /// Merge a refetched first page, keeping the selected article selected.
    fn apply_first_page(&mut self, result: FeedResult<Vec<Article>>, now: DateTime<Utc>) {
        let failed = result.is_err();
        let added = match result {
            Ok(batch) => self.feed.merge_first_page(batch),
            Err(e) => {
                tracing::warn!(error = %e, "error refreshing first page");
                0
            }
        };
        if added > 0 {
            if let Some(i) = self.list_state.selected() {
                self.list_state.select(Some(i + added));
            }
            self.last_loaded = Some(now);
            self.status = format!("Loaded {} from page {FIRST_PAGE}", articles(added));
        }
        let retry = failed || self.feed.state().items().is_empty();
        self.seed_refresh.complete(retry, now);
    }

    /// Scroll-proximity trigger, evaluated after every listing movement.
    fn on_scroll(&mut self) {
        if self.route != Route::Listing {
            return;
        }
        let viewport = Viewport::for_list(
            self.list_state.offset(),
            self.list_state.selected(),
            self.feed.state().items().len(),
            CARD_ROWS,
            self.viewport_rows,
        );
        if viewport.near_bottom(self.trigger_distance) {
            self.load_more();
        }
    }

    /// Apply a result reported by a fetch task.
    pub fn apply(&mut self, msg: FetchMsg) {
        match msg {
            FetchMsg::Page { request, result } => {
                match self.feed.complete_load(request, result) {
                    LoadOutcome::Appended { added, .. } => {
                        self.last_loaded = Some(Utc::now());
                        self.status =
                            format!("Loaded {} from page {}", articles(added), request.page);
                    }
                    LoadOutcome::Exhausted => {
                        self.status = "No more articles".into();
                    }
                    LoadOutcome::Failed => {
                        self.status = format!("Could not load page {}", request.page);
                    }
                    LoadOutcome::Skipped | LoadOutcome::Stale => {}
                }
            }
            FetchMsg::Article { id, result } => {
                if let Err(e) = &result {
                    self.status = format!("Could not load article #{id}: {e}");
                }
                self.details.complete_fetch(id, result, Utc::now());
            }
            FetchMsg::FirstPage { result } => self.apply_first_page(result, Utc::now()),
        }
    }

    // -- routes --------------------------------------------------------------

    /// Show article `id`, fetching it if it is missing or stale.
    pub fn open(&mut self, id: u64) {
        self.route = Route::Article(id);
        self.detail_scroll = 0;
        if self.details.begin_fetch(id, Utc::now()) {
            self.effects.push(Effect::LoadArticle(id));
        }
    }

    pub fn open_selected(&mut self) {
        if self.route != Route::Listing {
            return;
        }
        let id = self
            .list_state
            .selected()
            .and_then(|i| self.feed.state().items().get(i))
            .map(|a| a.id);
        if let Some(id) = id {
            self.open(id);
        }
    }

    /// Re-request the open article (no-op if a request is already running
    /// or the cached copy is fresh).
    pub fn retry(&mut self) {
        if let Route::Article(id) = self.route {
            self.open(id);
        }
    }

    pub fn back(&mut self) {
        self.route = Route::Listing;
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        match self.route {
            Route::Listing => {
                let len = self.feed.state().items().len();
                if len > 0 {
                    let i = match self.list_state.selected() {
                        Some(i) => (i + 1).min(len - 1),
                        None => 0,
                    };
                    self.list_state.select(Some(i));
                }
                self.on_scroll();
            }
            Route::Article(_) => self.detail_scroll = self.detail_scroll.saturating_add(1),
        }
    }

    pub fn select_previous(&mut self) {
        match self.route {
            Route::Listing => {
                if !self.feed.state().items().is_empty() {
                    let i = match self.list_state.selected() {
                        Some(i) => i.saturating_sub(1),
                        None => 0,
                    };
                    self.list_state.select(Some(i));
                }
                self.on_scroll();
            }
            Route::Article(_) => self.detail_scroll = self.detail_scroll.saturating_sub(1),
        }
    }

    /// Jump to the first article ("back to top").
    pub fn select_first(&mut self) {
        match self.route {
            Route::Listing => {
                if !self.feed.state().items().is_empty() {
                    self.list_state.select(Some(0));
                }
                self.on_scroll();
            }
            Route::Article(_) => self.detail_scroll = 0,
        }
    }

    pub fn select_last(&mut self) {
        if self.route != Route::Listing {
            return;
        }
        let len = self.feed.state().items().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
        self.on_scroll();
    }
}
