//! In-memory [`ArticleSource`] for tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Article, ArticleSource, FeedError, FeedResult};

/// Shorthand constructor: article `id` by author 1.
pub fn article(id: u64) -> Article {
    Article {
        id,
        title: format!("Post {id}"),
        body: format!("Body of post {id}"),
        author_id: 1,
    }
}

pub fn ids(items: &[Article]) -> Vec<u64> {
    items.iter().map(|a| a.id).collect()
}

/// Replays scripted page results in order and records every call.
///
/// Once the page script runs out, pages come back empty.  Articles added
/// with [`with_article`](Self::with_article) are served by id; ids marked
/// with [`failing_article`](Self::failing_article) fail with a 500.
#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<VecDeque<FeedResult<Vec<Article>>>>,
    page_calls: Mutex<Vec<(u32, u32)>>,
    articles: Mutex<HashMap<u64, Article>>,
    failing: Mutex<HashSet<u64>>,
    article_calls: Mutex<Vec<u64>>,
    index: Mutex<Option<FeedResult<Vec<Article>>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, result: FeedResult<Vec<Article>>) {
        self.pages.lock().unwrap().push_back(result);
    }

    pub fn with_article(self, article: Article) -> Self {
        self.articles.lock().unwrap().insert(article.id, article);
        self
    }

    pub fn failing_article(self, id: u64) -> Self {
        self.failing.lock().unwrap().insert(id);
        self
    }

    /// Result of the next `fetch_all` call (one-shot; later calls fail).
    pub fn with_index(self, result: FeedResult<Vec<Article>>) -> Self {
        *self.index.lock().unwrap() = Some(result);
        self
    }

    pub fn page_calls(&self) -> Vec<(u32, u32)> {
        self.page_calls.lock().unwrap().clone()
    }

    pub fn article_calls(&self) -> Vec<u64> {
        self.article_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_page(&self, page: u32, limit: u32) -> FeedResult<Vec<Article>> {
        self.page_calls.lock().unwrap().push((page, limit));
        self.pages.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_article(&self, id: u64) -> FeedResult<Option<Article>> {
        self.article_calls.lock().unwrap().push(id);
        if self.failing.lock().unwrap().contains(&id) {
            return Err(FeedError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(self.articles.lock().unwrap().get(&id).cloned())
    }

    async fn fetch_all(&self) -> FeedResult<Vec<Article>> {
        self.index
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(FeedError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)))
    }
}
