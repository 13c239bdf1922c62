//! HTTP article source.
//!
//! Talks to any JSONPlaceholder-compatible API:
//!
//! | call             | request                                  |
//! |------------------|------------------------------------------|
//! | `fetch_page`     | `GET {base}/posts?_page={p}&_limit={n}`  |
//! | `fetch_article`  | `GET {base}/posts/{id}`                  |
//! | `fetch_all`      | `GET {base}/posts`                       |
//!
//! No request timeout is set: a request runs until the server answers or
//! the connection drops.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::{Article, ArticleSource, FeedError, FeedResult};

/// Articles served over HTTP as JSON.
pub struct HttpSource {
    client: Client,
    base_url: String,
    label: String,
}

impl HttpSource {
    /// Create a source rooted at `base_url` (trailing slashes are ignored).
    pub fn new(base_url: &str, label: impl Into<String>) -> FeedResult<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, label))
    }

    /// Create a source that sends requests through `client`.
    pub fn with_client(client: Client, base_url: &str, label: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            label: label.into(),
        }
    }

    pub fn page_url(&self, page: u32, limit: u32) -> String {
        format!("{}/posts?_page={page}&_limit={limit}", self.base_url)
    }

    pub fn article_url(&self, id: u64) -> String {
        format!("{}/posts/{id}", self.base_url)
    }

    pub fn index_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }

    /// Parse a JSON array of articles.
    ///
    /// Pure so that tests can exercise decoding without the network.
    pub fn parse_articles(body: &[u8]) -> FeedResult<Vec<Article>> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Parse a single JSON article.
    pub fn parse_article(body: &[u8]) -> FeedResult<Article> {
        Ok(serde_json::from_slice(body)?)
    }

    /// GET `url` and return the body, failing on any non-success status.
    async fn get_body(&self, url: &str) -> FeedResult<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ArticleSource for HttpSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_page(&self, page: u32, limit: u32) -> FeedResult<Vec<Article>> {
        let body = self.get_body(&self.page_url(page, limit)).await?;
        Self::parse_articles(&body)
    }

    async fn fetch_article(&self, id: u64) -> FeedResult<Option<Article>> {
        match self.get_body(&self.article_url(id)).await {
            Ok(body) => Self::parse_article(&body).map(Some),
            Err(FeedError::Status(StatusCode::NOT_FOUND)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_all(&self) -> FeedResult<Vec<Article>> {
        let body = self.get_body(&self.index_url()).await?;
        Self::parse_articles(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
