//! Background fetching.
//!
//! Each request runs on its own tokio task and reports back to the UI thread
//! over an unbounded [`mpsc`] channel.  The UI thread is the only place that
//! applies results, so feed state never needs a lock.
//!
//! ## For contributors
//!
//! The dispatcher does no gating of its own: the feed loader decides whether
//! a page may be requested, the detail cache decides whether an article
//! needs fetching, and the seed schedule decides when the first page is
//! fetched again.  Only hand it [`Effect`]s those produced.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::feed::{Article, ArticleSource, FeedResult, PageRequest, FIRST_PAGE};

/// Network work requested by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    LoadPage(PageRequest),
    LoadArticle(u64),
    /// Fetch the first page again with this page size.
    RefreshFirstPage(u32),
}

/// Messages sent from fetch tasks to the UI thread.
#[derive(Debug)]
pub enum FetchMsg {
    Page {
        request: PageRequest,
        result: FeedResult<Vec<Article>>,
    },
    Article {
        id: u64,
        result: FeedResult<Option<Article>>,
    },
    FirstPage {
        result: FeedResult<Vec<Article>>,
    },
}

/// Spawns fetch tasks for [`Effect`]s.
pub struct Fetcher {
    source: Arc<dyn ArticleSource>,
    tx: mpsc::UnboundedSender<FetchMsg>,
}

impl Fetcher {
    /// Returns the dispatcher and the receiver the main loop should drain on
    /// every tick.
    pub fn new(source: Arc<dyn ArticleSource>) -> (Self, mpsc::UnboundedReceiver<FetchMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { source, tx }, rx)
    }

    /// Spawn a task for `effect`.  Must be called from within a tokio runtime.
    pub fn dispatch(&self, effect: Effect) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let msg = match effect {
                Effect::LoadPage(request) => FetchMsg::Page {
                    request,
                    result: source.fetch_page(request.page, request.limit).await,
                },
                Effect::LoadArticle(id) => FetchMsg::Article {
                    id,
                    result: source.fetch_article(id).await,
                },
                Effect::RefreshFirstPage(limit) => FetchMsg::FirstPage {
                    result: source.fetch_page(FIRST_PAGE, limit).await,
                },
            };
            // If the receiver is gone the UI has exited; drop the result.
            let _ = tx.send(msg);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::{article, ids, ScriptedSource};

    #[tokio::test]
    async fn page_effect_reports_page() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(vec![article(7), article(8)]));
        let (fetcher, mut rx) = Fetcher::new(source.clone());

        let request = PageRequest { page: 2, limit: 6 };
        fetcher.dispatch(Effect::LoadPage(request));

        match rx.recv().await.unwrap() {
            FetchMsg::Page { request: got, result } => {
                assert_eq!(got, request);
                assert_eq!(ids(&result.unwrap()), vec![7, 8]);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert_eq!(source.page_calls(), vec![(2, 6)]);
    }

    #[tokio::test]
    async fn refresh_effect_fetches_first_page() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(vec![article(1)]));
        let (fetcher, mut rx) = Fetcher::new(source.clone());

        fetcher.dispatch(Effect::RefreshFirstPage(6));

        match rx.recv().await.unwrap() {
            FetchMsg::FirstPage { result } => assert_eq!(ids(&result.unwrap()), vec![1]),
            other => panic!("unexpected message: {other:?}"),
        }
        assert_eq!(source.page_calls(), vec![(1, 6)]);
    }

    #[tokio::test]
    async fn article_effect_reports_article() {
        let source = Arc::new(ScriptedSource::new().with_article(article(3)));
        let (fetcher, mut rx) = Fetcher::new(source);

        fetcher.dispatch(Effect::LoadArticle(3));
        fetcher.dispatch(Effect::LoadArticle(4));

        let mut seen = Vec::new();
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                FetchMsg::Article { id, result } => seen.push((id, result.unwrap().is_some())),
                other => panic!("unexpected message: {other:?}"),
            }
        }
        seen.sort();
        assert_eq!(seen, vec![(3, true), (4, false)]);
    }
}
