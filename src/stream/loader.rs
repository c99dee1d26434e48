//! Paged loading of domain objects, with stale-response protection.
//!
//! Every initial load (or reload) starts a new *generation*. A response is
//! applied only if its generation is still the current one when it
//! arrives; otherwise it is discarded. A slow first request therefore can
//! never overwrite the result of a faster reload issued after it.

use super::context::FeedKind;
use crate::model::{DecodeError, DomainObject};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

/// Opaque position of the next page, as handed out by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    /// Wrap a cursor string as received.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Paging metadata of one response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    /// Cursor of the following page; `None` on the last page.
    #[serde(default)]
    pub next: Option<PageCursor>,
}

impl PagingInfo {
    pub fn last_page() -> Self {
        Self { next: None }
    }

    pub fn with_next(cursor: PageCursor) -> Self {
        Self { next: Some(cursor) }
    }

    /// No further page follows.
    pub fn is_last_page(&self) -> bool {
        self.next.is_none()
    }
}

/// Successful response of a [`DomainFetcher`].
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// One page of objects.
    Page {
        /// Objects in feed order.
        objects: Vec<DomainObject>,
        /// Where the next page starts.
        paging: PagingInfo,
    },
    /// The feed has no content at all.
    Empty,
}

/// Failure reported by a [`DomainFetcher`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure; retrying may succeed.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not authorized to load this feed")]
    Unauthorized,

    #[error("Malformed response: {0}")]
    Decode(#[from] DecodeError),
}

/// Backend collaborator supplying domain objects for a feed.
#[async_trait]
pub trait DomainFetcher: Send + Sync {
    /// Fetch the page at `cursor`, or the first page when `cursor` is `None`.
    async fn fetch(
        &self,
        kind: FeedKind,
        cursor: Option<&PageCursor>,
    ) -> Result<FetchOutcome, FetchError>;
}

/// Monotonic load-generation counter shared by everything loading one feed.
#[derive(Debug, Clone, Default)]
pub struct LoadGeneration(Arc<AtomicU64>);

/// Generation a request was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding every outstanding ticket.
    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Ticket for the current generation, without superseding it.
    pub fn current(&self) -> LoadTicket {
        LoadTicket(self.0.load(Ordering::SeqCst))
    }

    /// Whether no newer generation has begun since `ticket` was issued.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.0.load(Ordering::SeqCst) == ticket.0
    }
}

/// What a load produced.
#[derive(Debug, Clone)]
pub enum LoadResult {
    /// A page to apply.
    Loaded {
        /// Objects in feed order.
        objects: Vec<DomainObject>,
        /// Another page can be requested.
        has_more: bool,
    },
    /// The backend reported no content.
    Empty,
    /// A newer load started while this one was in flight; nothing to apply.
    Stale,
    /// The previous page was the last one.
    Exhausted,
}

#[derive(Debug, Default)]
struct PagingState {
    next: Option<PageCursor>,
    exhausted: bool,
}

/// Loads one feed page by page.
pub struct FeedLoader<F> {
    fetcher: F,
    kind: FeedKind,
    generation: LoadGeneration,
    paging: Mutex<PagingState>,
}

impl<F: DomainFetcher> FeedLoader<F> {
    /// Loader for `kind`, starting before the first page.
    pub fn new(fetcher: F, kind: FeedKind) -> Self {
        Self {
            fetcher,
            kind,
            generation: LoadGeneration::new(),
            paging: Mutex::new(PagingState::default()),
        }
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    /// Generation counter; clone it to supersede loads from elsewhere.
    pub fn generation(&self) -> &LoadGeneration {
        &self.generation
    }

    /// Whether another page may be requested.
    pub fn has_more(&self) -> bool {
        let paging = self.paging();
        !paging.exhausted && paging.next.is_some()
    }

    /// Load the first page, superseding any load in flight.
    pub async fn load_initial(&self) -> Result<LoadResult, FetchError> {
        let ticket = self.generation.begin();
        debug!(kind = %self.kind, ?ticket, "Initial load");
        let outcome = self.fetcher.fetch(self.kind, None).await;
        self.accept(ticket, outcome)
    }

    /// Load the page after the last one received.
    pub async fn load_next_page(&self) -> Result<LoadResult, FetchError> {
        let cursor = {
            let paging = self.paging();
            match (&paging.next, paging.exhausted) {
                (Some(cursor), false) => cursor.clone(),
                _ => return Ok(LoadResult::Exhausted),
            }
        };
        let ticket = self.generation.current();
        debug!(kind = %self.kind, cursor = cursor.as_str(), "Loading next page");
        let outcome = self.fetcher.fetch(self.kind, Some(&cursor)).await;
        self.accept(ticket, outcome)
    }

    fn accept(
        &self,
        ticket: LoadTicket,
        outcome: Result<FetchOutcome, FetchError>,
    ) -> Result<LoadResult, FetchError> {
        if !self.generation.is_current(ticket) {
            warn!(kind = %self.kind, ?ticket, "Discarding response from superseded load");
            return Ok(LoadResult::Stale);
        }
        let mut paging = self.paging();
        match outcome? {
            FetchOutcome::Page { objects, paging: info } => {
                let has_more = !info.is_last_page();
                paging.exhausted = !has_more;
                paging.next = info.next;
                debug!(count = objects.len(), has_more, "Page loaded");
                Ok(LoadResult::Loaded { objects, has_more })
            }
            FetchOutcome::Empty => {
                paging.exhausted = true;
                paging.next = None;
                Ok(LoadResult::Empty)
            }
        }
    }

    fn paging(&self) -> std::sync::MutexGuard<'_, PagingState> {
        self.paging.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Post, PostId, UserId};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn post(id: &str) -> DomainObject {
        DomainObject::Post(Post::new(
            PostId::new(id).expect("valid id"),
            UserId::new("u1").expect("valid id"),
            "2025-12-25T10:00:00Z".parse().expect("valid timestamp"),
        ))
    }

    /// Two pages, then the end.
    struct PagedFetcher;

    #[async_trait]
    impl DomainFetcher for PagedFetcher {
        async fn fetch(
            &self,
            _kind: FeedKind,
            cursor: Option<&PageCursor>,
        ) -> Result<FetchOutcome, FetchError> {
            Ok(match cursor.map(PageCursor::as_str) {
                None => FetchOutcome::Page {
                    objects: vec![post("p1"), post("p2")],
                    paging: PagingInfo::with_next(PageCursor::new("page-2")),
                },
                Some("page-2") => FetchOutcome::Page {
                    objects: vec![post("p3")],
                    paging: PagingInfo::last_page(),
                },
                Some(other) => return Err(FetchError::Network(format!("bad cursor {other}"))),
            })
        }
    }

    /// The first call is slow, later calls are fast.
    struct SlowFirstFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DomainFetcher for SlowFirstFetcher {
        async fn fetch(
            &self,
            _kind: FeedKind,
            _cursor: Option<&PageCursor>,
        ) -> Result<FetchOutcome, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = if call == 0 { 50 } else { 1 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(FetchOutcome::Page {
                objects: vec![post(&format!("call{call}"))],
                paging: PagingInfo::last_page(),
            })
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl DomainFetcher for FailingFetcher {
        async fn fetch(&self, _: FeedKind, _: Option<&PageCursor>) -> Result<FetchOutcome, FetchError> {
            Err(FetchError::Unauthorized)
        }
    }

    struct EmptyFetcher;

    #[async_trait]
    impl DomainFetcher for EmptyFetcher {
        async fn fetch(&self, _: FeedKind, _: Option<&PageCursor>) -> Result<FetchOutcome, FetchError> {
            Ok(FetchOutcome::Empty)
        }
    }

    #[test]
    fn begin_supersedes_earlier_tickets() {
        let generation = LoadGeneration::new();
        let first = generation.begin();
        assert!(generation.is_current(first));
        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
        assert_eq!(generation.current(), second);
    }

    #[tokio::test]
    async fn pages_until_exhausted() {
        let loader = FeedLoader::new(PagedFetcher, FeedKind::Following);

        let first = loader.load_initial().await.expect("first page");
        assert!(matches!(first, LoadResult::Loaded { ref objects, has_more: true } if objects.len() == 2));
        assert!(loader.has_more());

        let second = loader.load_next_page().await.expect("second page");
        assert!(matches!(second, LoadResult::Loaded { has_more: false, .. }));
        assert!(!loader.has_more());

        let third = loader.load_next_page().await.expect("no request made");
        assert!(matches!(third, LoadResult::Exhausted));
    }

    #[tokio::test]
    async fn reload_discards_slow_earlier_response() {
        let loader = FeedLoader::new(
            SlowFirstFetcher {
                calls: AtomicUsize::new(0),
            },
            FeedKind::Discover,
        );

        let (slow, fast) = tokio::join!(loader.load_initial(), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            loader.load_initial().await
        });

        assert!(matches!(slow, Ok(LoadResult::Stale)));
        match fast {
            Ok(LoadResult::Loaded { objects, .. }) => {
                assert_eq!(objects[0].key().to_string(), "post:call1");
            }
            other => panic!("expected fresh page, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let loader = FeedLoader::new(FailingFetcher, FeedKind::Following);
        assert_eq!(
            loader.load_initial().await.unwrap_err(),
            FetchError::Unauthorized
        );
    }

    #[tokio::test]
    async fn empty_feed_is_exhausted() {
        let loader = FeedLoader::new(EmptyFetcher, FeedKind::Loves);
        assert!(matches!(loader.load_initial().await, Ok(LoadResult::Empty)));
        assert!(!loader.has_more());
    }
}
