//! Integration tests: loader → generator → sizing → store → queue → layout.

use async_trait::async_trait;
use streamfeed::config::ResolvedConfig;
use streamfeed::integration::{FeedPipeline, HeadlessSurface};
use streamfeed::layout::ColumnCount;
use streamfeed::model::{DomainObject, FeedError, Post, PostId, Region, User, UserId};
use streamfeed::source::decode_payload;
use streamfeed::stream::{
    DomainFetcher, FeedContext, FeedKind, FeedLoader, FetchError, FetchOutcome, LoadResult,
    PageCursor, PagingInfo, PlaceholderType, VisualItem, VisualType,
};

// ===== Test Helpers =====

fn post(id: &str, author: &str) -> Post {
    let mut post = Post::new(
        PostId::new(id).expect("valid post id"),
        UserId::new(author).expect("valid user id"),
        "2025-12-25T10:00:00Z".parse().expect("valid timestamp"),
    );
    post.content = vec![Region::text("hello")];
    post
}

fn names(pipeline: &FeedPipeline<HeadlessSurface>) -> Vec<&'static str> {
    pipeline
        .store()
        .visible_items()
        .map(|item| item.visual_type().name())
        .collect()
}

fn config(columns: usize) -> ResolvedConfig {
    ResolvedConfig {
        column_count: ColumnCount::new(columns).expect("non-zero column count"),
        column_spacing: 0.0,
        ..ResolvedConfig::default()
    }
}

/// Two pages of posts, then the end.
struct TwoPages;

#[async_trait]
impl DomainFetcher for TwoPages {
    async fn fetch(
        &self,
        _kind: FeedKind,
        cursor: Option<&PageCursor>,
    ) -> Result<FetchOutcome, FetchError> {
        match cursor.map(PageCursor::as_str) {
            None => Ok(FetchOutcome::Page {
                objects: vec![
                    DomainObject::Post(post("p1", "ann")),
                    DomainObject::Post(post("p2", "bob")),
                ],
                paging: PagingInfo::with_next(PageCursor::new("2")),
            }),
            Some("2") => Ok(FetchOutcome::Page {
                objects: vec![DomainObject::Post(post("p3", "ann"))],
                paging: PagingInfo::last_page(),
            }),
            Some(other) => Err(FetchError::Network(format!("unexpected cursor {other}"))),
        }
    }
}

struct Unauthorized;

#[async_trait]
impl DomainFetcher for Unauthorized {
    async fn fetch(&self, _: FeedKind, _: Option<&PageCursor>) -> Result<FetchOutcome, FetchError> {
        Err(FetchError::Unauthorized)
    }
}

// ===== Paging =====

#[tokio::test]
async fn paged_feed_fills_then_appends() {
    let loader = FeedLoader::new(TwoPages, FeedKind::Following);
    let mut pipeline = FeedPipeline::new(
        FeedContext::list(FeedKind::Following, None),
        HeadlessSurface::default(),
        &config(2),
        375.0,
    );
    pipeline.show_loading().await.expect("loading marker shown");

    let first = loader.load_initial().await.expect("first page");
    pipeline
        .apply_load(first, true)
        .await
        .expect("job enqueued")
        .await
        .expect("first page applied");
    assert!(loader.has_more());
    assert_eq!(pipeline.store().len(), 8);

    let second = loader.load_next_page().await.expect("second page");
    pipeline
        .apply_load(second, false)
        .await
        .expect("job enqueued")
        .await
        .expect("second page applied");
    assert!(!loader.has_more());
    assert!(matches!(
        loader.load_next_page().await,
        Ok(LoadResult::Exhausted)
    ));

    assert_eq!(pipeline.store().len(), 12);
    assert_eq!(
        names(&pipeline)[..4],
        ["header", "text", "footer", "spacer"]
    );

    // List mode: one column, each post is header 60 + text 40 + footer 44 + spacer 10.
    let layout = pipeline.layout();
    assert!(layout.placements.iter().all(|p| p.column == 0));
    assert_eq!(layout.content_height, 3.0 * 154.0);

    let surface = pipeline.shutdown().await.expect("worker stops");
    assert_eq!(surface.items().len(), 12);
    assert_eq!(surface.reloads(), 1);
    assert_eq!(surface.diffs().len(), 2);
}

#[tokio::test]
async fn fetch_errors_convert_into_feed_error() {
    async fn load(loader: &FeedLoader<Unauthorized>) -> Result<LoadResult, FeedError> {
        Ok(loader.load_initial().await?)
    }

    let loader = FeedLoader::new(Unauthorized, FeedKind::Loves);
    let err = load(&loader).await.expect_err("unauthorized");
    assert!(matches!(err, FeedError::Fetch(FetchError::Unauthorized)));
}

// ===== Feed kinds =====

#[tokio::test]
async fn discover_grid_shows_each_users_latest_post() {
    let mut older = post("old", "ann");
    older.created_at = "2025-01-01T00:00:00Z".parse().expect("valid timestamp");
    let mut ann = User::new(UserId::new("ann").expect("valid user id"), "ann");
    ann.posts = vec![older, post("new", "ann")];
    let silent = User::new(UserId::new("zed").expect("valid user id"), "zed");

    let mut pipeline = FeedPipeline::new(
        FeedContext::grid(FeedKind::Discover, None),
        HeadlessSurface::default(),
        &config(2),
        300.0,
    );
    pipeline
        .fill_placeholder(
            PlaceholderType::StreamItems,
            &[DomainObject::User(ann), DomainObject::User(silent)],
        )
        .await
        .await
        .expect("applied");

    assert_eq!(names(&pipeline), vec!["text", "footer", "spacer"]);
    let key = pipeline
        .store()
        .visible_item(0)
        .and_then(|item| item.payload().key())
        .expect("post payload");
    assert_eq!(key.to_string(), "post:new");

    let layout = pipeline.layout();
    assert!(layout.placements.iter().all(|p| p.column == 0));
    assert_eq!(layout.column_width, 150.0);
    pipeline.shutdown().await.expect("worker stops");
}

#[tokio::test]
async fn decoded_payload_respects_blocked_authors() {
    let objects = decode_payload(
        r#"[
            {"type": "post", "id": "p1", "author_id": "troll", "created_at": "2025-12-27T10:00:00Z",
             "content": [{"kind": "text", "text": "spam"}]},
            {"type": "post", "id": "p2", "author_id": "friend", "created_at": "2025-12-27T11:00:00Z",
             "content": [{"kind": "text", "text": "hi"}]}
        ]"#,
    )
    .expect("payload decodes");

    let viewer = UserId::new("me").expect("valid user id");
    let context = FeedContext::list(FeedKind::Following, Some(viewer))
        .with_blocked([UserId::new("troll").expect("valid user id")]);
    let mut pipeline = FeedPipeline::new(context, HeadlessSurface::default(), &config(2), 375.0);
    pipeline
        .fill_placeholder(PlaceholderType::StreamItems, &objects)
        .await
        .await
        .expect("applied");

    let authors: Vec<String> = pipeline
        .store()
        .visible_items()
        .filter_map(|item| item.payload().post().map(|p| p.author_id.to_string()))
        .collect();
    assert!(!authors.is_empty());
    assert!(authors.iter().all(|author| author == "friend"));
    pipeline.shutdown().await.expect("worker stops");
}

// ===== Filters =====

#[tokio::test]
async fn filters_hide_items_but_keep_empty_marker() {
    let mut pipeline = FeedPipeline::new(
        FeedContext::list(FeedKind::Search, None),
        HeadlessSurface::default(),
        &config(1),
        375.0,
    );
    pipeline
        .fill_placeholder(PlaceholderType::StreamItems, &[])
        .await
        .await
        .expect("applied");
    pipeline
        .set_secondary_filter(Some(Box::new(|_: &VisualItem| false)))
        .await
        .expect("applied");

    assert_eq!(pipeline.store().len(), 1);
    assert_eq!(
        pipeline.store().visible_item(0).map(VisualItem::visual_type),
        Some(&VisualType::EmptyStream)
    );
    pipeline.shutdown().await.expect("worker stops");
}
