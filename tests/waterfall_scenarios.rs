//! Waterfall layout scenarios, rendered as text and snapshotted with insta.
//!
//! Each scenario lays out real visual items and renders one line per
//! placement, so a regression shows up as a readable diff.

use streamfeed::layout::{
    ColumnCount, Frame, PlacementRule, WaterfallConfig, WaterfallLayout, WaterfallLayoutEngine,
};
use streamfeed::model::{DomainObject, Post, PostId, Region, UserId};
use streamfeed::stream::{
    generate, FeedContext, FeedKind, Payload, SizeCalculationCoordinator, VisualItem, VisualType,
};

// ===== Test Helpers =====

fn engine(rule: PlacementRule, spacing: f64) -> WaterfallLayoutEngine {
    WaterfallLayoutEngine::new(WaterfallConfig {
        column_spacing: spacing,
        placement_rule: rule,
        chunk_size: 4,
    })
}

fn columns(n: usize) -> ColumnCount {
    ColumnCount::new(n).expect("non-zero column count")
}

fn sized(mut item: VisualItem, column_count: usize, height: f64) -> VisualItem {
    item.store_height(column_count, height);
    item
}

fn render(layout: &WaterfallLayout, items: &[VisualItem]) -> String {
    let mut lines: Vec<String> = layout
        .placements
        .iter()
        .map(|p| {
            format!(
                "#{} {:<16} col={} x={} y={} w={} h={}{}",
                p.index,
                items[p.index].visual_type().name(),
                p.column,
                p.frame.x,
                p.frame.y,
                p.frame.width,
                p.frame.height,
                if p.full_width { " full" } else { "" }
            )
        })
        .collect();
    lines.push(format!("content_height={}", layout.content_height));
    lines.join("\n")
}

fn grid_post(id: &str) -> DomainObject {
    let mut post = Post::new(
        PostId::new(id).expect("valid post id"),
        UserId::new("author").expect("valid user id"),
        "2025-12-25T10:00:00Z".parse().expect("valid timestamp"),
    );
    post.summary = vec![Region::text("hi")];
    DomainObject::Post(post)
}

// ===== Scenarios =====

#[test]
fn full_width_items_bracket_the_columns() {
    let items = vec![
        sized(VisualItem::new(Payload::Empty, VisualType::CategoryHeader), 2, 50.0),
        sized(VisualItem::spacer(0.0), 2, 100.0),
        sized(VisualItem::spacer(0.0), 2, 60.0),
        sized(VisualItem::spacer(0.0), 2, 30.0),
        sized(VisualItem::spacer(0.0), 2, 20.0),
        sized(VisualItem::loading_marker(), 2, 40.0),
    ];
    let layout = engine(PlacementRule::ShortestFirst, 0.0).layout(items.as_slice(), 300.0, columns(2));

    insta::assert_snapshot!(render(&layout, &items), @r"
    #0 category-header  col=0 x=0 y=0 w=300 h=50 full
    #1 spacer           col=0 x=0 y=50 w=150 h=100
    #2 spacer           col=1 x=150 y=50 w=150 h=60
    #3 spacer           col=1 x=150 y=110 w=150 h=30
    #4 spacer           col=1 x=150 y=140 w=150 h=20
    #5 loading-marker   col=0 x=0 y=160 w=300 h=40 full
    content_height=200
    ");

    assert_eq!(layout.items_in(&Frame::new(0.0, 100.0, 300.0, 20.0)), vec![1, 2, 3]);
    assert_eq!(layout.index.chunk_count(), 2);
}

#[tokio::test]
async fn grid_posts_keep_their_items_in_one_column() {
    let context = FeedContext::grid(FeedKind::Following, None);
    let mut items = generate(&[grid_post("p1"), grid_post("p2")], &context);
    SizeCalculationCoordinator::new(0.0)
        .calculate(&mut items, 300.0, 2)
        .await;

    let layout = engine(PlacementRule::ShortestFirst, 0.0).layout(items.as_slice(), 300.0, columns(2));

    insta::assert_snapshot!(render(&layout, &items), @r"
    #0 text             col=0 x=0 y=0 w=150 h=40
    #1 footer           col=0 x=0 y=40 w=150 h=44
    #2 spacer           col=0 x=0 y=84 w=150 h=10
    #3 text             col=1 x=150 y=0 w=150 h=40
    #4 footer           col=1 x=150 y=40 w=150 h=44
    #5 spacer           col=1 x=150 y=84 w=150 h=10
    content_height=94
    ");
}

#[test]
fn right_to_left_with_spacing() {
    let items: Vec<VisualItem> = (0..4)
        .map(|_| sized(VisualItem::spacer(10.0), 3, 10.0))
        .collect();
    let layout = engine(PlacementRule::RightToLeft, 10.0).layout(items.as_slice(), 310.0, columns(3));

    insta::assert_snapshot!(render(&layout, &items), @r"
    #0 spacer           col=2 x=212 y=0 w=96 h=10
    #1 spacer           col=1 x=106 y=0 w=96 h=10
    #2 spacer           col=0 x=0 y=0 w=96 h=10
    #3 spacer           col=2 x=212 y=10 w=96 h=10
    content_height=20
    ");
}
