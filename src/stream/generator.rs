//! Item generation - domain objects to ordered visual items.
//!
//! [`generate`] is total and pure: objects it does not know how to render
//! produce no items, and identical inputs produce structurally identical
//! output (item ids are fresh on every call).
//!
//! # Post expansion
//!
//! ```text
//! [header]            list mode only
//! [toggle]            post is collapsed
//! [repost-header]     list mode, reposts only
//! region*             see below
//! footer
//! [create-comment]    list mode, comments open, signed-in viewer
//! spacer
//! ```
//!
//! Regions: grid cards show the post's summary (for a repost, the
//! reposter's own summary only). List mode shows the full body; for a
//! repost, the reposted content first and then what the reposter added.

use super::context::{FeedContext, FeedKind};
use super::item::{InteractionState, PlaceholderType, VisualItem, VisualType};
use crate::model::{Comment, DomainObject, Notification, Post, Region};
use std::sync::Arc;

/// Height of the spacer emitted after every post.
pub const POST_SPACER_HEIGHT: f64 = 10.0;

/// Expand domain objects into visual items for the given feed.
pub fn generate(objects: &[DomainObject], context: &FeedContext) -> Vec<VisualItem> {
    let mut items = Vec::new();
    for object in visible_objects(objects, context) {
        expand_object(&object, context, &mut items);
    }
    items
        .into_iter()
        .map(|item| item.with_force_grid(context.force_grid()))
        .collect()
}

/// Generate items for a placeholder region, tagging each with the region.
pub fn generate_for_placeholder(
    objects: &[DomainObject],
    context: &FeedContext,
    placeholder: PlaceholderType,
) -> Vec<VisualItem> {
    generate(objects, context)
        .into_iter()
        .map(|item| item.with_placeholder(placeholder))
        .collect()
}

/// Feed-kind visibility rules, applied before expansion.
///
/// - Discover: a user stands in for their most recent post (dropped when they have none).
/// - Notifications: raw activities become notifications; undisplayable kinds are dropped.
/// - Everywhere: posts by authors the viewer blocked are dropped.
fn visible_objects(objects: &[DomainObject], context: &FeedContext) -> Vec<Arc<DomainObject>> {
    objects
        .iter()
        .filter_map(|object| match (context.kind(), object) {
            (FeedKind::Discover, DomainObject::User(user)) => user
                .most_recent_post()
                .map(|post| DomainObject::Post(post.clone())),
            (FeedKind::Notifications, DomainObject::Activity(activity)) => {
                Notification::from_activity(activity).map(DomainObject::Notification)
            }
            (FeedKind::Notifications, DomainObject::Notification(notification))
                if !notification.activity.kind.is_notification() =>
            {
                None
            }
            _ => Some(object.clone()),
        })
        .filter(|object| {
            object
                .as_post()
                .map_or(true, |post| !context.hides_author(&post.author_id))
        })
        .map(Arc::new)
        .collect()
}

fn expand_object(object: &Arc<DomainObject>, context: &FeedContext, out: &mut Vec<VisualItem>) {
    match object.as_ref() {
        DomainObject::Post(post) => expand_post(object, post, context, out),
        DomainObject::Comment(comment) => expand_comment(object, comment, out),
        DomainObject::User(_) => out.push(VisualItem::for_object(object, VisualType::UserListItem)),
        DomainObject::Notification(_) => {
            out.push(VisualItem::for_object(object, VisualType::Notification))
        }
        DomainObject::Editorial(_) => out.push(VisualItem::for_object(object, VisualType::Editorial)),
        DomainObject::ArtistInvite(_) => {
            out.push(VisualItem::for_object(object, VisualType::ArtistInvite))
        }
        DomainObject::Announcement(_) => {
            out.push(VisualItem::for_object(object, VisualType::Announcement))
        }
        DomainObject::Category(_) => {
            out.push(VisualItem::for_object(object, VisualType::CategoryHeader))
        }
        // Raw activities only render inside the notifications feed, as notifications.
        DomainObject::Activity(_) => {}
    }
}

fn expand_post(
    object: &Arc<DomainObject>,
    post: &Post,
    context: &FeedContext,
    out: &mut Vec<VisualItem>,
) {
    let content_state = if post.collapsed {
        InteractionState::Collapsed
    } else {
        InteractionState::None
    };
    let content_item =
        |visual_type: VisualType| VisualItem::for_object(object, visual_type).with_state(content_state);
    let grid = context.is_grid();

    if !grid {
        out.push(content_item(VisualType::Header));
    }
    if post.collapsed {
        out.push(content_item(VisualType::Toggle));
    }

    if grid {
        let summary = if post.summary.is_empty() && !post.is_repost() {
            &post.content
        } else {
            &post.summary
        };
        push_regions(summary, false, &content_item, out);
    } else if post.is_repost() {
        out.push(content_item(VisualType::RepostHeader));
        push_regions(&post.repost_content, true, &content_item, out);
        push_regions(&post.content, false, &content_item, out);
    } else {
        push_regions(&post.content, false, &content_item, out);
    }

    let footer_state = if post.comments_open {
        InteractionState::Expanded
    } else {
        InteractionState::None
    };
    out.push(VisualItem::for_object(object, VisualType::Footer).with_state(footer_state));

    if !grid && post.comments_open && context.viewer().is_some() {
        out.push(VisualItem::for_object(object, VisualType::CreateComment));
    }

    out.push(VisualItem::for_object(
        object,
        VisualType::Spacer {
            height: POST_SPACER_HEIGHT,
        },
    ));
}

fn expand_comment(object: &Arc<DomainObject>, comment: &Comment, out: &mut Vec<VisualItem>) {
    out.push(VisualItem::for_object(object, VisualType::CommentHeader));
    let item = |visual_type: VisualType| VisualItem::for_object(object, visual_type);
    push_regions(&comment.content, false, &item, out);
}

fn push_regions(
    regions: &[Region],
    reposted: bool,
    make_item: &dyn Fn(VisualType) -> VisualItem,
    out: &mut Vec<VisualItem>,
) {
    out.extend(
        regions
            .iter()
            .filter_map(|region| VisualType::for_region(region, reposted))
            .map(make_item),
    );
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;
