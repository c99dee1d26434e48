//! DomainObject - the closed set of objects a feed can contain.
//!
//! Every feed endpoint decodes into a `Vec<DomainObject>`. The item generator
//! matches exhaustively on this enum, so adding a variant is a compile error
//! everywhere a rendering decision must be made.

use super::activity::{Activity, Notification};
use super::identifiers::{
    ActivityId, AnnouncementId, ArtistInviteId, CategoryId, CommentId, EditorialId, PostId, UserId,
};
use super::post::{Comment, Post};
use super::promotion::{Announcement, ArtistInvite, Category, Editorial};
use super::user::User;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Any object a feed payload can contain, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainObject {
    Post(Post),
    Comment(Comment),
    User(User),
    Activity(Activity),
    Notification(Notification),
    Editorial(Editorial),
    ArtistInvite(ArtistInvite),
    Announcement(Announcement),
    Category(Category),
}

/// Server identity of a domain object, used to find every visual item
/// derived from the same object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKey {
    Post(PostId),
    Comment(CommentId),
    User(UserId),
    Activity(ActivityId),
    Editorial(EditorialId),
    ArtistInvite(ArtistInviteId),
    Announcement(AnnouncementId),
    Category(CategoryId),
}

impl DomainObject {
    /// Identity key of this object. A notification shares its activity's key.
    pub fn key(&self) -> ObjectKey {
        match self {
            DomainObject::Post(post) => ObjectKey::Post(post.id.clone()),
            DomainObject::Comment(comment) => ObjectKey::Comment(comment.id.clone()),
            DomainObject::User(user) => ObjectKey::User(user.id.clone()),
            DomainObject::Activity(activity) => ObjectKey::Activity(activity.id.clone()),
            DomainObject::Notification(n) => ObjectKey::Activity(n.activity.id.clone()),
            DomainObject::Editorial(editorial) => ObjectKey::Editorial(editorial.id.clone()),
            DomainObject::ArtistInvite(invite) => ObjectKey::ArtistInvite(invite.id.clone()),
            DomainObject::Announcement(a) => ObjectKey::Announcement(a.id.clone()),
            DomainObject::Category(category) => ObjectKey::Category(category.id.clone()),
        }
    }

    /// The post, if this object is one.
    pub fn as_post(&self) -> Option<&Post> {
        match self {
            DomainObject::Post(post) => Some(post),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKey::Post(id) => write!(f, "post:{id}"),
            ObjectKey::Comment(id) => write!(f, "comment:{id}"),
            ObjectKey::User(id) => write!(f, "user:{id}"),
            ObjectKey::Activity(id) => write!(f, "activity:{id}"),
            ObjectKey::Editorial(id) => write!(f, "editorial:{id}"),
            ObjectKey::ArtistInvite(id) => write!(f, "artist-invite:{id}"),
            ObjectKey::Announcement(id) => write!(f, "announcement:{id}"),
            ObjectKey::Category(id) => write!(f, "category:{id}"),
        }
    }
}
