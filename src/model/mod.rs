//! Domain model types (pure).
//!
//! All types in this module are pure data decoded from feed endpoints.
//! Identifiers use smart constructors.

pub mod activity;
pub mod domain_object;
pub mod error;
pub mod identifiers;
pub mod post;
pub mod promotion;
pub mod region;
pub mod user;

// Re-export for convenience
pub use activity::{Activity, ActivityKind, ActivitySubject, Notification};
pub use domain_object::{DomainObject, ObjectKey};
pub use error::{DecodeError, FeedError, InputError};
pub use identifiers::{
    ActivityId, AnnouncementId, ArtistInviteId, CategoryId, CommentId, EditorialId, InvalidId,
    PostId, UserId,
};
pub use post::{Comment, Post};
pub use promotion::{Announcement, ArtistInvite, Category, Editorial, EditorialKind};
pub use region::{Region, RegionKind};
pub use user::User;
