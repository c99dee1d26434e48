//! Notification activities.
//!
//! The notifications endpoint returns raw activities; only the kinds listed in
//! [`ActivityKind::is_notification`] are shown, wrapped in a [`Notification`].

use super::identifiers::{ActivityId, UserId};
use super::post::{Comment, Post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity kind as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    CommentNotification,
    CommentMentionNotification,
    PostMentionNotification,
    RepostNotification,
    LoveNotification,
    WatchNotification,
    NewFollowerPost,
    InvitationAcceptedPost,
    ApprovedArtistInviteSubmission,
    /// Activities the client does not display (own posts, own comments, …).
    OwnPost,
    /// Any kind added after this client was built.
    #[serde(other)]
    Unknown,
}

impl ActivityKind {
    /// Whether this kind is rendered in the notifications feed.
    pub fn is_notification(self) -> bool {
        !matches!(self, ActivityKind::OwnPost | ActivityKind::Unknown)
    }
}

/// What an activity refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivitySubject {
    Post(Post),
    Comment(Comment),
    User { id: UserId },
}

/// Something that happened involving the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub kind: ActivityKind,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub subject: Option<ActivitySubject>,
}

/// An activity accepted for display in the notifications feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub activity: Activity,
}

impl Notification {
    /// Wraps the activity if its kind is displayable.
    pub fn from_activity(activity: &Activity) -> Option<Self> {
        activity.kind.is_notification().then(|| Self {
            activity: activity.clone(),
        })
    }

    /// Text preview of the subject, used for size estimation.
    pub fn preview_len(&self) -> usize {
        let regions = match &self.activity.subject {
            Some(ActivitySubject::Post(post)) => &post.summary,
            Some(ActivitySubject::Comment(comment)) => &comment.content,
            _ => return 0,
        };
        regions.iter().map(|r| r.text_len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(kind: ActivityKind) -> Activity {
        Activity {
            id: ActivityId::new("a1").expect("valid activity id"),
            kind,
            created_at: "2025-12-25T10:00:00Z".parse().expect("valid timestamp"),
            subject: None,
        }
    }

    #[test]
    fn love_notification_is_wrapped() {
        let wrapped = Notification::from_activity(&activity(ActivityKind::LoveNotification));
        assert!(wrapped.is_some());
    }

    #[test]
    fn own_post_is_dropped() {
        assert!(Notification::from_activity(&activity(ActivityKind::OwnPost)).is_none());
    }

    #[test]
    fn unknown_kind_decodes_and_is_dropped() {
        let kind: ActivityKind =
            serde_json::from_str("\"friend_post\"").expect("unknown kinds still decode");
        assert_eq!(kind, ActivityKind::Unknown);
        assert!(!kind.is_notification());
    }

    #[test]
    fn preview_len_without_subject_is_zero() {
        let notification = Notification {
            activity: activity(ActivityKind::WatchNotification),
        };
        assert_eq!(notification.preview_len(), 0);
    }
}
