use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// User entity. A user acts as a channel when viewed as a publisher.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    /// Most recently watched first, no duplicates
    #[sqlx(skip)]
    pub watch_history: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            display_name: display_name.into(),
            avatar_ref: None,
            watch_history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Move `video_id` to the front of the watch history.
    pub fn remember_watched(&mut self, video_id: Uuid) {
        self.watch_history.retain(|id| *id != video_id);
        self.watch_history.insert(0, video_id);
    }

    pub fn forget_watched(&mut self, video_id: Uuid) {
        self.watch_history.retain(|id| *id != video_id);
    }
}

/// Public projection of a user in its channel capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_ref: Option<String>,
}

impl From<&User> for ChannelSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            avatar_ref: user.avatar_ref.clone(),
        }
    }
}

/// Video entity.
///
/// `view_count` caches the number of View records for the video and is only
/// ever changed by the store's view recording operations.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub media_ref: String,
    pub thumbnail_ref: String,
    pub duration_seconds: i32,
    pub view_count: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Video {
    pub fn new(owner_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            description: String::new(),
            media_ref: String::new(),
            thumbnail_ref: String::new(),
            duration_seconds: 0,
            view_count: 0,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Tweet {
    pub fn new(owner_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub video_id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(video_id: Uuid, owner_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            video_id,
            owner_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Subscription of `subscriber_id` to the channel `channel_id`.
/// Unique per (subscriber_id, channel_id).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(subscriber_id: Uuid, channel_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            subscriber_id,
            channel_id,
            created_at: Utc::now(),
        }
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Kind of entity a like points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Video,
    Comment,
    Tweet,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Video => "video",
            TargetKind::Comment => "comment",
            TargetKind::Tweet => "tweet",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(TargetKind::Video),
            "comment" => Ok(TargetKind::Comment),
            "tweet" => Ok(TargetKind::Tweet),
            other => Err(AppError::InvalidTarget(format!(
                "unknown target kind '{}'",
                other
            ))),
        }
    }
}

/// Exactly one liked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "targetKind", content = "targetId", rename_all = "lowercase")]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    pub fn new(kind: TargetKind, id: Uuid) -> Self {
        match kind {
            TargetKind::Video => LikeTarget::Video(id),
            TargetKind::Comment => LikeTarget::Comment(id),
            TargetKind::Tweet => LikeTarget::Tweet(id),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            LikeTarget::Video(_) => TargetKind::Video,
            LikeTarget::Comment(_) => TargetKind::Comment,
            LikeTarget::Tweet(_) => TargetKind::Tweet,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub liked_by: Uuid,
    #[serde(flatten)]
    pub target: LikeTarget,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(liked_by: Uuid, target: LikeTarget) -> Self {
        Self {
            id: Uuid::new_v4(),
            liked_by,
            target,
            created_at: Utc::now(),
        }
    }
}

/// A user's first watch of a video. Unique per (viewer_id, video_id).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: Uuid,
    pub viewer_id: Uuid,
    pub video_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl View {
    pub fn new(viewer_id: Uuid, video_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            viewer_id,
            video_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    /// Insertion order, no duplicates
    #[sqlx(skip)]
    pub videos: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    pub fn new(owner_id: Uuid, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            description: description.into(),
            videos: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Pre-image and post-image of a toggled relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub was_active: bool,
    pub is_active: bool,
}

impl ToggleOutcome {
    pub fn activated() -> Self {
        Self {
            was_active: false,
            is_active: true,
        }
    }

    pub fn deactivated() -> Self {
        Self {
            was_active: true,
            is_active: false,
        }
    }
}
