mod memory;
mod postgres;

pub use memory::MemoryEntityStore;
pub use postgres::PgEntityStore;

use uuid::Uuid;

use crate::domain::{
    Comment, Like, LikeTarget, Playlist, Subscription, TargetKind, ToggleOutcome, Tweet, User,
    Video,
};
use crate::error::Result;
use crate::pagination::PageRequest;

/// Filter for video listings.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    /// Restrict to videos owned by any of these users
    pub owner_ids: Option<Vec<Uuid>>,
    /// Case-insensitive substring match on the title
    pub title_contains: Option<String>,
}

impl VideoFilter {
    pub fn owned_by(owner_ids: Vec<Uuid>) -> Self {
        Self {
            owner_ids: Some(owner_ids),
            title_contains: None,
        }
    }

    pub fn matches(&self, video: &Video) -> bool {
        let owner_ok = self
            .owner_ids
            .as_ref()
            .map_or(true, |owners| owners.contains(&video.owner_id));
        let title_ok = self.title_contains.as_ref().map_or(true, |needle| {
            video
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        owner_ok && title_ok
    }
}

/// Persistence contract for every collection the engagement engine touches.
///
/// Each method is a single atomic store operation. There are no
/// cross-collection transactions, so callers joining several collections must
/// tolerate read skew between them. Toggles and view recording are atomic with
/// respect to their natural key: concurrent identical calls never produce a
/// duplicate record.
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    // ---- users ----

    /// Fails with `Conflict` when the username or email is taken.
    async fn insert_user(&self, user: User) -> Result<User>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Resolve a user by username or email, preferring a username match.
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>>;

    /// Fetch several users; missing ids are skipped, order is unspecified.
    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    async fn user_exists(&self, id: Uuid) -> Result<bool>;

    // ---- videos ----

    async fn insert_video(&self, video: Video) -> Result<Video>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>>;

    /// Fetch several videos; missing ids are skipped, order is unspecified.
    async fn get_videos(&self, ids: &[Uuid]) -> Result<Vec<Video>>;

    async fn delete_video(&self, id: Uuid) -> Result<bool>;

    /// One page of matching videos plus the total number of matches.
    async fn list_videos(&self, filter: &VideoFilter, page: &PageRequest)
        -> Result<(Vec<Video>, u64)>;

    async fn video_ids_by_owner(&self, owner_id: Uuid) -> Result<Vec<Uuid>>;

    // ---- tweets & comments ----

    async fn insert_tweet(&self, tweet: Tweet) -> Result<Tweet>;

    /// All tweets authored by any of `owner_ids`, unordered.
    async fn tweets_by_owners(&self, owner_ids: &[Uuid]) -> Result<Vec<Tweet>>;

    async fn insert_comment(&self, comment: Comment) -> Result<Comment>;

    /// Whether the entity a like would point at exists.
    async fn like_target_exists(&self, target: &LikeTarget) -> Result<bool>;

    // ---- subscriptions ----

    /// Insert outside the toggle path. Fails with `Conflict` when the
    /// (subscriber, channel) pair already exists.
    async fn insert_subscription(&self, subscription: Subscription) -> Result<Subscription>;

    /// Atomically delete the subscription if present, create it otherwise.
    async fn toggle_subscription(&self, subscriber_id: Uuid, channel_id: Uuid)
        -> Result<ToggleOutcome>;

    /// Subscriptions held by `subscriber_id`, newest first.
    async fn subscriptions_of(&self, subscriber_id: Uuid) -> Result<Vec<Subscription>>;

    /// Subscribers of `channel_id`, newest first.
    async fn subscribers_of(&self, channel_id: Uuid) -> Result<Vec<Subscription>>;

    async fn count_subscribers(&self, channel_id: Uuid) -> Result<u64>;

    async fn is_subscribed(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool>;

    // ---- likes ----

    /// Atomically delete the like if present, create it otherwise.
    async fn toggle_like(&self, actor_id: Uuid, target: LikeTarget) -> Result<ToggleOutcome>;

    async fn has_liked(&self, actor_id: Uuid, target: &LikeTarget) -> Result<bool>;

    async fn count_likes(&self, target: &LikeTarget) -> Result<u64>;

    /// Total likes across all of `video_ids`.
    async fn count_likes_on_videos(&self, video_ids: &[Uuid]) -> Result<u64>;

    /// Likes given by `actor_id` on targets of `kind`, newest first.
    async fn likes_by_user(&self, actor_id: Uuid, kind: TargetKind) -> Result<Vec<Like>>;

    // ---- views ----

    /// Upsert the (viewer, video) view. Returns `true` only for the call that
    /// inserted it; that call also bumps the video's view counter and puts
    /// the video at the front of the viewer's watch history.
    async fn record_view(&self, viewer_id: Uuid, video_id: Uuid) -> Result<bool>;

    /// Delete the (viewer, video) view if present, decrementing the counter
    /// and dropping the video from the watch history. Returns whether a view
    /// was removed.
    async fn remove_view(&self, viewer_id: Uuid, video_id: Uuid) -> Result<bool>;

    async fn count_views(&self, video_id: Uuid) -> Result<u64>;

    /// Total views across all of `video_ids`.
    async fn count_views_on_videos(&self, video_ids: &[Uuid]) -> Result<u64>;

    // ---- playlists ----

    async fn insert_playlist(&self, playlist: Playlist) -> Result<Playlist>;

    async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>>;

    /// Playlists owned by `owner_id`, newest first.
    async fn playlists_by_owner(&self, owner_id: Uuid) -> Result<Vec<Playlist>>;

    /// Append `video_id` unless already present. Returns `false` for a
    /// duplicate, `NotFound` when the playlist does not exist.
    async fn add_video_to_playlist(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool>;

    /// Returns whether the video was in the playlist. `NotFound` when the
    /// playlist does not exist.
    async fn remove_video_from_playlist(&self, playlist_id: Uuid, video_id: Uuid)
        -> Result<bool>;

    async fn delete_playlist(&self, id: Uuid) -> Result<Option<Playlist>>;

    /// Liveness of the underlying storage.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
