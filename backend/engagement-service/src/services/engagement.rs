use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ensure_actor, ensure_channel, with_deadline};
use crate::config::EngagementConfig;
use crate::domain::{ChannelSummary, LikeTarget, TargetKind, Video};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::repository::EntityStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub was_liked: bool,
    pub liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionToggle {
    pub was_subscribed: bool,
    pub subscribed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub is_new: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub liked: bool,
    pub likes_on_video: u64,
}

/// A video from the viewer's history with the channel that published it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedVideo {
    #[serde(flatten)]
    pub video: Video,
    /// `None` when the publishing user no longer exists
    pub owner: Option<ChannelSummary>,
}

/// Likes, subscriptions and views: at most one record per natural key, with
/// the video view counter kept equal to the number of View records.
#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn EntityStore>,
    settings: EngagementConfig,
}

impl EngagementService {
    pub fn new(store: Arc<dyn EntityStore>, settings: EngagementConfig) -> Self {
        Self { store, settings }
    }

    /// Flip the actor's like on `target`. Not idempotent: a retry flips again.
    pub async fn toggle_like(&self, actor_id: Uuid, target: LikeTarget) -> Result<LikeToggle> {
        with_deadline(self.settings.request_timeout(), async {
            ensure_actor(self.store.as_ref(), actor_id).await?;
            if !self.store.like_target_exists(&target).await? {
                return Err(AppError::InvalidTarget(format!(
                    "{} {} does not exist",
                    target.kind(),
                    target.id()
                )));
            }

            let outcome = self.store.toggle_like(actor_id, target).await?;
            metrics::record_toggle("like", outcome.is_active);
            info!(user_id = %actor_id, ?target, liked = outcome.is_active, "like toggled");

            Ok(LikeToggle {
                was_liked: outcome.was_active,
                liked: outcome.is_active,
            })
        })
        .await
    }

    pub async fn toggle_subscription(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<SubscriptionToggle> {
        with_deadline(self.settings.request_timeout(), async {
            ensure_actor(self.store.as_ref(), subscriber_id).await?;
            if subscriber_id == channel_id && !self.settings.allow_self_subscription {
                return Err(AppError::InvalidArgument(
                    "cannot subscribe to your own channel".to_string(),
                ));
            }
            ensure_channel(self.store.as_ref(), channel_id).await?;

            let outcome = self
                .store
                .toggle_subscription(subscriber_id, channel_id)
                .await?;
            metrics::record_toggle("subscription", outcome.is_active);
            info!(
                user_id = %subscriber_id,
                channel_id = %channel_id,
                subscribed = outcome.is_active,
                "subscription toggled"
            );

            Ok(SubscriptionToggle {
                was_subscribed: outcome.was_active,
                subscribed: outcome.is_active,
            })
        })
        .await
    }

    /// Record that `viewer_id` watched `video_id`. Only the first call for the
    /// pair counts.
    pub async fn record_view(&self, viewer_id: Uuid, video_id: Uuid) -> Result<ViewRecord> {
        with_deadline(self.settings.request_timeout(), async {
            ensure_actor(self.store.as_ref(), viewer_id).await?;
            if self.store.get_video(video_id).await?.is_none() {
                return Err(AppError::NotFound("Video".to_string()));
            }

            let is_new = self.store.record_view(viewer_id, video_id).await?;
            metrics::record_view(if is_new { "new" } else { "repeat" });
            debug!(user_id = %viewer_id, video_id = %video_id, is_new, "view recorded");

            Ok(ViewRecord { is_new })
        })
        .await
    }

    /// Drop the viewer's view of `video_id`, decrementing the view counter.
    pub async fn remove_view(&self, viewer_id: Uuid, video_id: Uuid) -> Result<()> {
        with_deadline(self.settings.request_timeout(), async {
            ensure_actor(self.store.as_ref(), viewer_id).await?;
            if !self.store.remove_view(viewer_id, video_id).await? {
                return Err(AppError::ViewNotFound);
            }

            metrics::record_view("removed");
            debug!(user_id = %viewer_id, video_id = %video_id, "view removed");
            Ok(())
        })
        .await
    }

    /// Number of View records for a video, recomputed rather than read from
    /// the cached counter.
    pub async fn video_view_count(&self, video_id: Uuid) -> Result<u64> {
        with_deadline(self.settings.request_timeout(), async {
            if self.store.get_video(video_id).await?.is_none() {
                return Err(AppError::NotFound("Video".to_string()));
            }
            self.store.count_views(video_id).await
        })
        .await
    }

    pub async fn like_status(&self, actor_id: Uuid, video_id: Uuid) -> Result<LikeStatus> {
        with_deadline(self.settings.request_timeout(), async {
            if self.store.get_video(video_id).await?.is_none() {
                return Err(AppError::NotFound("Video".to_string()));
            }

            let target = LikeTarget::Video(video_id);
            let (liked, likes_on_video) = futures::try_join!(
                self.store.has_liked(actor_id, &target),
                self.store.count_likes(&target),
            )?;

            Ok(LikeStatus {
                liked,
                likes_on_video,
            })
        })
        .await
    }

    /// Videos the actor has liked, most recently liked first. Likes pointing
    /// at deleted videos are skipped.
    pub async fn liked_videos(&self, actor_id: Uuid) -> Result<Vec<Video>> {
        with_deadline(self.settings.request_timeout(), async {
            ensure_actor(self.store.as_ref(), actor_id).await?;

            let likes = self.store.likes_by_user(actor_id, TargetKind::Video).await?;
            let ids: Vec<Uuid> = likes.iter().map(|like| like.target.id()).collect();

            let mut by_id: HashMap<Uuid, Video> = self
                .store
                .get_videos(&ids)
                .await?
                .into_iter()
                .map(|video| (video.id, video))
                .collect();

            Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
        })
        .await
    }

    /// The actor's watch history, most recently watched first. Videos deleted
    /// since they were watched are skipped.
    pub async fn watch_history(&self, actor_id: Uuid) -> Result<Vec<WatchedVideo>> {
        with_deadline(self.settings.request_timeout(), async {
            let actor = self
                .store
                .get_user(actor_id)
                .await?
                .ok_or_else(|| AppError::Unauthorized(format!("unknown user {}", actor_id)))?;

            let mut videos: HashMap<Uuid, Video> = self
                .store
                .get_videos(&actor.watch_history)
                .await?
                .into_iter()
                .map(|video| (video.id, video))
                .collect();
            let owner_ids: Vec<Uuid> = videos
                .values()
                .map(|video| video.owner_id)
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            let owners: HashMap<Uuid, ChannelSummary> = self
                .store
                .get_users(&owner_ids)
                .await?
                .iter()
                .map(|user| (user.id, ChannelSummary::from(user)))
                .collect();

            Ok(actor
                .watch_history
                .iter()
                .filter_map(|id| videos.remove(id))
                .map(|video| WatchedVideo {
                    owner: owners.get(&video.owner_id).cloned(),
                    video,
                })
                .collect())
        })
        .await
    }

    /// Subscriber ids of a channel, newest subscription first.
    pub async fn channel_subscribers(&self, channel_id: Uuid) -> Result<Vec<Uuid>> {
        with_deadline(self.settings.request_timeout(), async {
            ensure_channel(self.store.as_ref(), channel_id).await?;
            let subscriptions = self.store.subscribers_of(channel_id).await?;
            Ok(subscriptions.into_iter().map(|s| s.subscriber_id).collect())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Comment, Tweet, User};
    use crate::repository::MemoryEntityStore;

    struct Fixture {
        store: Arc<MemoryEntityStore>,
        service: EngagementService,
        viewer: User,
        channel: User,
        video: Video,
    }

    async fn fixture(settings: EngagementConfig) -> Fixture {
        let store = Arc::new(MemoryEntityStore::new());
        let viewer = store
            .insert_user(User::new("viewer", "viewer@example.com", "Viewer"))
            .await
            .unwrap();
        let channel = store
            .insert_user(User::new("channel", "channel@example.com", "Channel"))
            .await
            .unwrap();
        let video = store
            .insert_video(Video::new(channel.id, "first upload"))
            .await
            .unwrap();
        let service = EngagementService::new(store.clone(), settings);

        Fixture {
            store,
            service,
            viewer,
            channel,
            video,
        }
    }

    #[tokio::test]
    async fn record_view_twice_counts_once() {
        let f = fixture(EngagementConfig::default()).await;

        let first = f.service.record_view(f.viewer.id, f.video.id).await.unwrap();
        let second = f.service.record_view(f.viewer.id, f.video.id).await.unwrap();

        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(f.store.view_records(f.viewer.id, f.video.id), 1);
        let video = f.store.get_video(f.video.id).await.unwrap().unwrap();
        assert_eq!(video.view_count, 1);
        let viewer = f.store.get_user(f.viewer.id).await.unwrap().unwrap();
        assert_eq!(viewer.watch_history, vec![f.video.id]);
    }

    #[tokio::test]
    async fn remove_view_decrements_and_forgets() {
        let f = fixture(EngagementConfig::default()).await;
        f.service.record_view(f.viewer.id, f.video.id).await.unwrap();

        f.service.remove_view(f.viewer.id, f.video.id).await.unwrap();

        let video = f.store.get_video(f.video.id).await.unwrap().unwrap();
        assert_eq!(video.view_count, 0);
        assert_eq!(f.service.video_view_count(f.video.id).await.unwrap(), 0);
        let viewer = f.store.get_user(f.viewer.id).await.unwrap().unwrap();
        assert!(viewer.watch_history.is_empty());

        let again = f.service.remove_view(f.viewer.id, f.video.id).await;
        assert!(matches!(again, Err(AppError::ViewNotFound)));
    }

    #[tokio::test]
    async fn record_view_on_missing_video_is_not_found() {
        let f = fixture(EngagementConfig::default()).await;
        let result = f.service.record_view(f.viewer.id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn toggle_like_parity() {
        let f = fixture(EngagementConfig::default()).await;
        let target = LikeTarget::Video(f.video.id);

        for round in 1..=5 {
            let toggle = f.service.toggle_like(f.viewer.id, target).await.unwrap();
            assert_eq!(toggle.liked, round % 2 == 1);
            assert_eq!(toggle.was_liked, round % 2 == 0);
        }
        assert_eq!(f.store.count_likes(&target).await.unwrap(), 1);

        f.service.toggle_like(f.viewer.id, target).await.unwrap();
        assert_eq!(f.store.count_likes(&target).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn toggle_like_covers_comments_and_tweets() {
        let f = fixture(EngagementConfig::default()).await;
        let comment = f
            .store
            .insert_comment(Comment::new(f.video.id, f.viewer.id, "nice"))
            .await
            .unwrap();
        let tweet = f
            .store
            .insert_tweet(Tweet::new(f.channel.id, "new video soon"))
            .await
            .unwrap();

        for target in [LikeTarget::Comment(comment.id), LikeTarget::Tweet(tweet.id)] {
            let toggle = f.service.toggle_like(f.viewer.id, target).await.unwrap();
            assert!(toggle.liked);
        }
    }

    #[tokio::test]
    async fn toggle_like_rejects_missing_target() {
        let f = fixture(EngagementConfig::default()).await;
        let result = f
            .service
            .toggle_like(f.viewer.id, LikeTarget::Tweet(Uuid::new_v4()))
            .await;
        assert!(matches!(result, Err(AppError::InvalidTarget(_))));
    }

    #[tokio::test]
    async fn unknown_actor_is_unauthorized() {
        let f = fixture(EngagementConfig::default()).await;
        let result = f
            .service
            .toggle_like(Uuid::new_v4(), LikeTarget::Video(f.video.id))
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn like_status_and_liked_videos() {
        let f = fixture(EngagementConfig::default()).await;
        let older = f.video.clone();
        let newer = f
            .store
            .insert_video(Video::new(f.channel.id, "second upload"))
            .await
            .unwrap();

        f.service
            .toggle_like(f.viewer.id, LikeTarget::Video(older.id))
            .await
            .unwrap();
        f.service
            .toggle_like(f.channel.id, LikeTarget::Video(older.id))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        f.service
            .toggle_like(f.viewer.id, LikeTarget::Video(newer.id))
            .await
            .unwrap();

        let status = f.service.like_status(f.viewer.id, older.id).await.unwrap();
        assert_eq!(
            status,
            LikeStatus {
                liked: true,
                likes_on_video: 2
            }
        );

        let liked: Vec<Uuid> = f
            .service
            .liked_videos(f.viewer.id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(liked, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn liked_videos_skip_deleted_videos() {
        let f = fixture(EngagementConfig::default()).await;
        f.service
            .toggle_like(f.viewer.id, LikeTarget::Video(f.video.id))
            .await
            .unwrap();
        assert!(f.store.delete_video(f.video.id).await.unwrap());

        assert!(f.service.liked_videos(f.viewer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn watch_history_is_newest_first_with_owner() {
        let f = fixture(EngagementConfig::default()).await;
        let second = f
            .store
            .insert_video(Video::new(f.channel.id, "second upload"))
            .await
            .unwrap();
        let gone = f
            .store
            .insert_video(Video::new(f.channel.id, "taken down"))
            .await
            .unwrap();

        f.service.record_view(f.viewer.id, f.video.id).await.unwrap();
        f.service.record_view(f.viewer.id, gone.id).await.unwrap();
        f.service.record_view(f.viewer.id, second.id).await.unwrap();
        f.store.delete_video(gone.id).await.unwrap();

        let history = f.service.watch_history(f.viewer.id).await.unwrap();
        let ids: Vec<Uuid> = history.iter().map(|w| w.video.id).collect();
        assert_eq!(ids, vec![second.id, f.video.id]);
        let owner = history[0].owner.as_ref().unwrap();
        assert_eq!(owner.id, f.channel.id);
        assert_eq!(owner.username, "channel");

        let unknown = f.service.watch_history(Uuid::new_v4()).await;
        assert!(matches!(unknown, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn self_subscription_follows_configuration() {
        let f = fixture(EngagementConfig::default()).await;
        let toggle = f
            .service
            .toggle_subscription(f.channel.id, f.channel.id)
            .await
            .unwrap();
        assert!(toggle.subscribed);
        assert_eq!(f.store.subscription_records(f.channel.id, f.channel.id), 1);

        let strict = fixture(EngagementConfig {
            allow_self_subscription: false,
            ..EngagementConfig::default()
        })
        .await;
        let rejected = strict
            .service
            .toggle_subscription(strict.channel.id, strict.channel.id)
            .await;
        assert!(matches!(rejected, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn subscribing_to_missing_channel_is_not_found() {
        let f = fixture(EngagementConfig::default()).await;
        let result = f
            .service
            .toggle_subscription(f.viewer.id, Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn concurrent_subscription_toggles_never_duplicate() {
        let f = fixture(EngagementConfig::default()).await;

        let handles: Vec<_> = (0..9)
            .map(|_| {
                let service = f.service.clone();
                let (subscriber, channel) = (f.viewer.id, f.channel.id);
                tokio::spawn(async move { service.toggle_subscription(subscriber, channel).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // nine atomic flips from "absent" leave exactly one record
        assert_eq!(f.store.subscription_records(f.viewer.id, f.channel.id), 1);
        assert_eq!(
            f.service.channel_subscribers(f.channel.id).await.unwrap(),
            vec![f.viewer.id]
        );
    }

    #[tokio::test]
    async fn channel_subscribers_of_quiet_channel_is_empty() {
        let f = fixture(EngagementConfig::default()).await;
        assert!(f
            .service
            .channel_subscribers(f.channel.id)
            .await
            .unwrap()
            .is_empty());
    }
}
