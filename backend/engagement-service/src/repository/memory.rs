use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use super::{EntityStore, VideoFilter};
use crate::domain::{
    Comment, Like, LikeTarget, Playlist, Subscription, TargetKind, ToggleOutcome, Tweet, User,
    Video, View,
};
use crate::error::{AppError, Result};
use crate::pagination::{self, PageRequest};

/// In-process store backed by concurrent hash maps.
///
/// Relationship collections are keyed by their natural key, so the entry API
/// (which holds the shard write lock for the key) is what makes toggles and
/// view upserts atomic. Used for local development and tests.
#[derive(Default)]
pub struct MemoryEntityStore {
    users: DashMap<Uuid, User>,
    usernames: DashMap<String, Uuid>,
    emails: DashMap<String, Uuid>,
    videos: DashMap<Uuid, Video>,
    tweets: DashMap<Uuid, Tweet>,
    comments: DashMap<Uuid, Comment>,
    subscriptions: DashMap<(Uuid, Uuid), Subscription>,
    likes: DashMap<(Uuid, LikeTarget), Like>,
    views: DashMap<(Uuid, Uuid), View>,
    playlists: DashMap<Uuid, Playlist>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of View records for the pair; 0 or 1.
    pub fn view_records(&self, viewer_id: Uuid, video_id: Uuid) -> usize {
        usize::from(self.views.contains_key(&(viewer_id, video_id)))
    }

    /// Number of Subscription records for the pair; 0 or 1.
    pub fn subscription_records(&self, subscriber_id: Uuid, channel_id: Uuid) -> usize {
        usize::from(self.subscriptions.contains_key(&(subscriber_id, channel_id)))
    }
}

fn newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid),
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait::async_trait]
impl EntityStore for MemoryEntityStore {
    async fn insert_user(&self, user: User) -> Result<User> {
        let username_key = user.username.to_lowercase();
        let email_key = user.email.to_lowercase();

        match self.usernames.entry(username_key.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(format!(
                    "username '{}' is already taken",
                    user.username
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }

        match self.emails.entry(email_key) {
            Entry::Occupied(_) => {
                self.usernames.remove(&username_key);
                return Err(AppError::Conflict(format!(
                    "email '{}' is already registered",
                    user.email
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }

        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>> {
        let key = login.to_lowercase();
        let id = self
            .usernames
            .get(&key)
            .map(|id| *id)
            .or_else(|| self.emails.get(&key).map(|id| *id));
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| u.clone()))
            .collect())
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.users.contains_key(&id))
    }

    async fn insert_video(&self, video: Video) -> Result<Video> {
        match self.videos.entry(video.id) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "video {} already exists",
                video.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(video.clone());
                Ok(video)
            }
        }
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        Ok(self.videos.get(&id).map(|v| v.clone()))
    }

    async fn get_videos(&self, ids: &[Uuid]) -> Result<Vec<Video>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.videos.get(id).map(|v| v.clone()))
            .collect())
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool> {
        Ok(self.videos.remove(&id).is_some())
    }

    async fn list_videos(
        &self,
        filter: &VideoFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Video>, u64)> {
        let mut matching: Vec<Video> = self
            .videos
            .iter()
            .filter(|v| filter.matches(v.value()))
            .map(|v| v.value().clone())
            .collect();

        pagination::sort_videos(&mut matching, page.sort, page.order);
        let total = matching.len() as u64;
        Ok((page.slice(&matching), total))
    }

    async fn video_ids_by_owner(&self, owner_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .videos
            .iter()
            .filter(|v| v.owner_id == owner_id)
            .map(|v| v.id)
            .collect())
    }

    async fn insert_tweet(&self, tweet: Tweet) -> Result<Tweet> {
        self.tweets.insert(tweet.id, tweet.clone());
        Ok(tweet)
    }

    async fn tweets_by_owners(&self, owner_ids: &[Uuid]) -> Result<Vec<Tweet>> {
        let owners: HashSet<&Uuid> = owner_ids.iter().collect();
        Ok(self
            .tweets
            .iter()
            .filter(|t| owners.contains(&t.owner_id))
            .map(|t| t.value().clone())
            .collect())
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment> {
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn like_target_exists(&self, target: &LikeTarget) -> Result<bool> {
        Ok(match target {
            LikeTarget::Video(id) => self.videos.contains_key(id),
            LikeTarget::Comment(id) => self.comments.contains_key(id),
            LikeTarget::Tweet(id) => self.tweets.contains_key(id),
        })
    }

    async fn insert_subscription(&self, subscription: Subscription) -> Result<Subscription> {
        let key = (subscription.subscriber_id, subscription.channel_id);
        match self.subscriptions.entry(key) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "user {} is already subscribed to channel {}",
                key.0, key.1
            ))),
            Entry::Vacant(slot) => {
                slot.insert(subscription.clone());
                Ok(subscription)
            }
        }
    }

    async fn toggle_subscription(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<ToggleOutcome> {
        let outcome = match self.subscriptions.entry((subscriber_id, channel_id)) {
            Entry::Occupied(existing) => {
                existing.remove();
                ToggleOutcome::deactivated()
            }
            Entry::Vacant(slot) => {
                slot.insert(Subscription::new(subscriber_id, channel_id));
                ToggleOutcome::activated()
            }
        };
        debug!(%subscriber_id, %channel_id, ?outcome, "toggled subscription");
        Ok(outcome)
    }

    async fn subscriptions_of(&self, subscriber_id: Uuid) -> Result<Vec<Subscription>> {
        let mut subs: Vec<Subscription> = self
            .subscriptions
            .iter()
            .filter(|s| s.subscriber_id == subscriber_id)
            .map(|s| s.value().clone())
            .collect();
        newest_first(&mut subs, |s| (s.created_at, s.id));
        Ok(subs)
    }

    async fn subscribers_of(&self, channel_id: Uuid) -> Result<Vec<Subscription>> {
        let mut subs: Vec<Subscription> = self
            .subscriptions
            .iter()
            .filter(|s| s.channel_id == channel_id)
            .map(|s| s.value().clone())
            .collect();
        newest_first(&mut subs, |s| (s.created_at, s.id));
        Ok(subs)
    }

    async fn count_subscribers(&self, channel_id: Uuid) -> Result<u64> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|s| s.channel_id == channel_id)
            .count() as u64)
    }

    async fn is_subscribed(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool> {
        Ok(self.subscriptions.contains_key(&(subscriber_id, channel_id)))
    }

    async fn toggle_like(&self, actor_id: Uuid, target: LikeTarget) -> Result<ToggleOutcome> {
        let outcome = match self.likes.entry((actor_id, target)) {
            Entry::Occupied(existing) => {
                existing.remove();
                ToggleOutcome::deactivated()
            }
            Entry::Vacant(slot) => {
                slot.insert(Like::new(actor_id, target));
                ToggleOutcome::activated()
            }
        };
        debug!(%actor_id, ?target, ?outcome, "toggled like");
        Ok(outcome)
    }

    async fn has_liked(&self, actor_id: Uuid, target: &LikeTarget) -> Result<bool> {
        Ok(self.likes.contains_key(&(actor_id, *target)))
    }

    async fn count_likes(&self, target: &LikeTarget) -> Result<u64> {
        Ok(self.likes.iter().filter(|l| l.target == *target).count() as u64)
    }

    async fn count_likes_on_videos(&self, video_ids: &[Uuid]) -> Result<u64> {
        let videos: HashSet<&Uuid> = video_ids.iter().collect();
        Ok(self
            .likes
            .iter()
            .filter(|l| matches!(l.target, LikeTarget::Video(id) if videos.contains(&id)))
            .count() as u64)
    }

    async fn likes_by_user(&self, actor_id: Uuid, kind: TargetKind) -> Result<Vec<Like>> {
        let mut likes: Vec<Like> = self
            .likes
            .iter()
            .filter(|l| l.liked_by == actor_id && l.target.kind() == kind)
            .map(|l| l.value().clone())
            .collect();
        newest_first(&mut likes, |l| (l.created_at, l.id));
        Ok(likes)
    }

    async fn record_view(&self, viewer_id: Uuid, video_id: Uuid) -> Result<bool> {
        // Counter and history change while the pair's entry is locked.
        // Lock order is views, then videos, then users.
        match self.views.entry((viewer_id, video_id)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                if let Some(mut video) = self.videos.get_mut(&video_id) {
                    video.view_count += 1;
                }
                if let Some(mut viewer) = self.users.get_mut(&viewer_id) {
                    viewer.remember_watched(video_id);
                }
                slot.insert(View::new(viewer_id, video_id));
                Ok(true)
            }
        }
    }

    async fn remove_view(&self, viewer_id: Uuid, video_id: Uuid) -> Result<bool> {
        match self.views.entry((viewer_id, video_id)) {
            Entry::Vacant(_) => Ok(false),
            Entry::Occupied(entry) => {
                if let Some(mut video) = self.videos.get_mut(&video_id) {
                    video.view_count = (video.view_count - 1).max(0);
                }
                if let Some(mut viewer) = self.users.get_mut(&viewer_id) {
                    viewer.forget_watched(video_id);
                }
                entry.remove();
                Ok(true)
            }
        }
    }

    async fn count_views(&self, video_id: Uuid) -> Result<u64> {
        Ok(self.views.iter().filter(|v| v.video_id == video_id).count() as u64)
    }

    async fn count_views_on_videos(&self, video_ids: &[Uuid]) -> Result<u64> {
        let videos: HashSet<&Uuid> = video_ids.iter().collect();
        Ok(self
            .views
            .iter()
            .filter(|v| videos.contains(&v.video_id))
            .count() as u64)
    }

    async fn insert_playlist(&self, playlist: Playlist) -> Result<Playlist> {
        self.playlists.insert(playlist.id, playlist.clone());
        Ok(playlist)
    }

    async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        Ok(self.playlists.get(&id).map(|p| p.clone()))
    }

    async fn playlists_by_owner(&self, owner_id: Uuid) -> Result<Vec<Playlist>> {
        let mut playlists: Vec<Playlist> = self
            .playlists
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .map(|p| p.value().clone())
            .collect();
        newest_first(&mut playlists, |p| (p.created_at, p.id));
        Ok(playlists)
    }

    async fn add_video_to_playlist(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let mut playlist = self
            .playlists
            .get_mut(&playlist_id)
            .ok_or_else(|| AppError::NotFound("Playlist".to_string()))?;

        if playlist.videos.contains(&video_id) {
            return Ok(false);
        }
        playlist.videos.push(video_id);
        Ok(true)
    }

    async fn remove_video_from_playlist(
        &self,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<bool> {
        let mut playlist = self
            .playlists
            .get_mut(&playlist_id)
            .ok_or_else(|| AppError::NotFound("Playlist".to_string()))?;

        let before = playlist.videos.len();
        playlist.videos.retain(|id| *id != video_id);
        Ok(playlist.videos.len() < before)
    }

    async fn delete_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        Ok(self.playlists.remove(&id).map(|(_, playlist)| playlist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn usernames_and_emails_are_unique() {
        let store = MemoryEntityStore::new();
        store
            .insert_user(User::new("Neo", "neo@matrix.io", "Neo"))
            .await
            .unwrap();

        let dup_name = store
            .insert_user(User::new("neo", "other@matrix.io", "Other"))
            .await;
        assert!(matches!(dup_name, Err(AppError::Conflict(_))));

        let dup_email = store
            .insert_user(User::new("trinity", "NEO@matrix.io", "Trinity"))
            .await;
        assert!(matches!(dup_email, Err(AppError::Conflict(_))));

        // the failed email insert must not leave its username reserved
        store
            .insert_user(User::new("trinity", "trinity@matrix.io", "Trinity"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn finds_user_by_username_or_email() {
        let store = MemoryEntityStore::new();
        let user = store
            .insert_user(User::new("morpheus", "morpheus@zion.io", "Morpheus"))
            .await
            .unwrap();

        let by_name = store.find_user_by_login("Morpheus").await.unwrap().unwrap();
        let by_email = store
            .find_user_by_login("morpheus@zion.io")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_email.id, user.id);
        assert!(store.find_user_by_login("smith").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_subscription_rejects_duplicate_natural_key() {
        let store = MemoryEntityStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.insert_subscription(Subscription::new(a, b)).await.unwrap();

        let dup = store.insert_subscription(Subscription::new(a, b)).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
        assert_eq!(store.subscription_records(a, b), 1);
    }

    #[tokio::test]
    async fn concurrent_view_upserts_insert_exactly_once() {
        let store = Arc::new(MemoryEntityStore::new());
        let owner = Uuid::new_v4();
        let viewer = store
            .insert_user(User::new("viewer", "viewer@example.com", "Viewer"))
            .await
            .unwrap();
        let video = store.insert_video(Video::new(owner, "clip")).await.unwrap();
        let (viewer_id, video_id) = (viewer.id, video.id);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.record_view(viewer_id, video_id).await })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.view_records(viewer.id, video.id), 1);
        assert_eq!(store.get_video(video.id).await.unwrap().unwrap().view_count, 1);
        let viewer = store.get_user(viewer.id).await.unwrap().unwrap();
        assert_eq!(viewer.watch_history, vec![video.id]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_record_and_remove_keep_counter_in_step() {
        let store = Arc::new(MemoryEntityStore::new());
        let viewer = store
            .insert_user(User::new("viewer", "viewer@example.com", "Viewer"))
            .await
            .unwrap();
        let video = store
            .insert_video(Video::new(Uuid::new_v4(), "clip"))
            .await
            .unwrap();
        let (viewer_id, video_id) = (viewer.id, video.id);

        for _ in 0..500 {
            let recorder = {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.record_view(viewer_id, video_id).await })
            };
            let remover = {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.remove_view(viewer_id, video_id).await })
            };
            recorder.await.unwrap().unwrap();
            remover.await.unwrap().unwrap();

            let views = store.count_views(video_id).await.unwrap();
            let counter = store.get_video(video_id).await.unwrap().unwrap().view_count;
            assert_eq!(counter as u64, views);
            let history = store.get_user(viewer_id).await.unwrap().unwrap().watch_history;
            assert_eq!(history.len() as u64, views);

            store.remove_view(viewer_id, video_id).await.unwrap();
        }
    }

    #[tokio::test]
    async fn list_videos_filters_by_title_case_insensitively() {
        let store = MemoryEntityStore::new();
        let owner = Uuid::new_v4();
        store.insert_video(Video::new(owner, "Rust in Action")).await.unwrap();
        store.insert_video(Video::new(owner, "Cooking pasta")).await.unwrap();

        let filter = VideoFilter {
            owner_ids: None,
            title_contains: Some("rust".into()),
        };
        let page = PageRequest::new(1, 10).unwrap();
        let (videos, total) = store.list_videos(&filter, &page).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(videos[0].title, "Rust in Action");
    }

    #[tokio::test]
    async fn playlist_add_suppresses_duplicates_and_keeps_order() {
        let store = MemoryEntityStore::new();
        let playlist = store
            .insert_playlist(Playlist::new(Uuid::new_v4(), "mix", ""))
            .await
            .unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(store.add_video_to_playlist(playlist.id, a).await.unwrap());
        assert!(store.add_video_to_playlist(playlist.id, b).await.unwrap());
        assert!(!store.add_video_to_playlist(playlist.id, a).await.unwrap());

        let stored = store.get_playlist(playlist.id).await.unwrap().unwrap();
        assert_eq!(stored.videos, vec![a, b]);

        let missing = store.add_video_to_playlist(Uuid::new_v4(), a).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
