use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::with_deadline;
use crate::config::EngagementConfig;
use crate::domain::{ChannelSummary, Tweet, User, Video};
use crate::error::{AppError, Result};
use crate::metrics::AGGREGATION_DURATION_SECONDS;
use crate::pagination::{PageRequest, Pagination, SortKey, SortOrder};
use crate::repository::{EntityStore, VideoFilter};

/// Tweets of one followed channel, newest first, with their author.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTweets {
    pub channel: ChannelSummary,
    pub tweets: Vec<Tweet>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFeed {
    /// Followed channels, most recent subscription first
    pub channels: Vec<ChannelSummary>,
    pub videos: Vec<Video>,
    /// Grouped per channel in `channels` order; channels without tweets are omitted
    pub tweets: Vec<ChannelTweets>,
    pub pagination: Pagination,
}

/// Builds the subscription feed from subscriptions, videos and tweets.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn EntityStore>,
    settings: EngagementConfig,
}

impl FeedService {
    pub fn new(store: Arc<dyn EntityStore>, settings: EngagementConfig) -> Self {
        Self { store, settings }
    }

    /// One page of videos from every channel `subscriber_id` follows, plus
    /// those channels and their tweets.
    ///
    /// Videos are always newest first; the sort fields of `page` are ignored.
    pub async fn get_subscription_feed(
        &self,
        subscriber_id: Uuid,
        page: PageRequest,
    ) -> Result<SubscriptionFeed> {
        let _timer = AGGREGATION_DURATION_SECONDS
            .with_label_values(&["feed"])
            .start_timer();
        let page = page.sorted_by(SortKey::CreatedAt, SortOrder::Desc);

        with_deadline(self.settings.request_timeout(), async {
            let channel_ids: Vec<Uuid> = self
                .store
                .subscriptions_of(subscriber_id)
                .await?
                .into_iter()
                .map(|s| s.channel_id)
                .collect();
            if channel_ids.is_empty() {
                return Err(AppError::NoSubscriptions);
            }

            let filter = VideoFilter::owned_by(channel_ids.clone());
            let ((videos, total_videos), users, tweets) = futures::try_join!(
                self.store.list_videos(&filter, &page),
                self.store.get_users(&channel_ids),
                self.store.tweets_by_owners(&channel_ids),
            )?;
            if videos.is_empty() {
                return Err(AppError::NoVideosFound);
            }

            let channels = channels_in_order(&channel_ids, users);
            let tweets = group_tweets(&channels, tweets);
            debug!(
                user_id = %subscriber_id,
                channels = channels.len(),
                videos = videos.len(),
                total_videos,
                "subscription feed assembled"
            );

            Ok(SubscriptionFeed {
                channels,
                videos,
                tweets,
                pagination: Pagination::new(&page, total_videos),
            })
        })
        .await
    }

    /// Channels `subscriber_id` follows, most recent subscription first.
    pub async fn subscribed_channels(&self, subscriber_id: Uuid) -> Result<Vec<ChannelSummary>> {
        with_deadline(self.settings.request_timeout(), async {
            let channel_ids: Vec<Uuid> = self
                .store
                .subscriptions_of(subscriber_id)
                .await?
                .into_iter()
                .map(|s| s.channel_id)
                .collect();
            let users = self.store.get_users(&channel_ids).await?;
            Ok(channels_in_order(&channel_ids, users))
        })
        .await
    }
}

fn channels_in_order(channel_ids: &[Uuid], users: Vec<User>) -> Vec<ChannelSummary> {
    let by_id: HashMap<Uuid, User> = users.into_iter().map(|u| (u.id, u)).collect();
    channel_ids
        .iter()
        .filter_map(|id| by_id.get(id).map(ChannelSummary::from))
        .collect()
}

fn group_tweets(channels: &[ChannelSummary], tweets: Vec<Tweet>) -> Vec<ChannelTweets> {
    let mut by_owner: HashMap<Uuid, Vec<Tweet>> = HashMap::new();
    for tweet in tweets {
        by_owner.entry(tweet.owner_id).or_default().push(tweet);
    }

    channels
        .iter()
        .filter_map(|channel| {
            let mut tweets = by_owner.remove(&channel.id)?;
            tweets.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            Some(ChannelTweets {
                channel: channel.clone(),
                tweets,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Subscription;
    use crate::repository::MemoryEntityStore;
    use chrono::{Duration, Utc};

    async fn user(store: &MemoryEntityStore, name: &str) -> User {
        store
            .insert_user(User::new(name, format!("{}@example.com", name), name))
            .await
            .unwrap()
    }

    fn service(store: &Arc<MemoryEntityStore>) -> FeedService {
        FeedService::new(store.clone(), EngagementConfig::default())
    }

    #[tokio::test]
    async fn no_subscriptions_is_reported() {
        let store = Arc::new(MemoryEntityStore::new());
        let reader = user(&store, "reader").await;

        let result = service(&store)
            .get_subscription_feed(reader.id, PageRequest::new(1, 10).unwrap())
            .await;
        assert!(matches!(result, Err(AppError::NoSubscriptions)));
    }

    #[tokio::test]
    async fn subscriptions_without_videos_report_no_videos() {
        let store = Arc::new(MemoryEntityStore::new());
        let reader = user(&store, "reader").await;
        let quiet = user(&store, "quiet").await;
        store
            .insert_subscription(Subscription::new(reader.id, quiet.id))
            .await
            .unwrap();

        let result = service(&store)
            .get_subscription_feed(reader.id, PageRequest::new(1, 10).unwrap())
            .await;
        assert!(matches!(result, Err(AppError::NoVideosFound)));
    }

    #[tokio::test]
    async fn pages_through_twenty_five_videos() {
        let store = Arc::new(MemoryEntityStore::new());
        let reader = user(&store, "reader").await;
        let channel = user(&store, "creator").await;
        store
            .insert_subscription(Subscription::new(reader.id, channel.id))
            .await
            .unwrap();

        let base = Utc::now();
        for i in 0..25 {
            store
                .insert_video(
                    Video::new(channel.id, format!("episode {}", i))
                        .created_at(base - Duration::minutes(i)),
                )
                .await
                .unwrap();
        }
        let feed = service(&store);

        let first = feed
            .get_subscription_feed(reader.id, PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(first.videos.len(), 10);
        assert_eq!(first.pagination.total_videos, 25);
        assert_eq!(first.pagination.total_pages, 3);
        assert_eq!(first.pagination.current_page, 1);
        assert_eq!(first.videos[0].title, "episode 0");
        assert!(first
            .videos
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));

        let last = feed
            .get_subscription_feed(reader.id, PageRequest::new(3, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(last.videos.len(), 5);
        assert_eq!(last.videos[4].title, "episode 24");
    }

    #[tokio::test]
    async fn channels_and_tweets_follow_subscription_order() {
        let store = Arc::new(MemoryEntityStore::new());
        let reader = user(&store, "reader").await;
        let older = user(&store, "older").await;
        let newer = user(&store, "newer").await;
        let silent = user(&store, "silent").await;

        let now = Utc::now();
        for (channel, minutes_ago) in [(&older, 30), (&silent, 20), (&newer, 10)] {
            store
                .insert_subscription(
                    Subscription::new(reader.id, channel.id)
                        .created_at(now - Duration::minutes(minutes_ago)),
                )
                .await
                .unwrap();
        }
        store.insert_video(Video::new(older.id, "clip")).await.unwrap();
        store
            .insert_tweet(Tweet::new(older.id, "old one").created_at(now - Duration::hours(2)))
            .await
            .unwrap();
        store
            .insert_tweet(Tweet::new(older.id, "new one").created_at(now - Duration::hours(1)))
            .await
            .unwrap();
        store
            .insert_tweet(Tweet::new(newer.id, "hello"))
            .await
            .unwrap();

        let feed = service(&store)
            .get_subscription_feed(reader.id, PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();

        let channel_ids: Vec<Uuid> = feed.channels.iter().map(|c| c.id).collect();
        assert_eq!(channel_ids, vec![newer.id, silent.id, older.id]);

        let grouped: Vec<Uuid> = feed.tweets.iter().map(|g| g.channel.id).collect();
        assert_eq!(grouped, vec![newer.id, older.id]);
        assert_eq!(feed.tweets[0].channel.username, "newer");
        assert_eq!(feed.tweets[0].channel.display_name, "newer");
        let older_tweets: Vec<&str> = feed.tweets[1]
            .tweets
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(older_tweets, ["new one", "old one"]);
    }

    #[tokio::test]
    async fn subscribed_channels_lists_newest_first() {
        let store = Arc::new(MemoryEntityStore::new());
        let reader = user(&store, "reader").await;
        let first = user(&store, "first").await;
        let second = user(&store, "second").await;
        let now = Utc::now();
        store
            .insert_subscription(
                Subscription::new(reader.id, first.id).created_at(now - Duration::minutes(5)),
            )
            .await
            .unwrap();
        store
            .insert_subscription(Subscription::new(reader.id, second.id).created_at(now))
            .await
            .unwrap();

        let channels = service(&store).subscribed_channels(reader.id).await.unwrap();
        let names: Vec<&str> = channels.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, ["second", "first"]);
    }
}
