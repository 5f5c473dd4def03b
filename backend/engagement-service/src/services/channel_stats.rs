use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{ensure_channel, with_deadline};
use crate::config::EngagementConfig;
use crate::domain::ChannelSummary;
use crate::error::{AppError, Result};
use crate::metrics::AGGREGATION_DURATION_SECONDS;
use crate::repository::EntityStore;

/// Dashboard rollup for one channel. Every count is present even when zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: u64,
    pub total_subscribers: u64,
    /// Likes on the channel's videos
    pub total_likes: u64,
    /// Recounted from View records, not the per-video cache
    pub total_views: u64,
    pub subscribed_status: bool,
}

/// Channel header shown on a user's public page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    #[serde(flatten)]
    pub channel: ChannelSummary,
    pub subscribers_count: u64,
    pub channels_subscribed_to_count: u64,
    pub is_subscribed: bool,
}

#[derive(Clone)]
pub struct ChannelStatsService {
    store: Arc<dyn EntityStore>,
    settings: EngagementConfig,
}

impl ChannelStatsService {
    pub fn new(store: Arc<dyn EntityStore>, settings: EngagementConfig) -> Self {
        Self { store, settings }
    }

    /// `subscribed_status` reflects `requesting_user`; anonymous callers get `false`.
    pub async fn get_channel_stats(
        &self,
        channel_id: Uuid,
        requesting_user: Option<Uuid>,
    ) -> Result<ChannelStats> {
        let _timer = AGGREGATION_DURATION_SECONDS
            .with_label_values(&["channel_stats"])
            .start_timer();

        with_deadline(self.settings.request_timeout(), async {
            ensure_channel(self.store.as_ref(), channel_id).await?;

            let video_ids = self.store.video_ids_by_owner(channel_id).await?;
            let subscribed = async {
                match requesting_user {
                    Some(user_id) => self.store.is_subscribed(user_id, channel_id).await,
                    None => Ok(false),
                }
            };
            let (total_subscribers, total_likes, total_views, subscribed_status) = futures::try_join!(
                self.store.count_subscribers(channel_id),
                self.store.count_likes_on_videos(&video_ids),
                self.store.count_views_on_videos(&video_ids),
                subscribed,
            )?;

            let stats = ChannelStats {
                total_videos: video_ids.len() as u64,
                total_subscribers,
                total_likes,
                total_views,
                subscribed_status,
            };
            debug!(channel_id = %channel_id, ?stats, "channel stats computed");
            Ok(stats)
        })
        .await
    }

    /// Profile of the channel whose username matches `username`, ignoring case.
    pub async fn channel_profile(
        &self,
        username: &str,
        requesting_user: Option<Uuid>,
    ) -> Result<ChannelProfile> {
        let _timer = AGGREGATION_DURATION_SECONDS
            .with_label_values(&["channel_profile"])
            .start_timer();

        with_deadline(self.settings.request_timeout(), async {
            let username = username.trim();
            if username.is_empty() {
                return Err(AppError::InvalidArgument("username is required".to_string()));
            }

            // logins also match by email; a profile is addressed by username only
            let channel = self
                .store
                .find_user_by_login(username)
                .await?
                .filter(|user| user.username.eq_ignore_ascii_case(username))
                .ok_or_else(|| AppError::NotFound("Channel".to_string()))?;

            let subscribed = async {
                match requesting_user {
                    Some(user_id) => self.store.is_subscribed(user_id, channel.id).await,
                    None => Ok(false),
                }
            };
            let (subscribers_count, subscribed_to, is_subscribed) = futures::try_join!(
                self.store.count_subscribers(channel.id),
                self.store.subscriptions_of(channel.id),
                subscribed,
            )?;

            Ok(ChannelProfile {
                channel: ChannelSummary::from(&channel),
                subscribers_count,
                channels_subscribed_to_count: subscribed_to.len() as u64,
                is_subscribed,
            })
        })
        .await
    }
}
