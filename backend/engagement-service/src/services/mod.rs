//! Engagement engine: toggles, feed and channel aggregations, playlists.
//!
//! Every public operation runs under the configured request deadline and
//! talks to storage only through [`EntityStore`](crate::repository::EntityStore).

pub mod catalog;
pub mod channel_stats;
pub mod engagement;
pub mod feed;
pub mod playlists;

pub use catalog::{CatalogService, VideoPage};
pub use channel_stats::{ChannelProfile, ChannelStats, ChannelStatsService};
pub use engagement::{
    EngagementService, LikeStatus, LikeToggle, SubscriptionToggle, ViewRecord, WatchedVideo,
};
pub use feed::{ChannelTweets, FeedService, SubscriptionFeed};
pub use playlists::{PlaylistService, PlaylistVideoAdded};

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::repository::EntityStore;

/// Run `future` to completion or fail with `Timeout` once `duration` elapses.
pub async fn with_deadline<F, T>(duration: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(?duration, "engagement operation exceeded its deadline");
            Err(AppError::Timeout(duration))
        }
    }
}

/// Acting users must exist before they can write anything.
pub(crate) async fn ensure_actor(store: &dyn EntityStore, actor_id: Uuid) -> Result<()> {
    if store.user_exists(actor_id).await? {
        Ok(())
    } else {
        Err(AppError::Unauthorized(format!("unknown user {}", actor_id)))
    }
}

pub(crate) async fn ensure_channel(store: &dyn EntityStore, channel_id: Uuid) -> Result<()> {
    if store.user_exists(channel_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Channel".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_passes_through_results() {
        let ok = with_deadline(Duration::from_secs(1), async { Ok::<_, AppError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = with_deadline(Duration::from_secs(1), async {
            Err::<u8, _>(AppError::NoSubscriptions)
        })
        .await;
        assert!(matches!(err, Err(AppError::NoSubscriptions)));
    }

    #[tokio::test]
    async fn deadline_expiry_is_a_timeout() {
        let result = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AppError>(())
        })
        .await;
        assert!(matches!(result, Err(AppError::Timeout(d)) if d == Duration::from_millis(10)));
    }
}
