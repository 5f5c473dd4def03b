use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{ensure_channel, with_deadline};
use crate::config::EngagementConfig;
use crate::domain::Video;
use crate::error::Result;
use crate::metrics::AGGREGATION_DURATION_SECONDS;
use crate::pagination::PageRequest;
use crate::repository::{EntityStore, VideoFilter};

/// A page of videos with enough metadata to walk forwards and backwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    pub videos: Vec<Video>,
    pub total_videos: u64,
    pub current_page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
}

impl VideoPage {
    fn new(videos: Vec<Video>, total_videos: u64, page: &PageRequest) -> Self {
        Self {
            videos,
            total_videos,
            current_page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(total_videos),
            next_page: page.next_page(total_videos),
            previous_page: page.previous_page(),
        }
    }
}

/// Plain video listings sharing the feed's paging and sort policy.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn EntityStore>,
    settings: EngagementConfig,
}

impl CatalogService {
    pub fn new(store: Arc<dyn EntityStore>, settings: EngagementConfig) -> Self {
        Self { store, settings }
    }

    /// Filtered listing. An out-of-range page is an empty page, not an error.
    pub async fn list_videos(&self, filter: VideoFilter, page: PageRequest) -> Result<VideoPage> {
        let _timer = AGGREGATION_DURATION_SECONDS
            .with_label_values(&["list_videos"])
            .start_timer();

        with_deadline(self.settings.request_timeout(), async {
            let (videos, total) = self.store.list_videos(&filter, &page).await?;
            Ok(VideoPage::new(videos, total, &page))
        })
        .await
    }

    pub async fn channel_videos(&self, channel_id: Uuid, page: PageRequest) -> Result<VideoPage> {
        with_deadline(self.settings.request_timeout(), async {
            ensure_channel(self.store.as_ref(), channel_id).await?;
            let filter = VideoFilter::owned_by(vec![channel_id]);
            let (videos, total) = self.store.list_videos(&filter, &page).await?;
            Ok(VideoPage::new(videos, total, &page))
        })
        .await
    }
}
