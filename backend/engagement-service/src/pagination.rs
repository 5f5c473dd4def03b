//! Shared paging and sort policy.
//!
//! Used by the subscription feed and the plain video listings so every list
//! endpoint agrees on offset math, accepted sort keys and tie-breaking.
//! Every sort is followed by a secondary sort on id so that pages are stable
//! across repeated calls even when the primary key collides.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::Video;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    CreatedAt,
    Title,
    Views,
    Duration,
}

impl SortKey {
    /// Column name in the videos table
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Title => "title",
            SortKey::Views => "view_count",
            SortKey::Duration => "duration_seconds",
        }
    }

    fn compare(&self, a: &Video, b: &Video) -> Ordering {
        match self {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Views => a.view_count.cmp(&b.view_count),
            SortKey::Duration => a.duration_seconds.cmp(&b.duration_seconds),
        }
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "createdAt" | "created_at" => Ok(SortKey::CreatedAt),
            "title" => Ok(SortKey::Title),
            "views" | "viewCount" => Ok(SortKey::Views),
            "duration" | "durationSeconds" => Ok(SortKey::Duration),
            other => Err(AppError::InvalidSortKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppError::InvalidArgument(format!(
                "sortType must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }
}

/// A validated page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl PageRequest {
    /// Validate raw paging input. Newest-first by creation time unless
    /// overridden with [`PageRequest::sorted_by`].
    pub fn new(page: i64, limit: i64) -> Result<Self> {
        if page < 1 {
            return Err(AppError::InvalidArgument(format!(
                "page must be >= 1, got {}",
                page
            )));
        }
        if limit < 1 {
            return Err(AppError::InvalidArgument(format!(
                "limit must be > 0, got {}",
                limit
            )));
        }
        let page = u32::try_from(page)
            .map_err(|_| AppError::InvalidArgument(format!("page {} is out of range", page)))?;
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);

        Ok(Self {
            page,
            limit,
            sort: SortKey::CreatedAt,
            order: SortOrder::Desc,
        })
    }

    pub fn sorted_by(mut self, sort: SortKey, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn clamp_limit(mut self, max: u32) -> Self {
        self.limit = self.limit.min(max.max(1));
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }

    pub fn next_page(&self, total: u64) -> Option<u32> {
        (u64::from(self.page) * u64::from(self.limit) < total).then(|| self.page + 1)
    }

    pub fn previous_page(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    /// Slice an already-sorted collection down to this page.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .iter()
            .skip(offset)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

/// Sort videos by `sort`/`order`, breaking ties on id in the same direction.
pub fn sort_videos(videos: &mut [Video], sort: SortKey, order: SortOrder) {
    videos.sort_by(|a, b| {
        let ordering = sort.compare(a, b).then_with(|| a.id.cmp(&b.id));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Raw query-string paging parameters as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
}

impl PageQuery {
    pub fn into_page_request(&self, default_limit: u32, max_limit: u32) -> Result<PageRequest> {
        let sort = self
            .sort_by
            .as_deref()
            .map(SortKey::from_str)
            .transpose()?
            .unwrap_or(SortKey::CreatedAt);
        let order = self
            .sort_type
            .as_deref()
            .map(SortOrder::from_str)
            .transpose()?
            .unwrap_or(SortOrder::Desc);

        Ok(PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(i64::from(default_limit)),
        )?
        .clamp_limit(max_limit)
        .sorted_by(sort, order))
    }
}

/// Pagination metadata attached to the subscription feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_videos: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

impl Pagination {
    pub fn new(page: &PageRequest, total_videos: u64) -> Self {
        Self {
            total_videos,
            total_pages: page.total_pages(total_videos),
            current_page: page.page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    #[test]
    fn rejects_page_below_one_and_zero_limit() {
        assert!(matches!(
            PageRequest::new(0, 10),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            PageRequest::new(-3, 10),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            PageRequest::new(1, 0),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn offset_and_total_pages() {
        let page = PageRequest::new(3, 10).unwrap();
        assert_eq!(page.offset(), 20);
        assert_eq!(page.total_pages(25), 3);
        assert_eq!(page.total_pages(30), 3);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.next_page(25), None);
        assert_eq!(page.previous_page(), Some(2));
        assert_eq!(PageRequest::new(1, 10).unwrap().next_page(25), Some(2));
    }

    #[test]
    fn limit_is_clamped_to_max() {
        let page = PageRequest::new(1, 500).unwrap().clamp_limit(100);
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn slice_past_the_end_is_empty() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(PageRequest::new(3, 10).unwrap().slice(&items).len(), 5);
        assert!(PageRequest::new(4, 10).unwrap().slice(&items).is_empty());
    }

    #[test]
    fn unknown_sort_key_is_rejected() {
        let query = PageQuery {
            sort_by: Some("likes".into()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_page_request(10, 100),
            Err(AppError::InvalidSortKey(key)) if key == "likes"
        ));
    }

    #[test]
    fn query_defaults_to_newest_first() {
        let page = PageQuery::default().into_page_request(10, 100).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
        assert_eq!(page.sort, SortKey::CreatedAt);
        assert_eq!(page.order, SortOrder::Desc);
    }

    #[test]
    fn ties_are_broken_by_id_deterministically() {
        let owner = Uuid::new_v4();
        let at = Utc::now();
        let mut videos: Vec<Video> = (0..6)
            .map(|i| Video::new(owner, format!("v{}", i)).created_at(at))
            .collect();
        let mut shuffled = videos.clone();
        shuffled.reverse();

        sort_videos(&mut videos, SortKey::CreatedAt, SortOrder::Desc);
        sort_videos(&mut shuffled, SortKey::CreatedAt, SortOrder::Desc);

        let ids: Vec<Uuid> = videos.iter().map(|v| v.id).collect();
        let shuffled_ids: Vec<Uuid> = shuffled.iter().map(|v| v.id).collect();
        assert_eq!(ids, shuffled_ids);
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn sorts_by_primary_key_first() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let mut videos = vec![
            Video::new(owner, "b").created_at(now - Duration::minutes(1)),
            Video::new(owner, "a").created_at(now),
            Video::new(owner, "c").created_at(now - Duration::minutes(2)),
        ];

        sort_videos(&mut videos, SortKey::Title, SortOrder::Asc);
        let titles: Vec<&str> = videos.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);

        sort_videos(&mut videos, SortKey::CreatedAt, SortOrder::Asc);
        let titles: Vec<&str> = videos.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, ["c", "b", "a"]);
    }
}
