//! Channel statistics and video listing handlers

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::response::{ok, parse_id};
use super::AppState;
use crate::error::Result;
use crate::middleware::UserId;
use crate::pagination::PageQuery;
use crate::repository::VideoFilter;

/// Query string for `GET /api/v1/videos`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVideosQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive title substring
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

impl ListVideosQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
            sort_by: self.sort_by.clone(),
            sort_type: self.sort_type.clone(),
        }
    }

    fn filter(&self) -> Result<VideoFilter> {
        let owner_ids = self
            .user_id
            .as_deref()
            .map(|raw| parse_id(raw, "user"))
            .transpose()?
            .map(|id| vec![id]);
        let title_contains = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        Ok(VideoFilter {
            owner_ids,
            title_contains,
        })
    }
}

/// Dashboard rollup; `subscribedStatus` is relative to the caller when the
/// gateway forwarded one
pub async fn channel_stats(
    state: web::Data<AppState>,
    user_id: Option<UserId>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&path, "channel")?;
    let stats = state
        .channel_stats
        .get_channel_stats(channel_id, user_id.map(|u| u.0))
        .await?;
    Ok(ok("Channel stats fetched", stats))
}

/// Public channel page looked up by username
pub async fn channel_profile(
    state: web::Data<AppState>,
    user_id: Option<UserId>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let profile = state
        .channel_stats
        .channel_profile(&path, user_id.map(|u| u.0))
        .await?;
    Ok(ok("Channel profile fetched", profile))
}

pub async fn channel_videos(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&path, "channel")?;
    let page = state.page_request(&query)?;
    let videos = state.catalog.channel_videos(channel_id, page).await?;
    Ok(ok("Channel videos fetched", videos))
}

pub async fn list_videos(
    state: web::Data<AppState>,
    query: web::Query<ListVideosQuery>,
) -> Result<HttpResponse> {
    let filter = query.filter()?;
    let page = state.page_request(&query.page_query())?;
    let videos = state.catalog.list_videos(filter, page).await?;
    Ok(ok("Videos fetched", videos))
}
