//! Like, subscription and view handlers

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use super::response::{ok, parse_id};
use super::AppState;
use crate::domain::{LikeTarget, TargetKind};
use crate::error::{AppError, Result};
use crate::middleware::UserId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub target_kind: String,
    pub target_id: String,
}

impl ToggleLikeRequest {
    fn target(&self) -> Result<LikeTarget> {
        let kind = TargetKind::from_str(&self.target_kind)?;
        let id = Uuid::parse_str(self.target_id.trim()).map_err(|_| {
            AppError::InvalidTarget(format!("malformed {} id '{}'", kind, self.target_id))
        })?;
        Ok(LikeTarget::new(kind, id))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSubscriptionRequest {
    pub channel_id: String,
}

/// Toggle the actor's like on a video, comment or tweet
pub async fn toggle_like(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<ToggleLikeRequest>,
) -> Result<HttpResponse> {
    let target = req.target()?;
    let toggle = state.engagement.toggle_like(user_id.0, target).await?;
    let message = if toggle.liked {
        "Like added"
    } else {
        "Like removed"
    };
    Ok(ok(message, toggle))
}

/// Videos liked by the actor
pub async fn liked_videos(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let videos = state.engagement.liked_videos(user_id.0).await?;
    Ok(ok("Liked videos fetched", videos))
}

/// Whether the actor liked a video, and its like count
pub async fn like_status(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let status = state.engagement.like_status(user_id.0, video_id).await?;
    Ok(ok("Like status fetched", status))
}

pub async fn toggle_subscription(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<ToggleSubscriptionRequest>,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&req.channel_id, "channel")?;
    let toggle = state
        .engagement
        .toggle_subscription(user_id.0, channel_id)
        .await?;
    let message = if toggle.subscribed {
        "Subscribed"
    } else {
        "Unsubscribed"
    };
    Ok(ok(message, toggle))
}

pub async fn channel_subscribers(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&path, "channel")?;
    let subscribers = state.engagement.channel_subscribers(channel_id).await?;
    Ok(ok("Subscribers fetched", subscribers))
}

/// Record a view; repeat views by the same user are not counted
pub async fn record_view(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let record = state.engagement.record_view(user_id.0, video_id).await?;
    let message = if record.is_new {
        "View recorded"
    } else {
        "Video already viewed"
    };
    Ok(ok(message, record))
}

pub async fn remove_view(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    state.engagement.remove_view(user_id.0, video_id).await?;
    Ok(ok("View removed", serde_json::json!({ "removed": true })))
}

pub async fn view_count(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let views = state.engagement.video_view_count(video_id).await?;
    Ok(ok("Views fetched", serde_json::json!({ "views": views })))
}

/// The actor's watch history, most recent first
pub async fn watch_history(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let history = state.engagement.watch_history(user_id.0).await?;
    Ok(ok("Watch history fetched", history))
}
