//! Playlist handlers

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use super::response::{created, ok, parse_id};
use super::AppState;
use crate::error::{AppError, Result};
use crate::middleware::UserId;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaylistRequest {
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "description is too long"))]
    #[serde(default)]
    pub description: String,
}

pub async fn create_playlist(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<CreatePlaylistRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    let playlist = state
        .playlists
        .create(user_id.0, &req.name, &req.description)
        .await?;
    Ok(created("Playlist created", playlist))
}

pub async fn get_playlist(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let playlist_id = parse_id(&path, "playlist")?;
    let playlist = state.playlists.get(playlist_id).await?;
    Ok(ok("Playlist fetched", playlist))
}

pub async fn user_playlists(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let owner_id = parse_id(&path, "user")?;
    let playlists = state.playlists.list_by_owner(owner_id).await?;
    Ok(ok("Playlists fetched", playlists))
}

pub async fn add_video(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();
    let playlist_id = parse_id(&playlist_id, "playlist")?;
    let video_id = parse_id(&video_id, "video")?;

    let result = state
        .playlists
        .add_video(user_id.0, playlist_id, video_id)
        .await?;
    let message = if result.added {
        "Video added to playlist"
    } else {
        "Video already in playlist"
    };
    Ok(ok(message, result))
}

pub async fn remove_video(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();
    let playlist_id = parse_id(&playlist_id, "playlist")?;
    let video_id = parse_id(&video_id, "video")?;

    let playlist = state
        .playlists
        .remove_video(user_id.0, playlist_id, video_id)
        .await?;
    Ok(ok("Video removed from playlist", playlist))
}

pub async fn delete_playlist(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let playlist_id = parse_id(&path, "playlist")?;
    let playlist = state.playlists.delete(user_id.0, playlist_id).await?;
    Ok(ok("Playlist deleted", playlist))
}
