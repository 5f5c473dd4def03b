use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{ensure_actor, with_deadline};
use crate::config::EngagementConfig;
use crate::domain::Playlist;
use crate::error::{AppError, Result};
use crate::repository::EntityStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideoAdded {
    /// `false` when the video was already in the playlist
    pub added: bool,
    pub playlist: Playlist,
}

/// Ordered, owner-managed video collections.
#[derive(Clone)]
pub struct PlaylistService {
    store: Arc<dyn EntityStore>,
    settings: EngagementConfig,
}

impl PlaylistService {
    pub fn new(store: Arc<dyn EntityStore>, settings: EngagementConfig) -> Self {
        Self { store, settings }
    }

    pub async fn create(&self, owner_id: Uuid, name: &str, description: &str) -> Result<Playlist> {
        with_deadline(self.settings.request_timeout(), async {
            ensure_actor(self.store.as_ref(), owner_id).await?;
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::InvalidArgument(
                    "playlist name is required".to_string(),
                ));
            }

            let playlist = self
                .store
                .insert_playlist(Playlist::new(owner_id, name, description.trim()))
                .await?;
            info!(user_id = %owner_id, playlist_id = %playlist.id, "playlist created");
            Ok(playlist)
        })
        .await
    }

    pub async fn get(&self, playlist_id: Uuid) -> Result<Playlist> {
        with_deadline(self.settings.request_timeout(), self.load(playlist_id)).await
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Playlist>> {
        with_deadline(self.settings.request_timeout(), async {
            if !self.store.user_exists(owner_id).await? {
                return Err(AppError::NotFound("User".to_string()));
            }
            self.store.playlists_by_owner(owner_id).await
        })
        .await
    }

    pub async fn add_video(
        &self,
        actor_id: Uuid,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<PlaylistVideoAdded> {
        with_deadline(self.settings.request_timeout(), async {
            self.owned_by(actor_id, playlist_id).await?;
            if self.store.get_video(video_id).await?.is_none() {
                return Err(AppError::NotFound("Video".to_string()));
            }

            let added = self
                .store
                .add_video_to_playlist(playlist_id, video_id)
                .await?;
            let playlist = self.load(playlist_id).await?;
            Ok(PlaylistVideoAdded { added, playlist })
        })
        .await
    }

    pub async fn remove_video(
        &self,
        actor_id: Uuid,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<Playlist> {
        with_deadline(self.settings.request_timeout(), async {
            self.owned_by(actor_id, playlist_id).await?;
            if !self
                .store
                .remove_video_from_playlist(playlist_id, video_id)
                .await?
            {
                return Err(AppError::NotFound("Video in playlist".to_string()));
            }
            self.load(playlist_id).await
        })
        .await
    }

    pub async fn delete(&self, actor_id: Uuid, playlist_id: Uuid) -> Result<Playlist> {
        with_deadline(self.settings.request_timeout(), async {
            self.owned_by(actor_id, playlist_id).await?;
            let deleted = self
                .store
                .delete_playlist(playlist_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Playlist".to_string()))?;
            info!(user_id = %actor_id, playlist_id = %playlist_id, "playlist deleted");
            Ok(deleted)
        })
        .await
    }

    async fn load(&self, playlist_id: Uuid) -> Result<Playlist> {
        self.store
            .get_playlist(playlist_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Playlist".to_string()))
    }

    async fn owned_by(&self, actor_id: Uuid, playlist_id: Uuid) -> Result<Playlist> {
        let playlist = self.load(playlist_id).await?;
        if playlist.owner_id != actor_id {
            return Err(AppError::Forbidden(
                "only the owner can modify this playlist".to_string(),
            ));
        }
        Ok(playlist)
    }
}
