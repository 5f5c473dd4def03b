//! HTTP handlers for engagement endpoints
//!
//! This module contains handlers for:
//! - Likes, subscriptions and views (toggle/record semantics)
//! - Subscription feed and channel statistics aggregations
//! - Video listings and playlists
//! - Health and readiness probes

pub mod channel;
pub mod engagement;
pub mod feed;
pub mod health;
pub mod playlist;
pub mod response;

use actix_web::web;
use std::sync::Arc;

use crate::config::EngagementConfig;
use crate::error::AppError;
use crate::metrics::serve_metrics;
use crate::pagination::{PageQuery, PageRequest};
use crate::repository::EntityStore;
use crate::services::{
    CatalogService, ChannelStatsService, EngagementService, FeedService, PlaylistService,
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub settings: EngagementConfig,
    pub engagement: EngagementService,
    pub feed: FeedService,
    pub channel_stats: ChannelStatsService,
    pub catalog: CatalogService,
    pub playlists: PlaylistService,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, settings: EngagementConfig) -> Self {
        Self {
            engagement: EngagementService::new(store.clone(), settings.clone()),
            feed: FeedService::new(store.clone(), settings.clone()),
            channel_stats: ChannelStatsService::new(store.clone(), settings.clone()),
            catalog: CatalogService::new(store.clone(), settings.clone()),
            playlists: PlaylistService::new(store.clone(), settings.clone()),
            store,
            settings,
        }
    }

    /// Apply the configured default and maximum page sizes to raw query input.
    pub fn page_request(&self, query: &PageQuery) -> crate::error::Result<PageRequest> {
        query.into_page_request(self.settings.default_page_limit, self.settings.max_page_limit)
    }
}

/// Register every route. Malformed query strings and bodies are reported
/// through the same error envelope as service failures.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::InvalidArgument(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::InvalidArgument(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::InvalidArgument(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::health))
    .route("/ready", web::get().to(health::ready))
    .route("/metrics", web::get().to(serve_metrics))
    .service(
        web::scope("/api/v1")
            .service(
                web::scope("/likes")
                    .route("/toggle", web::post().to(engagement::toggle_like))
                    .route("/videos", web::get().to(engagement::liked_videos))
                    .route("/status/{video_id}", web::get().to(engagement::like_status)),
            )
            .service(
                web::scope("/subscriptions")
                    .route("/toggle", web::post().to(engagement::toggle_subscription))
                    .route(
                        "/channels/{channel_id}/subscribers",
                        web::get().to(engagement::channel_subscribers),
                    )
                    .route(
                        "/users/{subscriber_id}/channels",
                        web::get().to(feed::subscribed_channels),
                    )
                    .route(
                        "/feed/{subscriber_id}",
                        web::get().to(feed::get_subscription_feed),
                    ),
            )
            .service(
                web::resource("/views/{video_id}")
                    .route(web::post().to(engagement::record_view))
                    .route(web::delete().to(engagement::remove_view))
                    .route(web::get().to(engagement::view_count)),
            )
            .service(
                web::scope("/users").route("/history", web::get().to(engagement::watch_history)),
            )
            .service(
                web::scope("/channels")
                    .route("/profile/{username}", web::get().to(channel::channel_profile))
                    .route("/{channel_id}/stats", web::get().to(channel::channel_stats))
                    .route("/{channel_id}/videos", web::get().to(channel::channel_videos)),
            )
            .route("/videos", web::get().to(channel::list_videos))
            .service(
                web::scope("/playlists")
                    .route("", web::post().to(playlist::create_playlist))
                    .route("/user/{user_id}", web::get().to(playlist::user_playlists))
                    .route(
                        "/add/{playlist_id}/{video_id}",
                        web::patch().to(playlist::add_video),
                    )
                    .route(
                        "/remove/{playlist_id}/{video_id}",
                        web::patch().to(playlist::remove_video),
                    )
                    .route("/{playlist_id}", web::get().to(playlist::get_playlist))
                    .route("/{playlist_id}", web::delete().to(playlist::delete_playlist)),
            ),
    );
}
