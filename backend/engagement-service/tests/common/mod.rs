#![allow(dead_code)]

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use engagement_service::config::EngagementConfig;
use engagement_service::domain::{Subscription, User, Video};
use engagement_service::handlers::AppState;
use engagement_service::repository::{EntityStore, MemoryEntityStore};

pub fn memory_state() -> (Arc<MemoryEntityStore>, AppState) {
    let store = Arc::new(MemoryEntityStore::new());
    let state = AppState::new(store.clone(), EngagementConfig::default());
    (store, state)
}

pub async fn seed_user(store: &dyn EntityStore, name: &str) -> User {
    store
        .insert_user(User::new(name, format!("{}@example.com", name), name))
        .await
        .expect("seed user")
}

/// `count` videos owned by `owner`, one minute apart, newest first by index.
pub async fn seed_videos(store: &dyn EntityStore, owner: Uuid, count: i64) -> Vec<Video> {
    let base = Utc::now();
    let mut videos = Vec::new();
    for i in 0..count {
        let video = Video::new(owner, format!("video {}", i)).created_at(base - Duration::minutes(i));
        videos.push(store.insert_video(video).await.expect("seed video"));
    }
    videos
}

pub async fn subscribe(store: &dyn EntityStore, subscriber: Uuid, channel: Uuid) {
    store
        .insert_subscription(Subscription::new(subscriber, channel))
        .await
        .expect("seed subscription");
}
