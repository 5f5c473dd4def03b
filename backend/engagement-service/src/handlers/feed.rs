//! Subscription feed handlers

use actix_web::{web, HttpResponse};

use super::response::{ok, parse_id};
use super::AppState;
use crate::error::Result;
use crate::pagination::PageQuery;

/// Paginated videos, channels and tweets from everything a user follows
pub async fn get_subscription_feed(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let subscriber_id = parse_id(&path, "subscriber")?;
    let page = state.page_request(&query)?;
    let feed = state.feed.get_subscription_feed(subscriber_id, page).await?;
    Ok(ok("Subscription feed fetched", feed))
}

pub async fn subscribed_channels(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let subscriber_id = parse_id(&path, "subscriber")?;
    let channels = state.feed.subscribed_channels(subscriber_id).await?;
    Ok(ok("Subscribed channels fetched", channels))
}
