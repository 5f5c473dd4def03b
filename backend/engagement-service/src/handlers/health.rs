//! Liveness and readiness probes

use actix_web::{web, HttpResponse};
use std::time::Instant;

use super::AppState;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "engagement-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready once the entity store answers a ping.
pub async fn ready(state: web::Data<AppState>) -> HttpResponse {
    let start = Instant::now();
    match state.store.health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ready",
            "service": "engagement-service",
            "store_latency_ms": start.elapsed().as_millis() as u64
        })),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unavailable",
                "service": "engagement-service",
                "error": e.public_message()
            }))
        }
    }
}
