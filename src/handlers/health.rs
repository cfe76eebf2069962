use crate::{app::AppState, models::HealthStatus};
use axum::{extract::State, Json};
use chrono::Utc;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let store_ok = state.store.ping().await;

    let status = if store_ok { "healthy" } else { "degraded" };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store_ok,
        uptime_seconds: state.uptime_seconds(),
        timestamp: Utc::now(),
    })
}
