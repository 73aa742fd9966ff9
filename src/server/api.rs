//! HTTP API endpoints
//!
//! Read-only queries over the registry plus the PTZ control route. These are
//! the collaborator surface for dashboards and the web client; nothing here
//! mutates stream state.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ptz::PtzDirection;
use crate::stats::ServerStats;

use super::AppState;

/// GET /api/streams: active stream summaries
pub async fn streams(State(state): State<Arc<AppState>>) -> Json<Value> {
    let streams = state.registry.list_active().await;

    Json(json!({
        "streams": streams,
        "totalStreams": streams.len(),
    }))
}

/// GET /api/stats: totals and uptime
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<ServerStats> {
    Json(state.stats.snapshot(&state.registry).await)
}

/// GET /api/health: liveness probe
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptimeSecs": state.stats.uptime().as_secs(),
        "timestamp": Utc::now(),
    }))
}

/// Body of POST /api/ptz/move
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtzMoveRequest {
    /// Where to move
    pub direction: PtzDirection,
    /// How long to keep moving before the automatic stop
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
}

fn default_duration_ms() -> u64 {
    500
}

/// POST /api/ptz/move: fire-and-forget camera movement
pub async fn ptz_move(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PtzMoveRequest>,
) -> Json<Value> {
    tracing::info!(
        direction = req.direction.action(),
        duration_ms = req.duration_ms,
        "PTZ move requested"
    );

    let success = Arc::clone(&state.ptz)
        .move_camera(req.direction, req.duration_ms)
        .await;

    Json(json!({ "success": success }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_request_defaults_duration() {
        let req: PtzMoveRequest = serde_json::from_str(r#"{"direction":"left"}"#).unwrap();

        assert_eq!(req.direction, PtzDirection::Left);
        assert_eq!(req.duration_ms, 500);
    }

    #[test]
    fn test_move_request_camel_case_duration() {
        let req: PtzMoveRequest =
            serde_json::from_str(r#"{"direction":"up","durationMs":1200}"#).unwrap();

        assert_eq!(req.duration_ms, 1200);
    }
}
