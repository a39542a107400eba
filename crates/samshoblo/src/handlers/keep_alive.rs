use anyhow::Context;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Record a heartbeat so the hosting platform keeps the backend warm
/// (GET /keep-alive).
///
/// When a cron secret is configured the caller must present it as a
/// bearer token. Recording also prunes heartbeats older than the
/// retention window.
pub async fn keep_alive(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(secret) = &state.cron_secret {
        let authorized = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == format!("Bearer {secret}"));
        if !authorized {
            tracing::warn!("Rejected keep-alive request without valid bearer token");
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response());
        }
    }

    let now = Utc::now();
    let pruned = state
        .registrations
        .heartbeat(now)
        .await
        .context("Failed to insert heartbeat")?;
    tracing::debug!(pruned, "Heartbeat recorded");

    Ok(Json(json!({
        "success": true,
        "message": "Keep-alive successful",
        "timestamp": now,
    }))
    .into_response())
}
