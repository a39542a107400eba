use axum::{extract::State, Json};

use crate::{repository::StorageStats, state::AppState};

/// Storage usage report (GET /storage-stats).
pub async fn storage_stats(State(state): State<AppState>) -> Json<StorageStats> {
    Json(state.registrations.stats().await)
}
