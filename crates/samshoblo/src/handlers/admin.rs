use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    #[serde(default)]
    pub password: String,
}

/// List all registrations, newest first (POST /admin).
///
/// Password-gated; a wrong password returns 401 and no data.
pub async fn admin(
    State(state): State<AppState>,
    Json(payload): Json<AdminRequest>,
) -> impl IntoResponse {
    if !state.admin_gate.verify(&payload.password) {
        tracing::warn!("Rejected admin request with invalid password");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid password" })),
        );
    }

    let (registrations, method) = state.registrations.list().await;
    tracing::info!(count = registrations.len(), "Served admin listing");

    let mut response = json!({
        "registrations": registrations,
        "storageMethod": method,
    });
    if method.is_memory() {
        response["warning"] = json!(
            "Data from memory storage (may be incomplete). \
             Configure a persistent storage backend."
        );
    }

    (StatusCode::OK, Json(response))
}
