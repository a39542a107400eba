use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use samshoblo_core::push::PushSubscription;
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub subscription: Option<PushSubscription>,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: Option<String>,
}

/// Register a push subscription (POST /notifications/subscribe).
///
/// Subscribing the same endpoint twice replaces the stored keys.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> impl IntoResponse {
    let Some(subscription) = payload.subscription else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Subscription data is required" })),
        );
    };

    let total = state.notifier.subscribe(subscription).await;
    tracing::info!(total, "Push subscription added");

    (
        StatusCode::OK,
        Json(json!({
            "message": "Subscription successful",
            "totalSubscriptions": total,
        })),
    )
}

/// Remove a push subscription by endpoint (DELETE /notifications/subscribe).
///
/// Removing an unknown endpoint succeeds and reports the unchanged count.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<UnsubscribeRequest>,
) -> impl IntoResponse {
    let Some(endpoint) = payload.endpoint.filter(|e| !e.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Endpoint is required" })),
        );
    };

    let total = state.notifier.unsubscribe(&endpoint).await;
    tracing::info!(total, "Push subscription removed");

    (
        StatusCode::OK,
        Json(json!({
            "message": "Unsubscription successful",
            "totalSubscriptions": total,
        })),
    )
}
