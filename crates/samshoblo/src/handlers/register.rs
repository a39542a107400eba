use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use samshoblo_core::registration::NewRegistration;
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

/// Intake payload. Every field is optional at the wire level so that a
/// missing field produces a targeted 400 instead of a generic
/// deserialization error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub child_name: Option<String>,
    pub child_surname: Option<String>,
    pub child_age: Option<String>,
    pub parent_name: Option<String>,
    pub parent_surname: Option<String>,
    pub parent_phone: Option<String>,
}

impl RegisterRequest {
    /// Validates that every field is present and non-empty, returning the
    /// wire name of the first missing field otherwise.
    fn into_submission(self) -> Result<NewRegistration, &'static str> {
        fn required(value: Option<String>, name: &'static str) -> Result<String, &'static str> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(name),
            }
        }

        Ok(NewRegistration {
            child_name: required(self.child_name, "childName")?,
            child_surname: required(self.child_surname, "childSurname")?,
            child_age: required(self.child_age, "childAge")?,
            parent_name: required(self.parent_name, "parentName")?,
            parent_surname: required(self.parent_surname, "parentSurname")?,
            parent_phone: required(self.parent_phone, "parentPhone")?,
        })
    }
}

/// Submit a registration (POST /register).
///
/// Validates the payload, persists it, and on non-duplicate success fans a
/// push notification out to every subscriber. Duplicates are reported as a
/// distinguished success (200 with `isDuplicate: true`) rather than an
/// error, so retried form submissions stay idempotent.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let submission = match payload.into_submission() {
        Ok(submission) => submission,
        Err(field) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Missing required field: {field}") })),
            );
        }
    };

    let result = state.registrations.add(submission).await;

    if !result.success {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to save registration. Please try again." })),
        );
    }

    if result.is_duplicate {
        tracing::info!(id = %result.registration.id, "Duplicate registration ignored");
        return (
            StatusCode::OK,
            Json(json!({
                "message": "Registration already exists for this child and parent.",
                "id": result.registration.id,
                "storageMethod": result.method,
                "totalRegistrations": result.total_count,
                "isDuplicate": true,
                "warning":
                    "This child is already registered with the same parent contact information.",
            })),
        );
    }

    let registration = &result.registration;
    tracing::info!(
        id = %registration.id,
        total = result.total_count,
        method = result.method.as_str(),
        "Registration saved"
    );

    // Notification failures never fail the registration.
    let title = "New Registration Received! 🎉";
    let body = format!(
        "{} {} ({} years old) - Parent: {} {}",
        registration.child_name,
        registration.child_surname,
        registration.child_age,
        registration.parent_name,
        registration.parent_surname
    );
    state
        .notifier
        .send_to_all(
            title,
            &body,
            json!({
                "registrationId": registration.id,
                "childName": registration.child_name,
                "childSurname": registration.child_surname,
                "childAge": registration.child_age,
                "parentName": registration.parent_name,
                "parentSurname": registration.parent_surname,
                "parentPhone": registration.parent_phone,
                "timestamp": registration.timestamp,
            }),
        )
        .await;

    let mut response = json!({
        "message": "Registration submitted successfully",
        "id": registration.id,
        "storageMethod": result.method,
        "totalRegistrations": result.total_count,
        "removedCount": result.removed_count,
        "isDuplicate": false,
    });
    if result.method.is_memory() {
        response["warning"] = json!(
            "Data stored in memory (will be lost on server restart). \
             Configure a persistent storage backend."
        );
    }

    (StatusCode::CREATED, Json(response))
}
