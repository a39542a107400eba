use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        admin::admin,
        health::livez,
        keep_alive::keep_alive,
        notifications::{subscribe, unsubscribe},
        register::register,
        stats::storage_stats,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // The registration form and the admin panel are served from another
    // origin, so the whole API is CORS-open.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/register", post(register))
        .route("/admin", post(admin))
        .route("/storage-stats", get(storage_stats))
        .route("/notifications/subscribe", post(subscribe).delete(unsubscribe))
        .route("/keep-alive", get(keep_alive))
        .route("/livez", get(livez))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
