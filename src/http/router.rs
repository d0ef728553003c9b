use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use axum::Router;

use super::handlers;
use super::tracing_layer::request_tracing;
use super::types::AppState;

/// Room for the text fields of the entry form on top of the photo limit.
const FORM_OVERHEAD_BYTES: usize = 256 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_photo_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/health", get(handlers::core::health))
        .route("/api/report/latest", get(handlers::reports::latest_json))
        .route(
            "/login",
            get(handlers::pages::login).post(handlers::auth::login_submit),
        )
        .route(
            "/signup",
            get(handlers::pages::signup).post(handlers::auth::signup_submit),
        )
        .route(
            "/insert",
            get(handlers::pages::entry).post(handlers::reports::insert_submit),
        )
        .route("/{view}", get(handlers::pages::named_view))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_tracing))
        .with_state(state)
}
