use axum::extract::State;
use serde_json::json;

use crate::http::error::{ok, ApiResponse};
use crate::http::types::AppState;

pub async fn health(State(state): State<AppState>) -> ApiResponse {
    ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.store.describe(),
    }))
}
