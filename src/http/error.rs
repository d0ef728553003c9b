use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

pub type ApiResponse = (StatusCode, Json<serde_json::Value>);

pub fn ok(result: serde_json::Value) -> ApiResponse {
    (StatusCode::OK, Json(json!({ "ok": true, "result": result })))
}

/// Failure envelope. `code` is a stable machine-readable tag; `message` is
/// for humans and may change.
pub fn err(status: StatusCode, code: &str, message: impl Into<String>) -> ApiResponse {
    (
        status,
        Json(json!({
            "ok": false,
            "error": { "code": code, "message": message.into() },
        })),
    )
}
