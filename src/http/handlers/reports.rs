use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use serde_json::json;
use tracing::{error, info, warn};

use crate::http::error::{err, ok, ApiResponse};
use crate::http::types::AppState;
use crate::render::{self, Alert, EntryPage};
use crate::submission::{self, SubmissionError, SubmissionFields};

const PHOTO_FIELD: &str = "student_photo";

/// Reads the multipart body. The photo is streamed and abandoned as soon as
/// it passes the configured limit.
async fn collect_fields(
    mut multipart: Multipart,
    max_photo_bytes: usize,
) -> Result<SubmissionFields, SubmissionError> {
    let malformed = |e: axum::extract::multipart::MultipartError| SubmissionError::Malformed(e.body_text());
    let mut fields = SubmissionFields::default();
    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == PHOTO_FIELD {
            let mut bytes = Vec::new();
            while let Some(chunk) = field.chunk().await.map_err(malformed)? {
                bytes.extend_from_slice(&chunk);
                if bytes.len() > max_photo_bytes {
                    return Err(SubmissionError::PhotoTooLarge {
                        limit_kb: max_photo_bytes / 1024,
                    });
                }
            }
            fields.photo = Some(bytes);
        } else {
            let value = field.text().await.map_err(malformed)?;
            fields.text.insert(name, value);
        }
    }
    Ok(fields)
}

/// `POST /insert`: validate, store, then redisplay the entry page with the
/// latest report.
pub async fn insert_submit(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Html<String>) {
    let max_photo = state.config.max_photo_bytes;
    let collected = match multipart {
        Ok(multipart) => collect_fields(multipart, max_photo).await,
        Err(rejection) => Err(SubmissionError::Malformed(rejection.body_text())),
    };
    let parsed = collected.and_then(|fields| {
        submission::build_report(
            &fields,
            &state.config.subjects,
            max_photo,
            chrono::Local::now().date_naive(),
        )
    });

    let mut status = StatusCode::OK;
    let mut store_error = false;
    let flash = match parsed {
        Ok(report) => {
            let name = report.name.clone();
            match state.insert_report(report).await {
                Ok(id) => {
                    info!(id, "report submitted");
                    Some(Alert::Success(format!(
                        "Success! Report for {name} submitted successfully."
                    )))
                }
                Err(e) => {
                    error!(error = %e, "could not store report");
                    status = StatusCode::SERVICE_UNAVAILABLE;
                    store_error = true;
                    None
                }
            }
        }
        Err(e) => {
            warn!(reason = %e, "submission rejected");
            status = match e {
                SubmissionError::Malformed(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            Some(Alert::Error(e.to_string()))
        }
    };

    let card = if store_error {
        None
    } else {
        match state.latest_report().await {
            Ok(row) => row.map(|(_, card)| card),
            Err(e) => {
                error!(error = %e, "could not load latest report");
                status = StatusCode::SERVICE_UNAVAILABLE;
                store_error = true;
                None
            }
        }
    };

    let html = render::render_entry_page(EntryPage {
        school_name: &state.config.school_name,
        subjects: &state.config.subjects,
        flash: flash.as_ref(),
        store_error,
        report: card.as_ref(),
    });
    (status, Html(html))
}

/// `GET /api/report/latest`: the evaluated latest report as JSON.
pub async fn latest_json(State(state): State<AppState>) -> ApiResponse {
    match state.latest_report().await {
        Ok(Some((row, card))) => ok(json!({
            "id": row.id,
            "timestamp": row.timestamp,
            "report": card,
        })),
        Ok(None) => ok(json!({ "report": null })),
        Err(e) => {
            error!(error = %e, "could not load latest report");
            err(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "the report database could not be reached",
            )
        }
    }
}
