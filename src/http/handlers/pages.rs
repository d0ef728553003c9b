use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use tracing::error;

use crate::http::types::AppState;
use crate::render::{self, EntryPage};

pub async fn index() -> Html<String> {
    Html(render::render_login(None, ""))
}

pub async fn login() -> Html<String> {
    Html(render::render_login(None, ""))
}

pub async fn signup() -> Html<String> {
    Html(render::render_signup(None, ""))
}

pub async fn entry(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    let (store_error, card) = match state.latest_report().await {
        Ok(row) => (false, row.map(|(_, card)| card)),
        Err(e) => {
            error!(error = %e, "could not load latest report");
            (true, None)
        }
    };
    let html = render::render_entry_page(EntryPage {
        school_name: &state.config.school_name,
        subjects: &state.config.subjects,
        flash: None,
        store_error,
        report: card.as_ref(),
    });
    let status = if store_error {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Html(html))
}

async fn report(state: &AppState) -> (StatusCode, Html<String>) {
    match state.latest_report().await {
        Ok(row) => {
            let card = row.map(|(_, card)| card);
            (
                StatusCode::OK,
                Html(render::render_report_page(
                    card.as_ref(),
                    &state.config.school_name,
                    false,
                )),
            )
        }
        Err(e) => {
            error!(error = %e, "could not load latest report");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(render::render_report_page(None, &state.config.school_name, true)),
            )
        }
    }
}

/// `GET /{view}`: views that have no dedicated route.
pub async fn named_view(
    State(state): State<AppState>,
    Path(view): Path<String>,
) -> (StatusCode, Html<String>) {
    match view.as_str() {
        "report" | "welcome" => report(&state).await,
        _ => (StatusCode::NOT_FOUND, Html(render::render_not_found(&view))),
    }
}
