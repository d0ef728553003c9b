use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Form;
use tracing::{info, warn};

use crate::auth::{self, AuthError, LoginForm, SignupForm};
use crate::http::types::AppState;
use crate::render::{self, Alert};

fn failure_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::UnreadableForm => StatusCode::BAD_REQUEST,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// A body that could not be decoded still gets its page back, with an alert.
fn rejected(page: fn(Option<&Alert>, &str) -> String) -> (StatusCode, Html<String>) {
    let e = AuthError::UnreadableForm;
    let alert = Alert::Error(e.to_string());
    (failure_status(&e), Html(page(Some(&alert), "")))
}

pub async fn login_submit(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "login form unreadable");
            return rejected(render::render_login);
        }
    };
    match auth::check_login(&form, &state.config.demo_account) {
        Ok(username) => {
            info!(username = %username, "login accepted");
            let alert = Alert::Success(format!("Login successful! Welcome, {username}."));
            (StatusCode::OK, Html(render::render_login(Some(&alert), &username)))
        }
        Err(e) => {
            warn!(reason = %e, "login rejected");
            let alert = Alert::Error(e.to_string());
            (
                failure_status(&e),
                Html(render::render_login(Some(&alert), form.username.trim())),
            )
        }
    }
}

pub async fn signup_submit(
    form: Result<Form<SignupForm>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "signup form unreadable");
            return rejected(render::render_signup);
        }
    };
    match auth::validate_registration(&form) {
        Ok(username) => {
            info!(username = %username, "registration accepted");
            let alert = Alert::Success(
                "Registration successful! You can now log in.".to_string(),
            );
            // The username field is cleared after a successful registration.
            (StatusCode::OK, Html(render::render_signup(Some(&alert), "")))
        }
        Err(e) => {
            warn!(reason = %e, "registration rejected");
            let alert = Alert::Error(e.to_string());
            (
                failure_status(&e),
                Html(render::render_signup(Some(&alert), form.username.trim())),
            )
        }
    }
}
