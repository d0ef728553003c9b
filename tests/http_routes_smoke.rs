use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use reportd::config::Config;
use reportd::db::{MemoryStore, ReportStore, SqliteStore};
use reportd::http::{build_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "reportd-test-boundary";

fn config() -> Config {
    Config {
        school_name: "Hillside Secondary".to_string(),
        subjects: vec!["Mathematics".to_string(), "English Language".to_string()],
        max_photo_bytes: 1024,
        ..Config::default()
    }
}

fn app_with(store: Arc<dyn ReportStore>) -> Router {
    build_router(AppState::new(config(), store))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, String::from_utf8(bytes.to_vec()).expect("utf8 body"))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn multipart_post(fields: &[(&str, &str)], photo: Option<&[u8]>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"student_photo\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/insert")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

fn score_fields<'a>(ca: &'a str, test: &'a str, exam: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("student_name", "John Doe"),
        ("student_id", "S123456"),
        ("grade_level", "SS2 A"),
        ("term", "Third"),
        ("mathematics_ca", ca),
        ("mathematics_test", test),
        ("mathematics_exam", exam),
        ("english_language_ca", ca),
        ("english_language_test", test),
        ("english_language_exam", exam),
    ]
}

#[tokio::test]
async fn root_and_named_views_render() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let (status, html) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Sign In"));

    let (status, html) = send(&app, get("/signup")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Create Account"));

    let (status, html) = send(&app, get("/report")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No report data found"));

    let (status, html) = send(&app, get("/insert")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"name="english_language_exam""#));
    assert!(html.contains("No report data found"));

    let (status, html) = send(&app, get("/welcome")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No report data found"));

    let (status, html) = send(&app, get("/dashboard")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("<code>dashboard</code>"));
}

#[tokio::test]
async fn health_reports_version_and_store() {
    let app = app_with(Arc::new(MemoryStore::new()));
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(v["ok"], true);
    assert_eq!(v["result"]["store"], "memory");
    assert_eq!(v["result"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn login_checks_the_demo_account() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let (status, html) = send(
        &app,
        form_post(
            "/login",
            "username=user%40example.com&password=password123&remember_me=on",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Login successful! Welcome, user@example.com."));

    let (status, html) = send(
        &app,
        form_post("/login", "username=user%40example.com&password=guess"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(html.contains("Invalid username or password. Please try again."));
    assert!(html.contains(r#"value="user@example.com""#));
    assert!(!html.contains("guess"));
}

#[tokio::test]
async fn signup_errors_are_inline_and_never_echo_passwords() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let (status, html) = send(
        &app,
        form_post(
            "/signup",
            "username=new%40example.com&password=longenough1&confirm_password=longenough2",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("Passwords do not match."));
    assert!(html.contains(r#"value="new@example.com""#));
    assert!(!html.contains("longenough"));

    let (status, html) = send(
        &app,
        form_post("/signup", "username=x&password=short&confirm_password=short"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("Password must be at least 8 characters long."));

    let (status, html) = send(
        &app,
        form_post(
            "/signup",
            "username=new%40example.com&password=longenough1&confirm_password=longenough1",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Registration successful!"));
}

#[tokio::test]
async fn submitted_report_is_redisplayed_and_served_as_json() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(SqliteStore::new(dir.path().join("reports.sqlite3")));
    let app = app_with(store);

    let (status, html) = send(&app, multipart_post(&score_fields("25", "18", "49"), Some(&b"\x89PNG"[..]))).await;
    assert_eq!(status, StatusCode::OK, "{html}");
    assert!(html.contains("Success! Report for John Doe submitted successfully."));
    assert!(html.contains("Hillside Secondary"));
    assert!(html.contains("92.00"));
    assert!(html.contains(r#"data-field="overall-percentage">92.00%<"#));
    assert!(html.contains(r#"data-field="status">Excellent<"#));
    assert!(html.contains("data:image/png;base64,iVBORw=="));

    let (status, body) = send(&app, get("/api/report/latest")).await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(v["ok"], true);
    let report = &v["result"]["report"];
    assert_eq!(report["student"]["name"], "John Doe");
    assert_eq!(report["totalSubjects"], 2);
    assert_eq!(report["overallPercentage"], "92.00");
    assert_eq!(report["status"], "Excellent");
    assert_eq!(report["subjects"][0]["grade"], "A");

    let (_, html) = send(&app, multipart_post(&score_fields("10", "10", "20"), None)).await;
    assert!(html.contains(r#"data-field="status">Fail<"#));
    let (_, body) = send(&app, get("/api/report/latest")).await;
    let v: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(v["result"]["report"]["overallPercentage"], "40.00");
}

#[tokio::test]
async fn invalid_submission_is_rejected_inline_without_storing() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone());

    let (status, html) = send(&app, multipart_post(&score_fields("31", "18", "49"), None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("Mathematics CA score must be a whole number between 0 and 30."));
    assert!(html.contains(r#"name="mathematics_ca""#));
    assert!(store.is_empty());

    let (status, html) = send(
        &app,
        multipart_post(&score_fields("25", "18", "49"), Some(&[0_u8; 2048][..])),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("Student photo exceeds the 1 KB limit."));
    assert!(store.is_empty());

    let (_, body) = send(&app, get("/api/report/latest")).await;
    let v: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(v["ok"], true);
    assert!(v["result"]["report"].is_null());
}

#[tokio::test]
async fn unreachable_store_degrades_to_an_alert() {
    let dir = tempfile::tempdir().expect("temp dir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file").expect("write blocker");
    let app = app_with(Arc::new(SqliteStore::new(blocker.join("db.sqlite3"))));

    let (status, html) = send(&app, get("/insert")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(html.contains("Database unavailable"));
    assert!(html.contains(r#"action="/insert""#));

    let (status, html) = send(&app, multipart_post(&score_fields("25", "18", "49"), None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(html.contains("Database unavailable"));

    let (status, body) = send(&app, get("/api/report/latest")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let v: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(v["ok"], false);
    assert_eq!(v["error"]["code"], "store_unavailable");
}

#[tokio::test]
async fn undecodable_bodies_still_render_their_page() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone());

    let (status, html) = send(
        &app,
        form_post("/insert", "student_name=John+Doe&student_id=S1"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("Could not read the submitted form"));
    assert!(html.contains(r#"action="/insert""#));
    assert!(store.is_empty());

    let plain_text = |uri: &str| {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("username=someone"))
            .expect("request")
    };

    let (status, html) = send(&app, plain_text("/login")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("Could not read the submitted form. Please try again."));
    assert!(html.contains("Sign In"));

    let (status, html) = send(&app, plain_text("/signup")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("Could not read the submitted form. Please try again."));
    assert!(html.contains("Create Account"));
}
