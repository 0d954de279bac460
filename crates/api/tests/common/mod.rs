#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use roofline_api::auth::identity::{Claims, IdentityConfig};
use roofline_api::config::ServerConfig;
use roofline_api::pdf::PdfConfig;
use roofline_api::routes;
use roofline_api::state::AppState;
use roofline_api::storage::{LocalStore, StorageBackend, StorageConfig};
use roofline_core::report::ReportStatus;
use roofline_db::models::report::{CreateReport, Report};
use roofline_db::models::user::{CreateUser, User};
use roofline_db::repositories::{ReportRepo, RoleRepo, UserRepo};
use roofline_events::EventBus;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Build a test `ServerConfig` with safe defaults.
///
/// Files go to a fresh temp directory per app; no PDF renderer.
pub fn test_config() -> ServerConfig {
    let local_root = std::env::temp_dir()
        .join(format!("roofline-test-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        max_upload_bytes: 5 * 1024 * 1024,
        public_base_url: "http://localhost:5173".to_string(),
        share_default_expiry_days: 14,
        lbp_board_email: Some("complaints@board.test".to_string()),
        identity: IdentityConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            issuer: None,
            audience: None,
        },
        storage: StorageConfig {
            backend: StorageBackend::Local,
            local_root,
            public_url: "http://localhost:3000/files".to_string(),
            s3_bucket: None,
            s3_region: "ap-southeast-2".to_string(),
            s3_endpoint: None,
        },
        pdf: PdfConfig { renderer_url: None },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let store = Arc::new(LocalStore::new(
        &config.storage.local_root,
        &config.storage.public_url,
    ));
    let body_limit = config.max_upload_bytes + 64 * 1024;

    let state = AppState {
        pool,
        config: Arc::new(config),
        event_bus: Arc::new(EventBus::default()),
        store,
        pdf: None,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Provision a user with the given role name. `handle` makes the external
/// id and email unique within a test.
pub async fn create_user(pool: &PgPool, role: &str, handle: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role)
        .await
        .unwrap()
        .expect("role is seeded by migrations");
    UserRepo::create(
        pool,
        &CreateUser {
            external_id: format!("idp|{handle}"),
            email: format!("{handle}@roofline.test"),
            display_name: handle.to_string(),
            role_id: role.id,
            lbp_number: None,
            phone: None,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Mint an identity-provider token for a user.
pub fn token_for(user: &User) -> String {
    let claims = Claims {
        sub: user.external_id.clone(),
        email: Some(user.email.clone()),
        exp: chrono::Utc::now().timestamp() + 3600,
        iss: None,
        aud: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Insert a draft report owned by `inspector`.
pub async fn create_report(pool: &PgPool, inspector: &User, inspection_type: &str) -> Report {
    ReportRepo::create(
        pool,
        &CreateReport {
            inspection_type: inspection_type.to_string(),
            property_address: Some("12 Kowhai Street".to_string()),
            property_suburb: Some("Sydenham".to_string()),
            property_city: Some("Christchurch".to_string()),
            property_postcode: Some("8023".to_string()),
            client_name: Some("Aroha Williams".to_string()),
            inspector_id: Some(inspector.id),
            ..Default::default()
        },
        inspector.id,
    )
    .await
    .expect("report creation should succeed")
}

/// Force a report into `approved` without running submission checks.
pub async fn approve_directly(pool: &PgPool, report: &Report, reviewer: &User) -> Report {
    ReportRepo::transition_status(
        pool,
        report.id,
        ReportStatus::Draft,
        ReportStatus::PendingReview,
        None,
    )
    .await
    .unwrap()
    .expect("draft report should move to pending review");
    ReportRepo::transition_status(
        pool,
        report.id,
        ReportStatus::PendingReview,
        ReportStatus::Approved,
        Some(reviewer.id),
    )
    .await
    .unwrap()
    .expect("pending report should move to approved")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: Router, req: Request<Body>) -> Response {
    app.oneshot(req).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

/// POST with no body, as used by most workflow actions.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

const MULTIPART_BOUNDARY: &str = "roofline-test-boundary";

/// POST a `multipart/form-data` body: one `file` part plus text fields.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    file: (&str, &str, &[u8]),
    fields: &[(&str, &str)],
    token: &str,
) -> Response {
    let (filename, content_type, bytes) = file;
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{name}\"\r\n\r\n\
                 {value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, req).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
