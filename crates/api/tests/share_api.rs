//! External share links: creation, public access, revocation.

mod common;

use axum::http::StatusCode;
use common::{
    approve_directly, body_json, build_test_app, create_report, create_user, get, get_auth,
    post_auth, post_json_auth, token_for,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_cannot_be_shared(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let report = create_report(&pool, &inspector, "pre_purchase").await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/reports/{}/shares", report.id);
    let response = post_json_auth(app, &uri, json!({}), &token_for(&inspector)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_recipient_email_is_400(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let report = create_report(&pool, &inspector, "pre_purchase").await;
    approve_directly(&pool, &report, &reviewer).await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/reports/{}/shares", report.id);
    let body = json!({ "recipient_email": "not an email" });
    let response = post_json_auth(app, &uri, body, &token_for(&inspector)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// The token works publicly until revoked, and each access is counted.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_share_lifecycle(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let report = create_report(&pool, &inspector, "pre_purchase").await;
    approve_directly(&pool, &report, &reviewer).await;
    let token = token_for(&inspector);

    let uri = format!("/api/v1/reports/{}/shares", report.id);
    let body = json!({
        "recipient_email": "buyer@example.com",
        "recipient_name": "Sam Buyer",
        "expires_in_days": 7,
    });
    let response = post_json_auth(build_test_app(pool.clone()), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let share_token = json["data"]["token"].as_str().unwrap().to_string();
    let share_id = json["data"]["share"]["id"].as_i64().unwrap();
    assert_eq!(
        json["data"]["url"],
        format!("http://localhost:5173/shared/{share_token}")
    );
    assert!(json["data"]["share"].get("token_hash").is_none());

    let public_uri = format!("/api/v1/shared/{share_token}");
    let response = get(build_test_app(pool.clone()), &public_uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["report"]["id"], report.id);

    let response = get_auth(build_test_app(pool.clone()), &uri, &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["access_count"], 1);

    let revoke_uri = format!("/api/v1/shares/{share_id}/revoke");
    let response = post_auth(build_test_app(pool.clone()), &revoke_uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["revoked_at"].is_string());

    let response = get(build_test_app(pool), &public_uri).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_token_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/shared/this-token-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expiry_outside_bounds_is_400(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let report = create_report(&pool, &inspector, "pre_purchase").await;
    approve_directly(&pool, &report, &reviewer).await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/reports/{}/shares", report.id);
    let body = json!({ "expires_in_days": 0 });
    let response = post_json_auth(app, &uri, body, &token_for(&inspector)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
