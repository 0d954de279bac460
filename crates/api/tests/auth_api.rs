//! Authentication and role enforcement at the HTTP boundary.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create_user, get, get_auth, token_for};
use roofline_db::models::user::UpdateUser;
use roofline_db::repositories::UserRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Token handling
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_token_is_401(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/reports").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_garbage_token_is_401(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get_auth(app, "/api/v1/reports", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A valid token for an identity with no provisioned account is refused.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unprovisioned_identity_is_403(pool: PgPool) {
    let user = create_user(&pool, "inspector", "ghost").await;
    let token = token_for(&user);
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = build_test_app(pool);
    let response = get_auth(app, "/api/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivated_user_is_403(pool: PgPool) {
    let user = create_user(&pool, "inspector", "retired").await;
    UserRepo::update(
        &pool,
        user.id,
        &UpdateUser {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let app = build_test_app(pool);
    let response = get_auth(app, "/api/v1/me", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Profile and RBAC
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_returns_profile(pool: PgPool) {
    let user = create_user(&pool, "inspector", "mere").await;
    let app = build_test_app(pool);

    let response = get_auth(app, "/api/v1/me", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert_eq!(json["data"]["user"]["email"], "mere@roofline.test");
    assert!(json["data"]["open_assignments"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inspector_cannot_reach_admin_routes(pool: PgPool) {
    let user = create_user(&pool, "inspector", "nosy").await;
    let app = build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/users", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_lists_users(pool: PgPool) {
    let admin = create_user(&pool, "admin", "root").await;
    create_user(&pool, "inspector", "tama").await;
    let app = build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/users", &token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().len() >= 2);
}
