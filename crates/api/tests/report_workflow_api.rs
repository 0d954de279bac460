//! Report creation, visibility, editing rules and lifecycle transitions.

mod common;

use axum::http::StatusCode;
use common::{
    approve_directly, body_json, build_test_app, create_report, create_user, delete_auth,
    get_auth, post_auth, post_json_auth, post_multipart_auth, put_json_auth, token_for,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Creation and visibility
// ---------------------------------------------------------------------------

/// Inspectors always own the reports they create, whatever the body says.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inspector_creates_own_report(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let other = create_user(&pool, "inspector", "rawiri").await;
    let app = build_test_app(pool);

    let body = json!({
        "inspection_type": "pre_purchase",
        "property_address": "4 Rimu Lane",
        "inspector_id": other.id,
    });
    let response = post_json_auth(app, "/api/v1/reports", body, &token_for(&inspector)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "draft");
    assert_eq!(json["data"]["inspector_id"], inspector.id);
    assert!(json["data"]["report_number"]
        .as_str()
        .unwrap()
        .starts_with("RR-"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_inspection_type_is_400(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let app = build_test_app(pool);

    let body = json!({ "inspection_type": "vibes" });
    let response = post_json_auth(app, "/api/v1/reports", body, &token_for(&inspector)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reviewer_cannot_create_reports(pool: PgPool) {
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let app = build_test_app(pool);

    let body = json!({ "inspection_type": "maintenance" });
    let response = post_json_auth(app, "/api/v1/reports", body, &token_for(&reviewer)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Other inspectors get 404, not 403, so report ids are not probeable.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_report_is_hidden(pool: PgPool) {
    let owner = create_user(&pool, "inspector", "owner").await;
    let stranger = create_user(&pool, "inspector", "stranger").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let report = create_report(&pool, &owner, "maintenance").await;
    let uri = format!("/api/v1/reports/{}", report.id);

    let response = get_auth(build_test_app(pool.clone()), &uri, &token_for(&stranger)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(build_test_app(pool), &uri, &token_for(&reviewer)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_is_scoped_for_inspectors(pool: PgPool) {
    let owner = create_user(&pool, "inspector", "owner").await;
    let stranger = create_user(&pool, "inspector", "stranger").await;
    create_report(&pool, &owner, "maintenance").await;
    create_report(&pool, &owner, "dispute").await;
    create_report(&pool, &stranger, "maintenance").await;
    let app = build_test_app(pool);

    let response = get_auth(app, "/api/v1/reports", &token_for(&owner)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inspector_updates_draft(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let report = create_report(&pool, &inspector, "full_inspection").await;
    let app = build_test_app(pool);

    let body = json!({ "executive_summary": "Roof is in fair condition." });
    let uri = format!("/api/v1/reports/{}", report.id);
    let response = put_json_auth(app, &uri, body, &token_for(&inspector)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["executive_summary"], "Roof is in fair condition.");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reviewer_cannot_write_inspector_fields(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let report = create_report(&pool, &inspector, "full_inspection").await;
    let app = build_test_app(pool);

    let body = json!({ "executive_summary": "Overwritten" });
    let uri = format!("/api/v1/reports/{}", report.id);
    let response = put_json_auth(app, &uri, body, &token_for(&reviewer)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_update_is_400(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let report = create_report(&pool, &inspector, "full_inspection").await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/reports/{}", report.id);
    let response = put_json_auth(app, &uri, json!({}), &token_for(&inspector)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Approved reports are frozen except for reviewer notes.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approved_report_is_read_only(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let report = create_report(&pool, &inspector, "full_inspection").await;
    approve_directly(&pool, &report, &reviewer).await;
    let uri = format!("/api/v1/reports/{}", report.id);

    let body = json!({ "conclusions": "Changed my mind" });
    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        body,
        &token_for(&inspector),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = json!({ "reviewer_notes": "Checked flashing photos" });
    let response = put_json_auth(build_test_app(pool), &uri, body, &token_for(&reviewer)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_drafts_can_be_deleted(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let draft = create_report(&pool, &inspector, "maintenance").await;
    let approved = create_report(&pool, &inspector, "maintenance").await;
    approve_directly(&pool, &approved, &reviewer).await;
    let token = token_for(&inspector);

    let uri = format!("/api/v1/reports/{}", approved.id);
    let response = delete_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let uri = format!("/api/v1/reports/{}", draft.id);
    let response = delete_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// An empty draft fails submission validation with every finding listed.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_incomplete_report_is_422(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let report = create_report(&pool, &inspector, "full_inspection").await;
    let token = token_for(&inspector);

    let uri = format!("/api/v1/reports/{}/validation", report.id);
    let response = get_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["can_submit"], false);

    let uri = format!("/api/v1/reports/{}/submit", report.id);
    let response = post_auth(build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "SUBMISSION_INVALID");
    assert!(!json["validation"]["errors"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_draft_is_409(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let report = create_report(&pool, &inspector, "full_inspection").await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/reports/{}/approve", report.id);
    let response = post_auth(app, &uri, &token_for(&reviewer)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inspector_cannot_approve(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let report = create_report(&pool, &inspector, "full_inspection").await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/reports/{}/approve", report.id);
    let response = post_auth(app, &uri, &token_for(&inspector)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_request_revision_requires_comment(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let report = create_report(&pool, &inspector, "full_inspection").await;
    sqlx::query("UPDATE reports SET status = 'pending_review' WHERE id = $1")
        .bind(report.id)
        .execute(&pool)
        .await
        .unwrap();
    let token = token_for(&reviewer);
    let uri = format!("/api/v1/reports/{}/request-revision", report.id);

    let response = post_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json!({ "comment": "Please add photos of the valley gutter." });
    let response = post_json_auth(build_test_app(pool), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "revision_required");
    assert_eq!(json["data"]["reviewer_id"], reviewer.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_finalise_then_archive(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let admin = create_user(&pool, "admin", "root").await;
    let report = create_report(&pool, &inspector, "full_inspection").await;
    approve_directly(&pool, &report, &reviewer).await;

    let uri = format!("/api/v1/reports/{}/finalise", report.id);
    let response = post_auth(build_test_app(pool.clone()), &uri, &token_for(&reviewer)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "finalised");

    let uri = format!("/api/v1/reports/{}/archive", report.id);
    let response = post_auth(build_test_app(pool.clone()), &uri, &token_for(&reviewer)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_auth(build_test_app(pool), &uri, &token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "archived");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pdf_without_renderer_is_503(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let report = create_report(&pool, &inspector, "full_inspection").await;
    approve_directly(&pool, &report, &reviewer).await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/reports/{}/pdf", report.id);
    let response = post_auth(app, &uri, &token_for(&reviewer)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ---------------------------------------------------------------------------
// Audit trail
// ---------------------------------------------------------------------------

/// Actions through the API leave a verifiable chain and a revision history.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_actions_are_audited(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let admin = create_user(&pool, "admin", "root").await;
    let token = token_for(&inspector);

    let body = json!({ "inspection_type": "maintenance", "property_address": "9 Tui Road" });
    let response = post_json_auth(build_test_app(pool.clone()), "/api/v1/reports", body, &token).await;
    let report_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/reports/{report_id}");
    let body = json!({ "conclusions": "Replace ridge capping." });
    let response = put_json_auth(build_test_app(pool.clone()), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/v1/reports/{report_id}/audit");
    let response = get_auth(build_test_app(pool.clone()), &uri, &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let uri = format!("/api/v1/reports/{report_id}/revisions");
    let response = get_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/admin/audit-logs/integrity-check",
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["chain_valid"], true);
    assert!(json["data"]["verified_entries"].as_i64().unwrap() >= 2);
}

// ---------------------------------------------------------------------------
// Review rounds end to end
// ---------------------------------------------------------------------------

const FIRST_CONCLUSIONS: &str =
    "Roof is weathertight overall; minor flashing maintenance is recommended.";

/// Bring a pre-purchase draft up to the submission minimums through the API:
/// header fields, two rated roof elements, ten photos and a complete E2/AS1
/// checklist.
async fn complete_pre_purchase(pool: &PgPool, report_id: i64, token: &str) {
    let today = chrono::Utc::now().date_naive().to_string();
    let uri = format!("/api/v1/reports/{report_id}");
    let body = json!({
        "inspection_date": today,
        "executive_summary": "Long-run steel roof in fair condition for its age.",
        "conclusions": FIRST_CONCLUSIONS,
    });
    let response = put_json_auth(build_test_app(pool.clone()), &uri, body, token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/v1/reports/{report_id}/roof-elements");
    for (element_type, condition) in [("roof_cladding", "fair"), ("gutter", "good")] {
        let body = json!({ "element_type": element_type, "condition_rating": condition });
        let response = post_json_auth(build_test_app(pool.clone()), &uri, body, token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let uri = format!("/api/v1/reports/{report_id}/photos");
    for n in 0..10 {
        let bytes = format!("roof-photo-{n}").into_bytes();
        let caption = format!("Roof elevation {n}");
        let response = post_multipart_auth(
            build_test_app(pool.clone()),
            &uri,
            ("roof.jpg", "image/jpeg", bytes.as_slice()),
            &[
                ("caption", caption.as_str()),
                ("gps_latitude", "-43.5321"),
                ("gps_longitude", "172.6362"),
            ],
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let uri = format!("/api/v1/reports/{report_id}/compliance/e2_as1");
    let body = json!({
        "items": {
            "e2_roof_pitch": { "result": "pass" },
            "e2_flashings": { "result": "pass" },
            "e2_penetrations": { "result": "na" },
            "e2_underlay": { "result": "pass" },
            "e2_gutters": { "result": "pass" },
            "e2_junctions": { "result": "pass" },
        }
    });
    let response = put_json_auth(build_test_app(pool.clone()), &uri, body, token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Submit, send back, rework, resubmit and approve: the revision history
/// shows two rounds with their outcomes and only the rework in round two.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revision_rounds_through_review(pool: PgPool) {
    let inspector = create_user(&pool, "inspector", "hemi").await;
    let reviewer = create_user(&pool, "reviewer", "rangi").await;
    let report = create_report(&pool, &inspector, "pre_purchase").await;
    let token = token_for(&inspector);
    let reviewer_token = token_for(&reviewer);

    complete_pre_purchase(&pool, report.id, &token).await;

    let uri = format!("/api/v1/reports/{}/validation", report.id);
    let response = get_auth(build_test_app(pool.clone()), &uri, &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["can_submit"], true, "{json}");

    let submit_uri = format!("/api/v1/reports/{}/submit", report.id);
    let response = post_auth(build_test_app(pool.clone()), &submit_uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending_review");
    assert_eq!(json["data"]["revision_round"], 1);

    let uri = format!("/api/v1/reports/{}/request-revision", report.id);
    let body = json!({ "comment": "Conclusions should mention the gutter outlets." });
    let response = post_json_auth(build_test_app(pool.clone()), &uri, body, &reviewer_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let report_uri = format!("/api/v1/reports/{}", report.id);
    let body = json!({ "reviewer_notes": "Check outlet sizing against E2/AS1 table 5." });
    let response =
        put_json_auth(build_test_app(pool.clone()), &report_uri, body, &reviewer_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    for conclusions in [
        "Roof is weathertight; gutter outlets are undersized for the catchment.",
        "Roof is weathertight overall; gutter outlets are undersized and should be enlarged.",
    ] {
        let body = json!({ "conclusions": conclusions });
        let response = put_json_auth(build_test_app(pool.clone()), &report_uri, body, &token).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = post_auth(build_test_app(pool.clone()), &submit_uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["revision_round"], 2);

    let uri = format!("/api/v1/reports/{}/approve", report.id);
    let response = post_auth(build_test_app(pool.clone()), &uri, &reviewer_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "approved");

    let uri = format!("/api/v1/reports/{}/revisions", report.id);
    let response = get_auth(build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await["data"].clone();

    assert_eq!(history["total_submissions"], 2);
    assert_eq!(history["current_round"], 2);
    let rounds = history["rounds"].as_array().unwrap();
    assert_eq!(rounds.len(), 2);

    let first = &rounds[0];
    assert_eq!(first["outcome"]["decision"], "report_request_revision");
    assert_eq!(first["outcome"]["reviewer_id"], reviewer.id);
    assert_eq!(
        first["outcome"]["comment"],
        "Conclusions should mention the gutter outlets."
    );
    assert_eq!(first["entities_created"]["photo"], 10);
    assert_eq!(first["entities_created"]["roof_element"], 2);
    assert_eq!(first["entities_created"]["compliance_assessment"], 1);
    assert!(first["net_changes"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["field"] == "reviewer_notes"));

    let second = &rounds[1];
    assert!(!second["submitted_at"].is_null());
    assert_eq!(second["outcome"]["decision"], "report_approve");
    assert_eq!(second["decisions"].as_array().unwrap().len(), 1);
    assert_eq!(second["entry_count"], 3);
    assert_eq!(second["changes"].as_array().unwrap().len(), 2);
    let net = second["net_changes"].as_array().unwrap();
    assert_eq!(net.len(), 1);
    assert_eq!(net[0]["field"], "conclusions");
    assert_eq!(net[0]["old"], FIRST_CONCLUSIONS);
    assert_eq!(
        net[0]["new"],
        "Roof is weathertight overall; gutter outlets are undersized and should be enlarged."
    );
}
