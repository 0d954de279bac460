//! Integration tests for report, child-record, share and complaint
//! repositories against a real database.

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, Utc};
use roofline_core::complaint::ComplaintStatus;
use roofline_core::inspection_request::InspectionRequestInput;
use roofline_core::report::ReportStatus;
use roofline_core::types::DbId;
use roofline_db::models::assignment::{CreateAssignment, UpdateAssignment};
use roofline_db::models::complaint::{ComplaintDraft, ComplaintFilter};
use roofline_db::models::defect::{CreateDefect, UpdateDefect};
use roofline_db::models::inspection_request::InspectionRequestFilter;
use roofline_db::models::photo::{NewPhoto, UpdatePhoto};
use roofline_db::models::report::{CreateReport, ReportFilter, UpdateReport};
use roofline_db::models::roof_element::CreateRoofElement;
use roofline_db::models::share::NewShare;
use roofline_db::models::template::CreateReportTemplate;
use roofline_db::models::user::{CreateUser, UpdateUser};
use roofline_db::repositories::{
    AssignmentRepo, ComplaintRepo, ComplianceRepo, DefectRepo, InspectionRequestRepo, PhotoRepo,
    ReportRepo, RoleRepo, RoofElementRepo, ShareRepo, TemplateRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, role: &str, name: &str) -> DbId {
    let role = RoleRepo::find_by_name(pool, role).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            external_id: format!("idp|{name}"),
            email: format!("{name}@roofline.test"),
            display_name: name.to_string(),
            role_id: role.id,
            lbp_number: None,
            phone: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_report(inspection_type: &str, address: &str, inspector_id: Option<DbId>) -> CreateReport {
    CreateReport {
        inspection_type: inspection_type.to_string(),
        property_address: Some(address.to_string()),
        inspector_id,
        ..Default::default()
    }
}

fn new_defect(title: &str) -> CreateDefect {
    CreateDefect {
        roof_element_id: None,
        title: title.to_string(),
        description: None,
        location: None,
        severity: "major".to_string(),
        category: "flashing".to_string(),
        recommendation: None,
    }
}

fn new_photo(report_id: DbId, hash: &str) -> NewPhoto {
    NewPhoto {
        report_id,
        defect_id: None,
        roof_element_id: None,
        storage_key: format!("reports/{report_id}/photos/{hash}.jpg"),
        url: format!("/files/reports/{report_id}/photos/{hash}.jpg"),
        original_filename: Some("IMG_0001.jpg".into()),
        content_type: "image/jpeg".into(),
        size_bytes: 2048,
        width: Some(4032),
        height: Some(3024),
        sha256_hash: hash.to_string(),
        client_hash: None,
        hash_verified: false,
        captured_at: None,
        gps_latitude: Some(-43.53),
        gps_longitude: Some(172.63),
        gps_accuracy_m: Some(5.0),
        camera_make: None,
        camera_model: None,
        caption: None,
        uploaded_by: None,
    }
}

fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            db.constraint().map(str::to_string)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_create_resolves_role_name(pool: PgPool) {
    let id = new_user(&pool, "reviewer", "rangi").await;
    let user = UserRepo::find_by_external_id(&pool, "idp|rangi")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.role, "reviewer");
    assert!(user.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_duplicate_email_rejected(pool: PgPool) {
    new_user(&pool, "inspector", "aroha").await;
    let role = RoleRepo::find_by_name(&pool, "inspector").await.unwrap().unwrap();
    let err = UserRepo::create(
        &pool,
        &CreateUser {
            external_id: "idp|other".into(),
            email: "aroha@roofline.test".into(),
            display_name: "Other".into(),
            role_id: role.id,
            lbp_number: None,
            phone: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_deactivate_and_list_by_role(pool: PgPool) {
    let a = new_user(&pool, "reviewer", "ana").await;
    new_user(&pool, "reviewer", "ben").await;
    new_user(&pool, "inspector", "cat").await;

    UserRepo::update(
        &pool,
        a,
        &UpdateUser {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(UserRepo::list(&pool, Some("reviewer")).await.unwrap().len(), 2);
    let active = UserRepo::list_active_by_roles(&pool, &["reviewer", "admin"])
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].display_name, "ben");
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_numbers_are_sequential(pool: PgPool) {
    let creator = new_user(&pool, "inspector", "ira").await;
    let a = ReportRepo::create(&pool, &new_report("maintenance", "1 Kauri St", None), creator)
        .await
        .unwrap();
    let b = ReportRepo::create(&pool, &new_report("maintenance", "2 Kauri St", None), creator)
        .await
        .unwrap();

    assert!(a.report_number.starts_with("RR-"));
    assert_ne!(a.report_number, b.report_number);
    assert_eq!(a.status, "draft");
    assert_eq!(a.revision_round, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_list_filters_and_visibility(pool: PgPool) {
    let alice = new_user(&pool, "inspector", "alice").await;
    let bob = new_user(&pool, "inspector", "bob").await;
    let admin = new_user(&pool, "admin", "root").await;

    ReportRepo::create(&pool, &new_report("dispute", "10 Rimu Road", Some(alice)), alice)
        .await
        .unwrap();
    let assigned = ReportRepo::create(&pool, &new_report("maintenance", "4 Matai Ave", None), admin)
        .await
        .unwrap();
    ReportRepo::create(&pool, &new_report("maintenance", "8 Totara Tce", None), admin)
        .await
        .unwrap();
    AssignmentRepo::create(
        &pool,
        assigned.id,
        &CreateAssignment {
            inspector_id: bob,
            due_date: None,
            notes: None,
        },
        admin,
    )
    .await
    .unwrap();

    let all = ReportFilter::default();
    assert_eq!(ReportRepo::count(&pool, &all).await.unwrap(), 3);

    let bobs = ReportFilter {
        visible_to: Some(bob),
        ..Default::default()
    };
    let visible = ReportRepo::list(&pool, &bobs).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, assigned.id);
    assert!(ReportRepo::is_visible_to(&pool, assigned.id, bob).await.unwrap());
    assert!(!ReportRepo::is_visible_to(&pool, assigned.id, alice).await.unwrap());

    let search = ReportFilter {
        search: Some("rimu".into()),
        ..Default::default()
    };
    assert_eq!(ReportRepo::count(&pool, &search).await.unwrap(), 1);

    let by_type = ReportFilter {
        inspection_type: Some("maintenance".into()),
        limit: Some(1),
        ..Default::default()
    };
    assert_eq!(ReportRepo::list(&pool, &by_type).await.unwrap().len(), 1);
    assert_eq!(ReportRepo::count(&pool, &by_type).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_partial_update_keeps_other_fields(pool: PgPool) {
    let creator = new_user(&pool, "inspector", "hemi").await;
    let report = ReportRepo::create(&pool, &new_report("pre_purchase", "3 Nikau Pl", None), creator)
        .await
        .unwrap();

    let updated = ReportRepo::update(
        &pool,
        report.id,
        &UpdateReport {
            conclusions: Some("Roof is sound".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.conclusions.as_deref(), Some("Roof is sound"));
    assert_eq!(updated.property_address.as_deref(), Some("3 Nikau Pl"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transition_is_guarded_on_expected_status(pool: PgPool) {
    let inspector = new_user(&pool, "inspector", "tama").await;
    let reviewer = new_user(&pool, "reviewer", "wiremu").await;
    let report = ReportRepo::create(&pool, &new_report("maintenance", "5 Harakeke St", Some(inspector)), inspector)
        .await
        .unwrap();

    let submitted = ReportRepo::transition_status(
        &pool,
        report.id,
        ReportStatus::Draft,
        ReportStatus::PendingReview,
        None,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(submitted.status, "pending_review");
    assert_eq!(submitted.revision_round, 1);
    assert!(submitted.submitted_at.is_some());

    // A second submit from draft finds nothing to update.
    let again = ReportRepo::transition_status(
        &pool,
        report.id,
        ReportStatus::Draft,
        ReportStatus::PendingReview,
        None,
    )
    .await
    .unwrap();
    assert!(again.is_none());

    let approved = ReportRepo::transition_status(
        &pool,
        report.id,
        ReportStatus::PendingReview,
        ReportStatus::Approved,
        Some(reviewer),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(approved.status, "approved");
    assert_eq!(approved.reviewer_id, Some(reviewer));
    assert!(approved.approved_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_drafts_can_be_deleted(pool: PgPool) {
    let creator = new_user(&pool, "inspector", "mika").await;
    let draft = ReportRepo::create(&pool, &new_report("maintenance", "6 Kowhai Rd", None), creator)
        .await
        .unwrap();
    let submitted = ReportRepo::create(&pool, &new_report("maintenance", "7 Kowhai Rd", None), creator)
        .await
        .unwrap();
    ReportRepo::transition_status(
        &pool,
        submitted.id,
        ReportStatus::Draft,
        ReportStatus::PendingReview,
        None,
    )
    .await
    .unwrap();

    assert!(ReportRepo::delete_draft(&pool, draft.id).await.unwrap());
    assert!(!ReportRepo::delete_draft(&pool, submitted.id).await.unwrap());
    assert!(ReportRepo::find_by_id(&pool, submitted.id).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Child records
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_defect_numbers_are_per_report(pool: PgPool) {
    let creator = new_user(&pool, "inspector", "nia").await;
    let a = ReportRepo::create(&pool, &new_report("dispute", "1 A St", None), creator)
        .await
        .unwrap();
    let b = ReportRepo::create(&pool, &new_report("dispute", "2 B St", None), creator)
        .await
        .unwrap();

    let a1 = DefectRepo::create(&pool, a.id, &new_defect("Lifted flashing")).await.unwrap();
    let a2 = DefectRepo::create(&pool, a.id, &new_defect("Loose screws")).await.unwrap();
    let b1 = DefectRepo::create(&pool, b.id, &new_defect("Rust")).await.unwrap();

    assert_eq!((a1.defect_number, a2.defect_number, b1.defect_number), (1, 2, 1));

    let updated = DefectRepo::update(
        &pool,
        a2.id,
        &UpdateDefect {
            recommendation: Some("Refix with new washers".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.title, "Loose screws");
    assert_eq!(DefectRepo::list_by_report(&pool, a.id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_element_unlinks_defects(pool: PgPool) {
    let creator = new_user(&pool, "inspector", "kiri").await;
    let report = ReportRepo::create(&pool, &new_report("full_inspection", "9 Pohutukawa Dr", None), creator)
        .await
        .unwrap();
    let element = RoofElementRepo::create(
        &pool,
        report.id,
        &CreateRoofElement {
            element_type: "roof_cladding".into(),
            material: Some("Long-run steel".into()),
            location: None,
            condition_rating: Some("fair".into()),
            pitch_degrees: Some(15.0),
            notes: None,
            sort_order: None,
        },
    )
    .await
    .unwrap();
    let mut input = new_defect("Corroded laps");
    input.roof_element_id = Some(element.id);
    let defect = DefectRepo::create(&pool, report.id, &input).await.unwrap();

    assert!(RoofElementRepo::delete(&pool, element.id).await.unwrap());
    let defect = DefectRepo::find_by_id(&pool, defect.id).await.unwrap().unwrap();
    assert_eq!(defect.roof_element_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_photo_in_report_rejected(pool: PgPool) {
    let creator = new_user(&pool, "inspector", "pita").await;
    let report = ReportRepo::create(&pool, &new_report("maintenance", "11 Tawa St", None), creator)
        .await
        .unwrap();

    let photo = PhotoRepo::create(&pool, &new_photo(report.id, "abc123")).await.unwrap();
    assert_eq!(photo.size_bytes, 2048);

    let err = PhotoRepo::create(&pool, &new_photo(report.id, "abc123"))
        .await
        .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some("uq_photos_report_hash"));

    let deleted = PhotoRepo::delete(&pool, photo.id).await.unwrap().unwrap();
    assert_eq!(deleted.storage_key, photo.storage_key);
    assert!(PhotoRepo::list_by_report(&pool, report.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_photo_defect_link_can_be_cleared(pool: PgPool) {
    let creator = new_user(&pool, "inspector", "rawiri").await;
    let report = ReportRepo::create(&pool, &new_report("maintenance", "4 Rimu Lane", None), creator)
        .await
        .unwrap();
    let defect = DefectRepo::create(&pool, report.id, &new_defect("Loose ridge cap"))
        .await
        .unwrap();
    let photo = PhotoRepo::create(&pool, &new_photo(report.id, "def456")).await.unwrap();

    let linked = PhotoRepo::update(
        &pool,
        photo.id,
        &UpdatePhoto {
            defect_id: Some(Some(defect.id)),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(linked.defect_id, Some(defect.id));

    // Leaving the link out keeps it.
    let captioned = PhotoRepo::update(
        &pool,
        photo.id,
        &UpdatePhoto {
            caption: Some("Ridge cap lifted".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(captioned.defect_id, Some(defect.id));

    let unlinked = PhotoRepo::update(
        &pool,
        photo.id,
        &UpdatePhoto {
            defect_id: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(unlinked.defect_id, None);
    assert_eq!(unlinked.caption.as_deref(), Some("Ridge cap lifted"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_compliance_upsert_replaces_items(pool: PgPool) {
    let creator = new_user(&pool, "inspector", "moana").await;
    let report = ReportRepo::create(&pool, &new_report("pre_purchase", "12 Miro Rd", None), creator)
        .await
        .unwrap();

    let first = ComplianceRepo::upsert(
        &pool,
        report.id,
        "e2_as1",
        &serde_json::json!({ "e2_flashings": { "result": "pass" } }),
        creator,
    )
    .await
    .unwrap();
    let second = ComplianceRepo::upsert(
        &pool,
        report.id,
        "e2_as1",
        &serde_json::json!({ "e2_flashings": { "result": "fail", "notes": "Short upstand" } }),
        creator,
    )
    .await
    .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.items["e2_flashings"]["result"], "fail");
    assert_eq!(ComplianceRepo::list_by_report(&pool, report.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assignment_unique_per_inspector(pool: PgPool) {
    let admin = new_user(&pool, "admin", "boss").await;
    let inspector = new_user(&pool, "inspector", "rua").await;
    let report = ReportRepo::create(&pool, &new_report("maintenance", "13 Rata St", None), admin)
        .await
        .unwrap();
    let input = CreateAssignment {
        inspector_id: inspector,
        due_date: NaiveDate::from_ymd_opt(2026, 11, 2),
        notes: None,
    };

    let assignment = AssignmentRepo::create(&pool, report.id, &input, admin).await.unwrap();
    let err = AssignmentRepo::create(&pool, report.id, &input, admin)
        .await
        .unwrap_err();
    assert_eq!(
        unique_violation(&err).as_deref(),
        Some("uq_assignments_report_inspector")
    );

    AssignmentRepo::update(
        &pool,
        assignment.id,
        &UpdateAssignment {
            status: Some("completed".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(AssignmentRepo::list_open_for_inspector(&pool, inspector)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_templates_hide_inactive_by_default(pool: PgPool) {
    let admin = new_user(&pool, "admin", "tpl").await;
    for (name, active) in [("Standard", true), ("Legacy", false)] {
        TemplateRepo::create(
            &pool,
            &CreateReportTemplate {
                name: name.into(),
                inspection_type: "maintenance".into(),
                description: None,
                content: None,
                is_active: Some(active),
            },
            admin,
        )
        .await
        .unwrap();
    }

    assert_eq!(TemplateRepo::list(&pool, false).await.unwrap().len(), 1);
    assert_eq!(TemplateRepo::list(&pool, true).await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Shares
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_share_access_and_revocation(pool: PgPool) {
    let creator = new_user(&pool, "reviewer", "sam").await;
    let report = ReportRepo::create(&pool, &new_report("maintenance", "14 Hinau St", None), creator)
        .await
        .unwrap();
    let share = ShareRepo::create(
        &pool,
        &NewShare {
            report_id: report.id,
            token_hash: "f00d".into(),
            recipient_email: Some("client@example.nz".into()),
            recipient_name: None,
            expires_at: Utc::now() + Duration::days(7),
            created_by: Some(creator),
        },
    )
    .await
    .unwrap();

    let found = ShareRepo::find_by_token_hash(&pool, "f00d").await.unwrap().unwrap();
    assert_eq!(found.id, share.id);

    let accessed = ShareRepo::record_access(&pool, share.id).await.unwrap().unwrap();
    assert_eq!(accessed.access_count, 1);
    assert!(accessed.last_accessed_at.is_some());

    let revoked = ShareRepo::revoke(&pool, share.id).await.unwrap().unwrap();
    assert!(revoked.revoked_at.is_some());
    assert!(ShareRepo::record_access(&pool, share.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_shares_purged(pool: PgPool) {
    let creator = new_user(&pool, "reviewer", "lee").await;
    let report = ReportRepo::create(&pool, &new_report("maintenance", "15 Puriri St", None), creator)
        .await
        .unwrap();
    let now = Utc::now();
    for (hash, expires_at) in [
        ("old", now - Duration::days(40)),
        ("recent", now - Duration::days(2)),
        ("live", now + Duration::days(2)),
    ] {
        ShareRepo::create(
            &pool,
            &NewShare {
                report_id: report.id,
                token_hash: hash.into(),
                recipient_email: None,
                recipient_name: None,
                expires_at,
                created_by: None,
            },
        )
        .await
        .unwrap();
    }

    let purged = ShareRepo::delete_expired_before(&pool, now - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(purged, 1);
    assert_eq!(ShareRepo::list_by_report(&pool, report.id).await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Complaints and intake
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_complaint_edits_only_while_draft(pool: PgPool) {
    let inspector = new_user(&pool, "inspector", "eru").await;
    let reviewer = new_user(&pool, "reviewer", "huia").await;
    let report = ReportRepo::create(&pool, &new_report("dispute", "16 Kahikatea Dr", None), inspector)
        .await
        .unwrap();
    let complaint = ComplaintRepo::create(
        &pool,
        report.id,
        &ComplaintDraft {
            practitioner_name: Some("J. Builder".into()),
            ..Default::default()
        },
        inspector,
    )
    .await
    .unwrap();
    assert_eq!(complaint.status, "draft");

    let edited = ComplaintRepo::update_draft(
        &pool,
        complaint.id,
        &ComplaintDraft {
            practitioner_lbp_number: Some("BP123456".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(edited.practitioner_name.as_deref(), Some("J. Builder"));

    ComplaintRepo::transition(
        &pool,
        complaint.id,
        ComplaintStatus::Draft,
        ComplaintStatus::PendingReview,
        None,
        None,
    )
    .await
    .unwrap()
    .unwrap();
    assert!(ComplaintRepo::update_draft(&pool, complaint.id, &ComplaintDraft::default())
        .await
        .unwrap()
        .is_none());

    let approved = ComplaintRepo::transition(
        &pool,
        complaint.id,
        ComplaintStatus::PendingReview,
        ComplaintStatus::Approved,
        Some(reviewer),
        Some("Ready for the board"),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(approved.reviewer_id, Some(reviewer));
    assert!(approved.reviewed_at.is_some());

    let submitted = ComplaintRepo::mark_submitted(&pool, complaint.id, "LBP-20261016-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(submitted.status, "submitted");
    assert_matches!(submitted.submission_reference.as_deref(), Some("LBP-20261016-1"));

    let listed = ComplaintRepo::list(
        &pool,
        &ComplaintFilter {
            status: Some("submitted".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(listed.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inspection_request_converts_once(pool: PgPool) {
    let admin = new_user(&pool, "admin", "desk").await;
    let request = InspectionRequestRepo::create(
        &pool,
        &InspectionRequestInput {
            contact_name: "Mere Tane".into(),
            contact_email: "mere@example.nz".into(),
            contact_phone: None,
            property_address: "17 Karaka Lane".into(),
            property_suburb: None,
            property_city: Some("Nelson".into()),
            property_postcode: None,
            inspection_type: "pre_purchase".into(),
            preferred_date: None,
            message: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(request.status, "new");

    let report = ReportRepo::create(&pool, &new_report("pre_purchase", "17 Karaka Lane", None), admin)
        .await
        .unwrap();
    let converted = InspectionRequestRepo::mark_converted(&pool, request.id, report.id, admin)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(converted.report_id, Some(report.id));

    assert!(InspectionRequestRepo::decline(&pool, request.id, admin, Some("dup"))
        .await
        .unwrap()
        .is_none());

    let open = InspectionRequestFilter {
        status: Some("new".into()),
        ..Default::default()
    };
    assert_eq!(InspectionRequestRepo::count(&pool, &open).await.unwrap(), 0);
}
