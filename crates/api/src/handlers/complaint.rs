//! Handlers for LBP complaints raised from dispute reports.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use roofline_core::audit::{action_types, entity_types};
use roofline_core::complaint::{
    authorize_complaint_action, complaint_transition, ensure_report_eligible,
    submission_reference, validate_for_submission, validate_lbp_number, ComplaintAction,
    ComplaintFields, ComplaintStatus,
};
use roofline_core::error::CoreError;
use roofline_core::report::InspectionType;
use roofline_core::types::DbId;
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::complaint::{ComplaintDraft, ComplaintFilter, LbpComplaint};
use roofline_db::models::report::Report;
use roofline_db::repositories::ComplaintRepo;
use roofline_events::{event_types, PlatformEvent};
use serde_json::json;

use crate::access::{load_report, report_status};
use crate::audit_trail;
use crate::error::{AppError, AppResult};
use crate::handlers::workflow::ActionRequest;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireReviewer;
use crate::response::DataResponse;
use crate::state::AppState;

fn complaint_not_found(id: DbId) -> AppError {
    CoreError::not_found("LbpComplaint", id).into()
}

/// Complaints are visible to their creator and to reviewers and admins.
async fn load_complaint(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<LbpComplaint> {
    let complaint = ComplaintRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| complaint_not_found(id))?;
    if auth.is_reviewer_or_admin() || complaint.created_by == Some(auth.user_id) {
        Ok(complaint)
    } else {
        Err(complaint_not_found(id))
    }
}

fn complaint_status(complaint: &LbpComplaint) -> AppResult<ComplaintStatus> {
    ComplaintStatus::from_str_value(&complaint.status).map_err(|_| {
        AppError::InternalError(format!(
            "Complaint {} has unknown status '{}'",
            complaint.id, complaint.status
        ))
    })
}

fn validate_draft(input: &ComplaintDraft) -> Result<(), CoreError> {
    if let Some(number) = input.practitioner_lbp_number.as_deref() {
        validate_lbp_number(number)?;
    }
    Ok(())
}

/// One-line site address from the report's property fields.
fn report_site_address(report: &Report) -> Option<String> {
    let parts: Vec<&str> = [
        report.property_address.as_deref(),
        report.property_suburb.as_deref(),
        report.property_city.as_deref(),
        report.property_postcode.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn audit_action(action: ComplaintAction) -> &'static str {
    match action {
        ComplaintAction::SubmitForReview => action_types::COMPLAINT_SUBMIT_FOR_REVIEW,
        ComplaintAction::Approve => action_types::COMPLAINT_APPROVE,
        ComplaintAction::Return => action_types::COMPLAINT_RETURN,
        ComplaintAction::Submit => action_types::COMPLAINT_SUBMIT,
    }
}

/// POST /api/v1/reports/{id}/complaints
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
    Json(mut input): Json<ComplaintDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<LbpComplaint>>)> {
    let report = load_report(&state, &auth, report_id).await?;
    let inspection_type = InspectionType::from_str_value(&report.inspection_type)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    ensure_report_eligible(inspection_type, report_status(&report)?)?;
    validate_draft(&input)?;

    if input.site_address.is_none() {
        input.site_address = report_site_address(&report);
    }

    let complaint = ComplaintRepo::create(&state.pool, report_id, &input, auth.user_id).await?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(auth.user_id), action_types::COMPLAINT_CREATE)
            .entity(entity_types::COMPLAINT, complaint.id)
            .report(report_id)
            .details(audit_trail::snapshot_details(&complaint)?),
    )
    .await?;

    tracing::info!(report_id, complaint_id = complaint.id, "LBP complaint drafted");
    Ok((StatusCode::CREATED, Json(DataResponse { data: complaint })))
}

/// GET /api/v1/complaints
pub async fn list(
    RequireReviewer(_reviewer): RequireReviewer,
    State(state): State<AppState>,
    Query(filter): Query<ComplaintFilter>,
) -> AppResult<Json<DataResponse<Vec<LbpComplaint>>>> {
    if let Some(status) = filter.status.as_deref() {
        ComplaintStatus::from_str_value(status)?;
    }
    let complaints = ComplaintRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: complaints }))
}

/// GET /api/v1/complaints/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LbpComplaint>>> {
    let complaint = load_complaint(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: complaint }))
}

/// PUT /api/v1/complaints/{id}
///
/// Only drafts can be edited.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ComplaintDraft>,
) -> AppResult<Json<DataResponse<LbpComplaint>>> {
    let before = load_complaint(&state, &auth, id).await?;
    let status = complaint_status(&before)?;
    if !status.is_editable() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Complaint is '{status}' and can no longer be edited"
        ))));
    }
    validate_draft(&input)?;

    // The guarded update returns None if the status moved underneath us.
    let after = ComplaintRepo::update_draft(&state.pool, id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Complaint is no longer a draft".into(),
            ))
        })?;

    if let Some(details) = audit_trail::change_details(&before, &after)? {
        audit_trail::record(
            &state.pool,
            NewAuditEntry::new(Some(auth.user_id), action_types::COMPLAINT_UPDATE)
                .entity(entity_types::COMPLAINT, id)
                .report(after.report_id)
                .details(details),
        )
        .await?;
    }

    Ok(Json(DataResponse { data: after }))
}

async fn apply_action(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
    action: ComplaintAction,
    comment: Option<String>,
) -> AppResult<LbpComplaint> {
    let complaint = load_complaint(state, auth, id).await?;
    authorize_complaint_action(&auth.role, action)?;

    let comment = comment.filter(|c| !c.trim().is_empty());
    if action == ComplaintAction::Return && comment.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "A comment is required when returning a complaint".into(),
        )));
    }

    let from = complaint_status(&complaint)?;
    let to = complaint_transition(from, action)?;

    let updated = match action {
        ComplaintAction::Submit => {
            validate_for_submission(&ComplaintFields {
                complainant_name: complaint.complainant_name.as_deref(),
                complainant_email: complaint.complainant_email.as_deref(),
                practitioner_name: complaint.practitioner_name.as_deref(),
                practitioner_lbp_number: complaint.practitioner_lbp_number.as_deref(),
                site_address: complaint.site_address.as_deref(),
                grounds: complaint.grounds.as_deref(),
            })?;
            let reference = submission_reference(Utc::now().date_naive(), id);
            ComplaintRepo::mark_submitted(&state.pool, id, &reference).await?
        }
        ComplaintAction::Approve | ComplaintAction::Return => {
            ComplaintRepo::transition(
                &state.pool,
                id,
                from,
                to,
                Some(auth.user_id),
                comment.as_deref(),
            )
            .await?
        }
        ComplaintAction::SubmitForReview => {
            ComplaintRepo::transition(&state.pool, id, from, to, None, None).await?
        }
    }
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Complaint {id} changed status concurrently"
        )))
    })?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(auth.user_id), audit_action(action))
            .entity(entity_types::COMPLAINT, id)
            .report(updated.report_id)
            .details(json!({
                "from": from.as_str(),
                "to": to.as_str(),
                "comment": comment,
                "submission_reference": updated.submission_reference,
            })),
    )
    .await?;

    if action == ComplaintAction::Submit {
        state.event_bus.publish(
            PlatformEvent::new(event_types::COMPLAINT_SUBMITTED)
                .with_source(entity_types::COMPLAINT, id)
                .with_actor(auth.user_id)
                .with_payload(json!({
                    "report_id": updated.report_id,
                    "submission_reference": updated.submission_reference,
                })),
        );
    }

    tracing::info!(
        complaint_id = id,
        from = %from,
        to = %to,
        "Complaint status changed"
    );
    Ok(updated)
}

/// POST /api/v1/complaints/{id}/submit-for-review
pub async fn submit_for_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LbpComplaint>>> {
    let complaint =
        apply_action(&state, &auth, id, ComplaintAction::SubmitForReview, None).await?;
    Ok(Json(DataResponse { data: complaint }))
}

/// POST /api/v1/complaints/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<LbpComplaint>>> {
    let comment = body.and_then(|Json(b)| b.comment);
    let complaint = apply_action(&state, &auth, id, ComplaintAction::Approve, comment).await?;
    Ok(Json(DataResponse { data: complaint }))
}

/// POST /api/v1/complaints/{id}/return
pub async fn return_to_draft(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<LbpComplaint>>> {
    let comment = body.and_then(|Json(b)| b.comment);
    let complaint = apply_action(&state, &auth, id, ComplaintAction::Return, comment).await?;
    Ok(Json(DataResponse { data: complaint }))
}

/// POST /api/v1/complaints/{id}/submit
///
/// Sends an approved complaint to the licensing board.
pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LbpComplaint>>> {
    let complaint = apply_action(&state, &auth, id, ComplaintAction::Submit, None).await?;
    Ok(Json(DataResponse { data: complaint }))
}
