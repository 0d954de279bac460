//! Report lifecycle transitions.
//!
//! Every action goes through [`apply_action`]: role check, comment rules,
//! independence of review, submission validation (for submit), then a
//! guarded status update so concurrent decisions cannot both win.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use roofline_core::audit::{action_types, entity_types};
use roofline_core::error::CoreError;
use roofline_core::report::{
    authorize_action, ensure_independent_review, transition, validate_action_comment,
    ReportAction,
};
use roofline_core::roles::ROLE_INSPECTOR;
use roofline_core::submission::validate_submission;
use roofline_core::types::DbId;
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::report::Report;
use roofline_db::repositories::ReportRepo;
use roofline_events::{event_types, PlatformEvent};
use serde::Deserialize;
use serde_json::json;

use crate::access::{load_report, report_status};
use crate::audit_trail;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::snapshot::load_snapshot;
use crate::state::AppState;

/// Optional body for every workflow action.
#[derive(Debug, Default, Deserialize)]
pub struct ActionRequest {
    pub comment: Option<String>,
}

fn audit_action(action: ReportAction) -> &'static str {
    match action {
        ReportAction::Submit => action_types::REPORT_SUBMIT,
        ReportAction::Approve => action_types::REPORT_APPROVE,
        ReportAction::RequestRevision => action_types::REPORT_REQUEST_REVISION,
        ReportAction::Finalise => action_types::REPORT_FINALISE,
        ReportAction::Archive => action_types::REPORT_ARCHIVE,
        ReportAction::Reopen => action_types::REPORT_REOPEN,
    }
}

fn event_for(action: ReportAction) -> Option<&'static str> {
    match action {
        ReportAction::Submit => Some(event_types::REPORT_SUBMITTED),
        ReportAction::Approve => Some(event_types::REPORT_APPROVED),
        ReportAction::RequestRevision | ReportAction::Reopen => {
            Some(event_types::REPORT_REVISION_REQUIRED)
        }
        ReportAction::Finalise => Some(event_types::REPORT_FINALISED),
        ReportAction::Archive => None,
    }
}

async fn apply_action(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
    action: ReportAction,
    comment: Option<String>,
) -> AppResult<Report> {
    let report = load_report(state, auth, id).await?;

    authorize_action(&auth.role, action)?;
    let comment = comment.filter(|c| !c.trim().is_empty());
    validate_action_comment(action, comment.as_deref())?;

    if action == ReportAction::Submit
        && auth.role == ROLE_INSPECTOR
        && report.inspector_id != Some(auth.user_id)
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the report's inspector may submit it".into(),
        )));
    }
    if matches!(action, ReportAction::Approve | ReportAction::Finalise) {
        ensure_independent_review(auth.user_id, report.inspector_id)?;
    }

    let from = report_status(&report)?;
    let to = transition(from, action)?;

    if action == ReportAction::Submit {
        let snapshot = load_snapshot(&state.pool, &report, Utc::now().date_naive()).await?;
        let validation = validate_submission(&snapshot);
        if !validation.can_submit {
            tracing::info!(
                report_id = id,
                errors = validation.errors.len(),
                "Submission blocked by validation"
            );
            return Err(AppError::ValidationFailed(validation));
        }
    }

    let reviewer_id = matches!(action, ReportAction::Approve | ReportAction::RequestRevision)
        .then_some(auth.user_id);
    let mut tx = state.pool.begin().await?;
    let updated = ReportRepo::transition_status(&mut *tx, id, from, to, reviewer_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Report {} changed status concurrently; reload and retry",
                report.report_number
            )))
        })?;

    audit_trail::record_in(
        &mut tx,
        NewAuditEntry::new(Some(auth.user_id), audit_action(action))
            .entity(entity_types::REPORT, id)
            .report(id)
            .details(json!({
                "from": from.as_str(),
                "to": to.as_str(),
                "comment": comment,
            })),
    )
    .await?;
    tx.commit().await?;

    if let Some(event_type) = event_for(action) {
        state.event_bus.publish(
            PlatformEvent::new(event_type)
                .with_source(entity_types::REPORT, id)
                .with_actor(auth.user_id)
                .with_payload(json!({
                    "report_id": id,
                    "report_number": updated.report_number,
                    "comment": comment,
                })),
        );
    }

    tracing::info!(
        report_id = id,
        user_id = auth.user_id,
        action = action.as_str(),
        from = %from,
        to = %to,
        "Report status changed"
    );
    Ok(updated)
}

/// POST /api/v1/reports/{id}/submit
pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<Report>>> {
    let comment = body.and_then(|Json(b)| b.comment);
    let report = apply_action(&state, &auth, id, ReportAction::Submit, comment).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/reports/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<Report>>> {
    let comment = body.and_then(|Json(b)| b.comment);
    let report = apply_action(&state, &auth, id, ReportAction::Approve, comment).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/reports/{id}/request-revision
pub async fn request_revision(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<Report>>> {
    let comment = body.and_then(|Json(b)| b.comment);
    let report = apply_action(&state, &auth, id, ReportAction::RequestRevision, comment).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/reports/{id}/reopen
pub async fn reopen(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<Report>>> {
    let comment = body.and_then(|Json(b)| b.comment);
    let report = apply_action(&state, &auth, id, ReportAction::Reopen, comment).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/reports/{id}/finalise
pub async fn finalise(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<Report>>> {
    let comment = body.and_then(|Json(b)| b.comment);
    let report = apply_action(&state, &auth, id, ReportAction::Finalise, comment).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/reports/{id}/archive
pub async fn archive(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<Report>>> {
    let comment = body.and_then(|Json(b)| b.comment);
    let report = apply_action(&state, &auth, id, ReportAction::Archive, comment).await?;
    Ok(Json(DataResponse { data: report }))
}
