//! Handlers for inspector assignments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roofline_core::assignment::validate_assignment_change;
use roofline_core::audit::{action_types, entity_types};
use roofline_core::error::CoreError;
use roofline_core::report::ReportStatus;
use roofline_core::types::DbId;
use roofline_db::models::assignment::{Assignment, CreateAssignment, UpdateAssignment};
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::repositories::AssignmentRepo;
use roofline_events::{event_types, PlatformEvent};
use serde_json::json;

use crate::access::{ensure_active_inspector, load_report, report_status};
use crate::audit_trail;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireReviewer;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/reports/{id}/assignments
pub async fn list_by_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Assignment>>>> {
    load_report(&state, &auth, report_id).await?;
    let assignments = AssignmentRepo::list_by_report(&state.pool, report_id).await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// GET /api/v1/assignments/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Assignment>>>> {
    let assignments = AssignmentRepo::list_open_for_inspector(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// POST /api/v1/reports/{id}/assignments
pub async fn create(
    RequireReviewer(reviewer): RequireReviewer,
    State(state): State<AppState>,
    Path(report_id): Path<DbId>,
    Json(input): Json<CreateAssignment>,
) -> AppResult<(StatusCode, Json<DataResponse<Assignment>>)> {
    let report = load_report(&state, &reviewer, report_id).await?;
    if report_status(&report)? == ReportStatus::Archived {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Report {} is archived",
            report.report_number
        ))));
    }

    ensure_active_inspector(&state, input.inspector_id).await?;

    let assignment =
        AssignmentRepo::create(&state.pool, report_id, &input, reviewer.user_id).await?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(reviewer.user_id), action_types::ENTITY_CREATE)
            .entity(entity_types::ASSIGNMENT, assignment.id)
            .report(report_id)
            .details(audit_trail::snapshot_details(&assignment)?),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::ASSIGNMENT_CREATED)
            .with_source(entity_types::ASSIGNMENT, assignment.id)
            .with_actor(reviewer.user_id)
            .with_payload(json!({
                "report_id": report_id,
                "inspector_id": assignment.inspector_id,
                "due_date": assignment.due_date,
            })),
    );

    tracing::info!(
        report_id,
        assignment_id = assignment.id,
        inspector_id = assignment.inspector_id,
        "Inspector assigned"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}

/// PUT /api/v1/assignments/{id}
///
/// The assigned inspector may move the status along; reviewers and admins
/// may also change the due date and notes.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAssignment>,
) -> AppResult<Json<DataResponse<Assignment>>> {
    let before = AssignmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Assignment",
            id,
        }))?;

    if !auth.is_reviewer_or_admin() {
        if before.inspector_id != auth.user_id {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Assignment",
                id,
            }));
        }
        if input.due_date.is_some() || input.notes.is_some() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Inspectors may only change the assignment status".into(),
            )));
        }
    }

    if let Some(status) = input.status.as_deref() {
        validate_assignment_change(&before.status, status)?;
    }

    let after = AssignmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Assignment",
            id,
        }))?;

    if let Some(details) = audit_trail::change_details(&before, &after)? {
        audit_trail::record(
            &state.pool,
            NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_UPDATE)
                .entity(entity_types::ASSIGNMENT, id)
                .report(after.report_id)
                .details(details),
        )
        .await?;
    }

    Ok(Json(DataResponse { data: after }))
}
