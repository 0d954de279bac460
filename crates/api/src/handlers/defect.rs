//! Handlers for defects within a report.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roofline_core::audit::{action_types, entity_types};
use roofline_core::defect::{validate_category, validate_severity, validate_text, validate_title};
use roofline_core::error::CoreError;
use roofline_core::types::DbId;
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::defect::{CreateDefect, Defect, UpdateDefect};
use roofline_db::repositories::{DefectRepo, RoofElementRepo};

use crate::access::{load_editable_report, load_report};
use crate::audit_trail;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

async fn find_defect(state: &AppState, id: DbId) -> AppResult<Defect> {
    DefectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Defect",
            id,
        }))
}

/// A defect may only point at a roof element of the same report.
async fn ensure_element_in_report(
    state: &AppState,
    report_id: DbId,
    element_id: Option<DbId>,
) -> AppResult<()> {
    let Some(element_id) = element_id else {
        return Ok(());
    };
    let element = RoofElementRepo::find_by_id(&state.pool, element_id).await?;
    match element {
        Some(e) if e.report_id == report_id => Ok(()),
        _ => Err(AppError::Core(CoreError::Validation(format!(
            "Roof element {element_id} does not belong to report {report_id}"
        )))),
    }
}

/// GET /api/v1/reports/{id}/defects
pub async fn list_by_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Defect>>>> {
    load_report(&state, &auth, report_id).await?;
    let defects = DefectRepo::list_by_report(&state.pool, report_id).await?;
    Ok(Json(DataResponse { data: defects }))
}

/// POST /api/v1/reports/{id}/defects
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
    Json(input): Json<CreateDefect>,
) -> AppResult<(StatusCode, Json<DataResponse<Defect>>)> {
    load_editable_report(&state, &auth, report_id).await?;

    validate_title(&input.title)?;
    validate_severity(&input.severity)?;
    validate_category(&input.category)?;
    validate_text("description", input.description.as_deref())?;
    validate_text("recommendation", input.recommendation.as_deref())?;
    ensure_element_in_report(&state, report_id, input.roof_element_id).await?;

    let mut tx = state.pool.begin().await?;
    let defect = DefectRepo::create(&mut *tx, report_id, &input).await?;

    audit_trail::record_in(
        &mut tx,
        NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_CREATE)
            .entity(entity_types::DEFECT, defect.id)
            .report(report_id)
            .details(audit_trail::snapshot_details(&defect)?),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        report_id,
        defect_id = defect.id,
        defect_number = defect.defect_number,
        severity = %defect.severity,
        "Defect recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: defect })))
}

/// PUT /api/v1/defects/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDefect>,
) -> AppResult<Json<DataResponse<Defect>>> {
    let before = find_defect(&state, id).await?;
    load_editable_report(&state, &auth, before.report_id).await?;

    if let Some(title) = input.title.as_deref() {
        validate_title(title)?;
    }
    if let Some(severity) = input.severity.as_deref() {
        validate_severity(severity)?;
    }
    if let Some(category) = input.category.as_deref() {
        validate_category(category)?;
    }
    validate_text("description", input.description.as_deref())?;
    validate_text("recommendation", input.recommendation.as_deref())?;
    ensure_element_in_report(&state, before.report_id, input.roof_element_id).await?;

    let mut tx = state.pool.begin().await?;
    let after = DefectRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Defect",
            id,
        }))?;

    if let Some(details) = audit_trail::change_details(&before, &after)? {
        audit_trail::record_in(
            &mut tx,
            NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_UPDATE)
                .entity(entity_types::DEFECT, id)
                .report(after.report_id)
                .details(details),
        )
        .await?;
    }
    tx.commit().await?;

    Ok(Json(DataResponse { data: after }))
}

/// DELETE /api/v1/defects/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let defect = find_defect(&state, id).await?;
    load_editable_report(&state, &auth, defect.report_id).await?;

    let mut tx = state.pool.begin().await?;
    if !DefectRepo::delete(&mut *tx, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Defect",
            id,
        }));
    }

    audit_trail::record_in(
        &mut tx,
        NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_DELETE)
            .entity(entity_types::DEFECT, id)
            .report(defect.report_id)
            .details(audit_trail::snapshot_details(&defect)?),
    )
    .await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
