//! Handlers for roof elements within a report.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roofline_core::audit::{action_types, entity_types};
use roofline_core::error::CoreError;
use roofline_core::roof_element::{validate_condition, validate_element_type, validate_pitch};
use roofline_core::types::DbId;
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::roof_element::{CreateRoofElement, RoofElement, UpdateRoofElement};
use roofline_db::repositories::RoofElementRepo;

use crate::access::{load_editable_report, load_report};
use crate::audit_trail;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_fields(
    element_type: Option<&str>,
    condition: Option<&str>,
    pitch: Option<f64>,
) -> Result<(), CoreError> {
    if let Some(t) = element_type {
        validate_element_type(t)?;
    }
    if let Some(c) = condition {
        validate_condition(c)?;
    }
    if let Some(p) = pitch {
        validate_pitch(p)?;
    }
    Ok(())
}

async fn find_element(state: &AppState, id: DbId) -> AppResult<RoofElement> {
    RoofElementRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RoofElement",
            id,
        }))
}

/// GET /api/v1/reports/{id}/roof-elements
pub async fn list_by_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<RoofElement>>>> {
    load_report(&state, &auth, report_id).await?;
    let elements = RoofElementRepo::list_by_report(&state.pool, report_id).await?;
    Ok(Json(DataResponse { data: elements }))
}

/// POST /api/v1/reports/{id}/roof-elements
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
    Json(input): Json<CreateRoofElement>,
) -> AppResult<(StatusCode, Json<DataResponse<RoofElement>>)> {
    load_editable_report(&state, &auth, report_id).await?;
    validate_fields(
        Some(&input.element_type),
        input.condition_rating.as_deref(),
        input.pitch_degrees,
    )?;

    let mut tx = state.pool.begin().await?;
    let element = RoofElementRepo::create(&mut *tx, report_id, &input).await?;

    audit_trail::record_in(
        &mut tx,
        NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_CREATE)
            .entity(entity_types::ROOF_ELEMENT, element.id)
            .report(report_id)
            .details(audit_trail::snapshot_details(&element)?),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: element })))
}

/// PUT /api/v1/roof-elements/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoofElement>,
) -> AppResult<Json<DataResponse<RoofElement>>> {
    let before = find_element(&state, id).await?;
    load_editable_report(&state, &auth, before.report_id).await?;
    validate_fields(
        input.element_type.as_deref(),
        input.condition_rating.as_deref(),
        input.pitch_degrees,
    )?;

    let mut tx = state.pool.begin().await?;
    let after = RoofElementRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RoofElement",
            id,
        }))?;

    if let Some(details) = audit_trail::change_details(&before, &after)? {
        audit_trail::record_in(
            &mut tx,
            NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_UPDATE)
                .entity(entity_types::ROOF_ELEMENT, id)
                .report(after.report_id)
                .details(details),
        )
        .await?;
    }
    tx.commit().await?;

    Ok(Json(DataResponse { data: after }))
}

/// DELETE /api/v1/roof-elements/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let element = find_element(&state, id).await?;
    load_editable_report(&state, &auth, element.report_id).await?;

    let mut tx = state.pool.begin().await?;
    if !RoofElementRepo::delete(&mut *tx, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "RoofElement",
            id,
        }));
    }

    audit_trail::record_in(
        &mut tx,
        NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_DELETE)
            .entity(entity_types::ROOF_ELEMENT, id)
            .report(element.report_id)
            .details(audit_trail::snapshot_details(&element)?),
    )
    .await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
