//! Handlers for report templates.
//!
//! Anyone signed in can list active templates; only admins manage them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use roofline_core::audit::{action_types, entity_types};
use roofline_core::error::CoreError;
use roofline_core::report::validate_inspection_type;
use roofline_core::types::DbId;
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::template::{CreateReportTemplate, ReportTemplate, UpdateReportTemplate};
use roofline_db::repositories::TemplateRepo;

use crate::audit_trail;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 200;

fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Template name is required".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Template name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Template content must be a JSON object of section prefills.
fn validate_content(content: Option<&serde_json::Value>) -> Result<(), CoreError> {
    match content {
        Some(value) if !value.is_object() => Err(CoreError::Validation(
            "Template content must be a JSON object".into(),
        )),
        _ => Ok(()),
    }
}

/// GET /api/v1/templates
///
/// `include_inactive` is only honoured for admins.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<ReportTemplate>>>> {
    let include_inactive = params.include_inactive && auth.is_admin();
    let templates = TemplateRepo::list(&state.pool, include_inactive).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// GET /api/v1/templates/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReportTemplate>>> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|t| t.is_active || auth.is_admin())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ReportTemplate",
            id,
        }))?;
    Ok(Json(DataResponse { data: template }))
}

/// POST /api/v1/templates
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateReportTemplate>,
) -> AppResult<(StatusCode, Json<DataResponse<ReportTemplate>>)> {
    validate_name(&input.name)?;
    validate_inspection_type(&input.inspection_type)?;
    validate_content(input.content.as_ref())?;

    let template = TemplateRepo::create(&state.pool, &input, admin.user_id).await?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(admin.user_id), action_types::ENTITY_CREATE)
            .entity(entity_types::TEMPLATE, template.id)
            .details(audit_trail::snapshot_details(&template)?),
    )
    .await?;

    tracing::info!(template_id = template.id, name = %template.name, "Template created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// PUT /api/v1/templates/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReportTemplate>,
) -> AppResult<Json<DataResponse<ReportTemplate>>> {
    if let Some(name) = input.name.as_deref() {
        validate_name(name)?;
    }
    validate_content(input.content.as_ref())?;

    let before = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ReportTemplate",
            id,
        }))?;
    let after = TemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ReportTemplate",
            id,
        }))?;

    if let Some(details) = audit_trail::change_details(&before, &after)? {
        audit_trail::record(
            &state.pool,
            NewAuditEntry::new(Some(admin.user_id), action_types::ENTITY_UPDATE)
                .entity(entity_types::TEMPLATE, id)
                .details(details),
        )
        .await?;
    }

    Ok(Json(DataResponse { data: after }))
}

/// DELETE /api/v1/templates/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ReportTemplate",
            id,
        }))?;

    if !TemplateRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ReportTemplate",
            id,
        }));
    }

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(admin.user_id), action_types::ENTITY_DELETE)
            .entity(entity_types::TEMPLATE, id)
            .details(audit_trail::snapshot_details(&template)?),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
