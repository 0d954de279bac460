//! Handlers for the `/reports` resource: CRUD, submission readiness and PDF
//! generation. Workflow transitions live in [`super::workflow`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use roofline_core::audit::{action_types, entity_types};
use roofline_core::error::CoreError;
use roofline_core::report::{validate_inspection_type, ReportStatus};
use roofline_core::roles::{check_report_field_permissions, ROLE_INSPECTOR};
use roofline_core::share::ensure_shareable;
use roofline_core::submission::{validate_submission, SubmissionValidation};
use roofline_core::types::DbId;
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::report::{CreateReport, Report, ReportFilter, ReportPage, UpdateReport};
use roofline_db::repositories::{ReportRepo, TemplateRepo};
use serde_json::json;

use crate::access::{ensure_active_inspector, load_report, report_status};
use crate::audit_trail;
use crate::document::load_document;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::snapshot::load_snapshot;
use crate::state::AppState;

/// GET /api/v1/reports
///
/// Inspectors only see reports they created, inspect or are assigned to.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(mut filter): Query<ReportFilter>,
) -> AppResult<Json<DataResponse<ReportPage>>> {
    if let Some(status) = filter.status.as_deref() {
        ReportStatus::from_str_value(status)?;
    }
    if let Some(kind) = filter.inspection_type.as_deref() {
        validate_inspection_type(kind)?;
    }
    filter.visible_to = (!auth.is_reviewer_or_admin()).then_some(auth.user_id);

    let items = ReportRepo::list(&state.pool, &filter).await?;
    let total = ReportRepo::count(&state.pool, &filter).await?;
    Ok(Json(DataResponse {
        data: ReportPage { items, total },
    }))
}

/// POST /api/v1/reports
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut input): Json<CreateReport>,
) -> AppResult<(StatusCode, Json<DataResponse<Report>>)> {
    if !(auth.is_admin() || auth.role == ROLE_INSPECTOR) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only inspectors and admins may create reports".into(),
        )));
    }
    validate_inspection_type(&input.inspection_type)?;

    if auth.role == ROLE_INSPECTOR {
        input.inspector_id = Some(auth.user_id);
    } else if let Some(inspector_id) = input.inspector_id {
        ensure_active_inspector(&state, inspector_id).await?;
    }

    if let Some(template_id) = input.template_id {
        let template = TemplateRepo::find_by_id(&state.pool, template_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "ReportTemplate",
                id: template_id,
            }))?;
        if template.inspection_type != input.inspection_type {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Template '{}' is for {} inspections",
                template.name, template.inspection_type
            ))));
        }
        if input.executive_summary.is_none() {
            input.executive_summary = template
                .content
                .get("executive_summary")
                .and_then(|v| v.as_str())
                .map(str::to_string);
        }
    }

    let report = ReportRepo::create(&state.pool, &input, auth.user_id).await?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(auth.user_id), action_types::REPORT_CREATE)
            .entity(entity_types::REPORT, report.id)
            .report(report.id)
            .details(json!({
                "report_number": report.report_number,
                "inspection_type": report.inspection_type,
                "template_id": report.template_id,
            })),
    )
    .await?;

    tracing::info!(
        report_id = report.id,
        report_number = %report.report_number,
        user_id = auth.user_id,
        "Report created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// GET /api/v1/reports/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Report>>> {
    let report = load_report(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: report }))
}

/// PUT /api/v1/reports/{id}
///
/// Each role may write only its own fields. Reviewer notes stay writable
/// during review; everything else requires an editable status.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReport>,
) -> AppResult<Json<DataResponse<Report>>> {
    let before = load_report(&state, &auth, id).await?;

    let fields = input.changed_fields();
    if fields.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    check_report_field_permissions(&auth.role, fields.iter().copied())?;

    let status = report_status(&before)?;
    let notes_only = fields == ["reviewer_notes"];
    let writable = if notes_only {
        !matches!(status, ReportStatus::Finalised | ReportStatus::Archived)
    } else {
        status.is_editable()
    };
    if !writable {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Report {} is '{status}' and cannot be edited",
            before.report_number
        ))));
    }

    if let Some(kind) = input.inspection_type.as_deref() {
        validate_inspection_type(kind)?;
    }
    if let Some(inspector_id) = input.inspector_id {
        ensure_active_inspector(&state, inspector_id).await?;
    }

    let mut tx = state.pool.begin().await?;
    let after = ReportRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))?;

    if let Some(details) = audit_trail::change_details(&before, &after)? {
        audit_trail::record_in(
            &mut tx,
            NewAuditEntry::new(Some(auth.user_id), action_types::REPORT_UPDATE)
                .entity(entity_types::REPORT, id)
                .report(id)
                .details(details),
        )
        .await?;
    }
    tx.commit().await?;

    Ok(Json(DataResponse { data: after }))
}

/// DELETE /api/v1/reports/{id}
///
/// Only drafts can be deleted, by their creator or an admin.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let report = load_report(&state, &auth, id).await?;
    if !(auth.is_admin() || report.created_by == Some(auth.user_id)) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the report's creator or an admin may delete it".into(),
        )));
    }

    if !ReportRepo::delete_draft(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Report {} is '{}'; only drafts can be deleted",
            report.report_number, report.status
        ))));
    }

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(auth.user_id), action_types::REPORT_DELETE)
            .entity(entity_types::REPORT, id)
            .report(id)
            .details(json!({ "report_number": report.report_number })),
    )
    .await?;

    tracing::info!(report_id = id, user_id = auth.user_id, "Draft report deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/reports/{id}/validation
///
/// Evaluates submission readiness without changing anything.
pub async fn validation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SubmissionValidation>>> {
    let report = load_report(&state, &auth, id).await?;
    let snapshot = load_snapshot(&state.pool, &report, Utc::now().date_naive()).await?;
    Ok(Json(DataResponse {
        data: validate_submission(&snapshot),
    }))
}

/// POST /api/v1/reports/{id}/pdf
///
/// Renders the report through the external renderer and stores the PDF.
pub async fn generate_pdf(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Report>>> {
    let renderer = state
        .pdf
        .clone()
        .ok_or_else(|| AppError::ServiceUnavailable("PDF rendering is not configured".into()))?;

    let report = load_report(&state, &auth, id).await?;
    ensure_shareable(report_status(&report)?)?;

    let report_number = report.report_number.clone();
    let document = load_document(&state.pool, report).await?;
    let bytes = renderer.render(&document).await?;
    let size = bytes.len();

    let key = format!(
        "reports/{id}/pdf/{report_number}-{}.pdf",
        uuid::Uuid::now_v7()
    );
    state.store.put(&key, bytes, "application/pdf").await?;
    let url = state.store.url(&key);

    let updated = ReportRepo::set_pdf(&state.pool, id, &url)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(auth.user_id), action_types::PDF_GENERATE)
            .entity(entity_types::REPORT, id)
            .report(id)
            .details(json!({ "storage_key": key, "size_bytes": size })),
    )
    .await?;

    tracing::info!(report_id = id, bytes = size, backend = state.store.backend(), "Report PDF generated");
    Ok(Json(DataResponse { data: updated }))
}
