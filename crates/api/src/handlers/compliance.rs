//! Handlers for compliance checklists and per-report assessments.

use axum::extract::{Path, State};
use axum::Json;
use roofline_core::audit::{action_types, compute_changes, entity_types};
use roofline_core::compliance::{
    checklist_progress, validate_items, ChecklistDefinition, CHECKLISTS,
};
use roofline_core::types::DbId;
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::compliance::UpsertComplianceAssessment;
use roofline_db::repositories::ComplianceRepo;
use serde_json::json;

use crate::access::{load_editable_report, load_report};
use crate::audit_trail;
use crate::document::ComplianceSection;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/compliance/checklists
pub async fn list_checklists(
    _auth: AuthUser,
) -> Json<DataResponse<&'static [ChecklistDefinition]>> {
    Json(DataResponse { data: CHECKLISTS })
}

/// GET /api/v1/reports/{id}/compliance
pub async fn list_by_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ComplianceSection>>>> {
    load_report(&state, &auth, report_id).await?;
    let sections = ComplianceRepo::list_by_report(&state.pool, report_id)
        .await?
        .into_iter()
        .map(|assessment| {
            let items = validate_items(&assessment.checklist_code, &assessment.items)?;
            let progress = checklist_progress(&assessment.checklist_code, &items);
            Ok(ComplianceSection {
                assessment,
                progress,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Json(DataResponse { data: sections }))
}

/// PUT /api/v1/reports/{id}/compliance/{checklist_code}
///
/// Replaces the answers for one checklist. Item-level changes are audited.
pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((report_id, checklist_code)): Path<(DbId, String)>,
    Json(input): Json<UpsertComplianceAssessment>,
) -> AppResult<Json<DataResponse<ComplianceSection>>> {
    load_editable_report(&state, &auth, report_id).await?;

    let items = validate_items(&checklist_code, &input.items)?;
    let normalized =
        serde_json::to_value(&items).map_err(|e| AppError::InternalError(e.to_string()))?;

    let before = ComplianceRepo::find(&state.pool, report_id, &checklist_code).await?;
    let mut tx = state.pool.begin().await?;
    let assessment =
        ComplianceRepo::upsert(&mut *tx, report_id, &checklist_code, &normalized, auth.user_id)
            .await?;

    let entry = match before {
        None => Some(
            NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_CREATE).details(json!({
                "checklist_code": checklist_code,
                "items": normalized,
            })),
        ),
        Some(previous) => {
            let changes = compute_changes(&previous.items, &normalized);
            let changed = changes.as_object().is_some_and(|m| !m.is_empty());
            changed.then(|| {
                NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_UPDATE).details(json!({
                    "checklist_code": checklist_code,
                    "changes": changes,
                }))
            })
        }
    };
    if let Some(entry) = entry {
        audit_trail::record_in(
            &mut tx,
            entry
                .entity(entity_types::COMPLIANCE_ASSESSMENT, assessment.id)
                .report(report_id),
        )
        .await?;
    }
    tx.commit().await?;

    let progress = checklist_progress(&checklist_code, &items);
    Ok(Json(DataResponse {
        data: ComplianceSection {
            assessment,
            progress,
        },
    }))
}
