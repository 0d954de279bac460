//! Audit log query and hash-chain verification (admin only), plus per-report
//! audit and revision history.

use axum::extract::{Path, Query, State};
use axum::Json;
use roofline_core::audit::{verify_chain, ChainVerification};
use roofline_core::revision::{reconstruct, RevisionHistory};
use roofline_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use roofline_core::types::DbId;
use roofline_db::models::audit::{AuditLog, AuditQuery};
use roofline_db::repositories::AuditLogRepo;

use crate::access::load_report;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

/// GET /api/v1/admin/audit-logs
pub async fn query_audit_logs(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(mut params): Query<AuditQuery>,
) -> AppResult<Json<DataResponse<Page<AuditLog>>>> {
    params.limit = Some(clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT));
    params.offset = Some(clamp_offset(params.offset));

    let items = AuditLogRepo::query(&state.pool, &params).await?;
    let total = AuditLogRepo::count(&state.pool, &params).await?;
    Ok(Json(DataResponse {
        data: Page { items, total },
    }))
}

/// GET /api/v1/admin/audit-logs/integrity-check
///
/// Replays the whole chain from the seed.
pub async fn integrity_check(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ChainVerification>>> {
    let entries = AuditLogRepo::fetch_chain(&state.pool).await?;
    let links: Vec<_> = entries.iter().map(AuditLog::chain_link).collect();
    let result = verify_chain(&links);

    if result.chain_valid {
        tracing::info!(
            verified = result.verified_entries,
            admin_id = admin.user_id,
            "Audit chain verified"
        );
    } else {
        tracing::error!(
            verified = result.verified_entries,
            first_break = ?result.first_break,
            "Audit chain integrity failure"
        );
    }
    Ok(Json(DataResponse { data: result }))
}

/// GET /api/v1/reports/{id}/audit
pub async fn report_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AuditLog>>>> {
    load_report(&state, &auth, id).await?;
    let entries = AuditLogRepo::list_by_report(&state.pool, id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/reports/{id}/revisions
pub async fn report_revisions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RevisionHistory>>> {
    load_report(&state, &auth, id).await?;
    let entries = AuditLogRepo::list_by_report(&state.pool, id)
        .await?
        .into_iter()
        .map(AuditLog::into_revision_entry)
        .collect();
    Ok(Json(DataResponse {
        data: reconstruct(entries),
    }))
}
