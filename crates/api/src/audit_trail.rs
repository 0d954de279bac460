//! Append entries to the hash-chained audit log.

use roofline_db::models::audit::{AuditLog, NewAuditEntry};
use roofline_db::repositories::AuditLogRepo;
use roofline_db::DbPool;
use serde::Serialize;
use serde_json::json;

use roofline_core::audit::{compute_changes, strip_untracked};

use crate::error::{AppError, AppResult};

/// Write one audit entry in its own transaction. Failures propagate: a
/// mutation without its audit record is reported as an error.
pub async fn record(pool: &DbPool, entry: NewAuditEntry) -> AppResult<()> {
    let row = AuditLogRepo::insert_chained(pool, &entry).await?;
    log_recorded(&row);
    Ok(())
}

/// Write one audit entry inside the transaction that makes the change.
pub async fn record_in(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: NewAuditEntry,
) -> AppResult<()> {
    let row = AuditLogRepo::append(tx, &entry).await?;
    log_recorded(&row);
    Ok(())
}

fn log_recorded(row: &AuditLog) {
    tracing::debug!(
        audit_id = row.id,
        action = %row.action_type,
        entity_type = ?row.entity_type,
        entity_id = ?row.entity_id,
        "Audit entry recorded"
    );
}

/// `{"changes": {...}}` for an update, or `None` when nothing tracked changed.
pub fn change_details<T: Serialize>(before: &T, after: &T) -> AppResult<Option<serde_json::Value>> {
    let before = serde_json::to_value(before).map_err(|e| AppError::InternalError(e.to_string()))?;
    let after = serde_json::to_value(after).map_err(|e| AppError::InternalError(e.to_string()))?;
    let changes = compute_changes(&strip_untracked(&before), &strip_untracked(&after));
    let empty = changes.as_object().map_or(true, |m| m.is_empty());
    Ok((!empty).then(|| json!({ "changes": changes })))
}

/// Snapshot of a created or deleted row for the audit details.
pub fn snapshot_details<T: Serialize>(row: &T) -> AppResult<serde_json::Value> {
    let value = serde_json::to_value(row).map_err(|e| AppError::InternalError(e.to_string()))?;
    Ok(json!({ "snapshot": strip_untracked(&value) }))
}
