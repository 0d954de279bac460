//! Repository for the append-only `audit_logs` table.

use chrono::{SubsecRound, Utc};
use roofline_core::audit::{canonical_entry_data, compute_integrity_hash, redact_sensitive_fields};
use roofline_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::audit::{AuditLog, AuditQuery, NewAuditEntry};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const COLUMNS: &str = "\
    id, timestamp, user_id, action_type, entity_type, entity_id, \
    report_id, details_json, integrity_hash, created_at";

/// Advisory lock key serialising chain appends across connections.
const CHAIN_LOCK_KEY: i64 = 0x526F_6F66_4175_6474;

// ---------------------------------------------------------------------------
// AuditLogRepo
// ---------------------------------------------------------------------------

pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append an entry to the hash chain in its own transaction.
    pub async fn insert_chained(
        pool: &PgPool,
        entry: &NewAuditEntry,
    ) -> Result<AuditLog, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let log = Self::append(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(log)
    }

    /// Append an entry to the hash chain within the caller's transaction,
    /// so the entry commits or rolls back with the change it records.
    ///
    /// Sensitive detail fields are redacted before hashing. The advisory
    /// lock keeps concurrent appends from chaining off the same predecessor
    /// and is held until the caller's transaction ends.
    pub async fn append(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &NewAuditEntry,
    ) -> Result<AuditLog, sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(CHAIN_LOCK_KEY)
            .execute(&mut **tx)
            .await?;

        let prev_hash: Option<String> = sqlx::query_scalar(
            "SELECT integrity_hash FROM audit_logs ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&mut **tx)
        .await?;

        let timestamp = Utc::now().trunc_subsecs(6);
        let details = entry.details_json.as_ref().map(redact_sensitive_fields);
        let data = canonical_entry_data(
            timestamp,
            entry.user_id,
            &entry.action_type,
            entry.entity_type.as_deref(),
            entry.entity_id,
            details.as_ref(),
        );
        let integrity_hash = compute_integrity_hash(prev_hash.as_deref(), &data);

        let query = format!(
            "INSERT INTO audit_logs
                (timestamp, user_id, action_type, entity_type, entity_id, report_id,
                 details_json, integrity_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(timestamp)
            .bind(entry.user_id)
            .bind(&entry.action_type)
            .bind(&entry.entity_type)
            .bind(entry.entity_id)
            .bind(entry.report_id)
            .bind(&details)
            .bind(&integrity_hash)
            .fetch_one(&mut **tx)
            .await
    }

    /// Query audit logs with filtering and pagination, newest first.
    pub async fn query(pool: &PgPool, params: &AuditQuery) -> Result<Vec<AuditLog>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(1, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, bind_values, bind_idx) = build_audit_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs {where_clause} \
             ORDER BY timestamp DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, AuditLog>(&query);
        for v in &bind_values {
            q = match v {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count audit logs matching the filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &AuditQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_audit_filter(params);
        let query = format!("SELECT COUNT(*)::BIGINT FROM audit_logs {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for v in &bind_values {
            q = match v {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.fetch_one(pool).await
    }

    /// Every entry recorded against a report, in chronological order.
    pub async fn list_by_report(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs WHERE report_id = $1 ORDER BY timestamp ASC, id ASC"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    /// Entries about one entity, in chronological order.
    pub async fn list_by_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs
             WHERE entity_type = $1 AND entity_id = $2
             ORDER BY timestamp ASC, id ASC"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }

    /// The whole chain in insertion order, for integrity verification.
    pub async fn fetch_chain(pool: &PgPool) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM audit_logs ORDER BY id ASC");
        sqlx::query_as::<_, AuditLog>(&query).fetch_all(pool).await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

enum BindValue {
    BigInt(i64),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from `AuditQuery`.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
fn build_audit_filter(params: &AuditQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    let mut push = |column: &str, op: &str, value: BindValue| {
        conditions.push(format!("{column} {op} ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(value);
    };

    if let Some(user_id) = params.user_id {
        push("user_id", "=", BindValue::BigInt(user_id));
    }
    if let Some(ref action_type) = params.action_type {
        push("action_type", "=", BindValue::Text(action_type.clone()));
    }
    if let Some(ref entity_type) = params.entity_type {
        push("entity_type", "=", BindValue::Text(entity_type.clone()));
    }
    if let Some(entity_id) = params.entity_id {
        push("entity_id", "=", BindValue::BigInt(entity_id));
    }
    if let Some(report_id) = params.report_id {
        push("report_id", "=", BindValue::BigInt(report_id));
    }
    if let Some(from) = params.from {
        push("timestamp", ">=", BindValue::Timestamp(from));
    }
    if let Some(to) = params.to {
        push("timestamp", "<=", BindValue::Timestamp(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}
