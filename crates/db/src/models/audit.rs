//! Audit log model and query DTOs.
//!
//! Audit entries are append-only; the table rejects updates and deletes.

use roofline_core::audit::{canonical_entry_data, ChainLink};
use roofline_core::revision::AuditEntry;
use roofline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub timestamp: Timestamp,
    pub user_id: Option<DbId>,
    pub action_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub report_id: Option<DbId>,
    pub details_json: Option<serde_json::Value>,
    pub integrity_hash: String,
    pub created_at: Timestamp,
}

impl AuditLog {
    /// The stored entry as a link for hash-chain replay.
    pub fn chain_link(&self) -> ChainLink {
        ChainLink {
            id: self.id,
            canonical_data: canonical_entry_data(
                self.timestamp,
                self.user_id,
                &self.action_type,
                self.entity_type.as_deref(),
                self.entity_id,
                self.details_json.as_ref(),
            ),
            integrity_hash: Some(self.integrity_hash.clone()),
        }
    }

    pub fn into_revision_entry(self) -> AuditEntry {
        AuditEntry {
            id: self.id,
            timestamp: self.timestamp,
            user_id: self.user_id,
            action_type: self.action_type,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            details: self.details_json,
        }
    }
}

/// A new entry. The timestamp and hash are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub user_id: Option<DbId>,
    pub action_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub report_id: Option<DbId>,
    pub details_json: Option<serde_json::Value>,
}

impl NewAuditEntry {
    pub fn new(user_id: Option<DbId>, action_type: &str) -> Self {
        Self {
            user_id,
            action_type: action_type.to_string(),
            entity_type: None,
            entity_id: None,
            report_id: None,
            details_json: None,
        }
    }

    pub fn entity(mut self, entity_type: &str, entity_id: DbId) -> Self {
        self.entity_type = Some(entity_type.to_string());
        self.entity_id = Some(entity_id);
        self
    }

    pub fn report(mut self, report_id: DbId) -> Self {
        self.report_id = Some(report_id);
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details_json = Some(details);
        self
    }
}

/// Filter parameters for querying audit logs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub user_id: Option<DbId>,
    pub action_type: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub report_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
