//! Compliance assessment model.

use roofline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One checklist's answers for a report. `items` is keyed by item code.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ComplianceAssessment {
    pub id: DbId,
    pub report_id: DbId,
    pub checklist_code: String,
    pub items: serde_json::Value,
    pub assessed_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of `PUT /reports/{id}/compliance/{checklist}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertComplianceAssessment {
    pub items: serde_json::Value,
}
