//! Report share model.

use roofline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReportShare {
    pub id: DbId,
    pub report_id: DbId,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub recipient_email: Option<String>,
    pub recipient_name: Option<String>,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub access_count: i32,
    pub last_accessed_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of `POST /reports/{id}/shares`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShare {
    pub recipient_email: Option<String>,
    pub recipient_name: Option<String>,
    pub expires_in_days: Option<i64>,
}

/// Insert payload with the already-hashed token.
#[derive(Debug, Clone)]
pub struct NewShare {
    pub report_id: DbId,
    pub token_hash: String,
    pub recipient_email: Option<String>,
    pub recipient_name: Option<String>,
    pub expires_at: Timestamp,
    pub created_by: Option<DbId>,
}
