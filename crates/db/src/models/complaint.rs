//! LBP complaint model and DTOs.

use roofline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LbpComplaint {
    pub id: DbId,
    pub report_id: DbId,
    pub status: String,
    pub complainant_name: Option<String>,
    pub complainant_email: Option<String>,
    pub complainant_phone: Option<String>,
    pub practitioner_name: Option<String>,
    pub practitioner_lbp_number: Option<String>,
    pub site_address: Option<String>,
    pub grounds: Option<String>,
    pub desired_outcome: Option<String>,
    pub reviewer_id: Option<DbId>,
    pub reviewer_comment: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub submitted_at: Option<Timestamp>,
    pub submission_reference: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Draft fields. Used for both create and partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplaintDraft {
    pub complainant_name: Option<String>,
    pub complainant_email: Option<String>,
    pub complainant_phone: Option<String>,
    pub practitioner_name: Option<String>,
    pub practitioner_lbp_number: Option<String>,
    pub site_address: Option<String>,
    pub grounds: Option<String>,
    pub desired_outcome: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplaintFilter {
    pub status: Option<String>,
    pub report_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
