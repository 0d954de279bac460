//! Report template model and DTOs.

use roofline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Boilerplate content used to pre-fill new reports of an inspection type.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReportTemplate {
    pub id: DbId,
    pub name: String,
    pub inspection_type: String,
    pub description: Option<String>,
    pub content: serde_json::Value,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReportTemplate {
    pub name: String,
    pub inspection_type: String,
    pub description: Option<String>,
    pub content: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReportTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}
