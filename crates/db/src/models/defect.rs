//! Defect model and DTOs.

use roofline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A defect row. `defect_number` is sequential within its report.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Defect {
    pub id: DbId,
    pub report_id: DbId,
    pub roof_element_id: Option<DbId>,
    pub defect_number: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub severity: String,
    pub category: String,
    pub recommendation: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDefect {
    pub roof_element_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub severity: String,
    pub category: String,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDefect {
    pub roof_element_id: Option<DbId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub severity: Option<String>,
    pub category: Option<String>,
    pub recommendation: Option<String>,
}
