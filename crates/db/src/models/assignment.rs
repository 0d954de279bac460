//! Inspector assignment model and DTOs.

use roofline_core::types::{CalendarDate, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assignment {
    pub id: DbId,
    pub report_id: DbId,
    pub inspector_id: DbId,
    pub assigned_by: Option<DbId>,
    pub due_date: Option<CalendarDate>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignment {
    pub inspector_id: DbId,
    pub due_date: Option<CalendarDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssignment {
    pub status: Option<String>,
    pub due_date: Option<CalendarDate>,
    pub notes: Option<String>,
}
