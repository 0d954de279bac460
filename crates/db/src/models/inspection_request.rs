//! Public inspection-request model.

use roofline_core::inspection_request::REQUEST_NEW;
use roofline_core::types::{CalendarDate, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InspectionRequest {
    pub id: DbId,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub property_address: String,
    pub property_suburb: Option<String>,
    pub property_city: Option<String>,
    pub property_postcode: Option<String>,
    pub inspection_type: String,
    pub preferred_date: Option<CalendarDate>,
    pub message: Option<String>,
    pub status: String,
    pub report_id: Option<DbId>,
    pub handled_by: Option<DbId>,
    pub decline_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InspectionRequest {
    /// Not yet converted or declined.
    pub fn is_new(&self) -> bool {
        self.status == REQUEST_NEW
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InspectionRequestFilter {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
