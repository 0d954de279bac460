//! Report entity model, DTOs and list filter.

use roofline_core::types::{CalendarDate, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub report_number: String,
    pub inspection_type: String,
    pub status: String,
    pub property_address: Option<String>,
    pub property_suburb: Option<String>,
    pub property_city: Option<String>,
    pub property_postcode: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub inspection_date: Option<CalendarDate>,
    pub weather_conditions: Option<String>,
    pub roof_age_years: Option<i32>,
    pub executive_summary: Option<String>,
    pub conclusions: Option<String>,
    pub recommendations: Option<String>,
    pub reviewer_notes: Option<String>,
    pub inspector_id: Option<DbId>,
    pub reviewer_id: Option<DbId>,
    pub template_id: Option<DbId>,
    pub pdf_url: Option<String>,
    pub pdf_generated_at: Option<Timestamp>,
    pub revision_round: i32,
    pub submitted_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub finalised_at: Option<Timestamp>,
    pub archived_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a draft report. `created_by` is supplied separately.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateReport {
    pub inspection_type: String,
    pub property_address: Option<String>,
    pub property_suburb: Option<String>,
    pub property_city: Option<String>,
    pub property_postcode: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub inspection_date: Option<CalendarDate>,
    pub weather_conditions: Option<String>,
    pub roof_age_years: Option<i32>,
    pub executive_summary: Option<String>,
    pub inspector_id: Option<DbId>,
    pub template_id: Option<DbId>,
}

/// DTO for updating report fields. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReport {
    pub inspection_type: Option<String>,
    pub property_address: Option<String>,
    pub property_suburb: Option<String>,
    pub property_city: Option<String>,
    pub property_postcode: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub inspection_date: Option<CalendarDate>,
    pub weather_conditions: Option<String>,
    pub roof_age_years: Option<i32>,
    pub executive_summary: Option<String>,
    pub conclusions: Option<String>,
    pub recommendations: Option<String>,
    pub reviewer_notes: Option<String>,
    pub inspector_id: Option<DbId>,
    pub reviewer_id: Option<DbId>,
}

impl UpdateReport {
    /// Names of the fields present in this update.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let present = [
            ("inspection_type", self.inspection_type.is_some()),
            ("property_address", self.property_address.is_some()),
            ("property_suburb", self.property_suburb.is_some()),
            ("property_city", self.property_city.is_some()),
            ("property_postcode", self.property_postcode.is_some()),
            ("client_name", self.client_name.is_some()),
            ("client_email", self.client_email.is_some()),
            ("client_phone", self.client_phone.is_some()),
            ("inspection_date", self.inspection_date.is_some()),
            ("weather_conditions", self.weather_conditions.is_some()),
            ("roof_age_years", self.roof_age_years.is_some()),
            ("executive_summary", self.executive_summary.is_some()),
            ("conclusions", self.conclusions.is_some()),
            ("recommendations", self.recommendations.is_some()),
            ("reviewer_notes", self.reviewer_notes.is_some()),
            ("inspector_id", self.inspector_id.is_some()),
            ("reviewer_id", self.reviewer_id.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }
}

/// Filters for listing reports.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    pub status: Option<String>,
    pub inspection_type: Option<String>,
    pub inspector_id: Option<DbId>,
    /// Case-insensitive match on report number, address and client name.
    pub search: Option<String>,
    /// Restrict to reports the user created, inspects or is assigned to.
    #[serde(skip)]
    pub visible_to: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated report listing.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPage {
    pub items: Vec<Report>,
    pub total: i64,
}
