//! Roof element model and DTOs.

use roofline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoofElement {
    pub id: DbId,
    pub report_id: DbId,
    pub element_type: String,
    pub material: Option<String>,
    pub location: Option<String>,
    pub condition_rating: Option<String>,
    pub pitch_degrees: Option<f64>,
    pub notes: Option<String>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoofElement {
    pub element_type: String,
    pub material: Option<String>,
    pub location: Option<String>,
    pub condition_rating: Option<String>,
    pub pitch_degrees: Option<f64>,
    pub notes: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoofElement {
    pub element_type: Option<String>,
    pub material: Option<String>,
    pub location: Option<String>,
    pub condition_rating: Option<String>,
    pub pitch_degrees: Option<f64>,
    pub notes: Option<String>,
    pub sort_order: Option<i32>,
}
