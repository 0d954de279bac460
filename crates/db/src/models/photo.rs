//! Photo model with evidentiary metadata.

use roofline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Photo {
    pub id: DbId,
    pub report_id: DbId,
    pub defect_id: Option<DbId>,
    pub roof_element_id: Option<DbId>,
    pub storage_key: String,
    pub url: String,
    pub original_filename: Option<String>,
    pub content_type: String,
    pub size_bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sha256_hash: String,
    pub client_hash: Option<String>,
    pub hash_verified: bool,
    pub captured_at: Option<Timestamp>,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
    pub gps_accuracy_m: Option<f64>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub caption: Option<String>,
    pub sort_order: i32,
    pub uploaded_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload assembled by the upload handler after storing the file.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub report_id: DbId,
    pub defect_id: Option<DbId>,
    pub roof_element_id: Option<DbId>,
    pub storage_key: String,
    pub url: String,
    pub original_filename: Option<String>,
    pub content_type: String,
    pub size_bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sha256_hash: String,
    pub client_hash: Option<String>,
    pub hash_verified: bool,
    pub captured_at: Option<Timestamp>,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
    pub gps_accuracy_m: Option<f64>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub caption: Option<String>,
    pub uploaded_by: Option<DbId>,
}

/// Editable photo fields. Evidentiary metadata is fixed at upload.
///
/// For the links, an absent key leaves the value alone and an explicit
/// `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePhoto {
    #[serde(default, deserialize_with = "nullable")]
    pub defect_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub roof_element_id: Option<Option<DbId>>,
    pub caption: Option<String>,
    pub sort_order: Option<i32>,
}

/// Deserialize a present key into `Some`, keeping `null` as `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
