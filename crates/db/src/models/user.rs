//! User entity model and DTOs.
//!
//! Credentials live with the identity provider; a user row links the
//! provider's subject (`external_id`) to a local role.

use roofline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user joined with its role name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub external_id: String,
    pub email: String,
    pub display_name: String,
    pub role_id: DbId,
    /// Resolved role name (e.g. `"inspector"`).
    pub role: String,
    pub lbp_number: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub last_seen_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for provisioning a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub external_id: String,
    pub email: String,
    pub display_name: String,
    pub role_id: DbId,
    pub lbp_number: Option<String>,
    pub phone: Option<String>,
}

/// DTO for updating a user. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role_id: Option<DbId>,
    pub lbp_number: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}
