//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for list endpoints that support an `include_inactive` flag.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// `?role=` filter for the user directory.
#[derive(Debug, Deserialize)]
pub struct RoleFilterParams {
    pub role: Option<String>,
}
