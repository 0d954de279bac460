//! Well-known role names and role-based report field permissions.
//!
//! Role names must match the seed data in `db/migrations/0001_roles_and_users.sql`.

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_REVIEWER: &str = "reviewer";
pub const ROLE_INSPECTOR: &str = "inspector";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_REVIEWER, ROLE_INSPECTOR];

/// Report fields an inspector fills in while drafting.
pub const INSPECTOR_REPORT_FIELDS: &[&str] = &[
    "inspection_type",
    "property_address",
    "property_suburb",
    "property_city",
    "property_postcode",
    "client_name",
    "client_email",
    "client_phone",
    "inspection_date",
    "weather_conditions",
    "roof_age_years",
    "executive_summary",
    "conclusions",
    "recommendations",
];

/// Report fields only a reviewer (or admin) writes.
pub const REVIEWER_REPORT_FIELDS: &[&str] = &["reviewer_notes"];

/// Report fields reserved for administrators.
pub const ADMIN_ONLY_REPORT_FIELDS: &[&str] = &["inspector_id", "reviewer_id"];

/// Validate that a role name is one of the known roles.
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        )))
    }
}

/// Whether the role may act as a reviewer (reviewers and admins).
pub fn is_reviewer_or_admin(role: &str) -> bool {
    role == ROLE_REVIEWER || role == ROLE_ADMIN
}

/// The set of report fields the given role may write.
pub fn editable_report_fields(role: &str) -> Vec<&'static str> {
    match role {
        ROLE_ADMIN => INSPECTOR_REPORT_FIELDS
            .iter()
            .chain(REVIEWER_REPORT_FIELDS)
            .chain(ADMIN_ONLY_REPORT_FIELDS)
            .copied()
            .collect(),
        ROLE_REVIEWER => REVIEWER_REPORT_FIELDS.to_vec(),
        ROLE_INSPECTOR => INSPECTOR_REPORT_FIELDS.to_vec(),
        _ => Vec::new(),
    }
}

/// Reject the update if it touches any field the role may not write.
///
/// `changed_fields` are the names of fields present in the update payload.
/// The error names the first offending field.
pub fn check_report_field_permissions<'a, I>(
    role: &str,
    changed_fields: I,
) -> Result<(), CoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let allowed = editable_report_fields(role);
    for field in changed_fields {
        if !allowed.contains(&field) {
            return Err(CoreError::Forbidden(format!(
                "Role '{role}' may not modify report field '{field}'"
            )));
        }
    }
    Ok(())
}
