//! Defect severity and category constants with validation helpers.

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

pub const SEVERITY_MINOR: &str = "minor";
pub const SEVERITY_MODERATE: &str = "moderate";
pub const SEVERITY_MAJOR: &str = "major";
pub const SEVERITY_CRITICAL: &str = "critical";

/// All valid severities, least to most severe.
pub const VALID_SEVERITIES: &[&str] = &[
    SEVERITY_MINOR,
    SEVERITY_MODERATE,
    SEVERITY_MAJOR,
    SEVERITY_CRITICAL,
];

/// All valid defect categories.
pub const VALID_CATEGORIES: &[&str] = &[
    "flashing",
    "fixings",
    "corrosion",
    "membrane",
    "drainage",
    "structural",
    "ventilation",
    "workmanship",
    "other",
];

/// Maximum length for a defect title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for free-text defect fields.
pub const MAX_TEXT_LENGTH: usize = 10_000;

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

pub fn validate_severity(severity: &str) -> Result<(), CoreError> {
    if VALID_SEVERITIES.contains(&severity) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid defect severity '{severity}'. Must be one of: {}",
            VALID_SEVERITIES.join(", ")
        )))
    }
}

pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if VALID_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid defect category '{category}'. Must be one of: {}",
            VALID_CATEGORIES.join(", ")
        )))
    }
}

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Defect title must not be empty".into()));
    }
    if trimmed.len() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Defect title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional free-text field against [`MAX_TEXT_LENGTH`].
pub fn validate_text(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    if value.is_some_and(|v| v.len() > MAX_TEXT_LENGTH) {
        return Err(CoreError::Validation(format!(
            "Defect {field} must be at most {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Major and critical defects must state a remedial recommendation before
/// the report can be submitted.
pub fn severity_requires_recommendation(severity: &str) -> bool {
    severity == SEVERITY_MAJOR || severity == SEVERITY_CRITICAL
}

/// Rank used to order defects by severity (higher is worse).
pub fn severity_rank(severity: &str) -> usize {
    VALID_SEVERITIES
        .iter()
        .position(|s| *s == severity)
        .unwrap_or(0)
}
