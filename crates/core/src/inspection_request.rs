//! Public inspection-request intake.
//!
//! Anyone may request an inspection; staff later convert the request into a
//! draft report or decline it.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::report::validate_inspection_type;

pub const REQUEST_NEW: &str = "new";
pub const REQUEST_CONVERTED: &str = "converted";
pub const REQUEST_DECLINED: &str = "declined";

pub const VALID_REQUEST_STATUSES: &[&str] = &[REQUEST_NEW, REQUEST_CONVERTED, REQUEST_DECLINED];

/// Body of `POST /inspection-requests`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InspectionRequestInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub contact_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub contact_email: String,
    #[validate(custom(function = "validate_phone"))]
    pub contact_phone: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Property address is required"))]
    pub property_address: String,
    #[validate(length(max = 100))]
    pub property_suburb: Option<String>,
    #[validate(length(max = 100))]
    pub property_city: Option<String>,
    #[validate(length(max = 10))]
    pub property_postcode: Option<String>,
    pub inspection_type: String,
    pub preferred_date: Option<NaiveDate>,
    #[validate(length(max = 5000))]
    pub message: Option<String>,
}

/// Phone numbers: digits, spaces, `+`, `-` and parentheses, 6 to 20 chars.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let len = phone.chars().count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    if allowed && (6..=20).contains(&len) && phone.chars().any(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message("Invalid phone number".into()))
    }
}

fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let msg = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{field}: {msg}")
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

/// Validate an intake request against field rules and the current date.
pub fn validate_request(input: &InspectionRequestInput, today: NaiveDate) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(describe(&e)))?;
    validate_inspection_type(&input.inspection_type)?;
    if input.preferred_date.is_some_and(|d| d < today) {
        return Err(CoreError::Validation(
            "Preferred date cannot be in the past".into(),
        ));
    }
    Ok(())
}
