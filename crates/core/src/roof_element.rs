//! Roof element types and condition ratings.

use crate::error::CoreError;

/// All valid roof element types.
pub const VALID_ELEMENT_TYPES: &[&str] = &[
    "roof_cladding",
    "underlay",
    "membrane",
    "flashing",
    "ridge",
    "valley",
    "gutter",
    "downpipe",
    "fascia",
    "penetration",
    "skylight",
    "other",
];

pub const CONDITION_GOOD: &str = "good";
pub const CONDITION_FAIR: &str = "fair";
pub const CONDITION_POOR: &str = "poor";
pub const CONDITION_FAILED: &str = "failed";

/// All valid condition ratings, best to worst.
pub const VALID_CONDITIONS: &[&str] =
    &[CONDITION_GOOD, CONDITION_FAIR, CONDITION_POOR, CONDITION_FAILED];

/// Maximum plausible roof pitch in degrees.
pub const MAX_PITCH_DEGREES: f64 = 90.0;

pub fn validate_element_type(element_type: &str) -> Result<(), CoreError> {
    if VALID_ELEMENT_TYPES.contains(&element_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid roof element type '{element_type}'. Must be one of: {}",
            VALID_ELEMENT_TYPES.join(", ")
        )))
    }
}

pub fn validate_condition(condition: &str) -> Result<(), CoreError> {
    if VALID_CONDITIONS.contains(&condition) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid condition rating '{condition}'. Must be one of: {}",
            VALID_CONDITIONS.join(", ")
        )))
    }
}

pub fn validate_pitch(pitch_degrees: f64) -> Result<(), CoreError> {
    if !(0.0..=MAX_PITCH_DEGREES).contains(&pitch_degrees) {
        return Err(CoreError::Validation(format!(
            "Roof pitch must be between 0 and {MAX_PITCH_DEGREES} degrees"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_types_validate() {
        assert!(validate_element_type("gutter").is_ok());
        assert!(validate_element_type("chimney_pot").is_err());
    }

    #[test]
    fn conditions_validate() {
        for c in VALID_CONDITIONS {
            assert!(validate_condition(c).is_ok());
        }
        assert!(validate_condition("excellent").is_err());
    }

    #[test]
    fn pitch_bounds() {
        assert!(validate_pitch(0.0).is_ok());
        assert!(validate_pitch(22.5).is_ok());
        assert!(validate_pitch(90.0).is_ok());
        assert!(validate_pitch(-1.0).is_err());
        assert!(validate_pitch(91.0).is_err());
        assert!(validate_pitch(f64::NAN).is_err());
    }
}
