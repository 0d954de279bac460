//! Inspector assignment statuses.

use crate::error::CoreError;

pub const ASSIGNMENT_ASSIGNED: &str = "assigned";
pub const ASSIGNMENT_ACCEPTED: &str = "accepted";
pub const ASSIGNMENT_IN_PROGRESS: &str = "in_progress";
pub const ASSIGNMENT_COMPLETED: &str = "completed";
pub const ASSIGNMENT_CANCELLED: &str = "cancelled";

pub const VALID_ASSIGNMENT_STATUSES: &[&str] = &[
    ASSIGNMENT_ASSIGNED,
    ASSIGNMENT_ACCEPTED,
    ASSIGNMENT_IN_PROGRESS,
    ASSIGNMENT_COMPLETED,
    ASSIGNMENT_CANCELLED,
];

pub fn validate_assignment_status(status: &str) -> Result<(), CoreError> {
    if VALID_ASSIGNMENT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid assignment status '{status}'. Must be one of: {}",
            VALID_ASSIGNMENT_STATUSES.join(", ")
        )))
    }
}

/// Completed and cancelled assignments cannot change again.
pub fn is_terminal(status: &str) -> bool {
    matches!(status, ASSIGNMENT_COMPLETED | ASSIGNMENT_CANCELLED)
}

/// Check an assignment may move from `from` to `to`.
pub fn validate_assignment_change(from: &str, to: &str) -> Result<(), CoreError> {
    validate_assignment_status(to)?;
    if from == to {
        return Ok(());
    }
    if is_terminal(from) {
        return Err(CoreError::Conflict(format!(
            "Assignment is already {from} and cannot become {to}"
        )));
    }
    if to == ASSIGNMENT_ASSIGNED {
        return Err(CoreError::Conflict(
            "An assignment cannot return to 'assigned'".into(),
        ));
    }
    Ok(())
}
