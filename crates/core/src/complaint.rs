//! Licensed Building Practitioner (LBP) complaint workflow.
//!
//! A complaint is drafted from an approved or finalised dispute report, goes
//! through internal review, and is then submitted to the licensing board.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::report::{InspectionType, ReportStatus};
use crate::roles::{ROLE_ADMIN, ROLE_INSPECTOR, ROLE_REVIEWER};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const COMPLAINT_DRAFT: &str = "draft";
pub const COMPLAINT_PENDING_REVIEW: &str = "pending_review";
pub const COMPLAINT_APPROVED: &str = "approved";
pub const COMPLAINT_SUBMITTED: &str = "submitted";

pub const VALID_COMPLAINT_STATUSES: &[&str] = &[
    COMPLAINT_DRAFT,
    COMPLAINT_PENDING_REVIEW,
    COMPLAINT_APPROVED,
    COMPLAINT_SUBMITTED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Draft,
    PendingReview,
    Approved,
    Submitted,
}

impl ComplaintStatus {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            COMPLAINT_DRAFT => Ok(Self::Draft),
            COMPLAINT_PENDING_REVIEW => Ok(Self::PendingReview),
            COMPLAINT_APPROVED => Ok(Self::Approved),
            COMPLAINT_SUBMITTED => Ok(Self::Submitted),
            _ => Err(CoreError::Validation(format!(
                "Invalid complaint status '{s}'. Must be one of: {}",
                VALID_COMPLAINT_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => COMPLAINT_DRAFT,
            Self::PendingReview => COMPLAINT_PENDING_REVIEW,
            Self::Approved => COMPLAINT_APPROVED,
            Self::Submitted => COMPLAINT_SUBMITTED,
        }
    }

    /// Only drafts may be edited.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintAction {
    SubmitForReview,
    Approve,
    Return,
    Submit,
}

impl ComplaintAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubmitForReview => "submit_for_review",
            Self::Approve => "approve",
            Self::Return => "return",
            Self::Submit => "submit",
        }
    }

    pub fn permitted_roles(&self) -> &'static [&'static str] {
        match self {
            Self::SubmitForReview => &[ROLE_INSPECTOR, ROLE_REVIEWER, ROLE_ADMIN],
            Self::Approve | Self::Return | Self::Submit => &[ROLE_REVIEWER, ROLE_ADMIN],
        }
    }
}

/// Apply a workflow action to a complaint status.
pub fn complaint_transition(
    from: ComplaintStatus,
    action: ComplaintAction,
) -> Result<ComplaintStatus, CoreError> {
    use ComplaintAction as A;
    use ComplaintStatus as S;

    match (from, action) {
        (S::Draft, A::SubmitForReview) => Ok(S::PendingReview),
        (S::PendingReview, A::Approve) => Ok(S::Approved),
        (S::PendingReview | S::Approved, A::Return) => Ok(S::Draft),
        (S::Approved, A::Submit) => Ok(S::Submitted),
        _ => Err(CoreError::Conflict(format!(
            "Cannot {} a complaint in status '{from}'",
            action.as_str().replace('_', " ")
        ))),
    }
}

pub fn authorize_complaint_action(role: &str, action: ComplaintAction) -> Result<(), CoreError> {
    if action.permitted_roles().contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role '{role}' may not {} complaints",
            action.as_str().replace('_', " ")
        )))
    }
}

/// Complaints can only be raised from approved or finalised dispute reports.
pub fn ensure_report_eligible(
    inspection_type: InspectionType,
    status: ReportStatus,
) -> Result<(), CoreError> {
    if inspection_type != InspectionType::Dispute {
        return Err(CoreError::Validation(
            "LBP complaints can only be raised from dispute reports".into(),
        ));
    }
    if !matches!(status, ReportStatus::Approved | ReportStatus::Finalised) {
        return Err(CoreError::Conflict(format!(
            "Report must be approved or finalised before raising a complaint (status '{status}')"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

static LBP_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^BP\d{6}$").expect("valid regex")
});

/// Minimum length of the complaint grounds narrative.
pub const MIN_GROUNDS_LENGTH: usize = 100;

/// Validate an LBP licence number (`BP` followed by six digits).
pub fn validate_lbp_number(number: &str) -> Result<(), CoreError> {
    if LBP_NUMBER_RE.is_match(number.trim()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid LBP number '{number}'. Expected 'BP' followed by six digits"
        )))
    }
}

/// The complaint fields checked before board submission.
#[derive(Debug, Clone, Default)]
pub struct ComplaintFields<'a> {
    pub complainant_name: Option<&'a str>,
    pub complainant_email: Option<&'a str>,
    pub practitioner_name: Option<&'a str>,
    pub practitioner_lbp_number: Option<&'a str>,
    pub site_address: Option<&'a str>,
    pub grounds: Option<&'a str>,
}

fn present(v: Option<&str>) -> bool {
    v.is_some_and(|s| !s.trim().is_empty())
}

/// Check a complaint is complete enough to go to the board.
///
/// Collects every problem so the caller can show them all at once.
pub fn validate_for_submission(fields: &ComplaintFields<'_>) -> Result<(), CoreError> {
    let mut problems = Vec::new();

    if !present(fields.complainant_name) {
        problems.push("complainant name is required".to_string());
    }
    if !fields.complainant_email.is_some_and(|e| e.contains('@')) {
        problems.push("a valid complainant email is required".to_string());
    }
    if !present(fields.practitioner_name) {
        problems.push("practitioner name is required".to_string());
    }
    match fields.practitioner_lbp_number {
        Some(n) if validate_lbp_number(n).is_ok() => {}
        Some(n) => problems.push(format!("LBP number '{n}' is not valid")),
        None => problems.push("practitioner LBP number is required".to_string()),
    }
    if !present(fields.site_address) {
        problems.push("site address is required".to_string());
    }
    let grounds_len = fields.grounds.map_or(0, |g| g.trim().chars().count());
    if grounds_len < MIN_GROUNDS_LENGTH {
        problems.push(format!(
            "grounds must be at least {MIN_GROUNDS_LENGTH} characters ({grounds_len} given)"
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Complaint is incomplete: {}",
            problems.join("; ")
        )))
    }
}

/// Board submission reference, e.g. `LBP-20260314-42`.
pub fn submission_reference(date: NaiveDate, complaint_id: DbId) -> String {
    format!("LBP-{}-{complaint_id}", date.format("%Y%m%d"))
}
