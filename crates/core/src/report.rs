//! Report lifecycle: statuses, inspection types, and the review workflow.
//!
//! The transition table lives here so that the API and any future tooling
//! agree on which status changes are legal and who may perform them.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::{ROLE_ADMIN, ROLE_INSPECTOR, ROLE_REVIEWER};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PENDING_REVIEW: &str = "pending_review";
pub const STATUS_REVISION_REQUIRED: &str = "revision_required";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_FINALISED: &str = "finalised";
pub const STATUS_ARCHIVED: &str = "archived";

/// All valid report status strings.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_DRAFT,
    STATUS_PENDING_REVIEW,
    STATUS_REVISION_REQUIRED,
    STATUS_APPROVED,
    STATUS_FINALISED,
    STATUS_ARCHIVED,
];

/// Lifecycle status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    PendingReview,
    RevisionRequired,
    Approved,
    Finalised,
    Archived,
}

impl ReportStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_DRAFT => Ok(Self::Draft),
            STATUS_PENDING_REVIEW => Ok(Self::PendingReview),
            STATUS_REVISION_REQUIRED => Ok(Self::RevisionRequired),
            STATUS_APPROVED => Ok(Self::Approved),
            STATUS_FINALISED => Ok(Self::Finalised),
            STATUS_ARCHIVED => Ok(Self::Archived),
            _ => Err(CoreError::Validation(format!(
                "Invalid report status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => STATUS_DRAFT,
            Self::PendingReview => STATUS_PENDING_REVIEW,
            Self::RevisionRequired => STATUS_REVISION_REQUIRED,
            Self::Approved => STATUS_APPROVED,
            Self::Finalised => STATUS_FINALISED,
            Self::Archived => STATUS_ARCHIVED,
        }
    }

    /// Whether report content (and its child records) may still change.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::RevisionRequired)
    }

    /// Whether the report may be shared outside the organisation.
    pub fn is_shareable(&self) -> bool {
        matches!(self, Self::Approved | Self::Finalised)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Inspection type
// ---------------------------------------------------------------------------

pub const TYPE_FULL_INSPECTION: &str = "full_inspection";
pub const TYPE_PRE_PURCHASE: &str = "pre_purchase";
pub const TYPE_MAINTENANCE: &str = "maintenance";
pub const TYPE_WARRANTY_CLAIM: &str = "warranty_claim";
pub const TYPE_DISPUTE: &str = "dispute";

/// All valid inspection type strings.
pub const VALID_INSPECTION_TYPES: &[&str] = &[
    TYPE_FULL_INSPECTION,
    TYPE_PRE_PURCHASE,
    TYPE_MAINTENANCE,
    TYPE_WARRANTY_CLAIM,
    TYPE_DISPUTE,
];

/// The kind of inspection a report documents. Drives submission minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionType {
    FullInspection,
    PrePurchase,
    Maintenance,
    WarrantyClaim,
    Dispute,
}

impl InspectionType {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            TYPE_FULL_INSPECTION => Ok(Self::FullInspection),
            TYPE_PRE_PURCHASE => Ok(Self::PrePurchase),
            TYPE_MAINTENANCE => Ok(Self::Maintenance),
            TYPE_WARRANTY_CLAIM => Ok(Self::WarrantyClaim),
            TYPE_DISPUTE => Ok(Self::Dispute),
            _ => Err(CoreError::Validation(format!(
                "Invalid inspection type '{s}'. Must be one of: {}",
                VALID_INSPECTION_TYPES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullInspection => TYPE_FULL_INSPECTION,
            Self::PrePurchase => TYPE_PRE_PURCHASE,
            Self::Maintenance => TYPE_MAINTENANCE,
            Self::WarrantyClaim => TYPE_WARRANTY_CLAIM,
            Self::Dispute => TYPE_DISPUTE,
        }
    }

    /// Human-readable label used in emails and rendered documents.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FullInspection => "Full Roof Inspection",
            Self::PrePurchase => "Pre-Purchase Inspection",
            Self::Maintenance => "Maintenance Inspection",
            Self::WarrantyClaim => "Warranty Claim Assessment",
            Self::Dispute => "Dispute Assessment",
        }
    }
}

/// Validate an inspection type string.
pub fn validate_inspection_type(s: &str) -> Result<(), CoreError> {
    InspectionType::from_str_value(s).map(|_| ())
}

// ---------------------------------------------------------------------------
// Workflow actions
// ---------------------------------------------------------------------------

/// A workflow action that moves a report between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportAction {
    Submit,
    Approve,
    RequestRevision,
    Finalise,
    Archive,
    Reopen,
}

impl ReportAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::RequestRevision => "request_revision",
            Self::Finalise => "finalise",
            Self::Archive => "archive",
            Self::Reopen => "reopen",
        }
    }

    /// Actions that must carry a reviewer comment explaining the decision.
    pub fn requires_comment(&self) -> bool {
        matches!(self, Self::RequestRevision | Self::Reopen)
    }

    /// Roles allowed to perform this action.
    pub fn permitted_roles(&self) -> &'static [&'static str] {
        match self {
            Self::Submit => &[ROLE_INSPECTOR, ROLE_ADMIN],
            Self::Approve | Self::RequestRevision | Self::Finalise => &[ROLE_REVIEWER, ROLE_ADMIN],
            Self::Archive | Self::Reopen => &[ROLE_ADMIN],
        }
    }
}

/// Compute the status reached by applying `action` to a report in `from`.
///
/// Returns `CoreError::Conflict` when the pair is not in the transition table.
pub fn transition(from: ReportStatus, action: ReportAction) -> Result<ReportStatus, CoreError> {
    use ReportAction as A;
    use ReportStatus as S;

    let to = match (from, action) {
        (S::Draft | S::RevisionRequired, A::Submit) => S::PendingReview,
        (S::PendingReview, A::Approve) => S::Approved,
        (S::PendingReview, A::RequestRevision) => S::RevisionRequired,
        (S::Approved, A::Finalise) => S::Finalised,
        (S::Approved, A::Reopen) => S::RevisionRequired,
        (S::Draft | S::Finalised, A::Archive) => S::Archived,
        _ => {
            return Err(CoreError::Conflict(format!(
                "Cannot {} a report in status '{from}'",
                action.as_str()
            )))
        }
    };
    Ok(to)
}

/// Check the acting role is allowed to perform `action`.
pub fn authorize_action(role: &str, action: ReportAction) -> Result<(), CoreError> {
    if action.permitted_roles().contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role '{role}' may not {} reports",
            action.as_str()
        )))
    }
}

/// Validate the comment supplied with a workflow action.
pub fn validate_action_comment(
    action: ReportAction,
    comment: Option<&str>,
) -> Result<(), CoreError> {
    let has_comment = comment.is_some_and(|c| !c.trim().is_empty());
    if action.requires_comment() && !has_comment {
        return Err(CoreError::Validation(format!(
            "A comment is required to {} a report",
            action.as_str().replace('_', " ")
        )));
    }
    if let Some(c) = comment {
        if c.len() > MAX_COMMENT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Comment must be at most {MAX_COMMENT_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Maximum length for a workflow comment.
pub const MAX_COMMENT_LENGTH: usize = 5_000;

/// A reviewer may not approve or finalise a report they inspected.
pub fn ensure_independent_review(
    reviewer_id: DbId,
    inspector_id: Option<DbId>,
) -> Result<(), CoreError> {
    if inspector_id == Some(reviewer_id) {
        return Err(CoreError::Forbidden(
            "Reviewers cannot approve reports they inspected".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Report number
// ---------------------------------------------------------------------------

/// Format a human-facing report number, e.g. `RR-2026-000042`.
pub fn format_report_number(year: i32, sequence: i64) -> String {
    format!("RR-{year}-{sequence:06}")
}
