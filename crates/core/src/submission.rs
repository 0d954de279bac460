//! Report-submission validation engine.
//!
//! Aggregates completeness and evidentiary checks across the report header,
//! photos, defects, roof elements and compliance checklists, and partitions
//! the findings into blocking errors and advisory warnings. A report can be
//! submitted for review only when there are no errors.
//!
//! Evaluation is pure: the caller loads a [`SubmissionSnapshot`] from the
//! database and passes it in.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::compliance::{
    checklist_progress, ChecklistItems, ChecklistProgress, CHECKLIST_B2_DURABILITY,
    CHECKLIST_E2_AS1, CHECKLIST_METAL_ROOF_COP,
};
use crate::defect::severity_requires_recommendation;
use crate::photo::{custody_state, CustodyState, CAPTURE_CLOCK_SKEW_MINUTES, STALE_CAPTURE_DAYS};
use crate::report::InspectionType;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Per-inspection-type minimums a report must meet before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRequirements {
    pub min_photos: usize,
    pub min_roof_elements: usize,
    pub required_checklists: &'static [&'static str],
    pub requires_defects: bool,
}

/// Look up the submission minimums for an inspection type.
pub fn requirements_for(inspection_type: InspectionType) -> SubmissionRequirements {
    match inspection_type {
        InspectionType::FullInspection => SubmissionRequirements {
            min_photos: 20,
            min_roof_elements: 3,
            required_checklists: &[CHECKLIST_E2_AS1, CHECKLIST_METAL_ROOF_COP],
            requires_defects: false,
        },
        InspectionType::PrePurchase => SubmissionRequirements {
            min_photos: 10,
            min_roof_elements: 2,
            required_checklists: &[CHECKLIST_E2_AS1],
            requires_defects: false,
        },
        InspectionType::Maintenance => SubmissionRequirements {
            min_photos: 5,
            min_roof_elements: 1,
            required_checklists: &[],
            requires_defects: false,
        },
        InspectionType::WarrantyClaim => SubmissionRequirements {
            min_photos: 10,
            min_roof_elements: 1,
            required_checklists: &[CHECKLIST_B2_DURABILITY],
            requires_defects: false,
        },
        InspectionType::Dispute => SubmissionRequirements {
            min_photos: 15,
            min_roof_elements: 2,
            required_checklists: &[CHECKLIST_E2_AS1, CHECKLIST_B2_DURABILITY],
            requires_defects: true,
        },
    }
}

/// Conclusions shorter than this draw a warning.
pub const MIN_CONCLUSIONS_LENGTH: usize = 50;

// ---------------------------------------------------------------------------
// Issue codes
// ---------------------------------------------------------------------------

/// Stable machine-readable codes for validation issues.
pub mod codes {
    pub const MISSING_PROPERTY_ADDRESS: &str = "missing_property_address";
    pub const MISSING_INSPECTION_DATE: &str = "missing_inspection_date";
    pub const FUTURE_INSPECTION_DATE: &str = "future_inspection_date";
    pub const MISSING_INSPECTOR: &str = "missing_inspector";
    pub const MISSING_EXECUTIVE_SUMMARY: &str = "missing_executive_summary";
    pub const INSUFFICIENT_PHOTOS: &str = "insufficient_photos";
    pub const INSUFFICIENT_ROOF_ELEMENTS: &str = "insufficient_roof_elements";
    pub const MISSING_CHECKLIST: &str = "missing_checklist";
    pub const INCOMPLETE_CHECKLIST: &str = "incomplete_checklist";
    pub const FAILED_ITEM_WITHOUT_NOTES: &str = "failed_item_without_notes";
    pub const MISSING_DEFECTS: &str = "missing_defects";
    pub const DEFECT_WITHOUT_DESCRIPTION: &str = "defect_without_description";
    pub const DEFECT_WITHOUT_PHOTO: &str = "defect_without_photo";
    pub const DEFECT_WITHOUT_RECOMMENDATION: &str = "defect_without_recommendation";

    pub const PHOTO_WITHOUT_GPS: &str = "photo_without_gps";
    pub const PHOTO_WITHOUT_CAPTURE_TIME: &str = "photo_without_capture_time";
    pub const PHOTO_HASH_MISMATCH: &str = "photo_hash_mismatch";
    pub const PHOTO_WITHOUT_CAPTION: &str = "photo_without_caption";
    pub const PHOTO_CAPTURED_AFTER_UPLOAD: &str = "photo_captured_after_upload";
    pub const PHOTO_STALE_CAPTURE: &str = "photo_stale_capture";
    pub const ELEMENT_WITHOUT_CONDITION: &str = "element_without_condition";
    pub const SHORT_CONCLUSIONS: &str = "short_conclusions";
    pub const DEFECT_WITHOUT_ELEMENT: &str = "defect_without_element";
}

// ---------------------------------------------------------------------------
// Input snapshot
// ---------------------------------------------------------------------------

/// Report header fields relevant to submission.
#[derive(Debug, Clone)]
pub struct ReportFacts {
    pub inspection_type: InspectionType,
    pub property_address: Option<String>,
    pub inspection_date: Option<NaiveDate>,
    pub inspector_id: Option<DbId>,
    pub executive_summary: Option<String>,
    pub conclusions: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PhotoFacts {
    pub id: DbId,
    pub defect_id: Option<DbId>,
    pub has_gps: bool,
    pub captured_at: Option<Timestamp>,
    pub uploaded_at: Timestamp,
    pub client_hash: Option<String>,
    pub hash_verified: bool,
    pub caption: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DefectFacts {
    pub id: DbId,
    pub defect_number: i32,
    pub severity: String,
    pub description: Option<String>,
    pub recommendation: Option<String>,
    pub roof_element_id: Option<DbId>,
}

#[derive(Debug, Clone)]
pub struct RoofElementFacts {
    pub id: DbId,
    pub element_type: String,
    pub condition_rating: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChecklistFacts {
    pub checklist_code: String,
    pub items: ChecklistItems,
}

/// Everything the engine needs, pre-fetched by the caller.
#[derive(Debug, Clone)]
pub struct SubmissionSnapshot {
    pub report: ReportFacts,
    pub photos: Vec<PhotoFacts>,
    pub defects: Vec<DefectFacts>,
    pub roof_elements: Vec<RoofElementFacts>,
    pub checklists: Vec<ChecklistFacts>,
    /// The date the evaluation runs on (used for future-date checks).
    pub today: NaiveDate,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A single finding. `entity_type`/`entity_id` point at the offending child
/// record when there is one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<DbId>,
}

impl ValidationIssue {
    fn report(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    fn entity(
        code: &'static str,
        entity_type: &'static str,
        entity_id: DbId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            entity_type: Some(entity_type),
            entity_id: Some(entity_id),
        }
    }
}

/// Counted totals against the required minimums.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub inspection_type: InspectionType,
    pub photo_count: usize,
    pub min_photos: usize,
    pub roof_element_count: usize,
    pub min_roof_elements: usize,
    pub defect_count: usize,
    pub checklists: Vec<ChecklistProgress>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Result of evaluating a report for submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionValidation {
    pub can_submit: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub summary: SubmissionSummary,
}

impl SubmissionValidation {
    /// Whether any error or warning carries the given code.
    pub fn has_issue(&self, code: &str) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|i| i.code == code)
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Evaluate a snapshot against the rule table.
pub fn validate_submission(snapshot: &SubmissionSnapshot) -> SubmissionValidation {
    let requirements = requirements_for(snapshot.report.inspection_type);
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_header(snapshot, &mut errors, &mut warnings);
    check_counts(snapshot, &requirements, &mut errors);
    let checklists = check_checklists(snapshot, &requirements, &mut errors);
    check_defects(snapshot, &requirements, &mut errors, &mut warnings);
    check_photos(snapshot, &mut warnings);
    check_roof_elements(snapshot, &mut warnings);

    let summary = SubmissionSummary {
        inspection_type: snapshot.report.inspection_type,
        photo_count: snapshot.photos.len(),
        min_photos: requirements.min_photos,
        roof_element_count: snapshot.roof_elements.len(),
        min_roof_elements: requirements.min_roof_elements,
        defect_count: snapshot.defects.len(),
        checklists,
        error_count: errors.len(),
        warning_count: warnings.len(),
    };

    SubmissionValidation {
        can_submit: errors.is_empty(),
        errors,
        warnings,
        summary,
    }
}

fn check_header(
    snapshot: &SubmissionSnapshot,
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<ValidationIssue>,
) {
    let report = &snapshot.report;

    if is_blank(report.property_address.as_deref()) {
        errors.push(ValidationIssue::report(
            codes::MISSING_PROPERTY_ADDRESS,
            "Property address is required",
        ));
    }

    match report.inspection_date {
        None => errors.push(ValidationIssue::report(
            codes::MISSING_INSPECTION_DATE,
            "Inspection date is required",
        )),
        Some(date) if date > snapshot.today => errors.push(ValidationIssue::report(
            codes::FUTURE_INSPECTION_DATE,
            format!("Inspection date {date} is in the future"),
        )),
        Some(_) => {}
    }

    if report.inspector_id.is_none() {
        errors.push(ValidationIssue::report(
            codes::MISSING_INSPECTOR,
            "An inspector must be assigned",
        ));
    }

    if is_blank(report.executive_summary.as_deref()) {
        errors.push(ValidationIssue::report(
            codes::MISSING_EXECUTIVE_SUMMARY,
            "Executive summary is required",
        ));
    }

    let conclusions_len = report
        .conclusions
        .as_deref()
        .map_or(0, |c| c.trim().chars().count());
    if conclusions_len < MIN_CONCLUSIONS_LENGTH {
        warnings.push(ValidationIssue::report(
            codes::SHORT_CONCLUSIONS,
            format!("Conclusions are shorter than {MIN_CONCLUSIONS_LENGTH} characters"),
        ));
    }
}

fn check_counts(
    snapshot: &SubmissionSnapshot,
    requirements: &SubmissionRequirements,
    errors: &mut Vec<ValidationIssue>,
) {
    let type_label = snapshot.report.inspection_type.label();

    if snapshot.photos.len() < requirements.min_photos {
        errors.push(ValidationIssue::report(
            codes::INSUFFICIENT_PHOTOS,
            format!(
                "{type_label} requires at least {} photos ({} uploaded)",
                requirements.min_photos,
                snapshot.photos.len()
            ),
        ));
    }

    if snapshot.roof_elements.len() < requirements.min_roof_elements {
        errors.push(ValidationIssue::report(
            codes::INSUFFICIENT_ROOF_ELEMENTS,
            format!(
                "{type_label} requires at least {} roof elements ({} recorded)",
                requirements.min_roof_elements,
                snapshot.roof_elements.len()
            ),
        ));
    }
}

fn check_checklists(
    snapshot: &SubmissionSnapshot,
    requirements: &SubmissionRequirements,
    errors: &mut Vec<ValidationIssue>,
) -> Vec<ChecklistProgress> {
    let mut progress_list = Vec::new();

    for code in requirements.required_checklists {
        let Some(facts) = snapshot
            .checklists
            .iter()
            .find(|c| c.checklist_code == *code)
        else {
            errors.push(ValidationIssue::report(
                codes::MISSING_CHECKLIST,
                format!("Compliance checklist '{code}' has not been started"),
            ));
            continue;
        };

        let progress = checklist_progress(code, &facts.items);
        if !progress.is_complete() {
            errors.push(ValidationIssue::report(
                codes::INCOMPLETE_CHECKLIST,
                format!(
                    "Compliance checklist '{code}' has {} unanswered item(s)",
                    progress.unanswered.len()
                ),
            ));
        }
        for item in &progress.failed_without_notes {
            errors.push(ValidationIssue::report(
                codes::FAILED_ITEM_WITHOUT_NOTES,
                format!("Failed item '{item}' in '{code}' needs explanatory notes"),
            ));
        }
        progress_list.push(progress);
    }

    // Optional checklists still report progress and failed-item notes.
    for facts in &snapshot.checklists {
        if requirements
            .required_checklists
            .contains(&facts.checklist_code.as_str())
        {
            continue;
        }
        let progress = checklist_progress(&facts.checklist_code, &facts.items);
        for item in &progress.failed_without_notes {
            errors.push(ValidationIssue::report(
                codes::FAILED_ITEM_WITHOUT_NOTES,
                format!(
                    "Failed item '{item}' in '{}' needs explanatory notes",
                    facts.checklist_code
                ),
            ));
        }
        progress_list.push(progress);
    }

    progress_list
}

fn check_defects(
    snapshot: &SubmissionSnapshot,
    requirements: &SubmissionRequirements,
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<ValidationIssue>,
) {
    if requirements.requires_defects && snapshot.defects.is_empty() {
        errors.push(ValidationIssue::report(
            codes::MISSING_DEFECTS,
            format!(
                "{} requires at least one documented defect",
                snapshot.report.inspection_type.label()
            ),
        ));
    }

    let photographed: HashSet<DbId> = snapshot.photos.iter().filter_map(|p| p.defect_id).collect();

    for defect in &snapshot.defects {
        let n = defect.defect_number;

        if is_blank(defect.description.as_deref()) {
            errors.push(ValidationIssue::entity(
                codes::DEFECT_WITHOUT_DESCRIPTION,
                "defect",
                defect.id,
                format!("Defect #{n} has no description"),
            ));
        }

        if !photographed.contains(&defect.id) {
            errors.push(ValidationIssue::entity(
                codes::DEFECT_WITHOUT_PHOTO,
                "defect",
                defect.id,
                format!("Defect #{n} has no supporting photo"),
            ));
        }

        if severity_requires_recommendation(&defect.severity)
            && is_blank(defect.recommendation.as_deref())
        {
            errors.push(ValidationIssue::entity(
                codes::DEFECT_WITHOUT_RECOMMENDATION,
                "defect",
                defect.id,
                format!(
                    "Defect #{n} is {} and requires a recommendation",
                    defect.severity
                ),
            ));
        }

        if defect.roof_element_id.is_none() {
            warnings.push(ValidationIssue::entity(
                codes::DEFECT_WITHOUT_ELEMENT,
                "defect",
                defect.id,
                format!("Defect #{n} is not linked to a roof element"),
            ));
        }
    }
}

fn check_photos(snapshot: &SubmissionSnapshot, warnings: &mut Vec<ValidationIssue>) {
    let stale_before = snapshot
        .report
        .inspection_date
        .map(|d| d - Duration::days(STALE_CAPTURE_DAYS));

    for photo in &snapshot.photos {
        if !photo.has_gps {
            warnings.push(ValidationIssue::entity(
                codes::PHOTO_WITHOUT_GPS,
                "photo",
                photo.id,
                "Photo has no GPS location",
            ));
        }

        match photo.captured_at {
            None => warnings.push(ValidationIssue::entity(
                codes::PHOTO_WITHOUT_CAPTURE_TIME,
                "photo",
                photo.id,
                "Photo has no capture timestamp",
            )),
            Some(captured) => {
                if captured > photo.uploaded_at + Duration::minutes(CAPTURE_CLOCK_SKEW_MINUTES) {
                    warnings.push(ValidationIssue::entity(
                        codes::PHOTO_CAPTURED_AFTER_UPLOAD,
                        "photo",
                        photo.id,
                        "Photo capture time is later than its upload time",
                    ));
                }
                if stale_before.is_some_and(|cutoff| captured.date_naive() < cutoff) {
                    warnings.push(ValidationIssue::entity(
                        codes::PHOTO_STALE_CAPTURE,
                        "photo",
                        photo.id,
                        format!(
                            "Photo was captured more than {STALE_CAPTURE_DAYS} days before the inspection"
                        ),
                    ));
                }
            }
        }

        if custody_state(photo.client_hash.as_deref(), photo.hash_verified)
            == CustodyState::Mismatch
        {
            warnings.push(ValidationIssue::entity(
                codes::PHOTO_HASH_MISMATCH,
                "photo",
                photo.id,
                "Device hash does not match the uploaded file",
            ));
        }

        if is_blank(photo.caption.as_deref()) {
            warnings.push(ValidationIssue::entity(
                codes::PHOTO_WITHOUT_CAPTION,
                "photo",
                photo.id,
                "Photo has no caption",
            ));
        }
    }
}

fn check_roof_elements(snapshot: &SubmissionSnapshot, warnings: &mut Vec<ValidationIssue>) {
    for element in &snapshot.roof_elements {
        if element.condition_rating.is_none() {
            warnings.push(ValidationIssue::entity(
                codes::ELEMENT_WITHOUT_CONDITION,
                "roof_element",
                element.id,
                format!("Roof element '{}' has no condition rating", element.element_type),
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
