//! Assemble the input for submission validation from the database.

use chrono::NaiveDate;
use roofline_core::compliance::ChecklistItems;
use roofline_core::report::InspectionType;
use roofline_core::submission::{
    ChecklistFacts, DefectFacts, PhotoFacts, ReportFacts, RoofElementFacts, SubmissionSnapshot,
};
use roofline_db::models::report::Report;
use roofline_db::repositories::{ComplianceRepo, DefectRepo, PhotoRepo, RoofElementRepo};
use roofline_db::DbPool;

use crate::error::{AppError, AppResult};

pub async fn load_snapshot(
    pool: &DbPool,
    report: &Report,
    today: NaiveDate,
) -> AppResult<SubmissionSnapshot> {
    let inspection_type = InspectionType::from_str_value(&report.inspection_type)?;

    let photos = PhotoRepo::list_by_report(pool, report.id).await?;
    let defects = DefectRepo::list_by_report(pool, report.id).await?;
    let elements = RoofElementRepo::list_by_report(pool, report.id).await?;
    let assessments = ComplianceRepo::list_by_report(pool, report.id).await?;

    let checklists = assessments
        .into_iter()
        .map(|a| {
            let items: ChecklistItems = serde_json::from_value(a.items).map_err(|e| {
                AppError::InternalError(format!(
                    "Stored checklist '{}' on report {} is malformed: {e}",
                    a.checklist_code, report.id
                ))
            })?;
            Ok(ChecklistFacts {
                checklist_code: a.checklist_code,
                items,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(SubmissionSnapshot {
        report: ReportFacts {
            inspection_type,
            property_address: report.property_address.clone(),
            inspection_date: report.inspection_date,
            inspector_id: report.inspector_id,
            executive_summary: report.executive_summary.clone(),
            conclusions: report.conclusions.clone(),
        },
        photos: photos
            .into_iter()
            .map(|p| PhotoFacts {
                id: p.id,
                defect_id: p.defect_id,
                has_gps: p.gps_latitude.is_some() && p.gps_longitude.is_some(),
                captured_at: p.captured_at,
                uploaded_at: p.created_at,
                client_hash: p.client_hash,
                hash_verified: p.hash_verified,
                caption: p.caption,
            })
            .collect(),
        defects: defects
            .into_iter()
            .map(|d| DefectFacts {
                id: d.id,
                defect_number: d.defect_number,
                severity: d.severity,
                description: d.description,
                recommendation: d.recommendation,
                roof_element_id: d.roof_element_id,
            })
            .collect(),
        roof_elements: elements
            .into_iter()
            .map(|e| RoofElementFacts {
                id: e.id,
                element_type: e.element_type,
                condition_rating: e.condition_rating,
            })
            .collect(),
        checklists,
        today,
    })
}
