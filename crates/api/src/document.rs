//! The full report bundle served to share recipients and sent to the PDF
//! renderer.

use roofline_core::compliance::{checklist_progress, ChecklistItems, ChecklistProgress};
use roofline_core::report::InspectionType;
use roofline_db::models::compliance::ComplianceAssessment;
use roofline_db::models::defect::Defect;
use roofline_db::models::photo::Photo;
use roofline_db::models::report::Report;
use roofline_db::models::roof_element::RoofElement;
use roofline_db::repositories::{
    ComplianceRepo, DefectRepo, PhotoRepo, RoofElementRepo, UserRepo,
};
use roofline_db::DbPool;
use serde::Serialize;

use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct ComplianceSection {
    #[serde(flatten)]
    pub assessment: ComplianceAssessment,
    pub progress: ChecklistProgress,
}

#[derive(Debug, Serialize)]
pub struct ReportDocument {
    pub report: Report,
    pub inspection_type_label: &'static str,
    pub inspector_name: Option<String>,
    pub inspector_lbp_number: Option<String>,
    pub reviewer_name: Option<String>,
    pub roof_elements: Vec<RoofElement>,
    pub defects: Vec<Defect>,
    pub photos: Vec<Photo>,
    pub compliance: Vec<ComplianceSection>,
}

pub async fn load_document(pool: &DbPool, report: Report) -> AppResult<ReportDocument> {
    let roof_elements = RoofElementRepo::list_by_report(pool, report.id).await?;
    let defects = DefectRepo::list_by_report(pool, report.id).await?;
    let photos = PhotoRepo::list_by_report(pool, report.id).await?;
    let compliance = ComplianceRepo::list_by_report(pool, report.id)
        .await?
        .into_iter()
        .map(|assessment| {
            // Rows are validated on write; an unreadable row shows as unanswered.
            let items: ChecklistItems =
                serde_json::from_value(assessment.items.clone()).unwrap_or_default();
            let progress = checklist_progress(&assessment.checklist_code, &items);
            ComplianceSection {
                assessment,
                progress,
            }
        })
        .collect();

    let inspector = match report.inspector_id {
        Some(id) => UserRepo::find_by_id(pool, id).await?,
        None => None,
    };
    let reviewer = match report.reviewer_id {
        Some(id) => UserRepo::find_by_id(pool, id).await?,
        None => None,
    };

    let inspection_type_label = InspectionType::from_str_value(&report.inspection_type)
        .map(|t| t.label())
        .unwrap_or("Inspection");

    Ok(ReportDocument {
        report,
        inspection_type_label,
        inspector_name: inspector.as_ref().map(|u| u.display_name.clone()),
        inspector_lbp_number: inspector.and_then(|u| u.lbp_number),
        reviewer_name: reviewer.map(|u| u.display_name),
        roof_elements,
        defects,
        photos,
        compliance,
    })
}
