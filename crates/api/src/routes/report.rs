//! Route definitions for the `/reports` resource.
//!
//! Also nests every report-scoped sub-resource under `/reports/{id}/...`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{
    assignment, audit, complaint, compliance, defect, photo, report, roof_element, share,
    workflow,
};
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
/// GET    /{id}/validation                   -> validation
/// POST   /{id}/pdf                          -> generate_pdf
///
/// POST   /{id}/submit                       -> workflow::submit
/// POST   /{id}/approve                      -> workflow::approve
/// POST   /{id}/request-revision             -> workflow::request_revision
/// POST   /{id}/reopen                       -> workflow::reopen
/// POST   /{id}/finalise                     -> workflow::finalise
/// POST   /{id}/archive                      -> workflow::archive
///
/// GET    /{id}/audit                        -> audit::report_audit
/// GET    /{id}/revisions                    -> audit::report_revisions
///
/// GET    /{id}/roof-elements                -> roof_element::list_by_report
/// POST   /{id}/roof-elements                -> roof_element::create
/// GET    /{id}/defects                      -> defect::list_by_report
/// POST   /{id}/defects                      -> defect::create
/// GET    /{id}/photos                       -> photo::list_by_report
/// POST   /{id}/photos                       -> photo::upload (multipart)
/// GET    /{id}/compliance                   -> compliance::list_by_report
/// PUT    /{id}/compliance/{checklist}       -> compliance::upsert
/// GET    /{id}/assignments                  -> assignment::list_by_report
/// POST   /{id}/assignments                  -> assignment::create
/// GET    /{id}/shares                       -> share::list_by_report
/// POST   /{id}/shares                       -> share::create
/// POST   /{id}/complaints                   -> complaint::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(report::list).post(report::create))
        .route(
            "/{id}",
            get(report::get_by_id)
                .put(report::update)
                .delete(report::delete),
        )
        .route("/{id}/validation", get(report::validation))
        .route("/{id}/pdf", post(report::generate_pdf))
        // Lifecycle transitions.
        .route("/{id}/submit", post(workflow::submit))
        .route("/{id}/approve", post(workflow::approve))
        .route("/{id}/request-revision", post(workflow::request_revision))
        .route("/{id}/reopen", post(workflow::reopen))
        .route("/{id}/finalise", post(workflow::finalise))
        .route("/{id}/archive", post(workflow::archive))
        // Audit trail.
        .route("/{id}/audit", get(audit::report_audit))
        .route("/{id}/revisions", get(audit::report_revisions))
        // Inspection content.
        .route(
            "/{id}/roof-elements",
            get(roof_element::list_by_report).post(roof_element::create),
        )
        .route(
            "/{id}/defects",
            get(defect::list_by_report).post(defect::create),
        )
        .route("/{id}/photos", get(photo::list_by_report).post(photo::upload))
        .route("/{id}/compliance", get(compliance::list_by_report))
        .route("/{id}/compliance/{checklist}", put(compliance::upsert))
        // Assignment, sharing and complaints.
        .route(
            "/{id}/assignments",
            get(assignment::list_by_report).post(assignment::create),
        )
        .route(
            "/{id}/shares",
            get(share::list_by_report).post(share::create),
        )
        .route("/{id}/complaints", post(complaint::create))
}
