pub mod admin;
pub mod assignment;
pub mod complaint;
pub mod compliance;
pub mod defect;
pub mod health;
pub mod inspection_request;
pub mod photo;
pub mod report;
pub mod roof_element;
pub mod share;
pub mod template;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /me                                              current user + open assignments
///
/// /admin/users                                     list, create (admin only)
/// /admin/users/{id}                                get, update
/// /admin/audit-logs                                query (admin only)
/// /admin/audit-logs/integrity-check                verify hash chain
///
/// /reports                                         list, create
/// /reports/{id}                                    get, update, delete
/// /reports/{id}/validation                         submission readiness
/// /reports/{id}/pdf                                render PDF (POST)
/// /reports/{id}/{submit,approve,...}               lifecycle transitions (POST)
/// /reports/{id}/audit                              audit entries
/// /reports/{id}/revisions                          revision rounds
/// /reports/{id}/roof-elements                      list, create
/// /reports/{id}/defects                            list, create
/// /reports/{id}/photos                             list, upload (multipart)
/// /reports/{id}/compliance                         list assessments
/// /reports/{id}/compliance/{checklist}             upsert (PUT)
/// /reports/{id}/assignments                        list, create (reviewer/admin)
/// /reports/{id}/shares                             list, create
/// /reports/{id}/complaints                         create (POST)
///
/// /roof-elements/{id}                              update, delete
/// /defects/{id}                                    update, delete
/// /photos/{id}                                     update, delete
/// /photos/{id}/custody                             chain of custody
/// /compliance/checklists                           checklist catalogue
/// /assignments/mine                                open assignments
/// /assignments/{id}                                update
/// /templates                                       list, create (admin)
/// /templates/{id}                                  get, update, delete (admin)
/// /shares/{id}/revoke                              revoke (POST)
/// /shared/{token}                                  shared report (public)
/// /complaints                                      list (reviewer/admin)
/// /complaints/{id}                                 get, update
/// /complaints/{id}/{submit-for-review,...}         complaint workflow (POST)
/// /inspection-requests                             create (public), list
/// /inspection-requests/{id}/{convert,decline}      triage (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::users::me))
        // Admin routes (user directory + audit log).
        .nest("/admin", admin::router())
        // Reports and every report-scoped sub-resource.
        .nest("/reports", report::router())
        .nest("/roof-elements", roof_element::router())
        .nest("/defects", defect::router())
        .nest("/photos", photo::router())
        .nest("/compliance", compliance::router())
        .nest("/assignments", assignment::router())
        .nest("/templates", template::router())
        // Sharing: authenticated management and public access.
        .nest("/shares", share::router())
        .nest("/shared", share::public_router())
        .nest("/complaints", complaint::router())
        // Public intake and staff triage.
        .nest("/inspection-requests", inspection_request::router())
}
