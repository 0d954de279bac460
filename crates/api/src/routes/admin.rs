//! Route definitions for the `/admin` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{audit, users};
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires the admin role.
///
/// ```text
/// GET    /users                          -> list (?role=)
/// POST   /users                          -> create
/// GET    /users/{id}                     -> get_by_id
/// PUT    /users/{id}                     -> update
///
/// GET    /audit-logs                     -> query_audit_logs
/// GET    /audit-logs/integrity-check     -> integrity_check
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/{id}", get(users::get_by_id).put(users::update))
        .route("/audit-logs", get(audit::query_audit_logs))
        .route("/audit-logs/integrity-check", get(audit::integrity_check))
}
