//! Route definitions for the `/complaints` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::complaint;
use crate::state::AppState;

/// Routes mounted at `/complaints`. Complaints are created under
/// `/reports/{id}/complaints`.
///
/// ```text
/// GET    /                          -> list (reviewer/admin)
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update (drafts only)
/// POST   /{id}/submit-for-review    -> submit_for_review
/// POST   /{id}/approve              -> approve
/// POST   /{id}/return               -> return_to_draft
/// POST   /{id}/submit               -> submit (to the licensing board)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(complaint::list))
        .route("/{id}", get(complaint::get_by_id).put(complaint::update))
        .route("/{id}/submit-for-review", post(complaint::submit_for_review))
        .route("/{id}/approve", post(complaint::approve))
        .route("/{id}/return", post(complaint::return_to_draft))
        .route("/{id}/submit", post(complaint::submit))
}
