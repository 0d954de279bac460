//! Route definitions for the `/defects` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::defect;
use crate::state::AppState;

/// Routes mounted at `/defects`.
///
/// ```text
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(defect::update).delete(defect::delete))
}
