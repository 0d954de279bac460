//! Route definitions for the `/photos` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::photo;
use crate::state::AppState;

/// Routes mounted at `/photos`.
///
/// ```text
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// GET    /{id}/custody    -> custody
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(photo::update).delete(photo::delete))
        .route("/{id}/custody", get(photo::custody))
}
