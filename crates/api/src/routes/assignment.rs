//! Route definitions for the `/assignments` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::assignment;
use crate::state::AppState;

/// Routes mounted at `/assignments`.
///
/// ```text
/// GET    /mine    -> list_mine
/// PUT    /{id}    -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(assignment::list_mine))
        .route("/{id}", put(assignment::update))
}
