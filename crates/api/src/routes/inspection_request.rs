//! Route definitions for the `/inspection-requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::inspection_request;
use crate::state::AppState;

/// Routes mounted at `/inspection-requests`.
///
/// ```text
/// POST   /                 -> create (public)
/// GET    /                 -> list (reviewer/admin)
/// POST   /{id}/convert     -> convert
/// POST   /{id}/decline     -> decline
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(inspection_request::list).post(inspection_request::create),
        )
        .route("/{id}/convert", post(inspection_request::convert))
        .route("/{id}/decline", post(inspection_request::decline))
}
