//! Route definitions for the `/roof-elements` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::roof_element;
use crate::state::AppState;

/// Routes mounted at `/roof-elements`. Listing and creation live under
/// `/reports/{id}/roof-elements`.
///
/// ```text
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        put(roof_element::update).delete(roof_element::delete),
    )
}
