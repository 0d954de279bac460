//! Route definitions for the `/compliance` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::compliance;
use crate::state::AppState;

/// Routes mounted at `/compliance`.
///
/// ```text
/// GET    /checklists    -> list_checklists
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/checklists", get(compliance::list_checklists))
}
