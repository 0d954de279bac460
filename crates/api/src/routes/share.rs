//! Route definitions for report shares.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::share;
use crate::state::AppState;

/// Routes mounted at `/shares`.
///
/// ```text
/// POST   /{id}/revoke    -> revoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/revoke", post(share::revoke))
}

/// Public routes mounted at `/shared`. No authentication.
///
/// ```text
/// GET    /{token}    -> access_shared
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new().route("/{token}", get(share::access_shared))
}
