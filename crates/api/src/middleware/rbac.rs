//! Role gates for handlers that are reserved to staff.
//!
//! Ownership checks (an inspector's own reports, a share's creator) live in
//! the handlers; these extractors only look at the role.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use roofline_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn gate(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(&AuthUser) -> bool,
    required: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if allowed(&user) {
        Ok(user)
    } else {
        tracing::debug!(user_id = user.user_id, role = %user.role, required, "Role gate refused");
        Err(AppError::Core(CoreError::Forbidden(format!(
            "{required} role required"
        ))))
    }
}

/// User administration, audit log access, templates, archiving.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, AuthUser::is_admin, "Admin").await.map(Self)
    }
}

/// Review queue, assignments, complaint triage and intake handling.
pub struct RequireReviewer(pub AuthUser);

impl FromRequestParts<AppState> for RequireReviewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, AuthUser::is_reviewer_or_admin, "Reviewer or admin")
            .await
            .map(Self)
    }
}
