//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use roofline_core::error::CoreError;
use roofline_core::roles::{is_reviewer_or_admin, ROLE_ADMIN};
use roofline_core::types::DbId;
use roofline_db::repositories::UserRepo;

use crate::auth::identity::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The local user behind a valid identity-provider token.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Internal `users.id`.
    pub user_id: DbId,
    /// Role name (`admin`, `reviewer` or `inspector`).
    pub role: String,
    pub display_name: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn is_reviewer_or_admin(&self) -> bool {
        is_reviewer_or_admin(&self.role)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.identity).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let user = UserRepo::find_by_external_id(&state.pool, &claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Forbidden(
                    "No account is registered for this identity".into(),
                ))
            })?;

        if !user.is_active {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is deactivated".into(),
            )));
        }

        if let Err(e) = UserRepo::touch_last_seen(&state.pool, user.id).await {
            tracing::warn!(error = %e, user_id = user.id, "Failed to record last-seen time");
        }

        Ok(AuthUser {
            user_id: user.id,
            role: user.role,
            display_name: user.display_name,
        })
    }
}
