//! Handlers for the current user and the admin user directory.
//!
//! Accounts are created by admins and bound to an identity-provider subject
//! (`external_id`). Roles are addressed by name.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use roofline_core::audit::{action_types, entity_types};
use roofline_core::complaint::validate_lbp_number;
use roofline_core::error::CoreError;
use roofline_core::roles::validate_role;
use roofline_core::types::DbId;
use roofline_db::models::assignment::Assignment;
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::user::{CreateUser, UpdateUser, User};
use roofline_db::repositories::{AssignmentRepo, RoleRepo, UserRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::audit_trail;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::RoleFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub external_id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub lbp_number: Option<String>,
    pub phone: Option<String>,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub lbp_number: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub open_assignments: Vec<Assignment>,
}

fn user_not_found(id: DbId) -> AppError {
    CoreError::not_found("User", id).into()
}

async fn resolve_role_id(state: &AppState, role: &str) -> AppResult<DbId> {
    validate_role(role)?;
    let role = RoleRepo::find_by_name(&state.pool, role)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{role}' is not seeded")))?;
    Ok(role.id)
}

fn validate_contact(email: Option<&str>, lbp_number: Option<&str>) -> AppResult<()> {
    if let Some(email) = email {
        if !email.contains('@') || email.trim().len() < 3 {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid email address '{email}'"
            ))));
        }
    }
    if let Some(lbp) = lbp_number.filter(|n| !n.trim().is_empty()) {
        validate_lbp_number(lbp)?;
    }
    Ok(())
}

/// GET /api/v1/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<MeResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| user_not_found(auth.user_id))?;
    let open_assignments =
        AssignmentRepo::list_open_for_inspector(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: MeResponse {
            user,
            open_assignments,
        },
    }))
}

/// GET /api/v1/admin/users
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RoleFilterParams>,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    let users = UserRepo::list(&state.pool, params.role.as_deref()).await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(DataResponse { data: user }))
}

/// POST /api/v1/admin/users
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    if input.external_id.trim().is_empty() || input.display_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "external_id and display_name are required".into(),
        )));
    }
    validate_contact(Some(&input.email), input.lbp_number.as_deref())?;
    let role_id = resolve_role_id(&state, &input.role).await?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            external_id: input.external_id.trim().to_string(),
            email: input.email.trim().to_string(),
            display_name: input.display_name.trim().to_string(),
            role_id,
            lbp_number: input.lbp_number,
            phone: input.phone,
        },
    )
    .await?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(admin.user_id), action_types::USER_CREATE)
            .entity(entity_types::USER, user.id)
            .details(json!({ "email": user.email, "role": user.role })),
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, admin_id = admin.user_id, "User created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<User>>> {
    let before = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    if id == admin.user_id && input.is_active == Some(false) {
        return Err(AppError::Core(CoreError::Conflict(
            "Admins cannot deactivate their own account".into(),
        )));
    }
    validate_contact(input.email.as_deref(), input.lbp_number.as_deref())?;
    let role_id = match input.role.as_deref() {
        Some(role) => Some(resolve_role_id(&state, role).await?),
        None => None,
    };

    let after = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            email: input.email,
            display_name: input.display_name,
            role_id,
            lbp_number: input.lbp_number,
            phone: input.phone,
            is_active: input.is_active,
        },
    )
    .await?
    .ok_or_else(|| user_not_found(id))?;

    if let Some(details) = audit_trail::change_details(&before, &after)? {
        audit_trail::record(
            &state.pool,
            NewAuditEntry::new(Some(admin.user_id), action_types::USER_UPDATE)
                .entity(entity_types::USER, id)
                .details(details),
        )
        .await?;
    }

    Ok(Json(DataResponse { data: after }))
}
