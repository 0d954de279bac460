//! Report visibility and edit-permission checks shared by handlers.
//!
//! Reviewers and admins see every report. Inspectors see only reports they
//! created, inspect or are assigned to; anything else answers 404 so report
//! ids cannot be probed.

use roofline_core::error::CoreError;
use roofline_core::report::ReportStatus;
use roofline_core::roles::ROLE_INSPECTOR;
use roofline_core::types::DbId;
use roofline_db::models::report::Report;
use roofline_db::repositories::{ReportRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

fn report_not_found(id: DbId) -> AppError {
    CoreError::not_found("Report", id).into()
}

/// Fetch a report the caller is allowed to see.
pub async fn load_report(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Report> {
    let report = ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| report_not_found(id))?;
    ensure_visible(state, user, &report).await?;
    Ok(report)
}

pub async fn ensure_visible(state: &AppState, user: &AuthUser, report: &Report) -> AppResult<()> {
    if user.is_reviewer_or_admin() {
        return Ok(());
    }
    if ReportRepo::is_visible_to(&state.pool, report.id, user.user_id).await? {
        Ok(())
    } else {
        Err(report_not_found(report.id))
    }
}

/// Parse the stored status column.
pub fn report_status(report: &Report) -> AppResult<ReportStatus> {
    ReportStatus::from_str_value(&report.status).map_err(|_| {
        AppError::InternalError(format!(
            "Report {} has unknown status '{}'",
            report.id, report.status
        ))
    })
}

/// Content (roof elements, defects, photos, compliance) may change only
/// while the report is editable, and only by its inspectors or an admin.
pub fn ensure_can_edit_content(user: &AuthUser, report: &Report) -> AppResult<()> {
    if !(user.is_admin() || user.role == ROLE_INSPECTOR) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only inspectors and admins may edit report content".into(),
        )));
    }
    let status = report_status(report)?;
    if !status.is_editable() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Report {} is '{status}' and cannot be edited",
            report.report_number
        ))));
    }
    Ok(())
}

/// Load a visible report and check its content is editable by the caller.
pub async fn load_editable_report(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<Report> {
    let report = load_report(state, user, id).await?;
    ensure_can_edit_content(user, &report)?;
    Ok(report)
}

/// The inspector named on a report or assignment must be an active inspector account.
pub async fn ensure_active_inspector(state: &AppState, inspector_id: DbId) -> AppResult<()> {
    let user = UserRepo::find_by_id(&state.pool, inspector_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: inspector_id,
        }))?;
    if !user.is_active || user.role != ROLE_INSPECTOR {
        return Err(AppError::Core(CoreError::Validation(format!(
            "User {inspector_id} is not an active inspector"
        ))));
    }
    Ok(())
}
