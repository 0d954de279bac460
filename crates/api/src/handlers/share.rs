//! Handlers for external report shares.
//!
//! Shares are created by anyone who can see an approved or finalised
//! report. The plaintext token appears once, in the create response; the
//! public `/shared/{token}` endpoint looks shares up by token hash.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use roofline_core::audit::{action_types, entity_types};
use roofline_core::error::CoreError;
use roofline_core::share::{
    ensure_shareable, expires_at, generate_token, hash_token, resolve_expiry_days, share_state,
    validate_recipient_email, ShareState,
};
use roofline_core::types::DbId;
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::share::{CreateShare, NewShare, ReportShare};
use roofline_db::repositories::{ReportRepo, ShareRepo};
use roofline_events::{event_types, PlatformEvent};
use serde::Serialize;
use serde_json::json;

use crate::access::{load_report, report_status};
use crate::audit_trail;
use crate::document::{load_document, ReportDocument};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response of a share creation. `token` is never shown again.
#[derive(Debug, Serialize)]
pub struct CreatedShare {
    pub share: ReportShare,
    pub token: String,
    pub url: String,
}

/// GET /api/v1/reports/{id}/shares
pub async fn list_by_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ReportShare>>>> {
    load_report(&state, &auth, report_id).await?;
    let shares = ShareRepo::list_by_report(&state.pool, report_id).await?;
    Ok(Json(DataResponse { data: shares }))
}

/// POST /api/v1/reports/{id}/shares
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
    Json(input): Json<CreateShare>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedShare>>)> {
    let report = load_report(&state, &auth, report_id).await?;
    ensure_shareable(report_status(&report)?)?;

    let recipient_email = input
        .recipient_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    validate_recipient_email(recipient_email)?;
    let days = resolve_expiry_days(input.expires_in_days, state.config.share_default_expiry_days)?;

    let generated = generate_token();
    let share = ShareRepo::create(
        &state.pool,
        &NewShare {
            report_id,
            token_hash: generated.token_hash,
            recipient_email: recipient_email.map(str::to_string),
            recipient_name: input.recipient_name.clone(),
            expires_at: expires_at(Utc::now(), days),
            created_by: Some(auth.user_id),
        },
    )
    .await?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(auth.user_id), action_types::SHARE_CREATE)
            .entity(entity_types::SHARE, share.id)
            .report(report_id)
            .details(json!({
                "recipient_email": share.recipient_email,
                "expires_at": share.expires_at,
            })),
    )
    .await?;

    let url = state.config.share_link(&generated.token);
    state.event_bus.publish(
        PlatformEvent::new(event_types::SHARE_CREATED)
            .with_source(entity_types::SHARE, share.id)
            .with_actor(auth.user_id)
            .with_payload(json!({
                "report_id": report_id,
                "recipient_email": share.recipient_email,
                "recipient_name": share.recipient_name,
                "link": url,
                "expires_at": share.expires_at.to_rfc3339(),
            })),
    );

    tracing::info!(report_id, share_id = share.id, days, "Report shared");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedShare {
                share,
                token: generated.token,
                url,
            },
        }),
    ))
}

/// POST /api/v1/shares/{id}/revoke
///
/// Allowed for the share's creator and for reviewers and admins.
pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReportShare>>> {
    let share = ShareRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ReportShare",
            id,
        }))?;
    load_report(&state, &auth, share.report_id).await?;
    if !(auth.is_reviewer_or_admin() || share.created_by == Some(auth.user_id)) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the share's creator, reviewers or admins may revoke it".into(),
        )));
    }

    let revoked = ShareRepo::revoke(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ReportShare",
            id,
        }))?;

    if share.revoked_at.is_none() {
        audit_trail::record(
            &state.pool,
            NewAuditEntry::new(Some(auth.user_id), action_types::SHARE_REVOKE)
                .entity(entity_types::SHARE, id)
                .report(share.report_id),
        )
        .await?;
    }

    Ok(Json(DataResponse { data: revoked }))
}

/// GET /api/v1/shared/{token}
///
/// Public. Unknown tokens answer 404; revoked or expired shares, and
/// shares whose report has since left the approved states, answer 403.
pub async fn access_shared(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<ReportDocument>>> {
    let share = ShareRepo::find_by_token_hash(&state.pool, &hash_token(&token))
        .await?
        .ok_or_else(|| AppError::NotFound("Share link not found".into()))?;

    match share_state(share.expires_at, share.revoked_at, Utc::now()) {
        ShareState::Active => {}
        ShareState::Revoked => {
            return Err(AppError::Core(CoreError::Forbidden(
                "This share link has been revoked".into(),
            )))
        }
        ShareState::Expired => {
            return Err(AppError::Core(CoreError::Forbidden(
                "This share link has expired".into(),
            )))
        }
    }

    let report = ReportRepo::find_by_id(&state.pool, share.report_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id: share.report_id,
        }))?;
    if !report_status(&report)?.is_shareable() {
        return Err(AppError::Core(CoreError::Forbidden(
            "This report is no longer available".into(),
        )));
    }

    // The share may have been revoked between the read and this update.
    let accessed = ShareRepo::record_access(&state.pool, share.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "This share link is no longer active".into(),
            ))
        })?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(None, action_types::SHARE_ACCESS)
            .entity(entity_types::SHARE, share.id)
            .report(report.id)
            .details(json!({ "access_count": accessed.access_count })),
    )
    .await?;

    tracing::info!(
        share_id = share.id,
        report_id = report.id,
        access_count = accessed.access_count,
        "Shared report accessed"
    );
    let document = load_document(&state.pool, report).await?;
    Ok(Json(DataResponse { data: document }))
}
