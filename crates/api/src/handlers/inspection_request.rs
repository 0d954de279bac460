//! Handlers for public inspection requests and their staff triage.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use roofline_core::audit::{action_types, entity_types};
use roofline_core::error::CoreError;
use roofline_core::inspection_request::{
    validate_request, InspectionRequestInput, VALID_REQUEST_STATUSES,
};
use roofline_core::types::{CalendarDate, DbId};
use roofline_db::models::assignment::{Assignment, CreateAssignment};
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::inspection_request::{InspectionRequest, InspectionRequestFilter};
use roofline_db::models::report::{CreateReport, Report};
use roofline_db::repositories::{AssignmentRepo, InspectionRequestRepo, ReportRepo};
use roofline_events::{event_types, PlatformEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::access::ensure_active_inspector;
use crate::audit_trail;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireReviewer;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

/// Body of `POST /inspection-requests/{id}/convert`.
#[derive(Debug, Default, Deserialize)]
pub struct ConvertRequest {
    /// Assign the new report to this inspector straight away.
    pub inspector_id: Option<DbId>,
    pub due_date: Option<CalendarDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeclineRequest {
    pub reason: Option<String>,
}

/// Result of converting a request into a draft report.
#[derive(Debug, Serialize)]
pub struct Conversion {
    pub request: InspectionRequest,
    pub report: Report,
    pub assignment: Option<Assignment>,
}

fn request_not_found(id: DbId) -> AppError {
    CoreError::not_found("InspectionRequest", id).into()
}

fn already_handled(id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Inspection request {id} has already been handled"
    )))
}

/// Draft report fields carried over from a request.
fn report_from_request(request: &InspectionRequest, inspector_id: Option<DbId>) -> CreateReport {
    CreateReport {
        inspection_type: request.inspection_type.clone(),
        property_address: Some(request.property_address.clone()),
        property_suburb: request.property_suburb.clone(),
        property_city: request.property_city.clone(),
        property_postcode: request.property_postcode.clone(),
        client_name: Some(request.contact_name.clone()),
        client_email: Some(request.contact_email.clone()),
        client_phone: request.contact_phone.clone(),
        inspection_date: request.preferred_date,
        inspector_id,
        ..Default::default()
    }
}

/// POST /api/v1/inspection-requests
///
/// Public intake. Staff are notified by email.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<InspectionRequestInput>,
) -> AppResult<(StatusCode, Json<DataResponse<InspectionRequest>>)> {
    validate_request(&input, Utc::now().date_naive())?;

    let request = InspectionRequestRepo::create(&state.pool, &input).await?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(None, action_types::INSPECTION_REQUEST_CREATE)
            .entity(entity_types::INSPECTION_REQUEST, request.id)
            .details(json!({
                "inspection_type": request.inspection_type,
                "property_address": request.property_address,
            })),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::INSPECTION_REQUESTED)
            .with_source(entity_types::INSPECTION_REQUEST, request.id),
    );

    tracing::info!(
        request_id = request.id,
        inspection_type = %request.inspection_type,
        "Inspection requested"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/inspection-requests
pub async fn list(
    RequireReviewer(_reviewer): RequireReviewer,
    State(state): State<AppState>,
    Query(filter): Query<InspectionRequestFilter>,
) -> AppResult<Json<DataResponse<Page<InspectionRequest>>>> {
    if let Some(status) = filter.status.as_deref() {
        if !VALID_REQUEST_STATUSES.contains(&status) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid request status '{status}'. Must be one of: {}",
                VALID_REQUEST_STATUSES.join(", ")
            ))));
        }
    }
    let items = InspectionRequestRepo::list(&state.pool, &filter).await?;
    let total = InspectionRequestRepo::count(&state.pool, &filter).await?;
    Ok(Json(DataResponse {
        data: Page { items, total },
    }))
}

/// POST /api/v1/inspection-requests/{id}/convert
///
/// Creates a draft report from the request and optionally assigns an
/// inspector. A request converts at most once.
pub async fn convert(
    RequireReviewer(reviewer): RequireReviewer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ConvertRequest>>,
) -> AppResult<(StatusCode, Json<DataResponse<Conversion>>)> {
    let input = body.map(|Json(b)| b).unwrap_or_default();

    let request = InspectionRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| request_not_found(id))?;
    if !request.is_new() {
        return Err(already_handled(id));
    }
    if let Some(inspector_id) = input.inspector_id {
        ensure_active_inspector(&state, inspector_id).await?;
    }

    let report = ReportRepo::create(
        &state.pool,
        &report_from_request(&request, input.inspector_id),
        reviewer.user_id,
    )
    .await?;

    // Another reviewer may have converted or declined the request meanwhile.
    let Some(converted) =
        InspectionRequestRepo::mark_converted(&state.pool, id, report.id, reviewer.user_id).await?
    else {
        ReportRepo::delete_draft(&state.pool, report.id).await?;
        return Err(already_handled(id));
    };

    let assignment = match input.inspector_id {
        Some(inspector_id) => {
            let assignment = AssignmentRepo::create(
                &state.pool,
                report.id,
                &CreateAssignment {
                    inspector_id,
                    due_date: input.due_date,
                    notes: None,
                },
                reviewer.user_id,
            )
            .await?;
            state.event_bus.publish(
                PlatformEvent::new(event_types::ASSIGNMENT_CREATED)
                    .with_source(entity_types::ASSIGNMENT, assignment.id)
                    .with_actor(reviewer.user_id)
                    .with_payload(json!({
                        "report_id": report.id,
                        "inspector_id": inspector_id,
                        "due_date": assignment.due_date,
                    })),
            );
            Some(assignment)
        }
        None => None,
    };

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(reviewer.user_id), action_types::INSPECTION_REQUEST_CONVERT)
            .entity(entity_types::INSPECTION_REQUEST, id)
            .report(report.id)
            .details(json!({
                "report_number": report.report_number,
                "assignment_id": assignment.as_ref().map(|a| a.id),
            })),
    )
    .await?;

    tracing::info!(
        request_id = id,
        report_id = report.id,
        report_number = %report.report_number,
        "Inspection request converted"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: Conversion {
                request: converted,
                report,
                assignment,
            },
        }),
    ))
}

/// POST /api/v1/inspection-requests/{id}/decline
pub async fn decline(
    RequireReviewer(reviewer): RequireReviewer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<DeclineRequest>>,
) -> AppResult<Json<DataResponse<InspectionRequest>>> {
    let reason = body
        .and_then(|Json(b)| b.reason)
        .filter(|r| !r.trim().is_empty());

    let request = InspectionRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| request_not_found(id))?;
    if !request.is_new() {
        return Err(already_handled(id));
    }

    let declined =
        InspectionRequestRepo::decline(&state.pool, id, reviewer.user_id, reason.as_deref())
            .await?
            .ok_or_else(|| already_handled(id))?;

    audit_trail::record(
        &state.pool,
        NewAuditEntry::new(Some(reviewer.user_id), action_types::INSPECTION_REQUEST_DECLINE)
            .entity(entity_types::INSPECTION_REQUEST, id)
            .details(json!({ "reason": reason })),
    )
    .await?;

    Ok(Json(DataResponse { data: declined }))
}
