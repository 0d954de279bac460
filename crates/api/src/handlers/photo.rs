//! Handlers for report photos: multipart upload with evidentiary metadata,
//! metadata edits, deletion and chain-of-custody.
//!
//! Photos are stored content-addressed under
//! `reports/{report_id}/photos/{sha256}.{ext}`. The server hash is compared
//! with the device hash (if any) to establish custody.

use std::io::Cursor;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use roofline_core::audit::{action_types, entity_types};
use roofline_core::error::CoreError;
use roofline_core::hashing::sha256_hex;
use roofline_core::photo::{
    build_storage_key, custody_state, describe_device, extension_for_content_type,
    validate_caption, validate_capture_time, validate_gps, validate_size, verify_client_hash,
    CustodyEvent, CustodyRecord, CustodyState,
};
use roofline_core::types::{DbId, Timestamp};
use roofline_db::models::audit::NewAuditEntry;
use roofline_db::models::photo::{NewPhoto, Photo, UpdatePhoto};
use roofline_db::repositories::{AuditLogRepo, DefectRepo, PhotoRepo, RoofElementRepo};
use serde_json::json;

use crate::access::{load_editable_report, load_report};
use crate::audit_trail;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fields collected from the upload form.
#[derive(Default)]
struct UploadForm {
    data: Option<Vec<u8>>,
    filename: Option<String>,
    content_type: Option<String>,
    defect_id: Option<DbId>,
    roof_element_id: Option<DbId>,
    caption: Option<String>,
    client_hash: Option<String>,
    captured_at: Option<Timestamp>,
    gps_latitude: Option<f64>,
    gps_longitude: Option<f64>,
    gps_accuracy_m: Option<f64>,
    camera_make: Option<String>,
    camera_model: Option<String>,
}

fn bad_field(name: &str, value: &str) -> AppError {
    AppError::BadRequest(format!("Invalid value '{value}' for field '{name}'"))
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> AppResult<Option<T>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(|_| bad_field(name, value))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

async fn read_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            form.filename = field.file_name().map(str::to_string);
            form.content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;
            form.data = Some(bytes.to_vec());
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read field '{name}': {e}")))?;
        match name.as_str() {
            "defect_id" => form.defect_id = parse_number(&name, &value)?,
            "roof_element_id" => form.roof_element_id = parse_number(&name, &value)?,
            "caption" => form.caption = non_empty(value),
            "client_hash" => form.client_hash = non_empty(value).map(|h| h.to_ascii_lowercase()),
            "captured_at" => {
                form.captured_at = match non_empty(value) {
                    Some(v) => Some(
                        DateTime::parse_from_rfc3339(&v)
                            .map_err(|_| bad_field(&name, &v))?
                            .with_timezone(&Utc),
                    ),
                    None => None,
                }
            }
            "gps_latitude" => form.gps_latitude = parse_number(&name, &value)?,
            "gps_longitude" => form.gps_longitude = parse_number(&name, &value)?,
            "gps_accuracy_m" => form.gps_accuracy_m = parse_number(&name, &value)?,
            "camera_make" => form.camera_make = non_empty(value),
            "camera_model" => form.camera_model = non_empty(value),
            other => tracing::debug!(field = other, "Ignoring unknown upload field"),
        }
    }

    Ok(form)
}

/// Defect and roof-element links must stay within the photo's report.
async fn ensure_links_in_report(
    state: &AppState,
    report_id: DbId,
    defect_id: Option<DbId>,
    roof_element_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(id) = defect_id {
        let defect = DefectRepo::find_by_id(&state.pool, id).await?;
        if defect.map(|d| d.report_id) != Some(report_id) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Defect {id} does not belong to report {report_id}"
            ))));
        }
    }
    if let Some(id) = roof_element_id {
        let element = RoofElementRepo::find_by_id(&state.pool, id).await?;
        if element.map(|e| e.report_id) != Some(report_id) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Roof element {id} does not belong to report {report_id}"
            ))));
        }
    }
    Ok(())
}

async fn find_photo(state: &AppState, id: DbId) -> AppResult<Photo> {
    PhotoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Photo", id }))
}

/// GET /api/v1/reports/{id}/photos
pub async fn list_by_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Photo>>>> {
    load_report(&state, &auth, report_id).await?;
    let photos = PhotoRepo::list_by_report(&state.pool, report_id).await?;
    Ok(Json(DataResponse { data: photos }))
}

/// POST /api/v1/reports/{id}/photos
///
/// Multipart form: `file` plus optional `defect_id`, `roof_element_id`,
/// `caption`, `client_hash`, `captured_at` (RFC 3339), `gps_latitude`,
/// `gps_longitude`, `gps_accuracy_m`, `camera_make`, `camera_model`.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Photo>>)> {
    load_editable_report(&state, &auth, report_id).await?;

    let form = read_form(multipart).await?;
    let data = form
        .data
        .ok_or_else(|| AppError::BadRequest("Missing 'file' field".into()))?;
    let content_type = form
        .content_type
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("The file part has no content type".into()))?;

    let extension = extension_for_content_type(content_type)?;
    validate_size(data.len(), state.config.max_upload_bytes)?;
    validate_gps(form.gps_latitude, form.gps_longitude, form.gps_accuracy_m)?;
    validate_capture_time(form.captured_at, Utc::now())?;
    validate_caption(form.caption.as_deref())?;
    ensure_links_in_report(&state, report_id, form.defect_id, form.roof_element_id).await?;

    let sha256 = sha256_hex(&data);
    let custody = verify_client_hash(form.client_hash.as_deref(), &sha256);
    if custody == CustodyState::Mismatch {
        tracing::warn!(
            report_id,
            server_hash = %sha256,
            client_hash = ?form.client_hash,
            "Photo hash does not match the device hash"
        );
    }

    let existing = PhotoRepo::list_by_report(&state.pool, report_id).await?;
    if let Some(dup) = existing.iter().find(|p| p.sha256_hash == sha256) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "This photo is already attached to the report (photo {})",
            dup.id
        ))));
    }

    let (width, height) = image::ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .ok()
        .and_then(|r| r.into_dimensions().ok())
        .map_or((None, None), |(w, h)| {
            (i32::try_from(w).ok(), i32::try_from(h).ok())
        });

    let size_bytes = data.len() as i64;
    let key = build_storage_key(report_id, &sha256, extension);
    state.store.put(&key, data, content_type).await?;

    let mut tx = state.pool.begin().await?;
    let photo = PhotoRepo::create(
        &mut *tx,
        &NewPhoto {
            report_id,
            defect_id: form.defect_id,
            roof_element_id: form.roof_element_id,
            url: state.store.url(&key),
            storage_key: key,
            original_filename: form.filename,
            content_type: content_type.to_ascii_lowercase(),
            size_bytes,
            width,
            height,
            sha256_hash: sha256,
            client_hash: form.client_hash,
            hash_verified: custody == CustodyState::Verified,
            captured_at: form.captured_at,
            gps_latitude: form.gps_latitude,
            gps_longitude: form.gps_longitude,
            gps_accuracy_m: form.gps_accuracy_m,
            camera_make: form.camera_make,
            camera_model: form.camera_model,
            caption: form.caption,
            uploaded_by: Some(auth.user_id),
        },
    )
    .await?;

    audit_trail::record_in(
        &mut tx,
        NewAuditEntry::new(Some(auth.user_id), action_types::PHOTO_UPLOAD)
            .entity(entity_types::PHOTO, photo.id)
            .report(report_id)
            .details(json!({
                "sha256_hash": photo.sha256_hash,
                "client_hash": photo.client_hash,
                "custody": custody,
                "size_bytes": photo.size_bytes,
                "defect_id": photo.defect_id,
            })),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        report_id,
        photo_id = photo.id,
        bytes = photo.size_bytes,
        custody = ?custody,
        "Photo uploaded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: photo })))
}

/// PUT /api/v1/photos/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePhoto>,
) -> AppResult<Json<DataResponse<Photo>>> {
    let before = find_photo(&state, id).await?;
    load_editable_report(&state, &auth, before.report_id).await?;

    validate_caption(input.caption.as_deref())?;
    ensure_links_in_report(
        &state,
        before.report_id,
        input.defect_id.flatten(),
        input.roof_element_id.flatten(),
    )
    .await?;

    let mut tx = state.pool.begin().await?;
    let after = PhotoRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Photo", id }))?;

    if let Some(details) = audit_trail::change_details(&before, &after)? {
        audit_trail::record_in(
            &mut tx,
            NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_UPDATE)
                .entity(entity_types::PHOTO, id)
                .report(after.report_id)
                .details(details),
        )
        .await?;
    }
    tx.commit().await?;

    Ok(Json(DataResponse { data: after }))
}

/// DELETE /api/v1/photos/{id}
///
/// The stored object is removed only after the row and its audit entry
/// commit; a failure there is logged and leaves an orphan.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let photo = find_photo(&state, id).await?;
    load_editable_report(&state, &auth, photo.report_id).await?;

    let mut tx = state.pool.begin().await?;
    let deleted = PhotoRepo::delete(&mut *tx, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Photo", id }))?;

    audit_trail::record_in(
        &mut tx,
        NewAuditEntry::new(Some(auth.user_id), action_types::ENTITY_DELETE)
            .entity(entity_types::PHOTO, id)
            .report(deleted.report_id)
            .details(json!({
                "sha256_hash": deleted.sha256_hash,
                "storage_key": deleted.storage_key,
            })),
    )
    .await?;
    tx.commit().await?;

    if let Err(e) = state.store.delete(&deleted.storage_key).await {
        tracing::warn!(
            error = %e,
            photo_id = id,
            key = %deleted.storage_key,
            "Failed to delete stored photo object"
        );
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/photos/{id}/custody
pub async fn custody(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CustodyRecord>>> {
    let photo = find_photo(&state, id).await?;
    load_report(&state, &auth, photo.report_id).await?;

    let events = AuditLogRepo::list_by_entity(&state.pool, entity_types::PHOTO, id)
        .await?
        .into_iter()
        .map(|e| CustodyEvent {
            action: e.action_type,
            user_id: e.user_id,
            at: e.timestamp,
        })
        .collect();

    let record = CustodyRecord {
        photo_id: photo.id,
        report_id: photo.report_id,
        state: custody_state(photo.client_hash.as_deref(), photo.hash_verified),
        device: describe_device(photo.camera_make.as_deref(), photo.camera_model.as_deref()),
        sha256_hash: photo.sha256_hash,
        client_hash: photo.client_hash,
        uploaded_by: photo.uploaded_by,
        uploaded_at: photo.created_at,
        captured_at: photo.captured_at,
        gps_latitude: photo.gps_latitude,
        gps_longitude: photo.gps_longitude,
        events,
    };
    Ok(Json(DataResponse { data: record }))
}
