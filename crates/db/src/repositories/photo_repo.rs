//! Repository for the `photos` table.

use roofline_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::photo::{NewPhoto, Photo, UpdatePhoto};

const COLUMNS: &str = "\
    id, report_id, defect_id, roof_element_id, storage_key, url, original_filename, \
    content_type, size_bytes, width, height, sha256_hash, client_hash, hash_verified, \
    captured_at, gps_latitude, gps_longitude, gps_accuracy_m, camera_make, camera_model, \
    caption, sort_order, uploaded_by, created_at, updated_at";

pub struct PhotoRepo;

impl PhotoRepo {
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &NewPhoto,
    ) -> Result<Photo, sqlx::Error> {
        let query = format!(
            "INSERT INTO photos (
                report_id, defect_id, roof_element_id, storage_key, url, original_filename,
                content_type, size_bytes, width, height, sha256_hash, client_hash, hash_verified,
                captured_at, gps_latitude, gps_longitude, gps_accuracy_m, camera_make,
                camera_model, caption, uploaded_by
             ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(input.report_id)
            .bind(input.defect_id)
            .bind(input.roof_element_id)
            .bind(&input.storage_key)
            .bind(&input.url)
            .bind(&input.original_filename)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.sha256_hash)
            .bind(&input.client_hash)
            .bind(input.hash_verified)
            .bind(input.captured_at)
            .bind(input.gps_latitude)
            .bind(input.gps_longitude)
            .bind(input.gps_accuracy_m)
            .bind(&input.camera_make)
            .bind(&input.camera_model)
            .bind(&input.caption)
            .bind(input.uploaded_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM photos WHERE id = $1");
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_report(pool: &PgPool, report_id: DbId) -> Result<Vec<Photo>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM photos WHERE report_id = $1 ORDER BY sort_order, id");
        sqlx::query_as::<_, Photo>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    /// Partially update a photo.
    ///
    /// `defect_id` and `roof_element_id` use `Option<Option<DbId>>` so a
    /// link can be cleared as well as changed.
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        input: &UpdatePhoto,
    ) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!(
            "UPDATE photos SET
                defect_id = CASE WHEN $2 THEN $3 ELSE defect_id END,
                roof_element_id = CASE WHEN $4 THEN $5 ELSE roof_element_id END,
                caption = COALESCE($6, caption),
                sort_order = COALESCE($7, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .bind(input.defect_id.is_some())
            .bind(input.defect_id.flatten())
            .bind(input.roof_element_id.is_some())
            .bind(input.roof_element_id.flatten())
            .bind(&input.caption)
            .bind(input.sort_order)
            .fetch_optional(executor)
            .await
    }

    /// Delete a photo row, returning it so the caller can remove the file.
    pub async fn delete<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!("DELETE FROM photos WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}
