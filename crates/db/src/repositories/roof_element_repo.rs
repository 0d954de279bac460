//! Repository for the `roof_elements` table.

use roofline_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::roof_element::{CreateRoofElement, RoofElement, UpdateRoofElement};

const COLUMNS: &str = "id, report_id, element_type, material, location, condition_rating, \
                       pitch_degrees, notes, sort_order, created_at, updated_at";

pub struct RoofElementRepo;

impl RoofElementRepo {
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        report_id: DbId,
        input: &CreateRoofElement,
    ) -> Result<RoofElement, sqlx::Error> {
        let query = format!(
            "INSERT INTO roof_elements
                (report_id, element_type, material, location, condition_rating,
                 pitch_degrees, notes, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoofElement>(&query)
            .bind(report_id)
            .bind(&input.element_type)
            .bind(&input.material)
            .bind(&input.location)
            .bind(&input.condition_rating)
            .bind(input.pitch_degrees)
            .bind(&input.notes)
            .bind(input.sort_order)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RoofElement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roof_elements WHERE id = $1");
        sqlx::query_as::<_, RoofElement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_report(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<RoofElement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM roof_elements WHERE report_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, RoofElement>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        input: &UpdateRoofElement,
    ) -> Result<Option<RoofElement>, sqlx::Error> {
        let query = format!(
            "UPDATE roof_elements SET
                element_type = COALESCE($2, element_type),
                material = COALESCE($3, material),
                location = COALESCE($4, location),
                condition_rating = COALESCE($5, condition_rating),
                pitch_degrees = COALESCE($6, pitch_degrees),
                notes = COALESCE($7, notes),
                sort_order = COALESCE($8, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoofElement>(&query)
            .bind(id)
            .bind(&input.element_type)
            .bind(&input.material)
            .bind(&input.location)
            .bind(&input.condition_rating)
            .bind(input.pitch_degrees)
            .bind(&input.notes)
            .bind(input.sort_order)
            .fetch_optional(executor)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roof_elements WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
