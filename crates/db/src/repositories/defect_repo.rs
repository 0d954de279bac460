//! Repository for the `defects` table.

use roofline_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::defect::{CreateDefect, Defect, UpdateDefect};

const COLUMNS: &str = "id, report_id, roof_element_id, defect_number, title, description, \
                       location, severity, category, recommendation, created_at, updated_at";

pub struct DefectRepo;

impl DefectRepo {
    /// Insert a defect with the next per-report `defect_number`.
    ///
    /// Concurrent inserts on the same report may race for a number; the
    /// loser fails on `uq_defects_report_number` and surfaces as a conflict.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        report_id: DbId,
        input: &CreateDefect,
    ) -> Result<Defect, sqlx::Error> {
        let query = format!(
            "INSERT INTO defects
                (report_id, roof_element_id, defect_number, title, description,
                 location, severity, category, recommendation)
             VALUES (
                $1, $2,
                (SELECT COALESCE(MAX(defect_number), 0) + 1 FROM defects WHERE report_id = $1),
                $3, $4, $5, $6, $7, $8
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Defect>(&query)
            .bind(report_id)
            .bind(input.roof_element_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(&input.severity)
            .bind(&input.category)
            .bind(&input.recommendation)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Defect>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM defects WHERE id = $1");
        sqlx::query_as::<_, Defect>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_report(pool: &PgPool, report_id: DbId) -> Result<Vec<Defect>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM defects WHERE report_id = $1 ORDER BY defect_number");
        sqlx::query_as::<_, Defect>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        input: &UpdateDefect,
    ) -> Result<Option<Defect>, sqlx::Error> {
        let query = format!(
            "UPDATE defects SET
                roof_element_id = COALESCE($2, roof_element_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                severity = COALESCE($6, severity),
                category = COALESCE($7, category),
                recommendation = COALESCE($8, recommendation)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Defect>(&query)
            .bind(id)
            .bind(input.roof_element_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(&input.severity)
            .bind(&input.category)
            .bind(&input.recommendation)
            .fetch_optional(executor)
            .await
    }

    /// Returns `true` if a row was deleted. Linked photos keep their files
    /// and lose the link.
    pub async fn delete<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM defects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
