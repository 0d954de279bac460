//! Repository for the `report_templates` table.

use roofline_core::types::DbId;
use sqlx::PgPool;

use crate::models::template::{CreateReportTemplate, ReportTemplate, UpdateReportTemplate};

const COLUMNS: &str = "id, name, inspection_type, description, content, is_active, \
                       created_by, created_at, updated_at";

pub struct TemplateRepo;

impl TemplateRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateReportTemplate,
        created_by: DbId,
    ) -> Result<ReportTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO report_templates
                (name, inspection_type, description, content, is_active, created_by)
             VALUES ($1, $2, $3, COALESCE($4, '{{}}'::jsonb), COALESCE($5, TRUE), $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReportTemplate>(&query)
            .bind(&input.name)
            .bind(&input.inspection_type)
            .bind(&input.description)
            .bind(&input.content)
            .bind(input.is_active)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ReportTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM report_templates WHERE id = $1");
        sqlx::query_as::<_, ReportTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List templates, optionally including inactive ones.
    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<ReportTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM report_templates
             WHERE ($1 OR is_active)
             ORDER BY inspection_type, name"
        );
        sqlx::query_as::<_, ReportTemplate>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateReportTemplate,
    ) -> Result<Option<ReportTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE report_templates SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                content = COALESCE($4, content),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReportTemplate>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.content)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM report_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
