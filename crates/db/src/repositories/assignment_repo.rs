//! Repository for the `assignments` table.

use roofline_core::types::DbId;
use sqlx::PgPool;

use crate::models::assignment::{Assignment, CreateAssignment, UpdateAssignment};

const COLUMNS: &str =
    "id, report_id, inspector_id, assigned_by, due_date, status, notes, created_at, updated_at";

pub struct AssignmentRepo;

impl AssignmentRepo {
    pub async fn create(
        pool: &PgPool,
        report_id: DbId,
        input: &CreateAssignment,
        assigned_by: DbId,
    ) -> Result<Assignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO assignments (report_id, inspector_id, assigned_by, due_date, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(report_id)
            .bind(input.inspector_id)
            .bind(assigned_by)
            .bind(input.due_date)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assignments WHERE id = $1");
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_report(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<Assignment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM assignments WHERE report_id = $1 ORDER BY created_at");
        sqlx::query_as::<_, Assignment>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    /// Open assignments for an inspector, soonest due first.
    pub async fn list_open_for_inspector(
        pool: &PgPool,
        inspector_id: DbId,
    ) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assignments
             WHERE inspector_id = $1 AND status NOT IN ('completed', 'cancelled')
             ORDER BY due_date ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(inspector_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAssignment,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "UPDATE assignments SET
                status = COALESCE($2, status),
                due_date = COALESCE($3, due_date),
                notes = COALESCE($4, notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .bind(&input.status)
            .bind(input.due_date)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }
}
