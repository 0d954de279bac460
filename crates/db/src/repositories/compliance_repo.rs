//! Repository for the `compliance_assessments` table.

use roofline_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::compliance::ComplianceAssessment;

const COLUMNS: &str =
    "id, report_id, checklist_code, items, assessed_by, created_at, updated_at";

pub struct ComplianceRepo;

impl ComplianceRepo {
    /// Insert or replace the answers for one checklist on a report.
    pub async fn upsert<'e, E: PgExecutor<'e>>(
        executor: E,
        report_id: DbId,
        checklist_code: &str,
        items: &serde_json::Value,
        assessed_by: DbId,
    ) -> Result<ComplianceAssessment, sqlx::Error> {
        let query = format!(
            "INSERT INTO compliance_assessments (report_id, checklist_code, items, assessed_by)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_compliance_assessments_report_checklist
             DO UPDATE SET items = EXCLUDED.items, assessed_by = EXCLUDED.assessed_by
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ComplianceAssessment>(&query)
            .bind(report_id)
            .bind(checklist_code)
            .bind(items)
            .bind(assessed_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        report_id: DbId,
        checklist_code: &str,
    ) -> Result<Option<ComplianceAssessment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM compliance_assessments
             WHERE report_id = $1 AND checklist_code = $2"
        );
        sqlx::query_as::<_, ComplianceAssessment>(&query)
            .bind(report_id)
            .bind(checklist_code)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_report(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<ComplianceAssessment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM compliance_assessments WHERE report_id = $1 ORDER BY checklist_code"
        );
        sqlx::query_as::<_, ComplianceAssessment>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }
}
