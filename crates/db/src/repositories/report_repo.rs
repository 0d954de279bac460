//! Repository for the `reports` table.

use chrono::{Datelike, Utc};
use roofline_core::report::{format_report_number, ReportStatus};
use roofline_core::search::{
    clamp_limit, clamp_offset, ilike_pattern, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};
use roofline_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::report::{CreateReport, Report, ReportFilter, UpdateReport};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const COLUMNS: &str = "\
    id, report_number, inspection_type, status, \
    property_address, property_suburb, property_city, property_postcode, \
    client_name, client_email, client_phone, inspection_date, weather_conditions, \
    roof_age_years, executive_summary, conclusions, recommendations, reviewer_notes, \
    inspector_id, reviewer_id, template_id, pdf_url, pdf_generated_at, revision_round, \
    submitted_at, approved_at, finalised_at, archived_at, created_by, created_at, updated_at";

/// Visibility predicate for inspectors: creator, assigned inspector, or any
/// assignment on the report. `{p}` is the bind placeholder for the user id.
fn visibility_clause(p: &str) -> String {
    format!(
        "(created_by = {p} OR inspector_id = {p} OR EXISTS (
            SELECT 1 FROM assignments a WHERE a.report_id = reports.id AND a.inspector_id = {p}
        ))"
    )
}

// ---------------------------------------------------------------------------
// ReportRepo
// ---------------------------------------------------------------------------

pub struct ReportRepo;

impl ReportRepo {
    /// Insert a draft report with the next `RR-YYYY-NNNNNN` number.
    pub async fn create(
        pool: &PgPool,
        input: &CreateReport,
        created_by: DbId,
    ) -> Result<Report, sqlx::Error> {
        let seq: i64 = sqlx::query_scalar("SELECT nextval('report_number_seq')")
            .fetch_one(pool)
            .await?;
        let report_number = format_report_number(Utc::now().year(), seq);

        let query = format!(
            "INSERT INTO reports (
                report_number, inspection_type, property_address, property_suburb,
                property_city, property_postcode, client_name, client_email, client_phone,
                inspection_date, weather_conditions, roof_age_years, executive_summary,
                inspector_id, template_id, created_by
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(&report_number)
            .bind(&input.inspection_type)
            .bind(&input.property_address)
            .bind(&input.property_suburb)
            .bind(&input.property_city)
            .bind(&input.property_postcode)
            .bind(&input.client_name)
            .bind(&input.client_email)
            .bind(&input.client_phone)
            .bind(input.inspection_date)
            .bind(&input.weather_conditions)
            .bind(input.roof_age_years)
            .bind(&input.executive_summary)
            .bind(input.inspector_id)
            .bind(input.template_id)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `user_id` created, inspects, or is assigned to the report.
    pub async fn is_visible_to(
        pool: &PgPool,
        report_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM reports WHERE id = $1 AND {})",
            visibility_clause("$2")
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(report_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// List reports matching the filter, most recently updated first.
    pub async fn list(pool: &PgPool, filter: &ReportFilter) -> Result<Vec<Report>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(filter.offset);
        let (where_clause, binds, next) = build_report_filter(filter);

        let query = format!(
            "SELECT {COLUMNS} FROM reports {where_clause}
             ORDER BY updated_at DESC, id DESC
             LIMIT ${next} OFFSET ${}",
            next + 1
        );
        let mut q = sqlx::query_as::<_, Report>(&query);
        for b in &binds {
            q = match b {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
            };
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count reports matching the filter (for pagination metadata).
    pub async fn count(pool: &PgPool, filter: &ReportFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, binds, _) = build_report_filter(filter);
        let query = format!("SELECT COUNT(*)::BIGINT FROM reports {where_clause}");
        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for b in &binds {
            q = match b {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
            };
        }
        q.fetch_one(pool).await
    }

    /// Update a report. Only non-`None` fields in `input` are applied.
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        input: &UpdateReport,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET
                inspection_type = COALESCE($2, inspection_type),
                property_address = COALESCE($3, property_address),
                property_suburb = COALESCE($4, property_suburb),
                property_city = COALESCE($5, property_city),
                property_postcode = COALESCE($6, property_postcode),
                client_name = COALESCE($7, client_name),
                client_email = COALESCE($8, client_email),
                client_phone = COALESCE($9, client_phone),
                inspection_date = COALESCE($10, inspection_date),
                weather_conditions = COALESCE($11, weather_conditions),
                roof_age_years = COALESCE($12, roof_age_years),
                executive_summary = COALESCE($13, executive_summary),
                conclusions = COALESCE($14, conclusions),
                recommendations = COALESCE($15, recommendations),
                reviewer_notes = COALESCE($16, reviewer_notes),
                inspector_id = COALESCE($17, inspector_id),
                reviewer_id = COALESCE($18, reviewer_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(&input.inspection_type)
            .bind(&input.property_address)
            .bind(&input.property_suburb)
            .bind(&input.property_city)
            .bind(&input.property_postcode)
            .bind(&input.client_name)
            .bind(&input.client_email)
            .bind(&input.client_phone)
            .bind(input.inspection_date)
            .bind(&input.weather_conditions)
            .bind(input.roof_age_years)
            .bind(&input.executive_summary)
            .bind(&input.conclusions)
            .bind(&input.recommendations)
            .bind(&input.reviewer_notes)
            .bind(input.inspector_id)
            .bind(input.reviewer_id)
            .fetch_optional(executor)
            .await
    }

    /// Move a report from `expected` to `to`, stamping the matching
    /// lifecycle timestamp.
    ///
    /// Returns `None` when the report does not exist or is no longer in
    /// `expected` (another request transitioned it first).
    pub async fn transition_status<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        expected: ReportStatus,
        to: ReportStatus,
        reviewer_id: Option<DbId>,
    ) -> Result<Option<Report>, sqlx::Error> {
        let lifecycle = match to {
            ReportStatus::PendingReview => {
                "submitted_at = NOW(), revision_round = revision_round + 1"
            }
            ReportStatus::Approved => "approved_at = NOW()",
            ReportStatus::RevisionRequired => "approved_at = NULL",
            ReportStatus::Finalised => "finalised_at = NOW()",
            ReportStatus::Archived => "archived_at = NOW()",
            ReportStatus::Draft => "submitted_at = NULL",
        };
        let query = format!(
            "UPDATE reports SET
                status = $3,
                reviewer_id = CASE WHEN $3 IN ('approved', 'revision_required')
                    THEN COALESCE($4, reviewer_id) ELSE reviewer_id END,
                {lifecycle}
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(expected.as_str())
            .bind(to.as_str())
            .bind(reviewer_id)
            .fetch_optional(executor)
            .await
    }

    /// Record the URL of the latest generated PDF.
    pub async fn set_pdf(
        pool: &PgPool,
        id: DbId,
        pdf_url: &str,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET pdf_url = $2, pdf_generated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(pdf_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a report while it is still a draft. Returns `true` if deleted.
    pub async fn delete_draft(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1 AND status = 'draft'")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

enum BindValue {
    BigInt(i64),
    Text(String),
}

/// Build a WHERE clause and bind values from `ReportFilter`.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
fn build_report_filter(filter: &ReportFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut binds: Vec<BindValue> = Vec::new();

    if let Some(ref status) = filter.status {
        conditions.push(format!("status = ${bind_idx}"));
        bind_idx += 1;
        binds.push(BindValue::Text(status.clone()));
    }

    if let Some(ref inspection_type) = filter.inspection_type {
        conditions.push(format!("inspection_type = ${bind_idx}"));
        bind_idx += 1;
        binds.push(BindValue::Text(inspection_type.clone()));
    }

    if let Some(inspector_id) = filter.inspector_id {
        conditions.push(format!("inspector_id = ${bind_idx}"));
        bind_idx += 1;
        binds.push(BindValue::BigInt(inspector_id));
    }

    if let Some(pattern) = filter.search.as_deref().and_then(ilike_pattern) {
        conditions.push(format!(
            "(report_number ILIKE ${bind_idx} OR property_address ILIKE ${bind_idx} \
              OR client_name ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
        binds.push(BindValue::Text(pattern));
    }

    if let Some(user_id) = filter.visible_to {
        conditions.push(visibility_clause(&format!("${bind_idx}")));
        bind_idx += 1;
        binds.push(BindValue::BigInt(user_id));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, binds, bind_idx)
}
