//! Repository for the `lbp_complaints` table.

use roofline_core::complaint::{ComplaintStatus, COMPLAINT_DRAFT};
use roofline_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use roofline_core::types::DbId;
use sqlx::PgPool;

use crate::models::complaint::{ComplaintDraft, ComplaintFilter, LbpComplaint};

const COLUMNS: &str = "\
    id, report_id, status, complainant_name, complainant_email, complainant_phone, \
    practitioner_name, practitioner_lbp_number, site_address, grounds, desired_outcome, \
    reviewer_id, reviewer_comment, reviewed_at, submitted_at, submission_reference, \
    created_by, created_at, updated_at";

pub struct ComplaintRepo;

impl ComplaintRepo {
    pub async fn create(
        pool: &PgPool,
        report_id: DbId,
        input: &ComplaintDraft,
        created_by: DbId,
    ) -> Result<LbpComplaint, sqlx::Error> {
        let query = format!(
            "INSERT INTO lbp_complaints (
                report_id, complainant_name, complainant_email, complainant_phone,
                practitioner_name, practitioner_lbp_number, site_address, grounds,
                desired_outcome, created_by
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LbpComplaint>(&query)
            .bind(report_id)
            .bind(&input.complainant_name)
            .bind(&input.complainant_email)
            .bind(&input.complainant_phone)
            .bind(&input.practitioner_name)
            .bind(&input.practitioner_lbp_number)
            .bind(&input.site_address)
            .bind(&input.grounds)
            .bind(&input.desired_outcome)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LbpComplaint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lbp_complaints WHERE id = $1");
        sqlx::query_as::<_, LbpComplaint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        filter: &ComplaintFilter,
    ) -> Result<Vec<LbpComplaint>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(filter.offset);
        let query = format!(
            "SELECT {COLUMNS} FROM lbp_complaints
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR report_id = $2)
             ORDER BY updated_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, LbpComplaint>(&query)
            .bind(&filter.status)
            .bind(filter.report_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial edit. Only draft complaints are changed; returns
    /// `None` otherwise.
    pub async fn update_draft(
        pool: &PgPool,
        id: DbId,
        input: &ComplaintDraft,
    ) -> Result<Option<LbpComplaint>, sqlx::Error> {
        let query = format!(
            "UPDATE lbp_complaints SET
                complainant_name = COALESCE($2, complainant_name),
                complainant_email = COALESCE($3, complainant_email),
                complainant_phone = COALESCE($4, complainant_phone),
                practitioner_name = COALESCE($5, practitioner_name),
                practitioner_lbp_number = COALESCE($6, practitioner_lbp_number),
                site_address = COALESCE($7, site_address),
                grounds = COALESCE($8, grounds),
                desired_outcome = COALESCE($9, desired_outcome)
             WHERE id = $1 AND status = '{COMPLAINT_DRAFT}'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LbpComplaint>(&query)
            .bind(id)
            .bind(&input.complainant_name)
            .bind(&input.complainant_email)
            .bind(&input.complainant_phone)
            .bind(&input.practitioner_name)
            .bind(&input.practitioner_lbp_number)
            .bind(&input.site_address)
            .bind(&input.grounds)
            .bind(&input.desired_outcome)
            .fetch_optional(pool)
            .await
    }

    /// Move a complaint from `expected` to `to`, guarded on the current
    /// status. Reviewer decisions record the reviewer and comment.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        expected: ComplaintStatus,
        to: ComplaintStatus,
        reviewer_id: Option<DbId>,
        comment: Option<&str>,
    ) -> Result<Option<LbpComplaint>, sqlx::Error> {
        let query = format!(
            "UPDATE lbp_complaints SET
                status = $3,
                reviewer_id = COALESCE($4, reviewer_id),
                reviewer_comment = CASE WHEN $4::BIGINT IS NULL THEN reviewer_comment ELSE $5 END,
                reviewed_at = CASE WHEN $4::BIGINT IS NULL THEN reviewed_at ELSE NOW() END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LbpComplaint>(&query)
            .bind(id)
            .bind(expected.as_str())
            .bind(to.as_str())
            .bind(reviewer_id)
            .bind(comment)
            .fetch_optional(pool)
            .await
    }

    /// Mark an approved complaint as sent to the board.
    pub async fn mark_submitted(
        pool: &PgPool,
        id: DbId,
        reference: &str,
    ) -> Result<Option<LbpComplaint>, sqlx::Error> {
        let query = format!(
            "UPDATE lbp_complaints SET
                status = 'submitted', submitted_at = NOW(), submission_reference = $2
             WHERE id = $1 AND status = 'approved'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LbpComplaint>(&query)
            .bind(id)
            .bind(reference)
            .fetch_optional(pool)
            .await
    }
}
