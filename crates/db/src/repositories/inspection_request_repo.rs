//! Repository for the `inspection_requests` table.

use roofline_core::inspection_request::InspectionRequestInput;
use roofline_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use roofline_core::types::DbId;
use sqlx::PgPool;

use crate::models::inspection_request::{InspectionRequest, InspectionRequestFilter};

const COLUMNS: &str = "\
    id, contact_name, contact_email, contact_phone, property_address, property_suburb, \
    property_city, property_postcode, inspection_type, preferred_date, message, status, \
    report_id, handled_by, decline_reason, created_at, updated_at";

pub struct InspectionRequestRepo;

impl InspectionRequestRepo {
    pub async fn create(
        pool: &PgPool,
        input: &InspectionRequestInput,
    ) -> Result<InspectionRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO inspection_requests (
                contact_name, contact_email, contact_phone, property_address, property_suburb,
                property_city, property_postcode, inspection_type, preferred_date, message
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InspectionRequest>(&query)
            .bind(input.contact_name.trim())
            .bind(input.contact_email.trim())
            .bind(&input.contact_phone)
            .bind(input.property_address.trim())
            .bind(&input.property_suburb)
            .bind(&input.property_city)
            .bind(&input.property_postcode)
            .bind(&input.inspection_type)
            .bind(input.preferred_date)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InspectionRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inspection_requests WHERE id = $1");
        sqlx::query_as::<_, InspectionRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List requests, oldest first so the intake queue is worked in order.
    pub async fn list(
        pool: &PgPool,
        filter: &InspectionRequestFilter,
    ) -> Result<Vec<InspectionRequest>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(filter.offset);
        let query = format!(
            "SELECT {COLUMNS} FROM inspection_requests
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, InspectionRequest>(&query)
            .bind(&filter.status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        filter: &InspectionRequestFilter,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM inspection_requests WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(&filter.status)
        .fetch_one(pool)
        .await
    }

    /// Link a new request to the report created from it.
    pub async fn mark_converted(
        pool: &PgPool,
        id: DbId,
        report_id: DbId,
        handled_by: DbId,
    ) -> Result<Option<InspectionRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE inspection_requests
             SET status = 'converted', report_id = $2, handled_by = $3
             WHERE id = $1 AND status = 'new'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InspectionRequest>(&query)
            .bind(id)
            .bind(report_id)
            .bind(handled_by)
            .fetch_optional(pool)
            .await
    }

    pub async fn decline(
        pool: &PgPool,
        id: DbId,
        handled_by: DbId,
        reason: Option<&str>,
    ) -> Result<Option<InspectionRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE inspection_requests
             SET status = 'declined', handled_by = $2, decline_reason = $3
             WHERE id = $1 AND status = 'new'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InspectionRequest>(&query)
            .bind(id)
            .bind(handled_by)
            .bind(reason)
            .fetch_optional(pool)
            .await
    }
}
