//! Repository for the `report_shares` table.

use roofline_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::share::{NewShare, ReportShare};

const COLUMNS: &str = "id, report_id, token_hash, recipient_email, recipient_name, expires_at, \
                       revoked_at, access_count, last_accessed_at, created_by, created_at, updated_at";

pub struct ShareRepo;

impl ShareRepo {
    pub async fn create(pool: &PgPool, input: &NewShare) -> Result<ReportShare, sqlx::Error> {
        let query = format!(
            "INSERT INTO report_shares
                (report_id, token_hash, recipient_email, recipient_name, expires_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReportShare>(&query)
            .bind(input.report_id)
            .bind(&input.token_hash)
            .bind(&input.recipient_email)
            .bind(&input.recipient_name)
            .bind(input.expires_at)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ReportShare>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM report_shares WHERE id = $1");
        sqlx::query_as::<_, ReportShare>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look a share up by the SHA-256 of its presented token.
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<ReportShare>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM report_shares WHERE token_hash = $1");
        sqlx::query_as::<_, ReportShare>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_report(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<ReportShare>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM report_shares WHERE report_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ReportShare>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    /// Revoke a share. Already-revoked shares keep their original time.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<Option<ReportShare>, sqlx::Error> {
        let query = format!(
            "UPDATE report_shares SET revoked_at = COALESCE(revoked_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReportShare>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Count one access of an active share.
    pub async fn record_access(pool: &PgPool, id: DbId) -> Result<Option<ReportShare>, sqlx::Error> {
        let query = format!(
            "UPDATE report_shares
             SET access_count = access_count + 1, last_accessed_at = NOW()
             WHERE id = $1 AND revoked_at IS NULL AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReportShare>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete shares that expired before `cutoff`. Returns the number removed.
    pub async fn delete_expired_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM report_shares WHERE expires_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
