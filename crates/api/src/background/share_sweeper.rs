//! Periodic purge of long-expired report shares.
//!
//! Shares stay in the table after expiry so recipients get a clear "expired"
//! answer; once they have been expired for [`PURGE_AFTER_DAYS`] they are
//! deleted.

use std::time::Duration;

use chrono::Utc;
use roofline_core::share::PURGE_AFTER_DAYS;
use roofline_db::repositories::ShareRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(6 * 3600);

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        purge_after_days = PURGE_AFTER_DAYS,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Share sweeper started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Share sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                sweep_once(&pool).await;
            }
        }
    }
}

/// Delete shares that expired more than [`PURGE_AFTER_DAYS`] ago.
pub async fn sweep_once(pool: &PgPool) -> u64 {
    let cutoff = Utc::now() - chrono::Duration::days(PURGE_AFTER_DAYS);
    match ShareRepo::delete_expired_before(pool, cutoff).await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!(deleted, "Share sweeper: purged expired shares");
            } else {
                tracing::debug!("Share sweeper: nothing to purge");
            }
            deleted
        }
        Err(e) => {
            tracing::error!(error = %e, "Share sweeper: purge failed");
            0
        }
    }
}
