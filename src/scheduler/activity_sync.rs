use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio_cron_scheduler::Job;

use crate::{cache::CacheStore, error::AppError, service::sync::SyncService};

/// Builds the job that flushes dirty activity records on `schedule`.
///
/// Failures are logged by the flush itself and retried on the next tick.
///
/// # Arguments
/// - `schedule` - Six-field cron expression
/// - `db` - Database connection the records are written to
/// - `cache` - Cache holding the dirty set
pub fn job<C>(schedule: &str, db: DatabaseConnection, cache: Arc<C>) -> Result<Job, AppError>
where
    C: CacheStore + 'static,
{
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let db = db.clone();
        let cache = cache.clone();

        Box::pin(async move {
            SyncService::new(&db, cache.as_ref()).flush_dirty().await;
        })
    })?;

    Ok(job)
}
