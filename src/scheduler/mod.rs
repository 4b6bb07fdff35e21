//! Cron jobs that run alongside the gateway connection.
//!
//! - `activity_sync` - flushes dirty ledger records to the database
//! - `top_roster` - reconciles the top performer role

pub mod activity_sync;
pub mod top_roster;

use dioxus_logger::tracing;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::error::AppError;

/// Handle to the running job scheduler.
///
/// Jobs are registered with `add` and begin firing after `start`. `stop` must be
/// awaited before the final shutdown flush so no scheduled flush races it.
pub struct ScheduledTasks {
    scheduler: JobScheduler,
}

impl ScheduledTasks {
    pub async fn new() -> Result<Self, AppError> {
        Ok(Self {
            scheduler: JobScheduler::new().await?,
        })
    }

    pub async fn add(&self, job: Job) -> Result<(), AppError> {
        self.scheduler.add(job).await?;
        Ok(())
    }

    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Stops every job; no job fires after this returns.
    pub async fn stop(&mut self) -> Result<(), AppError> {
        self.scheduler.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}
