use std::sync::Arc;

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;
use serenity::all::GuildId;
use serenity::http::Http;
use tokio_cron_scheduler::Job;

use crate::{
    cache::CacheStore,
    error::AppError,
    service::{
        discord::SerenityMemberDirectory,
        roster::{RosterService, RosterSettings},
    },
};

/// Builds the job that reconciles the top performer role on `schedule`.
///
/// # Arguments
/// - `schedule` - Six-field cron expression
/// - `db` - Database connection for leaderboard reads
/// - `cache` - Activity cache backing the ledger
/// - `discord_http` - Discord HTTP client for role changes
/// - `guild_id` - Guild the role lives in
/// - `settings` - Roster thresholds and overrides
pub fn job<C>(
    schedule: &str,
    db: DatabaseConnection,
    cache: Arc<C>,
    discord_http: Arc<Http>,
    guild_id: u64,
    settings: Arc<RosterSettings>,
) -> Result<Job, AppError>
where
    C: CacheStore + 'static,
{
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let db = db.clone();
        let cache = cache.clone();
        let members = SerenityMemberDirectory::new(discord_http.clone(), GuildId::new(guild_id));
        let settings = settings.clone();

        Box::pin(async move {
            if let Err(e) = RosterService::new(&db, cache.as_ref(), settings.as_ref())
                .reconcile(&members)
                .await
            {
                tracing::error!("Error reconciling top role: {}", e);
            }
        })
    })?;

    Ok(job)
}
