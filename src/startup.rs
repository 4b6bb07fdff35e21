use std::sync::Arc;

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;
use serenity::http::Http;

use crate::{
    cache::MemoryCache,
    config::Config,
    error::AppError,
    scheduler::{activity_sync, top_roster, ScheduledTasks},
    service::roster::RosterSettings,
};

/// Connects to the database and runs pending migrations.
///
/// # Arguments
/// - `config` - Application configuration containing the database URL
///
/// # Returns
/// - `Ok(DatabaseConnection)` - Connected database with migrations applied
/// - `Err(AppError)` - Failed to connect to database or run migrations
pub async fn connect_to_database(config: &Config) -> Result<DatabaseConnection, AppError> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Registers and starts the background jobs.
///
/// The flush job only runs once the cache holds the backup; flushing a cache that
/// failed to load could overwrite durable totals with partial ones. The roster job
/// runs only when a top role is configured.
///
/// # Arguments
/// - `config` - Application configuration with the cron schedules and roster settings
/// - `db` - Database connection shared with the jobs
/// - `cache` - Activity cache shared by the flush and roster jobs
/// - `discord_http` - Discord HTTP client for role changes
/// - `backup_loaded` - Whether the cache was hydrated from the database
pub async fn start_scheduler(
    config: &Config,
    db: &DatabaseConnection,
    cache: Arc<MemoryCache>,
    discord_http: Arc<Http>,
    backup_loaded: bool,
) -> Result<ScheduledTasks, AppError> {
    let tasks = ScheduledTasks::new().await?;

    if backup_loaded {
        tasks
            .add(activity_sync::job(&config.sync_schedule, db.clone(), cache.clone())?)
            .await?;
        tracing::info!("Activity sync scheduled ({})", config.sync_schedule);
    } else {
        tracing::warn!("Activity backup not loaded, database sync disabled");
    }

    match RosterSettings::from_config(config) {
        Some(settings) => {
            tasks
                .add(top_roster::job(
                    &config.roster_schedule,
                    db.clone(),
                    cache,
                    discord_http,
                    config.discord_guild_id,
                    Arc::new(settings),
                )?)
                .await?;
            tracing::info!("Top role reconciliation scheduled ({})", config.roster_schedule);
        }
        None => tracing::info!("TOP_ROLE_ID not set, top role reconciliation disabled"),
    }

    tasks.start().await?;

    Ok(tasks)
}
