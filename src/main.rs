mod bot;
mod cache;
mod config;
mod data;
mod error;
mod model;
mod scheduler;
mod service;
mod startup;
mod util;

use std::sync::Arc;

use dioxus_logger::tracing::{self, Level};

use crate::{
    cache::MemoryCache,
    config::Config,
    error::AppError,
    service::{backup::BackupService, sync::SyncService},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    if let Err(e) = dioxus_logger::init(Level::INFO) {
        eprintln!("Failed to initialise logger: {}", e);
    }

    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;
    let cache = Arc::new(MemoryCache::new());

    let backup_loaded = BackupService::new(&db, cache.as_ref())
        .load_backup_data()
        .await;

    let bot_client = bot::start::init_bot(&config, db.clone(), cache.clone()).await?;
    let discord_http = bot_client.http.clone();
    let shard_manager = bot_client.shard_manager.clone();

    let mut tasks = startup::start_scheduler(
        &config,
        &db,
        cache.clone(),
        discord_http,
        backup_loaded,
    )
    .await?;

    let bot_task = tokio::spawn(async move {
        if let Err(e) = bot::start::start_bot(bot_client).await {
            tracing::error!("Discord bot error: {}", e);
        }
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }

    tracing::info!("Shutting down");

    tasks.stop().await?;

    if backup_loaded {
        SyncService::new(&db, cache.as_ref()).flush_dirty().await;
    }

    shard_manager.shutdown_all().await;

    if let Err(e) = bot_task.await {
        tracing::error!("Discord bot task failed: {}", e);
    }

    Ok(())
}
