use std::sync::Arc;

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;
use serenity::all::{Client, GatewayIntents, GuildId};

use crate::{bot::handler::Handler, cache::MemoryCache, config::Config, error::AppError};

/// Builds the Discord client without connecting.
///
/// The client's `http` and `shard_manager` are available to the caller before
/// `start_bot` takes ownership of it.
///
/// # Arguments
/// - `config` - Application configuration with the bot token and guild id
/// - `db` - Database connection for leaderboard reads
/// - `cache` - Activity cache the handlers write to
pub async fn init_bot(
    config: &Config,
    db: DatabaseConnection,
    cache: Arc<MemoryCache>,
) -> Result<Client, AppError> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = Handler::new(db, cache, GuildId::new(config.discord_guild_id));

    let client = Client::builder(&config.discord_bot_token, intents)
        .event_handler(handler)
        .await?;

    Ok(client)
}

/// Connects to the gateway and runs until the shards shut down.
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
