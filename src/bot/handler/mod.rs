use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::all::{Context, EventHandler, GuildId, Message, Ready, VoiceState};
use serenity::async_trait;

use crate::cache::MemoryCache;

pub mod command;
pub mod message;
pub mod ready;
pub mod voice;

/// Discord bot event handler
pub struct Handler {
    pub db: DatabaseConnection,
    pub cache: Arc<MemoryCache>,
    /// Only events from this guild are scored.
    pub guild_id: GuildId,
}

impl Handler {
    pub fn new(db: DatabaseConnection, cache: Arc<MemoryCache>, guild_id: GuildId) -> Self {
        Self {
            db,
            cache,
            guild_id,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(ctx, ready).await;
    }

    /// Called when a message is sent in a channel
    async fn message(&self, ctx: Context, message: Message) {
        message::handle_message(&self.db, self.cache.as_ref(), self.guild_id, ctx, message).await;
    }

    /// Called when a member joins, leaves or moves between voice channels
    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        voice::handle_voice_state_update(
            &self.db,
            self.cache.as_ref(),
            self.guild_id,
            ctx,
            old,
            new,
        )
        .await;
    }
}
