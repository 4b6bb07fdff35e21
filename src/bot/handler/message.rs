use sea_orm::DatabaseConnection;
use serenity::all::{Context, GuildId, Message};

use crate::{
    bot::handler::command,
    cache::MemoryCache,
    service::{activity::ActivityService, discord::SerenityMemberDirectory},
};

/// Handle message creation in a channel
///
/// Scores human messages sent in the configured guild. DMs, other guilds and bot
/// messages are ignored. Leaderboard commands are answered instead of scored.
pub async fn handle_message(
    db: &DatabaseConnection,
    cache: &MemoryCache,
    guild_id: GuildId,
    ctx: Context,
    message: Message,
) {
    if message.author.bot || message.guild_id != Some(guild_id) {
        return;
    }

    if let Some(command) = command::parse_command(&message.content) {
        command::handle_command(db, cache, ctx, message, command).await;
        return;
    }

    let members = SerenityMemberDirectory::new(ctx.http.clone(), guild_id);

    ActivityService::new(db, cache)
        .log_text_activity(
            message.author.id.get(),
            &message.author.name,
            message.content.chars().count(),
            !message.attachments.is_empty(),
            &members,
        )
        .await;
}
