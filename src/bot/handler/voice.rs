use sea_orm::DatabaseConnection;
use serenity::all::{Context, GuildId, VoiceState};

use crate::{cache::MemoryCache, service::activity::ActivityService};

/// Handle a voice state change
///
/// Only the channel transition matters; mute, deafen and stream toggles arrive as
/// channel-to-same-channel updates and are ignored by the ledger.
pub async fn handle_voice_state_update(
    db: &DatabaseConnection,
    cache: &MemoryCache,
    guild_id: GuildId,
    _ctx: Context,
    old: Option<VoiceState>,
    new: VoiceState,
) {
    if new.guild_id != Some(guild_id) {
        return;
    }

    let old_channel = old
        .as_ref()
        .and_then(|state| state.channel_id)
        .map(|channel| channel.get());
    let new_channel = new.channel_id.map(|channel| channel.get());

    let (user_name, is_bot) = match new.member.as_ref() {
        Some(member) => (member.user.name.clone(), member.user.bot),
        None => (new.user_id.to_string(), false),
    };

    ActivityService::new(db, cache)
        .process_voice_transition(
            old_channel,
            new_channel,
            new.user_id.get(),
            &user_name,
            is_bot,
        )
        .await;
}
