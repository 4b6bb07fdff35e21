//! Ready event handler.
//!
//! Fired once per gateway connection after the initial handshake.

use dioxus_logger::tracing;
use serenity::all::{ActivityData, Context, Ready};

/// Logs the connection and sets the bot's presence.
///
/// # Arguments
/// - `ctx` - Discord context for setting activity status
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(ctx: Context, ready: Ready) {
    tracing::info!("{} is connected to Discord", ready.user.name);

    ctx.set_activity(Some(ActivityData::watching("the leaderboard")));
}
