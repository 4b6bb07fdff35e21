//! Leaderboard commands.
//!
//! `!rank` replies with the author's durable totals and positions. `!top [text|voice]
//! [page]` replies with one page of a leaderboard. Both read the database, so figures
//! lag the live cache by up to one sync interval.

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;
use serenity::all::{Context, Message};

use crate::{
    cache::MemoryCache,
    error::AppError,
    model::activity::{ActivityKind, TopUsersPage, UserRank},
    service::activity::ActivityService,
};

pub const COMMAND_PREFIX: &str = "!";
pub const TOP_PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Rank,
    Top { kind: ActivityKind, page: u64 },
}

/// Parses a leaderboard command; `None` for ordinary messages.
pub fn parse_command(content: &str) -> Option<Command> {
    let mut parts = content.trim().strip_prefix(COMMAND_PREFIX)?.split_whitespace();

    match parts.next()? {
        "rank" => Some(Command::Rank),
        "top" => {
            let mut kind = ActivityKind::Text;
            let mut page = 1;
            for arg in parts {
                match arg {
                    "text" => kind = ActivityKind::Text,
                    "voice" => kind = ActivityKind::Voice,
                    other => page = other.parse().ok()?,
                }
            }
            Some(Command::Top { kind, page })
        }
        _ => None,
    }
}

pub fn render_rank(user_name: &str, rank: Option<UserRank>) -> String {
    match rank {
        Some(rank) => format!(
            "{}: {} points (#{}), {} voice points (#{})",
            user_name, rank.points, rank.position, rank.voice_points, rank.voice_position
        ),
        None => format!("{} has no recorded activity yet.", user_name),
    }
}

pub fn render_top(kind: ActivityKind, page: &TopUsersPage, page_size: u64) -> String {
    if page.users.is_empty() {
        return "No activity recorded yet.".to_string();
    }

    let (title, unit) = match kind {
        ActivityKind::Text => ("Text leaderboard", "points"),
        ActivityKind::Voice => ("Voice leaderboard", "voice points"),
    };
    let offset = page.current_page.saturating_sub(1) * page_size;

    let mut lines = vec![format!(
        "**{}** (page {}/{})",
        title, page.current_page, page.total_pages
    )];
    for (index, user) in page.users.iter().enumerate() {
        let total = match kind {
            ActivityKind::Text => user.points,
            ActivityKind::Voice => user.voice_points,
        };
        lines.push(format!(
            "{}. {} - {} {}",
            offset + index as u64 + 1,
            user.user_name,
            total,
            unit
        ));
    }

    lines.join("\n")
}

/// Answers a parsed command in the message's channel.
pub async fn handle_command(
    db: &DatabaseConnection,
    cache: &MemoryCache,
    ctx: Context,
    message: Message,
    command: Command,
) {
    if let Err(e) = reply(db, cache, &ctx, &message, command).await {
        tracing::error!(
            "Failed to answer {:?} for user {}: {}",
            command,
            message.author.id,
            e
        );
    }
}

async fn reply(
    db: &DatabaseConnection,
    cache: &MemoryCache,
    ctx: &Context,
    message: &Message,
    command: Command,
) -> Result<(), AppError> {
    let ledger = ActivityService::new(db, cache);

    let content = match command {
        Command::Rank => {
            let rank = ledger
                .get_user_rank_and_totals(message.author.id.get())
                .await?;
            render_rank(&message.author.name, rank)
        }
        Command::Top { kind, page } => {
            let top = ledger.get_top_users(page, kind, TOP_PAGE_SIZE).await?;
            render_top(kind, &top, TOP_PAGE_SIZE)
        }
    };

    message.channel_id.say(&ctx.http, content).await?;

    Ok(())
}
