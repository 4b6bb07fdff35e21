use std::collections::HashSet;
use std::str::FromStr;

use crate::error::{config::ConfigError, AppError};

const DEFAULT_SYNC_SCHEDULE: &str = "0 */5 * * * *";
const DEFAULT_ROSTER_SCHEDULE: &str = "0 0 */4 * * *";
const DEFAULT_ROSTER_POSITIONS: usize = 25;
const DEFAULT_ROSTER_LIMIT: usize = 35;

pub struct Config {
    pub database_url: String,

    pub discord_bot_token: String,
    pub discord_guild_id: u64,

    /// Role handed to the top of the text leaderboard. Roster reconciliation is
    /// disabled when unset.
    pub top_role_id: Option<u64>,
    pub roster_positions: usize,
    pub roster_limit: usize,
    pub roster_blacklist: HashSet<u64>,
    pub roster_exceptions: HashSet<u64>,

    pub sync_schedule: String,
    pub roster_schedule: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            discord_bot_token: required("DISCORD_BOT_TOKEN")?,
            discord_guild_id: parse_value("DISCORD_GUILD_ID", &required("DISCORD_GUILD_ID")?)?,
            top_role_id: optional("TOP_ROLE_ID")
                .map(|value| parse_value("TOP_ROLE_ID", &value))
                .transpose()?,
            roster_positions: optional("ROSTER_POSITIONS")
                .map(|value| parse_value("ROSTER_POSITIONS", &value))
                .transpose()?
                .unwrap_or(DEFAULT_ROSTER_POSITIONS),
            roster_limit: optional("ROSTER_LIMIT")
                .map(|value| parse_value("ROSTER_LIMIT", &value))
                .transpose()?
                .unwrap_or(DEFAULT_ROSTER_LIMIT),
            roster_blacklist: parse_id_list(
                "ROSTER_BLACKLIST",
                &optional("ROSTER_BLACKLIST").unwrap_or_default(),
            )?,
            roster_exceptions: parse_id_list(
                "ROSTER_EXCEPTIONS",
                &optional("ROSTER_EXCEPTIONS").unwrap_or_default(),
            )?,
            sync_schedule: optional("SYNC_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_SYNC_SCHEDULE.to_string()),
            roster_schedule: optional("ROSTER_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_ROSTER_SCHEDULE.to_string()),
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Parses a comma-separated list of Discord ids, ignoring blank entries.
fn parse_id_list(name: &str, value: &str) -> Result<HashSet<u64>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| parse_value(name, id))
        .collect()
}
