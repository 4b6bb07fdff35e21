//! Discord gateway integration.
//!
//! The bot listens for guild messages and voice state changes and feeds them into the
//! activity ledger. Its HTTP client is shared with the roster job for role changes.
//!
//! # Gateway Intents
//!
//! - `GUILDS` - Guild availability
//! - `GUILD_MESSAGES` - Messages in guild channels
//! - `GUILD_MEMBERS` - Member data for booster and role lookups (privileged intent)
//! - `GUILD_VOICE_STATES` - Voice channel joins, leaves and moves
//! - `MESSAGE_CONTENT` - Message text for length based scoring (privileged intent)
//!
//! Privileged intents must be enabled in the Discord Developer Portal.

pub mod handler;
pub mod start;
