//! Activity ledger domain models.
//!
//! `ActivityRecord` is the per-user balance stored as JSON in the cache and as a row in
//! the durable `activity` table. Every field has an explicit default so a record built
//! from a legacy row or created for a brand new user is always fully initialised.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, util::parse::parse_u64_from_string};

/// Minimum time between two point-earning text messages.
pub const TEXT_COOLDOWN_MS: i64 = 60_000;
/// Booster status is refreshed from Discord at most this often.
pub const BOOST_CHECK_INTERVAL_MS: i64 = 2 * 60 * 60 * 1000;
pub const VOICE_POINTS_PER_MINUTE: i64 = 4;

const SHORT_MESSAGE_POINTS: i64 = 15;
const LONG_MESSAGE_POINTS: i64 = 25;
const ATTACHMENT_BONUS: i64 = 10;

/// Per-user activity balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(with = "id_string")]
    pub user_id: u64,
    pub user_name: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub voice_points: i64,
    #[serde(default = "epoch")]
    pub last_activity: DateTime<Utc>,
    #[serde(default = "epoch")]
    pub last_boost_check: DateTime<Utc>,
    #[serde(default)]
    pub is_booster: bool,
    /// Optimistic concurrency token, bumped by exactly one on every committed write.
    #[serde(default)]
    pub version: i64,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl ActivityRecord {
    /// Zero-valued record for a user seen for the first time.
    ///
    /// Timestamps start at the Unix epoch, so neither the text cooldown nor the booster
    /// refresh interval can block the first event.
    pub fn new(user_id: u64, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            points: 0,
            voice_points: 0,
            last_activity: epoch(),
            last_boost_check: epoch(),
            is_booster: false,
            version: 0,
        }
    }

    pub fn from_json(value: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(value)?)
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether a text message at `now` falls inside the cooldown window.
    pub fn on_cooldown(&self, now: DateTime<Utc>) -> bool {
        (now - self.last_activity).num_milliseconds() < TEXT_COOLDOWN_MS
    }

    /// Whether the cached booster flag is old enough to refresh.
    pub fn boost_check_due(&self, now: DateTime<Utc>) -> bool {
        (now - self.last_boost_check).num_milliseconds() > BOOST_CHECK_INTERVAL_MS
    }

    pub fn add_points(&mut self, points: i64) {
        self.points = self.points.saturating_add(points).max(0);
    }

    pub fn add_voice_points(&mut self, points: i64) {
        self.voice_points = self.voice_points.saturating_add(points).max(0);
    }

    /// Converts a durable row into a record, filling in columns older rows lack.
    ///
    /// # Returns
    /// - `Ok(ActivityRecord)` - The normalised record
    /// - `Err(AppError::InternalErr(ParseStringId))` - Stored user id is not a snowflake
    pub fn from_entity(entity: entity::activity::Model) -> Result<Self, AppError> {
        Ok(Self {
            user_id: parse_u64_from_string(entity.user_id)?,
            user_name: entity.user_name,
            points: entity.points.max(0),
            voice_points: entity.voice_points.unwrap_or(0).max(0),
            last_activity: entity.last_activity.unwrap_or_else(epoch),
            last_boost_check: entity.last_boost_check.unwrap_or_else(epoch),
            is_booster: entity.is_booster.unwrap_or(false),
            version: entity.version.unwrap_or(0),
        })
    }

    /// Builds the row written by the synchronizer, stamped with `last_update`.
    pub fn into_active_model(self, last_update: DateTime<Utc>) -> entity::activity::ActiveModel {
        entity::activity::ActiveModel {
            user_id: ActiveValue::Set(self.user_id.to_string()),
            user_name: ActiveValue::Set(self.user_name),
            points: ActiveValue::Set(self.points),
            voice_points: ActiveValue::Set(Some(self.voice_points)),
            last_activity: ActiveValue::Set(Some(self.last_activity)),
            last_boost_check: ActiveValue::Set(Some(self.last_boost_check)),
            is_booster: ActiveValue::Set(Some(self.is_booster)),
            version: ActiveValue::Set(Some(self.version)),
            last_update: ActiveValue::Set(Some(last_update)),
        }
    }
}

/// Open voice connection for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSession {
    #[serde(with = "id_string")]
    pub user_id: u64,
    pub joined_at: DateTime<Utc>,
}

impl VoiceSession {
    pub fn from_json(value: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(value)?)
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whole minutes spent in voice up to `now`; never negative.
    pub fn minutes_elapsed(&self, now: DateTime<Utc>) -> i64 {
        ((now - self.joined_at).num_milliseconds() / 60_000).max(0)
    }

    pub fn points_until(&self, now: DateTime<Utc>) -> i64 {
        self.minutes_elapsed(now) * VOICE_POINTS_PER_MINUTE
    }
}

/// Which balance a leaderboard query ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Text,
    Voice,
}

/// Page of the leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct TopUsersPage {
    pub users: Vec<ActivityRecord>,
    pub total_pages: u64,
    /// 1-based page number that was returned.
    pub current_page: u64,
}

/// A user's durable totals and their 1-based leaderboard positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRank {
    pub points: i64,
    pub voice_points: i64,
    pub position: u64,
    pub voice_position: u64,
}

/// Points earned by one message before the booster multiplier.
///
/// Messages under 100 characters earn 15, messages over 300 earn 25 and lengths in
/// between scale linearly. Attachments add a flat bonus.
pub fn message_points(message_length: usize, has_attachment: bool) -> i64 {
    let length = message_length as i64;
    let base = if length < 100 {
        SHORT_MESSAGE_POINTS
    } else if length <= 300 {
        SHORT_MESSAGE_POINTS + (length - 100) * 10 / 200
    } else {
        LONG_MESSAGE_POINTS
    };

    if has_attachment {
        base + ATTACHMENT_BONUS
    } else {
        base
    }
}

/// Applies the 1.2x booster multiplier, rounding down.
pub fn apply_booster(points: i64, is_booster: bool) -> i64 {
    if is_booster {
        points * 6 / 5
    } else {
        points
    }
}

/// Discord ids are stored as strings in cached JSON.
mod id_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(id: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
