//! Activity factory for creating durable ledger rows.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating activity rows with customizable fields.
///
/// Defaults model a row written by a current release. Use `legacy()` to leave
/// the nullable columns empty the way older releases stored them.
pub struct ActivityFactory<'a> {
    db: &'a DatabaseConnection,
    user_id: String,
    user_name: String,
    points: i64,
    voice_points: Option<i64>,
    last_activity: Option<DateTime<Utc>>,
    last_boost_check: Option<DateTime<Utc>>,
    is_booster: Option<bool>,
    version: Option<i64>,
}

impl<'a> ActivityFactory<'a> {
    /// Creates a new ActivityFactory with default values.
    ///
    /// Defaults:
    /// - user_id: auto-incremented counter value
    /// - user_name: `"User {id}"`
    /// - points / voice_points: `0`
    /// - is_booster: `false`, version: `1`
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            user_id: id.to_string(),
            user_name: format!("User {}", id),
            points: 0,
            voice_points: Some(0),
            last_activity: None,
            last_boost_check: None,
            is_booster: Some(false),
            version: Some(1),
        }
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self
    }

    pub fn points(mut self, points: i64) -> Self {
        self.points = points;
        self
    }

    pub fn voice_points(mut self, voice_points: i64) -> Self {
        self.voice_points = Some(voice_points);
        self
    }

    pub fn booster(mut self, is_booster: bool) -> Self {
        self.is_booster = Some(is_booster);
        self
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn last_activity(mut self, at: DateTime<Utc>) -> Self {
        self.last_activity = Some(at);
        self
    }

    /// Clears every nullable column, mimicking rows from older releases.
    pub fn legacy(mut self) -> Self {
        self.voice_points = None;
        self.last_activity = None;
        self.last_boost_check = None;
        self.is_booster = None;
        self.version = None;
        self
    }

    /// Builds and inserts the activity row into the database.
    ///
    /// # Returns
    /// - `Ok(entity::activity::Model)` - Created row
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::activity::Model, DbErr> {
        entity::activity::ActiveModel {
            user_id: ActiveValue::Set(self.user_id),
            user_name: ActiveValue::Set(self.user_name),
            points: ActiveValue::Set(self.points),
            voice_points: ActiveValue::Set(self.voice_points),
            last_activity: ActiveValue::Set(self.last_activity),
            last_boost_check: ActiveValue::Set(self.last_boost_check),
            is_booster: ActiveValue::Set(self.is_booster),
            version: ActiveValue::Set(self.version),
            last_update: ActiveValue::Set(Some(Utc::now())),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an activity row with default values.
///
/// Shorthand for `ActivityFactory::new(db).build().await`.
pub async fn create_activity(db: &DatabaseConnection) -> Result<entity::activity::Model, DbErr> {
    ActivityFactory::new(db).build().await
}
