//! Activity ledger.
//!
//! The cache is the read/write path for balances; the database is only read for
//! leaderboard queries. Every write goes through a watch + conditional commit on the
//! record's cache key and marks the user dirty in the same transaction, so the
//! synchronizer never misses a committed change.

use chrono::{DateTime, Utc};
use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;

use crate::{
    cache::{activity_key, CacheStore, Transaction, BOOSTERS_KEY, DIRTY_USERS_KEY},
    data::activity::ActivityRepository,
    error::AppError,
    model::activity::{
        apply_booster, message_points, ActivityKind, ActivityRecord, TopUsersPage, UserRank,
    },
    service::discord::MemberDirectory,
};

/// Commit attempts before a contended update is dropped.
pub const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// Result of a read-modify-write against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifyOutcome {
    /// The mutation was committed; holds the stored record.
    Committed(ActivityRecord),
    /// The mutation declined to change the record.
    Skipped,
    /// Every attempt lost a race with another writer.
    Conflicted,
}

pub struct ActivityService<'a, C: CacheStore> {
    pub(crate) db: &'a DatabaseConnection,
    pub(crate) cache: &'a C,
}

impl<'a, C: CacheStore> ActivityService<'a, C> {
    pub fn new(db: &'a DatabaseConnection, cache: &'a C) -> Self {
        Self { db, cache }
    }

    /// Reads a user's record from the cache.
    ///
    /// # Returns
    /// - `Ok(Some(ActivityRecord))` - Cached record
    /// - `Ok(None)` - The user has no record yet
    /// - `Err(AppError)` - Cache failure or unreadable cached value
    pub async fn get_activity(&self, user_id: u64) -> Result<Option<ActivityRecord>, AppError> {
        self.cache
            .get(&activity_key(user_id))
            .await?
            .map(|value| ActivityRecord::from_json(&value))
            .transpose()
    }

    /// Persists `record` if nobody committed a newer version first.
    ///
    /// The stored version must equal `record.version` (or no value may be stored yet).
    /// On success `record.version` is bumped by one and the user is marked dirty.
    /// Conflicts are retried up to `MAX_UPDATE_ATTEMPTS` times.
    ///
    /// # Returns
    /// - `true` - The record was committed
    /// - `false` - Retries were exhausted or the cache failed; the failure is logged
    pub async fn update_activity(&self, record: &mut ActivityRecord) -> bool {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            match self.try_commit(record).await {
                Ok(true) => return true,
                Ok(false) => tracing::debug!(
                    "Version conflict updating activity for user {} (attempt {}/{})",
                    record.user_id,
                    attempt,
                    MAX_UPDATE_ATTEMPTS
                ),
                Err(e) => {
                    tracing::error!(
                        "Failed to update activity for user {}: {}",
                        record.user_id,
                        e
                    );
                    return false;
                }
            }
        }

        tracing::error!(
            "Gave up updating activity for user {} after {} conflicting attempts",
            record.user_id,
            MAX_UPDATE_ATTEMPTS
        );
        false
    }

    /// Re-reads the record on every attempt, applies `mutate` and commits it.
    ///
    /// Unlike `update_activity`, a writer that loses a race re-applies its change on
    /// top of the winner's record, so neither increment is lost. `mutate` returning
    /// `false` aborts without writing. Missing records start from
    /// `ActivityRecord::new(user_id, user_name)`.
    pub async fn modify_activity<F>(
        &self,
        user_id: u64,
        user_name: &str,
        mut mutate: F,
    ) -> Result<ModifyOutcome, AppError>
    where
        F: FnMut(&mut ActivityRecord) -> bool + Send,
    {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let mut record = self
                .get_activity(user_id)
                .await?
                .unwrap_or_else(|| ActivityRecord::new(user_id, user_name));

            if !mutate(&mut record) {
                return Ok(ModifyOutcome::Skipped);
            }

            if self.try_commit(&mut record).await? {
                return Ok(ModifyOutcome::Committed(record));
            }

            tracing::debug!(
                "Version conflict modifying activity for user {} (attempt {}/{})",
                user_id,
                attempt,
                MAX_UPDATE_ATTEMPTS
            );
        }

        Ok(ModifyOutcome::Conflicted)
    }

    /// One watch + compare + conditional commit round.
    ///
    /// Returns `Ok(false)` on a version mismatch or when the watched key changed
    /// before the commit.
    async fn try_commit(&self, record: &mut ActivityRecord) -> Result<bool, AppError> {
        let key = activity_key(record.user_id);
        let token = self.cache.watch(&key).await?;

        if let Some(stored) = self.cache.get(&key).await? {
            let stored = ActivityRecord::from_json(&stored)?;
            if stored.version != record.version {
                return Ok(false);
            }
        }

        let mut next = record.clone();
        next.version += 1;

        let tx = Transaction::new()
            .set(key, next.to_json()?)
            .s_add(DIRTY_USERS_KEY, record.user_id.to_string());

        if self.cache.exec(token, tx).await? {
            *record = next;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Awards points for a guild message.
    ///
    /// See `log_text_activity_at`.
    pub async fn log_text_activity<M: MemberDirectory>(
        &self,
        user_id: u64,
        user_name: &str,
        message_length: usize,
        has_attachment: bool,
        members: &M,
    ) {
        self.log_text_activity_at(
            user_id,
            user_name,
            message_length,
            has_attachment,
            members,
            Utc::now(),
        )
        .await
    }

    /// Awards points for a guild message sent at `now`.
    ///
    /// Messages within the cooldown of the user's last rewarded message are ignored.
    /// Boosters get a 1.2x multiplier. Failures are logged and the event is dropped.
    pub async fn log_text_activity_at<M: MemberDirectory>(
        &self,
        user_id: u64,
        user_name: &str,
        message_length: usize,
        has_attachment: bool,
        members: &M,
        now: DateTime<Utc>,
    ) {
        let existing = match self.get_activity(user_id).await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::error!("Failed to read activity for user {}: {}", user_id, e);
                return;
            }
        };

        let mut snapshot = match existing {
            Some(record) if record.on_cooldown(now) => return,
            Some(record) => record,
            None => ActivityRecord::new(user_id, user_name),
        };

        let is_booster = self.is_user_booster_at(members, &mut snapshot, now).await;
        let awarded = apply_booster(message_points(message_length, has_attachment), is_booster);

        let outcome = self
            .modify_activity(user_id, user_name, |record| {
                // Re-checked because a retry may observe a message committed meanwhile
                if record.on_cooldown(now) {
                    return false;
                }
                record.user_name = user_name.to_string();
                record.last_activity = now;
                if snapshot.last_boost_check > record.last_boost_check {
                    record.last_boost_check = snapshot.last_boost_check;
                    record.is_booster = snapshot.is_booster;
                }
                record.add_points(awarded);
                true
            })
            .await;

        match outcome {
            Ok(ModifyOutcome::Committed(record)) => tracing::debug!(
                "Awarded {} points to user {} (total {})",
                awarded,
                user_id,
                record.points
            ),
            Ok(ModifyOutcome::Skipped) => {}
            Ok(ModifyOutcome::Conflicted) => tracing::error!(
                "Dropped {} points for user {} after {} conflicting attempts",
                awarded,
                user_id,
                MAX_UPDATE_ATTEMPTS
            ),
            Err(e) => tracing::error!("Failed to log activity for user {}: {}", user_id, e),
        }
    }

    /// Resolves booster status, refreshing it from Discord when stale.
    ///
    /// A refresh happens when no status is cached or the last check is older than two
    /// hours; it updates the booster hash and `record.last_boost_check` /
    /// `record.is_booster`. Any failure while refreshing counts as "not a booster".
    pub async fn is_user_booster_at<M: MemberDirectory>(
        &self,
        members: &M,
        record: &mut ActivityRecord,
        now: DateTime<Utc>,
    ) -> bool {
        let field = record.user_id.to_string();
        let cached = match self.cache.h_get(BOOSTERS_KEY, &field).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(
                    "Failed to read booster status for user {}: {}",
                    record.user_id,
                    e
                );
                None
            }
        };

        if let Some(value) = cached {
            if !record.boost_check_due(now) {
                return value == "true";
            }
        }

        let is_booster = match members.is_booster(record.user_id).await {
            Ok(is_booster) => is_booster,
            Err(e) => {
                tracing::warn!(
                    "Failed to refresh booster status for user {}: {}",
                    record.user_id,
                    e
                );
                return false;
            }
        };

        if let Err(e) = self
            .cache
            .h_set(BOOSTERS_KEY, &field, is_booster.to_string())
            .await
        {
            tracing::warn!(
                "Failed to cache booster status for user {}: {}",
                record.user_id,
                e
            );
            return false;
        }

        record.last_boost_check = now;
        record.is_booster = is_booster;
        is_booster
    }

    /// Gets a user's durable totals and leaderboard positions.
    pub async fn get_user_rank_and_totals(
        &self,
        user_id: u64,
    ) -> Result<Option<UserRank>, AppError> {
        ActivityRepository::new(self.db)
            .rank_and_totals(user_id)
            .await
    }

    /// Gets one page of the durable leaderboard.
    pub async fn get_top_users(
        &self,
        page: u64,
        kind: ActivityKind,
        limit: u64,
    ) -> Result<TopUsersPage, AppError> {
        ActivityRepository::new(self.db)
            .get_top_users(page, kind, limit)
            .await
    }
}
