//! Incremental flush of changed records from the cache to the durable store.
//!
//! Ids are removed from the dirty set atomically when a flush starts and put back if
//! the database write fails, so a change is written at least once. Open voice
//! sessions are projected into the written totals without touching the cache, so the
//! same minutes are never credited twice.

use chrono::{DateTime, Utc};
use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;

use crate::{
    cache::{activity_key, voice_key, CacheStore, DIRTY_USERS_KEY},
    data::activity::ActivityRepository,
    error::AppError,
    model::activity::{ActivityRecord, VoiceSession},
    util::parse::parse_u64_from_string,
};

pub struct SyncService<'a, C: CacheStore> {
    db: &'a DatabaseConnection,
    cache: &'a C,
}

impl<'a, C: CacheStore> SyncService<'a, C> {
    pub fn new(db: &'a DatabaseConnection, cache: &'a C) -> Self {
        Self { db, cache }
    }

    /// Writes every dirty record to the database; see `flush_dirty_at`.
    pub async fn flush_dirty(&self) -> bool {
        self.flush_dirty_at(Utc::now()).await
    }

    /// Writes every dirty record to the database as of `now`.
    ///
    /// # Returns
    /// - `true` - Nothing was dirty, or every dirty record was written
    /// - `false` - The flush failed and the taken ids were returned to the dirty set
    pub async fn flush_dirty_at(&self, now: DateTime<Utc>) -> bool {
        let user_ids = match self.cache.s_take(DIRTY_USERS_KEY).await {
            Ok(user_ids) => user_ids,
            Err(e) => {
                tracing::error!("Failed to read dirty activity set: {}", e);
                return false;
            }
        };

        if user_ids.is_empty() {
            return true;
        }

        let records = match self.collect(&user_ids, now).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Failed to read dirty activity records: {}", e);
                self.restore_dirty(&user_ids).await;
                return false;
            }
        };

        match ActivityRepository::new(self.db)
            .bulk_upsert(records, now)
            .await
        {
            Ok(written) => {
                tracing::info!("Flushed {} activity records to the database", written);
                true
            }
            Err(e) => {
                tracing::error!("Failed to flush activity records: {}", e);
                self.restore_dirty(&user_ids).await;
                false
            }
        }
    }

    async fn collect(
        &self,
        user_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        let mut records = Vec::with_capacity(user_ids.len());

        for raw_id in user_ids {
            let user_id = match parse_u64_from_string(raw_id.clone()) {
                Ok(user_id) => user_id,
                Err(e) => {
                    tracing::warn!("Dropping malformed dirty entry {:?}: {}", raw_id, e);
                    continue;
                }
            };

            let Some(raw) = self.cache.get(&activity_key(user_id)).await? else {
                tracing::warn!("Dirty user {} has no cached activity record", user_id);
                continue;
            };

            let mut record = match ActivityRecord::from_json(&raw) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping unreadable activity record for {}: {}", user_id, e);
                    continue;
                }
            };

            if let Some(raw_session) = self.cache.get(&voice_key(user_id)).await? {
                match VoiceSession::from_json(&raw_session) {
                    Ok(session) => record.add_voice_points(session.points_until(now)),
                    Err(e) => {
                        tracing::warn!(
                            "Discarding unreadable voice session for {}: {}",
                            user_id,
                            e
                        );
                        self.cache.del(&voice_key(user_id)).await?;
                    }
                }
            }

            records.push(record);
        }

        Ok(records)
    }

    async fn restore_dirty(&self, user_ids: &[String]) {
        for user_id in user_ids {
            if let Err(e) = self.cache.s_add(DIRTY_USERS_KEY, user_id).await {
                tracing::error!("Failed to re-mark user {} as dirty: {}", user_id, e);
            }
        }
    }
}
