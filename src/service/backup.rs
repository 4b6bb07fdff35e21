//! One-time cache hydration from the durable store.

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;

use crate::{
    cache::{activity_key, CacheStore, Transaction, BOOSTERS_KEY, LOADED_SENTINEL_KEY},
    data::activity::ActivityRepository,
    error::AppError,
};

/// Rows read from the database per batch while restoring.
pub const BACKUP_BATCH_SIZE: u64 = 500;

pub struct BackupService<'a, C: CacheStore> {
    db: &'a DatabaseConnection,
    cache: &'a C,
}

impl<'a, C: CacheStore> BackupService<'a, C> {
    pub fn new(db: &'a DatabaseConnection, cache: &'a C) -> Self {
        Self { db, cache }
    }

    /// Copies every stored record into the cache, at most once per cache lifetime.
    ///
    /// The loaded sentinel is claimed atomically before scanning, so concurrent callers
    /// cannot both restore. If restoring fails the sentinel is released again so the
    /// next start retries.
    ///
    /// # Returns
    /// - `true` - The cache holds the backup, either restored now or earlier
    /// - `false` - Restoring failed; the failure is logged
    pub async fn load_backup_data(&self) -> bool {
        match self
            .cache
            .set_nx(LOADED_SENTINEL_KEY, "true".to_string())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("Activity cache already loaded, skipping backup restore");
                return true;
            }
            Err(e) => {
                tracing::error!("Failed to claim activity backup sentinel: {}", e);
                return false;
            }
        }

        match self.restore().await {
            Ok(restored) => {
                tracing::info!("Restored {} activity records into the cache", restored);
                true
            }
            Err(e) => {
                tracing::error!("Failed to restore activity backup: {}", e);
                if let Err(e) = self.cache.del(LOADED_SENTINEL_KEY).await {
                    tracing::error!("Failed to release activity backup sentinel: {}", e);
                }
                false
            }
        }
    }

    async fn restore(&self) -> Result<u64, AppError> {
        let repo = ActivityRepository::new(self.db);
        let mut batch = 0;
        let mut restored = 0;

        loop {
            let records = repo.get_batch(batch, BACKUP_BATCH_SIZE).await?;
            let fetched = records.len() as u64;

            for record in records {
                let key = activity_key(record.user_id);
                let token = self.cache.watch(&key).await?;
                let tx = Transaction::new()
                    .set(key, record.to_json()?)
                    .h_set(
                        BOOSTERS_KEY,
                        record.user_id.to_string(),
                        record.is_booster.to_string(),
                    );

                // A conflict means a live event already wrote a newer record
                if self.cache.exec(token, tx).await? {
                    restored += 1;
                } else {
                    tracing::debug!("Kept live activity record for user {}", record.user_id);
                }
            }

            if fetched < BACKUP_BATCH_SIZE {
                break;
            }
            batch += 1;
        }

        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use test_utils::{builder::TestBuilder, factory::activity::ActivityFactory};

    use super::*;
    use crate::{
        cache::MemoryCache, model::activity::ActivityRecord,
        service::activity::tests::RacingCache,
    };

    #[tokio::test]
    async fn restores_records_and_booster_flags() {
        let test = TestBuilder::new().with_activity_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        ActivityFactory::new(db)
            .user_id("1")
            .points(50)
            .voice_points(8)
            .build()
            .await
            .unwrap();
        ActivityFactory::new(db)
            .user_id("2")
            .booster(true)
            .build()
            .await
            .unwrap();
        let cache = MemoryCache::new();

        assert!(BackupService::new(db, &cache).load_backup_data().await);

        let raw = cache.get(&activity_key(1)).await.unwrap().unwrap();
        let record = ActivityRecord::from_json(&raw).unwrap();
        assert_eq!(record.points, 50);
        assert_eq!(record.voice_points, 8);
        assert_eq!(
            cache.h_get(BOOSTERS_KEY, "1").await.unwrap().as_deref(),
            Some("false")
        );
        assert_eq!(
            cache.h_get(BOOSTERS_KEY, "2").await.unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(
            cache.get(LOADED_SENTINEL_KEY).await.unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn restores_across_multiple_batches() {
        let test = TestBuilder::new().with_activity_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        for id in 0..(BACKUP_BATCH_SIZE + 3) {
            ActivityFactory::new(db)
                .user_id((id + 1).to_string())
                .build()
                .await
                .unwrap();
        }
        let cache = MemoryCache::new();

        assert!(BackupService::new(db, &cache).load_backup_data().await);

        assert!(cache.get(&activity_key(1)).await.unwrap().is_some());
        assert!(cache
            .get(&activity_key(BACKUP_BATCH_SIZE + 3))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn second_load_does_not_rescan() {
        let test = TestBuilder::new().with_activity_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        ActivityFactory::new(db)
            .user_id("1")
            .points(50)
            .build()
            .await
            .unwrap();
        let cache = MemoryCache::new();
        let service = BackupService::new(db, &cache);

        assert!(service.load_backup_data().await);

        // Cache now diverges from the database; a second load must not clobber it
        let mut record = ActivityRecord::new(1, "live");
        record.points = 75;
        cache
            .set(&activity_key(1), record.to_json().unwrap())
            .await
            .unwrap();
        ActivityFactory::new(db)
            .user_id("2")
            .build()
            .await
            .unwrap();

        assert!(service.load_backup_data().await);

        let raw = cache.get(&activity_key(1)).await.unwrap().unwrap();
        assert_eq!(ActivityRecord::from_json(&raw).unwrap().points, 75);
        assert_eq!(cache.get(&activity_key(2)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn restore_yields_to_concurrent_live_write() {
        let test = TestBuilder::new().with_activity_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        ActivityFactory::new(db)
            .user_id("1")
            .points(50)
            .booster(true)
            .build()
            .await
            .unwrap();
        ActivityFactory::new(db)
            .user_id("2")
            .points(20)
            .build()
            .await
            .unwrap();
        let cache = RacingCache::new(1);
        let mut live = ActivityRecord::new(1, "live");
        live.points = 7;
        cache
            .inner
            .set(&activity_key(1), live.to_json().unwrap())
            .await
            .unwrap();

        assert!(BackupService::new(db, &cache).load_backup_data().await);

        let raw = cache.get(&activity_key(1)).await.unwrap().unwrap();
        assert_eq!(ActivityRecord::from_json(&raw).unwrap().points, 107);
        assert_eq!(cache.h_get(BOOSTERS_KEY, "1").await.unwrap(), None);

        let raw = cache.get(&activity_key(2)).await.unwrap().unwrap();
        assert_eq!(ActivityRecord::from_json(&raw).unwrap().points, 20);
        assert_eq!(
            cache.h_get(BOOSTERS_KEY, "2").await.unwrap().as_deref(),
            Some("false")
        );
    }

    #[tokio::test]
    async fn failed_restore_releases_sentinel() {
        let test = TestBuilder::new().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let cache = MemoryCache::new();

        assert!(!BackupService::new(db, &cache).load_backup_data().await);
        assert_eq!(cache.get(LOADED_SENTINEL_KEY).await.unwrap(), None);
    }
}
