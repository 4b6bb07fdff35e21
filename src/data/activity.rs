//! Activity data repository for the durable ledger store.
//!
//! The durable store is only written by the dirty-set synchronizer and read by the
//! backup loader and the leaderboard queries. Rank and leaderboard queries
//! go to the database rather than the cache so they see one consistent snapshot.

use chrono::{DateTime, Utc};
use migration::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

use crate::{
    error::AppError,
    model::activity::{ActivityKind, ActivityRecord, TopUsersPage, UserRank},
};

/// Repository providing database operations for activity records.
pub struct ActivityRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ActivityRepository<'a> {
    /// Creates a new ActivityRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the stored record for a user.
    ///
    /// # Returns
    /// - `Ok(Some(ActivityRecord))` - Stored record, legacy columns normalised
    /// - `Ok(None)` - The user has never been flushed to the database
    /// - `Err(AppError)` - Database error or malformed stored id
    pub async fn find_by_user_id(&self, user_id: u64) -> Result<Option<ActivityRecord>, AppError> {
        let entity = entity::prelude::Activity::find_by_id(user_id.to_string())
            .one(self.db)
            .await?;

        entity.map(ActivityRecord::from_entity).transpose()
    }

    /// Gets a user's totals and their position on both leaderboards.
    ///
    /// Position is one more than the number of users with a strictly greater total,
    /// so tied users share a position.
    ///
    /// # Returns
    /// - `Ok(Some(UserRank))` - Totals and 1-based positions
    /// - `Ok(None)` - No stored record for the user
    /// - `Err(AppError)` - Database error during lookup or counting
    pub async fn rank_and_totals(&self, user_id: u64) -> Result<Option<UserRank>, AppError> {
        let Some(record) = self.find_by_user_id(user_id).await? else {
            return Ok(None);
        };

        let ahead = entity::prelude::Activity::find()
            .filter(entity::activity::Column::Points.gt(record.points))
            .count(self.db)
            .await?;

        let voice_ahead = entity::prelude::Activity::find()
            .filter(entity::activity::Column::VoicePoints.gt(record.voice_points))
            .count(self.db)
            .await?;

        Ok(Some(UserRank {
            points: record.points,
            voice_points: record.voice_points,
            position: ahead + 1,
            voice_position: voice_ahead + 1,
        }))
    }

    /// Gets one page of the leaderboard.
    ///
    /// Only users with a positive balance of the requested kind are listed, highest
    /// first; ties are ordered by user id so pages are stable.
    ///
    /// # Arguments
    /// - `page` - 1-based page number, values below 1 are treated as 1
    /// - `kind` - Rank by text points or voice points
    /// - `limit` - Users per page, values below 1 are treated as 1
    ///
    /// # Returns
    /// - `Ok(TopUsersPage)` - Users on the page with `total_pages = ceil(matching / limit)`
    /// - `Err(AppError)` - Database error or malformed stored id
    pub async fn get_top_users(
        &self,
        page: u64,
        kind: ActivityKind,
        limit: u64,
    ) -> Result<TopUsersPage, AppError> {
        let page = page.max(1);
        let limit = limit.max(1);
        let column = match kind {
            ActivityKind::Text => entity::activity::Column::Points,
            ActivityKind::Voice => entity::activity::Column::VoicePoints,
        };

        let paginator = entity::prelude::Activity::find()
            .filter(column.gt(0))
            .order_by_desc(column)
            .order_by_asc(entity::activity::Column::UserId)
            .paginate(self.db, limit);

        let total_pages = paginator.num_pages().await?;
        let entities = paginator.fetch_page(page - 1).await?;
        let users = entities
            .into_iter()
            .map(ActivityRecord::from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TopUsersPage {
            users,
            total_pages,
            current_page: page,
        })
    }

    /// Gets one zero-indexed batch of every stored record, ordered by user id.
    ///
    /// Used by the backup loader to scan the table without holding it all in memory.
    pub async fn get_batch(
        &self,
        batch: u64,
        batch_size: u64,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        let entities = entity::prelude::Activity::find()
            .order_by_asc(entity::activity::Column::UserId)
            .paginate(self.db, batch_size.max(1))
            .fetch_page(batch)
            .await?;

        entities
            .into_iter()
            .map(ActivityRecord::from_entity)
            .collect()
    }

    /// Upserts every record by user id inside one transaction.
    ///
    /// Either all rows are written or none are, so a failed flush can be retried
    /// with the same set of users.
    ///
    /// # Arguments
    /// - `records` - Records to persist
    /// - `now` - Value written to `last_update` on every row
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of upserted rows
    /// - `Err(DbErr)` - Database error; the transaction was rolled back
    pub async fn bulk_upsert(
        &self,
        records: Vec<ActivityRecord>,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        if records.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        let mut written = 0;

        for record in records {
            entity::prelude::Activity::insert(record.into_active_model(now))
                .on_conflict(
                    OnConflict::column(entity::activity::Column::UserId)
                        .update_columns([
                            entity::activity::Column::UserName,
                            entity::activity::Column::Points,
                            entity::activity::Column::VoicePoints,
                            entity::activity::Column::LastActivity,
                            entity::activity::Column::LastBoostCheck,
                            entity::activity::Column::IsBooster,
                            entity::activity::Column::Version,
                            entity::activity::Column::LastUpdate,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
            written += 1;
        }

        txn.commit().await?;

        Ok(written)
    }
}
