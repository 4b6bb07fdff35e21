use sea_orm::entity::prelude::*;

/// Durable copy of a user's activity ledger.
///
/// Several columns are nullable because rows written by older releases did not
/// carry them; readers substitute defaults.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub user_name: String,
    pub points: i64,
    pub voice_points: Option<i64>,
    pub last_activity: Option<DateTimeUtc>,
    pub last_boost_check: Option<DateTimeUtc>,
    pub is_booster: Option<bool>,
    pub version: Option<i64>,
    pub last_update: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
