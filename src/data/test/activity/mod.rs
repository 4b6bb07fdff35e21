use crate::{
    data::activity::ActivityRepository,
    model::activity::{ActivityKind, ActivityRecord},
};
use chrono::Utc;
use sea_orm::{DbErr, EntityTrait, PaginatorTrait};
use test_utils::{builder::TestBuilder, factory};

mod bulk_upsert;
mod find_by_user_id;
mod get_batch;
mod get_top_users;
mod rank_and_totals;
