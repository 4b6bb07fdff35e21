//! SeaORM entities for the durable activity store.

pub mod activity;
pub mod prelude;
