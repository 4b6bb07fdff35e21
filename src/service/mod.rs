//! Service layer: the activity ledger and the background processes built on it.
//!
//! - `activity` - cache-backed ledger with optimistic concurrency
//! - `voice` - voice channel session accounting (part of the ledger)
//! - `backup` - one-time cache hydration from the database
//! - `sync` - incremental flush of changed records to the database
//! - `roster` - top performer role reconciliation
//! - `discord` - the member directory seam to Discord

pub mod activity;
pub mod backup;
pub mod discord;
pub mod roster;
pub mod sync;
pub mod voice;
