//! Fast key-value cache used as the ledger's read/write path.
//!
//! The `CacheStore` trait mirrors the small subset of a Redis-style API the ledger needs:
//! plain string values, hashes, sets and an optimistic `watch` + `exec` transaction.
//! `MemoryCache` is the in-process implementation used by the bot and the tests.
//!
//! # Keys
//!
//! - `activity:{user_id}` - JSON encoded `ActivityRecord`
//! - `voice:{user_id}` - JSON encoded `VoiceSession` for users currently in voice
//! - `boosters` - hash of user id to `"true"` / `"false"`
//! - `dirty_users` - set of user ids changed since the last durable flush
//! - `isLoadedActivity` - sentinel set once the backup loader ran

pub mod memory;

use async_trait::async_trait;

use crate::error::cache::CacheError;

pub use memory::MemoryCache;

pub const BOOSTERS_KEY: &str = "boosters";
pub const DIRTY_USERS_KEY: &str = "dirty_users";
pub const LOADED_SENTINEL_KEY: &str = "isLoadedActivity";

pub fn activity_key(user_id: u64) -> String {
    format!("activity:{}", user_id)
}

pub fn voice_key(user_id: u64) -> String {
    format!("voice:{}", user_id)
}

/// Snapshot of a watched key taken by `CacheStore::watch`.
///
/// Committing a transaction with a token fails if the key was written after the
/// token was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchToken {
    pub key: String,
    pub revision: u64,
}

/// A single keyspace write, applied directly or queued in a `Transaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    Set { key: String, value: String },
    Del { key: String },
    HSet {
        key: String,
        field: String,
        value: String,
    },
    SAdd { key: String, member: String },
}

/// Writes committed together by `CacheStore::exec`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    ops: Vec<CacheOp>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ops.push(CacheOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn h_set(
        mut self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.ops.push(CacheOp::HSet {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn s_add(mut self, key: impl Into<String>, member: impl Into<String>) -> Self {
        self.ops.push(CacheOp::SAdd {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    pub fn ops(&self) -> &[CacheOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<CacheOp> {
        self.ops
    }
}

/// Key-value cache contract consumed by the ledger, backup loader and synchronizer.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    /// Sets `key` only if it does not exist yet.
    ///
    /// # Returns
    /// - `Ok(true)` - The key was absent and has been set
    /// - `Ok(false)` - The key already existed and was left untouched
    async fn set_nx(&self, key: &str, value: String) -> Result<bool, CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;

    async fn h_get(&self, key: &str, field: &str) -> Result<Option<String>, CacheError>;

    async fn h_set(&self, key: &str, field: &str, value: String) -> Result<(), CacheError>;

    async fn s_add(&self, key: &str, member: &str) -> Result<(), CacheError>;

    async fn s_members(&self, key: &str) -> Result<Vec<String>, CacheError>;

    /// Returns every member of the set and removes the set in one atomic step.
    async fn s_take(&self, key: &str) -> Result<Vec<String>, CacheError>;

    /// Starts watching `key` for concurrent writes.
    async fn watch(&self, key: &str) -> Result<WatchToken, CacheError>;

    /// Commits `tx` atomically if the watched key is unchanged since `token` was taken.
    ///
    /// # Returns
    /// - `Ok(true)` - Every operation was applied
    /// - `Ok(false)` - The watched key changed; nothing was applied
    /// - `Err(CacheError)` - The transaction was rejected before anything was applied
    async fn exec(&self, token: WatchToken, tx: Transaction) -> Result<bool, CacheError>;
}
