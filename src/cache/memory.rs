//! In-process `CacheStore` implementation.
//!
//! All values live behind a single mutex so a transaction is applied atomically with
//! respect to every other cache call. Each key carries a revision counter that is bumped
//! by every write; `exec` compares it with the revision captured by `watch`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    cache::{CacheOp, CacheStore, Transaction, WatchToken},
    error::cache::CacheError,
};

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    Set(HashSet<String>),
}

#[derive(Debug, Default)]
struct Keyspace {
    values: HashMap<String, Value>,
    /// Revisions survive deletion so a delete still invalidates watchers.
    revisions: HashMap<String, u64>,
}

impl Keyspace {
    fn revision(&self, key: &str) -> u64 {
        self.revisions.get(key).copied().unwrap_or(0)
    }

    fn touch(&mut self, key: &str) {
        *self.revisions.entry(key.to_string()).or_insert(0) += 1;
    }

    fn wrong_type(key: &str) -> CacheError {
        CacheError::WrongType {
            key: key.to_string(),
        }
    }

    fn string(&self, key: &str) -> Result<Option<&String>, CacheError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(Value::Str(value)) => Ok(Some(value)),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    fn hash_mut(&mut self, key: &str) -> Result<&mut HashMap<String, String>, CacheError> {
        let value = self
            .values
            .entry(key.to_string())
            .or_insert_with(|| Value::Hash(HashMap::new()));
        match value {
            Value::Hash(hash) => Ok(hash),
            _ => Err(Self::wrong_type(key)),
        }
    }

    fn set_mut(&mut self, key: &str) -> Result<&mut HashSet<String>, CacheError> {
        let value = self
            .values
            .entry(key.to_string())
            .or_insert_with(|| Value::Set(HashSet::new()));
        match value {
            Value::Set(set) => Ok(set),
            _ => Err(Self::wrong_type(key)),
        }
    }

    /// Checks an operation against the current value kinds without applying it.
    fn check(&self, op: &CacheOp) -> Result<(), CacheError> {
        match op {
            CacheOp::Set { .. } | CacheOp::Del { .. } => Ok(()),
            CacheOp::HSet { key, .. } => match self.values.get(key) {
                None | Some(Value::Hash(_)) => Ok(()),
                Some(_) => Err(Self::wrong_type(key)),
            },
            CacheOp::SAdd { key, .. } => match self.values.get(key) {
                None | Some(Value::Set(_)) => Ok(()),
                Some(_) => Err(Self::wrong_type(key)),
            },
        }
    }

    fn apply(&mut self, op: CacheOp) -> Result<(), CacheError> {
        match op {
            CacheOp::Set { key, value } => {
                self.values.insert(key.clone(), Value::Str(value));
                self.touch(&key);
            }
            CacheOp::Del { key } => {
                self.values.remove(&key);
                self.touch(&key);
            }
            CacheOp::HSet { key, field, value } => {
                self.hash_mut(&key)?.insert(field, value);
                self.touch(&key);
            }
            CacheOp::SAdd { key, member } => {
                self.set_mut(&key)?.insert(member);
                self.touch(&key);
            }
        }
        Ok(())
    }
}

/// Cache kept in the bot's own memory.
#[derive(Debug, Default)]
pub struct MemoryCache {
    keyspace: Mutex<Keyspace>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let keyspace = self.keyspace.lock();
        Ok(keyspace.string(key)?.cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.keyspace.lock().apply(CacheOp::Set {
            key: key.to_string(),
            value,
        })
    }

    async fn set_nx(&self, key: &str, value: String) -> Result<bool, CacheError> {
        let mut keyspace = self.keyspace.lock();
        if keyspace.values.contains_key(key) {
            return Ok(false);
        }
        keyspace.apply(CacheOp::Set {
            key: key.to_string(),
            value,
        })?;
        Ok(true)
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.keyspace.lock().apply(CacheOp::Del {
            key: key.to_string(),
        })
    }

    async fn h_get(&self, key: &str, field: &str) -> Result<Option<String>, CacheError> {
        let keyspace = self.keyspace.lock();
        match keyspace.values.get(key) {
            None => Ok(None),
            Some(Value::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(_) => Err(Keyspace::wrong_type(key)),
        }
    }

    async fn h_set(&self, key: &str, field: &str, value: String) -> Result<(), CacheError> {
        let mut keyspace = self.keyspace.lock();
        let op = CacheOp::HSet {
            key: key.to_string(),
            field: field.to_string(),
            value,
        };
        keyspace.check(&op)?;
        keyspace.apply(op)
    }

    async fn s_add(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut keyspace = self.keyspace.lock();
        let op = CacheOp::SAdd {
            key: key.to_string(),
            member: member.to_string(),
        };
        keyspace.check(&op)?;
        keyspace.apply(op)
    }

    async fn s_members(&self, key: &str) -> Result<Vec<String>, CacheError> {
        let keyspace = self.keyspace.lock();
        match keyspace.values.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(Keyspace::wrong_type(key)),
        }
    }

    async fn s_take(&self, key: &str) -> Result<Vec<String>, CacheError> {
        let mut keyspace = self.keyspace.lock();
        match keyspace.values.get(key) {
            None => return Ok(Vec::new()),
            Some(Value::Set(_)) => {}
            Some(_) => return Err(Keyspace::wrong_type(key)),
        }

        let members = match keyspace.values.remove(key) {
            Some(Value::Set(set)) => set.into_iter().collect(),
            _ => Vec::new(),
        };
        keyspace.touch(key);

        Ok(members)
    }

    async fn watch(&self, key: &str) -> Result<WatchToken, CacheError> {
        let keyspace = self.keyspace.lock();
        Ok(WatchToken {
            key: key.to_string(),
            revision: keyspace.revision(key),
        })
    }

    async fn exec(&self, token: WatchToken, tx: Transaction) -> Result<bool, CacheError> {
        let mut keyspace = self.keyspace.lock();

        if keyspace.revision(&token.key) != token.revision {
            return Ok(false);
        }

        for op in tx.ops() {
            keyspace.check(op)?;
        }
        for op in tx.into_ops() {
            keyspace.apply(op)?;
        }

        Ok(true)
    }
}
