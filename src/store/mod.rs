use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use crate::core::error::Error;

pub(crate) mod memory;
pub(crate) mod postgres;

pub(crate) use memory::MemoryStore;
pub(crate) use postgres::PgStore;

/// Keyed hash-map store with per-key expiry.
///
/// Each method is one primitive call against the backing store. Nothing here
/// is atomic across calls except what a single call guarantees; `hincr_by` is
/// an atomic add-and-fetch. Expired keys behave as absent everywhere.
pub(crate) trait HashStore: Send + Sync {
    fn hget(
        &self,
        key: &str,
        field: &str,
    ) -> impl Future<Output = Result<Option<String>, Error>> + Send;

    fn hget_all(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<HashMap<String, String>, Error>> + Send;

    /// Writes every field, creating the key if needed.
    fn hset(
        &self,
        key: &str,
        fields: &[(&str, &str)],
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Adds `delta` to a field (treated as 0 if absent) and returns the result.
    fn hincr_by(
        &self,
        key: &str,
        field: &str,
        delta: i64,
    ) -> impl Future<Output = Result<i64, Error>> + Send;

    /// Removes fields, returning how many existed. A key left with no fields
    /// is removed.
    fn hdel(&self, key: &str, fields: &[&str])
    -> impl Future<Output = Result<u64, Error>> + Send;

    fn del(&self, key: &str) -> impl Future<Output = Result<bool, Error>> + Send;

    /// Resets the key's time-to-live. Returns false if the key does not exist.
    fn expire(&self, key: &str, ttl: Duration)
    -> impl Future<Output = Result<bool, Error>> + Send;

    /// Number of live keys.
    fn key_count(&self) -> impl Future<Output = Result<u64, Error>> + Send;

    /// Drops expired keys, returning how many were removed.
    fn purge_expired(&self) -> impl Future<Output = Result<u64, Error>> + Send;
}

#[derive(Clone, Debug)]
pub(crate) enum Backend {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl HashStore for Backend {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, Error> {
        match self {
            Backend::Postgres(store) => store.hget(key, field).await,
            Backend::Memory(store) => store.hget(key, field).await,
        }
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, Error> {
        match self {
            Backend::Postgres(store) => store.hget_all(key).await,
            Backend::Memory(store) => store.hget_all(key).await,
        }
    }

    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), Error> {
        match self {
            Backend::Postgres(store) => store.hset(key, fields).await,
            Backend::Memory(store) => store.hset(key, fields).await,
        }
    }

    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, Error> {
        match self {
            Backend::Postgres(store) => store.hincr_by(key, field, delta).await,
            Backend::Memory(store) => store.hincr_by(key, field, delta).await,
        }
    }

    async fn hdel(&self, key: &str, fields: &[&str]) -> Result<u64, Error> {
        match self {
            Backend::Postgres(store) => store.hdel(key, fields).await,
            Backend::Memory(store) => store.hdel(key, fields).await,
        }
    }

    async fn del(&self, key: &str) -> Result<bool, Error> {
        match self {
            Backend::Postgres(store) => store.del(key).await,
            Backend::Memory(store) => store.del(key).await,
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, Error> {
        match self {
            Backend::Postgres(store) => store.expire(key, ttl).await,
            Backend::Memory(store) => store.expire(key, ttl).await,
        }
    }

    async fn key_count(&self) -> Result<u64, Error> {
        match self {
            Backend::Postgres(store) => store.key_count().await,
            Backend::Memory(store) => store.key_count().await,
        }
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        match self {
            Backend::Postgres(store) => store.purge_expired().await,
            Backend::Memory(store) => store.purge_expired().await,
        }
    }
}
