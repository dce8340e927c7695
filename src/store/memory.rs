use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::error::Error;
use crate::store::HashStore;

#[derive(Debug, Default)]
struct Entry {
    fields: HashMap<String, String>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

/// In-process store. Records live as long as the process does.
#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

fn live<'a>(entries: &'a HashMap<String, Entry>, key: &str) -> Option<&'a Entry> {
    entries.get(key).filter(|entry| entry.is_live(Instant::now()))
}

/// Returns the live entry for `key`, replacing an expired one with a fresh
/// entry first.
fn live_or_insert<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> &'a mut Entry {
    let now = Instant::now();

    if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
        entries.remove(key);
    }

    entries.entry(key.to_owned()).or_default()
}

impl HashStore for MemoryStore {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, Error> {
        let entries = self.entries.lock().await;

        Ok(live(&entries, key).and_then(|entry| entry.fields.get(field).cloned()))
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, Error> {
        let entries = self.entries.lock().await;

        Ok(live(&entries, key)
            .map(|entry| entry.fields.clone())
            .unwrap_or_default())
    }

    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), Error> {
        let mut entries = self.entries.lock().await;
        let entry = live_or_insert(&mut entries, key);

        for (field, value) in fields {
            entry.fields.insert((*field).to_owned(), (*value).to_owned());
        }

        Ok(())
    }

    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, Error> {
        let mut entries = self.entries.lock().await;
        let entry = live_or_insert(&mut entries, key);

        let current = match entry.fields.get(field) {
            Some(value) => value
                .parse::<i64>()
                .map_err(|_| Error::CorruptRecord(key.to_owned()))?,
            None => 0,
        };

        let next = current.checked_add(delta).ok_or(Error::Overflow)?;

        entry.fields.insert(field.to_owned(), next.to_string());

        Ok(next)
    }

    async fn hdel(&self, key: &str, fields: &[&str]) -> Result<u64, Error> {
        let mut entries = self.entries.lock().await;

        let Some(entry) = entries
            .get_mut(key)
            .filter(|entry| entry.is_live(Instant::now()))
        else {
            return Ok(0);
        };

        let removed = fields
            .iter()
            .filter(|field| entry.fields.remove(**field).is_some())
            .count() as u64;

        if entry.fields.is_empty() {
            entries.remove(key);
        }

        Ok(removed)
    }

    async fn del(&self, key: &str) -> Result<bool, Error> {
        let mut entries = self.entries.lock().await;

        Ok(entries
            .remove(key)
            .is_some_and(|entry| entry.is_live(Instant::now())))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, Error> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.get_mut(key).filter(|entry| entry.is_live(now)) {
            Some(entry) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn key_count(&self) -> Result<u64, Error> {
        let entries = self.entries.lock().await;
        let now = Instant::now();

        Ok(entries.values().filter(|entry| entry.is_live(now)).count() as u64)
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let before = entries.len();

        entries.retain(|_, entry| entry.is_live(now));

        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hset_creates_and_hget_reads() {
        let store = MemoryStore::new();

        store.hset("k", &[("a", "1"), ("b", "2")]).await.unwrap();

        assert_eq!(store.hget("k", "a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.hget("k", "c").await.unwrap(), None);
        assert_eq!(store.hget_all("k").await.unwrap().len(), 2);
        assert_eq!(store.key_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn hincr_by_starts_from_zero_and_rejects_overflow() {
        let store = MemoryStore::new();

        assert_eq!(store.hincr_by("k", "n", 5).await.unwrap(), 5);
        assert_eq!(store.hincr_by("k", "n", -7).await.unwrap(), -2);

        let max = i64::MAX.to_string();
        store.hset("k", &[("n", max.as_str())]).await.unwrap();

        assert!(matches!(
            store.hincr_by("k", "n", 1).await,
            Err(Error::Overflow)
        ));
    }

    #[tokio::test]
    async fn hincr_by_rejects_non_integer_values() {
        let store = MemoryStore::new();

        store.hset("k", &[("n", "seven")]).await.unwrap();

        assert!(matches!(
            store.hincr_by("k", "n", 1).await,
            Err(Error::CorruptRecord(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let store = MemoryStore::new();
        store.hset("k", &[("n", "0")]).await.unwrap();

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.hincr_by("k", "n", 1).await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.hget("k", "n").await.unwrap().as_deref(), Some("64"));
    }

    #[tokio::test]
    async fn removing_the_last_field_removes_the_key() {
        let store = MemoryStore::new();

        store.hset("k", &[("a", "1"), ("b", "2")]).await.unwrap();

        assert_eq!(store.hdel("k", &["a", "missing"]).await.unwrap(), 1);
        assert_eq!(store.key_count().await.unwrap(), 1);
        assert_eq!(store.hdel("k", &["b"]).await.unwrap(), 1);
        assert_eq!(store.key_count().await.unwrap(), 0);
        assert!(!store.expire("k", Duration::from_secs(10)).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_keys_are_absent_and_purged() {
        let store = MemoryStore::new();

        store.hset("k", &[("a", "1")]).await.unwrap();
        assert!(store.expire("k", Duration::from_secs(10)).await.unwrap());

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(store.hget("k", "a").await.unwrap().as_deref(), Some("1"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.hget("k", "a").await.unwrap(), None);
        assert!(store.hget_all("k").await.unwrap().is_empty());
        assert!(!store.del("k").await.unwrap());
        assert_eq!(store.key_count().await.unwrap(), 0);

        store.hset("j", &[("a", "1")]).await.unwrap();
        store.expire("j", Duration::from_secs(1)).await.unwrap();
        store.hset("forever", &[("a", "1")]).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.key_count().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expire_resets_rather_than_extends() {
        let store = MemoryStore::new();

        store.hset("k", &[("a", "1")]).await.unwrap();
        store.expire("k", Duration::from_secs(10)).await.unwrap();

        tokio::time::advance(Duration::from_secs(8)).await;
        store.expire("k", Duration::from_secs(10)).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(store.hget("k", "a").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.hget("k", "a").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn writing_to_an_expired_key_starts_a_fresh_record() {
        let store = MemoryStore::new();

        store.hset("k", &[("old", "1")]).await.unwrap();
        store.expire("k", Duration::from_secs(1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        store.hset("k", &[("new", "2")]).await.unwrap();

        let fields = store.hget_all("k").await.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("new").map(String::as_str), Some("2"));
    }
}
