//! In-memory record cache with TTL staleness and de-duplicated prefetch.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

/// How long a cached record stays fresh.
const DEFAULT_TTL_DAYS: i64 = 7;

/// A cached payload plus its capture timestamp.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
  data: T,
  cached_at: DateTime<Utc>,
}

/// Process-local cache mapping record ids to payloads.
///
/// Entries older than the TTL are reported as absent but stay in the map
/// until the next `set` overwrites them; `get` compares timestamps on every
/// call instead of sweeping, which is fine while the key space is bounded by
/// the ids viewed in a session. Nothing survives a restart.
///
/// Cloning is cheap and shares the underlying map, so a handle can move into
/// a spawned prefetch task.
pub struct RecordCache<T> {
  inner: Arc<CacheInner<T>>,
  ttl: Duration,
}

struct CacheInner<T> {
  entries: Mutex<HashMap<String, CacheEntry<T>>>,
  /// Keys with a prefetch currently in flight.
  in_flight: Mutex<HashSet<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  // A poisoned cache is still a usable cache; take the guard anyway.
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T: Clone + Send + 'static> RecordCache<T> {
  pub fn new() -> Self {
    Self {
      inner: Arc::new(CacheInner {
        entries: Mutex::new(HashMap::new()),
        in_flight: Mutex::new(HashSet::new()),
      }),
      ttl: Duration::days(DEFAULT_TTL_DAYS),
    }
  }

  /// Override the time-to-live.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// Return the cached payload for `key` if an entry exists and is fresh.
  ///
  /// A stale entry reads as absent; it is not removed here.
  pub fn get(&self, key: &str) -> Option<T> {
    let entries = lock(&self.inner.entries);
    let entry = entries.get(key)?;
    if Utc::now() - entry.cached_at < self.ttl {
      Some(entry.data.clone())
    } else {
      None
    }
  }

  /// Unconditionally overwrite the entry for `key`, stamping it now.
  pub fn set(&self, key: &str, value: T) {
    let mut entries = lock(&self.inner.entries);
    entries.insert(
      key.to_string(),
      CacheEntry {
        data: value,
        cached_at: Utc::now(),
      },
    );
  }

  /// Speculatively warm the cache for `key` in the background.
  ///
  /// A no-op when a prefetch for the same key is already in flight. Fetch
  /// failures are logged and swallowed: prefetch runs ahead of user need and
  /// must never surface an error to its caller.
  pub fn prefetch<F, Fut, E>(&self, key: &str, fetch: F)
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Display,
  {
    {
      let mut in_flight = lock(&self.inner.in_flight);
      if !in_flight.insert(key.to_string()) {
        return;
      }
    }

    let cache = self.clone();
    let key = key.to_string();
    tokio::spawn(async move {
      match fetch().await {
        Ok(value) => cache.set(&key, value),
        Err(err) => tracing::warn!(key = %key, "prefetch failed: {}", err),
      }
      // Release the key whether the fetch succeeded or not.
      lock(&cache.inner.in_flight).remove(&key);
    });
  }
}

impl<T: Clone + Send + 'static> Default for RecordCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Clone for RecordCache<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
      ttl: self.ttl,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::time::Duration as StdDuration;

  /// Rewrite an entry's capture timestamp, simulating the passage of time.
  fn backdate(cache: &RecordCache<String>, key: &str, age: Duration) {
    let mut entries = lock(&cache.inner.entries);
    let entry = entries.get_mut(key).expect("entry to backdate");
    entry.cached_at = Utc::now() - age;
  }

  #[test]
  fn test_get_returns_fresh_entry() {
    let cache: RecordCache<String> = RecordCache::new();
    assert_eq!(cache.get("r1"), None);

    cache.set("r1", "soup".to_string());
    assert_eq!(cache.get("r1"), Some("soup".to_string()));
  }

  #[test]
  fn test_set_overwrites() {
    let cache: RecordCache<String> = RecordCache::new();
    cache.set("r1", "soup".to_string());
    cache.set("r1", "stew".to_string());
    assert_eq!(cache.get("r1"), Some("stew".to_string()));
  }

  #[test]
  fn test_ttl_boundary() {
    let cache: RecordCache<String> = RecordCache::new();
    cache.set("r1", "soup".to_string());

    backdate(&cache, "r1", Duration::days(6) + Duration::hours(23));
    assert_eq!(cache.get("r1"), Some("soup".to_string()));

    backdate(&cache, "r1", Duration::days(7) + Duration::minutes(1));
    assert_eq!(cache.get("r1"), None);

    // The stale entry is reported absent but still physically present
    // until the next set overwrites it.
    assert!(lock(&cache.inner.entries).contains_key("r1"));
  }

  #[tokio::test]
  async fn test_prefetch_populates_cache() {
    let cache: RecordCache<String> = RecordCache::new();
    cache.prefetch("r1", || async { Ok::<_, String>("soup".to_string()) });

    tokio::time::sleep(StdDuration::from_millis(20)).await;
    assert_eq!(cache.get("r1"), Some("soup".to_string()));
  }

  #[tokio::test]
  async fn test_prefetch_deduplicates_concurrent_fetches() {
    let cache: RecordCache<String> = RecordCache::new();
    let calls = Arc::new(AtomicU32::new(0));

    for _ in 0..2 {
      let calls = calls.clone();
      cache.prefetch("r1", move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        Ok::<_, String>("soup".to_string())
      });
    }

    tokio::time::sleep(StdDuration::from_millis(100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.get("r1"), Some("soup".to_string()));
  }

  #[tokio::test]
  async fn test_prefetch_failure_is_swallowed_and_releases_key() {
    let cache: RecordCache<String> = RecordCache::new();
    cache.prefetch("r1", || async { Err::<String, _>("connection reset".to_string()) });

    tokio::time::sleep(StdDuration::from_millis(20)).await;
    assert_eq!(cache.get("r1"), None);

    // The failed key is released, so a later prefetch runs again.
    cache.prefetch("r1", || async { Ok::<_, String>("soup".to_string()) });
    tokio::time::sleep(StdDuration::from_millis(20)).await;
    assert_eq!(cache.get("r1"), Some("soup".to_string()));
  }
}
