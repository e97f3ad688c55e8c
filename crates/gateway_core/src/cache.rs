use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    expires_at: Instant,
    value: V,
}

/// In-memory key/value store with per-entry time-to-live.
///
/// Expiry is lazy: an expired entry is removed by the `get` that discovers
/// it, there is no background sweeper. There is also no capacity bound, so
/// callers are expected to key entries by a small, bounded request space
/// (e.g. `"info:" + url`).
pub struct TtlCache<V> {
    store: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        TtlCache {
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key` if it has not expired.
    ///
    /// Never returns a value whose deadline has passed; a `set` with a zero
    /// ttl is therefore immediately invisible to readers.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let mut store = self.store.lock().expect("cache lock poisoned");
        match store.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                store.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key`, unconditionally replacing any previous
    /// entry. Last writer wins.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        let entry = Entry {
            expires_at: Instant::now() + ttl,
            value,
        };
        let mut store = self.store.lock().expect("cache lock poisoned");
        store.insert(key.to_string(), entry);
    }

    /// Number of entries currently held, including not-yet-purged expired
    /// ones.
    pub fn len(&self) -> usize {
        self.store.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_value() {
        let cache = TtlCache::new();
        cache.set("autogempa", 42u32, Duration::from_secs(30));
        assert_eq!(cache.get("autogempa"), Some(42));
    }

    #[test]
    fn get_on_unset_key_is_absent() {
        let cache: TtlCache<String> = TtlCache::new();
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn zero_ttl_entry_is_immediately_expired() {
        let cache = TtlCache::new();
        cache.set("k", "v".to_string(), Duration::ZERO);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn expired_entry_is_purged_on_read() {
        let cache = TtlCache::new();
        cache.set("k", 1u8, Duration::ZERO);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let cache = TtlCache::new();
        cache.set("k", 1u8, Duration::from_secs(30));
        cache.set("k", 2u8, Duration::from_secs(30));
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = TtlCache::new();
        cache.set("k", 1u8, Duration::from_millis(20));
        assert_eq!(cache.get("k"), Some(1));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
    }
}
