//! Revocation and refresh registry.
//!
//! Bounded-TTL key/value store holding the active refresh token per subject
//! (`RT:<username>`) and the denylist of logged-out access tokens (keyed by
//! the token string itself). Single-key operations are atomic under the
//! lock; there is no compare-and-set, so concurrent logins for one user are
//! last-write-wins.
//!
//! The TTL is a garbage-collection convenience: the authoritative expiry of
//! a token is always the `exp` claim inside it. Expired entries are evicted
//! lazily on read and by [`TokenRegistry::purge_expired`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::clock::Clock;

struct Entry {
    value: String,
    expires_at_millis: i64,
}

/// In-memory TTL key/value store. Cheaply cloneable; clones share state.
///
/// Lock poisoning is recovered from: every critical section leaves the map
/// structurally valid, so a writer that panicked mid-request does not take
/// the registry down with it.
#[derive(Clone)]
pub struct TokenRegistry {
    clock: Arc<dyn Clock>,
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl TokenRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Atomic set-with-expiry. Overwrites any existing entry; a
    /// non-positive TTL removes the key instead of storing a dead entry.
    pub fn put(&self, key: &str, value: &str, ttl_millis: i64) {
        if ttl_millis <= 0 {
            self.delete(key);
            return;
        }
        let expires_at_millis = self.clock.now_millis() + ttl_millis;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at_millis,
            },
        );
    }

    /// Current value for `key`, or `None` once the entry's TTL has elapsed.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now_millis();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                Some(entry) if now < entry.expires_at_millis => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Entry was present but expired; evict it.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let still_expired = entries.get(key).is_some_and(|e| now >= e.expires_at_millis);
        if still_expired {
            entries.remove(key);
        }
        None
    }

    pub fn delete(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }

    /// Drop every entry whose TTL has elapsed.
    pub fn purge_expired(&self) {
        let now = self.clock.now_millis();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| now < entry.expires_at_millis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ManualClock;

    fn registry() -> (TokenRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        (TokenRegistry::new(clock.clone()), clock)
    }

    #[test]
    fn put_get_delete() {
        let (registry, _clock) = registry();
        registry.put("RT:alice", "token-1", 1_000);
        assert_eq!(registry.get("RT:alice"), Some("token-1".to_string()));
        registry.delete("RT:alice");
        assert_eq!(registry.get("RT:alice"), None);
    }

    #[test]
    fn overwrite_replaces_value_and_ttl() {
        let (registry, clock) = registry();
        registry.put("RT:alice", "token-1", 1_000);
        registry.put("RT:alice", "token-2", 5_000);

        clock.advance(2_000);
        assert_eq!(registry.get("RT:alice"), Some("token-2".to_string()));
    }

    #[test]
    fn entries_expire_at_their_ttl() {
        let (registry, clock) = registry();
        registry.put("access-token", "logout", 500);

        clock.advance(499);
        assert_eq!(registry.get("access-token"), Some("logout".to_string()));
        clock.advance(1);
        assert_eq!(registry.get("access-token"), None);
        // Expired entry was evicted, not just hidden.
        clock.set(0);
        assert_eq!(registry.get("access-token"), None);
    }

    #[test]
    fn non_positive_ttl_removes_the_key() {
        let (registry, _clock) = registry();
        registry.put("k", "v", 1_000);
        registry.put("k", "v", 0);
        assert_eq!(registry.get("k"), None);
        registry.put("k", "v", -42);
        assert_eq!(registry.get("k"), None);
    }

    #[test]
    fn survives_a_poisoned_lock() {
        let (registry, _clock) = registry();
        registry.put("RT:alice", "token-1", 1_000);

        // Poison the inner lock by panicking while holding it.
        let poisoner = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.write().unwrap();
            panic!("boom");
        })
        .join();

        assert_eq!(registry.get("RT:alice"), Some("token-1".to_string()));
        registry.put("RT:bob", "token-2", 1_000);
        assert_eq!(registry.get("RT:bob"), Some("token-2".to_string()));
    }

    #[test]
    fn purge_drops_only_expired_entries() {
        let (registry, clock) = registry();
        registry.put("short", "a", 100);
        registry.put("long", "b", 10_000);

        clock.advance(500);
        registry.purge_expired();
        assert_eq!(registry.get("short"), None);
        assert_eq!(registry.get("long"), Some("b".to_string()));
    }
}
