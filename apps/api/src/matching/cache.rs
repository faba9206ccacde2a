//! Expiring key→value store for match results.
//!
//! Reserved for short-circuiting repeat AI calls; the fetch pipeline does
//! not consult it yet (preserved as-is, see DESIGN.md; pinned by test).
//! No background timer: entries are invalidated lazily on access.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Fixed entry lifetime. Staleness is advisory: checked on read, not on a
/// timer.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

/// Size/timeout introspection, surfaced over HTTP.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub timeout_ms: u128,
}

pub struct AgentCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone> AgentCache<T> {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached value, evicting it first if it has outlived the
    /// TTL.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: T) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.into(), entry);
    }

    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.retain(|_, entry| entry.expires_at > now);
        CacheStats {
            size: entries.len(),
            timeout_ms: self.ttl.as_millis(),
        }
    }
}

impl<T: Clone> Default for AgentCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
