//! Per-client session storage keyed by an opaque handle.

use lru::LruCache;
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Session field holding the last searched topic.
pub const TOPIC: &str = "topic";
/// Session field holding the structured note document.
pub const NOTES: &str = "notes";
/// Session field holding the flattened notes text.
pub const NOTES_TEXT: &str = "notes_text";

/// Field-level access to per-session values.
///
/// Writes to the same handle and field are last-write-wins.
pub trait SessionStore: Send + Sync {
    fn get(&self, handle: &str, field: &str) -> Option<Value>;
    fn set(&self, handle: &str, field: &str, value: Value);
}

/// Sessions kept before the least recently used one is dropped.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;
/// Idle time after which a session expires.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

struct Session {
    fields: HashMap<String, Value>,
    touched: Instant,
}

/// Process-local [`SessionStore`]; sessions vanish on restart.
///
/// Holds at most `max_sessions` sessions, evicting the least recently used,
/// and drops sessions left idle for `idle_ttl`.
pub struct InMemorySessionStore {
    sessions: Mutex<LruCache<String, Session>>,
    idle_ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TTL)
    }

    pub fn with_limits(max_sessions: usize, idle_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            idle_ttl,
        }
    }

    /// Number of sessions with at least one field set.
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn expired(&self, session: &Session) -> bool {
        session.touched.elapsed() >= self.idle_ttl
    }

    /// Drop idle sessions. Recency order matches `touched` order, so only
    /// the tail needs checking.
    fn sweep(&self, sessions: &mut LruCache<String, Session>) {
        let mut dropped = 0;
        while sessions.peek_lru().is_some_and(|(_, s)| self.expired(s)) {
            sessions.pop_lru();
            dropped += 1;
        }
        if dropped > 0 {
            log::debug!("Expired {} idle sessions", dropped);
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, handle: &str, field: &str) -> Option<Value> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        self.sweep(&mut sessions);
        let session = sessions.get_mut(handle)?;
        session.touched = Instant::now();
        session.fields.get(field).cloned()
    }

    fn set(&self, handle: &str, field: &str, value: Value) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        self.sweep(&mut sessions);
        if let Some(session) = sessions.get_mut(handle) {
            session.touched = Instant::now();
            session.fields.insert(field.to_string(), value);
            return;
        }

        let session = Session {
            fields: HashMap::from([(field.to_string(), value)]),
            touched: Instant::now(),
        };
        if let Some((evicted, _)) = sessions.push(handle.to_string(), session) {
            log::debug!("Session store full; dropped session {}", evicted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_set_per_handle() {
        let store = InMemorySessionStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("a", TOPIC), None);

        store.set("a", TOPIC, json!("Algebra"));
        store.set("b", TOPIC, json!("Geometry"));
        assert_eq!(store.get("a", TOPIC), Some(json!("Algebra")));
        assert_eq!(store.get("b", TOPIC), Some(json!("Geometry")));
        assert_eq!(store.get("a", NOTES), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_last_write_wins() {
        let store = InMemorySessionStore::new();
        store.set("a", NOTES_TEXT, json!("first"));
        store.set("a", NOTES_TEXT, json!("second"));
        assert_eq!(store.get("a", NOTES_TEXT), Some(json!("second")));
    }

    #[test]
    fn test_least_recently_used_session_is_evicted() {
        let store = InMemorySessionStore::with_limits(2, DEFAULT_IDLE_TTL);
        store.set("a", TOPIC, json!("Algebra"));
        store.set("b", TOPIC, json!("Biology"));
        assert_eq!(store.get("a", TOPIC), Some(json!("Algebra")));

        store.set("c", TOPIC, json!("Chemistry"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b", TOPIC), None);
        assert_eq!(store.get("a", TOPIC), Some(json!("Algebra")));
        assert_eq!(store.get("c", TOPIC), Some(json!("Chemistry")));
    }

    #[test]
    fn test_idle_sessions_expire() {
        let store = InMemorySessionStore::with_limits(DEFAULT_MAX_SESSIONS, Duration::ZERO);
        store.set("a", TOPIC, json!("Algebra"));
        assert_eq!(store.get("a", TOPIC), None);
        assert!(store.is_empty());

        store.set("b", TOPIC, json!("Biology"));
        store.set("c", TOPIC, json!("Chemistry"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_active_sessions_survive_sweep() {
        let store = InMemorySessionStore::with_limits(DEFAULT_MAX_SESSIONS, Duration::from_secs(3600));
        for i in 0..100 {
            store.set(&format!("s{}", i), TOPIC, json!(i));
        }
        assert_eq!(store.len(), 100);
        assert_eq!(store.get("s0", TOPIC), Some(json!(0)));
    }
}
