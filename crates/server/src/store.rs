//! In-memory session store.
//!
//! The map lock is held only for lookups and bookkeeping. Each session has
//! its own mutex, so actions on one session are serialized without blocking
//! the others.

use crate::error::{ApiError, ApiResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sweeper_core::Session;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Longest pause between two eviction sweeps.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

struct Entry {
    session: Arc<Mutex<Session>>,
    last_access: Instant,
}

/// Sessions by id, dropped after `ttl` without a request.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Option<Duration>,
}

impl SessionStore {
    /// `None` keeps sessions until they are removed.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Store a new session and return its id.
    pub async fn insert(&self, session: Session) -> Uuid {
        let now = Instant::now();
        let id = Uuid::new_v4();
        let mut entries = self.entries.write().await;
        self.evict_locked(&mut entries, now);
        entries.insert(
            id,
            Entry {
                session: Arc::new(Mutex::new(session)),
                last_access: now,
            },
        );
        id
    }

    /// Wait for exclusive access to a session and mark it as used.
    pub async fn lock(&self, id: Uuid) -> ApiResult<OwnedMutexGuard<Session>> {
        let session = {
            let mut entries = self.entries.write().await;
            let entry = entries.get_mut(&id).ok_or(ApiError::NotFound(id))?;
            entry.last_access = Instant::now();
            Arc::clone(&entry.session)
        };
        Ok(session.lock_owned().await)
    }

    /// Discard a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.entries.write().await.remove(&id).is_some()
    }

    /// Drop every session idle for longer than the ttl, as seen at `now`.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().await;
        self.evict_locked(&mut entries, now)
    }

    fn evict_locked(&self, entries: &mut HashMap<Uuid, Entry>, now: Instant) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.last_access) <= ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::info!("Evicted {evicted} idle sessions");
        }
        evicted
    }

    /// Sweep idle sessions in the background. Does nothing without a ttl.
    pub fn spawn_eviction(&self) -> Option<JoinHandle<()>> {
        let period = self.ttl?.min(MAX_SWEEP_PERIOD).max(Duration::from_secs(1));
        let store = self.clone();
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                store.evict_idle(Instant::now()).await;
            }
        }))
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_core::UploadedFile;

    fn session() -> Session {
        Session::open(&UploadedFile::new("t.csv", "a\n1\n")).unwrap()
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let store = SessionStore::new(Some(Duration::from_secs(10)));
        let id = store.insert(session()).await;

        assert_eq!(store.evict_idle(Instant::now() + Duration::from_secs(5)).await, 0);
        assert!(store.lock(id).await.is_ok());

        assert_eq!(store.evict_idle(Instant::now() + Duration::from_secs(11)).await, 1);
        assert!(matches!(store.lock(id).await, Err(ApiError::NotFound(_))));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_without_ttl_nothing_is_evicted() {
        let store = SessionStore::new(None);
        store.insert(session()).await;

        let far = Instant::now() + Duration::from_secs(365 * 24 * 3600);
        assert_eq!(store.evict_idle(far).await, 0);
        assert_eq!(store.len().await, 1);
        assert!(store.spawn_eviction().is_none());
    }

    #[tokio::test]
    async fn test_busy_session_does_not_block_others() {
        let store = SessionStore::new(None);
        let busy = store.insert(session()).await;
        let idle = store.insert(session()).await;

        let _held = store.lock(busy).await.unwrap();
        let other = tokio::time::timeout(Duration::from_secs(1), store.lock(idle)).await;
        assert!(other.is_ok_and(|guard| guard.is_ok()));

        let same = tokio::time::timeout(Duration::from_millis(50), store.lock(busy)).await;
        assert!(same.is_err());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = SessionStore::new(None);
        let id = store.insert(session()).await;
        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
    }
}
