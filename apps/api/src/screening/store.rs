use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{SessionState, Stage};

pub type SessionHandle = Arc<Mutex<SessionState>>;

/// When idle and finished sessions are dropped from the store.
#[derive(Debug, Clone, Copy)]
pub struct EvictionPolicy {
    /// Any session untouched for this long is dropped.
    pub idle_ttl: Duration,
    /// A concluded session is kept this long after its last activity so the
    /// client can still fetch the final snapshot.
    pub concluded_ttl: Duration,
    pub sweep_interval: Duration,
}

struct Entry {
    handle: SessionHandle,
    last_active: Instant,
}

/// In-memory session registry. Nothing survives a restart.
///
/// The outer lock only guards the id map and is never held across an await;
/// the per-session mutex serialises messages within one conversation.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: SessionState) -> Result<SessionHandle, AppError> {
        let id = session.id;
        let handle = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .map_err(|_| anyhow!("session store lock poisoned"))?
            .insert(
                id,
                Entry {
                    handle: handle.clone(),
                    last_active: Instant::now(),
                },
            );
        Ok(handle)
    }

    /// Looks a session up and marks it as active.
    pub fn get(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| anyhow!("session store lock poisoned"))?;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        entry.last_active = Instant::now();
        Ok(entry.handle.clone())
    }

    pub fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .map_err(|_| anyhow!("session store lock poisoned"))?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub fn len(&self) -> Result<usize, AppError> {
        Ok(self
            .sessions
            .read()
            .map_err(|_| anyhow!("session store lock poisoned"))?
            .len())
    }

    /// Drops sessions that outlived the policy and returns how many went.
    ///
    /// A session whose mutex is held is mid-message and always kept.
    pub fn evict_expired(&self, policy: &EvictionPolicy) -> Result<usize, AppError> {
        let now = Instant::now();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| anyhow!("session store lock poisoned"))?;
        let before = sessions.len();

        sessions.retain(|_, entry| {
            let idle = now.saturating_duration_since(entry.last_active);
            if idle >= policy.idle_ttl {
                return false;
            }
            match entry.handle.try_lock() {
                Ok(session) => {
                    !(session.stage == Stage::Concluded && idle >= policy.concluded_ttl)
                }
                Err(_) => true,
            }
        });

        Ok(before - sessions.len())
    }
}

/// Runs `evict_expired` every `sweep_interval` until the task is aborted.
pub fn spawn_sweeper(store: SessionStore, policy: EvictionPolicy) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(policy.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.evict_expired(&policy) {
                Ok(0) => {}
                Ok(evicted) => info!(evicted, "Evicted expired sessions"),
                Err(e) => warn!("Session sweep failed: {e}"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    fn policy() -> EvictionPolicy {
        EvictionPolicy {
            idle_ttl: 30 * MINUTE,
            concluded_ttl: 5 * MINUTE,
            sweep_interval: MINUTE,
        }
    }

    fn insert_new(store: &SessionStore) -> Uuid {
        let session = SessionState::new();
        let id = session.id;
        store.insert(session).unwrap();
        id
    }

    #[tokio::test]
    async fn test_insert_then_get_returns_same_session() {
        let store = SessionStore::new();
        let id = insert_new(&store);

        let handle = store.get(id).unwrap();
        assert_eq!(handle.lock().await.id, id);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_updates_are_visible_through_handle() {
        let store = SessionStore::new();
        let id = insert_new(&store);

        store.get(id).unwrap().lock().await.stage = Stage::CollectingName;
        assert_eq!(store.get(id).unwrap().lock().await.stage, Stage::CollectingName);
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let store = SessionStore::new();
        assert!(matches!(store.get(Uuid::new_v4()), Err(AppError::NotFound(_))));
        assert!(matches!(store.remove(Uuid::new_v4()), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_tears_down() {
        let store = SessionStore::new();
        let id = insert_new(&store);
        store.remove(id).unwrap();
        assert!(store.get(id).is_err());
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let store = SessionStore::new();
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sessions.write().unwrap();
            panic!("poison the store");
        })
        .join();

        assert!(matches!(store.len(), Err(AppError::Internal(_))));
        assert!(matches!(store.get(Uuid::new_v4()), Err(AppError::Internal(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let store = SessionStore::new();
        let stale = insert_new(&store);
        tokio::time::advance(20 * MINUTE).await;
        let fresh = insert_new(&store);
        tokio::time::advance(15 * MINUTE).await;

        assert_eq!(store.evict_expired(&policy()).unwrap(), 1);
        assert!(matches!(store.get(stale), Err(AppError::NotFound(_))));
        assert!(store.get(fresh).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_resets_idle_clock() {
        let store = SessionStore::new();
        let id = insert_new(&store);
        tokio::time::advance(20 * MINUTE).await;
        store.get(id).unwrap();
        tokio::time::advance(20 * MINUTE).await;

        assert_eq!(store.evict_expired(&policy()).unwrap(), 0);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concluded_sessions_go_after_grace_period() {
        let store = SessionStore::new();
        let active = insert_new(&store);
        let done = insert_new(&store);
        store.get(done).unwrap().lock().await.stage = Stage::Concluded;

        tokio::time::advance(4 * MINUTE).await;
        assert_eq!(store.evict_expired(&policy()).unwrap(), 0);

        tokio::time::advance(2 * MINUTE).await;
        assert_eq!(store.evict_expired(&policy()).unwrap(), 1);
        assert!(store.get(done).is_err());
        assert!(store.get(active).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_locked_session_is_kept() {
        let store = SessionStore::new();
        let id = insert_new(&store);
        let handle = store.get(id).unwrap();
        let mut guard = handle.lock().await;
        guard.stage = Stage::Concluded;

        tokio::time::advance(10 * MINUTE).await;
        assert_eq!(store.evict_expired(&policy()).unwrap(), 0);
        drop(guard);
        assert_eq!(store.evict_expired(&policy()).unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_on_interval() {
        let store = SessionStore::new();
        insert_new(&store);
        let sweeper = spawn_sweeper(store.clone(), policy());

        tokio::time::sleep(29 * MINUTE).await;
        assert_eq!(store.len().unwrap(), 1);

        tokio::time::sleep(2 * MINUTE).await;
        assert_eq!(store.len().unwrap(), 0);
        sweeper.abort();
    }
}
