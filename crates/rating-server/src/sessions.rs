//! In-process registry of live game sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chess_session::{GameSession, SessionHandle};
use tokio::sync::RwLock;
use tracing::info;

/// Live sessions keyed by a random id.
///
/// Sessions are not persisted. They stay in memory until a client deletes
/// them.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
    autoplay_delay: Duration,
}

impl SessionRegistry {
    pub fn new(autoplay_delay: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            autoplay_delay,
        }
    }

    /// Starts a new local game and returns its id and handle.
    pub async fn create(&self) -> (String, SessionHandle) {
        let id = uuid::Uuid::new_v4().to_string();
        let handle = SessionHandle::new(GameSession::new(), self.autoplay_delay);
        self.sessions
            .write()
            .await
            .insert(id.clone(), handle.clone());
        info!(session = %id, "session created");
        (id, handle)
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drops a session and cancels its scheduled computer reply, if any.
    pub async fn remove(&self, id: &str) -> Option<SessionHandle> {
        let handle = self.sessions.write().await.remove(id)?;
        handle.close().await;
        info!(session = %id, "session removed");
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = SessionRegistry::new(Duration::from_millis(10));
        let (id, _) = registry.create().await;
        assert!(registry.get(&id).await.is_some());
        assert!(registry.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = SessionRegistry::new(Duration::from_millis(10));
        let (id, _) = registry.create().await;
        assert!(registry.remove(&id).await.is_some());
        assert!(registry.get(&id).await.is_none());
        assert!(registry.remove(&id).await.is_none());
    }
}
